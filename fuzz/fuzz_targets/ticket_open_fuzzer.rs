//! Fuzz target for opening untrusted tickets
//!
//! Tickets arrive from the network; opening must reject anything it did not
//! seal without panicking.
//!
//! # Strategy
//!
//! - Raw bytes: arbitrary input handed straight to `open_ticket`
//! - Mutation: seal real state, then flip one byte anywhere in the ticket
//!
//! # Invariants
//!
//! - Opening never panics
//! - A mutated ticket never opens
//! - An unmodified ticket always opens to the sealed state

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ticketseed_core::{TicketKeyManager, open_ticket, seal_ticket};
use ticketseed_harness::SimEnv;

#[derive(Debug, Arbitrary)]
enum Input {
    Raw(Vec<u8>),
    Mutated { state: Vec<u8>, position: u16, flip: u8 },
}

fuzz_target!(|input: Input| {
    let mut manager = TicketKeyManager::new(SimEnv::with_seed(0));
    manager.set_seeds(&["retired"], &["alpha", "beta"], &["next"]).unwrap();

    match input {
        Input::Raw(bytes) => {
            let _ = open_ticket(&manager, &bytes);
        },
        Input::Mutated { state, position, flip } => {
            let mut ticket = seal_ticket(&manager, &state).unwrap();
            let opened = open_ticket(&manager, &ticket).unwrap();
            assert_eq!(opened.state, state);
            assert!(!opened.renew);

            if flip == 0 {
                return;
            }
            let index = usize::from(position) % ticket.len();
            ticket[index] ^= flip;
            assert!(open_ticket(&manager, &ticket).is_err(), "mutated ticket opened");
        },
    }
});
