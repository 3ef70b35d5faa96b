//! Fuzz target for rotation sequences
//!
//! # Strategy
//!
//! - Random sequences of seed pushes drawn from a small secret alphabet so
//!   seeds recur across lists and across pushes
//! - Empty current lists and empty secrets to exercise rejection
//!
//! # Invariants
//!
//! - A rejected push leaves the installed seeds unchanged
//! - One derived key per distinct secret
//! - New tickets are always issued under a current key
//! - A ticket issued before a push resumes after it iff its secret is
//!   still configured, and asks for renewal iff that secret is now only old

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ticketseed_core::{Classification, TicketKeyManager, TicketSeeds};
use ticketseed_crypto::{KeyName, derive_base_key, derive_key_name};
use ticketseed_harness::SimEnv;

const ALPHABET: [&str; 6] = ["", "alpha", "beta", "gamma", "delta", "epsilon"];

#[derive(Debug, Arbitrary)]
struct Push {
    old: Vec<u8>,
    current: Vec<u8>,
    new: Vec<u8>,
}

impl Push {
    fn seeds(&self) -> TicketSeeds {
        let pick = |list: &[u8]| -> Vec<String> {
            list.iter()
                .take(4)
                .map(|&i| ALPHABET[usize::from(i) % ALPHABET.len()].to_string())
                .collect()
        };
        TicketSeeds {
            old_seeds: pick(&self.old),
            current_seeds: pick(&self.current),
            new_seeds: pick(&self.new),
        }
    }
}

fn key_name_of(secret: &str) -> KeyName {
    derive_key_name(&derive_base_key(secret.as_bytes()))
}

fn most_active(seeds: &TicketSeeds, secret: &str) -> Option<Classification> {
    [Classification::Current, Classification::New, Classification::Old]
        .into_iter()
        .find(|&c| seeds.list(c).iter().any(|s| s == secret))
}

fuzz_target!(|pushes: Vec<Push>| {
    let mut manager = TicketKeyManager::new(SimEnv::with_seed(0));

    for push in pushes.iter().take(16) {
        let seeds = push.seeds();
        let before = manager.seeds();
        let issued = manager.issue_ticket_keys().ok();
        let issuing_secret = issued.as_ref().and_then(|ticket| {
            before
                .current_seeds
                .iter()
                .find(|secret| key_name_of(secret) == ticket.key_name.key_name())
                .cloned()
        });

        match manager.set_ticket_seeds(&seeds) {
            Err(_) => {
                assert_eq!(manager.seeds(), before, "rejected push changed state");
            },
            Ok(_) => {
                assert_eq!(manager.seeds(), seeds);

                let registry = manager.registry().unwrap();
                let distinct: HashSet<_> =
                    Classification::ALL.iter().flat_map(|&c| seeds.list(c)).collect();
                assert_eq!(registry.len(), distinct.len());

                let fresh = manager.issue_ticket_keys().unwrap();
                let key = registry.lookup_for_decrypt(&fresh.key_name.key_name()).unwrap();
                assert_eq!(key.classification(), Classification::Current);

                if let (Some(ticket), Some(secret)) = (&issued, &issuing_secret) {
                    let recovered = manager.recover_ticket_keys(&ticket.key_name);
                    match most_active(&seeds, secret) {
                        None => assert!(recovered.is_err()),
                        Some(class) => {
                            let recovered = recovered.unwrap();
                            assert_eq!(recovered.renew, class == Classification::Old);
                            assert_eq!(
                                recovered.keys.cipher_key().as_bytes(),
                                ticket.keys.cipher_key().as_bytes()
                            );
                        },
                    }
                }
            },
        }
    }
});
