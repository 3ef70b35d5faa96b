//! Fuzz target for the decrypt side of the ticket callback
//!
//! # Strategy
//!
//! - Arbitrary key-name fields and IVs presented to a manager holding a mix
//!   of old, current and new keys
//! - Valid key names with arbitrary salts
//!
//! # Invariants
//!
//! - Status is always one of 0, 1, 2 (never an error for a decrypt)
//! - Unknown names never configure the cipher or MAC
//! - Known names resolve to renew exactly when the key is old

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ticketseed_core::{Classification, TicketKeyManager, TicketMode, TicketStatus};
use ticketseed_crypto::{Iv, KeyNameField};
use ticketseed_harness::{RecordingCipher, RecordingMac, SimEnv};

#[derive(Debug, Arbitrary)]
struct Input {
    field: [u8; 16],
    iv: [u8; 16],
    use_known_name: Option<u8>,
}

fuzz_target!(|input: Input| {
    let mut manager = TicketKeyManager::new(SimEnv::with_seed(0));
    manager.set_seeds(&["retired"], &["alpha", "beta"], &["next"]).unwrap();
    let registry = manager.registry().unwrap();

    let mut field = input.field;
    if let Some(choice) = input.use_known_name {
        let names: Vec<_> = registry.keys().map(|k| k.name()).collect();
        let name = names[usize::from(choice) % names.len()];
        field[..4].copy_from_slice(name.as_bytes());
    }

    let mut key_name = KeyNameField::from_bytes(field);
    let mut iv = Iv::from_bytes(input.iv);
    let mut cipher = RecordingCipher::new();
    let mut mac = RecordingMac::new();
    let status =
        manager.ticket_callback(&mut key_name, &mut iv, &mut cipher, &mut mac, TicketMode::Decrypt);

    match registry.lookup_for_decrypt(&key_name.key_name()) {
        None => {
            assert_eq!(status, TicketStatus::UnknownKey);
            assert!(!cipher.is_configured());
            assert!(mac.key().is_none());
        },
        Some(key) => {
            let expected = if key.classification() == Classification::Old {
                TicketStatus::Renew
            } else {
                TicketStatus::Success
            };
            assert_eq!(status, expected);
            assert_eq!(cipher.setup().map(|s| s.iv), Some(Iv::from_bytes(input.iv)));
        },
    }
    assert_eq!(key_name, KeyNameField::from_bytes(field), "decrypt must not rewrite the field");
});
