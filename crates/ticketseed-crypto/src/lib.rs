//! Ticketseed Cryptographic Primitives
//!
//! Key derivation for TLS session-ticket keys shared across a server fleet.
//! Pure functions with deterministic outputs. Callers provide random bytes
//! for salts and IVs so that derivation can be tested deterministically.
//!
//! # Key Hierarchy
//!
//! Every server holding the same seed derives the same base key and the same
//! public key name. Per-ticket keys are never stored: they are recomputed from
//! the base key and the salt that travels in the ticket's key-name field.
//!
//! ```text
//! Seed (operator secret)
//!        │
//!        ▼
//! SHA-256^N → Base Key ──────────────┐
//!        │                           │
//!        ▼                           ▼
//! SHA-256^N → Key Name (4 bytes)    SHA-256(Base Key ‖ Salt)
//!        │                           │
//!        ▼                           ▼
//! key_name field = Key Name ‖ Salt   MAC Key (16) ‖ Cipher Key (16)
//! ```
//!
//! # Security
//!
//! - Base keys and per-ticket keys are zeroized on drop
//! - Only the key name and salt appear on the wire
//! - A fresh salt per ticket gives every ticket its own cipher/MAC keys
//! - The key name is a second chain application, so it reveals nothing about
//!   the base key beyond what SHA-256 preimage resistance allows

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod derivation;
pub mod keys;

pub use derivation::{
    HASH_CHAIN_DEPTH, derive_base_key, derive_key_name, derive_ticket_keys, hash_chain,
    seed_digest,
};
pub use keys::{
    BaseKey, CipherKey, DIGEST_LEN, IV_LEN, Iv, KEY_NAME_FIELD_LEN, KEY_NAME_LEN, KeyName,
    KeyNameField, MacKey, SALT_LEN, Salt, SeedDigest, TICKET_CIPHER_KEY_LEN, TICKET_MAC_KEY_LEN,
    TicketKeys,
};
