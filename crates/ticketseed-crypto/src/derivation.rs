//! Hash-chain key derivation for shared ticket keys
//!
//! Every function here is deterministic: two servers holding the same seed
//! derive byte-identical base keys, key names and per-ticket keys.

use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::keys::{BaseKey, DIGEST_LEN, KEY_NAME_LEN, KeyName, Salt, SeedDigest, TicketKeys};

/// Number of hash applications from a seed to its base key, and from a base
/// key to its name.
pub const HASH_CHAIN_DEPTH: u32 = 1;

/// Apply SHA-256 `n` times, feeding each output back as the next input.
///
/// `n` is clamped to at least one application, so the output is always a
/// full digest regardless of input length.
pub fn hash_chain(input: &[u8], n: u32) -> [u8; DIGEST_LEN] {
    debug_assert!(n >= 1, "hash chain depth must be at least one");

    let mut digest: [u8; DIGEST_LEN] = Sha256::digest(input).into();
    for _ in 1..n {
        digest = Sha256::digest(digest).into();
    }
    digest
}

/// Digest identifying a seed secret.
pub fn seed_digest(secret: &[u8]) -> SeedDigest {
    SeedDigest(Sha256::digest(secret).into())
}

/// Derive the base key for a seed secret.
pub fn derive_base_key(secret: &[u8]) -> BaseKey {
    BaseKey(hash_chain(secret, HASH_CHAIN_DEPTH))
}

/// Derive the public name of a base key.
///
/// The name is the first [`KEY_NAME_LEN`] bytes of a second chain
/// application over the base key.
pub fn derive_key_name(base_key: &BaseKey) -> KeyName {
    let mut digest = hash_chain(base_key.as_bytes(), HASH_CHAIN_DEPTH);

    let mut name = [0u8; KEY_NAME_LEN];
    name.copy_from_slice(&digest[..KEY_NAME_LEN]);
    digest.zeroize();

    KeyName::new(name)
}

/// Derive the cipher and MAC keys for a single ticket.
///
/// Computes `SHA-256(base_key ‖ salt)` and splits it: the first half is the
/// MAC key, the second half the cipher key. Decryption reproduces the same
/// pair from the salt carried in the key-name field.
pub fn derive_ticket_keys(base_key: &BaseKey, salt: &Salt) -> TicketKeys {
    let mut hasher = Sha256::new();
    hasher.update(base_key.as_bytes());
    hasher.update(salt.as_bytes());
    let mut digest: [u8; DIGEST_LEN] = hasher.finalize().into();

    let keys = TicketKeys::from_digest(&digest);
    digest.zeroize();
    keys
}
