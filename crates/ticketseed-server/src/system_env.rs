//! Production Environment implementation using the OS RNG.
//!
//! `SystemEnv` draws salts, IVs and key choices from getrandom. Output is not
//! reproducible; tests use the seeded environment from the harness crate.

use ticketseed_core::{EntropyError, Environment};

/// Production environment using cryptographic RNG.
///
/// # Security
///
/// getrandom provides OS-level cryptographic randomness (e.g. the
/// `getrandom` syscall on Linux, `BCryptGenRandom` on Windows), suitable for
/// ticket salts and IVs.
///
/// RNG failure is reported as an [`EntropyError`]: the ticket callback fails
/// for that handshake only and the client falls back to a full handshake.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::disallowed_methods)]
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        getrandom::fill(buffer).map_err(|e| EntropyError::new(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_env_random_bytes_are_random() {
        let env = SystemEnv::new();

        let mut bytes1 = [0u8; 32];
        let mut bytes2 = [0u8; 32];

        env.random_bytes(&mut bytes1).unwrap();
        env.random_bytes(&mut bytes2).unwrap();

        // Extremely unlikely to be equal if random
        assert_ne!(bytes1, bytes2, "Random bytes should differ");
    }

    #[test]
    fn system_env_random_index_in_bounds() {
        let env = SystemEnv::new();

        for _ in 0..100 {
            assert!(env.random_index(3).unwrap() < 3);
        }
    }
}
