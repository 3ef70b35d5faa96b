//! Environment abstraction for deterministic testing.
//!
//! Decouples key management from system resources. Salts, IVs and randomized
//! key selection all draw from [`Environment::random_bytes`], so a seeded
//! simulation environment makes every ticket reproducible while production
//! uses OS entropy.

use crate::error::EntropyError;

/// Abstract environment providing randomness.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `random_bytes()` uses cryptographically secure entropy in production
/// - `random_bytes()` never blocks indefinitely; failures are reported as
///   [`EntropyError`] rather than by panicking
pub trait Environment: Clone + Send + Sync + 'static {
    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same RNG seed, this produces the same sequence of bytes
    /// - On error the buffer contents are unspecified and must not be used
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError>;

    /// Generates a random index in `0..bound`.
    ///
    /// Used to spread encryptions across several active keys. Modulo bias is
    /// negligible for the handful of keys a rotation carries.
    fn random_index(&self, bound: usize) -> Result<usize, EntropyError> {
        if bound <= 1 {
            return Ok(0);
        }
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes)?;
        Ok((u64::from_be_bytes(bytes) % bound as u64) as usize)
    }
}
