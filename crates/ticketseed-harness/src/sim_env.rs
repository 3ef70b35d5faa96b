//! Seeded environment for reproducible ticket tests.

use std::sync::{Arc, Mutex, PoisonError};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use ticketseed_core::{EntropyError, Environment};

/// Deterministic environment backed by a seeded ChaCha20 stream.
///
/// Clones share the stream, so every manager built from one `SimEnv` draws
/// from a single reproducible sequence. Two environments created with the
/// same seed produce identical salts, IVs and key choices.
#[derive(Clone)]
pub struct SimEnv {
    rng: Arc<Mutex<ChaCha20Rng>>,
    exhausted: Arc<Mutex<bool>>,
}

impl SimEnv {
    /// Create an environment with a fixed default seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Create an environment from a specific seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))),
            exhausted: Arc::new(Mutex::new(false)),
        }
    }

    /// Make every subsequent draw fail, simulating a dead entropy source.
    pub fn exhaust(&self) {
        *self.exhausted.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }

    /// Restore the entropy source after [`SimEnv::exhaust`].
    pub fn restore(&self) {
        *self.exhausted.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        if *self.exhausted.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(EntropyError::new("simulated entropy exhaustion"));
        }
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).fill_bytes(buffer);
        Ok(())
    }
}
