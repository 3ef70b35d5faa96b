//! Error types for ticket key management.
//!
//! Rotation errors are configuration problems reported to the operator.
//! Dispatch errors never cross the ticket callback boundary as anything
//! other than a [`TicketStatus`]: see [`DispatchError::status`].

use thiserror::Error;
use ticketseed_crypto::KeyName;

use crate::{dispatch::TicketStatus, seed::Classification};

/// Errors that reject a seed rotation. The installed keys are left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RotationError {
    /// No seed was supplied for the current classification
    #[error("rotation requires at least one current seed")]
    NoCurrentSeeds,

    /// A supplied seed secret was empty
    #[error("empty {classification} seed at position {index}")]
    EmptySeed {
        /// List the empty seed was found in
        classification: Classification,
        /// Position within that list
        index: usize,
    },
}

/// The entropy source could not produce random bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("entropy source failed: {reason}")]
pub struct EntropyError {
    reason: String,
}

impl EntropyError {
    /// Create an entropy error with a human-readable cause.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// A cipher or MAC primitive rejected its configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{primitive} failed: {reason}")]
pub struct PrimitiveError {
    primitive: &'static str,
    reason: String,
}

impl PrimitiveError {
    /// Create a primitive error naming the failing primitive.
    pub fn new(primitive: &'static str, reason: impl Into<String>) -> Self {
        Self { primitive, reason: reason.into() }
    }

    /// Name of the primitive that failed (e.g. `"cipher"`, `"mac"`).
    pub fn primitive(&self) -> &'static str {
        self.primitive
    }
}

/// Errors from a single ticket encryption or decryption.
///
/// Every variant is scoped to one call: the manager stays usable afterwards.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No key is eligible for encryption (manager never initialized)
    #[error("no ticket key eligible for encryption")]
    NoEncryptionKey,

    /// The ticket names a key this manager does not hold.
    ///
    /// Expected under rotation skew. The TLS engine falls back to a full
    /// handshake.
    #[error("unknown ticket key name {0}")]
    UnknownKey(KeyName),

    /// Salt or IV generation failed
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    /// The external cipher or MAC context rejected its keys
    #[error(transparent)]
    Primitive(#[from] PrimitiveError),
}

impl DispatchError {
    /// Status reported to the TLS engine for this error.
    pub fn status(&self) -> TicketStatus {
        match self {
            Self::UnknownKey(_) => TicketStatus::UnknownKey,
            Self::NoEncryptionKey | Self::Entropy(_) | Self::Primitive(_) => TicketStatus::Error,
        }
    }
}
