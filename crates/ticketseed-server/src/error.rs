//! CLI error types.

use std::{io, path::PathBuf};

use thiserror::Error;
use ticketseed_core::{RotationError, SealError};

/// Errors reported by the `ticketseed` binary.
#[derive(Error, Debug)]
pub enum CliError {
    /// The seed file could not be read
    #[error("failed to read seed file {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The seed file is not a valid seed record
    #[error("invalid seed file {path}: {source}")]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// The seed lists were rejected
    #[error("seed lists rejected: {0}")]
    Rotation(#[from] RotationError),

    /// Sealing or opening a ticket failed
    #[error("ticket: {0}")]
    Seal(#[from] SealError),

    /// A ticket argument was not valid hex
    #[error("ticket is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}
