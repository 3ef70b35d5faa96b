//! Deterministic simulation harness for ticketseed testing.
//!
//! Seeded implementations of the [`ticketseed_core::Environment`] trait plus
//! recording stand-ins for the TLS engine's cipher and MAC contexts, so that
//! every salt, IV and derived key in a test is reproducible.
//!
//! # Fleet Testing
//!
//! The `fleet` module models a group of servers receiving seed pushes in any
//! order. [`TestFleet::check_cross_resumption`] verifies the property the
//! rotation scheme exists for: a ticket issued by any server resumes on every
//! other server.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod contexts;
pub mod fleet;
pub mod sim_env;
pub mod stats;

pub use contexts::{CipherSetup, RecordingCipher, RecordingMac};
pub use fleet::{FleetTicket, Resumption, TestFleet, Violation};
pub use sim_env::SimEnv;
pub use stats::RecordingStats;
