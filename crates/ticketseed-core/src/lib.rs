//! Ticketseed core: TLS session-ticket keys shared across a server fleet.
//!
//! Every server in a fleet is configured with the same seed secrets. Each
//! seed deterministically yields a derived key with a short public name, so a
//! ticket issued by one server names a key every other server also holds and
//! resumes anywhere.
//!
//! # Seed Classifications
//!
//! - **current**: used to issue new tickets, accepted for resumption
//! - **new**: accepted for resumption; lets servers that rotated first issue
//!   tickets the rest of the fleet already understands
//! - **old**: accepted for resumption with a renewal hint, so clients migrate
//!   to a current key before the old seed is dropped
//!
//! # Rotation
//!
//! Rotating without breaking resumption takes three pushes to the fleet:
//!
//! ```text
//! push 1:  old = []       current = [A]     new = [B]
//! push 2:  old = [A]      current = [B]     new = []
//! push 3:  old = []       current = [B]     new = []   (after ticket lifetime)
//! ```
//!
//! Between pushes every server accepts every ticket any other server can
//! issue, regardless of the order in which servers pick up the push.
//!
//! # Components
//!
//! - [`TicketKeyManager`]: installed seeds and keys, rotation
//! - [`TicketKeyManager::ticket_callback`]: per-handshake dispatch
//! - [`KeyRegistry`]: key-name lookup and encryption key selection
//! - [`seal_ticket`] / [`open_ticket`]: software sealing for stacks that hand
//!   over plaintext session state
//! - [`Environment`]: randomness source, seeded in simulation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod manager;
pub mod registry;
pub mod sealer;
pub mod seed;
pub mod stats;

pub use config::{ManagerConfig, TicketSeeds};
pub use dispatch::{
    IssuedTicketKeys, RecoveredTicketKeys, TicketCipher, TicketMac, TicketMode, TicketStatus,
};
pub use env::Environment;
pub use error::{DispatchError, EntropyError, PrimitiveError, RotationError};
pub use manager::{SharedStats, TicketKeyManager};
pub use registry::{DerivedKey, EncryptionKeyPolicy, KeyRegistry, Rebuild};
pub use sealer::{MIN_TICKET_LEN, OpenedTicket, SealError, open_ticket, seal_ticket};
pub use seed::{Classification, Seed, SeedStore};
pub use stats::{NoopStats, RotationReport, SeedDelta, TicketEvent, TicketStats};
pub use ticketseed_crypto as crypto;
