//! Ticketseed production glue.
//!
//! Wraps [`ticketseed_core`]'s key manager with OS entropy and plugs it into
//! rustls as a session-ticket producer.
//!
//! # Components
//!
//! - [`SystemEnv`]: production environment (getrandom)
//! - [`RustlsTicketer`]: `rustls::server::ProducesTickets` over a shared
//!   manager, with in-place rotation
//! - [`load_seed_file`]: JSON seed file loader
//! - [`commands`]: operator commands behind the `ticketseed` binary

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod commands;
mod error;
mod seed_file;
mod system_env;
mod ticketer;

pub use error::CliError;
pub use seed_file::load_seed_file;
pub use system_env::SystemEnv;
pub use ticketer::{DEFAULT_TICKET_LIFETIME_SECS, RustlsTicketer};
