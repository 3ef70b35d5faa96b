//! rustls session-ticket producer backed by a [`TicketKeyManager`].
//!
//! rustls hands the ticketer plaintext session state, so tickets are sealed
//! with [`seal_ticket`] and opened with [`open_ticket`]. Every server built
//! from the same seeds accepts tickets issued by any other.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};

use rustls::server::ProducesTickets;
use ticketseed_core::{
    Environment, RotationError, RotationReport, SealError, TicketKeyManager, TicketSeeds,
    open_ticket, seal_ticket,
};

use crate::SystemEnv;

/// Default ticket lifetime hint sent to clients (12 hours).
pub const DEFAULT_TICKET_LIFETIME_SECS: u32 = 12 * 60 * 60;

/// Session-ticket producer for `rustls::ServerConfig::ticketer`.
///
/// The manager sits behind a mutex: handshakes and rotation never touch it
/// concurrently.
pub struct RustlsTicketer<E: Environment = SystemEnv> {
    manager: Mutex<TicketKeyManager<E>>,
    lifetime: u32,
}

impl RustlsTicketer<SystemEnv> {
    /// Create a ticketer from a seed record using OS entropy.
    pub fn from_seeds(seeds: &TicketSeeds) -> Result<Self, RotationError> {
        Ok(Self::new(TicketKeyManager::from_seeds(SystemEnv::new(), seeds)?))
    }
}

impl<E: Environment> RustlsTicketer<E> {
    /// Wrap an existing manager.
    pub fn new(manager: TicketKeyManager<E>) -> Self {
        Self { manager: Mutex::new(manager), lifetime: DEFAULT_TICKET_LIFETIME_SECS }
    }

    /// Set the ticket lifetime hint in seconds.
    #[must_use]
    pub fn with_lifetime(mut self, lifetime_secs: u32) -> Self {
        self.lifetime = lifetime_secs;
        self
    }

    /// Install a new generation of seeds.
    ///
    /// # Errors
    ///
    /// See [`TicketKeyManager::set_seeds`]. On error the installed keys keep
    /// serving handshakes.
    pub fn rotate<S: AsRef<str>>(
        &self,
        old: &[S],
        current: &[S],
        new: &[S],
    ) -> Result<RotationReport, RotationError> {
        self.lock().set_seeds(old, current, new)
    }

    /// Install a new generation of seeds from a seed record.
    pub fn rotate_seeds(&self, seeds: &TicketSeeds) -> Result<RotationReport, RotationError> {
        self.lock().set_ticket_seeds(seeds)
    }

    /// Copies of the installed seed lists.
    pub fn seeds(&self) -> TicketSeeds {
        self.lock().seeds()
    }

    fn lock(&self) -> MutexGuard<'_, TicketKeyManager<E>> {
        // Generations are swapped whole; a poisoned manager is still consistent.
        self.manager.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: Environment> ProducesTickets for RustlsTicketer<E> {
    fn enabled(&self) -> bool {
        true
    }

    fn lifetime(&self) -> u32 {
        self.lifetime
    }

    fn encrypt(&self, plain: &[u8]) -> Option<Vec<u8>> {
        let manager = self.lock();
        match seal_ticket(&manager, plain) {
            Ok(ticket) => Some(ticket),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to seal session ticket");
                None
            },
        }
    }

    fn decrypt(&self, cipher: &[u8]) -> Option<Vec<u8>> {
        let manager = self.lock();
        match open_ticket(&manager, cipher) {
            Ok(opened) => {
                if opened.renew {
                    tracing::debug!("Resumed from retiring ticket key");
                }
                Some(opened.state)
            },
            Err(SealError::UnknownKey) => None,
            Err(err) => {
                tracing::debug!(error = %err, "Rejected session ticket");
                None
            },
        }
    }
}

impl<E: Environment> fmt::Debug for RustlsTicketer<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RustlsTicketer").field("lifetime", &self.lifetime).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use ticketseed_harness::SimEnv;

    use super::*;

    fn seeds(old: &[&str], current: &[&str]) -> TicketSeeds {
        TicketSeeds {
            old_seeds: old.iter().map(|s| (*s).to_string()).collect(),
            current_seeds: current.iter().map(|s| (*s).to_string()).collect(),
            new_seeds: Vec::new(),
        }
    }

    fn ticketer(seed: u64, old: &[&str], current: &[&str]) -> RustlsTicketer<SimEnv> {
        let manager =
            TicketKeyManager::from_seeds(SimEnv::with_seed(seed), &seeds(old, current)).unwrap();
        RustlsTicketer::new(manager)
    }

    #[test]
    fn peers_with_same_seeds_share_tickets() {
        let a = ticketer(1, &[], &["alpha"]);
        let b = ticketer(2, &[], &["alpha"]);

        let ticket = a.encrypt(b"session").unwrap();

        assert_eq!(b.decrypt(&ticket).unwrap(), b"session");
    }

    #[test]
    fn rotation_keeps_issued_tickets_until_dropped() {
        let ticketer = ticketer(3, &[], &["alpha"]);
        let ticket = ticketer.encrypt(b"session").unwrap();

        ticketer.rotate(&["alpha"], &["beta"], &[]).unwrap();
        assert_eq!(ticketer.decrypt(&ticket).unwrap(), b"session");

        ticketer.rotate(&[], &["beta"], &[]).unwrap();
        assert!(ticketer.decrypt(&ticket).is_none());
    }

    #[test]
    fn failed_rotation_keeps_serving() {
        let ticketer = ticketer(4, &[], &["alpha"]);

        assert!(ticketer.rotate::<&str>(&["alpha"], &[], &[]).is_err());

        assert_eq!(ticketer.seeds().current_seeds, vec!["alpha"]);
        assert!(ticketer.encrypt(b"session").is_some());
    }

    #[test]
    fn garbage_ticket_is_rejected() {
        let ticketer = ticketer(5, &[], &["alpha"]);

        assert!(ticketer.decrypt(&[]).is_none());
        assert!(ticketer.decrypt(&[0u8; 200]).is_none());
    }

    #[test]
    fn lifetime_defaults_to_twelve_hours() {
        let ticketer = ticketer(6, &[], &["alpha"]);
        assert!(ticketer.enabled());
        assert_eq!(ticketer.lifetime(), 43_200);
        assert_eq!(ticketer.with_lifetime(600).lifetime(), 600);
    }

    #[test]
    fn debug_output_omits_secrets() {
        let rendered = format!("{:?}", ticketer(7, &[], &["hunter2"]));
        assert!(!rendered.contains("hunter2"));
    }
}
