//! Simulated server fleet for rotation testing.
//!
//! Each server owns a [`TicketKeyManager`] with its own seeded environment.
//! Seed pushes are applied per server so tests can model a rollout that
//! reaches servers in any order, then check that tickets issued anywhere
//! still resume everywhere.

use std::fmt;

use ticketseed_core::{
    RotationError, RotationReport, TicketKeyManager, TicketMode, TicketSeeds, TicketStatus,
};
use ticketseed_crypto::{Iv, KeyNameField, TICKET_MAC_KEY_LEN};

use crate::{
    SimEnv,
    contexts::{CipherSetup, RecordingCipher, RecordingMac},
};

/// A ticket issued by one fleet server, with the keys the issuer used.
#[derive(Debug, Clone)]
pub struct FleetTicket {
    /// Index of the issuing server
    pub issuer: usize,
    /// Key-name field written into the ticket
    pub key_name: KeyNameField,
    /// IV written into the ticket
    pub iv: Iv,
    /// Cipher configuration at issue time
    pub cipher: CipherSetup,
    /// MAC key at issue time
    pub mac: [u8; TICKET_MAC_KEY_LEN],
}

/// Result of presenting a ticket to a fleet server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resumption {
    /// Status returned by the ticket callback
    pub status: TicketStatus,
    /// Whether the recovered cipher and MAC keys equal the issuer's
    pub keys_match: bool,
}

impl Resumption {
    /// Resumed with the issuer's keys.
    pub fn resumed(&self) -> bool {
        self.status.is_success() && self.keys_match
    }
}

/// Cross-server resumption failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Server that issued the ticket
    pub issuer: usize,
    /// Server that failed to resume it
    pub resumer: usize,
    /// Status the resumer returned
    pub status: TicketStatus,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticket from server {} did not resume on server {} (status {})",
            self.issuer,
            self.resumer,
            self.status.as_raw()
        )
    }
}

impl std::error::Error for Violation {}

/// Fleet of simulated servers.
pub struct TestFleet {
    servers: Vec<TicketKeyManager<SimEnv>>,
}

impl TestFleet {
    /// Create `size` servers, all configured with `seeds`.
    ///
    /// Server `i` draws randomness from `SimEnv::with_seed(seed + i)`.
    pub fn new(seed: u64, size: usize, seeds: &TicketSeeds) -> Result<Self, RotationError> {
        let servers = (0..size)
            .map(|i| {
                let env = SimEnv::with_seed(seed.wrapping_add(i as u64));
                TicketKeyManager::from_seeds(env, seeds)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { servers })
    }

    /// Number of servers.
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Whether the fleet has no servers.
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// One server's manager.
    pub fn server(&self, index: usize) -> &TicketKeyManager<SimEnv> {
        &self.servers[index]
    }

    /// Push seeds to one server.
    pub fn push(
        &mut self,
        server: usize,
        seeds: &TicketSeeds,
    ) -> Result<RotationReport, RotationError> {
        tracing::debug!(server, "Pushing seeds");
        self.servers[server].set_ticket_seeds(seeds)
    }

    /// Push seeds to every server in index order.
    pub fn push_all(&mut self, seeds: &TicketSeeds) -> Result<(), RotationError> {
        for server in 0..self.servers.len() {
            self.push(server, seeds)?;
        }
        Ok(())
    }

    /// Issue a ticket on one server.
    ///
    /// Returns `None` if the callback did not succeed.
    pub fn issue(&self, server: usize) -> Option<FleetTicket> {
        let mut key_name = KeyNameField::default();
        let mut iv = Iv::default();
        let mut cipher = RecordingCipher::new();
        let mut mac = RecordingMac::new();

        let status = self.servers[server].ticket_callback(
            &mut key_name,
            &mut iv,
            &mut cipher,
            &mut mac,
            TicketMode::Encrypt,
        );
        if status != TicketStatus::Success {
            return None;
        }

        Some(FleetTicket {
            issuer: server,
            key_name,
            iv,
            cipher: *cipher.setup()?,
            mac: *mac.key()?,
        })
    }

    /// Present a ticket to one server.
    pub fn resume(&self, server: usize, ticket: &FleetTicket) -> Resumption {
        let mut key_name = ticket.key_name;
        let mut iv = ticket.iv;
        let mut cipher = RecordingCipher::new();
        let mut mac = RecordingMac::new();

        let status = self.servers[server].ticket_callback(
            &mut key_name,
            &mut iv,
            &mut cipher,
            &mut mac,
            TicketMode::Decrypt,
        );
        let keys_match = cipher.setup().is_some_and(|s| s.key == ticket.cipher.key)
            && mac.key() == Some(&ticket.mac);

        Resumption { status, keys_match }
    }

    /// Check that a ticket from every server resumes on every server.
    ///
    /// # Errors
    ///
    /// The first issuer/resumer pair that fails. A server that cannot issue
    /// is reported with [`TicketStatus::Error`] against itself.
    pub fn check_cross_resumption(&self) -> Result<(), Violation> {
        for issuer in 0..self.servers.len() {
            let ticket = self.issue(issuer).ok_or(Violation {
                issuer,
                resumer: issuer,
                status: TicketStatus::Error,
            })?;

            for resumer in 0..self.servers.len() {
                let resumption = self.resume(resumer, &ticket);
                if !resumption.resumed() {
                    return Err(Violation { issuer, resumer, status: resumption.status });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for TestFleet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestFleet").field("servers", &self.servers.len()).finish()
    }
}
