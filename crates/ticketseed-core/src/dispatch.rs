//! Ticket dispatch: the per-handshake entry point invoked by the TLS engine.
//!
//! The dispatcher is stateless per call. It runs inline on the handshake path,
//! so it only hashes: no I/O, no blocking, no allocation beyond the key
//! buffers themselves.
//!
//! # Wire Layout
//!
//! ```text
//! key_name field (16 bytes)
//! ┌────────────┬──────────────────────────┐
//! │ name (4)   │ salt (12)                │
//! └────────────┴──────────────────────────┘
//! ```
//!
//! The name selects the derived key; the salt reproduces the per-ticket
//! cipher and MAC keys. Key material itself never appears on the wire.

use ticketseed_crypto::{CipherKey, Iv, KeyNameField, MacKey, Salt, TicketKeys};

use crate::{
    env::Environment,
    error::{DispatchError, PrimitiveError},
    manager::TicketKeyManager,
    seed::Classification,
    stats::TicketEvent,
};

/// Direction of a ticket callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketMode {
    /// Issue a new ticket
    Encrypt,
    /// Resume from a presented ticket
    Decrypt,
}

/// Status returned to the TLS engine.
///
/// Discriminants match the OpenSSL ticket-key callback contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TicketStatus {
    /// Processing failed for this call only
    Error = -1,
    /// Ticket key not recognized; fall back to a full handshake
    UnknownKey = 0,
    /// Keys configured; proceed
    Success = 1,
    /// Decrypted with a retiring key; proceed and issue a fresh ticket
    Renew = 2,
}

impl TicketStatus {
    /// Raw integer status for the TLS engine.
    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Whether the ticket keys were configured.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::Renew)
    }
}

/// Capability to configure the TLS engine's ticket cipher context.
pub trait TicketCipher {
    /// Key the cipher for one ticket.
    fn configure(
        &mut self,
        mode: TicketMode,
        key: &CipherKey,
        iv: &Iv,
    ) -> Result<(), PrimitiveError>;
}

/// Capability to configure the TLS engine's ticket MAC context.
pub trait TicketMac {
    /// Key the MAC for one ticket.
    fn configure(&mut self, key: &MacKey) -> Result<(), PrimitiveError>;
}

/// Key material for a newly issued ticket.
#[derive(Debug, Clone)]
pub struct IssuedTicketKeys {
    /// Key-name field to embed in the ticket
    pub key_name: KeyNameField,
    /// Fresh IV for the ticket cipher
    pub iv: Iv,
    /// Per-ticket cipher and MAC keys
    pub keys: TicketKeys,
}

/// Key material recovered for a presented ticket.
#[derive(Debug, Clone)]
pub struct RecoveredTicketKeys {
    /// Per-ticket cipher and MAC keys
    pub keys: TicketKeys,
    /// The naming key is retiring; issue a fresh ticket on this connection
    pub renew: bool,
}

impl<E: Environment> TicketKeyManager<E> {
    /// Ticket callback invoked by the TLS engine once per handshake.
    ///
    /// In [`TicketMode::Encrypt`] mode `key_name` and `iv` are outputs: they
    /// receive the key-name field and a fresh IV for the new ticket. In
    /// [`TicketMode::Decrypt`] mode they are the values read from the
    /// presented ticket.
    ///
    /// Never fails outside the returned status; the manager stays usable after
    /// any status.
    pub fn ticket_callback<C, M>(
        &self,
        key_name: &mut KeyNameField,
        iv: &mut Iv,
        cipher: &mut C,
        mac: &mut M,
        mode: TicketMode,
    ) -> TicketStatus
    where
        C: TicketCipher + ?Sized,
        M: TicketMac + ?Sized,
    {
        let result = match mode {
            TicketMode::Encrypt => self.issue_keys().and_then(|issued| {
                configure(cipher, mac, mode, &issued.keys, &issued.iv)?;
                *key_name = issued.key_name;
                *iv = issued.iv;
                Ok(TicketStatus::Success)
            }),
            TicketMode::Decrypt => self.recover_keys(key_name).and_then(|recovered| {
                configure(cipher, mac, mode, &recovered.keys, iv)?;
                Ok(if recovered.renew { TicketStatus::Renew } else { TicketStatus::Success })
            }),
        };

        let status = result.unwrap_or_else(|err| {
            self.log_failure(mode, &err);
            err.status()
        });
        self.record(mode, status);
        status
    }

    /// Derive keys for a new ticket.
    ///
    /// # Errors
    ///
    /// - `NoEncryptionKey`: no seeds installed
    /// - `Entropy`: salt, IV or key selection randomness unavailable
    pub fn issue_ticket_keys(&self) -> Result<IssuedTicketKeys, DispatchError> {
        let result = self.issue_keys();
        self.record_result(TicketMode::Encrypt, &result, |_| TicketStatus::Success);
        result
    }

    /// Recover keys for a presented ticket from its key-name field.
    ///
    /// # Errors
    ///
    /// - `UnknownKey`: the ticket names a key this manager does not hold
    pub fn recover_ticket_keys(
        &self,
        key_name: &KeyNameField,
    ) -> Result<RecoveredTicketKeys, DispatchError> {
        let result = self.recover_keys(key_name);
        self.record_result(TicketMode::Decrypt, &result, |r| {
            if r.renew { TicketStatus::Renew } else { TicketStatus::Success }
        });
        result
    }

    fn issue_keys(&self) -> Result<IssuedTicketKeys, DispatchError> {
        let registry = self.registry().ok_or(DispatchError::NoEncryptionKey)?;
        let key = registry
            .select_for_encrypt(self.policy(), self.env())?
            .ok_or(DispatchError::NoEncryptionKey)?;

        let salt = Salt::generate(|buf| self.env().random_bytes(buf))?;
        let iv = Iv::generate(|buf| self.env().random_bytes(buf))?;

        tracing::trace!(key_name = %key.name(), "Issuing ticket");

        Ok(IssuedTicketKeys {
            key_name: KeyNameField::compose(key.name(), salt),
            iv,
            keys: key.ticket_keys(&salt),
        })
    }

    fn recover_keys(&self, key_name: &KeyNameField) -> Result<RecoveredTicketKeys, DispatchError> {
        let (name, salt) = key_name.split();
        let key = self
            .registry()
            .and_then(|r| r.lookup_for_decrypt(&name))
            .ok_or(DispatchError::UnknownKey(name))?;

        let renew = key.classification() == Classification::Old;
        tracing::trace!(key_name = %name, renew, "Recovering ticket keys");

        Ok(RecoveredTicketKeys { keys: key.ticket_keys(&salt), renew })
    }

    fn record_result<T>(
        &self,
        mode: TicketMode,
        result: &Result<T, DispatchError>,
        success: impl FnOnce(&T) -> TicketStatus,
    ) {
        let status = match result {
            Ok(value) => success(value),
            Err(err) => {
                self.log_failure(mode, err);
                err.status()
            },
        };
        self.record(mode, status);
    }

    fn log_failure(&self, mode: TicketMode, err: &DispatchError) {
        match err {
            DispatchError::UnknownKey(name) => {
                tracing::debug!(key_name = %name, "Ticket names unknown key");
            },
            _ => tracing::warn!(?mode, error = %err, "Ticket callback failed"),
        }
    }

    fn record(&self, mode: TicketMode, status: TicketStatus) {
        let Some(stats) = self.stats() else {
            return;
        };
        let event = match (mode, status) {
            (_, TicketStatus::Error) => TicketEvent::Failed,
            (_, TicketStatus::UnknownKey) => TicketEvent::UnknownKey,
            (TicketMode::Encrypt, _) => TicketEvent::Issued,
            (TicketMode::Decrypt, TicketStatus::Renew) => TicketEvent::Renewed,
            (TicketMode::Decrypt, TicketStatus::Success) => TicketEvent::Resumed,
        };
        stats.record_ticket(event);
    }
}

fn configure<C, M>(
    cipher: &mut C,
    mac: &mut M,
    mode: TicketMode,
    keys: &TicketKeys,
    iv: &Iv,
) -> Result<(), PrimitiveError>
where
    C: TicketCipher + ?Sized,
    M: TicketMac + ?Sized,
{
    mac.configure(keys.mac_key())?;
    cipher.configure(mode, keys.cipher_key(), iv)
}
