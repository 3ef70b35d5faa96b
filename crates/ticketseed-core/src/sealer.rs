//! Software ticket sealing on top of the ticket callback.
//!
//! For TLS stacks whose ticket hook hands over plaintext session state rather
//! than cipher contexts. The sealer drives [`TicketKeyManager::ticket_callback`]
//! with in-process cipher and MAC contexts, so tickets sealed here carry the
//! same key-name field as tickets from any other server in the fleet.
//!
//! # Ticket Format
//!
//! ```text
//! key_name (16) ‖ iv (16) ‖ AES-128-GCM(state) ‖ HMAC-SHA256 tag (32)
//! ```
//!
//! The GCM nonce is the first 12 bytes of the IV. The HMAC covers everything
//! before it and is checked before any decryption is attempted.

use aes_gcm::{Aes128Gcm, KeyInit, Nonce, aead::Aead};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use ticketseed_crypto::{CipherKey, IV_LEN, Iv, KEY_NAME_FIELD_LEN, KeyNameField, MacKey};

use crate::{
    dispatch::{TicketCipher, TicketMac, TicketMode, TicketStatus},
    env::Environment,
    error::PrimitiveError,
    manager::TicketKeyManager,
};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 tag size (32 bytes)
const TAG_LEN: usize = 32;

/// AES-GCM authentication tag size (16 bytes)
const GCM_TAG_LEN: usize = 16;

/// GCM nonce size, taken from the front of the IV (12 bytes)
const GCM_NONCE_LEN: usize = 12;

/// Smallest well-formed ticket: empty state.
pub const MIN_TICKET_LEN: usize = KEY_NAME_FIELD_LEN + IV_LEN + GCM_TAG_LEN + TAG_LEN;

/// Errors from sealing or opening a ticket.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SealError {
    /// Ticket shorter than the fixed framing
    #[error("ticket too short: {len} bytes, need at least {MIN_TICKET_LEN}")]
    Truncated {
        /// Length of the rejected ticket
        len: usize,
    },

    /// Ticket names a key this manager does not hold
    #[error("ticket key not recognized")]
    UnknownKey,

    /// The ticket callback failed
    #[error("ticket callback failed")]
    CallbackFailed,

    /// HMAC or GCM tag mismatch
    #[error("ticket authentication failed")]
    Authentication,

    /// The cipher rejected the state
    #[error("ticket encryption failed")]
    Encryption,
}

/// Session state recovered from a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedTicket {
    /// Decrypted session state
    pub state: Vec<u8>,
    /// Sealed under a retiring key; issue a fresh ticket
    pub renew: bool,
}

#[derive(Default)]
struct SoftwareCipher {
    key: Option<Aes128Gcm>,
    iv: Iv,
}

impl SoftwareCipher {
    fn cipher(&self) -> Result<&Aes128Gcm, SealError> {
        self.key.as_ref().ok_or(SealError::CallbackFailed)
    }

    fn nonce(&self) -> &Nonce<aes_gcm::aead::consts::U12> {
        Nonce::from_slice(&self.iv.as_bytes()[..GCM_NONCE_LEN])
    }
}

impl TicketCipher for SoftwareCipher {
    fn configure(
        &mut self,
        _mode: TicketMode,
        key: &CipherKey,
        iv: &Iv,
    ) -> Result<(), PrimitiveError> {
        let cipher = Aes128Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| PrimitiveError::new("cipher", e.to_string()))?;
        self.key = Some(cipher);
        self.iv = *iv;
        Ok(())
    }
}

#[derive(Default)]
struct SoftwareMac {
    mac: Option<HmacSha256>,
}

impl SoftwareMac {
    fn take(&mut self) -> Result<HmacSha256, SealError> {
        self.mac.take().ok_or(SealError::CallbackFailed)
    }
}

impl TicketMac for SoftwareMac {
    fn configure(&mut self, key: &MacKey) -> Result<(), PrimitiveError> {
        let mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
            .map_err(|e| PrimitiveError::new("mac", e.to_string()))?;
        self.mac = Some(mac);
        Ok(())
    }
}

/// Seal session state into a ticket under the manager's encryption key.
///
/// # Errors
///
/// - `CallbackFailed`: no encryption key installed, or entropy failure
/// - `Encryption`: the cipher rejected the state
pub fn seal_ticket<E: Environment>(
    manager: &TicketKeyManager<E>,
    state: &[u8],
) -> Result<Vec<u8>, SealError> {
    let mut key_name = KeyNameField::default();
    let mut iv = Iv::default();
    let mut cipher = SoftwareCipher::default();
    let mut mac = SoftwareMac::default();

    let status = manager.ticket_callback(
        &mut key_name,
        &mut iv,
        &mut cipher,
        &mut mac,
        TicketMode::Encrypt,
    );
    if !status.is_success() {
        return Err(SealError::CallbackFailed);
    }

    let ciphertext =
        cipher.cipher()?.encrypt(cipher.nonce(), state).map_err(|_| SealError::Encryption)?;

    let mut ticket = Vec::with_capacity(MIN_TICKET_LEN + state.len());
    ticket.extend_from_slice(key_name.as_bytes());
    ticket.extend_from_slice(iv.as_bytes());
    ticket.extend_from_slice(&ciphertext);

    let mut tag = mac.take()?;
    tag.update(&ticket);
    ticket.extend_from_slice(&tag.finalize().into_bytes());

    Ok(ticket)
}

/// Open a ticket sealed by any server sharing this manager's seeds.
///
/// # Errors
///
/// - `Truncated`: ticket shorter than [`MIN_TICKET_LEN`]
/// - `UnknownKey`: the naming key was dropped or never configured here
/// - `Authentication`: the ticket was tampered with or forged
pub fn open_ticket<E: Environment>(
    manager: &TicketKeyManager<E>,
    ticket: &[u8],
) -> Result<OpenedTicket, SealError> {
    if ticket.len() < MIN_TICKET_LEN {
        return Err(SealError::Truncated { len: ticket.len() });
    }

    let (authenticated, tag) = ticket.split_at(ticket.len() - TAG_LEN);
    let (header, ciphertext) = authenticated.split_at(KEY_NAME_FIELD_LEN + IV_LEN);

    let mut key_name = [0u8; KEY_NAME_FIELD_LEN];
    let mut iv = [0u8; IV_LEN];
    key_name.copy_from_slice(&header[..KEY_NAME_FIELD_LEN]);
    iv.copy_from_slice(&header[KEY_NAME_FIELD_LEN..]);
    let mut key_name = KeyNameField::from_bytes(key_name);
    let mut iv = Iv::from_bytes(iv);

    let mut cipher = SoftwareCipher::default();
    let mut mac = SoftwareMac::default();
    let status = manager.ticket_callback(
        &mut key_name,
        &mut iv,
        &mut cipher,
        &mut mac,
        TicketMode::Decrypt,
    );
    let renew = match status {
        TicketStatus::Success => false,
        TicketStatus::Renew => true,
        TicketStatus::UnknownKey => return Err(SealError::UnknownKey),
        TicketStatus::Error => return Err(SealError::CallbackFailed),
    };

    let mut expected = mac.take()?;
    expected.update(authenticated);
    expected.verify_slice(tag).map_err(|_| SealError::Authentication)?;

    let state = cipher
        .cipher()?
        .decrypt(cipher.nonce(), ciphertext)
        .map_err(|_| SealError::Authentication)?;

    Ok(OpenedTicket { state, renew })
}
