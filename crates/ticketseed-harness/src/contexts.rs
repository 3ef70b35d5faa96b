//! Recording cipher and MAC contexts.
//!
//! Stand-ins for the TLS engine's contexts. They capture what the dispatcher
//! configured so tests can compare the keys two servers derived for the same
//! ticket, and can be told to fail to exercise the error path.

use ticketseed_core::{PrimitiveError, TicketCipher, TicketMac, TicketMode};
use ticketseed_crypto::{CipherKey, Iv, MacKey, TICKET_CIPHER_KEY_LEN, TICKET_MAC_KEY_LEN};

/// Cipher configuration captured by [`RecordingCipher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherSetup {
    /// Direction the cipher was keyed for
    pub mode: TicketMode,
    /// Raw cipher key bytes
    pub key: [u8; TICKET_CIPHER_KEY_LEN],
    /// IV the cipher was keyed with
    pub iv: Iv,
}

/// Cipher context that records its configuration.
#[derive(Debug, Default)]
pub struct RecordingCipher {
    setup: Option<CipherSetup>,
    fail: bool,
}

impl RecordingCipher {
    /// Create an empty recording context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context that rejects every configuration.
    pub fn failing() -> Self {
        Self { setup: None, fail: true }
    }

    /// Last configuration, if any.
    pub fn setup(&self) -> Option<&CipherSetup> {
        self.setup.as_ref()
    }

    /// Whether the cipher was configured.
    pub fn is_configured(&self) -> bool {
        self.setup.is_some()
    }
}

impl TicketCipher for RecordingCipher {
    fn configure(
        &mut self,
        mode: TicketMode,
        key: &CipherKey,
        iv: &Iv,
    ) -> Result<(), PrimitiveError> {
        if self.fail {
            return Err(PrimitiveError::new("cipher", "injected failure"));
        }
        self.setup = Some(CipherSetup { mode, key: *key.as_bytes(), iv: *iv });
        Ok(())
    }
}

/// MAC context that records its key.
#[derive(Debug, Default)]
pub struct RecordingMac {
    key: Option<[u8; TICKET_MAC_KEY_LEN]>,
    fail: bool,
}

impl RecordingMac {
    /// Create an empty recording context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context that rejects every configuration.
    pub fn failing() -> Self {
        Self { key: None, fail: true }
    }

    /// Last configured key, if any.
    pub fn key(&self) -> Option<&[u8; TICKET_MAC_KEY_LEN]> {
        self.key.as_ref()
    }
}

impl TicketMac for RecordingMac {
    fn configure(&mut self, key: &MacKey) -> Result<(), PrimitiveError> {
        if self.fail {
            return Err(PrimitiveError::new("mac", "injected failure"));
        }
        self.key = Some(*key.as_bytes());
        Ok(())
    }
}
