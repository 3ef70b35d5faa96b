//! Fixed-width key and wire-field types.
//!
//! Every buffer that crosses the ticket callback boundary has a fixed length
//! dictated by the TLS ticket extension, so each one is a distinct array
//! newtype. Secret material zeroizes on drop and never prints its bytes.

use std::fmt;

use zeroize::Zeroize;

/// SHA-256 output length (32 bytes)
pub const DIGEST_LEN: usize = 32;

/// Length of the public key name prefix (4 bytes)
pub const KEY_NAME_LEN: usize = 4;

/// Length of the per-ticket salt (12 bytes)
pub const SALT_LEN: usize = 12;

/// Length of the ticket key-name field: key name followed by salt (16 bytes)
pub const KEY_NAME_FIELD_LEN: usize = KEY_NAME_LEN + SALT_LEN;

/// Length of the ticket IV buffer, one AES block (16 bytes)
pub const IV_LEN: usize = 16;

/// Length of the per-ticket MAC key (16 bytes)
pub const TICKET_MAC_KEY_LEN: usize = 16;

/// Length of the per-ticket cipher key (16 bytes)
pub const TICKET_CIPHER_KEY_LEN: usize = 16;

const _: () = assert!(TICKET_MAC_KEY_LEN + TICKET_CIPHER_KEY_LEN == DIGEST_LEN);

/// SHA-256 digest of a seed secret.
///
/// Identifies a seed without holding on to the secret itself. Treated as key
/// material: it is a one-way function of the secret but still secret.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SeedDigest(pub(crate) [u8; DIGEST_LEN]);

impl SeedDigest {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}

impl fmt::Debug for SeedDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SeedDigest(<redacted>)")
    }
}

impl Drop for SeedDigest {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Base key derived from a seed by hash chaining.
///
/// Input to every per-ticket key derivation for tickets named after this key.
/// Never leaves the process.
#[derive(Clone)]
pub struct BaseKey(pub(crate) [u8; DIGEST_LEN]);

impl BaseKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}

impl fmt::Debug for BaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BaseKey(<redacted>)")
    }
}

impl Drop for BaseKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Public 4-byte name of a base key, as carried in the ticket key-name field.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyName([u8; KEY_NAME_LEN]);

impl KeyName {
    /// Wrap raw name bytes.
    pub const fn new(bytes: [u8; KEY_NAME_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw name bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_NAME_LEN] {
        &self.0
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyName({self})")
    }
}

/// Per-ticket random salt.
///
/// Public: it travels in the ticket key-name field right after the key name.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Wrap raw salt bytes.
    pub const fn new(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh salt from a caller-provided random source.
    ///
    /// The source MUST be cryptographically secure in production.
    pub fn generate<E>(fill: impl FnOnce(&mut [u8]) -> Result<(), E>) -> Result<Self, E> {
        let mut bytes = [0u8; SALT_LEN];
        fill(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Raw salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", hex::encode(self.0))
    }
}

/// The 16-byte ticket key-name field.
///
/// Layout:
/// - bytes 0-3: key name
/// - bytes 4-15: salt
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyNameField([u8; KEY_NAME_FIELD_LEN]);

impl KeyNameField {
    /// Wrap a raw field as received from the TLS engine.
    pub const fn from_bytes(bytes: [u8; KEY_NAME_FIELD_LEN]) -> Self {
        Self(bytes)
    }

    /// Build the field from a key name and salt.
    pub fn compose(name: KeyName, salt: Salt) -> Self {
        let mut field = [0u8; KEY_NAME_FIELD_LEN];
        field[..KEY_NAME_LEN].copy_from_slice(name.as_bytes());
        field[KEY_NAME_LEN..].copy_from_slice(salt.as_bytes());
        Self(field)
    }

    /// Split the field back into key name and salt.
    pub fn split(&self) -> (KeyName, Salt) {
        let mut name = [0u8; KEY_NAME_LEN];
        let mut salt = [0u8; SALT_LEN];
        name.copy_from_slice(&self.0[..KEY_NAME_LEN]);
        salt.copy_from_slice(&self.0[KEY_NAME_LEN..]);
        (KeyName(name), Salt(salt))
    }

    /// Key name portion of the field.
    pub fn key_name(&self) -> KeyName {
        self.split().0
    }

    /// Raw field bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_NAME_FIELD_LEN] {
        &self.0
    }
}

impl fmt::Debug for KeyNameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyNameField({})", hex::encode(self.0))
    }
}

/// Ticket IV, one AES block.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Iv([u8; IV_LEN]);

impl Iv {
    /// Wrap raw IV bytes.
    pub const fn from_bytes(bytes: [u8; IV_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh IV from a caller-provided random source.
    pub fn generate<E>(fill: impl FnOnce(&mut [u8]) -> Result<(), E>) -> Result<Self, E> {
        let mut bytes = [0u8; IV_LEN];
        fill(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Raw IV bytes.
    pub fn as_bytes(&self) -> &[u8; IV_LEN] {
        &self.0
    }
}

impl fmt::Debug for Iv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Iv({})", hex::encode(self.0))
    }
}

/// Per-ticket symmetric cipher key (AES-128).
#[derive(Clone)]
pub struct CipherKey([u8; TICKET_CIPHER_KEY_LEN]);

impl CipherKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; TICKET_CIPHER_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey(<redacted>)")
    }
}

impl Drop for CipherKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Per-ticket MAC key (HMAC-SHA256).
#[derive(Clone)]
pub struct MacKey([u8; TICKET_MAC_KEY_LEN]);

impl MacKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; TICKET_MAC_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for MacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MacKey(<redacted>)")
    }
}

impl Drop for MacKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Cipher and MAC keys for a single ticket.
#[derive(Clone, Debug)]
pub struct TicketKeys {
    cipher: CipherKey,
    mac: MacKey,
}

impl TicketKeys {
    /// Split a 32-byte derivation output: MAC key first, cipher key second.
    pub(crate) fn from_digest(digest: &[u8; DIGEST_LEN]) -> Self {
        let mut mac = [0u8; TICKET_MAC_KEY_LEN];
        let mut cipher = [0u8; TICKET_CIPHER_KEY_LEN];
        mac.copy_from_slice(&digest[..TICKET_MAC_KEY_LEN]);
        cipher.copy_from_slice(&digest[TICKET_MAC_KEY_LEN..]);
        Self { cipher: CipherKey(cipher), mac: MacKey(mac) }
    }

    /// Symmetric cipher key.
    pub fn cipher_key(&self) -> &CipherKey {
        &self.cipher
    }

    /// MAC key.
    pub fn mac_key(&self) -> &MacKey {
        &self.mac
    }
}
