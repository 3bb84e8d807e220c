use crate::uhrp::error::RecordError;
use std::fmt;

/// Compressed public key identifying the advertising host (33 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostKey([u8; 33]);

impl HostKey {
    /// Parses a key from raw bytes, validating the length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        let key: [u8; 33] = bytes
            .try_into()
            .map_err(|_| RecordError::FieldLength("host_identity", bytes.len(), 33))?;
        Ok(HostKey(key))
    }

    /// Parses a key from its hex string form.
    pub fn from_hex(hex_str: &str) -> Result<Self, RecordError> {
        let bytes =
            hex::decode(hex_str).map_err(|_| RecordError::InvalidHex("host_identity"))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }
}

impl fmt::Display for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostKey({})", self.to_hex())
    }
}

/// SHA-256 digest of the advertised content (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Parses a digest from raw bytes, validating the length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        let hash: [u8; 32] = bytes
            .try_into()
            .map_err(|_| RecordError::FieldLength("content_hash", bytes.len(), 32))?;
        Ok(ContentHash(hash))
    }

    /// Parses a digest from its hex string form.
    pub fn from_hex(hex_str: &str) -> Result<Self, RecordError> {
        let bytes =
            hex::decode(hex_str).map_err(|_| RecordError::InvalidHex("content_hash"))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}
