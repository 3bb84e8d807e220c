//! Content URL codec: a 32-byte content hash maps to
//! `uhrp://` + base58check of the prefixed digest, and back.

use crate::uhrp::error::RecordError;
use crate::uhrp::types::ContentHash;

const UHRP_SCHEME: &str = "uhrp://";

/// Address-type bytes prepended to the digest before base58check encoding.
const ADDRESS_PREFIX: [u8; 2] = [0xce, 0x00];

/// Renders the canonical content URL for a hash.
pub fn url_for_hash(hash: &ContentHash) -> String {
    let mut payload = Vec::with_capacity(ADDRESS_PREFIX.len() + 32);
    payload.extend_from_slice(&ADDRESS_PREFIX);
    payload.extend_from_slice(hash.as_bytes());
    format!(
        "{}{}",
        UHRP_SCHEME,
        bs58::encode(payload).with_check().into_string()
    )
}

/// Recovers the content hash from a content URL. The `uhrp://` scheme is
/// optional; the checksum, prefix bytes, and digest length are validated.
pub fn hash_from_url(url: &str) -> Result<ContentHash, RecordError> {
    let encoded = url.strip_prefix(UHRP_SCHEME).unwrap_or(url);
    let payload = bs58::decode(encoded)
        .with_check(None)
        .into_vec()
        .map_err(|e| RecordError::InvalidUrl(format!("{url}: {e}")))?;

    if payload.len() != ADDRESS_PREFIX.len() + 32 || payload[..2] != ADDRESS_PREFIX {
        return Err(RecordError::InvalidUrl(url.to_string()));
    }

    ContentHash::from_bytes(&payload[2..])
}
