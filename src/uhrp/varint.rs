//! The ledger's variable-length unsigned-integer encoding, used for the
//! numeric fields of an advertisement payload. Values below 0xfd occupy a
//! single byte; larger values carry a one-byte marker followed by a
//! little-endian 16, 32, or 64 bit integer.

/// Encodes `value` as a self-contained byte-field.
pub fn encode(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(9);
    match value {
        0..=0xfc => out.push(value as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(value as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
    out
}

/// Decodes a byte-field that holds exactly one variable-length integer.
/// Returns `None` when the field is empty, truncated, or carries extra bytes.
pub fn decode(bytes: &[u8]) -> Option<u64> {
    let (&marker, rest) = bytes.split_first()?;
    match marker {
        0xfd => {
            let raw: [u8; 2] = rest.try_into().ok()?;
            Some(u16::from_le_bytes(raw) as u64)
        }
        0xfe => {
            let raw: [u8; 4] = rest.try_into().ok()?;
            Some(u32::from_le_bytes(raw) as u64)
        }
        0xff => {
            let raw: [u8; 8] = rest.try_into().ok()?;
            Some(u64::from_le_bytes(raw))
        }
        value => {
            if rest.is_empty() {
                Some(value as u64)
            } else {
                None
            }
        }
    }
}
