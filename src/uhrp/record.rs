use crate::uhrp::error::RecordError;
use crate::uhrp::types::{ContentHash, HostKey};
use crate::uhrp::varint;

/// Fields every advertisement payload must carry.
const MIN_FIELDS: usize = 5;

/// One content availability commitment, as carried by a single ledger output.
///
/// Fields are immutable once committed. A renewal never mutates a record in
/// place; it spends the old output and issues a successor that differs only
/// in `expiry_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    /// Public identity of the advertising host.
    pub host_identity: HostKey,
    /// Digest of the hosted bytes.
    pub content_hash: ContentHash,
    /// URL where the content can currently be retrieved.
    pub url: String,
    /// Unix seconds after which the commitment is void.
    pub expiry_time: u64,
    /// Byte length of the hosted content.
    pub content_length: u64,
    /// MIME type, when the host recorded one.
    pub content_type: Option<String>,
}

impl Advertisement {
    /// Encodes the record into the ordered byte-field list committed on the
    /// ledger. The content type, when present, rides as a sixth field.
    pub fn encode(&self) -> Vec<Vec<u8>> {
        let mut fields = vec![
            self.host_identity.as_bytes().to_vec(),
            self.content_hash.as_bytes().to_vec(),
            self.url.as_bytes().to_vec(),
            varint::encode(self.expiry_time),
            varint::encode(self.content_length),
        ];
        if let Some(mime) = &self.content_type {
            fields.push(mime.as_bytes().to_vec());
        }
        fields
    }

    /// Decodes an advertisement from a ledger output's byte-fields.
    ///
    /// Fields beyond the sixth are ignored so payloads written with future
    /// extensions still decode; fewer than five fields is an error.
    pub fn decode(fields: &[Vec<u8>]) -> Result<Self, RecordError> {
        if fields.len() < MIN_FIELDS {
            return Err(RecordError::FieldCount(fields.len(), MIN_FIELDS));
        }

        let host_identity = HostKey::from_bytes(&fields[0])?;
        let content_hash = ContentHash::from_bytes(&fields[1])?;
        let url = String::from_utf8(fields[2].clone())
            .map_err(|_| RecordError::InvalidUtf8("url"))?;
        let expiry_time =
            varint::decode(&fields[3]).ok_or(RecordError::InvalidVarint("expiry_time"))?;
        let content_length =
            varint::decode(&fields[4]).ok_or(RecordError::InvalidVarint("content_length"))?;
        let content_type = match fields.get(5) {
            Some(bytes) => Some(
                String::from_utf8(bytes.clone())
                    .map_err(|_| RecordError::InvalidUtf8("content_type"))?,
            ),
            None => None,
        };

        Ok(Advertisement {
            host_identity,
            content_hash,
            url,
            expiry_time,
            content_length,
            content_type,
        })
    }

    /// Returns the successor record for a renewal: identical fields with a
    /// replaced expiry.
    pub fn with_expiry(&self, expiry_time: u64) -> Self {
        Advertisement {
            expiry_time,
            ..self.clone()
        }
    }
}
