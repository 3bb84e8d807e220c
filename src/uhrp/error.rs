use thiserror::Error;

/// Errors raised while encoding or decoding advertisement material
#[derive(Error, Debug)]
pub enum RecordError {
    /// An output payload carried fewer fields than a record requires
    #[error("Record has {0} fields, expected at least {1}")]
    FieldCount(usize, usize),

    /// A fixed-length field had the wrong number of bytes
    #[error("Field {0} has length {1}, expected {2}")]
    FieldLength(&'static str, usize, usize),

    /// A numeric field did not hold a complete variable-length integer
    #[error("Field {0} does not hold a valid variable-length integer")]
    InvalidVarint(&'static str),

    /// A text field was not valid UTF-8
    #[error("Field {0} is not valid UTF-8")]
    InvalidUtf8(&'static str),

    /// Key or hash material was not valid hex
    #[error("Value for {0} is not valid hex")]
    InvalidHex(&'static str),

    /// A content URL failed base58check or prefix validation
    #[error("Invalid content URL: {0}")]
    InvalidUrl(String),

    /// Other unspecified errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
