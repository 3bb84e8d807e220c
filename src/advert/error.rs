use crate::ledger::error::LedgerError;
use crate::store::error::StoreError;
use crate::uhrp::error::RecordError;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while issuing, resolving, or renewing
/// advertisements.
#[derive(Error, Debug)]
pub enum AdvertError {
    /// A request failed validation before any ledger or store work began.
    #[error("{description}")]
    Invalid {
        code: &'static str,
        description: String,
    },

    /// No advertisement exists for the requested content.
    #[error("No advertisement found")]
    NotFound,

    /// The winning advertisement's hosting commitment has lapsed.
    #[error("The advertisement for this file has expired")]
    Expired,

    /// The advertisement to renew could not be located as a spendable
    /// output, or its on-ledger payload was unavailable.
    #[error("Couldn't find old advertisement output to renew")]
    OldAdvertisementNotFound,

    /// Another renewal spent the advertisement first, or several
    /// advertisements share the winning expiry and the one to renew is
    /// ambiguous.
    #[error("The advertisement was renewed concurrently, retry against the current record")]
    Conflict,

    /// The replacement transaction could not be signed.
    #[error("Failed to sign spend of the old advertisement: {0}")]
    Signing(String),

    /// An on-ledger payload failed to decode as an advertisement record.
    #[error(transparent)]
    Malformed(#[from] RecordError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AdvertError {
    pub fn invalid(code: &'static str, description: impl Into<String>) -> Self {
        AdvertError::Invalid {
            code,
            description: description.into(),
        }
    }

    pub fn missing_identity_key() -> Self {
        AdvertError::invalid("ERR_MISSING_IDENTITY_KEY", "Missing uploader identity key.")
    }

    /// The machine-readable code for errors that are safe to surface to
    /// callers. Infrastructure failures return `None` and are reported
    /// under an operation-specific internal code instead.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            AdvertError::Invalid { code, .. } => Some(code),
            AdvertError::NotFound => Some("ERR_NOT_FOUND"),
            AdvertError::Expired => Some("ERR_EXPIRED"),
            AdvertError::OldAdvertisementNotFound => Some("ERR_OLD_ADVERTISEMENT_NOT_FOUND"),
            AdvertError::Conflict => Some("ERR_RENEWAL_CONFLICT"),
            AdvertError::Signing(_) => Some("ERR_SIGNING_OLD_ADVERTISEMENT"),
            AdvertError::Malformed(_) => Some("ERR_MALFORMED_RECORD"),
            AdvertError::Ledger(_) | AdvertError::Store(_) => None,
        }
    }
}

/// The serialized shape of a failed operation.
#[derive(Debug, Serialize)]
pub struct Failure {
    pub status: &'static str,
    pub code: String,
    pub description: String,
}

impl Failure {
    /// Build the caller-facing report for an error. Errors without a code
    /// of their own fall back to the operation's internal code with a
    /// generic description, keeping infrastructure detail out of responses.
    pub fn from_error(error: &AdvertError, fallback_code: &str) -> Self {
        match error.code() {
            Some(code) => Failure {
                status: "error",
                code: code.to_string(),
                description: error.to_string(),
            },
            None => Failure {
                status: "error",
                code: fallback_code.to_string(),
                description: "An internal error has occurred.".to_string(),
            },
        }
    }
}
