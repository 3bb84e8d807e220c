use thiserror::Error;

/// Errors related to ledger wallet operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Connection error to the wallet service
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error while querying outputs
    #[error("Query error: {0}")]
    Query(String),

    /// Error while submitting a transaction
    #[error("Submission error: {0}")]
    Submission(String),

    /// The referenced output was already spent by another transaction
    #[error("Output already spent: {0}")]
    AlreadySpent(String),

    /// The wallet refused to sign the transaction
    #[error("Signing error: {0}")]
    Signing(String),

    /// Error while relaying a transaction to the overlay network
    #[error("Relay error: {0}")]
    Relay(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Other unspecified errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
