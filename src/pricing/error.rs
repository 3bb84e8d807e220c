use thiserror::Error;

/// Errors related to exchange rate lookups
#[derive(Error, Debug)]
pub enum PricingError {
    /// The exchange rate service could not be reached
    #[error("Exchange rate unavailable: {0}")]
    RateUnavailable(String),

    /// The exchange rate service returned an unusable rate
    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),

    /// Other unspecified errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
