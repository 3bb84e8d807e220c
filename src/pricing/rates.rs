use crate::pricing::error::PricingError;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// RateSource trait defining the interface for fetching the current USD
/// exchange rate of the ledger's native token
#[async_trait]
pub trait RateSource: Send + Sync + 'static {
    /// The USD price of 100,000,000 satoshis
    async fn current_rate(&self) -> Result<f64, PricingError>;
}

/// Implementation of RateSource trait for Arc<T> where T implements RateSource
#[async_trait]
impl<T: RateSource + ?Sized> RateSource for Arc<T> {
    async fn current_rate(&self) -> Result<f64, PricingError> {
        (**self).current_rate().await
    }
}

#[derive(Deserialize)]
struct RateResponse {
    rate: f64,
}

/// Rate source backed by a public exchange rate HTTP endpoint.
pub struct HttpRateSource {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpRateSource {
    /// Create a new HttpRateSource for the given endpoint
    pub fn new(endpoint: &str) -> Result<Self, PricingError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                PricingError::RateUnavailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(HttpRateSource {
            endpoint: endpoint.to_string(),
            client,
        })
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn current_rate(&self) -> Result<f64, PricingError> {
        debug!("Fetching exchange rate from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| PricingError::RateUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PricingError::RateUnavailable(format!(
                "Rate endpoint returned {}",
                status
            )));
        }

        let body: RateResponse = response
            .json()
            .await
            .map_err(|e| PricingError::InvalidRate(e.to_string()))?;

        if !body.rate.is_finite() || body.rate <= 0.0 {
            return Err(PricingError::InvalidRate(format!(
                "Rate {} is not a positive number",
                body.rate
            )));
        }

        Ok(body.rate)
    }
}
