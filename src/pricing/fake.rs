use crate::pricing::error::PricingError;
use crate::pricing::rates::RateSource;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// `FakeRateSource` is an in-memory implementation of the `RateSource`
/// trait for testing purposes. It serves a fixed rate and can simulate a
/// rate service outage.
#[derive(Clone)]
pub struct FakeRateSource {
    rate: Arc<Mutex<f64>>,
    fail: Arc<Mutex<bool>>,
}

impl FakeRateSource {
    /// Create a new FakeRateSource serving the given rate
    pub fn new(rate: f64) -> Self {
        FakeRateSource {
            rate: Arc::new(Mutex::new(rate)),
            fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Change the rate served to callers
    pub fn fake_set_rate(&self, rate: f64) {
        *self.rate.lock().unwrap() = rate;
    }

    /// Simulate a rate service outage
    pub fn fake_fail(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

#[async_trait]
impl RateSource for FakeRateSource {
    async fn current_rate(&self) -> Result<f64, PricingError> {
        if *self.fail.lock().unwrap() {
            return Err(PricingError::RateUnavailable(
                "Simulated rate outage".to_string(),
            ));
        }
        Ok(*self.rate.lock().unwrap())
    }
}

#[cfg(test)]
impl Default for FakeRateSource {
    fn default() -> Self {
        Self::new(30.0)
    }
}
