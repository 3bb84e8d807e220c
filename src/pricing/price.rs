//! Hosting price computation. Prices are quoted in satoshis from a USD
//! price per gigabyte-month and the current exchange rate; a rate outage
//! degrades to a configured fallback rate rather than blocking the quote.

use crate::pricing::rates::RateSource;
use std::sync::Arc;
use tracing::warn;

/// Months are normalized to 30 days of minutes.
pub const MINUTES_PER_MONTH: f64 = 43_200.0;

/// Gigabytes are decimal, not binary.
pub const BYTES_PER_GIGABYTE: f64 = 1e9;

/// No quote goes below this, whatever the file size.
pub const MINIMUM_PRICE_SATOSHIS: u64 = 10;

const SATOSHIS_PER_COIN: f64 = 100_000_000.0;

/// Computes the satoshi price of hosting `size_bytes` for
/// `retention_minutes`, given a USD price per gigabyte-month and the USD
/// exchange rate of one coin.
pub fn satoshis_for(
    size_bytes: u64,
    retention_minutes: u64,
    usd_per_gb_month: f64,
    usd_rate: f64,
) -> u64 {
    let gigabytes = size_bytes as f64 / BYTES_PER_GIGABYTE;
    let months = retention_minutes as f64 / MINUTES_PER_MONTH;
    let usd_price = gigabytes * months * usd_per_gb_month;
    let satoshis_per_usd = SATOSHIS_PER_COIN / usd_rate;
    let satoshis = (usd_price * satoshis_per_usd).floor() as u64;
    satoshis.max(MINIMUM_PRICE_SATOSHIS)
}

/// Prices hosting commitments against a live rate source.
pub struct Quoter<R> {
    source: Arc<R>,
    usd_per_gb_month: f64,
    fallback_rate: f64,
}

impl<R: RateSource> Quoter<R> {
    pub fn new(source: Arc<R>, usd_per_gb_month: f64, fallback_rate: f64) -> Self {
        Quoter {
            source,
            usd_per_gb_month,
            fallback_rate,
        }
    }

    /// The satoshi price for hosting `size_bytes` for `retention_minutes`.
    ///
    /// A failed or unusable rate fetch falls back to the configured rate,
    /// so quoting keeps working through rate service outages.
    pub async fn price_for(&self, size_bytes: u64, retention_minutes: u64) -> u64 {
        let rate = match self.source.current_rate().await {
            Ok(rate) if rate.is_finite() && rate > 0.0 => rate,
            Ok(rate) => {
                warn!(
                    "Exchange rate {} is unusable, falling back to {}",
                    rate, self.fallback_rate
                );
                self.fallback_rate
            }
            Err(e) => {
                warn!(
                    "Failed to fetch exchange rate, falling back to {}: {}",
                    self.fallback_rate, e
                );
                self.fallback_rate
            }
        };

        satoshis_for(size_bytes, retention_minutes, self.usd_per_gb_month, rate)
    }
}
