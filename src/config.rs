use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub store: StoreConfig,
    pub pricing: PricingConfig,
    pub hosting: HostingConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize)]
pub struct LedgerConfig {
    /// Base URL of the wallet service that signs and submits transactions.
    pub endpoint: String,
    /// Public identity key this host advertises under, hex encoded.
    pub identity_key: String,
    /// Overlay topics advertisements are relayed to.
    #[serde(default = "default_relay_topics")]
    pub relay_topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Key prefix hosted objects live under.
    #[serde(default = "default_store_prefix")]
    pub prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct PricingConfig {
    /// Hosting price in USD per gigabyte-month.
    pub price_per_gb_month: f64,
    /// Endpoint serving the current USD exchange rate.
    #[serde(default = "default_rate_endpoint")]
    pub rate_endpoint: String,
    /// Rate assumed when the endpoint is unreachable or returns nonsense.
    #[serde(default = "default_fallback_rate")]
    pub fallback_rate: f64,
}

#[derive(Debug, Deserialize)]
pub struct HostingConfig {
    /// Shortest hosting commitment accepted, in minutes.
    pub min_hosting_minutes: u64,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path; console-only when omitted.
    pub path: Option<String>,
    /// Megabytes per log file before rolling.
    #[serde(default = "default_log_size")]
    pub size: u64,
    #[serde(default = "default_log_files")]
    pub max_files: usize,
}

fn default_relay_topics() -> Vec<String> {
    vec!["tm_uhrp".to_string()]
}

fn default_store_prefix() -> String {
    "cdn".to_string()
}

fn default_rate_endpoint() -> String {
    "https://api.whatsonchain.com/v1/bsv/main/exchangerate".to_string()
}

fn default_fallback_rate() -> f64 {
    30.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_size() -> u64 {
    20
}

fn default_log_files() -> usize {
    5
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_text = fs::read_to_string(Path::new(path))?;
    let config: Config = toml::from_str(&config_text)?;
    Ok(config)
}
