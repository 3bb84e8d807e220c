use crate::config::LedgerConfig;
use crate::ledger::client::Ledger;
use crate::ledger::error::LedgerError;
use crate::ledger::output::{LedgerTransaction, NewOutput, OutputQuery, OutputRecord, OutputRef};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Ledger implementation backed by the wallet service's HTTP API.
///
/// The wallet owns the signing keys; this client only describes outputs and
/// receives transaction receipts. Failed calls are surfaced to the caller
/// unchanged, retries are the caller's decision.
pub struct WalletLedger {
    endpoint: String,
    client: reqwest::Client,
}

impl WalletLedger {
    /// Create a new WalletLedger from configuration
    pub fn new(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                LedgerError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(WalletLedger {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, WalletFailure> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| WalletFailure::Connection(format!("{} failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(WalletFailure::Status(status, detail));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| WalletFailure::Connection(format!("{} returned bad JSON: {}", path, e)))
    }
}

/// Intermediate failure form, mapped to a `LedgerError` per operation so a
/// 409 on a replace becomes `AlreadySpent` while a 409 elsewhere does not.
enum WalletFailure {
    Connection(String),
    Status(StatusCode, String),
}

impl WalletFailure {
    fn into_ledger_error(self, for_spend: bool, operation: &str) -> LedgerError {
        match self {
            WalletFailure::Connection(detail) => LedgerError::Connection(detail),
            WalletFailure::Status(status, detail) => {
                if for_spend && status == StatusCode::CONFLICT {
                    return LedgerError::AlreadySpent(detail);
                }
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                    return LedgerError::Signing(detail);
                }
                LedgerError::Submission(format!("{} failed with {}: {}", operation, status, detail))
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListOutputsRequest<'a> {
    collection: &'a str,
    labels: &'a [String],
    label_query_mode: &'a str,
    include_labels: bool,
    include_fields: bool,
    limit: u32,
    offset: u32,
}

#[derive(Deserialize)]
struct ListOutputsResponse {
    outputs: Vec<WireOutput>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireOutput {
    txid: String,
    vout: u32,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    fields: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireNewOutput<'a> {
    collection: &'a str,
    fields: Vec<String>,
    labels: &'a [String],
    value: u64,
    description: &'a str,
}

impl<'a> WireNewOutput<'a> {
    fn from(output: &'a NewOutput) -> Self {
        WireNewOutput {
            collection: &output.collection,
            fields: output.fields.iter().map(hex::encode).collect(),
            labels: &output.labels,
            value: output.value,
            description: &output.description,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceOutputRequest<'a> {
    spend_txid: &'a str,
    spend_vout: u32,
    output: WireNewOutput<'a>,
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    txid: &'a str,
    topics: &'a [String],
}

#[derive(Deserialize)]
struct TransactionResponse {
    txid: String,
}

fn decode_wire_output(output: WireOutput) -> Result<OutputRecord, LedgerError> {
    let fields = match output.fields {
        Some(fields) => Some(
            fields
                .iter()
                .map(|f| {
                    hex::decode(f).map_err(|e| {
                        LedgerError::Query(format!(
                            "Output {}.{} has a non-hex field: {}",
                            output.txid, output.vout, e
                        ))
                    })
                })
                .collect::<Result<Vec<Vec<u8>>, LedgerError>>()?,
        ),
        None => None,
    };

    Ok(OutputRecord {
        outpoint: OutputRef::new(output.txid, output.vout),
        labels: output.labels,
        fields,
    })
}

#[async_trait]
impl Ledger for WalletLedger {
    async fn query_outputs(&self, query: &OutputQuery) -> Result<Vec<OutputRecord>, LedgerError> {
        debug!(
            "Querying outputs in {} with {} labels",
            query.collection,
            query.labels.len()
        );

        let request = ListOutputsRequest {
            collection: &query.collection,
            labels: &query.labels,
            label_query_mode: query.match_mode.as_str(),
            include_labels: query.include_labels,
            include_fields: query.include_fields,
            limit: query.limit,
            offset: query.offset,
        };

        let response: ListOutputsResponse = self
            .post("/v1/outputs/list", &request)
            .await
            .map_err(|e| match e {
                WalletFailure::Connection(detail) => LedgerError::Connection(detail),
                WalletFailure::Status(status, detail) => {
                    LedgerError::Query(format!("List failed with {}: {}", status, detail))
                }
            })?;

        response
            .outputs
            .into_iter()
            .map(decode_wire_output)
            .collect()
    }

    async fn create_output(&self, output: NewOutput) -> Result<LedgerTransaction, LedgerError> {
        debug!("Creating output in {}", output.collection);

        let response: TransactionResponse = self
            .post("/v1/actions/create", &WireNewOutput::from(&output))
            .await
            .map_err(|e| e.into_ledger_error(false, "Create"))?;

        Ok(LedgerTransaction {
            txid: response.txid,
        })
    }

    async fn replace_output(
        &self,
        spend: &OutputRef,
        replacement: NewOutput,
    ) -> Result<LedgerTransaction, LedgerError> {
        debug!("Replacing output {}", spend);

        let request = ReplaceOutputRequest {
            spend_txid: &spend.txid,
            spend_vout: spend.vout,
            output: WireNewOutput::from(&replacement),
        };

        let response: TransactionResponse = self
            .post("/v1/actions/replace", &request)
            .await
            .map_err(|e| e.into_ledger_error(true, "Replace"))?;

        Ok(LedgerTransaction {
            txid: response.txid,
        })
    }

    async fn relay(&self, txid: &str, topics: &[String]) -> Result<(), LedgerError> {
        debug!("Relaying {} to {} topics", txid, topics.len());

        let request = RelayRequest { txid, topics };
        let _: serde_json::Value =
            self.post("/v1/relay", &request)
                .await
                .map_err(|e| match e {
                    WalletFailure::Connection(detail) => LedgerError::Connection(detail),
                    WalletFailure::Status(status, detail) => {
                        LedgerError::Relay(format!("Relay failed with {}: {}", status, detail))
                    }
                })?;

        Ok(())
    }
}
