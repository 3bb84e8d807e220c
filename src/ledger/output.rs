//! Value types exchanged with the ledger wallet: output references, label
//! queries, and the payloads for creating and replacing outputs.

use std::fmt;

/// Default page size for label queries when the caller gives none.
pub const DEFAULT_QUERY_LIMIT: u32 = 200;

/// A transaction output, identified by its transaction id and output index.
///
/// The derived ordering (txid lexicographically, then vout numerically) is
/// relied on for deterministic winner selection among outputs that carry
/// the same expiry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutputRef {
    pub txid: String,
    pub vout: u32,
}

impl OutputRef {
    pub fn new(txid: impl Into<String>, vout: u32) -> Self {
        OutputRef {
            txid: txid.into(),
            vout,
        }
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.txid, self.vout)
    }
}

/// How a query's label set combines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// An output must carry every label in the query.
    All,
    /// An output must carry at least one label in the query.
    Any,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::All => "all",
            MatchMode::Any => "any",
        }
    }
}

/// A label query over a collection of outputs.
#[derive(Debug, Clone)]
pub struct OutputQuery {
    pub collection: String,
    pub labels: Vec<String>,
    pub match_mode: MatchMode,
    pub include_labels: bool,
    pub include_fields: bool,
    pub limit: u32,
    pub offset: u32,
}

impl OutputQuery {
    /// A query for outputs in `collection` carrying every label in `labels`,
    /// returning labels but not payload fields, with the default page.
    pub fn labeled(collection: &str, labels: Vec<String>) -> Self {
        OutputQuery {
            collection: collection.to_string(),
            labels,
            match_mode: MatchMode::All,
            include_labels: true,
            include_fields: false,
            limit: DEFAULT_QUERY_LIMIT,
            offset: 0,
        }
    }
}

/// One output returned by a query. `fields` is populated only when the
/// query asked for payloads and the wallet still holds them.
#[derive(Debug, Clone)]
pub struct OutputRecord {
    pub outpoint: OutputRef,
    pub labels: Vec<String>,
    pub fields: Option<Vec<Vec<u8>>>,
}

/// A new output to commit, either standalone or as the replacement side of
/// an atomic spend.
#[derive(Debug, Clone)]
pub struct NewOutput {
    pub collection: String,
    pub fields: Vec<Vec<u8>>,
    pub labels: Vec<String>,
    pub value: u64,
    pub description: String,
}

/// Receipt for a submitted transaction.
#[derive(Debug, Clone)]
pub struct LedgerTransaction {
    pub txid: String,
}
