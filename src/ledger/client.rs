use crate::ledger::error::LedgerError;
use crate::ledger::output::{LedgerTransaction, NewOutput, OutputQuery, OutputRecord, OutputRef};
use async_trait::async_trait;
use std::sync::Arc;

/// Ledger trait defining the interface for committing and querying
/// advertisement outputs through the wallet service
#[async_trait]
pub trait Ledger: Send + Sync + 'static {
    /// Query outputs by collection and labels
    ///
    /// * `query` - The label query to run
    async fn query_outputs(&self, query: &OutputQuery) -> Result<Vec<OutputRecord>, LedgerError>;

    /// Sign and commit a transaction holding one new output
    ///
    /// * `output` - The output to commit
    async fn create_output(&self, output: NewOutput) -> Result<LedgerTransaction, LedgerError>;

    /// Atomically spend an existing output and commit its replacement in a
    /// single transaction. The ledger rejects the spend if another
    /// transaction already consumed `spend`.
    ///
    /// * `spend` - The output to consume
    /// * `replacement` - The output to commit in its place
    async fn replace_output(
        &self,
        spend: &OutputRef,
        replacement: NewOutput,
    ) -> Result<LedgerTransaction, LedgerError>;

    /// Relay a committed transaction to the overlay network topics
    ///
    /// * `txid` - The transaction to relay
    /// * `topics` - The overlay topics to announce it on
    async fn relay(&self, txid: &str, topics: &[String]) -> Result<(), LedgerError>;
}

/// Implementation of the Ledger trait for Arc<T> where T implements Ledger
///
/// This allows sharing one wallet connection across components efficiently.
#[async_trait]
impl<T: Ledger + ?Sized> Ledger for Arc<T> {
    async fn query_outputs(&self, query: &OutputQuery) -> Result<Vec<OutputRecord>, LedgerError> {
        (**self).query_outputs(query).await
    }

    async fn create_output(&self, output: NewOutput) -> Result<LedgerTransaction, LedgerError> {
        (**self).create_output(output).await
    }

    async fn replace_output(
        &self,
        spend: &OutputRef,
        replacement: NewOutput,
    ) -> Result<LedgerTransaction, LedgerError> {
        (**self).replace_output(spend, replacement).await
    }

    async fn relay(&self, txid: &str, topics: &[String]) -> Result<(), LedgerError> {
        (**self).relay(txid, topics).await
    }
}
