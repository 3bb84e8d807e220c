use crate::ledger::client::Ledger;
use crate::ledger::error::LedgerError;
use crate::ledger::output::{
    LedgerTransaction, MatchMode, NewOutput, OutputQuery, OutputRecord, OutputRef,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// `FakeLedger` is an in-memory implementation of the `Ledger` trait for
/// testing purposes. It enforces single-spend on replacements the way the
/// real ledger does, and exposes knobs to simulate stale indexes, dropped
/// payloads, and relay failures.
#[derive(Clone)]
pub struct FakeLedger {
    outputs: Arc<Mutex<Vec<FakeOutput>>>,
    relayed: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    fail_relay: Arc<Mutex<bool>>,
    fail_queries: Arc<Mutex<bool>>,
    strip_fields: Arc<Mutex<bool>>,
    next_tx: Arc<Mutex<u64>>,
}

struct FakeOutput {
    outpoint: OutputRef,
    collection: String,
    fields: Vec<Vec<u8>>,
    labels: Vec<String>,
    value: u64,
    spent: bool,
    visible: bool,
}

impl FakeLedger {
    /// Create a new empty FakeLedger instance
    pub fn new() -> Self {
        FakeLedger {
            outputs: Arc::new(Mutex::new(Vec::new())),
            relayed: Arc::new(Mutex::new(Vec::new())),
            fail_relay: Arc::new(Mutex::new(false)),
            fail_queries: Arc::new(Mutex::new(false)),
            strip_fields: Arc::new(Mutex::new(false)),
            next_tx: Arc::new(Mutex::new(0)),
        }
    }

    fn mint_outpoint(&self) -> OutputRef {
        let mut next_tx = self.next_tx.lock().unwrap();
        *next_tx += 1;
        OutputRef::new(format!("{:064x}", *next_tx), 0)
    }

    /// Mark an output as spent without hiding it from queries, simulating a
    /// wallet index that has not yet observed the spending transaction
    pub fn fake_mark_spent(&self, outpoint: &OutputRef) {
        let mut outputs = self.outputs.lock().unwrap();
        if let Some(output) = outputs.iter_mut().find(|o| &o.outpoint == outpoint) {
            output.spent = true;
        }
    }

    /// Make queries omit payload fields even when asked for them
    pub fn fake_strip_fields(&self) {
        *self.strip_fields.lock().unwrap() = true;
    }

    /// Simulate a failure on the next relay calls
    pub fn fake_fail_relay(&self) {
        *self.fail_relay.lock().unwrap() = true;
    }

    /// Simulate a failure on all subsequent queries
    pub fn fake_fail_queries(&self) {
        *self.fail_queries.lock().unwrap() = true;
    }

    /// Transactions relayed so far, with their topics
    pub fn fake_relayed(&self) -> Vec<(String, Vec<String>)> {
        self.relayed.lock().unwrap().clone()
    }

    /// Whether an output has been spent
    pub fn fake_is_spent(&self, outpoint: &OutputRef) -> bool {
        let outputs = self.outputs.lock().unwrap();
        outputs
            .iter()
            .find(|o| &o.outpoint == outpoint)
            .map(|o| o.spent)
            .unwrap_or(false)
    }

    /// The satoshi value an output was committed with
    pub fn fake_value(&self, outpoint: &OutputRef) -> Option<u64> {
        let outputs = self.outputs.lock().unwrap();
        outputs
            .iter()
            .find(|o| &o.outpoint == outpoint)
            .map(|o| o.value)
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn query_outputs(&self, query: &OutputQuery) -> Result<Vec<OutputRecord>, LedgerError> {
        if *self.fail_queries.lock().unwrap() {
            return Err(LedgerError::Query("Simulated query failure".to_string()));
        }

        let strip_fields = *self.strip_fields.lock().unwrap();
        let outputs = self.outputs.lock().unwrap();

        let page = outputs
            .iter()
            .filter(|o| o.visible && o.collection == query.collection)
            .filter(|o| match query.match_mode {
                MatchMode::All => query.labels.iter().all(|l| o.labels.contains(l)),
                MatchMode::Any => query.labels.iter().any(|l| o.labels.contains(l)),
            })
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .map(|o| OutputRecord {
                outpoint: o.outpoint.clone(),
                labels: if query.include_labels {
                    o.labels.clone()
                } else {
                    Vec::new()
                },
                fields: if query.include_fields && !strip_fields {
                    Some(o.fields.clone())
                } else {
                    None
                },
            })
            .collect();

        Ok(page)
    }

    async fn create_output(&self, output: NewOutput) -> Result<LedgerTransaction, LedgerError> {
        let outpoint = self.mint_outpoint();
        let txid = outpoint.txid.clone();

        let mut outputs = self.outputs.lock().unwrap();
        outputs.push(FakeOutput {
            outpoint,
            collection: output.collection,
            fields: output.fields,
            labels: output.labels,
            value: output.value,
            spent: false,
            visible: true,
        });

        Ok(LedgerTransaction { txid })
    }

    async fn replace_output(
        &self,
        spend: &OutputRef,
        replacement: NewOutput,
    ) -> Result<LedgerTransaction, LedgerError> {
        let successor = self.mint_outpoint();
        let txid = successor.txid.clone();

        let mut outputs = self.outputs.lock().unwrap();
        let index = outputs
            .iter()
            .position(|o| &o.outpoint == spend)
            .ok_or_else(|| LedgerError::AlreadySpent(format!("{} is not spendable", spend)))?;

        if outputs[index].spent {
            return Err(LedgerError::AlreadySpent(format!(
                "{} was consumed by another transaction",
                spend
            )));
        }

        outputs[index].spent = true;
        outputs[index].visible = false;
        outputs.push(FakeOutput {
            outpoint: successor,
            collection: replacement.collection,
            fields: replacement.fields,
            labels: replacement.labels,
            value: replacement.value,
            spent: false,
            visible: true,
        });

        Ok(LedgerTransaction { txid })
    }

    async fn relay(&self, txid: &str, topics: &[String]) -> Result<(), LedgerError> {
        if *self.fail_relay.lock().unwrap() {
            return Err(LedgerError::Relay(format!(
                "Simulated relay failure for {}",
                txid
            )));
        }

        let mut relayed = self.relayed.lock().unwrap();
        relayed.push((txid.to_string(), topics.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
impl Default for FakeLedger {
    fn default() -> Self {
        Self::new()
    }
}
