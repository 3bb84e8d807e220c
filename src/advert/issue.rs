use crate::advert::error::AdvertError;
use crate::advert::service::{AdvertService, ADVERTISEMENT_COLLECTION, OUTPUT_VALUE_SATOSHIS};
use crate::ledger::client::Ledger;
use crate::ledger::output::NewOutput;
use crate::pricing::rates::RateSource;
use crate::store::object_store::ObjectStore;
use crate::uhrp::labels;
use crate::uhrp::record::Advertisement;
use crate::uhrp::types::ContentHash;
use tracing::info;

/// Everything needed to commit one availability advertisement.
#[derive(Debug, Clone)]
pub struct AdvertiseRequest {
    /// Identifier of the hosted object within the store.
    pub object_id: String,
    /// URL where the content can be downloaded.
    pub url: String,
    /// SHA-256 of the hosted bytes.
    pub content_hash: ContentHash,
    /// Identity key of the uploader the advertisement is indexed under.
    pub uploader_identity: String,
    /// Unix seconds until which hosting is committed.
    pub expiry_time: u64,
    /// Byte length of the hosted content.
    pub content_length: u64,
    /// MIME type, when known.
    pub content_type: Option<String>,
}

/// Receipt for a committed advertisement.
#[derive(Debug, Clone)]
pub struct AdvertiseReceipt {
    pub txid: String,
}

impl<L: Ledger, S: ObjectStore, R: RateSource> AdvertService<L, S, R> {
    /// Commits a signed availability advertisement to the ledger and relays
    /// the carrying transaction to the configured overlay topics.
    ///
    /// The record is signed by this host's identity key regardless of who
    /// uploaded the content; the uploader only shows up in the index labels.
    pub async fn advertise(
        &self,
        request: AdvertiseRequest,
    ) -> Result<AdvertiseReceipt, AdvertError> {
        let record = Advertisement {
            host_identity: self.settings.host_identity,
            content_hash: request.content_hash,
            url: request.url,
            expiry_time: request.expiry_time,
            content_length: request.content_length,
            content_type: request.content_type,
        };

        let labels = labels::labels_for(&record, &request.object_id, &request.uploader_identity);
        let output = NewOutput {
            collection: ADVERTISEMENT_COLLECTION.to_string(),
            fields: record.encode(),
            labels,
            value: OUTPUT_VALUE_SATOSHIS,
            description: "UHRP Content Availability Advertisement".to_string(),
        };

        let transaction = self.ledger.create_output(output).await?;
        self.ledger
            .relay(&transaction.txid, &self.settings.relay_topics)
            .await?;

        info!(
            "Advertised object {} until {} in transaction {}",
            request.object_id, request.expiry_time, transaction.txid
        );

        Ok(AdvertiseReceipt {
            txid: transaction.txid,
        })
    }
}
