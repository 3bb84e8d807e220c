use crate::advert::error::AdvertError;
use crate::advert::resolve::winner_by_expiry;
use crate::advert::service::{
    AdvertService, Page, ADVERTISEMENT_COLLECTION, MAX_RETENTION_MINUTES, OUTPUT_VALUE_SATOSHIS,
    RETENTION_GRACE_SECONDS,
};
use crate::ledger::client::Ledger;
use crate::ledger::error::LedgerError;
use crate::ledger::output::{NewOutput, OutputQuery};
use crate::pricing::rates::RateSource;
use crate::store::object_store::ObjectStore;
use crate::uhrp::labels;
use crate::uhrp::labels::Label;
use crate::uhrp::record::Advertisement;
use crate::uhrp::url::url_for_hash;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RenewRequest {
    pub uhrp_url: String,
    pub uploader_identity: String,
    pub additional_minutes: u64,
    pub page: Page,
}

/// Receipt for a completed renewal.
#[derive(Debug, Clone)]
pub struct RenewalReceipt {
    pub prev_expiry_time: u64,
    pub new_expiry_time: u64,
    pub amount: u64,
}

impl<L: Ledger, S: ObjectStore, R: RateSource> AdvertService<L, S, R> {
    /// Extends an advertisement's hosting commitment by spending its output
    /// and committing a successor whose expiry lies `additional_minutes`
    /// past the previous one.
    ///
    /// Spend and re-issue ride in one transaction, so the old record is
    /// retired exactly when the new one exists. When two renewals race for
    /// the same output, the ledger rejects the second spend and the caller
    /// gets `Conflict`; retrying against the freshly resolved record
    /// succeeds.
    pub async fn renew(&self, request: RenewRequest) -> Result<RenewalReceipt, AdvertError> {
        if request.uploader_identity.is_empty() {
            return Err(AdvertError::missing_identity_key());
        }
        if request.uhrp_url.is_empty() {
            return Err(AdvertError::invalid(
                "ERR_MISSING_FIELDS",
                "Missing uhrpUrl or additionalMinutes.",
            ));
        }
        if request.additional_minutes == 0 {
            return Err(AdvertError::invalid(
                "ERR_INVALID_TIME",
                "Additional minutes must be a positive integer",
            ));
        }
        if request.additional_minutes > MAX_RETENTION_MINUTES {
            return Err(AdvertError::invalid(
                "ERR_INVALID_RETENTION_PERIOD",
                "The retention period must be less than 69 million minutes (about 130 years)",
            ));
        }

        let resolved = self
            .resolve_metadata(&request.uhrp_url, &request.uploader_identity, request.page)
            .await?;
        let new_expiry_time = resolved
            .expiry_time
            .saturating_add(request.additional_minutes * 60);

        let amount = match resolved.size {
            Some(size) if size > 0 => {
                self.quoter
                    .price_for(size, request.additional_minutes)
                    .await
            }
            _ => 0,
        };

        // Re-query with payloads included to pin down the exact output
        // backing the winning record.
        let (limit, offset) = request.page.effective();
        let mut query = OutputQuery::labeled(
            ADVERTISEMENT_COLLECTION,
            vec![
                Label::ContentUrl(request.uhrp_url.clone()).render(),
                Label::ObjectId(resolved.object_id.clone()).render(),
            ],
        );
        query.include_fields = true;
        query.limit = limit;
        query.offset = offset;

        let outputs = self.ledger.query_outputs(&query).await?;
        let winner = winner_by_expiry(&outputs, |output| labels::expiry_time(&output.labels))
            .ok_or(AdvertError::OldAdvertisementNotFound)?;
        if winner.contenders > 1 {
            warn!(
                "Object {} has {} advertisements sharing expiry {}, refusing to renew",
                resolved.object_id, winner.contenders, winner.expiry_time
            );
            return Err(AdvertError::Conflict);
        }

        let fields = winner
            .output
            .fields
            .as_ref()
            .ok_or(AdvertError::OldAdvertisementNotFound)?;
        let record = Advertisement::decode(fields)?;
        let successor = record.with_expiry(new_expiry_time);

        // The uploader label is carried over verbatim; the rest are derived
        // from the successor record.
        let mut successor_labels = Vec::new();
        if let Some(key) = labels::uploader_identity(&winner.output.labels) {
            successor_labels.push(Label::Uploader(key).render());
        }
        successor_labels.push(Label::ContentUrl(url_for_hash(&successor.content_hash)).render());
        successor_labels.push(Label::ObjectId(resolved.object_id.clone()).render());
        successor_labels.push(Label::Expiry(new_expiry_time).render());
        if let Some(mime) = &successor.content_type {
            successor_labels.push(Label::ContentType(mime.clone()).render());
        }

        let replacement = NewOutput {
            collection: ADVERTISEMENT_COLLECTION.to_string(),
            fields: successor.encode(),
            labels: successor_labels,
            value: OUTPUT_VALUE_SATOSHIS,
            description: format!("Renew advertisement for {}", request.uhrp_url),
        };

        let transaction = self
            .ledger
            .replace_output(&winner.output.outpoint, replacement)
            .await
            .map_err(|e| match e {
                LedgerError::AlreadySpent(_) => AdvertError::Conflict,
                LedgerError::Signing(detail) => AdvertError::Signing(detail),
                e => AdvertError::Ledger(e),
            })?;

        self.ledger
            .relay(&transaction.txid, &self.settings.relay_topics)
            .await?;

        self.store
            .set_retention(
                &self.object_path(&resolved.object_id),
                new_expiry_time + RETENTION_GRACE_SECONDS,
            )
            .await?;

        info!(
            "Renewed advertisement for object {} from {} to {} in transaction {}",
            resolved.object_id, resolved.expiry_time, new_expiry_time, transaction.txid
        );

        Ok(RenewalReceipt {
            prev_expiry_time: resolved.expiry_time,
            new_expiry_time,
            amount,
        })
    }
}
