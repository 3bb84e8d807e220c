use crate::advert::error::AdvertError;
use crate::advert::service::{AdvertService, Page, ADVERTISEMENT_COLLECTION};
use crate::ledger::client::Ledger;
use crate::ledger::output::OutputQuery;
use crate::pricing::rates::RateSource;
use crate::store::object_store::ObjectStore;
use crate::uhrp::labels;
use crate::uhrp::labels::Label;
use serde::Serialize;

/// One live advertisement in an uploader's listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadEntry {
    pub uhrp_url: String,
    pub expiry_time: u64,
}

impl<L: Ledger, S: ObjectStore, R: RateSource> AdvertService<L, S, R> {
    /// Lists the uploader's unexpired advertisements in ledger order.
    ///
    /// Records missing a URL or expiry label are skipped rather than
    /// reported half-populated.
    pub async fn list(
        &self,
        uploader_identity: &str,
        page: Page,
    ) -> Result<Vec<UploadEntry>, AdvertError> {
        if uploader_identity.is_empty() {
            return Err(AdvertError::missing_identity_key());
        }

        let (limit, offset) = page.effective();
        let mut query = OutputQuery::labeled(
            ADVERTISEMENT_COLLECTION,
            vec![Label::Uploader(uploader_identity.to_string()).render()],
        );
        query.limit = limit;
        query.offset = offset;

        let outputs = self.ledger.query_outputs(&query).await?;
        let now = self.unix_now();

        let mut uploads = Vec::new();
        for output in &outputs {
            let Some(uhrp_url) = labels::content_url(&output.labels) else {
                continue;
            };
            let Some(expiry_time) = labels::expiry_time(&output.labels) else {
                continue;
            };
            if now > expiry_time {
                continue;
            }
            uploads.push(UploadEntry {
                uhrp_url,
                expiry_time,
            });
        }

        Ok(uploads)
    }
}
