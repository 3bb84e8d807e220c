use crate::advert::error::AdvertError;
use crate::advert::service::{
    AdvertService, Page, ADVERTISEMENT_COLLECTION, CONTENT_TYPE_QUERY_LIMIT,
};
use crate::ledger::client::Ledger;
use crate::ledger::output::{OutputQuery, OutputRecord};
use crate::pricing::rates::RateSource;
use crate::store::object_store::ObjectStore;
use crate::uhrp::labels;
use crate::uhrp::labels::Label;
use serde::Serialize;
use tracing::error;

/// The advertisement that currently speaks for an object, picked from one
/// query's worth of candidate outputs.
pub(crate) struct Winner<'a> {
    pub output: &'a OutputRecord,
    pub expiry_time: u64,
    /// How many candidates share the winning expiry.
    pub contenders: usize,
}

/// Picks the advertisement with the greatest expiry among the eligible
/// candidates. `eligible` returns the candidate's expiry, or `None` to
/// skip it; skipped and undecodable candidates never abort the scan.
///
/// Ties on expiry resolve to the lexicographically smallest outpoint so
/// every observer of the same output set picks the same record.
pub(crate) fn winner_by_expiry<'a, F>(outputs: &'a [OutputRecord], eligible: F) -> Option<Winner<'a>>
where
    F: Fn(&OutputRecord) -> Option<u64>,
{
    let mut winner: Option<Winner<'a>> = None;
    for output in outputs {
        let expiry_time = match eligible(output) {
            Some(expiry_time) => expiry_time,
            None => continue,
        };
        match &mut winner {
            None => {
                winner = Some(Winner {
                    output,
                    expiry_time,
                    contenders: 1,
                });
            }
            Some(current) if expiry_time > current.expiry_time => {
                current.output = output;
                current.expiry_time = expiry_time;
                current.contenders = 1;
            }
            Some(current) if expiry_time == current.expiry_time => {
                current.contenders += 1;
                if output.outpoint < current.output.outpoint {
                    current.output = output;
                }
            }
            Some(_) => {}
        }
    }
    winner
}

/// The object a UHRP URL resolved to, before store metadata is folded in.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedObject {
    pub object_id: String,
    pub name: String,
    pub size: Option<u64>,
    pub content_type: Option<String>,
    pub expiry_time: u64,
}

/// What a lookup reports about a hosted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadataView {
    pub name: String,
    pub size: String,
    pub mime_type: String,
    pub expiry_time: u64,
}

impl<L: Ledger, S: ObjectStore, R: RateSource> AdvertService<L, S, R> {
    /// Resolves a UHRP URL to the winning advertisement for an uploader and
    /// loads the backing object's store metadata.
    ///
    /// Expiry is checked only after the winner is picked: a fresher record
    /// always shadows lapsed ones, and `Expired` means the best available
    /// commitment has lapsed, not that none exists.
    pub(crate) async fn resolve_metadata(
        &self,
        uhrp_url: &str,
        uploader_identity: &str,
        page: Page,
    ) -> Result<ResolvedObject, AdvertError> {
        let (limit, offset) = page.effective();
        let mut query = OutputQuery::labeled(
            ADVERTISEMENT_COLLECTION,
            vec![
                Label::ContentUrl(uhrp_url.to_string()).render(),
                Label::Uploader(uploader_identity.to_string()).render(),
            ],
        );
        query.limit = limit;
        query.offset = offset;

        let outputs = self.ledger.query_outputs(&query).await?;
        let winner = winner_by_expiry(&outputs, |output| {
            labels::object_id(&output.labels)?;
            labels::expiry_time(&output.labels)
        })
        .ok_or(AdvertError::NotFound)?;

        if self.unix_now() > winner.expiry_time {
            return Err(AdvertError::Expired);
        }

        // The eligibility check above guarantees the label is present.
        let object_id =
            labels::object_id(&winner.output.labels).ok_or(AdvertError::NotFound)?;

        let path = self.object_path(&object_id);
        let metadata = self.store.get_metadata(&path).await?;

        Ok(ResolvedObject {
            object_id,
            name: metadata.name,
            size: metadata.size,
            content_type: metadata.content_type,
            expiry_time: winner.expiry_time,
        })
    }

    /// Resolves a UHRP URL to the metadata of the file it names.
    pub async fn find(
        &self,
        uhrp_url: &str,
        uploader_identity: &str,
        page: Page,
    ) -> Result<FileMetadataView, AdvertError> {
        if uploader_identity.is_empty() {
            return Err(AdvertError::missing_identity_key());
        }
        if uhrp_url.is_empty() {
            return Err(AdvertError::invalid(
                "ERR_NO_UHRP_URL",
                "You must provide a uhrpUrl query parameter",
            ));
        }

        let resolved = self
            .resolve_metadata(uhrp_url, uploader_identity, page)
            .await?;

        // Objects uploaded before the store recorded MIME types fall back
        // to the content type advertised on the ledger.
        let content_type = match resolved.content_type {
            Some(mime) => Some(mime),
            None => self.content_type_for(&resolved.object_id).await,
        };

        Ok(FileMetadataView {
            name: resolved.name,
            size: resolved
                .size
                .map(|s| s.to_string())
                .unwrap_or_default(),
            mime_type: content_type.unwrap_or_default(),
            expiry_time: resolved.expiry_time,
        })
    }

    /// The advertised MIME type of an object, from the winning unexpired
    /// advertisement that carries one.
    ///
    /// Results are cached for a few minutes, so a renewal that changes the
    /// type may serve the previous answer until the entry lapses. Ledger
    /// failures degrade to `None` rather than failing the caller.
    pub async fn content_type_for(&self, object_id: &str) -> Option<String> {
        if let Some(mime) = self.mime_types.get(&object_id.to_string()).await {
            return Some(mime);
        }

        let mut query = OutputQuery::labeled(
            ADVERTISEMENT_COLLECTION,
            vec![Label::ObjectId(object_id.to_string()).render()],
        );
        query.limit = CONTENT_TYPE_QUERY_LIMIT;

        let outputs = match self.ledger.query_outputs(&query).await {
            Ok(outputs) => outputs,
            Err(e) => {
                error!("Content type lookup for object {} failed: {}", object_id, e);
                return None;
            }
        };

        let now = self.unix_now();
        let winner = winner_by_expiry(&outputs, |output| {
            labels::content_type(&output.labels)?;
            let expiry_time = labels::expiry_time(&output.labels)?;
            (expiry_time > now).then_some(expiry_time)
        })?;

        let mime = labels::content_type(&winner.output.labels)?;
        self.mime_types
            .put(object_id.to_string(), mime.clone())
            .await;
        Some(mime)
    }
}
