use crate::advert::error::AdvertError;
use crate::advert::service::{
    AdvertService, MAX_FILE_SIZE_BYTES, MAX_RETENTION_MINUTES, RETENTION_GRACE_SECONDS,
};
use crate::ledger::client::Ledger;
use crate::pricing::rates::RateSource;
use crate::store::object_store::ObjectStore;
use rand::RngCore;
use std::collections::HashMap;
use tracing::info;

/// Authorization to upload one object, priced and bounded in time.
#[derive(Debug, Clone)]
pub struct UploadGrant {
    /// Pre-authorized URL the file bytes are PUT to.
    pub upload_url: String,
    /// Headers the upload request must carry for the URL to be honored.
    pub required_headers: HashMap<String, String>,
    /// Identifier minted for the new object.
    pub object_id: String,
    /// Satoshis owed for the hosting period.
    pub amount: u64,
}

/// Mints a fresh object identifier: 16 random bytes, base58.
fn mint_object_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bs58::encode(bytes).into_string()
}

impl<L: Ledger, S: ObjectStore, R: RateSource> AdvertService<L, S, R> {
    /// Prices a hosting contract without committing to anything.
    pub async fn quote(
        &self,
        file_size: u64,
        retention_minutes: u64,
    ) -> Result<u64, AdvertError> {
        if file_size == 0 {
            return Err(AdvertError::invalid(
                "ERR_NO_SIZE",
                "Provide the size of the file you want to host.",
            ));
        }
        self.check_hosting_terms(file_size, retention_minutes)?;
        Ok(self.quoter.price_for(file_size, retention_minutes).await)
    }

    /// Authorizes one upload: mints an object identifier, prices the
    /// hosting period, and issues a pre-authorized upload URL whose store
    /// retention extends a grace period past the advertised expiry.
    pub async fn authorize_upload(
        &self,
        uploader_identity: &str,
        file_size: u64,
        retention_minutes: u64,
    ) -> Result<UploadGrant, AdvertError> {
        if uploader_identity.is_empty() {
            return Err(AdvertError::missing_identity_key());
        }
        if file_size == 0 {
            return Err(AdvertError::invalid(
                "ERR_INVALID_SIZE",
                "The file size must be a positive integer.",
            ));
        }
        self.check_hosting_terms(file_size, retention_minutes)?;

        let amount = self.quoter.price_for(file_size, retention_minutes).await;
        let object_id = mint_object_id();
        let expiry_time = self.unix_now() + retention_minutes * 60;

        let upload = self
            .store
            .upload_url(
                &self.object_path(&object_id),
                file_size,
                expiry_time + RETENTION_GRACE_SECONDS,
            )
            .await?;

        info!(
            "Authorized upload of {} bytes to object {} for {} minutes",
            file_size, object_id, retention_minutes
        );

        Ok(UploadGrant {
            upload_url: upload.url,
            required_headers: upload.required_headers,
            object_id,
            amount,
        })
    }

    /// Size and retention bounds shared by quoting and upload
    /// authorization. Zero-size is rejected by each caller with its own
    /// code before this runs.
    fn check_hosting_terms(
        &self,
        file_size: u64,
        retention_minutes: u64,
    ) -> Result<(), AdvertError> {
        if retention_minutes == 0 {
            return Err(AdvertError::invalid(
                "ERR_NO_RETENTION_PERIOD",
                "Specify the number of minutes to host the file.",
            ));
        }
        if retention_minutes < self.settings.min_hosting_minutes {
            return Err(AdvertError::invalid(
                "ERR_INVALID_RETENTION_PERIOD",
                format!(
                    "The retention period must be at least {} minutes",
                    self.settings.min_hosting_minutes
                ),
            ));
        }
        if retention_minutes > MAX_RETENTION_MINUTES {
            return Err(AdvertError::invalid(
                "ERR_INVALID_RETENTION_PERIOD",
                "The retention period must be less than 69 million minutes (about 130 years)",
            ));
        }
        if file_size > MAX_FILE_SIZE_BYTES {
            return Err(AdvertError::invalid(
                "ERR_INVALID_SIZE",
                format!("Max supported file size is {} bytes.", MAX_FILE_SIZE_BYTES),
            ));
        }
        Ok(())
    }
}
