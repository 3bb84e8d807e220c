use crate::config::StoreConfig;
use crate::store::error::StoreError;
use crate::store::object_store::{ObjectMetadata, ObjectStore, UploadUrl};
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::MetadataDirective;
use aws_sdk_s3::{config::Region, Client};
use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Duration;
use tracing::{debug, info};

/// Object metadata key holding the retention marker.
const RETENTION_METADATA_KEY: &str = "retain-until";

/// How long a presigned upload URL stays valid.
const UPLOAD_URL_TTL: Duration = Duration::from_secs(600);

/// Real S3 implementation of the ObjectStore trait
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a new S3ObjectStore instance from configuration
    pub fn new(config: &StoreConfig) -> Self {
        info!(
            "Creating S3ObjectStore with config: endpoint={:?}, region={}, bucket={}",
            config.endpoint, config.region, config.bucket
        );

        // Create a custom S3 client configuration for MinIO
        let mut s3_config_builder = aws_sdk_s3::config::Builder::new()
            .region(Region::new(config.region.clone()))
            .force_path_style(true); // MinIO requires path-style requests

        // Configure credentials if provided
        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "StaticCredentialsProvider",
            );

            s3_config_builder = s3_config_builder.credentials_provider(credentials);
        }

        // Configure endpoint
        if let Some(endpoint) = &config.endpoint {
            info!("Setting custom endpoint: {}", endpoint);
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(s3_config_builder.build());

        S3ObjectStore {
            client,
            bucket: config.bucket.clone(),
        }
    }
}

/// Renders a Unix timestamp as the RFC 3339 form stored in the retention
/// metadata marker.
fn retention_marker(retain_until: u64) -> Option<String> {
    let time = i64::try_from(retain_until)
        .ok()
        .and_then(|seconds| DateTime::<Utc>::from_timestamp(seconds, 0))?;
    Some(time.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_metadata(&self, path: &str) -> Result<ObjectMetadata, StoreError> {
        debug!("Reading metadata for object: {}", path);

        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                // Check if this is a service error and extract the specific error type
                if let aws_sdk_s3::error::SdkError::ServiceError(ref service_err) = e {
                    let err = service_err.err();
                    let metadata = err.meta();

                    // Check the error code
                    if let Some(code) = metadata.code() {
                        match code {
                            "NotFound" | "NoSuchKey" | "KeyNotFound" => {
                                return StoreError::ObjectNotFound(path.to_string());
                            }
                            "AccessDenied" => {
                                return StoreError::AccessDenied(path.to_string(), e.to_string());
                            }
                            _ => {}
                        }
                    }
                }

                // Fallback to string matching for other cases
                let error_str = e.to_string();
                if error_str.contains("NoSuchKey")
                    || error_str.contains("KeyNotFound")
                    || error_str.contains("does not exist")
                    || error_str.contains("404")
                    || error_str.contains("Not Found")
                {
                    StoreError::ObjectNotFound(path.to_string())
                } else if error_str.contains("AccessDenied") {
                    StoreError::AccessDenied(path.to_string(), error_str)
                } else {
                    StoreError::MetadataError(path.to_string(), error_str)
                }
            })?;

        let size = response.content_length().and_then(|l| u64::try_from(l).ok());
        let content_type = response.content_type().map(|t| t.to_string());

        Ok(ObjectMetadata {
            name: path.to_string(),
            size,
            content_type,
        })
    }

    async fn set_retention(&self, path: &str, retain_until: u64) -> Result<(), StoreError> {
        debug!("Setting retention for object {} to {}", path, retain_until);

        let marker = retention_marker(retain_until).ok_or_else(|| {
            StoreError::RetentionError(
                path.to_string(),
                format!("timestamp {} is out of range", retain_until),
            )
        })?;

        // The copy rewrites the object's metadata in place. Replacing
        // metadata drops the content type unless it is carried over, so it
        // is read first.
        let existing = self.get_metadata(path).await?;

        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(format!("{}/{}", self.bucket, path))
            .key(path)
            .metadata_directive(MetadataDirective::Replace)
            .metadata(RETENTION_METADATA_KEY, marker)
            .set_content_type(existing.content_type)
            .send()
            .await
            .map_err(|e| {
                let error_str = e.to_string();
                if error_str.contains("NoSuchKey")
                    || error_str.contains("404")
                    || error_str.contains("Not Found")
                {
                    StoreError::ObjectNotFound(path.to_string())
                } else {
                    StoreError::RetentionError(path.to_string(), error_str)
                }
            })?;

        Ok(())
    }

    async fn upload_url(
        &self,
        path: &str,
        size: u64,
        retain_until: u64,
    ) -> Result<UploadUrl, StoreError> {
        debug!("Presigning upload for object {} ({} bytes)", path, size);

        let marker = retention_marker(retain_until).ok_or_else(|| {
            StoreError::PresignError(
                path.to_string(),
                format!("timestamp {} is out of range", retain_until),
            )
        })?;

        let presigning = PresigningConfig::expires_in(UPLOAD_URL_TTL)
            .map_err(|e| StoreError::PresignError(path.to_string(), e.to_string()))?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_length(size as i64)
            .metadata(RETENTION_METADATA_KEY, marker)
            .presigned(presigning)
            .await
            .map_err(|e| StoreError::PresignError(path.to_string(), e.to_string()))?;

        let required_headers = presigned
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Ok(UploadUrl {
            url: presigned.uri().to_string(),
            required_headers,
        })
    }
}
