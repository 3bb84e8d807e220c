use crate::store::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Metadata held by the store for one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// The object's path within the bucket.
    pub name: String,
    /// Size in bytes, when the store reports one.
    pub size: Option<u64>,
    /// MIME type, when the store reports one.
    pub content_type: Option<String>,
}

/// A presigned upload authorization.
#[derive(Debug, Clone)]
pub struct UploadUrl {
    pub url: String,
    /// Headers the uploader must send verbatim for the signature to hold.
    pub required_headers: HashMap<String, String>,
}

/// ObjectStore trait defining the interface to the bucket that holds the
/// advertised content
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Read an object's metadata
    ///
    /// * `path` - The object path within the bucket
    async fn get_metadata(&self, path: &str) -> Result<ObjectMetadata, StoreError>;

    /// Stamp an object with the Unix time until which it must be retained.
    /// Re-stamping an object replaces any earlier marker.
    ///
    /// * `path` - The object path within the bucket
    /// * `retain_until` - Unix seconds the object must survive until
    async fn set_retention(&self, path: &str, retain_until: u64) -> Result<(), StoreError>;

    /// Presign an upload for an object that does not exist yet
    ///
    /// * `path` - The object path within the bucket
    /// * `size` - The exact byte length the uploader committed to
    /// * `retain_until` - Unix seconds the object must survive until
    async fn upload_url(
        &self,
        path: &str,
        size: u64,
        retain_until: u64,
    ) -> Result<UploadUrl, StoreError>;
}

/// Implementation of ObjectStore trait for Arc<T> where T implements ObjectStore
///
/// This allows sharing store instances across threads and components efficiently.
#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    async fn get_metadata(&self, path: &str) -> Result<ObjectMetadata, StoreError> {
        (**self).get_metadata(path).await
    }

    async fn set_retention(&self, path: &str, retain_until: u64) -> Result<(), StoreError> {
        (**self).set_retention(path, retain_until).await
    }

    async fn upload_url(
        &self,
        path: &str,
        size: u64,
        retain_until: u64,
    ) -> Result<UploadUrl, StoreError> {
        (**self).upload_url(path, size, retain_until).await
    }
}
