use crate::store::error::StoreError;
use crate::store::object_store::{ObjectMetadata, ObjectStore, UploadUrl};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// `FakeObjectStore` is an in-memory implementation of the `ObjectStore`
/// trait for testing purposes. It allows simulating present and missing
/// objects, per-path failures, and records the upload grants it issues.
#[derive(Clone)]
pub struct FakeObjectStore {
    objects: Arc<Mutex<HashMap<String, FakeObject>>>,
    fail_paths: Arc<Mutex<HashSet<String>>>,
    grants: Arc<Mutex<Vec<(String, u64, u64)>>>,
}

#[derive(Clone)]
struct FakeObject {
    size: Option<u64>,
    content_type: Option<String>,
    retain_until: Option<u64>,
}

impl FakeObjectStore {
    /// Create a new empty FakeObjectStore instance
    pub fn new() -> Self {
        FakeObjectStore {
            objects: Arc::new(Mutex::new(HashMap::new())),
            fail_paths: Arc::new(Mutex::new(HashSet::new())),
            grants: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Seed an object with metadata
    pub async fn fake_put_object(&self, path: &str, size: u64, content_type: Option<&str>) {
        let mut objects = self.objects.lock().await;
        objects.insert(
            path.to_string(),
            FakeObject {
                size: Some(size),
                content_type: content_type.map(|t| t.to_string()),
                retain_until: None,
            },
        );
    }

    /// The retention marker currently stamped on an object
    pub async fn fake_retention(&self, path: &str) -> Option<u64> {
        let objects = self.objects.lock().await;
        objects.get(path).and_then(|o| o.retain_until)
    }

    /// Simulate a failure for a specific path
    /// After calling this, every operation on this path returns an error
    pub async fn fake_fail_path(&self, path: &str) {
        let mut fail_paths = self.fail_paths.lock().await;
        fail_paths.insert(path.to_string());
    }

    /// Upload grants issued so far, as (path, size, retain_until)
    pub async fn fake_grants(&self) -> Vec<(String, u64, u64)> {
        self.grants.lock().await.clone()
    }

    async fn check_failure(&self, path: &str) -> bool {
        let fail_paths = self.fail_paths.lock().await;
        fail_paths.contains(path)
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn get_metadata(&self, path: &str) -> Result<ObjectMetadata, StoreError> {
        if self.check_failure(path).await {
            return Err(StoreError::MetadataError(
                path.to_string(),
                "Simulated failure".to_string(),
            ));
        }

        let objects = self.objects.lock().await;
        match objects.get(path) {
            Some(object) => Ok(ObjectMetadata {
                name: path.to_string(),
                size: object.size,
                content_type: object.content_type.clone(),
            }),
            None => Err(StoreError::ObjectNotFound(path.to_string())),
        }
    }

    async fn set_retention(&self, path: &str, retain_until: u64) -> Result<(), StoreError> {
        if self.check_failure(path).await {
            return Err(StoreError::RetentionError(
                path.to_string(),
                "Simulated failure".to_string(),
            ));
        }

        let mut objects = self.objects.lock().await;
        match objects.get_mut(path) {
            Some(object) => {
                object.retain_until = Some(retain_until);
                Ok(())
            }
            None => Err(StoreError::ObjectNotFound(path.to_string())),
        }
    }

    async fn upload_url(
        &self,
        path: &str,
        size: u64,
        retain_until: u64,
    ) -> Result<UploadUrl, StoreError> {
        if self.check_failure(path).await {
            return Err(StoreError::PresignError(
                path.to_string(),
                "Simulated failure".to_string(),
            ));
        }

        let mut grants = self.grants.lock().await;
        grants.push((path.to_string(), size, retain_until));

        let mut required_headers = HashMap::new();
        required_headers.insert("content-length".to_string(), size.to_string());

        Ok(UploadUrl {
            url: format!("memory://{}?retain_until={}", path, retain_until),
            required_headers,
        })
    }
}

#[cfg(test)]
impl Default for FakeObjectStore {
    fn default() -> Self {
        Self::new()
    }
}
