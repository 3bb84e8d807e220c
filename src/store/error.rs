use thiserror::Error;

/// Errors that can occur when interacting with the content store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Object with path {0} not found")]
    ObjectNotFound(String),

    #[error("Access denied for object {0}: {1}")]
    AccessDenied(String, String),

    #[error("Failed to read metadata for object {0}: {1}")]
    MetadataError(String, String),

    #[error("Failed to set retention for object {0}: {1}")]
    RetentionError(String, String),

    #[error("Failed to presign upload for object {0}: {1}")]
    PresignError(String, String),

    #[error("Other store error: {0}")]
    Other(#[from] anyhow::Error),
}
