pub mod error;
pub mod fake;
pub mod object_store;
pub mod s3;

pub use error::StoreError;
pub use object_store::{ObjectMetadata, ObjectStore, UploadUrl};
pub use s3::S3ObjectStore;
