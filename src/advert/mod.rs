pub mod cache;
pub mod error;
pub mod issue;
pub mod list;
pub mod renew;
pub mod resolve;
pub mod service;
pub mod upload;

pub use error::{AdvertError, Failure};
pub use issue::{AdvertiseReceipt, AdvertiseRequest};
pub use list::UploadEntry;
pub use renew::{RenewRequest, RenewalReceipt};
pub use resolve::FileMetadataView;
pub use service::{AdvertService, Page, ServiceSettings};
pub use upload::UploadGrant;

#[cfg(test)]
mod tests;
