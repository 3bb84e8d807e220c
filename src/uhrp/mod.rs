pub mod error;
pub mod labels;
pub mod record;
pub mod types;
pub mod url;
pub mod varint;

pub use error::RecordError;
pub use record::Advertisement;
pub use types::{ContentHash, HostKey};
