pub mod error;
pub mod fake;
pub mod price;
pub mod rates;

pub use error::PricingError;
pub use price::Quoter;
pub use rates::{HttpRateSource, RateSource};
