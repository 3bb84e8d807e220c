pub mod client;
pub mod error;
pub mod fake;
pub mod output;
pub mod wallet;

pub use client::Ledger;
pub use error::LedgerError;
pub use wallet::WalletLedger;
