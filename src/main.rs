// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info};

mod advert;
mod config;
mod ledger;
mod logging;
mod pricing;
mod store;
mod uhrp;

use crate::advert::{AdvertService, AdvertiseRequest, Failure, Page, RenewRequest, ServiceSettings};
use crate::ledger::WalletLedger;
use crate::pricing::{HttpRateSource, Quoter};
use crate::store::S3ObjectStore;
use crate::uhrp::types::ContentHash;
use crate::uhrp::url::{hash_from_url, url_for_hash};

type HostService = AdvertService<WalletLedger, S3ObjectStore, HttpRateSource>;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.toml",
        global = true
    )]
    config: String,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Commit a content availability advertisement to the ledger
    Advertise {
        /// Identifier of the hosted object within the store
        #[arg(long)]
        object_id: String,

        /// URL where the content is served
        #[arg(long)]
        url: String,

        /// SHA-256 of the content, hex encoded
        #[arg(long, conflicts_with = "file")]
        hash: Option<String>,

        /// File to hash instead of passing --hash
        #[arg(long)]
        file: Option<PathBuf>,

        /// Unix seconds until which hosting is committed
        #[arg(long)]
        expiry: u64,

        /// Content length in bytes, taken from --file when omitted
        #[arg(long)]
        length: Option<u64>,

        /// MIME type to advertise
        #[arg(long)]
        content_type: Option<String>,

        /// Uploader identity key, defaults to the host identity
        #[arg(long)]
        uploader: Option<String>,
    },
    /// Resolve a UHRP URL to the hosted file's metadata
    Find {
        /// UHRP URL naming the content
        #[arg(long)]
        uhrp_url: String,

        /// Uploader identity key, defaults to the host identity
        #[arg(long)]
        uploader: Option<String>,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        offset: Option<u32>,
    },
    /// List an uploader's unexpired advertisements
    List {
        /// Uploader identity key, defaults to the host identity
        #[arg(long)]
        uploader: Option<String>,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        offset: Option<u32>,
    },
    /// Extend an advertisement's hosting commitment
    Renew {
        /// UHRP URL naming the content
        #[arg(long)]
        uhrp_url: String,

        /// Minutes to add to the current expiry
        #[arg(long)]
        minutes: u64,

        /// Uploader identity key, defaults to the host identity
        #[arg(long)]
        uploader: Option<String>,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        offset: Option<u32>,
    },
    /// Price a hosting contract
    Quote {
        /// File size in bytes
        #[arg(long)]
        size: u64,

        /// Minutes of hosting
        #[arg(long)]
        retention: u64,
    },
    /// Authorize an upload: mint an object id and a pre-authorized URL
    AuthorizeUpload {
        /// File size in bytes
        #[arg(long)]
        size: u64,

        /// Minutes of hosting
        #[arg(long)]
        retention: u64,

        /// Uploader identity key, defaults to the host identity
        #[arg(long)]
        uploader: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match config::load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", cli.config, e);
            process::exit(1);
        }
    };

    let _log_guard = logging::init_logging(config.logging.as_ref(), cli.verbose)?;

    info!("UHRP host v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration from: {}", cli.config);

    let service = initialize_service(&config)?;
    let host_identity = config.ledger.identity_key.clone();
    let uploader_or_host = |uploader: Option<String>| uploader.unwrap_or_else(|| host_identity.clone());

    match cli.command {
        Commands::Advertise {
            object_id,
            url,
            hash,
            file,
            expiry,
            length,
            content_type,
            uploader,
        } => {
            let (content_hash, content_length) = content_identity(hash, file, length).await?;
            let request = AdvertiseRequest {
                object_id,
                url,
                content_hash,
                uploader_identity: uploader_or_host(uploader),
                expiry_time: expiry,
                content_length,
                content_type,
            };
            match service.advertise(request).await {
                Ok(receipt) => print_success(json!({
                    "status": "success",
                    "txid": receipt.txid,
                    "uhrpUrl": url_for_hash(&content_hash),
                })),
                Err(e) => report_failure(e, "ERR_INTERNAL"),
            }
        }
        Commands::Find {
            uhrp_url,
            uploader,
            limit,
            offset,
        } => {
            hash_from_url(&uhrp_url).context("Invalid UHRP URL")?;
            let page = Page { limit, offset };
            match service.find(&uhrp_url, &uploader_or_host(uploader), page).await {
                Ok(view) => print_success(json!({
                    "status": "success",
                    "data": view,
                })),
                Err(e) => report_failure(e, "ERR_FIND"),
            }
        }
        Commands::List {
            uploader,
            limit,
            offset,
        } => {
            let page = Page { limit, offset };
            match service.list(&uploader_or_host(uploader), page).await {
                Ok(uploads) => print_success(json!({
                    "status": "success",
                    "uploads": uploads,
                })),
                Err(e) => report_failure(e, "ERR_LIST"),
            }
        }
        Commands::Renew {
            uhrp_url,
            minutes,
            uploader,
            limit,
            offset,
        } => {
            hash_from_url(&uhrp_url).context("Invalid UHRP URL")?;
            let request = RenewRequest {
                uhrp_url,
                uploader_identity: uploader_or_host(uploader),
                additional_minutes: minutes,
                page: Page { limit, offset },
            };
            match service.renew(request).await {
                Ok(receipt) => print_success(json!({
                    "status": "success",
                    "prevExpiryTime": receipt.prev_expiry_time,
                    "newExpiryTime": receipt.new_expiry_time,
                    "amount": receipt.amount,
                })),
                Err(e) => report_failure(e, "ERR_INTERNAL_RENEW"),
            }
        }
        Commands::Quote { size, retention } => match service.quote(size, retention).await {
            Ok(satoshis) => print_success(json!({ "quote": satoshis })),
            Err(e) => report_failure(e, "ERR_INTERNAL"),
        },
        Commands::AuthorizeUpload {
            size,
            retention,
            uploader,
        } => {
            match service
                .authorize_upload(&uploader_or_host(uploader), size, retention)
                .await
            {
                Ok(grant) => print_success(json!({
                    "status": "success",
                    "uploadURL": grant.upload_url,
                    "requiredHeaders": grant.required_headers,
                    "objectId": grant.object_id,
                    "amount": grant.amount,
                    "description": "File can now be uploaded.",
                })),
                Err(e) => report_failure(e, "ERR_INTERNAL_UPLOAD"),
            }
        }
    }

    Ok(())
}

/// Wire the service against the real ledger, store, and rate backends
fn initialize_service(config: &config::Config) -> Result<HostService> {
    let ledger = WalletLedger::new(&config.ledger)?;
    let store = S3ObjectStore::new(&config.store);
    let rates = HttpRateSource::new(&config.pricing.rate_endpoint)?;
    let quoter = Quoter::new(
        Arc::new(rates),
        config.pricing.price_per_gb_month,
        config.pricing.fallback_rate,
    );
    let settings = ServiceSettings::from_config(config)?;

    let service = AdvertService::new(Arc::new(ledger), Arc::new(store), quoter, settings);

    info!("Advertisement service initialized successfully");

    Ok(service)
}

/// The content hash and length to advertise, from either an explicit hex
/// digest or a local file.
async fn content_identity(
    hash: Option<String>,
    file: Option<PathBuf>,
    length: Option<u64>,
) -> Result<(ContentHash, u64)> {
    match (hash, file) {
        (Some(hex_digest), _) => {
            let content_hash = ContentHash::from_hex(&hex_digest)?;
            let content_length =
                length.context("--length is required when passing --hash")?;
            Ok((content_hash, content_length))
        }
        (None, Some(path)) => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let digest = Sha256::digest(&bytes);
            let content_hash = ContentHash::from_bytes(digest.as_slice())?;
            Ok((content_hash, length.unwrap_or(bytes.len() as u64)))
        }
        (None, None) => anyhow::bail!("Pass either --hash or --file"),
    }
}

fn print_success(value: serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
}

/// Log the full error, print the caller-facing failure envelope, and exit
fn report_failure(error: advert::AdvertError, fallback_code: &str) {
    error!("Operation failed: {}", error);
    let failure = Failure::from_error(&error, fallback_code);
    println!(
        "{}",
        serde_json::to_string_pretty(&failure).unwrap_or_default()
    );
    process::exit(1);
}
