use crate::advert::cache::TtlCache;
use crate::advert::error::AdvertError;
use crate::config::Config;
use crate::ledger::client::Ledger;
use crate::ledger::output::DEFAULT_QUERY_LIMIT;
use crate::pricing::price::Quoter;
use crate::pricing::rates::RateSource;
use crate::store::object_store::ObjectStore;
use crate::uhrp::types::HostKey;
use chrono::Utc;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

/// The ledger collection that holds every advertisement output.
pub const ADVERTISEMENT_COLLECTION: &str = "uhrp advertisements";

/// Every advertisement output carries exactly one satoshi.
pub const OUTPUT_VALUE_SATOSHIS: u64 = 1;

/// Largest file a host will commit to serving.
pub const MAX_FILE_SIZE_BYTES: u64 = 11_000_000_000;

/// Longest hosting commitment accepted, about 130 years.
pub const MAX_RETENTION_MINUTES: u64 = 69_000_000;

/// Objects stay retrievable this long past their advertised expiry so
/// in-flight downloads and renewals are not cut off at the boundary.
pub const RETENTION_GRACE_SECONDS: u64 = 300;

/// How many records a content-type lookup scans per object.
pub(crate) const CONTENT_TYPE_QUERY_LIMIT: u32 = 50;

const MIME_CACHE_CAPACITY: usize = 1024;
const MIME_CACHE_TTL: Duration = Duration::from_secs(300);

/// Paging controls for query-backed operations. Unset values fall back to
/// the ledger's defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct Page {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Page {
    pub fn effective(&self) -> (u32, u32) {
        (
            self.limit.unwrap_or(DEFAULT_QUERY_LIMIT),
            self.offset.unwrap_or(0),
        )
    }
}

/// Host-side parameters shared by every advertisement operation.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// The key this host signs new advertisements with.
    pub host_identity: HostKey,
    /// Overlay topics new and renewed advertisements are relayed to.
    pub relay_topics: Vec<String>,
    /// Key prefix under which hosted objects live in the store.
    pub store_prefix: String,
    /// Shortest hosting commitment accepted, in minutes.
    pub min_hosting_minutes: u64,
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> Result<Self, AdvertError> {
        let host_identity = HostKey::from_hex(&config.ledger.identity_key)?;
        Ok(ServiceSettings {
            host_identity,
            relay_topics: config.ledger.relay_topics.clone(),
            store_prefix: config.store.prefix.clone(),
            min_hosting_minutes: config.hosting.min_hosting_minutes,
        })
    }
}

/// Coordinates the ledger, object store, and pricing backends behind the
/// advertisement operations: issuing, resolution, listing, renewal, and
/// upload authorization.
pub struct AdvertService<L, S, R> {
    pub(crate) ledger: Arc<L>,
    pub(crate) store: Arc<S>,
    pub(crate) quoter: Quoter<R>,
    pub(crate) settings: ServiceSettings,
    pub(crate) mime_types: TtlCache<String, String>,
}

impl<L: Ledger, S: ObjectStore, R: RateSource> AdvertService<L, S, R> {
    pub fn new(ledger: Arc<L>, store: Arc<S>, quoter: Quoter<R>, settings: ServiceSettings) -> Self {
        AdvertService {
            ledger,
            store,
            quoter,
            settings,
            mime_types: TtlCache::new(
                NonZeroUsize::new(MIME_CACHE_CAPACITY).unwrap(),
                MIME_CACHE_TTL,
            ),
        }
    }

    /// The store path an object identifier maps to.
    pub(crate) fn object_path(&self, object_id: &str) -> String {
        format!("{}/{}", self.settings.store_prefix, object_id)
    }

    /// Current UNIX time in seconds.
    pub(crate) fn unix_now(&self) -> u64 {
        Utc::now().timestamp() as u64
    }
}
