use crate::advert::error::AdvertError;
use crate::advert::issue::AdvertiseRequest;
use crate::advert::renew::RenewRequest;
use crate::advert::service::{
    AdvertService, Page, ServiceSettings, ADVERTISEMENT_COLLECTION, RETENTION_GRACE_SECONDS,
};
use crate::ledger::client::Ledger;
use crate::ledger::fake::FakeLedger;
use crate::ledger::output::{NewOutput, OutputQuery, OutputRef};
use crate::pricing::fake::FakeRateSource;
use crate::pricing::price::Quoter;
use crate::store::fake::FakeObjectStore;
use crate::uhrp::labels::Label;
use crate::uhrp::record::Advertisement;
use crate::uhrp::types::{ContentHash, HostKey};
use crate::uhrp::url::url_for_hash;
use chrono::Utc;
use std::sync::Arc;

const UPLOADER: &str = "02aabbccdd";
const OTHER_UPLOADER: &str = "03ffee0011";

fn unix_now() -> u64 {
    Utc::now().timestamp() as u64
}

fn test_service() -> (
    AdvertService<FakeLedger, FakeObjectStore, FakeRateSource>,
    FakeLedger,
    FakeObjectStore,
    FakeRateSource,
) {
    let ledger = FakeLedger::new();
    let store = FakeObjectStore::new();
    let rates = FakeRateSource::new(30.0);
    let quoter = Quoter::new(Arc::new(rates.clone()), 0.05, 30.0);
    let settings = ServiceSettings {
        host_identity: HostKey::from_bytes(&[2u8; 33]).unwrap(),
        relay_topics: vec!["tm_uhrp".to_string()],
        store_prefix: "cdn".to_string(),
        min_hosting_minutes: 15,
    };
    let service = AdvertService::new(
        Arc::new(ledger.clone()),
        Arc::new(store.clone()),
        quoter,
        settings,
    );
    (service, ledger, store, rates)
}

fn content_hash(seed: u8) -> ContentHash {
    ContentHash::from_bytes(&[seed; 32]).unwrap()
}

fn advertise_request(object_id: &str, seed: u8, expiry_time: u64) -> AdvertiseRequest {
    AdvertiseRequest {
        object_id: object_id.to_string(),
        url: format!("https://host.example.com/cdn/{}", object_id),
        content_hash: content_hash(seed),
        uploader_identity: UPLOADER.to_string(),
        expiry_time,
        content_length: 4096,
        content_type: Some("text/plain".to_string()),
    }
}

fn renew_request(uhrp_url: &str, additional_minutes: u64) -> RenewRequest {
    RenewRequest {
        uhrp_url: uhrp_url.to_string(),
        uploader_identity: UPLOADER.to_string(),
        additional_minutes,
        page: Page::default(),
    }
}

fn error_code<T: std::fmt::Debug>(result: Result<T, AdvertError>) -> String {
    match result {
        Ok(value) => panic!("expected an error, got {:?}", value),
        Err(e) => e.code().unwrap_or_default().to_string(),
    }
}

async fn current_outpoint(ledger: &FakeLedger, uhrp_url: &str) -> OutputRef {
    let query = OutputQuery::labeled(
        ADVERTISEMENT_COLLECTION,
        vec![Label::ContentUrl(uhrp_url.to_string()).render()],
    );
    let outputs = ledger.query_outputs(&query).await.unwrap();
    assert_eq!(
        outputs.len(),
        1,
        "expected exactly one spendable advertisement for {}",
        uhrp_url
    );
    outputs[0].outpoint.clone()
}

#[tokio::test]
async fn advertise_then_find_reports_committed_metadata() {
    let (service, ledger, store, _) = test_service();
    store
        .fake_put_object("cdn/abc123", 4096, Some("text/plain"))
        .await;

    let expiry_time = unix_now() + 3600;
    let receipt = service
        .advertise(advertise_request("abc123", 7, expiry_time))
        .await
        .unwrap();

    let uhrp_url = url_for_hash(&content_hash(7));
    let view = service
        .find(&uhrp_url, UPLOADER, Page::default())
        .await
        .unwrap();

    assert_eq!(view.name, "cdn/abc123");
    assert_eq!(view.size, "4096");
    assert_eq!(view.mime_type, "text/plain");
    assert_eq!(view.expiry_time, expiry_time);

    let relayed = ledger.fake_relayed();
    assert_eq!(relayed, vec![(receipt.txid, vec!["tm_uhrp".to_string()])]);

    let outpoint = current_outpoint(&ledger, &uhrp_url).await;
    assert_eq!(
        ledger.fake_value(&outpoint),
        Some(1),
        "advertisements must be committed as one-satoshi outputs"
    );
}

#[tokio::test]
async fn find_rejects_missing_identity_and_url() {
    let (service, _, _, _) = test_service();

    let missing_identity = service
        .find("uhrp://whatever", "", Page::default())
        .await;
    assert_eq!(error_code(missing_identity), "ERR_MISSING_IDENTITY_KEY");

    let missing_url = service.find("", UPLOADER, Page::default()).await;
    assert_eq!(error_code(missing_url), "ERR_NO_UHRP_URL");
}

#[tokio::test]
async fn find_reports_not_found_without_advertisements() {
    let (service, _, _, _) = test_service();
    let result = service
        .find(&url_for_hash(&content_hash(1)), UPLOADER, Page::default())
        .await;
    assert!(matches!(result, Err(AdvertError::NotFound)));
    assert_eq!(
        AdvertError::NotFound.code(),
        Some("ERR_NOT_FOUND"),
    );
}

#[tokio::test]
async fn find_reports_expired_when_best_record_lapsed() {
    let (service, _, store, _) = test_service();
    store.fake_put_object("cdn/old", 10, None).await;

    service
        .advertise(advertise_request("old", 11, unix_now() - 120))
        .await
        .unwrap();

    let result = service
        .find(&url_for_hash(&content_hash(11)), UPLOADER, Page::default())
        .await;
    assert!(
        matches!(result, Err(AdvertError::Expired)),
        "a lapsed advertisement is expired, not missing"
    );
}

#[tokio::test]
async fn freshest_advertisement_shadows_lapsed_ones() {
    let (service, _, store, _) = test_service();
    store.fake_put_object("cdn/fresh", 10, None).await;

    let live_expiry = unix_now() + 3600;
    service
        .advertise(advertise_request("fresh", 12, unix_now() - 120))
        .await
        .unwrap();
    service
        .advertise(advertise_request("fresh", 12, live_expiry))
        .await
        .unwrap();

    let view = service
        .find(&url_for_hash(&content_hash(12)), UPLOADER, Page::default())
        .await
        .unwrap();
    assert_eq!(view.expiry_time, live_expiry);
}

#[tokio::test]
async fn equal_expiry_resolves_to_smallest_outpoint() {
    let (service, _, store, _) = test_service();
    store.fake_put_object("cdn/aaa", 100, None).await;
    store.fake_put_object("cdn/bbb", 200, None).await;

    let expiry_time = unix_now() + 3600;
    service
        .advertise(advertise_request("aaa", 13, expiry_time))
        .await
        .unwrap();
    service
        .advertise(advertise_request("bbb", 13, expiry_time))
        .await
        .unwrap();

    let view = service
        .find(&url_for_hash(&content_hash(13)), UPLOADER, Page::default())
        .await
        .unwrap();
    assert_eq!(
        view.name, "cdn/aaa",
        "ties on expiry must resolve to the earliest outpoint"
    );
}

#[tokio::test]
async fn find_honors_query_paging() {
    let (service, _, store, _) = test_service();
    store.fake_put_object("cdn/paged", 10, None).await;

    let near_expiry = unix_now() + 600;
    let far_expiry = unix_now() + 7200;
    service
        .advertise(advertise_request("paged", 14, near_expiry))
        .await
        .unwrap();
    service
        .advertise(advertise_request("paged", 14, far_expiry))
        .await
        .unwrap();

    let uhrp_url = url_for_hash(&content_hash(14));
    let full = service
        .find(&uhrp_url, UPLOADER, Page::default())
        .await
        .unwrap();
    assert_eq!(full.expiry_time, far_expiry);

    let first_page = service
        .find(
            &uhrp_url,
            UPLOADER,
            Page {
                limit: Some(1),
                offset: Some(0),
            },
        )
        .await
        .unwrap();
    assert_eq!(
        first_page.expiry_time, near_expiry,
        "a capped scan only considers the requested page"
    );
}

#[tokio::test]
async fn find_falls_back_to_advertised_content_type() {
    let (service, _, store, _) = test_service();
    store.fake_put_object("cdn/legacy", 10, None).await;

    let mut request = advertise_request("legacy", 15, unix_now() + 3600);
    request.content_type = Some("image/png".to_string());
    service.advertise(request).await.unwrap();

    let view = service
        .find(&url_for_hash(&content_hash(15)), UPLOADER, Page::default())
        .await
        .unwrap();
    assert_eq!(
        view.mime_type, "image/png",
        "store metadata without a type should fall back to the advertised one"
    );
}

#[tokio::test]
async fn content_type_lookup_caches_and_degrades() {
    let (service, ledger, _, _) = test_service();

    service
        .advertise(advertise_request("typed", 16, unix_now() + 3600))
        .await
        .unwrap();

    assert_eq!(
        service.content_type_for("typed").await,
        Some("text/plain".to_string())
    );

    ledger.fake_fail_queries();
    assert_eq!(
        service.content_type_for("typed").await,
        Some("text/plain".to_string()),
        "a cached type should survive a ledger outage"
    );
    assert_eq!(
        service.content_type_for("never-seen").await,
        None,
        "query failures degrade to no answer"
    );
}

#[tokio::test]
async fn content_type_ignores_expired_records() {
    let (service, _, _, _) = test_service();

    let mut request = advertise_request("stale-mime", 17, unix_now() - 120);
    request.content_type = Some("video/mp4".to_string());
    service.advertise(request).await.unwrap();

    assert_eq!(
        service.content_type_for("stale-mime").await,
        None,
        "expired advertisements must not vouch for a content type"
    );
}

#[tokio::test]
async fn list_scopes_to_uploader_and_drops_expired() {
    let (service, _, _, _) = test_service();

    let first_expiry = unix_now() + 600;
    let second_expiry = unix_now() + 1200;
    service
        .advertise(advertise_request("one", 21, first_expiry))
        .await
        .unwrap();
    service
        .advertise(advertise_request("two", 22, second_expiry))
        .await
        .unwrap();
    service
        .advertise(advertise_request("lapsed", 23, unix_now() - 120))
        .await
        .unwrap();

    let mut other = advertise_request("theirs", 24, unix_now() + 600);
    other.uploader_identity = OTHER_UPLOADER.to_string();
    service.advertise(other).await.unwrap();

    let uploads = service.list(UPLOADER, Page::default()).await.unwrap();
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0].uhrp_url, url_for_hash(&content_hash(21)));
    assert_eq!(uploads[0].expiry_time, first_expiry);
    assert_eq!(uploads[1].uhrp_url, url_for_hash(&content_hash(22)));
    assert_eq!(uploads[1].expiry_time, second_expiry);

    let theirs = service.list(OTHER_UPLOADER, Page::default()).await.unwrap();
    assert_eq!(theirs.len(), 1);

    let anonymous = service.list("", Page::default()).await;
    assert_eq!(error_code(anonymous), "ERR_MISSING_IDENTITY_KEY");
}

#[tokio::test]
async fn list_skips_records_missing_labels() {
    let (service, ledger, _, _) = test_service();

    let expiry_time = unix_now() + 3600;
    service
        .advertise(advertise_request("complete", 25, expiry_time))
        .await
        .unwrap();

    // A record without a URL label, and one without an expiry label.
    ledger
        .create_output(NewOutput {
            collection: ADVERTISEMENT_COLLECTION.to_string(),
            fields: Vec::new(),
            labels: vec![
                Label::Uploader(UPLOADER.to_string()).render(),
                Label::Expiry(expiry_time).render(),
            ],
            value: 1,
            description: "seed without url".to_string(),
        })
        .await
        .unwrap();
    ledger
        .create_output(NewOutput {
            collection: ADVERTISEMENT_COLLECTION.to_string(),
            fields: Vec::new(),
            labels: vec![
                Label::Uploader(UPLOADER.to_string()).render(),
                Label::ContentUrl(url_for_hash(&content_hash(26))).render(),
            ],
            value: 1,
            description: "seed without expiry".to_string(),
        })
        .await
        .unwrap();

    let uploads = service.list(UPLOADER, Page::default()).await.unwrap();
    assert_eq!(uploads.len(), 1, "half-labeled records must be skipped");
    assert_eq!(uploads[0].uhrp_url, url_for_hash(&content_hash(25)));
}

#[tokio::test]
async fn renew_extends_expiry_and_retires_predecessor() {
    let (service, ledger, store, _) = test_service();
    store
        .fake_put_object("cdn/renewed", 1_000_000_000, Some("text/plain"))
        .await;

    let expiry_time = unix_now() + 3600;
    service
        .advertise(advertise_request("renewed", 31, expiry_time))
        .await
        .unwrap();

    let uhrp_url = url_for_hash(&content_hash(31));
    let predecessor = current_outpoint(&ledger, &uhrp_url).await;

    let receipt = service
        .renew(renew_request(&uhrp_url, 43_200))
        .await
        .unwrap();

    assert_eq!(receipt.prev_expiry_time, expiry_time);
    assert_eq!(receipt.new_expiry_time, expiry_time + 43_200 * 60);
    assert_eq!(
        receipt.amount, 166_666,
        "one gigabyte for one month at rate 30 should price at 166666 satoshis"
    );

    assert!(
        ledger.fake_is_spent(&predecessor),
        "the old advertisement must be retired by the renewal"
    );

    let view = service
        .find(&uhrp_url, UPLOADER, Page::default())
        .await
        .unwrap();
    assert_eq!(view.expiry_time, receipt.new_expiry_time);

    assert_eq!(
        store.fake_retention("cdn/renewed").await,
        Some(receipt.new_expiry_time + RETENTION_GRACE_SECONDS)
    );

    let successor = current_outpoint(&ledger, &uhrp_url).await;
    assert_ne!(successor, predecessor);
    assert_eq!(ledger.fake_value(&successor), Some(1));

    let relayed = ledger.fake_relayed();
    assert_eq!(relayed.len(), 2, "issue and renewal must both be relayed");
    assert_eq!(relayed[1].0, successor.txid);
    assert_eq!(relayed[1].1, vec!["tm_uhrp".to_string()]);
}

#[tokio::test]
async fn renewal_preserves_everything_but_expiry() {
    let (service, ledger, store, _) = test_service();
    store
        .fake_put_object("cdn/kept", 4096, Some("text/plain"))
        .await;

    let expiry_time = unix_now() + 3600;
    let original = advertise_request("kept", 32, expiry_time);
    service.advertise(original.clone()).await.unwrap();

    let uhrp_url = url_for_hash(&content_hash(32));
    let receipt = service.renew(renew_request(&uhrp_url, 60)).await.unwrap();

    let mut query = OutputQuery::labeled(
        ADVERTISEMENT_COLLECTION,
        vec![Label::ContentUrl(uhrp_url.clone()).render()],
    );
    query.include_fields = true;
    let outputs = ledger.query_outputs(&query).await.unwrap();
    assert_eq!(outputs.len(), 1);

    let record = Advertisement::decode(outputs[0].fields.as_ref().unwrap()).unwrap();
    assert_eq!(record.url, original.url);
    assert_eq!(record.content_hash, original.content_hash);
    assert_eq!(record.content_length, original.content_length);
    assert_eq!(record.content_type, original.content_type);
    assert_eq!(record.expiry_time, receipt.new_expiry_time);

    let labels = &outputs[0].labels;
    assert!(
        labels.contains(&Label::Uploader(UPLOADER.to_string()).render()),
        "the uploader label must be carried onto the successor"
    );
    assert!(
        labels.contains(&Label::ContentType("text/plain".to_string()).render()),
        "the content type label must survive renewal"
    );
    assert!(labels.contains(&Label::Expiry(receipt.new_expiry_time).render()));
}

#[tokio::test]
async fn renew_validation_codes() {
    let (service, _, _, _) = test_service();

    let mut anonymous = renew_request("uhrp://whatever", 60);
    anonymous.uploader_identity = String::new();
    assert_eq!(
        error_code(service.renew(anonymous).await),
        "ERR_MISSING_IDENTITY_KEY"
    );

    assert_eq!(
        error_code(service.renew(renew_request("", 60)).await),
        "ERR_MISSING_FIELDS"
    );

    assert_eq!(
        error_code(service.renew(renew_request("uhrp://whatever", 0)).await),
        "ERR_INVALID_TIME"
    );

    assert_eq!(
        error_code(
            service
                .renew(renew_request("uhrp://whatever", 69_000_001))
                .await
        ),
        "ERR_INVALID_RETENTION_PERIOD"
    );

    let absent = service
        .renew(renew_request(&url_for_hash(&content_hash(33)), 60))
        .await;
    assert!(matches!(absent, Err(AdvertError::NotFound)));
}

#[tokio::test]
async fn renew_requires_payload_fields() {
    let (service, ledger, store, _) = test_service();
    store.fake_put_object("cdn/stripped", 10, None).await;

    service
        .advertise(advertise_request("stripped", 34, unix_now() + 3600))
        .await
        .unwrap();

    ledger.fake_strip_fields();
    let result = service
        .renew(renew_request(&url_for_hash(&content_hash(34)), 60))
        .await;
    assert_eq!(error_code(result), "ERR_OLD_ADVERTISEMENT_NOT_FOUND");
}

#[tokio::test]
async fn renew_refuses_ambiguous_expiry_tie() {
    let (service, _, store, _) = test_service();
    store.fake_put_object("cdn/tied", 10, None).await;

    let expiry_time = unix_now() + 3600;
    service
        .advertise(advertise_request("tied", 35, expiry_time))
        .await
        .unwrap();
    service
        .advertise(advertise_request("tied", 35, expiry_time))
        .await
        .unwrap();

    let uhrp_url = url_for_hash(&content_hash(35));
    service
        .find(&uhrp_url, UPLOADER, Page::default())
        .await
        .expect("resolution tolerates ties deterministically");

    let result = service.renew(renew_request(&uhrp_url, 60)).await;
    assert_eq!(
        error_code(result),
        "ERR_RENEWAL_CONFLICT",
        "renewal must refuse to pick among records sharing the winning expiry"
    );
}

#[tokio::test]
async fn renew_conflict_on_concurrent_spend_then_retry_succeeds() {
    let (service, ledger, store, _) = test_service();
    store.fake_put_object("cdn/raced", 10, None).await;

    let expiry_time = unix_now() + 3600;
    service
        .advertise(advertise_request("raced", 36, expiry_time))
        .await
        .unwrap();

    let uhrp_url = url_for_hash(&content_hash(36));
    let outpoint = current_outpoint(&ledger, &uhrp_url).await;

    // A competing renewal spends the output, but the index still lists it.
    ledger.fake_mark_spent(&outpoint);
    let lost = service.renew(renew_request(&uhrp_url, 30)).await;
    assert!(matches!(lost, Err(AdvertError::Conflict)));

    // The competitor's successor becomes visible; a retry renews that one.
    let competitor_expiry = expiry_time + 600;
    service
        .advertise(advertise_request("raced", 36, competitor_expiry))
        .await
        .unwrap();

    let receipt = service.renew(renew_request(&uhrp_url, 30)).await.unwrap();
    assert_eq!(receipt.prev_expiry_time, competitor_expiry);
    assert_eq!(receipt.new_expiry_time, competitor_expiry + 30 * 60);
}

#[tokio::test]
async fn renew_on_undecodable_record_reports_malformed() {
    let (service, ledger, store, _) = test_service();
    store.fake_put_object("cdn/garbled", 10, Some("text/plain")).await;

    let uhrp_url = url_for_hash(&content_hash(37));
    ledger
        .create_output(NewOutput {
            collection: ADVERTISEMENT_COLLECTION.to_string(),
            fields: vec![vec![0xde, 0xad]],
            labels: vec![
                Label::ContentUrl(uhrp_url.clone()).render(),
                Label::ObjectId("garbled".to_string()).render(),
                Label::Uploader(UPLOADER.to_string()).render(),
                Label::Expiry(unix_now() + 3600).render(),
            ],
            value: 1,
            description: "seed with a garbled payload".to_string(),
        })
        .await
        .unwrap();

    // Label-driven resolution never touches the payload.
    service
        .find(&uhrp_url, UPLOADER, Page::default())
        .await
        .expect("find should succeed on labels alone");

    let result = service.renew(renew_request(&uhrp_url, 60)).await;
    assert_eq!(error_code(result), "ERR_MALFORMED_RECORD");
}

#[tokio::test]
async fn authorize_upload_issues_priced_grant() {
    let (service, _, store, _) = test_service();

    let before = unix_now();
    let grant = service
        .authorize_upload(UPLOADER, 1_000_000_000, 43_200)
        .await
        .unwrap();
    let after = unix_now();

    assert_eq!(grant.amount, 166_666);
    assert!(!grant.upload_url.is_empty());
    assert_eq!(
        bs58::decode(&grant.object_id).into_vec().unwrap().len(),
        16,
        "object identifiers are sixteen random bytes in base58"
    );

    let grants = store.fake_grants().await;
    assert_eq!(grants.len(), 1);
    let (path, size, retain_until) = grants[0].clone();
    assert_eq!(path, format!("cdn/{}", grant.object_id));
    assert_eq!(size, 1_000_000_000);

    let expected_low = before + 43_200 * 60 + RETENTION_GRACE_SECONDS;
    let expected_high = after + 43_200 * 60 + RETENTION_GRACE_SECONDS;
    assert!(
        retain_until >= expected_low && retain_until <= expected_high,
        "retention must extend a grace period past the hosting expiry"
    );

    assert!(
        grant.required_headers.contains_key("content-length"),
        "the grant must pin the upload size"
    );
}

#[tokio::test]
async fn upload_and_quote_validation_codes() {
    let (service, _, _, _) = test_service();

    assert_eq!(
        error_code(service.quote(0, 43_200).await),
        "ERR_NO_SIZE"
    );
    assert_eq!(
        error_code(service.authorize_upload(UPLOADER, 0, 43_200).await),
        "ERR_INVALID_SIZE"
    );
    assert_eq!(
        error_code(service.authorize_upload("", 1024, 43_200).await),
        "ERR_MISSING_IDENTITY_KEY"
    );
    assert_eq!(
        error_code(service.quote(1024, 0).await),
        "ERR_NO_RETENTION_PERIOD"
    );
    assert_eq!(
        error_code(service.quote(1024, 5).await),
        "ERR_INVALID_RETENTION_PERIOD",
        "below the configured fifteen-minute minimum"
    );
    assert_eq!(
        error_code(service.quote(1024, 69_000_001).await),
        "ERR_INVALID_RETENTION_PERIOD"
    );
    assert_eq!(
        error_code(service.quote(11_000_000_001, 43_200).await),
        "ERR_INVALID_SIZE"
    );
}

#[tokio::test]
async fn quote_prices_the_reference_contract() {
    let (service, _, _, rates) = test_service();

    assert_eq!(service.quote(1_000_000_000, 43_200).await.unwrap(), 166_666);

    rates.fake_set_rate(60.0);
    assert_eq!(
        service.quote(1_000_000_000, 43_200).await.unwrap(),
        83_333,
        "a doubled exchange rate should halve the satoshi price"
    );
}
