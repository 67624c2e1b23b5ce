//! Integration tests for the admin client against a mock backend.


use std::time::Duration;

use axum::http::Method;
use serde_json::{json, Value};
use tokio::sync::broadcast::Receiver;

use crate::api::{CounterKind, Direction, ScanOutcome, ScanResult, ScanType};
use crate::auth::TokenStore;
use crate::config::Config;
use crate::errors::ApiError;
use crate::http::FilePart;
use crate::models::{BannerRequest, HotelRequest, Lang, RegistrationCounter, VisaCategoryRequest};
use crate::notify::{Notice, NoticeLevel};
use crate::store::{Filters, PageRequest};
use crate::AdminServices;

use mock_backend::{MockBackend, Reply};

/// Test fixture for integration tests.
struct TestFixture {
    services: AdminServices,
    backend: MockBackend,
}

impl TestFixture {
    async fn new() -> Self {
        let backend = MockBackend::default();
        let base_url = backend.serve().await;

        let config = Config {
            base_url,
            request_timeout: Duration::from_secs(5),
            log_level: "warn".to_string(),
            ..Config::default()
        };
        let tokens = TokenStore::in_memory();
        tokens.set("test-token").unwrap();

        TestFixture {
            services: AdminServices::with_tokens(config, tokens).unwrap(),
            backend,
        }
    }
}

fn drain(rx: &mut Receiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}

fn banner(id: i64, is_private: bool) -> Value {
    json!({
        "id": id,
        "image": format!("/uploads/banner-{}.png", id),
        "link": "https://laoimmigration.la",
        "is_private": is_private,
        "start_time": "2025-01-01T00:00:00.000Z",
        "end_time": "2025-12-31T00:00:00.000Z",
        "translates": []
    })
}

fn hotel(id: i64, is_published: bool) -> Value {
    json!({ "id": id, "link": "", "phone_number": "021 000 000", "is_published": is_published })
}

fn passport(id: i64) -> Value {
    json!({ "id": id, "number": format!("P{:07}", id) })
}

fn person() -> Value {
    json!({ "name": "Somchai", "family_name": "Phommavong", "gender": "male" })
}

fn arrival_row(id: i64) -> Value {
    json!({
        "id": id,
        "entry_name": "Wattay International Airport",
        "black_list": "available",
        "verification_code": format!("ARR-{}", id),
        "verified_at": null,
        "passport_information": passport(id)
    })
}

fn arrival_detail(id: i64, verified_at: Option<&str>) -> Value {
    json!({
        "id": id,
        "entry_name": "Wattay International Airport",
        "purpose": "tourism",
        "traveling_by_type": "flight",
        "traveling_by_no": "QV101",
        "verified_at": verified_at,
        "black_list": "available",
        "passport_information": passport(id),
        "personal_information": person()
    })
}

fn departure(id: i64, verified_at: Option<&str>) -> Value {
    json!({
        "id": id,
        "departure_name": "Friendship Bridge I",
        "black_list": "available",
        "verification_code": format!("DEP-{}", id),
        "verified_at": verified_at,
        "passport_information": passport(id),
        "personal_information": person()
    })
}

#[tokio::test]
async fn test_list_sends_page_and_active_filters_only() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/banner-hero",
        Reply::ok(json!({ "data": [banner(1, true), banner(2, true)], "total": 42 })),
    );

    let filters = Filters::new().with("visibility", "1").with("status", "");
    let page = fixture
        .services
        .banners
        .list(PageRequest::new(0, 10), &filters)
        .await
        .unwrap();

    assert_eq!(page.total, 42);
    assert_eq!(page.items.len(), 2);
    assert_eq!(fixture.services.banners.snapshot(), page);

    let requests = fixture.backend.requests_to(Method::GET, "/banner-hero");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query_keys(), vec!["offset", "limit", "is_private"]);
    assert_eq!(requests[0].query_value("offset"), Some("0"));
    assert_eq!(requests[0].query_value("limit"), Some("10"));
    assert_eq!(requests[0].query_value("is_private"), Some("1"));
    assert_eq!(fixture.services.banners.filters().get("visibility"), "1");
}

#[tokio::test]
async fn test_wildcard_news_filter_is_not_sent() {
    let fixture = TestFixture::new().await;
    fixture
        .backend
        .on(Method::GET, "/news", Reply::ok(json!({ "data": [], "total": 0 })));

    let filters = Filters::new().with("category_id", "3").with("status", "all");
    fixture
        .services
        .news
        .list(PageRequest::default(), &filters)
        .await
        .unwrap();

    let request = &fixture.backend.requests_to(Method::GET, "/news")[0];
    assert_eq!(request.query_value("category_id"), Some("3"));
    assert_eq!(request.query_value("status"), None);
}

#[tokio::test]
async fn test_clear_filters_then_refresh_drops_filter_params() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/banner-hero",
        Reply::ok(json!({ "data": [banner(1, true)], "total": 11 })),
    );
    let store = &fixture.services.banners;

    store
        .list(PageRequest::new(10, 10), &Filters::new().with("visibility", "1"))
        .await
        .unwrap();
    store.clear_filters();
    store.refresh().await.unwrap();

    let requests = fixture.backend.requests_to(Method::GET, "/banner-hero");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].query_keys(), vec!["offset", "limit"]);
    assert_eq!(requests[1].query_value("offset"), Some("10"));
    assert_eq!(store.filters().get("visibility"), "");
}

#[tokio::test]
async fn test_create_refetches_page_captured_at_call_time() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/banner-hero",
        Reply::ok(json!({ "data": [banner(1, true)], "total": 21 })),
    );
    fixture
        .backend
        .on(Method::POST, "/banner-hero", Reply::ok(banner(30, true)).delayed(150));
    let store = &fixture.services.banners;

    store
        .list(PageRequest::new(20, 10), &Filters::new().with("visibility", "1"))
        .await
        .unwrap();

    let image = FilePart::new("hero.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47]);
    let request = BannerRequest {
        link: "https://laoimmigration.la/visa".to_string(),
        lo_title: "ຍິນດີຕ້ອນຮັບ".to_string(),
        en_title: "Welcome".to_string(),
        ..Default::default()
    };
    let (created, _) = tokio::join!(store.create_banner(&request, Some(image)), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.set_filters(&Filters::new().with("visibility", "0"));
    });
    assert_eq!(created.unwrap()["id"], 30);

    let post = &fixture.backend.requests_to(Method::POST, "/banner-hero")[0];
    assert!(post
        .header("content-type")
        .unwrap()
        .starts_with("multipart/form-data"));
    assert!(post.body.contains("name=\"image\"; filename=\"hero.png\""));
    assert!(post.body.contains("name=\"en_title\""));

    let lists = fixture.backend.requests_to(Method::GET, "/banner-hero");
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[1].query_value("offset"), Some("20"));
    assert_eq!(lists[1].query_value("is_private"), Some("1"));
}

#[tokio::test]
async fn test_create_banner_requires_image() {
    let fixture = TestFixture::new().await;

    let err = fixture
        .services
        .banners
        .create_banner(&BannerRequest::default(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert!(fixture.backend.requests().is_empty());
}

#[tokio::test]
async fn test_is_loading_while_request_in_flight() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/law",
        Reply::ok(json!({ "data": [{ "id": 1, "name": "Immigration Law" }], "total": 1 })).delayed(200),
    );
    let store = fixture.services.laws.clone();
    assert!(!store.is_loading());

    let task = {
        let store = store.clone();
        tokio::spawn(async move { store.list(PageRequest::default(), &Filters::new()).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.is_loading());

    task.await.unwrap().unwrap();
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_is_loading_clears_after_failure() {
    let fixture = TestFixture::new().await;
    fixture
        .backend
        .on(Method::GET, "/law", Reply::status(500, json!({ "message": "boom" })));

    let err = fixture
        .services
        .laws
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(!fixture.services.laws.is_loading());
    assert!(fixture.services.laws.snapshot().items.is_empty());
}

#[tokio::test]
async fn test_coalesced_arrival_lists_share_one_request() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/arrival",
        Reply::ok(json!({ "data": [arrival_row(1), arrival_row(2)], "total": 2 })).delayed(100),
    );
    let store = &fixture.services.arrivals;
    let no_filters = Filters::new();

    let (first, second) = tokio::join!(
        store.list(PageRequest::default(), &no_filters),
        store.list(PageRequest::default(), &no_filters),
    );

    let first = first.unwrap();
    assert_eq!(first, second.unwrap());
    assert_eq!(first.items.len(), 2);
    assert_eq!(fixture.backend.count(Method::GET, "/arrival"), 1);
}

#[tokio::test]
async fn test_superseded_list_does_not_overwrite_newer_page() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/banner-hero",
        Reply::ok(json!({ "data": [banner(1, false)], "total": 1 })).delayed(200),
    );
    fixture.backend.on(
        Method::GET,
        "/banner-hero",
        Reply::ok(json!({ "data": [banner(2, false)], "total": 1 })),
    );
    let store = &fixture.services.banners;
    let no_filters = Filters::new();

    let (slow, fast) = tokio::join!(store.list(PageRequest::new(0, 10), &no_filters), async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        store.list(PageRequest::new(10, 10), &no_filters).await
    });

    assert_eq!(slow.unwrap_err(), ApiError::Cancelled);
    assert_eq!(fast.unwrap().items[0].id, 2);
    assert_eq!(store.snapshot().items[0].id, 2);
    assert_eq!(store.last_page(), PageRequest::new(10, 10));
}

#[tokio::test]
async fn test_cancel_aborts_list_in_flight() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/law",
        Reply::ok(json!({ "data": [{ "id": 1, "name": "Immigration Law" }] })).delayed(500),
    );
    let store = &fixture.services.laws;
    let no_filters = Filters::new();

    let (result, _) = tokio::join!(store.list(PageRequest::default(), &no_filters), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.cancel();
    });

    assert_eq!(result.unwrap_err(), ApiError::Cancelled);
    assert!(store.snapshot().items.is_empty());
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_unpaged_envelopes_send_no_query() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/roles",
        Reply::ok(json!({ "data": [{ "id": 1, "name": "admin" }, { "id": 2, "name": "officer" }] })),
    );
    fixture.backend.on(
        Method::GET,
        "/permissions",
        Reply::ok(json!([
            { "id": 1, "name": "read-user", "group_name": "user" },
            { "id": 2, "name": "write-user", "group_name": "user" },
            { "id": 3, "name": "read-news", "group_name": "news" }
        ])),
    );

    let roles = fixture
        .services
        .roles
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap();
    assert_eq!(roles.total, 2);

    fixture
        .services
        .permissions
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap();
    let groups = fixture.services.permissions.grouped();
    assert_eq!(groups.len(), 2);

    for request in fixture.backend.requests() {
        assert!(request.query.is_empty(), "{} sent a query", request.path);
    }
}

#[tokio::test]
async fn test_delete_missing_record_leaves_buffer_untouched() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/banner-hero",
        Reply::ok(json!({ "data": [banner(1, false), banner(2, true)], "total": 2 })),
    );
    let store = &fixture.services.banners;
    store
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap();
    let before = store.snapshot();

    let err = store.delete(99).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(store.snapshot(), before);
    assert_eq!(fixture.backend.count(Method::GET, "/banner-hero"), 1);
}

#[tokio::test]
async fn test_delete_refetches_page() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/banner-hero",
        Reply::ok(json!({ "data": [banner(1, false), banner(2, true)], "total": 2 })),
    );
    fixture.backend.on(
        Method::GET,
        "/banner-hero",
        Reply::ok(json!({ "data": [banner(2, true)], "total": 1 })),
    );
    fixture
        .backend
        .on(Method::DELETE, "/banner-hero/1", Reply::ok(json!({ "message": "deleted" })));
    let store = &fixture.services.banners;
    store
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap();

    store.delete(1).await.unwrap();

    assert_eq!(store.snapshot().total, 1);
    assert_eq!(store.snapshot().items[0].id, 2);
}

#[tokio::test]
async fn test_update_patches_banner_in_place() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/banner-hero",
        Reply::ok(json!({ "data": [banner(1, false), banner(2, false)], "total": 2 })),
    );
    let mut updated = banner(2, false);
    updated["link"] = json!("https://laoimmigration.la/evisa");
    fixture
        .backend
        .on(Method::PUT, "/banner-hero/2", Reply::ok(updated));
    let store = &fixture.services.banners;
    store
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap();

    store
        .update_banner(2, &BannerRequest::default(), None)
        .await
        .unwrap();

    assert_eq!(store.snapshot().items[1].link, "https://laoimmigration.la/evisa");
    assert_eq!(fixture.backend.count(Method::GET, "/banner-hero"), 1);
}

#[tokio::test]
async fn test_banner_visibility_patches_loaded_record() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/banner-hero",
        Reply::ok(json!({ "data": [banner(1, false)], "total": 1 })),
    );
    fixture
        .backend
        .on(Method::PUT, "/banner-hero/1/private", Reply::ok(banner(1, true)));
    let store = &fixture.services.banners;
    store
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap();

    store.make_private(1).await.unwrap();

    assert!(store.snapshot().items[0].is_private);
}

#[tokio::test]
async fn test_popup_change_status_sets_current() {
    let fixture = TestFixture::new().await;
    let popup = json!({ "id": 4, "link": "", "is_private": false });
    fixture.backend.on(
        Method::GET,
        "/popup",
        Reply::ok(json!({ "data": [popup], "total": 1 })),
    );
    fixture.backend.on(
        Method::PUT,
        "/popup/4/change-status",
        Reply::ok(json!({ "id": 4, "link": "", "is_private": true })),
    );
    let store = &fixture.services.popups;
    store
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap();

    store.change_status(4, true).await.unwrap();

    let request = &fixture.backend.requests_to(Method::PUT, "/popup/4/change-status")[0];
    assert_eq!(request.json(), json!({ "is_private": true }));
    assert!(store.snapshot().items[0].is_private);
    assert_eq!(store.current().map(|p| p.is_private), Some(true));
}

#[tokio::test]
async fn test_hotel_publish_patches_loaded_record() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/hotel",
        Reply::ok(json!({ "data": [hotel(1, false), hotel(2, false)], "total": 2 })),
    );
    fixture.backend.on(Method::GET, "/hotel/1", Reply::ok(hotel(1, false)));
    fixture
        .backend
        .on(Method::PUT, "/hotel/1/public", Reply::ok(json!({ "message": "ok" })));
    let store = &fixture.services.hotels;
    store
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap();
    store.get_by_id(1).await.unwrap();

    store.publish(1).await.unwrap();

    let page = store.snapshot();
    assert!(page.items[0].is_published);
    assert!(!page.items[1].is_published);
    assert_eq!(store.current().map(|h| h.is_published), Some(true));
}

#[tokio::test]
async fn test_feedback_publish_sends_flag() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/feedback",
        Reply::ok(json!({
            "data": [{ "id": 8, "name": "Anna", "message": "Fast border crossing", "is_published": false }],
            "total": 1
        })),
    );
    fixture
        .backend
        .on(Method::PUT, "/feedback/8", Reply::ok(json!({ "id": 8, "is_published": true })));
    let store = &fixture.services.feedback;
    store
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap();

    store.set_published(8, true).await.unwrap();

    let request = &fixture.backend.requests_to(Method::PUT, "/feedback/8")[0];
    assert_eq!(request.json(), json!({ "is_published": true }));
    assert!(store.snapshot().items[0].is_published);
}

#[tokio::test]
async fn test_requests_carry_session_headers() {
    let fixture = TestFixture::new().await;
    fixture
        .backend
        .on(Method::GET, "/contact", Reply::ok(json!({ "data": [], "total": 0 })));

    fixture
        .services
        .contacts
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap();

    let request = &fixture.backend.requests()[0];
    assert_eq!(request.header("authorization"), Some("Bearer test-token"));
    assert_eq!(request.header("accept-language"), Some("lo"));
    let request_id = request.header("x-request-id").unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}

#[tokio::test]
async fn test_unauthorized_clears_token_and_expires_session() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/users",
        Reply::status(401, json!({ "message": "Unauthorized", "statusCode": 401 })),
    );
    let mut notices = fixture.services.notifier().subscribe();

    let err = fixture
        .services
        .users
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized(_)));
    assert!(fixture.services.tokens().get().is_none());
    assert_eq!(drain(&mut notices), vec![Notice::SessionExpired]);
}

#[tokio::test]
async fn test_scan_already_verified_notifies_without_state_change() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::POST,
        "/arrival/scan",
        Reply::ok(json!({ "id": 7, "verified_at": "2025-01-02T03:04:05.000Z" })),
    );
    let mut notices = fixture.services.notifier().subscribe();

    let result = fixture.services.scanner.scan("ARR-7").await.unwrap();

    match result {
        ScanResult::Arrival(ScanOutcome::AlreadyVerified { id, verified_at }) => {
            assert_eq!(id, 7);
            assert_eq!(verified_at.to_rfc3339(), "2025-01-02T03:04:05+00:00");
        }
        other => panic!("unexpected scan result: {:?}", other),
    }
    assert!(fixture.services.arrivals.current().is_none());
    assert_eq!(fixture.backend.requests().len(), 1);

    let scan = &fixture.backend.requests_to(Method::POST, "/arrival/scan")[0];
    assert_eq!(scan.json(), json!({ "verification_code": "ARR-7" }));

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    match &notices[0] {
        Notice::Message {
            level, description, ..
        } => {
            assert_eq!(*level, NoticeLevel::Info);
            assert!(description.contains("2025-01-02 03:04:05"));
        }
        other => panic!("unexpected notice: {:?}", other),
    }
}

#[tokio::test]
async fn test_scan_pending_loads_detail() {
    let fixture = TestFixture::new().await;
    fixture
        .backend
        .on(Method::POST, "/departure/scan", Reply::ok(json!({ "id": 5 })));
    fixture
        .backend
        .on(Method::GET, "/departure/5", Reply::ok(departure(5, None)));
    fixture.services.scanner.set_scan_type(ScanType::Departure);

    let result = fixture.services.scanner.scan(" DEP-5 ").await.unwrap();

    assert_eq!(result.scan_type(), ScanType::Departure);
    assert_eq!(result.id(), 5);
    assert!(matches!(
        result,
        ScanResult::Departure(ScanOutcome::PendingVerification { .. })
    ));
    assert_eq!(fixture.services.departures.current().map(|d| d.id), Some(5));
}

#[tokio::test]
async fn test_scan_without_match_is_not_found() {
    let fixture = TestFixture::new().await;
    fixture
        .backend
        .on(Method::POST, "/arrival/scan", Reply::ok(json!({})));
    let mut notices = fixture.services.notifier().subscribe();

    let err = fixture.services.arrivals.scan("UNKNOWN").await.unwrap_err();

    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(drain(&mut notices)[0].level(), NoticeLevel::Warning);
}

#[tokio::test]
async fn test_scan_rejects_empty_code() {
    let fixture = TestFixture::new().await;

    let err = fixture.services.arrivals.scan("   ").await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert!(fixture.backend.requests().is_empty());
}

#[tokio::test]
async fn test_departure_verify_patches_list_and_current() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/departure",
        Reply::ok(json!({ "data": [departure(5, None), departure(6, None)], "total": 2 })),
    );
    fixture
        .backend
        .on(Method::GET, "/departure/5", Reply::ok(departure(5, None)));
    fixture.backend.on(
        Method::PUT,
        "/departure/5",
        Reply::ok(json!({ "verified_at": "2025-03-01T10:00:00.000Z" })),
    );
    let store = &fixture.services.departures;
    store
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap();
    store.get_by_id(5).await.unwrap();

    let outcome = store.verify(5).await.unwrap();

    let at = outcome.verified_at.unwrap();
    assert_eq!(at.to_rfc3339(), "2025-03-01T10:00:00+00:00");
    let page = store.snapshot();
    assert_eq!(page.items[0].verified_at, Some(at));
    assert_eq!(page.items[1].verified_at, None);
    assert_eq!(store.current().and_then(|d| d.verified_at), Some(at));
    assert!(!store.is_verifying());

    let request = &fixture.backend.requests_to(Method::PUT, "/departure/5")[0];
    assert!(request.json()["verified_at"].is_string());
}

#[tokio::test]
async fn test_arrival_verify_reloads_record() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(Method::PUT, "/arrival/3", Reply::ok(Value::Null));
    fixture.backend.on(
        Method::GET,
        "/arrival/3",
        Reply::ok(arrival_detail(3, Some("2025-04-05T06:07:08.000Z"))),
    );

    let outcome = fixture.services.arrivals.verify(3).await.unwrap();

    assert_eq!(outcome.id, 3);
    assert!(outcome.verified_at.is_some());
    let put = &fixture.backend.requests_to(Method::PUT, "/arrival/3")[0];
    assert!(put.body.is_empty());
    assert_eq!(
        fixture.services.arrivals.current().and_then(|a| a.verified_at),
        outcome.verified_at
    );
}

#[tokio::test]
async fn test_counters_zero_fill_on_error() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/no-of-register/enter",
        Reply::ok(json!({ "per_day": 3, "per_mouth": 40, "per_year": 500 })),
    );
    fixture.backend.on(
        Method::GET,
        "/no-of-register/enter",
        Reply::status(500, json!({ "message": "database down" })),
    );
    let counters = &fixture.services.counters;

    let first = counters
        .fetch(CounterKind::Register, Direction::Enter)
        .await
        .unwrap();
    assert_eq!(first.per_month, 40);
    assert_eq!(counters.get(CounterKind::Register, Direction::Enter), first);

    assert!(counters
        .fetch(CounterKind::Register, Direction::Enter)
        .await
        .is_err());
    assert_eq!(
        counters.get(CounterKind::Register, Direction::Enter),
        RegistrationCounter::default()
    );

    // Unscripted counters answer 404 and read as zero.
    let all = counters.fetch_all().await;
    assert_eq!(all.len(), 4);
    assert!(all.iter().all(|r| r.counter == RegistrationCounter::default()));
}

#[tokio::test]
async fn test_counter_increment_posts_number_then_rereads() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::POST,
        "/no-of-tourists/exit/increment",
        Reply::ok(json!({ "message": "ok" })),
    );
    fixture.backend.on(
        Method::GET,
        "/no-of-tourists/exit",
        Reply::ok(json!({ "per_day": 4, "per_mouth": 4, "per_year": 4 })),
    );
    let counters = &fixture.services.counters;

    let counter = counters
        .increment(CounterKind::Tourists, Direction::Exit, 2)
        .await
        .unwrap();

    assert_eq!(counter.per_day, 4);
    let post = &fixture.backend.requests_to(Method::POST, "/no-of-tourists/exit/increment")[0];
    assert_eq!(post.json(), json!({ "number": 2 }));

    let err = counters
        .decrement(CounterKind::Tourists, Direction::Exit, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_cursor_list_keeps_pages_per_language() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/visa-category",
        Reply::ok(json!({ "data": [{ "id": 1, "name": "Tourist visa" }], "total": 9, "cursor": "abc" })),
    );
    let store = &fixture.services.visa_categories;

    let page = store.list(Lang::En, 1, None).await.unwrap();

    assert_eq!(page.total, 9);
    assert_eq!(page.next_cursor.as_deref(), Some("abc"));
    assert_eq!(store.snapshot(Lang::En), page);
    assert!(store.snapshot(Lang::Lo).items.is_empty());

    let request = &fixture.backend.requests()[0];
    assert_eq!(request.query_value("lang"), Some("en"));
    assert_eq!(request.query_value("limit"), Some("1"));
}

#[tokio::test]
async fn test_cursor_details_are_cached_until_update() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/visa-category/4/detail",
        Reply::ok(json!({ "id": 4, "name": "Business visa", "content": "<p>B2</p>" })),
    );
    fixture
        .backend
        .on(Method::PUT, "/visa-category/4", Reply::ok(json!({ "id": 4 })));
    let store = &fixture.services.visa_categories;

    let first = store.details(4, Lang::En).await.unwrap();
    let second = store.details(4, Lang::En).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(fixture.backend.count(Method::GET, "/visa-category/4/detail"), 1);

    store
        .update_visa(4, &VisaCategoryRequest::default())
        .await
        .unwrap();
    assert!(store.cached_detail(4, Lang::En).is_none());

    store.details(4, Lang::En).await.unwrap();
    assert_eq!(fixture.backend.count(Method::GET, "/visa-category/4/detail"), 2);
}

#[tokio::test]
async fn test_logout_forgets_token() {
    let fixture = TestFixture::new().await;
    fixture
        .backend
        .on(Method::GET, "/contact", Reply::ok(json!({ "data": [] })));

    fixture.services.logout();
    fixture
        .services
        .contacts
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap();

    assert!(fixture.backend.requests()[0].header("authorization").is_none());
}

#[tokio::test]
async fn test_failed_list_keeps_filter_state() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/banner-hero",
        Reply::status(500, json!({ "message": "database down" })),
    );
    let store = &fixture.services.banners;

    let err = store
        .list(PageRequest::default(), &Filters::new().with("visibility", "1"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(store.filters().get("visibility"), "");
    assert_eq!(store.last_page(), PageRequest::default());
}

#[tokio::test]
async fn test_filter_values_reach_backend_decoded() {
    let fixture = TestFixture::new().await;
    fixture
        .backend
        .on(Method::GET, "/news", Reply::ok(json!({ "data": [], "total": 0 })));

    let filters = Filters::new().with("category_id", "a b&c").with("status", "ເປີດ");
    fixture
        .services
        .news
        .list(PageRequest::default(), &filters)
        .await
        .unwrap();

    let request = &fixture.backend.requests_to(Method::GET, "/news")[0];
    assert_eq!(request.query_value("category_id"), Some("a b&c"));
    assert_eq!(request.query_value("status"), Some("ເປີດ"));
}

#[tokio::test]
async fn test_set_filters_merges_without_clearing_other_keys() {
    let fixture = TestFixture::new().await;
    let store = &fixture.services.banners;

    store.set_filters(&Filters::new().with("visibility", "1"));
    store.set_filters(&Filters::new().with("status", "0").with("unknown", "x"));

    let filters = store.filters();
    assert_eq!(filters.get("visibility"), "1");
    assert_eq!(filters.get("status"), "0");
    assert!(!filters.contains("unknown"));
}

#[tokio::test]
async fn test_hotel_update_refetches_with_captured_filters() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/hotel",
        Reply::ok(json!({ "data": [hotel(1, true)], "total": 15 })),
    );
    fixture
        .backend
        .on(Method::PUT, "/hotel/1", Reply::ok(json!({ "message": "updated" })).delayed(150));
    let store = &fixture.services.hotels;

    store
        .list(PageRequest::new(10, 5), &Filters::new().with("is_published", "1"))
        .await
        .unwrap();

    let request = HotelRequest {
        phone_number: "021 000 001".to_string(),
        ..Default::default()
    };
    let (updated, _) = tokio::join!(store.update_hotel(1, &request, None), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.set_filters(&Filters::new().with("is_published", "0"));
    });
    updated.unwrap();

    let put = &fixture.backend.requests_to(Method::PUT, "/hotel/1")[0];
    assert!(put.body.contains("021 000 001"));

    let lists = fixture.backend.requests_to(Method::GET, "/hotel");
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[1].query_value("offset"), Some("10"));
    assert_eq!(lists[1].query_value("limit"), Some("5"));
    assert_eq!(lists[1].query_value("is_published"), Some("1"));
}

#[tokio::test]
async fn test_partial_update_reply_falls_back_to_refetch() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/banner-hero",
        Reply::ok(json!({ "data": [banner(1, false)], "total": 1 })),
    );
    fixture.backend.on(
        Method::GET,
        "/banner-hero",
        Reply::ok(json!({ "data": [banner(1, true)], "total": 1 })),
    );
    fixture
        .backend
        .on(Method::PUT, "/banner-hero/1", Reply::ok(json!({ "message": "updated" })));
    let store = &fixture.services.banners;
    store
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap();

    store
        .update_banner(1, &BannerRequest::default(), None)
        .await
        .unwrap();

    assert_eq!(fixture.backend.count(Method::GET, "/banner-hero"), 2);
    assert!(store.snapshot().items[0].is_private);
}

#[tokio::test]
async fn test_update_of_unloaded_record_refetches() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/banner-hero",
        Reply::ok(json!({ "data": [banner(1, false)], "total": 1 })),
    );
    fixture
        .backend
        .on(Method::PUT, "/banner-hero/9", Reply::ok(banner(9, true)));
    let store = &fixture.services.banners;
    store
        .list(PageRequest::default(), &Filters::new())
        .await
        .unwrap();

    store
        .update_banner(9, &BannerRequest::default(), None)
        .await
        .unwrap();

    assert_eq!(fixture.backend.count(Method::GET, "/banner-hero"), 2);
    assert_eq!(store.snapshot().items.len(), 1);
}

#[tokio::test]
async fn test_coalesced_follower_receives_leader_error() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/departure",
        Reply::status(500, json!({ "message": "database down" })).delayed(100),
    );
    let store = &fixture.services.departures;
    let no_filters = Filters::new();

    let (first, second) = tokio::join!(
        store.list(PageRequest::default(), &no_filters),
        store.list(PageRequest::default(), &no_filters),
    );

    assert_eq!(first.unwrap_err().status(), Some(500));
    assert_eq!(second.unwrap_err().status(), Some(500));
    assert_eq!(fixture.backend.count(Method::GET, "/departure"), 1);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_cursor_delete_removes_record_from_every_language() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/visa-category",
        Reply::ok(json!({ "data": [{ "id": 1, "name": "Tourist visa" }, { "id": 2, "name": "Business visa" }], "total": 2 })),
    );
    fixture.backend.on(
        Method::GET,
        "/visa-category",
        Reply::ok(json!({ "data": [{ "id": 1, "name": "ວີຊາທ່ອງທ່ຽວ" }], "total": 5 })),
    );
    fixture
        .backend
        .on(Method::DELETE, "/visa-category/1", Reply::ok(json!({ "message": "deleted" })));
    let store = &fixture.services.visa_categories;
    store.list(Lang::En, 20, None).await.unwrap();
    store.list(Lang::Lo, 20, None).await.unwrap();

    store.delete(1).await.unwrap();

    let en = store.snapshot(Lang::En);
    assert_eq!(en.items.iter().map(|v| v.id).collect::<Vec<_>>(), vec![2]);
    assert_eq!(en.total, 1);
    let lo = store.snapshot(Lang::Lo);
    assert!(lo.items.is_empty());
    assert_eq!(lo.total, 4);
}

#[tokio::test]
async fn test_concurrent_details_share_one_request() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/services/6/detail",
        Reply::ok(json!({ "id": 6, "name": "Visa extension", "content": "<p>30 days</p>" })).delayed(100),
    );
    let store = &fixture.services.services;

    let (a, b) = tokio::join!(store.details(6, Lang::En), store.details(6, Lang::En));

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(fixture.backend.count(Method::GET, "/services/6/detail"), 1);
    assert!(store.cached_detail(6, Lang::En).is_some());
}

#[tokio::test]
async fn test_counter_with_null_fields_reads_as_zero() {
    let fixture = TestFixture::new().await;
    fixture.backend.on(
        Method::GET,
        "/no-of-register/exit",
        Reply::ok(json!({ "per_day": null, "per_mouth": 12, "per_year": null })),
    );

    let counter = fixture
        .services
        .counters
        .fetch(CounterKind::Register, Direction::Exit)
        .await
        .unwrap();

    assert_eq!(counter.per_day, 0);
    assert_eq!(counter.per_month, 12);
    assert_eq!(counter.per_year, 0);
}
