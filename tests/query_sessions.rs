//! Query session and search tests
//!
//! Polling runs against MockTransport with a 1 ms poll interval.
//!
//! Test Categories:
//! 1. Status progression
//! 2. Waiting and timeouts
//! 3. Result access guards
//! 4. Blocking and background searches

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use chemspider::catalog::HttpMethod;
use chemspider::transport::{
    HttpRequest, HttpResponse, MockResponse, MockTransport, Transport, TransportError,
};
use chemspider::{
    ChemSpider, ChemSpiderError, ClientConfig, ErrorKind, OrderBy, QueryId, QueryStatus,
    ResultOrder, SearchMode, SearchRequest,
};

const QUERY_ID: &str = "8a3b4c2d-1e5f-4a6b-9c7d-0e1f2a3b4c5d";

fn fast_config() -> ClientConfig {
    ClientConfig {
        poll_interval_ms: 1,
        max_backoff_ms: 4,
        max_poll_requests: 5,
        ..ClientConfig::default()
    }
}

fn client() -> (ChemSpider, Arc<MockTransport>) {
    let mock = Arc::new(MockTransport::new());
    let cs = ChemSpider::with_transport("test-key", fast_config(), mock.clone()).unwrap();
    (cs, mock)
}

fn query_id() -> QueryId {
    QUERY_ID.parse().unwrap()
}

fn status(status: &str) -> Value {
    json!({ "status": status })
}

fn script_statuses(mock: &MockTransport, statuses: &[Value]) {
    for s in statuses {
        mock.on_get("/status", s.clone());
    }
}

// =============================================================================
// STATUS PROGRESSION
// =============================================================================

#[test]
fn test_status_never_regresses() {
    let (cs, mock) = client();
    script_statuses(
        &mock,
        &[
            status("Processing"),
            status("Created"),
            status("SomethingNew"),
            json!({"status": "ResultReady", "count": 4, "elapsed": "00:00:02.250"}),
            status("Processing"),
        ],
    );
    let session = cs.session(query_id());
    assert_eq!(session.status(), QueryStatus::Created);

    let observed: Vec<QueryStatus> = (0..5).map(|_| session.poll().unwrap()).collect();
    assert_eq!(
        observed,
        vec![
            QueryStatus::Processing,
            QueryStatus::Processing,
            QueryStatus::Processing,
            QueryStatus::Complete,
            QueryStatus::Complete,
        ]
    );

    let state = session.snapshot();
    assert_eq!(state.count, Some(4));
    assert_eq!(state.elapsed, Some(Duration::from_millis(2250)));
    assert!(session.ready());
    assert_eq!(
        mock.requests()[0].url,
        format!("https://api.rsc.org/compounds/v1/filter/{}/status", QUERY_ID)
    );
}

#[test]
fn test_status_poll_errors_propagate() {
    let (cs, mock) = client();
    mock.on(HttpMethod::Get, "/status", MockResponse::status(401));
    let err = cs.session(query_id()).poll().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
}

// =============================================================================
// WAITING AND TIMEOUTS
// =============================================================================

#[test]
fn test_wait_until_complete() {
    let (cs, mock) = client();
    script_statuses(
        &mock,
        &[status("Created"), status("Processing"), status("ResultReady")],
    );

    let session = cs.session(query_id());
    assert_eq!(session.wait(Duration::from_secs(5)).unwrap(), QueryStatus::Complete);
    assert_eq!(mock.request_count(), 3);
}

#[test]
fn test_wait_times_out() {
    let (cs, mock) = client();
    mock.on_get("/status", status("Processing"));

    let session = cs.session(query_id());
    let err = session.wait(Duration::from_millis(30)).unwrap_err();
    assert!(matches!(err, ChemSpiderError::Timeout(_)));
    assert_eq!(session.status(), QueryStatus::Processing);
    assert!(mock.request_count() >= 2);
}

// =============================================================================
// RESULT ACCESS GUARDS
// =============================================================================

#[test]
fn test_results_before_complete_rejected_without_io() {
    let (cs, mock) = client();
    mock.on_get("/status", status("Processing"));

    let session = cs.session(query_id());
    session.poll().unwrap();
    let err = session.results(None, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(mock.requests_to("/results").is_empty());
}

#[test]
fn test_partial_results_while_suspended() {
    let (cs, mock) = client();
    mock.on_get("/status", status("Suspended"));
    mock.on_get("/results", json!({"results": [10, 20]}));

    let session = cs.session(query_id());
    session.poll().unwrap();
    assert_eq!(session.partial_results(Some(0), Some(2)).unwrap(), vec![10, 20]);
    assert!(session.results(None, None).is_err());

    let request = &mock.requests_to("/results")[0];
    assert_eq!(request.query_value("start"), Some("0"));
    assert_eq!(request.query_value("count"), Some("2"));
}

#[test]
fn test_failed_query_reports_query_failed() {
    let (cs, mock) = client();
    mock.on_get(
        "/status",
        json!({"status": "Failed", "message": "Search engine error"}),
    );

    let session = cs.session(query_id());
    assert_eq!(session.wait(Duration::from_secs(1)).unwrap(), QueryStatus::Failed);
    let err = session.results(None, None).unwrap_err();
    assert_eq!(
        err,
        ChemSpiderError::QueryFailed {
            status: "Failed".into(),
            message: "Search engine error".into()
        }
    );
}

#[test]
fn test_sdf_results() {
    let (cs, mock) = client();
    mock.on_get("/status", status("ResultReady"));
    mock.on_get("/results/sdf", json!({"results": "H4sIAAAAAAAAAwMAAAAAAAAAAAA="}));

    let session = cs.session(query_id());
    session.poll().unwrap();
    let gz = session.results_sdf().unwrap();
    assert_eq!(&gz[..2], &[0x1f, 0x8b]);
}

// =============================================================================
// SEARCHES
// =============================================================================

fn script_search(mock: &MockTransport, route: &str, ids: Value) {
    mock.on_post(route, json!({ "queryId": QUERY_ID }));
    script_statuses(
        mock,
        &[
            status("Processing"),
            json!({"status": "ResultReady", "count": 3, "elapsed": "00:00:01.500"}),
        ],
    );
    mock.on_get("/results", json!({ "results": ids }));
}

#[test]
fn test_blocking_name_search() {
    let (cs, mock) = client();
    script_search(&mock, "/filter/name", json!([2157, 2244, 1]));

    let results = cs.search("aspirin");
    assert!(results.ready());
    assert!(results.success());
    assert_eq!(results.ids().unwrap(), vec![2157, 2244, 1]);
    assert_eq!(results.len(), 3);
    assert_eq!(results.get(0).unwrap().record_id(), 2157);
    assert_eq!(results.status(), QueryStatus::Complete);
    assert_eq!(results.query_id(), Some(query_id()));
    assert_eq!(results.duration(), Some(Duration::from_millis(1500)));
    assert!(results.error().is_none());

    let submit = &mock.requests_to("/filter/name")[0];
    assert_eq!(submit.method, HttpMethod::Post);
    assert_eq!(submit.body, Some(json!({"name": "aspirin"})));
    assert_eq!(cs.metrics().snapshot().queries_submitted, 1);
}

#[test]
fn test_ordered_search_sends_order() {
    let (cs, mock) = client();
    script_search(&mock, "/filter/name", json!([1]));

    let request =
        SearchRequest::name("benzene").ordered(ResultOrder::descending(OrderBy::ReferenceCount));
    cs.search_with(request, SearchMode::Blocking).wait();

    let body = mock.requests_to("/filter/name")[0].body.clone().unwrap();
    assert_eq!(body["orderBy"], "referenceCount");
    assert_eq!(body["orderDirection"], "descending");
}

#[test]
fn test_background_search() {
    let (cs, mock) = client();
    mock.with_latency(Duration::from_millis(5));
    script_search(&mock, "/filter/formula", json!([241, 7501, 8724]));

    let results = cs.search_with(SearchRequest::formula("C6H6"), SearchMode::Background);
    assert!(results.wait_timeout(Duration::from_secs(10)));
    assert!(results.success());
    assert_eq!(results.ids().unwrap(), vec![241, 7501, 8724]);

    let clone = results.clone();
    assert_eq!(clone.iter().count(), 3);
}

#[test]
fn test_mass_search_sends_mass_and_range() {
    let (cs, mock) = client();
    script_search(&mock, "/filter/mass", json!([2157]));

    let results = cs.search_by_mass(180.04, 0.01);
    assert_eq!(results.ids().unwrap(), vec![2157]);
    let body = mock.requests_to("/filter/mass")[0].body.clone().unwrap();
    assert_eq!(body["mass"], 180.04);
    assert_eq!(body["range"], 0.01);
}

#[test]
fn test_invalid_mass_fails_without_io() {
    let (cs, mock) = client();
    let results = cs.search_by_mass(0.5, 0.01);
    assert!(results.ready());
    assert!(!results.success());
    assert_eq!(results.error().unwrap().kind(), ErrorKind::Validation);
    assert!(results.is_empty());
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn test_too_many_records() {
    let (cs, mock) = client();
    mock.on_post("/filter/name", json!({ "queryId": QUERY_ID }));
    mock.on_get("/status", status("TooManyRecords"));

    let results = cs.search("c");
    assert_eq!(results.status(), QueryStatus::TooManyRecords);
    assert!(matches!(
        results.compounds().unwrap_err(),
        ChemSpiderError::QueryFailed { ref status, .. } if status == "TooManyRecords"
    ));
    assert_eq!(results.len(), 0);
    assert!(mock.requests_to("/results").is_empty());
}

#[test]
fn test_zero_count_skips_results_fetch() {
    let (cs, mock) = client();
    mock.on_post("/filter/name", json!({ "queryId": QUERY_ID }));
    mock.on_get("/status", json!({"status": "ResultReady", "count": 0}));

    let results = cs.search("no-such-compound");
    assert!(results.success());
    assert!(results.is_empty());
    assert_eq!(results.message().as_deref(), Some("No results found"));
    assert!(mock.requests_to("/results").is_empty());
}

#[test]
fn test_poll_limit_is_timeout() {
    let (cs, mock) = client();
    mock.on_post("/filter/name", json!({ "queryId": QUERY_ID }));
    mock.on_get("/status", status("Processing"));

    let results = cs.search("slow");
    assert_eq!(results.error().unwrap().kind(), ErrorKind::Timeout);
    assert_eq!(results.status(), QueryStatus::Processing);
    assert_eq!(mock.requests_to("/status").len(), 5);
    assert_eq!(cs.metrics().snapshot().status_polls, 5);
}

#[test]
fn test_invalid_query_id_from_service_is_parse_error() {
    let (cs, mock) = client();
    mock.on_post("/filter/smiles", json!({ "queryId": "not-a-uuid" }));

    let err = cs.filter_smiles("c1ccccc1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

struct PanickingTransport;

impl Transport for PanickingTransport {
    fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        panic!("transport exploded");
    }
}

#[test]
fn test_panicking_worker_finishes_with_error() {
    let cs = ChemSpider::with_transport("test-key", fast_config(), Arc::new(PanickingTransport))
        .unwrap();

    let results = cs.search_with(SearchRequest::name("benzene"), SearchMode::Background);
    assert!(results.wait_timeout(Duration::from_secs(5)));
    assert!(results.ready());
    assert!(!results.success());
    assert!(matches!(
        results.error().unwrap(),
        ChemSpiderError::Transport(ref message) if message == "search worker panicked"
    ));
    assert!(results.is_empty());
}
