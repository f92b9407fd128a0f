//! Request mediation tests
//!
//! Every test runs against MockTransport; no network access.
//!
//! Test Categories:
//! 1. Request construction (URL, headers, parameters)
//! 2. Error classification
//! 3. Batch chunking

use std::sync::Arc;

use serde_json::{json, Value};

use chemspider::catalog::{ops, HttpMethod, Params};
use chemspider::transport::{MockResponse, MockTransport};
use chemspider::{ChemSpider, ChemSpiderError, ClientConfig, DetailField, ErrorKind};

fn client_with(config: ClientConfig) -> (ChemSpider, Arc<MockTransport>) {
    let mock = Arc::new(MockTransport::new());
    let cs = ChemSpider::with_transport("test-key", config, mock.clone()).unwrap();
    (cs, mock)
}

fn client() -> (ChemSpider, Arc<MockTransport>) {
    client_with(ClientConfig::default())
}

// =============================================================================
// REQUEST CONSTRUCTION
// =============================================================================

#[test]
fn test_datasources_request() {
    let (cs, mock) = client();
    mock.on_get(
        "/lookups/datasources",
        json!({"dataSources": ["ChEBI", "PubChem", "Wikipedia"]}),
    );

    let sources = cs.get_datasources().unwrap();
    assert_eq!(sources, vec!["ChEBI", "PubChem", "Wikipedia"]);

    let request = &mock.requests()[0];
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(
        request.url,
        "https://api.rsc.org/compounds/v1/lookups/datasources"
    );
    assert_eq!(request.header("apikey"), Some("test-key"));
    assert_eq!(request.header("accept"), Some("application/json"));
    assert!(request.body.is_none());
}

#[test]
fn test_configured_server_and_version() {
    let (cs, mock) = client_with(ClientConfig {
        api_url: "http://localhost:8080".into(),
        api_version: "v2".into(),
        user_agent: Some("tests/1.0".into()),
        ..ClientConfig::default()
    });
    mock.on_get("/records/236/image", json!({"image": "iVBORw0KGgo="}));

    cs.get_image(236).unwrap();

    let request = &mock.requests()[0];
    assert_eq!(
        request.url,
        "http://localhost:8080/compounds/v2/records/236/image"
    );
    assert_eq!(request.header("User-Agent"), Some("tests/1.0"));
}

#[test]
fn test_list_query_params_are_comma_joined() {
    let (cs, mock) = client();
    mock.on_get(
        "/records/2157/externalreferences",
        json!({"externalReferences": [
            {"source": "PubChem", "externalId": "2244"},
            {"source": "ChEBI", "externalId": "CHEBI:15365"}
        ]}),
    );

    let refs = cs
        .get_external_references(2157, &["PubChem", "ChEBI"])
        .unwrap();
    assert_eq!(refs.len(), 2);
    assert_eq!(refs[1].external_id.as_deref(), Some("CHEBI:15365"));
    assert_eq!(
        mock.requests()[0].query_value("dataSources"),
        Some("PubChem,ChEBI")
    );
}

#[test]
fn test_selected_fields_only() {
    let (cs, mock) = client();
    mock.on_get("/records/236/details", json!({"id": 236, "smiles": "c1ccccc1"}));

    let record = cs
        .get_details(236, &[DetailField::Smiles, DetailField::Formula])
        .unwrap();
    assert_eq!(record.smiles.as_deref(), Some("c1ccccc1"));
    assert!(record.formula.is_none());
    assert_eq!(
        mock.requests()[0].query_value("fields"),
        Some("SMILES,Formula")
    );
}

#[test]
fn test_generic_invoke_by_name() {
    let (cs, mock) = client();
    mock.on_post("/tools/convert", json!({"output": "BSYNRYMUTXBXSQ-UHFFFAOYSA-N"}));

    let params = Params::new()
        .with("input", "InChI=1S/C9H8O4/c1-6(10)13-8-5-3-2-4-7(8)9(11)12/h2-5H,1H3,(H,11,12)")
        .with("inputFormat", "InChI")
        .with("outputFormat", "InChIKey");
    let output: String = cs.invoke(ops::CONVERT, params).unwrap().into_value().unwrap();
    assert_eq!(output, "BSYNRYMUTXBXSQ-UHFFFAOYSA-N");
}

#[test]
fn test_undeclared_param_rejected_without_io() {
    let (cs, mock) = client();
    let params = Params::new().with("recordId", 1).with("colour", "blue");
    let err = cs.invoke(ops::DETAILS, params).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(mock.request_count(), 0);
}

// =============================================================================
// ERROR CLASSIFICATION
// =============================================================================

#[test]
fn test_bad_key_is_auth_error() {
    let (cs, mock) = client();
    mock.require_api_key("the-real-key");
    mock.on_get("/lookups/datasources", json!({"dataSources": []}));

    let err = cs.get_datasources().unwrap_err();
    assert!(matches!(err, ChemSpiderError::Auth { status: 401, .. }));
    assert_eq!(err.kind(), ErrorKind::Auth);
}

#[test]
fn test_empty_key_is_auth_error() {
    let mock = Arc::new(MockTransport::new());
    for key in ["", "   "] {
        let err = ChemSpider::with_transport(key, ClientConfig::default(), mock.clone()).unwrap_err();
        assert!(matches!(err, ChemSpiderError::Auth { status: 401, .. }));
        assert_eq!(err.kind(), ErrorKind::Auth);
    }
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn test_unknown_id_is_not_found() {
    let (cs, mock) = client();
    mock.on(HttpMethod::Get, "/records/999999999/details", MockResponse::status(404));

    let err = cs.get_details(999_999_999, &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.status_code(), Some(404));
}

#[test]
fn test_empty_record_is_not_found() {
    let (cs, mock) = client();
    mock.on_get("/records/5/details", json!({}));
    assert!(matches!(
        cs.get_details(5, &[]).unwrap_err(),
        ChemSpiderError::NotFound(_)
    ));
}

#[test]
fn test_server_error() {
    let (cs, mock) = client();
    mock.on(
        HttpMethod::Get,
        "/records/1/mol",
        MockResponse::json(503, json!({"message": "Maintenance"})),
    );
    let err = cs.get_mol(1, false).unwrap_err();
    assert_eq!(
        err,
        ChemSpiderError::Server {
            status: 503,
            message: "Maintenance".into()
        }
    );
}

#[test]
fn test_html_body_on_success_is_parse_error() {
    let (cs, mock) = client();
    mock.on(
        HttpMethod::Get,
        "/lookups/datasources",
        MockResponse::raw(200, "<html>maintenance</html>"),
    );
    assert_eq!(cs.get_datasources().unwrap_err().kind(), ErrorKind::Parse);
}

#[test]
fn test_timeout() {
    let (cs, mock) = client();
    mock.on(HttpMethod::Get, "/records/1/image", MockResponse::timeout());
    assert_eq!(cs.get_image(1).unwrap_err().kind(), ErrorKind::Timeout);
}

#[test]
fn test_failures_are_counted() {
    let (cs, mock) = client();
    mock.on(HttpMethod::Get, "/lookups/datasources", MockResponse::status(500));
    let _ = cs.get_datasources();
    let _ = cs.get_datasources();

    let snapshot = cs.metrics().snapshot();
    assert_eq!(snapshot.requests_sent, 2);
    assert_eq!(snapshot.requests_failed, 2);
    assert_eq!(mock.request_count(), 2, "no retries");
}

// =============================================================================
// BATCH CHUNKING
// =============================================================================

fn records(ids: std::ops::Range<u64>) -> Value {
    let list: Vec<Value> = ids.map(|id| json!({"id": id})).collect();
    json!({ "records": list })
}

#[test]
fn test_batch_of_250_is_three_requests() {
    let (cs, mock) = client();
    mock.on_post("/records/batch", records(0..100))
        .on_post("/records/batch", records(100..200))
        .on_post("/records/batch", records(200..250));

    let ids: Vec<u64> = (0..250).collect();
    let result = cs.get_details_batch(&ids, &[DetailField::Formula]).unwrap();

    assert_eq!(result.len(), 250);
    assert!(result.iter().enumerate().all(|(i, r)| r.id == i as u64));

    let requests = mock.requests_to("/records/batch");
    assert_eq!(requests.len(), 3);
    let sizes: Vec<usize> = requests
        .iter()
        .map(|r| r.body.as_ref().unwrap()["recordIds"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![100, 100, 50]);
    for request in &requests {
        assert_eq!(request.body.as_ref().unwrap()["fields"], json!(["Formula"]));
    }
    assert_eq!(cs.metrics().snapshot().batch_chunks, 3);
}

#[test]
fn test_batch_at_limit_is_one_request() {
    let (cs, mock) = client();
    mock.on_post("/records/batch", records(0..100));

    let ids: Vec<u64> = (0..100).collect();
    assert_eq!(cs.get_details_batch(&ids, &[]).unwrap().len(), 100);
    assert_eq!(mock.request_count(), 1);
}

#[test]
fn test_empty_batch_makes_no_call() {
    let (cs, mock) = client();
    assert!(cs.get_details_batch(&[], &[]).unwrap().is_empty());
    assert_eq!(mock.request_count(), 0);
}
