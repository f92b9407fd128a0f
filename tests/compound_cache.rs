//! Compound handle caching tests
//!
//! Test Categories:
//! 1. Construction does no I/O
//! 2. One fetch per property group
//! 3. Failures are not cached
//! 4. Handle identity

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use serde_json::{json, Value};

use chemspider::catalog::HttpMethod;
use chemspider::transport::{MockResponse, MockTransport};
use chemspider::{ChemSpider, ClientConfig, DetailField, ErrorKind};

const ASPIRIN: u64 = 2157;
const ASPIRIN_MOL: &str = "\n  Ketcher\n\n 13 13  0  0  0  0  0  0  0  0999 V2000\nM  END\n";

fn client() -> (ChemSpider, Arc<MockTransport>) {
    let mock = Arc::new(MockTransport::new());
    let cs = ChemSpider::with_transport("test-key", ClientConfig::default(), mock.clone()).unwrap();
    (cs, mock)
}

fn aspirin_details() -> Value {
    json!({
        "id": ASPIRIN,
        "smiles": "CC(=O)Oc1ccccc1C(=O)O",
        "formula": "C_{9}H_{8}O_{4}",
        "averageMass": 180.1574,
        "molecularWeight": 180.1574,
        "monoisotopicMass": 180.042252,
        "nominalMass": 180.0,
        "commonName": "Aspirin",
        "referenceCount": 63,
        "dataSourceCount": 115,
        "pubMedCount": 4932,
        "rscCount": 8221
    })
}

// =============================================================================
// CONSTRUCTION
// =============================================================================

#[test]
fn test_get_compound_does_no_io() {
    let (cs, mock) = client();
    let compound = cs.get_compound(ASPIRIN);
    let many = cs.get_compounds(&[1, 2, 3]);

    assert_eq!(compound.record_id(), ASPIRIN);
    assert_eq!(
        compound.image_url(),
        "http://www.chemspider.com/ImagesHandler.ashx?id=2157"
    );
    assert_eq!(many.len(), 3);
    assert_eq!(mock.request_count(), 0);
}

// =============================================================================
// ONE FETCH PER PROPERTY GROUP
// =============================================================================

#[test]
fn test_detail_properties_share_one_request() {
    let (cs, mock) = client();
    mock.on_get("/records/2157/details", aspirin_details());
    let compound = cs.get_compound(ASPIRIN);

    assert_eq!(compound.smiles().unwrap().as_deref(), Some("CC(=O)Oc1ccccc1C(=O)O"));
    assert_eq!(compound.molecular_formula().unwrap().as_deref(), Some("C_{9}H_{8}O_{4}"));
    assert_eq!(compound.average_mass().unwrap(), Some(180.1574));
    assert_eq!(compound.molecular_weight().unwrap(), Some(180.1574));
    assert_eq!(compound.monoisotopic_mass().unwrap(), Some(180.042252));
    assert_eq!(compound.nominal_mass().unwrap(), Some(180.0));
    assert_eq!(compound.common_name().unwrap().as_deref(), Some("Aspirin"));
    assert_eq!(compound.reference_count().unwrap(), Some(63));
    assert_eq!(compound.datasource_count().unwrap(), Some(115));
    assert_eq!(compound.pubmed_count().unwrap(), Some(4932));
    assert_eq!(compound.rsc_count().unwrap(), Some(8221));

    assert_eq!(mock.request_count(), 1);
    let snapshot = cs.metrics().snapshot();
    assert_eq!(snapshot.cache_misses, 1);
    assert_eq!(snapshot.cache_hits, 10);
}

#[test]
fn test_cached_details_agree_with_direct_call() {
    let (cs, mock) = client();
    mock.on_get("/records/2157/details", aspirin_details());

    let direct = cs.get_details(ASPIRIN, DetailField::COMMON).unwrap();
    let compound = cs.get_compound(ASPIRIN);
    assert_eq!(*compound.details().unwrap(), direct);
    assert_eq!(compound.smiles().unwrap(), direct.smiles);
}

#[test]
fn test_clones_share_cache() {
    let (cs, mock) = client();
    mock.on_get("/records/2157/details", aspirin_details());

    let compound = cs.get_compound(ASPIRIN);
    let clone = compound.clone();
    compound.smiles().unwrap();
    clone.smiles().unwrap();
    assert_eq!(mock.request_count(), 1);
}

#[test]
fn test_concurrent_first_access_fetches_once() {
    let (cs, mock) = client();
    mock.with_latency(std::time::Duration::from_millis(20));
    mock.on_get("/records/2157/details", aspirin_details());

    let compound = cs.get_compound(ASPIRIN);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let c = compound.clone();
            thread::spawn(move || c.common_name().unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some("Aspirin"));
    }
    assert_eq!(mock.request_count(), 1);
}

#[test]
fn test_image_cached() {
    let (cs, mock) = client();
    mock.on_get("/records/2157/image", json!({"image": "iVBORw0KGgo="}));

    let compound = cs.get_compound(ASPIRIN);
    let first = compound.image().unwrap();
    let second = compound.image().unwrap();
    assert_eq!(&first[..4], b"\x89PNG");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(mock.request_count(), 1);
}

#[test]
fn test_inchi_converted_from_mol() {
    let (cs, mock) = client();
    mock.on_get("/records/2157/details", json!({"id": ASPIRIN, "mol2D": ASPIRIN_MOL}));
    mock.on_post(
        "/tools/convert",
        json!({"output": "InChI=1S/C9H8O4/c1-6(10)13-8-5-3-2-4-7(8)9(11)12/h2-5H,1H3,(H,11,12)"}),
    );

    let compound = cs.get_compound(ASPIRIN);
    let inchi = compound.inchi().unwrap();
    assert!(inchi.starts_with("InChI=1S/C9H8O4"));
    compound.inchi().unwrap();

    assert_eq!(mock.requests_to("/details").len(), 1);
    let converts = mock.requests_to("/tools/convert");
    assert_eq!(converts.len(), 1);
    let body = converts[0].body.as_ref().unwrap();
    assert_eq!(body["input"], ASPIRIN_MOL);
    assert_eq!(body["inputFormat"], "Mol");
    assert_eq!(body["outputFormat"], "InChI");
    assert_eq!(mock.requests_to("/details")[0].query_value("fields"), Some("Mol2D"));
}

#[test]
fn test_batch_prefills_details() {
    let (cs, mock) = client();
    mock.on_post(
        "/records/batch",
        json!({"records": [
            {"id": 1, "commonName": "one"},
            {"id": 2, "commonName": "two"}
        ]}),
    );

    let compounds = cs.get_compounds_with_details(&[1, 2]).unwrap();
    assert_eq!(compounds[1].common_name().unwrap().as_deref(), Some("two"));
    assert_eq!(mock.request_count(), 1);
}

// =============================================================================
// FAILURES ARE NOT CACHED
// =============================================================================

#[test]
fn test_failed_fetch_is_retried_on_next_access() {
    let (cs, mock) = client();
    mock.on(HttpMethod::Get, "/records/2157/details", MockResponse::status(503));
    mock.on_get("/records/2157/details", aspirin_details());

    let compound = cs.get_compound(ASPIRIN);
    assert_eq!(compound.smiles().unwrap_err().kind(), ErrorKind::Server);
    assert!(compound.smiles().unwrap().is_some());
    assert_eq!(mock.request_count(), 2);
}

#[test]
fn test_missing_mol_is_not_found() {
    let (cs, mock) = client();
    mock.on_get("/records/7/details", json!({"id": 7}));

    let compound = cs.get_compound(7);
    assert_eq!(compound.mol_3d().unwrap_err().kind(), ErrorKind::NotFound);
}

// =============================================================================
// IDENTITY
// =============================================================================

#[test]
fn test_equality_by_id_and_client() {
    let (cs, _) = client();
    let (other, _) = client();

    assert_eq!(cs.get_compound(1), cs.get_compound(1));
    assert_ne!(cs.get_compound(1), cs.get_compound(2));
    assert_ne!(cs.get_compound(1), other.get_compound(1));

    let set: HashSet<_> = [cs.get_compound(1), cs.get_compound(1), cs.get_compound(2)]
        .into_iter()
        .collect();
    assert_eq!(set.len(), 2);
}
