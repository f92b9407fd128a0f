//! Typed response records

use std::time::Duration;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// ChemSpider record identifier
pub type RecordId = u64;

/// Compound details as returned by `records/{id}/details` and `records/batch`
///
/// Only `id` is guaranteed; every other field is present when requested
/// and known to the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundRecord {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smiles: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecular_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monoisotopic_mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominal_mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_med_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsc_count: Option<u64>,
    #[serde(rename = "mol2D", default, skip_serializing_if = "Option::is_none")]
    pub mol_2d: Option<String>,
    #[serde(rename = "mol3D", default, skip_serializing_if = "Option::is_none")]
    pub mol_3d: Option<String>,
}

/// A link from a record to an external data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalReference {
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

/// Body of `filter/{queryId}/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStatus {
    /// Wire status string, e.g. `Processing` or `ResultReady`
    pub status: String,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
    /// Elapsed server time as `HH:MM:SS.fff`
    #[serde(default)]
    pub elapsed: Option<String>,
}

impl FilterStatus {
    /// Elapsed server time, if reported and well-formed
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed.as_deref().and_then(parse_elapsed)
    }
}

/// Parse an `HH:MM:SS[.fff]` duration string
pub fn parse_elapsed(raw: &str) -> Option<Duration> {
    let time = NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S%.f").ok()?;
    Some(Duration::new(
        u64::from(time.num_seconds_from_midnight()),
        time.nanosecond(),
    ))
}
