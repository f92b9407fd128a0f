//! Structure formats accepted by `tools/convert`

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ChemSpiderError, ChemSpiderResult};

/// Chemical structure representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureFormat {
    #[serde(rename = "InChI")]
    InChI,
    #[serde(rename = "InChIKey")]
    InChIKey,
    #[serde(rename = "Mol")]
    Mol,
    #[serde(rename = "SMILES")]
    Smiles,
}

/// Conversions the service supports
///
/// InChI → InChIKey is a one-way hash: the InChIKey → InChI lookup that
/// follows it is a database search, not an inverse.
pub const SUPPORTED_CONVERSIONS: &[(StructureFormat, StructureFormat)] = &[
    (StructureFormat::InChI, StructureFormat::InChIKey),
    (StructureFormat::InChI, StructureFormat::Mol),
    (StructureFormat::InChI, StructureFormat::Smiles),
    (StructureFormat::InChIKey, StructureFormat::InChI),
    (StructureFormat::InChIKey, StructureFormat::Mol),
    (StructureFormat::Mol, StructureFormat::InChI),
    (StructureFormat::Mol, StructureFormat::InChIKey),
    (StructureFormat::Smiles, StructureFormat::InChI),
];

impl StructureFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureFormat::InChI => "InChI",
            StructureFormat::InChIKey => "InChIKey",
            StructureFormat::Mol => "Mol",
            StructureFormat::Smiles => "SMILES",
        }
    }

    /// Whether `self → to` is a supported conversion
    pub fn converts_to(self, to: StructureFormat) -> bool {
        SUPPORTED_CONVERSIONS.contains(&(self, to))
    }

    /// Whether `self → to` loses information
    pub fn is_lossy(self, to: StructureFormat) -> bool {
        to == StructureFormat::InChIKey
    }
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StructureFormat {
    type Err = ChemSpiderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inchi" => Ok(StructureFormat::InChI),
            "inchikey" => Ok(StructureFormat::InChIKey),
            "mol" | "molfile" => Ok(StructureFormat::Mol),
            "smiles" => Ok(StructureFormat::Smiles),
            _ => Err(ChemSpiderError::Validation(format!(
                "Invalid structure format: '{}'",
                s
            ))),
        }
    }
}

impl From<StructureFormat> for Value {
    fn from(format: StructureFormat) -> Value {
        Value::String(format.as_str().to_string())
    }
}

/// Reject unsupported conversions, empty input and malformed InChIKeys
pub fn check_conversion(input: &str, from: StructureFormat, to: StructureFormat) -> ChemSpiderResult<()> {
    if !from.converts_to(to) {
        return Err(ChemSpiderError::Validation(format!(
            "Unsupported conversion: {} to {}",
            from, to
        )));
    }
    if input.trim().is_empty() {
        return Err(ChemSpiderError::Validation(
            "Conversion input must not be empty".to_string(),
        ));
    }
    match from {
        StructureFormat::InChIKey if !is_inchikey(input.trim()) => Err(
            ChemSpiderError::Validation(format!("Not an InChIKey: '{}'", input)),
        ),
        _ => Ok(()),
    }
}

/// Standard InChIKey layout: 14-10-1 uppercase letters
pub fn is_inchikey(candidate: &str) -> bool {
    static INCHIKEY: OnceLock<Regex> = OnceLock::new();
    INCHIKEY
        .get_or_init(|| Regex::new(r"^[A-Z]{14}-[A-Z]{10}-[A-Z]$").expect("static pattern"))
        .is_match(candidate)
}
