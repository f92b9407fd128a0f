//! Query options and detail field selectors
//!
//! All of these are plain immutable values that serialize to the exact
//! strings the service expects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ChemSpiderError;

/// Declare a closed set of wire strings with `as_str`, `ALL`, `Display`,
/// `FromStr` (case-insensitive) and `From<_> for Value`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant),+
        }

        impl $name {
            /// Every value, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire representation
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ChemSpiderError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| {
                        ChemSpiderError::Validation(format!(
                            "Invalid {}: '{}'",
                            stringify!($name),
                            s
                        ))
                    })
            }
        }

        impl From<$name> for Value {
            fn from(value: $name) -> Value {
                Value::String(value.as_str().to_string())
            }
        }
    };
}

wire_enum! {
    /// Field selectable in details requests
    pub enum DetailField {
        Smiles => "SMILES",
        Formula => "Formula",
        AverageMass => "AverageMass",
        MolecularWeight => "MolecularWeight",
        MonoisotopicMass => "MonoisotopicMass",
        NominalMass => "NominalMass",
        CommonName => "CommonName",
        ReferenceCount => "ReferenceCount",
        DataSourceCount => "DataSourceCount",
        PubMedCount => "PubMedCount",
        RscCount => "RSCCount",
        Mol2D => "Mol2D",
        Mol3D => "Mol3D",
    }
}

impl DetailField {
    /// Fields requested when the caller does not choose any
    pub const DEFAULT: &'static [DetailField] = DetailField::ALL;

    /// Fields a `Compound` fetches on first detail access; molfiles have
    /// their own fetch.
    pub const COMMON: &'static [DetailField] = &[
        DetailField::Smiles,
        DetailField::Formula,
        DetailField::AverageMass,
        DetailField::MolecularWeight,
        DetailField::MonoisotopicMass,
        DetailField::NominalMass,
        DetailField::CommonName,
        DetailField::ReferenceCount,
        DetailField::DataSourceCount,
        DetailField::PubMedCount,
        DetailField::RscCount,
    ];
}

wire_enum! {
    /// Sort key for filter results
    pub enum OrderBy {
        RecordId => "recordId",
        MassDefect => "massDefect",
        MolecularWeight => "molecularWeight",
        ReferenceCount => "referenceCount",
        DataSourceCount => "dataSourceCount",
        PubMedCount => "pubMedCount",
        RscCount => "rscCount",
    }
}

wire_enum! {
    /// Sort direction for filter results
    pub enum SortDirection {
        Ascending => "ascending",
        Descending => "descending",
    }
}

wire_enum! {
    /// Connectivity restriction for element and intrinsic property filters
    pub enum Complexity {
        Any => "any",
        /// One connected system
        Single => "single",
        /// Disconnected systems, or a metal atom or ion
        Multiple => "multiple",
    }
}

wire_enum! {
    /// Isotope labelling restriction
    pub enum Isotopic {
        Any => "any",
        Labeled => "labeled",
        Unlabeled => "unlabeled",
    }
}

/// Ordering for a filter query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultOrder {
    pub by: OrderBy,
    pub direction: SortDirection,
}

impl ResultOrder {
    pub fn new(by: OrderBy, direction: SortDirection) -> Self {
        Self { by, direction }
    }

    pub fn ascending(by: OrderBy) -> Self {
        Self::new(by, SortDirection::Ascending)
    }

    pub fn descending(by: OrderBy) -> Self {
        Self::new(by, SortDirection::Descending)
    }
}

/// Shared `options` object for element and intrinsic property filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub complexity: Option<Complexity>,
    pub isotopic: Option<Isotopic>,
}

impl FilterOptions {
    pub(crate) fn to_value(self, include_all: Option<bool>) -> Value {
        let mut options = serde_json::Map::new();
        if let Some(include_all) = include_all {
            options.insert("includeAll".to_string(), Value::Bool(include_all));
        }
        if let Some(complexity) = self.complexity {
            options.insert("complexity".to_string(), complexity.into());
        }
        if let Some(isotopic) = self.isotopic {
            options.insert("isotopic".to_string(), isotopic.into());
        }
        Value::Object(options)
    }
}

/// Mass with tolerance, used by the intrinsic property filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassRange {
    pub mass: f64,
    pub range: f64,
}

impl MassRange {
    pub fn new(mass: f64, range: f64) -> Self {
        Self { mass, range }
    }

    pub(crate) fn to_value(self) -> Value {
        serde_json::json!({ "mass": self.mass, "range": self.range })
    }
}

/// Criteria for the intrinsic property filter; at least one must be set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntrinsicProperties {
    pub formula: Option<String>,
    pub molecular_weight: Option<MassRange>,
    pub nominal_mass: Option<MassRange>,
    pub average_mass: Option<MassRange>,
    pub monoisotopic_mass: Option<MassRange>,
    pub options: FilterOptions,
}

impl IntrinsicProperties {
    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        self.formula.is_none()
            && self.molecular_weight.is_none()
            && self.nominal_mass.is_none()
            && self.average_mass.is_none()
            && self.monoisotopic_mass.is_none()
    }
}
