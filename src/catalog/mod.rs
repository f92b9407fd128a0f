//! # Endpoint Catalog
//!
//! Single source of truth mapping logical operations to HTTP method,
//! path template, parameter schema and result shape. Pure lookup, no I/O.

mod descriptor;
mod params;

pub use descriptor::{
    BatchLimit, HttpMethod, OperationDescriptor, ParamLocation, ParamSpec, ParamStyle, ResultShape,
};
pub use params::Params;

use std::collections::BTreeMap;

use crate::errors::{ChemSpiderError, ChemSpiderResult};

/// Logical operation names
pub mod ops {
    pub const DATASOURCES: &str = "lookups.datasources";
    pub const DETAILS: &str = "records.details";
    pub const DETAILS_BATCH: &str = "records.batch";
    pub const EXTERNAL_REFERENCES: &str = "records.externalreferences";
    pub const IMAGE: &str = "records.image";
    pub const MOL: &str = "records.mol";
    pub const FILTER_ELEMENT: &str = "filter.element";
    pub const FILTER_FORMULA: &str = "filter.formula";
    pub const FILTER_INCHI: &str = "filter.inchi";
    pub const FILTER_INCHIKEY: &str = "filter.inchikey";
    pub const FILTER_INTRINSIC_PROPERTY: &str = "filter.intrinsicproperty";
    pub const FILTER_MASS: &str = "filter.mass";
    pub const FILTER_NAME: &str = "filter.name";
    pub const FILTER_SMILES: &str = "filter.smiles";
    pub const FILTER_STATUS: &str = "filter.status";
    pub const FILTER_RESULTS: &str = "filter.results";
    pub const FILTER_RESULTS_SDF: &str = "filter.results.sdf";
    pub const CONVERT: &str = "tools.convert";
}

/// Maximum record IDs per `records.batch` request
pub const MAX_DETAILS_BATCH: usize = 100;

use self::descriptor::ParamStyle::{List, Scalar};

const ORDERING: [ParamSpec; 2] = [
    ParamSpec::body("orderBy", Scalar, false),
    ParamSpec::body("orderDirection", Scalar, false),
];

const fn filter(
    name: &'static str,
    path: &'static str,
    params: &'static [ParamSpec],
) -> OperationDescriptor {
    OperationDescriptor {
        name,
        method: HttpMethod::Post,
        api: "compounds",
        namespace: "filter",
        path,
        params,
        result: ResultShape::Field { key: "queryId" },
        batch: None,
    }
}

const ELEMENT_PARAMS: &[ParamSpec] = &[
    ParamSpec::body("includeElements", List, true),
    ParamSpec::body("excludeElements", List, false),
    ParamSpec::body("options", Scalar, false),
    ORDERING[0],
    ORDERING[1],
];

const FORMULA_PARAMS: &[ParamSpec] = &[
    ParamSpec::body("formula", Scalar, true),
    ParamSpec::body("dataSources", List, false),
    ORDERING[0],
    ORDERING[1],
];

const INCHI_PARAMS: &[ParamSpec] = &[ParamSpec::body("inchi", Scalar, true)];

const INCHIKEY_PARAMS: &[ParamSpec] = &[ParamSpec::body("inchikey", Scalar, true)];

const INTRINSIC_PARAMS: &[ParamSpec] = &[
    ParamSpec::body("formula", Scalar, false),
    ParamSpec::body("molecularWeight", Scalar, false),
    ParamSpec::body("nominalMass", Scalar, false),
    ParamSpec::body("averageMass", Scalar, false),
    ParamSpec::body("monoisotopicMass", Scalar, false),
    ParamSpec::body("options", Scalar, false),
    ORDERING[0],
    ORDERING[1],
];

const MASS_PARAMS: &[ParamSpec] = &[
    ParamSpec::body("mass", Scalar, true),
    ParamSpec::body("range", Scalar, true),
    ParamSpec::body("dataSources", List, false),
    ORDERING[0],
    ORDERING[1],
];

const NAME_PARAMS: &[ParamSpec] = &[
    ParamSpec::body("name", Scalar, true),
    ORDERING[0],
    ORDERING[1],
];

const SMILES_PARAMS: &[ParamSpec] = &[ParamSpec::body("smiles", Scalar, true)];

const DESCRIPTORS: &[OperationDescriptor] = &[
    OperationDescriptor {
        name: ops::DATASOURCES,
        method: HttpMethod::Get,
        api: "compounds",
        namespace: "lookups",
        path: "datasources",
        params: &[],
        result: ResultShape::Field { key: "dataSources" },
        batch: None,
    },
    OperationDescriptor {
        name: ops::DETAILS,
        method: HttpMethod::Get,
        api: "compounds",
        namespace: "records",
        path: "{recordId}/details",
        params: &[ParamSpec::path("recordId"), ParamSpec::query("fields", List)],
        result: ResultShape::Record,
        batch: None,
    },
    OperationDescriptor {
        name: ops::DETAILS_BATCH,
        method: HttpMethod::Post,
        api: "compounds",
        namespace: "records",
        path: "batch",
        params: &[
            ParamSpec::body("recordIds", List, true),
            ParamSpec::body("fields", List, false),
        ],
        result: ResultShape::List { key: "records" },
        batch: Some(BatchLimit {
            param: "recordIds",
            max: MAX_DETAILS_BATCH,
        }),
    },
    OperationDescriptor {
        name: ops::EXTERNAL_REFERENCES,
        method: HttpMethod::Get,
        api: "compounds",
        namespace: "records",
        path: "{recordId}/externalreferences",
        params: &[
            ParamSpec::path("recordId"),
            ParamSpec::query("dataSources", List),
        ],
        result: ResultShape::List {
            key: "externalReferences",
        },
        batch: None,
    },
    OperationDescriptor {
        name: ops::IMAGE,
        method: HttpMethod::Get,
        api: "compounds",
        namespace: "records",
        path: "{recordId}/image",
        params: &[ParamSpec::path("recordId")],
        result: ResultShape::Binary { key: "image" },
        batch: None,
    },
    OperationDescriptor {
        name: ops::MOL,
        method: HttpMethod::Get,
        api: "compounds",
        namespace: "records",
        path: "{recordId}/mol",
        params: &[ParamSpec::path("recordId")],
        result: ResultShape::Field { key: "sdf" },
        batch: None,
    },
    filter(ops::FILTER_ELEMENT, "element", ELEMENT_PARAMS),
    filter(ops::FILTER_FORMULA, "formula", FORMULA_PARAMS),
    filter(ops::FILTER_INCHI, "inchi", INCHI_PARAMS),
    filter(ops::FILTER_INCHIKEY, "inchikey", INCHIKEY_PARAMS),
    filter(ops::FILTER_INTRINSIC_PROPERTY, "intrinsicproperty", INTRINSIC_PARAMS),
    filter(ops::FILTER_MASS, "mass", MASS_PARAMS),
    filter(ops::FILTER_NAME, "name", NAME_PARAMS),
    filter(ops::FILTER_SMILES, "smiles", SMILES_PARAMS),
    OperationDescriptor {
        name: ops::FILTER_STATUS,
        method: HttpMethod::Get,
        api: "compounds",
        namespace: "filter",
        path: "{queryId}/status",
        params: &[ParamSpec::path("queryId")],
        result: ResultShape::Record,
        batch: None,
    },
    OperationDescriptor {
        name: ops::FILTER_RESULTS,
        method: HttpMethod::Get,
        api: "compounds",
        namespace: "filter",
        path: "{queryId}/results",
        params: &[
            ParamSpec::path("queryId"),
            ParamSpec::query("start", Scalar),
            ParamSpec::query("count", Scalar),
        ],
        result: ResultShape::List { key: "results" },
        batch: None,
    },
    OperationDescriptor {
        name: ops::FILTER_RESULTS_SDF,
        method: HttpMethod::Get,
        api: "compounds",
        namespace: "filter",
        path: "{queryId}/results/sdf",
        params: &[ParamSpec::path("queryId")],
        result: ResultShape::Binary { key: "results" },
        batch: None,
    },
    OperationDescriptor {
        name: ops::CONVERT,
        method: HttpMethod::Post,
        api: "compounds",
        namespace: "tools",
        path: "convert",
        params: &[
            ParamSpec::body("input", Scalar, true),
            ParamSpec::body("inputFormat", Scalar, true),
            ParamSpec::body("outputFormat", Scalar, true),
        ],
        result: ResultShape::Field { key: "output" },
        batch: None,
    },
];

/// Immutable registry of operation descriptors
///
/// Built once per client and shared by reference.
#[derive(Debug, Clone)]
pub struct EndpointCatalog {
    by_name: BTreeMap<&'static str, OperationDescriptor>,
}

impl EndpointCatalog {
    /// Catalog of the ChemSpider compounds API
    pub fn standard() -> Self {
        Self::from_descriptors(DESCRIPTORS.iter().cloned())
    }

    /// Build a catalog from explicit descriptors
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = OperationDescriptor>) -> Self {
        Self {
            by_name: descriptors.into_iter().map(|d| (d.name, d)).collect(),
        }
    }

    /// Resolve an operation name
    pub fn resolve(&self, name: &str) -> ChemSpiderResult<&OperationDescriptor> {
        self.by_name
            .get(name)
            .ok_or_else(|| ChemSpiderError::Validation(format!("Unknown operation: {}", name)))
    }

    /// All operation names, sorted
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_name.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for EndpointCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known() {
        let catalog = EndpointCatalog::standard();
        let desc = catalog.resolve(ops::DETAILS).unwrap();
        assert_eq!(desc.method, HttpMethod::Get);
        assert_eq!(desc.namespace, "records");
        assert_eq!(desc.result, ResultShape::Record);
    }

    #[test]
    fn test_resolve_unknown_is_validation_error() {
        let catalog = EndpointCatalog::standard();
        let err = catalog.resolve("records.nonexistent").unwrap_err();
        assert!(matches!(err, ChemSpiderError::Validation(_)));
    }

    #[test]
    fn test_every_operation_is_registered() {
        let catalog = EndpointCatalog::standard();
        assert_eq!(catalog.len(), DESCRIPTORS.len());
        for name in [
            ops::DATASOURCES,
            ops::DETAILS,
            ops::DETAILS_BATCH,
            ops::EXTERNAL_REFERENCES,
            ops::IMAGE,
            ops::MOL,
            ops::FILTER_ELEMENT,
            ops::FILTER_FORMULA,
            ops::FILTER_INCHI,
            ops::FILTER_INCHIKEY,
            ops::FILTER_INTRINSIC_PROPERTY,
            ops::FILTER_MASS,
            ops::FILTER_NAME,
            ops::FILTER_SMILES,
            ops::FILTER_STATUS,
            ops::FILTER_RESULTS,
            ops::FILTER_RESULTS_SDF,
            ops::CONVERT,
        ] {
            assert!(catalog.resolve(name).is_ok(), "missing {}", name);
        }
    }

    #[test]
    fn test_path_templates_declare_their_params() {
        let catalog = EndpointCatalog::standard();
        for name in catalog.names() {
            let desc = catalog.resolve(name).unwrap();
            for spec in desc.params.iter().filter(|p| p.location == ParamLocation::Path) {
                assert!(desc.path.contains(&format!("{{{}}}", spec.name)));
                assert!(spec.required);
            }
        }
    }

    #[test]
    fn test_only_batch_declares_limit() {
        let catalog = EndpointCatalog::standard();
        let batch = catalog.resolve(ops::DETAILS_BATCH).unwrap().batch.unwrap();
        assert_eq!(batch.param, "recordIds");
        assert_eq!(batch.max, 100);
        assert!(catalog.resolve(ops::DETAILS).unwrap().batch.is_none());
    }

    #[test]
    fn test_filters_return_query_id() {
        let catalog = EndpointCatalog::standard();
        let desc = catalog.resolve(ops::FILTER_MASS).unwrap();
        assert_eq!(desc.method, HttpMethod::Post);
        assert_eq!(desc.result, ResultShape::Field { key: "queryId" });
    }
}
