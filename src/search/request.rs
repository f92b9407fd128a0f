//! Search requests accepted by `ChemSpider::search_with`

use crate::client::ChemSpider;
use crate::errors::ChemSpiderResult;
use crate::models::{QueryId, ResultOrder};

/// Run the search on the calling thread or on a background thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// `search_with` returns once the search has finished
    #[default]
    Blocking,
    /// `search_with` returns immediately; use `Results::wait`
    Background,
}

/// One filter query to submit and follow to completion
#[derive(Debug, Clone, PartialEq)]
pub enum SearchRequest {
    Name {
        name: String,
        order: Option<ResultOrder>,
    },
    Formula {
        formula: String,
        datasources: Vec<String>,
        order: Option<ResultOrder>,
    },
    Mass {
        mass: f64,
        range: f64,
        datasources: Vec<String>,
        order: Option<ResultOrder>,
    },
    InChI(String),
    InChIKey(String),
    Smiles(String),
}

impl SearchRequest {
    pub fn name(name: impl Into<String>) -> Self {
        SearchRequest::Name {
            name: name.into(),
            order: None,
        }
    }

    pub fn formula(formula: impl Into<String>) -> Self {
        SearchRequest::Formula {
            formula: formula.into(),
            datasources: Vec::new(),
            order: None,
        }
    }

    /// Monoisotopic mass within `range`; a range of 0 is an exact match
    pub fn mass(mass: f64, range: f64) -> Self {
        SearchRequest::Mass {
            mass,
            range,
            datasources: Vec::new(),
            order: None,
        }
    }

    /// Set result ordering; ignored by structure identifier searches
    pub fn ordered(mut self, new_order: ResultOrder) -> Self {
        match &mut self {
            SearchRequest::Name { order, .. }
            | SearchRequest::Formula { order, .. }
            | SearchRequest::Mass { order, .. } => *order = Some(new_order),
            SearchRequest::InChI(_) | SearchRequest::InChIKey(_) | SearchRequest::Smiles(_) => {}
        }
        self
    }

    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            SearchRequest::Name { .. } => "name",
            SearchRequest::Formula { .. } => "formula",
            SearchRequest::Mass { .. } => "mass",
            SearchRequest::InChI(_) => "inchi",
            SearchRequest::InChIKey(_) => "inchikey",
            SearchRequest::Smiles(_) => "smiles",
        }
    }

    /// Submit the matching filter and return its query ID
    pub fn submit(&self, client: &ChemSpider) -> ChemSpiderResult<QueryId> {
        match self {
            SearchRequest::Name { name, order } => client.filter_name(name, *order),
            SearchRequest::Formula {
                formula,
                datasources,
                order,
            } => client.filter_formula(formula, datasources, *order),
            SearchRequest::Mass {
                mass,
                range,
                datasources,
                order,
            } => client.filter_mass(*mass, *range, datasources, *order),
            SearchRequest::InChI(inchi) => client.filter_inchi(inchi),
            SearchRequest::InChIKey(inchikey) => client.filter_inchikey(inchikey),
            SearchRequest::Smiles(smiles) => client.filter_smiles(smiles),
        }
    }
}
