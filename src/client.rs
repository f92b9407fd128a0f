//! # ChemSpider Client
//!
//! The public entry point. A `ChemSpider` handle owns the configuration,
//! credential, endpoint catalog, transport and metrics; clones share all of
//! them.
//!
//! ```ignore
//! use chemspider::{ChemSpider, DetailField};
//!
//! let cs = ChemSpider::new("<api key>")?;
//! let aspirin = cs.get_compound(2157);
//! println!("{:?}", aspirin.molecular_formula()?);
//!
//! for compound in cs.search("glucose").iter() {
//!     println!("{}", compound.record_id());
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::catalog::{ops, EndpointCatalog, Params};
use crate::compound::Compound;
use crate::config::{ApiKey, ClientConfig};
use crate::decoder::DecodedResponse;
use crate::errors::{ChemSpiderError, ChemSpiderResult};
use crate::mediator::RequestMediator;
use crate::models::{
    check_conversion, CompoundRecord, DetailField, ExternalReference, FilterOptions, FilterStatus,
    IntrinsicProperties, QueryId, RecordId, ResultOrder, StructureFormat,
};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::search::{QuerySession, Results, SearchMode, SearchRequest};
use crate::transport::{HttpTransport, Transport};

/// Lowest mass accepted by the mass filter
pub const MIN_FILTER_MASS: f64 = 1.0;
/// Highest mass accepted by the mass filter
pub const MAX_FILTER_MASS: f64 = 11_000.0;
/// Widest mass range accepted by mass filters
pub const MAX_FILTER_MASS_RANGE: f64 = 100.0;
/// Most elements an element filter may include
pub const MAX_INCLUDE_ELEMENTS: usize = 15;
/// Most elements an element filter may exclude
pub const MAX_EXCLUDE_ELEMENTS: usize = 100;

struct ClientInner {
    config: ClientConfig,
    mediator: RequestMediator,
    metrics: Arc<MetricsRegistry>,
}

/// Handle on the ChemSpider compounds API
#[derive(Clone)]
pub struct ChemSpider {
    inner: Arc<ClientInner>,
}

impl ChemSpider {
    /// Client with default configuration over HTTPS
    pub fn new(api_key: impl Into<String>) -> ChemSpiderResult<Self> {
        Self::with_config(api_key, ClientConfig::default())
    }

    /// Client with explicit configuration over HTTPS
    pub fn with_config(api_key: impl Into<String>, config: ClientConfig) -> ChemSpiderResult<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.timeout())?;
        Self::with_transport(api_key, config, Arc::new(transport))
    }

    /// Client over any transport
    pub fn with_transport(
        api_key: impl Into<String>,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> ChemSpiderResult<Self> {
        let api_key = ApiKey::new(api_key)?;
        config.validate()?;

        let metrics = Arc::new(MetricsRegistry::new());
        let mediator = RequestMediator::new(
            &config,
            api_key,
            Arc::new(EndpointCatalog::standard()),
            transport,
            Arc::clone(&metrics),
        );

        log_event_with_fields(
            Event::ClientCreated,
            &[
                ("api_url", config.api_url.as_str()),
                ("api_version", config.api_version.as_str()),
            ],
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                mediator,
                metrics,
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.inner.metrics
    }

    pub fn mediator(&self) -> &RequestMediator {
        &self.inner.mediator
    }

    /// Whether two handles share one underlying client
    pub fn same_client(&self, other: &ChemSpider) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Address of the shared client state, stable for its lifetime
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    /// Invoke a catalog operation by name
    pub fn invoke(&self, operation: &str, params: Params) -> ChemSpiderResult<DecodedResponse> {
        self.inner.mediator.invoke(operation, params)
    }

    // ==================
    // Lookups
    // ==================

    /// Names of all data sources
    pub fn get_datasources(&self) -> ChemSpiderResult<Vec<String>> {
        self.invoke(ops::DATASOURCES, Params::new())?.into_value()
    }

    // ==================
    // Records
    // ==================

    /// Details of one record; no fields means all of [`DetailField::DEFAULT`]
    pub fn get_details(
        &self,
        record_id: RecordId,
        fields: &[DetailField],
    ) -> ChemSpiderResult<CompoundRecord> {
        let params = Params::new()
            .with("recordId", record_id)
            .with("fields", field_names(fields));
        self.invoke(ops::DETAILS, params)?.into_record()
    }

    /// Details of many records, in as many requests as the batch limit needs
    ///
    /// An empty `record_ids` makes no request.
    pub fn get_details_batch(
        &self,
        record_ids: &[RecordId],
        fields: &[DetailField],
    ) -> ChemSpiderResult<Vec<CompoundRecord>> {
        let params = Params::new()
            .with("recordIds", record_ids.to_vec())
            .with("fields", field_names(fields));
        self.invoke(ops::DETAILS_BATCH, params)?.into_list()
    }

    /// External references, optionally restricted to some data sources
    pub fn get_external_references<S: AsRef<str>>(
        &self,
        record_id: RecordId,
        datasources: &[S],
    ) -> ChemSpiderResult<Vec<ExternalReference>> {
        let params = Params::new()
            .with("recordId", record_id)
            .with_opt("dataSources", string_list(datasources));
        self.invoke(ops::EXTERNAL_REFERENCES, params)?.into_list()
    }

    /// PNG image bytes
    pub fn get_image(&self, record_id: RecordId) -> ChemSpiderResult<Vec<u8>> {
        self.invoke(ops::IMAGE, Params::new().with("recordId", record_id))?
            .into_bytes()
    }

    /// Molfile; `calc3d` requests 3D coordinates through the details endpoint
    pub fn get_mol(&self, record_id: RecordId, calc3d: bool) -> ChemSpiderResult<String> {
        if !calc3d {
            return self
                .invoke(ops::MOL, Params::new().with("recordId", record_id))?
                .into_value();
        }
        self.get_details(record_id, &[DetailField::Mol3D])?
            .mol_3d
            .ok_or_else(|| ChemSpiderError::NotFound(format!("Record {} has no 3D molfile", record_id)))
    }

    // ==================
    // Filters
    // ==================

    /// Search by systematic or common name
    pub fn filter_name(&self, name: &str, order: Option<ResultOrder>) -> ChemSpiderResult<QueryId> {
        let params = ordered(Params::new().with("name", non_empty("name", name)?), order);
        self.submit(ops::FILTER_NAME, params)
    }

    /// Search by molecular formula
    pub fn filter_formula<S: AsRef<str>>(
        &self,
        formula: &str,
        datasources: &[S],
        order: Option<ResultOrder>,
    ) -> ChemSpiderResult<QueryId> {
        let params = Params::new()
            .with("formula", non_empty("formula", formula)?)
            .with_opt("dataSources", string_list(datasources));
        self.submit(ops::FILTER_FORMULA, ordered(params, order))
    }

    /// Search by monoisotopic mass within `range`; a range of 0 is an exact match
    pub fn filter_mass<S: AsRef<str>>(
        &self,
        mass: f64,
        range: f64,
        datasources: &[S],
        order: Option<ResultOrder>,
    ) -> ChemSpiderResult<QueryId> {
        check_mass(mass, range)?;
        let params = Params::new()
            .with("mass", mass)
            .with("range", range)
            .with_opt("dataSources", string_list(datasources));
        self.submit(ops::FILTER_MASS, ordered(params, order))
    }

    /// Search by InChI
    pub fn filter_inchi(&self, inchi: &str) -> ChemSpiderResult<QueryId> {
        let params = Params::new().with("inchi", non_empty("inchi", inchi)?);
        self.submit(ops::FILTER_INCHI, params)
    }

    /// Search by InChIKey
    pub fn filter_inchikey(&self, inchikey: &str) -> ChemSpiderResult<QueryId> {
        let params = Params::new().with("inchikey", non_empty("inchikey", inchikey)?);
        self.submit(ops::FILTER_INCHIKEY, params)
    }

    /// Search by SMILES
    pub fn filter_smiles(&self, smiles: &str) -> ChemSpiderResult<QueryId> {
        let params = Params::new().with("smiles", non_empty("smiles", smiles)?);
        self.submit(ops::FILTER_SMILES, params)
    }

    /// Search by contained elements
    ///
    /// With `include_all`, only records containing every included element
    /// match; otherwise any one suffices.
    pub fn filter_element<S: AsRef<str>>(
        &self,
        include: &[S],
        exclude: &[S],
        include_all: bool,
        options: FilterOptions,
        order: Option<ResultOrder>,
    ) -> ChemSpiderResult<QueryId> {
        if include.is_empty() || include.len() > MAX_INCLUDE_ELEMENTS {
            return Err(ChemSpiderError::Validation(format!(
                "Element filter takes 1 to {} included elements, got {}",
                MAX_INCLUDE_ELEMENTS,
                include.len()
            )));
        }
        if exclude.len() > MAX_EXCLUDE_ELEMENTS {
            return Err(ChemSpiderError::Validation(format!(
                "Element filter takes at most {} excluded elements, got {}",
                MAX_EXCLUDE_ELEMENTS,
                exclude.len()
            )));
        }
        let params = Params::new()
            .with("includeElements", string_list(include).unwrap_or_default())
            .with_opt("excludeElements", string_list(exclude))
            .with("options", options.to_value(Some(include_all)));
        self.submit(ops::FILTER_ELEMENT, ordered(params, order))
    }

    /// Search by formula and/or mass properties
    pub fn filter_intrinsicproperty(
        &self,
        properties: &IntrinsicProperties,
        order: Option<ResultOrder>,
    ) -> ChemSpiderResult<QueryId> {
        if properties.is_empty() {
            return Err(ChemSpiderError::Validation(
                "Intrinsic property filter needs a formula or at least one mass".to_string(),
            ));
        }
        for range in [
            properties.molecular_weight,
            properties.nominal_mass,
            properties.average_mass,
            properties.monoisotopic_mass,
        ]
        .into_iter()
        .flatten()
        {
            check_range(range.range)?;
        }

        let params = Params::new()
            .with_opt("formula", properties.formula.clone())
            .with_opt("molecularWeight", properties.molecular_weight.map(|r| r.to_value()))
            .with_opt("nominalMass", properties.nominal_mass.map(|r| r.to_value()))
            .with_opt("averageMass", properties.average_mass.map(|r| r.to_value()))
            .with_opt(
                "monoisotopicMass",
                properties.monoisotopic_mass.map(|r| r.to_value()),
            )
            .with("options", properties.options.to_value(None));
        self.submit(ops::FILTER_INTRINSIC_PROPERTY, ordered(params, order))
    }

    /// Current status of a filter query
    pub fn filter_status(&self, query_id: QueryId) -> ChemSpiderResult<FilterStatus> {
        self.metrics().increment_status_polls();
        self.invoke(ops::FILTER_STATUS, Params::new().with("queryId", query_id))?
            .into_record()
    }

    /// Result record IDs of a complete filter query
    pub fn filter_results(
        &self,
        query_id: QueryId,
        start: Option<u64>,
        count: Option<u64>,
    ) -> ChemSpiderResult<Vec<RecordId>> {
        let params = Params::new()
            .with("queryId", query_id)
            .with_opt("start", start)
            .with_opt("count", count);
        self.invoke(ops::FILTER_RESULTS, params)?.into_list()
    }

    /// Results of a complete filter query as gzipped SDF
    pub fn filter_results_sdf(&self, query_id: QueryId) -> ChemSpiderResult<Vec<u8>> {
        self.invoke(ops::FILTER_RESULTS_SDF, Params::new().with("queryId", query_id))?
            .into_bytes()
    }

    /// Session over an already-submitted query
    pub fn session(&self, query_id: QueryId) -> QuerySession {
        QuerySession::new(self.clone(), query_id)
    }

    fn submit(&self, operation: &str, params: Params) -> ChemSpiderResult<QueryId> {
        let raw: String = self.invoke(operation, params)?.into_value()?;
        let query_id: QueryId = raw.parse().map_err(|_| {
            ChemSpiderError::Parse(format!("{} returned invalid query id '{}'", operation, raw))
        })?;

        self.metrics().increment_queries_submitted();
        let id = query_id.to_string();
        log_event_with_fields(
            Event::QuerySubmitted,
            &[("operation", operation), ("query_id", id.as_str())],
        );
        Ok(query_id)
    }

    // ==================
    // Searches
    // ==================

    /// Name search; returns once finished
    pub fn search(&self, query: &str) -> Results {
        self.search_with(SearchRequest::name(query), SearchMode::Blocking)
    }

    /// Name search on a background thread
    pub fn search_async(&self, query: &str) -> Results {
        self.search_with(SearchRequest::name(query), SearchMode::Background)
    }

    /// Formula search; returns once finished
    pub fn search_by_formula(&self, formula: &str) -> Results {
        self.search_with(SearchRequest::formula(formula), SearchMode::Blocking)
    }

    /// Mass search; returns once finished. A range of 0 is an exact match.
    pub fn search_by_mass(&self, mass: f64, range: f64) -> Results {
        self.search_with(SearchRequest::mass(mass, range), SearchMode::Blocking)
    }

    /// Any search in either mode
    pub fn search_with(&self, request: SearchRequest, mode: SearchMode) -> Results {
        Results::start(self, request, mode)
    }

    // ==================
    // Compounds
    // ==================

    /// Lazy handle on one record; no I/O
    pub fn get_compound(&self, record_id: RecordId) -> Compound {
        Compound::new(self, record_id)
    }

    /// Lazy handles on many records; no I/O
    pub fn get_compounds(&self, record_ids: &[RecordId]) -> Vec<Compound> {
        record_ids.iter().map(|id| Compound::new(self, *id)).collect()
    }

    /// Handles with details loaded through batch requests
    pub fn get_compounds_with_details(
        &self,
        record_ids: &[RecordId],
    ) -> ChemSpiderResult<Vec<Compound>> {
        Ok(self
            .get_details_batch(record_ids, DetailField::COMMON)?
            .into_iter()
            .map(|record| Compound::with_details(self, record))
            .collect())
    }

    // ==================
    // Tools
    // ==================

    /// Convert a structure between formats
    ///
    /// Only [`crate::models::SUPPORTED_CONVERSIONS`] are attempted; other
    /// pairs fail with `Validation` before any request.
    pub fn convert(
        &self,
        input: &str,
        from: StructureFormat,
        to: StructureFormat,
    ) -> ChemSpiderResult<String> {
        check_conversion(input, from, to)?;
        let params = Params::new()
            .with("input", input)
            .with("inputFormat", from)
            .with("outputFormat", to);
        self.invoke(ops::CONVERT, params)?.into_value()
    }
}

impl fmt::Debug for ChemSpider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChemSpider")
            .field("api_url", &self.inner.config.api_url)
            .field("api_version", &self.inner.config.api_version)
            .finish()
    }
}

fn field_names(fields: &[DetailField]) -> Vec<&'static str> {
    let fields = if fields.is_empty() {
        DetailField::DEFAULT
    } else {
        fields
    };
    fields.iter().map(DetailField::as_str).collect()
}

fn string_list<S: AsRef<str>>(items: &[S]) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items.iter().map(|s| s.as_ref().to_string()).collect())
    }
}

fn ordered(params: Params, order: Option<ResultOrder>) -> Params {
    params
        .with_opt("orderBy", order.map(|o| o.by))
        .with_opt("orderDirection", order.map(|o| o.direction))
}

fn non_empty<'a>(name: &str, value: &'a str) -> ChemSpiderResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ChemSpiderError::Validation(format!("{} must not be empty", name)))
    } else {
        Ok(trimmed)
    }
}

fn check_mass(mass: f64, range: f64) -> ChemSpiderResult<()> {
    if !mass.is_finite() || !(MIN_FILTER_MASS..=MAX_FILTER_MASS).contains(&mass) {
        return Err(ChemSpiderError::Validation(format!(
            "Mass must be between {} and {}, got {}",
            MIN_FILTER_MASS, MAX_FILTER_MASS, mass
        )));
    }
    check_range(range)
}

fn check_range(range: f64) -> ChemSpiderResult<()> {
    if !range.is_finite() || !(0.0..=MAX_FILTER_MASS_RANGE).contains(&range) {
        return Err(ChemSpiderError::Validation(format!(
            "Mass range must be between 0 and {}, got {}",
            MAX_FILTER_MASS_RANGE, range
        )));
    }
    Ok(())
}
