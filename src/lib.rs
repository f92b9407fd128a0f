//! chemspider - client for the ChemSpider compound web service
//!
//! Method calls become authenticated requests against the RSC compounds
//! API; responses come back as typed records or as lazily-populated
//! [`Compound`] handles. Filter searches run as poll-until-ready sessions,
//! either on the calling thread or in the background.
//!
//! Layers, leaf to root:
//! - [`catalog`]: operation names to HTTP method, path and parameter schema
//! - [`transport`]: blocking HTTP behind a trait, plus a scripted mock
//! - [`decoder`]: response bodies to records, lists, values or bytes
//! - [`mediator`]: one authenticated round trip per operation call
//! - [`compound`], [`search`]: cached entities and query sessions
//! - [`client`]: the public [`ChemSpider`] handle

pub mod catalog;
pub mod cli;
pub mod client;
pub mod compound;
pub mod config;
pub mod decoder;
pub mod errors;
pub mod mediator;
pub mod models;
pub mod observability;
pub mod search;
pub mod transport;

pub use client::ChemSpider;
pub use compound::Compound;
pub use config::{ApiKey, ClientConfig};
pub use errors::{ChemSpiderError, ChemSpiderResult, ErrorKind};
pub use models::{
    Complexity, CompoundRecord, DetailField, ExternalReference, FilterOptions, FilterStatus,
    IntrinsicProperties, Isotopic, MassRange, OrderBy, QueryId, RecordId, ResultOrder,
    SortDirection, StructureFormat,
};
pub use search::{QuerySession, QueryStatus, Results, SearchMode, SearchRequest};
