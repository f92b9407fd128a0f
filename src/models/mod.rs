//! # Domain Models
//!
//! Records decoded from responses, identifiers, and the option values
//! accepted by filter and convert requests.

mod formats;
mod options;
mod query_id;
mod records;

pub use formats::{check_conversion, is_inchikey, StructureFormat, SUPPORTED_CONVERSIONS};
pub use options::{
    Complexity, DetailField, FilterOptions, IntrinsicProperties, Isotopic, MassRange, OrderBy,
    ResultOrder, SortDirection,
};
pub use query_id::QueryId;
pub use records::{parse_elapsed, CompoundRecord, ExternalReference, FilterStatus, RecordId};
