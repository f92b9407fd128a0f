//! # Compound
//!
//! A lazily-populated handle on one ChemSpider record. Construction does no
//! I/O; each property group is fetched on first access and cached for the
//! lifetime of the handle.
//!
//! | Property group | Fetch |
//! |---|---|
//! | formula, SMILES, masses, name, counts | one details call with [`DetailField::COMMON`] |
//! | 2D / 3D molfile | details call with `Mol2D` / `Mol3D` |
//! | image | `records/{id}/image` |
//! | external references | `records/{id}/externalreferences` |
//! | InChI / InChIKey | `tools/convert` from the 2D molfile |

mod cache;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use self::cache::{CacheCell, Lookup};
use crate::client::ChemSpider;
use crate::errors::{ChemSpiderError, ChemSpiderResult};
use crate::models::{CompoundRecord, DetailField, ExternalReference, RecordId, StructureFormat};
use crate::observability::{log_event_with_fields, Event};

/// Public image handler for a record
pub const IMAGE_URL_TEMPLATE: &str = "http://www.chemspider.com/ImagesHandler.ashx?id=";

#[derive(Debug, Default)]
struct PropertyCache {
    details: CacheCell<CompoundRecord>,
    image: CacheCell<Vec<u8>>,
    mol_2d: CacheCell<String>,
    mol_3d: CacheCell<String>,
    external_references: CacheCell<Vec<ExternalReference>>,
    inchi: CacheCell<String>,
    inchikey: CacheCell<String>,
}

/// A ChemSpider compound
///
/// Clones share the cache. Two handles are equal when they refer to the same
/// record through the same client.
#[derive(Clone)]
pub struct Compound {
    client: ChemSpider,
    record_id: RecordId,
    cache: Arc<PropertyCache>,
}

impl Compound {
    /// Handle on `record_id`; performs no I/O
    pub fn new(client: &ChemSpider, record_id: RecordId) -> Self {
        Self {
            client: client.clone(),
            record_id,
            cache: Arc::new(PropertyCache::default()),
        }
    }

    /// Handle with details already known, e.g. from a batch call
    pub fn with_details(client: &ChemSpider, record: CompoundRecord) -> Self {
        let record_id = record.id;
        let cache = PropertyCache {
            mol_2d: record.mol_2d.clone().map(CacheCell::filled).unwrap_or_default(),
            mol_3d: record.mol_3d.clone().map(CacheCell::filled).unwrap_or_default(),
            details: CacheCell::filled(record),
            ..PropertyCache::default()
        };
        Self {
            client: client.clone(),
            record_id,
            cache: Arc::new(cache),
        }
    }

    pub fn record_id(&self) -> RecordId {
        self.record_id
    }

    /// URL of the public image; no I/O
    pub fn image_url(&self) -> String {
        format!("{}{}", IMAGE_URL_TEMPLATE, self.record_id)
    }

    fn cached<T>(
        &self,
        property: &str,
        cell: &CacheCell<T>,
        fetch: impl FnOnce() -> ChemSpiderResult<T>,
    ) -> ChemSpiderResult<Arc<T>> {
        let (value, lookup) = cell.get_or_fetch(|| {
            let record_id = self.record_id.to_string();
            log_event_with_fields(
                Event::CacheMiss,
                &[("property", property), ("record_id", record_id.as_str())],
            );
            fetch()
        })?;
        let metrics = self.client.metrics();
        match lookup {
            Lookup::Hit => metrics.increment_cache_hits(),
            Lookup::Miss => metrics.increment_cache_misses(),
        }
        Ok(value)
    }

    /// Detail record; fetched once with the common field set
    pub fn details(&self) -> ChemSpiderResult<Arc<CompoundRecord>> {
        self.cached("details", &self.cache.details, || {
            self.client.get_details(self.record_id, DetailField::COMMON)
        })
    }

    /// Molecular formula, with subscripts as `_{n}`
    pub fn molecular_formula(&self) -> ChemSpiderResult<Option<String>> {
        Ok(self.details()?.formula.clone())
    }

    pub fn smiles(&self) -> ChemSpiderResult<Option<String>> {
        Ok(self.details()?.smiles.clone())
    }

    pub fn average_mass(&self) -> ChemSpiderResult<Option<f64>> {
        Ok(self.details()?.average_mass)
    }

    pub fn molecular_weight(&self) -> ChemSpiderResult<Option<f64>> {
        Ok(self.details()?.molecular_weight)
    }

    pub fn monoisotopic_mass(&self) -> ChemSpiderResult<Option<f64>> {
        Ok(self.details()?.monoisotopic_mass)
    }

    pub fn nominal_mass(&self) -> ChemSpiderResult<Option<f64>> {
        Ok(self.details()?.nominal_mass)
    }

    pub fn common_name(&self) -> ChemSpiderResult<Option<String>> {
        Ok(self.details()?.common_name.clone())
    }

    pub fn reference_count(&self) -> ChemSpiderResult<Option<u64>> {
        Ok(self.details()?.reference_count)
    }

    pub fn datasource_count(&self) -> ChemSpiderResult<Option<u64>> {
        Ok(self.details()?.data_source_count)
    }

    pub fn pubmed_count(&self) -> ChemSpiderResult<Option<u64>> {
        Ok(self.details()?.pub_med_count)
    }

    pub fn rsc_count(&self) -> ChemSpiderResult<Option<u64>> {
        Ok(self.details()?.rsc_count)
    }

    /// PNG image bytes
    pub fn image(&self) -> ChemSpiderResult<Arc<Vec<u8>>> {
        self.cached("image", &self.cache.image, || {
            self.client.get_image(self.record_id)
        })
    }

    /// 2D molfile
    pub fn mol_2d(&self) -> ChemSpiderResult<Arc<String>> {
        self.cached("mol_2d", &self.cache.mol_2d, || {
            let record = self.client.get_details(self.record_id, &[DetailField::Mol2D])?;
            record.mol_2d.ok_or_else(|| self.missing("2D molfile"))
        })
    }

    /// 3D molfile
    pub fn mol_3d(&self) -> ChemSpiderResult<Arc<String>> {
        self.cached("mol_3d", &self.cache.mol_3d, || {
            let record = self.client.get_details(self.record_id, &[DetailField::Mol3D])?;
            record.mol_3d.ok_or_else(|| self.missing("3D molfile"))
        })
    }

    /// References to this record in external data sources
    pub fn external_references(&self) -> ChemSpiderResult<Arc<Vec<ExternalReference>>> {
        self.cached("external_references", &self.cache.external_references, || {
            self.client
                .get_external_references(self.record_id, &[] as &[&str])
        })
    }

    /// Standard InChI, converted remotely from the 2D molfile
    pub fn inchi(&self) -> ChemSpiderResult<Arc<String>> {
        self.cached("inchi", &self.cache.inchi, || {
            let mol = self.mol_2d()?;
            self.client
                .convert(&mol, StructureFormat::Mol, StructureFormat::InChI)
        })
    }

    /// Standard InChIKey, converted remotely from the 2D molfile
    pub fn inchikey(&self) -> ChemSpiderResult<Arc<String>> {
        self.cached("inchikey", &self.cache.inchikey, || {
            let mol = self.mol_2d()?;
            self.client
                .convert(&mol, StructureFormat::Mol, StructureFormat::InChIKey)
        })
    }

    fn missing(&self, what: &str) -> ChemSpiderError {
        ChemSpiderError::NotFound(format!("Record {} has no {}", self.record_id, what))
    }
}

impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        self.record_id == other.record_id && self.client.same_client(&other.client)
    }
}

impl Eq for Compound {}

impl Hash for Compound {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.record_id.hash(state);
        self.client.identity().hash(state);
    }
}

impl fmt::Debug for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Compound({})", self.record_id)
    }
}
