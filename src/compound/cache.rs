//! Write-once property cell

use std::sync::{Arc, Mutex};

use crate::errors::ChemSpiderResult;

/// Lazily filled, never overwritten
///
/// The lock is held across the fetch, so concurrent readers of an empty
/// cell trigger exactly one fetch. A failed fetch leaves the cell empty.
#[derive(Debug)]
pub(crate) struct CacheCell<T> {
    value: Mutex<Option<Arc<T>>>,
}

impl<T> Default for CacheCell<T> {
    fn default() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }
}

/// Whether a read was served from cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    Hit,
    Miss,
}

impl<T> CacheCell<T> {
    pub(crate) fn filled(value: T) -> Self {
        Self {
            value: Mutex::new(Some(Arc::new(value))),
        }
    }

    #[cfg(test)]
    fn peek(&self) -> Option<Arc<T>> {
        self.value.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Cached value, or the result of `fetch` stored for next time
    pub(crate) fn get_or_fetch(
        &self,
        fetch: impl FnOnce() -> ChemSpiderResult<T>,
    ) -> ChemSpiderResult<(Arc<T>, Lookup)> {
        let mut slot = self.value.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(value) = slot.as_ref() {
            return Ok((Arc::clone(value), Lookup::Hit));
        }
        let value = Arc::new(fetch()?);
        *slot = Some(Arc::clone(&value));
        Ok((value, Lookup::Miss))
    }
}
