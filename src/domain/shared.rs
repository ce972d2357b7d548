//! Copy-on-write sharing of an [`EntityStore`] between writers and readers.
//!
//! Readers take an immutable snapshot at the start of each resolution or
//! aggregation. Writers edit a private copy that replaces the published
//! store only if the whole edit succeeds, so no reader ever sees half of a
//! compound instrument's or portfolio's new edge set.

use std::sync::{Arc, PoisonError, RwLock};

use super::error::EsgError;
use super::store::EntityStore;

#[derive(Debug, Clone, Default)]
pub struct SharedEntityStore {
    inner: Arc<RwLock<Arc<EntityStore>>>,
}

impl SharedEntityStore {
    pub fn new(store: EntityStore) -> Self {
        SharedEntityStore {
            inner: Arc::new(RwLock::new(Arc::new(store))),
        }
    }

    /// A point-in-time view that later writes do not affect.
    pub fn snapshot(&self) -> Arc<EntityStore> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Applies `edit` to a copy of the current store and publishes the copy
    /// if `edit` succeeds. On error the published store is unchanged.
    pub fn update<T, F>(&self, edit: F) -> Result<T, EsgError>
    where
        F: FnOnce(&mut EntityStore) -> Result<T, EsgError>,
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut draft = Arc::clone(&guard);
        let out = edit(Arc::make_mut(&mut draft))?;
        *guard = draft;
        Ok(out)
    }
}
