//! Entity universe input port.

use crate::domain::error::EsgError;
use crate::domain::store::EntityStore;

pub trait UniverseSource {
    /// Writes every entity, edge and ESG record into `store`. Writes go
    /// through the store's validation, so the first rejected write aborts
    /// the load.
    fn load_into(&self, store: &mut EntityStore) -> Result<(), EsgError>;
}
