//! Entity auto-registration via the inventory crate.
//!
//! `#[derive(Entity)]` submits an [`EntityRegistration`] for every entity
//! struct. The first call to [`global_catalog`] defines all registered classes
//! (bases first) and keeps the result for the lifetime of the process.

use std::sync::OnceLock;

use super::{EntityCatalog, EntityDef};
use crate::registry::FieldRegistry;

/// Metadata submitted to the inventory by `#[derive(Entity)]`.
pub struct EntityRegistration {
    /// Name of the entity class (e.g., "Data")
    pub type_name: &'static str,
    /// Function producing the class declaration
    pub entity_def: fn() -> EntityDef,
}

inventory::collect!(EntityRegistration);

static CATALOG: OnceLock<EntityCatalog> = OnceLock::new();

/// Implemented by `#[derive(Entity)]`.
pub trait Entity {
    const NAME: &'static str;

    fn entity_def() -> EntityDef;

    /// The collected fields of this class.
    ///
    /// # Panics
    ///
    /// Panics if the registered hierarchy is invalid, see [`global_catalog`].
    fn fields() -> &'static FieldRegistry {
        match global_catalog().fields_of(Self::NAME) {
            Some(fields) => fields,
            None => panic!("entity `{}` is not registered", Self::NAME),
        }
    }
}

/// All entities registered through the derive macro.
pub fn registered_entities() -> impl Iterator<Item = &'static EntityRegistration> {
    inventory::iter::<EntityRegistration>()
}

/// Get a registered entity by class name.
pub fn get_entity_by_name(type_name: &str) -> Option<&'static EntityRegistration> {
    registered_entities().find(|e| e.type_name == type_name)
}

/// The catalog of every registered entity class.
///
/// # Panics
///
/// Panics on the first call if the registered classes do not form a valid
/// hierarchy. Such a hierarchy is a programming error in the declarations,
/// comparable to a class definition failing at import time.
pub fn global_catalog() -> &'static EntityCatalog {
    CATALOG.get_or_init(|| {
        let defs = registered_entities().map(|registration| (registration.entity_def)());
        match EntityCatalog::from_defs(defs) {
            Ok(catalog) => {
                log::debug!("defined {} registered entity class(es)", catalog.classes().count());
                catalog
            }
            Err(err) => panic!("invalid entity hierarchy: {err}"),
        }
    })
}
