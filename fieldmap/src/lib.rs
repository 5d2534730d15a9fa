//! fieldmap core library.
//!
//! Entity classes expose typed [`Field`]s collected from their declared
//! models. Calling comparison methods on a field builds [`FieldFilters`], a
//! declarative filter mapping meant for a query builder:
//!
//! ```
//! use fieldmap::{EntityCatalog, EntityDef, FieldInfo, ModelDef};
//!
//! let mut catalog = EntityCatalog::new();
//! catalog
//!     .register_model(
//!         ModelDef::new("NodeModel")
//!             .with_field(FieldInfo::new("pk").alias("id").with_annotation("i64"))
//!             .with_field(FieldInfo::new("label").with_annotation("String")),
//!     )
//!     .unwrap();
//! let node = catalog.define(EntityDef::new("Node").with_model("NodeModel")).unwrap();
//!
//! let pk = node.fields().attr("pk").unwrap();
//! let label = node.fields().attr("label").unwrap();
//! let filters = (pk.ge(10) & label.like("calc%").unwrap()) | pk.eq(1);
//! assert_eq!(
//!     filters.to_json(),
//!     serde_json::json!({"or": [
//!         {"and": [{"id": {">=": 10}}, {"label": {"like": "calc%"}}]},
//!         {"id": {"==": 1}}
//!     ]})
//! );
//! ```

extern crate self as fieldmap;

pub mod collector;
pub mod config;
pub mod errors;
pub mod examples;
pub mod field;
pub mod filters;
pub mod model;
mod mro;
pub mod registry;
pub mod value;

pub use collector::{
    Entity, EntityCatalog, EntityClass, EntityDef, EntityRegistration, get_entity_by_name, global_catalog,
    registered_entities,
};
pub use config::SchemaConfig;
pub use errors::*;
pub use field::{Field, FieldKind};
pub use fieldmap_macros::{Entity, StructuredModel};
pub use filters::{FieldFilters, FilterClause, FilterMap, Logical, Operator};
pub use model::{FieldInfo, ModelDef, ModelRegistry, StructuredModel};
pub use registry::FieldRegistry;
pub use value::FilterValue;

// Re-exported for the derive macros.
pub use inventory;
pub use serde_json;
