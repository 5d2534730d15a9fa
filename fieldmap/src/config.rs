//! Declarative schema files.
//!
//! A schema file lists models and entity classes in TOML:
//!
//! ```toml
//! [[models]]
//! name = "NodeModel"
//! fields = [
//!     { name = "pk", annotation = "i64", metadata = { database_alias = "id" } },
//!     { name = "extras", metadata = { subscriptable = true } },
//! ]
//!
//! [[entities]]
//! name = "Node"
//! model = "NodeModel"
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::collector::{EntityCatalog, EntityDef};
use crate::errors::SchemaResult;
use crate::model::{ModelDef, ModelRegistry};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfig {
    /// Models in dependency order: bases before the models inheriting them.
    #[serde(default)]
    pub models: Vec<ModelDef>,
    /// Entity classes in any order.
    #[serde(default)]
    pub entities: Vec<EntityDef>,
}

impl SchemaConfig {
    pub fn from_toml_str(raw: &str) -> SchemaResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Register the models and collect every entity class.
    pub fn build(self) -> SchemaResult<EntityCatalog> {
        let mut models = ModelRegistry::new();
        for model in self.models {
            models.register(model)?;
        }
        let mut catalog = EntityCatalog::with_models(models);
        catalog.define_all(self.entities)?;
        Ok(catalog)
    }
}
