//! Structured models: the per-field schema an entity class declares.
//!
//! A [`ModelDef`] lists the fields a model adds and the models it inherits
//! from. Models live in a [`ModelRegistry`], which resolves inheritance with
//! the same C3 order as entity classes and answers `is_subclass` queries for
//! the collector.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::errors::{SchemaError, SchemaResult};
use crate::mro::linearize;

/// Metadata key marking a field stored in the attribute bag.
pub const IS_ATTRIBUTE: &str = "is_attribute";
/// Metadata key overriding the query name of a field.
pub const DATABASE_ALIAS: &str = "database_alias";
/// Metadata key allowing nested keys through `Field::subscript`.
pub const SUBSCRIPTABLE: &str = "subscriptable";

/// One declared field of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, JsonValue>,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            description: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Store the field inside the entity's attribute bag.
    pub fn attribute(self) -> Self {
        self.with_metadata(IS_ATTRIBUTE, true)
    }

    /// Use `alias` as the query name.
    pub fn alias(self, alias: impl Into<String>) -> Self {
        self.with_metadata(DATABASE_ALIAS, alias.into())
    }

    pub fn subscriptable(self) -> Self {
        self.with_metadata(SUBSCRIPTABLE, true)
    }

    /// Read a metadata entry, falling back to `default` when it is missing or
    /// does not deserialize as `T`.
    pub fn get_metadata<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.metadata.get(key) else {
            return default;
        };
        match serde_json::from_value(raw.clone()) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("ignoring metadata `{key}` on field `{}`: {err}", self.name);
                default
            }
        }
    }
}

/// A declared model: its own fields plus the models it inherits from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDef {
    pub name: String,
    #[serde(default)]
    pub bases: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
}

impl ModelDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.bases.push(base.into());
        self
    }

    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }
}

/// Implemented by `#[derive(StructuredModel)]` for structs describing a model.
pub trait StructuredModel {
    const NAME: &'static str;

    fn model_def() -> ModelDef;

    /// This model preceded by every model it inherits from, bases first.
    fn lineage() -> Vec<ModelDef> {
        vec![Self::model_def()]
    }
}

/// Registered models and their inheritance graph.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelDef>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model whose bases are already registered and can be ordered
    /// by C3.
    ///
    /// Registering an identical definition twice is a no-op, which lets
    /// diamond lineages share their common roots.
    pub fn register(&mut self, def: ModelDef) -> SchemaResult<()> {
        if let Some(existing) = self.models.get(&def.name) {
            return if *existing == def {
                Ok(())
            } else {
                Err(SchemaError::ConflictingModel(def.name))
            };
        }
        if let Some(missing) = def.bases.iter().find(|base| !self.models.contains_key(base.as_str())) {
            return Err(SchemaError::UnknownModel(missing.clone()));
        }
        // Bases that cannot be ordered are rejected up front.
        linearize(&def.name, &|model: &str| {
            if model == def.name {
                return Ok(def.bases.clone());
            }
            self.models
                .get(model)
                .map(|known| known.bases.clone())
                .ok_or_else(|| SchemaError::UnknownModel(model.to_string()))
        })?;
        self.models.insert(def.name.clone(), def);
        Ok(())
    }

    /// Register a model type together with its whole lineage.
    pub fn register_type<M: StructuredModel>(&mut self) -> SchemaResult<()> {
        M::lineage().into_iter().try_for_each(|def| self.register(def))
    }

    pub fn get(&self, name: &str) -> Option<&ModelDef> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Resolution order of `name`, starting with the model itself.
    pub fn mro(&self, name: &str) -> SchemaResult<Vec<String>> {
        linearize(name, &|model: &str| {
            self.models
                .get(model)
                .map(|def| def.bases.clone())
                .ok_or_else(|| SchemaError::UnknownModel(model.to_string()))
        })
    }

    /// Whether `model` is `base` or inherits from it. Unknown models are not subclasses.
    ///
    /// Every registered model has a consistent resolution order, so an
    /// inconsistent hierarchy never shows up here as `false`.
    pub fn is_subclass(&self, model: &str, base: &str) -> bool {
        model == base || self.mro(model).is_ok_and(|order| order.iter().any(|name| name == base))
    }

    /// Every field visible on `name`.
    ///
    /// Fields come base-first; a redeclaration in a more derived model replaces
    /// the inherited one in place.
    pub fn effective_fields(&self, name: &str) -> SchemaResult<IndexMap<String, FieldInfo>> {
        let order = self.mro(name)?;
        let mut fields = IndexMap::new();
        for model in order.iter().rev() {
            let def = self
                .models
                .get(model)
                .ok_or_else(|| SchemaError::UnknownModel(model.clone()))?;
            for field in &def.fields {
                fields.insert(field.name.clone(), field.clone());
            }
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ModelRegistry {
        let mut models = ModelRegistry::new();
        models
            .register(
                ModelDef::new("Node")
                    .with_field(FieldInfo::new("pk").alias("id").with_annotation("i64"))
                    .with_field(FieldInfo::new("label").with_annotation("String")),
            )
            .unwrap();
        models
            .register(
                ModelDef::new("Data")
                    .with_base("Node")
                    .with_field(FieldInfo::new("label").with_description("Data label"))
                    .with_field(FieldInfo::new("source").attribute()),
            )
            .unwrap();
        models
    }

    #[test]
    fn metadata_reads_with_defaults() {
        let info = FieldInfo::new("value").attribute().alias("v").subscriptable();
        assert!(info.get_metadata(IS_ATTRIBUTE, false));
        assert!(info.get_metadata(SUBSCRIPTABLE, false));
        assert_eq!(info.get_metadata::<Option<String>>(DATABASE_ALIAS, None), Some("v".to_string()));
        assert_eq!(info.get_metadata::<Option<String>>("missing", None), None);
    }

    #[test]
    fn mistyped_metadata_falls_back() {
        let info = FieldInfo::new("value").with_metadata(IS_ATTRIBUTE, "yes");
        assert!(!info.get_metadata(IS_ATTRIBUTE, false));
    }

    #[test]
    fn unknown_bases_are_rejected() {
        let mut models = ModelRegistry::new();
        let err = models.register(ModelDef::new("Orphan").with_base("Ghost")).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownModel(name) if name == "Ghost"));
    }

    #[test]
    fn identical_registration_is_idempotent() {
        let mut models = registry();
        let node = models.get("Node").cloned().unwrap();
        models.register(node).unwrap();
        assert_eq!(models.len(), 2);

        let err = models.register(ModelDef::new("Node")).unwrap_err();
        assert!(matches!(err, SchemaError::ConflictingModel(_)));
    }

    #[test]
    fn unorderable_bases_are_rejected_on_registration() {
        let mut models = registry();
        // `Node` listed before its own subclass `Data` has no C3 order.
        let err = models
            .register(ModelDef::new("Swapped").with_base("Node").with_base("Data"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InconsistentHierarchy(name) if name == "Swapped"));
        assert!(!models.contains("Swapped"));

        models
            .register(ModelDef::new("Swapped").with_base("Data").with_base("Node"))
            .unwrap();
        assert!(models.is_subclass("Swapped", "Node"));
    }

    #[test]
    fn subclass_queries_follow_inheritance() {
        let models = registry();
        assert!(models.is_subclass("Data", "Node"));
        assert!(models.is_subclass("Node", "Node"));
        assert!(!models.is_subclass("Node", "Data"));
        assert!(!models.is_subclass("Ghost", "Node"));
    }

    #[test]
    fn derived_declarations_override_inherited_fields() {
        let fields = registry().effective_fields("Data").unwrap();
        let names: Vec<_> = fields.keys().cloned().collect();
        assert_eq!(names, vec!["pk", "label", "source"]);
        assert_eq!(fields["label"].description.as_deref(), Some("Data label"));
        assert_eq!(fields["label"].annotation, None);
    }
}
