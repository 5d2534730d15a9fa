//! Field collection over entity class hierarchies.
//!
//! Every entity class is defined once through [`EntityCatalog::define`]. The
//! catalog resolves the class against the classes already defined, checks that
//! its declared model inherits the models of all its leaf ancestors, builds the
//! effective model and turns each of its fields into a [`Field`].
//!
//! Leaf ancestors are the ancestors declaring a model whose model is not
//! inherited by another such ancestor's model. In a diamond
//!
//! ```text
//!        Node (NodeModel)
//!        /            \
//!  Data (DataModel)   Sealable (SealableModel)
//!        \            /
//!         SealedData (SealedDataModel)
//! ```
//!
//! the leaves of `SealedData` are `Data` and `Sealable`, so `SealedDataModel`
//! must list both `DataModel` and `SealableModel` as bases; `NodeModel` is
//! reached through them and never duplicated.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{SchemaError, SchemaResult};
use crate::field::{Field, FieldKind};
use crate::model::{DATABASE_ALIAS, FieldInfo, IS_ATTRIBUTE, ModelDef, ModelRegistry, SUBSCRIPTABLE, StructuredModel};
use crate::mro::linearize;
use crate::registry::FieldRegistry;

pub mod registration;

pub use registration::{Entity, EntityRegistration, get_entity_by_name, global_catalog, registered_entities};

/// Class attribute name owned by the collector.
pub const FIELDS_ATTRIBUTE: &str = "fields";

/// Declaration of an entity class, as written by its author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    #[serde(default)]
    pub bases: Vec<String>,
    /// Name of the model the class declares itself, if any.
    #[serde(default)]
    pub model: Option<String>,
    /// Other class-level attributes the class sets.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Model definitions to register before the class is collected.
    #[serde(skip)]
    pub model_defs: Vec<ModelDef>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.bases.push(base.into());
        self
    }

    /// Declare a model already present in the catalog's model registry.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Declare a model type; its lineage is registered along with the class.
    pub fn with_model_type<M: StructuredModel>(mut self) -> Self {
        self.model = Some(M::NAME.to_string());
        self.model_defs = M::lineage();
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }
}

/// A collected entity class.
#[derive(Debug, Clone)]
pub struct EntityClass {
    name: String,
    bases: Vec<String>,
    mro: Vec<String>,
    declared_model: Option<String>,
    model: Option<String>,
    fields: FieldRegistry,
}

impl EntityClass {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bases(&self) -> &[String] {
        &self.bases
    }

    /// Resolution order, starting with the class itself.
    pub fn mro(&self) -> &[String] {
        &self.mro
    }

    /// The model declared by this class itself.
    pub fn declared_model(&self) -> Option<&str> {
        self.declared_model.as_deref()
    }

    /// The effective model whose fields the class exposes.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }
}

/// An ancestor whose model the declared model has to inherit.
struct LeafAncestor {
    class: String,
    declared_model: String,
    model: Option<String>,
}

/// Entity classes and models defined so far.
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    models: ModelRegistry,
    classes: IndexMap<String, EntityClass>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from models registered ahead of time.
    pub fn with_models(models: ModelRegistry) -> Self {
        Self {
            models,
            classes: IndexMap::new(),
        }
    }

    /// Define a batch of classes, ordering them so every base is defined first.
    pub fn from_defs<I>(defs: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = EntityDef>,
    {
        let mut catalog = Self::new();
        catalog.define_all(defs)?;
        Ok(catalog)
    }

    pub fn define_all<I>(&mut self, defs: I) -> SchemaResult<()>
    where
        I: IntoIterator<Item = EntityDef>,
    {
        let mut pending: IndexMap<String, EntityDef> = IndexMap::new();
        for def in defs {
            if self.classes.contains_key(&def.name) || pending.contains_key(&def.name) {
                return Err(SchemaError::DuplicateClass(def.name));
            }
            pending.insert(def.name.clone(), def);
        }

        let names: Vec<String> = pending.keys().cloned().collect();
        let mut visiting = Vec::new();
        for name in names {
            self.define_pending(&name, &mut pending, &mut visiting)?;
        }
        Ok(())
    }

    fn define_pending(
        &mut self,
        name: &str,
        pending: &mut IndexMap<String, EntityDef>,
        visiting: &mut Vec<String>,
    ) -> SchemaResult<()> {
        if visiting.iter().any(|n| n == name) {
            return Err(SchemaError::CyclicInheritance(name.to_string()));
        }
        let Some(bases) = pending.get(name).map(|def| def.bases.clone()) else {
            return Ok(());
        };

        visiting.push(name.to_string());
        for base in &bases {
            self.define_pending(base, pending, visiting)?;
        }
        visiting.pop();

        if let Some(def) = pending.shift_remove(name) {
            self.define(def)?;
        }
        Ok(())
    }

    pub fn register_model(&mut self, def: ModelDef) -> SchemaResult<()> {
        self.models.register(def)
    }

    /// Collect the fields of a new class and add it to the catalog.
    ///
    /// A class declaring its own model gets the effective model
    /// `<Class>.Model`, combining the declared model with every leaf ancestor
    /// model. A class without a model reuses the model of its only leaf
    /// ancestor; with several leaves it gets a synthesized union of all of
    /// them, not just the first model in its resolution order, so it exposes
    /// every inherited field.
    ///
    /// On error the catalog is unchanged, models registered along the way
    /// included, and a corrected definition can be retried.
    pub fn define(&mut self, def: EntityDef) -> SchemaResult<&EntityClass> {
        if self.classes.contains_key(&def.name) {
            return Err(SchemaError::DuplicateClass(def.name));
        }
        if def.attributes.iter().any(|attr| attr == FIELDS_ATTRIBUTE) {
            return Err(SchemaError::FieldsRedeclared { class: def.name });
        }
        if let Some(base) = def.bases.iter().find(|base| !self.classes.contains_key(base.as_str())) {
            return Err(SchemaError::UnknownBase {
                class: def.name.clone(),
                base: base.clone(),
            });
        }

        let mro = linearize(&def.name, &|class: &str| {
            if class == def.name {
                return Ok(def.bases.clone());
            }
            self.classes
                .get(class)
                .map(|c| c.bases.clone())
                .ok_or_else(|| SchemaError::UnknownBase {
                    class: def.name.clone(),
                    base: class.to_string(),
                })
        })?;

        // Models are staged and only kept once the class is accepted.
        let mut models = self.models.clone();
        for model_def in &def.model_defs {
            models.register(model_def.clone())?;
        }
        if let Some(model) = &def.model
            && !models.contains(model)
        {
            return Err(SchemaError::UnknownModel(model.clone()));
        }

        let leaves = self.leaf_ancestors(&models, &mro[1..]);
        let model = resolve_model(&mut models, &def, &leaves)?;
        let fields = match &model {
            Some(model) => collect_fields(&models, model)?,
            None => FieldRegistry::default(),
        };
        self.models = models;

        log::debug!(
            "collected {} field(s) for class `{}` from model {:?}",
            fields.len(),
            def.name,
            model
        );

        let class = EntityClass {
            name: def.name.clone(),
            bases: def.bases,
            mro,
            declared_model: def.model,
            model,
            fields,
        };
        let entry = self.classes.entry(def.name).or_insert(class);
        Ok(entry)
    }

    /// Ancestors declaring a model, minus those whose model another qualifying
    /// ancestor's model already inherits. One class per distinct model, in
    /// resolution order.
    fn leaf_ancestors(&self, models: &ModelRegistry, ancestors: &[String]) -> Vec<LeafAncestor> {
        let with_model: Vec<(&EntityClass, &str)> = ancestors
            .iter()
            .filter_map(|name| self.classes.get(name))
            .filter_map(|class| class.declared_model().map(|model| (class, model)))
            .collect();

        let mut leaves: Vec<LeafAncestor> = Vec::new();
        for &(class, model) in &with_model {
            let subsumed = with_model
                .iter()
                .any(|&(_, other)| other != model && models.is_subclass(other, model));
            let duplicate = leaves.iter().any(|leaf| leaf.declared_model == model);
            if !subsumed && !duplicate {
                leaves.push(LeafAncestor {
                    class: class.name.clone(),
                    declared_model: model.to_string(),
                    model: class.model.clone(),
                });
            }
        }
        leaves
    }

    pub fn get(&self, name: &str) -> Option<&EntityClass> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn fields_of(&self, name: &str) -> Option<&FieldRegistry> {
        self.classes.get(name).map(EntityClass::fields)
    }

    /// Classes in definition order.
    pub fn classes(&self) -> impl Iterator<Item = &EntityClass> {
        self.classes.values()
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }
}

fn resolve_model(models: &mut ModelRegistry, def: &EntityDef, leaves: &[LeafAncestor]) -> SchemaResult<Option<String>> {
    let leaf_models: Vec<String> = leaves.iter().map(|leaf| leaf.declared_model.clone()).collect();

    let Some(declared) = &def.model else {
        // Classes without their own model expose what their bases expose.
        return match leaves {
            [] => Ok(None),
            [single] => Ok(single.model.clone()),
            _ => synthesize(models, &def.name, leaf_models).map(Some),
        };
    };

    let missing: Vec<(String, String)> = leaves
        .iter()
        .filter(|leaf| !models.is_subclass(declared, &leaf.declared_model))
        .map(|leaf| (leaf.class.clone(), leaf.declared_model.clone()))
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingModelBases {
            class: def.name.clone(),
            model: declared.clone(),
            missing,
            expected: leaf_models,
        });
    }

    let mut bases = vec![declared.clone()];
    bases.extend(leaf_models.into_iter().filter(|model| model != declared));
    synthesize(models, &def.name, bases).map(Some)
}

/// Register the effective model `<class>.Model` combining `bases`.
fn synthesize(models: &mut ModelRegistry, class: &str, bases: Vec<String>) -> SchemaResult<String> {
    let name = format!("{class}.Model");
    models.register(ModelDef {
        name: name.clone(),
        bases,
        fields: Vec::new(),
    })?;
    Ok(name)
}

fn collect_fields(models: &ModelRegistry, model: &str) -> SchemaResult<FieldRegistry> {
    let infos = models.effective_fields(model)?;
    Ok(FieldRegistry::new(
        infos.into_iter().map(|(key, info)| (key, field_from_info(info))),
    ))
}

fn field_from_info(info: FieldInfo) -> Field {
    let kind = if info.get_metadata(IS_ATTRIBUTE, false) {
        FieldKind::Attribute
    } else {
        FieldKind::Column
    };
    let alias: Option<String> = info.get_metadata(DATABASE_ALIAS, None);
    let subscriptable = info.get_metadata(SUBSCRIPTABLE, false);

    let mut field = Field::new(info.name)
        .with_kind(kind)
        .with_doc(info.description.unwrap_or_default())
        .with_subscriptable(subscriptable);
    if let Some(alias) = alias {
        field = field.with_query_name(alias);
    }
    if let Some(annotation) = info.annotation {
        field = field.with_dtype(annotation);
    }
    field
}
