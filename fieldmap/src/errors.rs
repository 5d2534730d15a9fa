use thiserror::Error;

/// Errors raised while building filters from fields or looking fields up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// `subscript` was called on a field that does not allow nested keys.
    #[error("field `{key}` is not subscriptable")]
    NotSubscriptable { key: String },

    /// A filter operator received a value of the wrong shape.
    #[error("{operator} must be {expected}, got {found}")]
    TypeMismatch {
        operator: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Attribute-style lookup of an unknown field name.
    #[error("no field attribute `{0}`")]
    AttributeNotFound(String),

    /// Subscript-style lookup of an unknown field name.
    #[error("no field keyed `{0}`")]
    KeyNotFound(String),
}

/// Errors raised while collecting the fields of an entity hierarchy.
///
/// All of these describe a broken declaration that has to be fixed in source,
/// so callers are not expected to recover from them.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The class sets its own `fields` attribute instead of letting the collector build it.
    #[error("class `{class}` already has a `fields` attribute set")]
    FieldsRedeclared { class: String },

    /// The class model does not inherit from the models of all leaf base classes.
    #[error(
        "the model `{model}` of class `{class}` does not inherit from the models of base classes {}; \
         it should be: `Model({})`",
        format_missing(.missing),
        .expected.join(", ")
    )]
    MissingModelBases {
        class: String,
        model: String,
        /// `(base class, base model)` pairs the declared model fails to inherit.
        missing: Vec<(String, String)>,
        /// Model names the declaration must list, in resolution order.
        expected: Vec<String>,
    },

    #[error("class `{0}` is already defined")]
    DuplicateClass(String),

    #[error("class `{class}` names unknown base class `{base}`")]
    UnknownBase { class: String, base: String },

    #[error("model `{0}` is not registered")]
    UnknownModel(String),

    #[error("model `{0}` is registered twice with different declarations")]
    ConflictingModel(String),

    /// No consistent C3 linearization exists for the named class or model.
    #[error("cannot create a consistent method resolution order for `{0}`")]
    InconsistentHierarchy(String),

    #[error("cyclic inheritance through `{0}`")]
    CyclicInheritance(String),

    #[error("invalid schema file: {0}")]
    Config(#[from] toml::de::Error),

    #[error("cannot read schema file: {0}")]
    Io(#[from] std::io::Error),
}

fn format_missing(missing: &[(String, String)]) -> String {
    missing
        .iter()
        .map(|(class, model)| format!("`{class}` ({model})"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type FieldResult<T> = Result<T, FieldError>;

pub type SchemaResult<T> = Result<T, SchemaError>;
