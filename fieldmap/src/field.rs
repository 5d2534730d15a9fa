//! Queryable entity fields.
//!
//! A [`Field`] knows the key it has on the entity and the name the query layer
//! uses for it. Its comparison methods (`eq`, `ne`, `lt`, ...) do not compare
//! fields: they build [`FieldFilters`] for the query builder, which is why the
//! inherent `eq`/`ne` intentionally shadow the [`PartialEq`] methods of the
//! same name.
//!
//! ```
//! use fieldmap::Field;
//!
//! let pk = Field::new("pk").with_query_name("id").with_dtype("i64");
//! let filters = pk.ge(10) & pk.lt(20);
//! assert_eq!(
//!     filters.to_json(),
//!     serde_json::json!({"and": [{"id": {">=": 10}}, {"id": {"<": 20}}]})
//! );
//! ```

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::errors::{FieldError, FieldResult};
use crate::filters::{FieldFilters, Operator};
use crate::value::FilterValue;

/// Prefix of fields stored in the entity's attribute bag.
pub const ATTRIBUTES_PREFIX: &str = "attributes";

/// Where the field's data lives on the stored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldKind {
    /// A first-class column.
    #[default]
    Column,
    /// An entry of the schemaless `attributes` namespace.
    Attribute,
}

/// A field of an entity, addressable by the query builder.
#[derive(Clone)]
pub struct Field {
    key: String,
    name: String,
    kind: FieldKind,
    dtype: Option<String>,
    doc: String,
    subscriptable: bool,
}

impl Field {
    /// A column field whose query name equals its key.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            kind: FieldKind::Column,
            dtype: None,
            doc: String::new(),
            subscriptable: false,
        }
    }

    /// A field stored under `attributes.<name>`.
    pub fn attribute(key: impl Into<String>) -> Self {
        Self::new(key).with_kind(FieldKind::Attribute)
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    /// Name used by the query layer when it differs from the key.
    ///
    /// For attribute fields this is the raw name inside the attribute bag.
    pub fn with_query_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_dtype(mut self, dtype: impl Into<String>) -> Self {
        self.dtype = Some(dtype.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn with_subscriptable(mut self, subscriptable: bool) -> Self {
        self.subscriptable = subscriptable;
        self
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Name of the field in the query layer.
    pub fn query_name(&self) -> Cow<'_, str> {
        match self.kind {
            FieldKind::Column => Cow::Borrowed(&self.name),
            FieldKind::Attribute => Cow::Owned(format!("{ATTRIBUTES_PREFIX}.{}", self.name)),
        }
    }

    #[inline]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    #[inline]
    pub fn is_attribute(&self) -> bool {
        self.kind == FieldKind::Attribute
    }

    /// Declared type of the field, `None` if it accepts any type.
    #[inline]
    pub fn dtype(&self) -> Option<&str> {
        self.dtype.as_deref()
    }

    #[inline]
    pub fn doc(&self) -> &str {
        &self.doc
    }

    #[inline]
    pub fn is_subscriptable(&self) -> bool {
        self.subscriptable
    }

    /// Derive the nested field `self.sub`, keeping the field's kind.
    ///
    /// The derived field is untyped and not subscriptable itself.
    pub fn subscript(&self, sub: &str) -> FieldResult<Field> {
        if !self.subscriptable {
            return Err(FieldError::NotSubscriptable { key: self.key.clone() });
        }
        Ok(Field::new(format!("{}.{sub}", self.key))
            .with_query_name(format!("{}.{sub}", self.name))
            .with_kind(self.kind))
    }

    fn filter(&self, operator: Operator, value: FilterValue) -> FieldFilters {
        FieldFilters::from_triples([(self, operator, value)])
    }

    /// Filter for values equal to `value`.
    pub fn eq(&self, value: impl Into<FilterValue>) -> FieldFilters {
        self.filter(Operator::Eq, value.into())
    }

    /// Filter for values different from `value`.
    pub fn ne(&self, value: impl Into<FilterValue>) -> FieldFilters {
        self.filter(Operator::Ne, value.into())
    }

    pub fn lt(&self, value: impl Into<FilterValue>) -> FieldFilters {
        self.filter(Operator::Lt, value.into())
    }

    pub fn le(&self, value: impl Into<FilterValue>) -> FieldFilters {
        self.filter(Operator::Le, value.into())
    }

    pub fn gt(&self, value: impl Into<FilterValue>) -> FieldFilters {
        self.filter(Operator::Gt, value.into())
    }

    pub fn ge(&self, value: impl Into<FilterValue>) -> FieldFilters {
        self.filter(Operator::Ge, value.into())
    }

    /// Filter for string values matching a wildcard pattern.
    ///
    /// `%` matches any run of characters, `_` exactly one character.
    pub fn like(&self, pattern: impl Into<FilterValue>) -> FieldResult<FieldFilters> {
        self.pattern_filter(Operator::Like, pattern.into())
    }

    /// Case-insensitive [`Field::like`].
    pub fn ilike(&self, pattern: impl Into<FilterValue>) -> FieldResult<FieldFilters> {
        self.pattern_filter(Operator::ILike, pattern.into())
    }

    /// Filter for values contained in `values`.
    pub fn in_(&self, values: impl Into<FilterValue>) -> FieldResult<FieldFilters> {
        self.membership_filter(Operator::In, values.into())
    }

    /// Filter for values not contained in `values`.
    pub fn not_in(&self, values: impl Into<FilterValue>) -> FieldResult<FieldFilters> {
        self.membership_filter(Operator::NotIn, values.into())
    }

    fn pattern_filter(&self, operator: Operator, pattern: FilterValue) -> FieldResult<FieldFilters> {
        if !matches!(pattern, FilterValue::String(_)) {
            return Err(FieldError::TypeMismatch {
                operator: operator.as_str(),
                expected: "a string",
                found: pattern.kind(),
            });
        }
        Ok(self.filter(operator, pattern))
    }

    fn membership_filter(&self, operator: Operator, values: FilterValue) -> FieldResult<FieldFilters> {
        let found = values.kind();
        let set = values.into_set().ok_or(FieldError::TypeMismatch {
            operator: operator.as_str(),
            expected: "iterable",
            found,
        })?;
        Ok(self.filter(operator, FilterValue::Set(set)))
    }

    fn variant_name(&self) -> &'static str {
        match self.kind {
            FieldKind::Column => "Field",
            FieldKind::Attribute => "AttributeField",
        }
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.query_name() == other.query_name()
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.query_name().hash(state);
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?}", self.variant_name(), self.key)?;
        if self.name != self.key {
            write!(f, ", {:?}", self.name)?;
        }
        if let Some(dtype) = &self.dtype {
            write!(f, ", dtype={dtype}")?;
        }
        if self.subscriptable {
            write!(f, ", subscriptable=true")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}{}) -> {}",
            self.variant_name(),
            self.query_name(),
            if self.subscriptable { ".*" } else { "" },
            self.dtype.as_deref().unwrap_or("?")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn query_name_defaults_to_key() {
        let field = Field::new("uuid");
        assert_eq!(field.query_name(), "uuid");
        assert_eq!(Field::new("pk").with_query_name("id").query_name(), "id");
    }

    #[test]
    fn attribute_fields_are_prefixed() {
        let field = Field::attribute("key1");
        assert!(field.is_attribute());
        assert_eq!(field.key(), "key1");
        assert_eq!(field.query_name(), "attributes.key1");
    }

    #[test]
    fn equality_ignores_dtype_and_doc() {
        let a = Field::new("pk").with_query_name("id").with_dtype("i64");
        let b = Field::new("pk").with_query_name("id").with_dtype("String").with_doc("other");
        assert!(a == b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b), "equal fields hash identically");
        assert!(Field::new("pk") != Field::new("pk").with_query_name("id"));
    }

    #[test]
    fn comparisons_build_single_filters() {
        let field = Field::new("pk").with_query_name("id");
        assert_eq!(field.eq(1).to_json(), json!({"id": {"==": 1}}));
        assert_eq!(field.ne(1).to_json(), json!({"id": {"!=": 1}}));
        assert_eq!(field.lt(1).to_json(), json!({"id": {"<": 1}}));
        assert_eq!(field.le(1).to_json(), json!({"id": {"<=": 1}}));
        assert_eq!(field.gt(1).to_json(), json!({"id": {">": 1}}));
        assert_eq!(field.ge(1).to_json(), json!({"id": {">=": 1}}));
    }

    #[test]
    fn like_requires_a_string() {
        let field = Field::new("label");
        assert_eq!(field.like("a%").unwrap().to_json(), json!({"label": {"like": "a%"}}));
        assert_eq!(field.ilike("A_").unwrap().to_json(), json!({"label": {"ilike": "A_"}}));

        let err = field.like(3).unwrap_err();
        assert!(matches!(err, FieldError::TypeMismatch { operator: "like", found: "int", .. }));
        assert!(field.ilike(vec!["a"]).is_err());
    }

    #[test]
    fn membership_collects_a_set() {
        let field = Field::new("uuid");
        assert_eq!(field.in_(vec!["b", "a", "a"]).unwrap().to_json(), json!({"uuid": {"in": ["a", "b"]}}));
        assert_eq!(field.not_in(["x"]).unwrap().to_json(), json!({"uuid": {"!in": ["x"]}}));

        let err = field.in_(5).unwrap_err();
        assert!(matches!(err, FieldError::TypeMismatch { operator: "in", expected: "iterable", .. }));
        assert!(field.not_in(true).is_err());
    }

    #[test]
    fn subscript_requires_subscriptable() {
        let field = Field::new("label");
        assert_eq!(field.subscript("x").unwrap_err(), FieldError::NotSubscriptable { key: "label".into() });
    }

    #[test]
    fn subscript_keeps_variant() {
        let extras = Field::new("extras").with_subscriptable(true).with_dtype("Map");
        let nested = extras.subscript("b").unwrap();
        assert_eq!(nested.key(), "extras.b");
        assert_eq!(nested.query_name(), "extras.b");
        assert!(!nested.is_subscriptable());
        assert_eq!(nested.dtype(), None);

        let attr = Field::attribute("value").with_subscriptable(true);
        let nested = attr.subscript("a").unwrap();
        assert!(nested.is_attribute());
        assert_eq!(nested.key(), "value.a");
        assert_eq!(nested.query_name(), "attributes.value.a");
    }

    #[test]
    fn renders_like_a_declaration() {
        let field = Field::new("pk").with_query_name("id").with_dtype("i64");
        assert_eq!(format!("{field:?}"), r#"Field("pk", "id", dtype=i64)"#);
        assert_eq!(field.to_string(), "Field(id) -> i64");

        let attr = Field::attribute("value").with_subscriptable(true);
        assert_eq!(format!("{attr:?}"), r#"AttributeField("value", subscriptable=true)"#);
        assert_eq!(attr.to_string(), "AttributeField(attributes.value.*) -> ?");
    }
}
