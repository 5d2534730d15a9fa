//! Boolean combinations of field comparisons.
//!
//! [`FieldFilters`] is the value handed to the query builder. Its shape follows
//! a small grammar:
//!
//! ```text
//! filters := { query_name: { operator: value, ... }, ... }
//!          | { "and" | "or": [filters, ...] }
//! ```
//!
//! Repeated comparisons on one field are folded under `"and"`, `a & a` is `a`,
//! and chains of the same logical operator stay flat.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

use crate::field::Field;
use crate::value::FilterValue;

pub mod operator;

pub use operator::{Logical, Operator};

/// Mapping from query name (or logical keyword) to its clause.
pub type FilterMap = IndexMap<String, FilterClause>;

/// Right-hand side of a [`FilterMap`] entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    /// `{operator: value}` comparisons on one query name.
    Compare(IndexMap<Operator, FilterValue>),
    /// Nested filter mappings under `"and"` / `"or"`.
    Group(Vec<FilterMap>),
}

impl FilterClause {
    pub fn comparison(operator: Operator, value: impl Into<FilterValue>) -> Self {
        FilterClause::Compare(IndexMap::from([(operator, value.into())]))
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            FilterClause::Compare(ops) => {
                JsonValue::Object(ops.iter().map(|(op, value)| (op.to_string(), value.to_json())).collect())
            }
            FilterClause::Group(maps) => JsonValue::Array(maps.iter().map(map_to_json).collect()),
        }
    }
}

impl Serialize for FilterClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterClause::Compare(ops) => {
                let mut map = serializer.serialize_map(Some(ops.len()))?;
                for (op, value) in ops {
                    map.serialize_entry(op.as_str(), value)?;
                }
                map.end()
            }
            FilterClause::Group(maps) => maps.serialize(serializer),
        }
    }
}

fn map_to_json(map: &FilterMap) -> JsonValue {
    JsonValue::Object(map.iter().map(|(key, clause)| (key.clone(), clause.to_json())).collect())
}

fn single(key: String, clause: FilterClause) -> FilterMap {
    IndexMap::from([(key, clause)])
}

/// A boolean combination of field comparisons.
///
/// Equality is structural: two filters are equal when their mappings are,
/// regardless of key order.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct FieldFilters {
    filters: FilterMap,
}

impl FieldFilters {
    /// Wrap a ready-made mapping as-is.
    pub fn from_map(filters: FilterMap) -> Self {
        Self { filters }
    }

    /// Fold `(field, operator, value)` triples into a mapping.
    ///
    /// A query name that appears twice is conjoined under `"and"` instead of
    /// being overwritten. Only identical query names are detected.
    pub fn from_triples<'a, I, V>(triples: I) -> Self
    where
        I: IntoIterator<Item = (&'a Field, Operator, V)>,
        V: Into<FilterValue>,
    {
        let mut filters = Self::default();
        for (field, operator, value) in triples {
            filters.push_comparison(field.query_name().into_owned(), operator, value.into());
        }
        filters
    }

    fn push_comparison(&mut self, query_name: String, operator: Operator, value: FilterValue) {
        let clause = FilterClause::comparison(operator, value);
        let Some(existing) = self.filters.shift_remove(&query_name) else {
            self.filters.insert(query_name, clause);
            return;
        };
        let pair = [single(query_name.clone(), existing), single(query_name, clause)];
        match self.filters.get_mut(Logical::And.as_str()) {
            Some(FilterClause::Group(group)) => group.extend(pair),
            _ => {
                self.filters
                    .insert(Logical::And.as_str().to_string(), FilterClause::Group(pair.into()));
            }
        }
    }

    #[inline]
    pub fn as_map(&self) -> &FilterMap {
        &self.filters
    }

    #[inline]
    pub fn into_map(self) -> FilterMap {
        self.filters
    }

    /// Entries in the order the query builder should apply them.
    pub fn items(&self) -> indexmap::map::Iter<'_, String, FilterClause> {
        self.filters.iter()
    }

    pub fn get(&self, key: &str) -> Option<&FilterClause> {
        self.filters.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.filters.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn to_json(&self) -> JsonValue {
        map_to_json(&self.filters)
    }

    /// `self & other`.
    pub fn and(self, other: FieldFilters) -> FieldFilters {
        self.combine(other, Logical::And)
    }

    /// `self | other`.
    pub fn or(self, other: FieldFilters) -> FieldFilters {
        self.combine(other, Logical::Or)
    }

    fn combine(mut self, other: FieldFilters, logical: Logical) -> FieldFilters {
        if self == other {
            return self;
        }

        if self.filters.len() == 1
            && let Some(FilterClause::Group(group)) = self.filters.get_mut(logical.as_str())
        {
            group.push(other.filters);
            return self;
        }

        FieldFilters {
            filters: single(
                logical.as_str().to_string(),
                FilterClause::Group(vec![self.filters, other.filters]),
            ),
        }
    }
}

impl From<FilterMap> for FieldFilters {
    fn from(filters: FilterMap) -> Self {
        Self::from_map(filters)
    }
}

impl BitAnd for FieldFilters {
    type Output = FieldFilters;

    fn bitand(self, rhs: FieldFilters) -> FieldFilters {
        self.and(rhs)
    }
}

impl BitOr for FieldFilters {
    type Output = FieldFilters;

    fn bitor(self, rhs: FieldFilters) -> FieldFilters {
        self.or(rhs)
    }
}

impl BitAndAssign for FieldFilters {
    fn bitand_assign(&mut self, rhs: FieldFilters) {
        *self = std::mem::take(self).and(rhs);
    }
}

impl BitOrAssign for FieldFilters {
    fn bitor_assign(&mut self, rhs: FieldFilters) {
        *self = std::mem::take(self).or(rhs);
    }
}

impl fmt::Display for FieldFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldFilters({})", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pk() -> Field {
        Field::new("pk").with_query_name("id").with_dtype("i64")
    }

    #[test]
    fn single_comparison_shape() {
        let field = pk();
        let expected = FieldFilters::from_map(single("id".into(), FilterClause::comparison(Operator::Eq, 7)));
        assert_eq!(field.eq(7), expected);
    }

    #[test]
    fn repeated_query_name_folds_under_and() {
        let field = pk();
        let filters = FieldFilters::from_triples([(&field, Operator::Eq, 1), (&field, Operator::Ne, 2)]);
        assert_eq!(filters.to_json(), json!({"and": [{"id": {"==": 1}}, {"id": {"!=": 2}}]}));
        assert!(!filters.contains_key("id"));
    }

    #[test]
    fn third_repeat_is_kept_alongside_the_group() {
        let field = pk();
        let filters =
            FieldFilters::from_triples([(&field, Operator::Gt, 1), (&field, Operator::Lt, 9), (&field, Operator::Ne, 5)]);
        assert_eq!(
            filters.to_json(),
            json!({"and": [{"id": {">": 1}}, {"id": {"<": 9}}], "id": {"!=": 5}})
        );
    }

    #[test]
    fn second_collision_extends_existing_group() {
        let a = Field::new("a");
        let b = Field::new("b");
        let filters = FieldFilters::from_triples([
            (&a, Operator::Eq, 1),
            (&a, Operator::Eq, 2),
            (&b, Operator::Eq, 3),
            (&b, Operator::Eq, 4),
        ]);
        assert_eq!(
            filters.to_json(),
            json!({"and": [{"a": {"==": 1}}, {"a": {"==": 2}}, {"b": {"==": 3}}, {"b": {"==": 4}}]})
        );
    }

    #[test]
    fn aliased_duplicates_are_not_folded() {
        let original = Field::new("label");
        let aliased = Field::new("label").with_query_name("name");
        let filters = FieldFilters::from_triples([(&original, Operator::Eq, "x"), (&aliased, Operator::Eq, "y")]);
        assert_eq!(filters.len(), 2);
        assert!(!filters.contains_key("and"));
    }

    #[test]
    fn combination_is_idempotent() {
        let a = pk().eq(1);
        assert_eq!(a.clone() & a.clone(), a);
        assert_eq!(a.clone() | a.clone(), a);
    }

    #[test]
    fn same_operator_chain_stays_flat() {
        let field = pk();
        let filters = field.eq(1) & field.ne(2) & field.gt(3);
        let Some(FilterClause::Group(group)) = filters.get("and") else {
            panic!("expected an and group, got {filters}");
        };
        assert_eq!(group.len(), 3);
        assert_eq!(filters.len(), 1);
    }

    #[test]
    fn mixed_operators_nest() {
        let field = pk();
        let filters = (field.eq(1) & field.eq(2)) | field.eq(3);
        assert_eq!(
            filters.to_json(),
            json!({"or": [{"and": [{"id": {"==": 1}}, {"id": {"==": 2}}]}, {"id": {"==": 3}}]})
        );
    }

    #[test]
    fn flat_append_requires_single_key() {
        let mut map = FilterMap::new();
        map.insert("or".into(), FilterClause::Group(vec![single("x".into(), FilterClause::comparison(Operator::Eq, 1))]));
        map.insert("y".into(), FilterClause::comparison(Operator::Eq, 2));
        let left = FieldFilters::from_map(map);
        let right = Field::new("z").eq(3);

        let combined = left.clone() | right.clone();
        let Some(FilterClause::Group(group)) = combined.get("or") else {
            panic!("expected an or group");
        };
        assert_eq!(group, &vec![left.into_map(), right.into_map()]);
    }

    #[test]
    fn equality_ignores_key_order() {
        let a = FieldFilters::from_triples([(&Field::new("x"), Operator::Eq, 1), (&Field::new("y"), Operator::Eq, 2)]);
        let b = FieldFilters::from_triples([(&Field::new("y"), Operator::Eq, 2), (&Field::new("x"), Operator::Eq, 1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn assign_operators_fold_in_place() {
        let field = Field::new("n");
        let mut filters = field.ge(0);
        filters &= field.le(10);
        filters &= field.ne(5);
        filters |= field.eq(-1);
        assert_eq!(
            filters.to_json(),
            json!({"or": [
                {"and": [{"n": {">=": 0}}, {"n": {"<=": 10}}, {"n": {"!=": 5}}]},
                {"n": {"==": -1}}
            ]})
        );
    }

    #[test]
    fn serializes_through_serde() {
        let filters = Field::attribute("key2").eq(2);
        assert_eq!(serde_json::to_value(&filters).unwrap(), json!({"attributes.key2": {"==": 2}}));
        assert_eq!(filters.to_string(), r#"FieldFilters({"attributes.key2":{"==":2}})"#);
        let op: Operator = serde_json::from_value(json!("!in")).unwrap();
        assert_eq!(op, Operator::NotIn);
    }
}
