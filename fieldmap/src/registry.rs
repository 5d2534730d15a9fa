//! Read-only field registry attached to every entity class.

use indexmap::IndexMap;
use std::fmt;
use std::ops::Index;

use crate::errors::{FieldError, FieldResult};
use crate::field::Field;

/// Name listed by [`FieldRegistry::names`] for the copy accessor.
const DICT_ACCESSOR: &str = "_dict";

/// Maps logical field names to their [`Field`].
///
/// Fields are sorted by name on construction, so iteration is alphabetical
/// whatever order they were declared in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRegistry {
    fields: IndexMap<String, Field>,
}

impl FieldRegistry {
    pub fn new<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, Field)>,
    {
        let mut fields: IndexMap<String, Field> = fields.into_iter().collect();
        fields.sort_keys();
        Self { fields }
    }

    /// Build a registry keyed by each field's own key.
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        Self::new(fields.into_iter().map(|field| (field.key().to_string(), field)))
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Attribute-style lookup, `registry.name`.
    pub fn attr(&self, name: &str) -> FieldResult<&Field> {
        self.fields
            .get(name)
            .ok_or_else(|| FieldError::AttributeNotFound(name.to_string()))
    }

    /// Subscript-style lookup, `registry["name"]`.
    pub fn item(&self, name: &str) -> FieldResult<&Field> {
        self.fields.get(name).ok_or_else(|| FieldError::KeyNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Field> {
        self.fields.iter()
    }

    /// Names offered for completion: every field plus the copy accessor.
    pub fn names(&self) -> Vec<String> {
        self.fields
            .keys()
            .cloned()
            .chain(std::iter::once(DICT_ACCESSOR.to_string()))
            .collect()
    }

    /// Owned copy of the internal mapping; changes to it never reach the registry.
    pub fn to_map(&self) -> IndexMap<String, Field> {
        self.fields.clone()
    }
}

impl Index<&str> for FieldRegistry {
    type Output = Field;

    fn index(&self, name: &str) -> &Field {
        match self.fields.get(name) {
            Some(field) => field,
            None => panic!("no field keyed `{name}`"),
        }
    }
}

impl<'a> IntoIterator for &'a FieldRegistry {
    type Item = (&'a String, &'a Field);
    type IntoIter = indexmap::map::Iter<'a, String, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl fmt::Display for FieldRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, field)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name:?}: {field}")?;
        }
        f.write_str("}")
    }
}
