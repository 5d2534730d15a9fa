//! Dynamic values carried by filter comparisons.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::num::TryFromIntError;

/// A value compared against a field in a filter.
///
/// Values are totally ordered (floats through [`f64::total_cmp`]) so they can be
/// collected into the sets produced by `in_` / `not_in`.
///
/// Integers up to `i64`/`u32` convert with `From`; `u64`, `usize` and wider
/// types go through `TryFrom` and fail when they do not fit in an `i64`.
#[derive(Debug, Clone, Default)]
pub enum FilterValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<FilterValue>),
    Set(BTreeSet<FilterValue>),
    Map(BTreeMap<String, FilterValue>),
}

impl FilterValue {
    /// Short name of the variant, used in type mismatch errors.
    pub const fn kind(&self) -> &'static str {
        match self {
            FilterValue::Null => "null",
            FilterValue::Bool(_) => "bool",
            FilterValue::Int(_) => "int",
            FilterValue::Float(_) => "float",
            FilterValue::String(_) => "string",
            FilterValue::List(_) => "list",
            FilterValue::Set(_) => "set",
            FilterValue::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Collect an iterable value into a set.
    ///
    /// Lists and sets yield their elements, maps yield their keys. Scalars are
    /// not iterable and return `None`.
    pub fn into_set(self) -> Option<BTreeSet<FilterValue>> {
        match self {
            FilterValue::List(items) => Some(items.into_iter().collect()),
            FilterValue::Set(items) => Some(items),
            FilterValue::Map(entries) => Some(entries.into_keys().map(FilterValue::String).collect()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            FilterValue::Null => JsonValue::Null,
            FilterValue::Bool(b) => JsonValue::Bool(*b),
            FilterValue::Int(i) => JsonValue::from(*i),
            FilterValue::Float(f) => JsonValue::from(*f),
            FilterValue::String(s) => JsonValue::String(s.clone()),
            FilterValue::List(items) => JsonValue::Array(items.iter().map(FilterValue::to_json).collect()),
            FilterValue::Set(items) => JsonValue::Array(items.iter().map(FilterValue::to_json).collect()),
            FilterValue::Map(entries) => {
                JsonValue::Object(entries.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
            }
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            FilterValue::Null => 0,
            FilterValue::Bool(_) => 1,
            FilterValue::Int(_) => 2,
            FilterValue::Float(_) => 3,
            FilterValue::String(_) => 4,
            FilterValue::List(_) => 5,
            FilterValue::Set(_) => 6,
            FilterValue::Map(_) => 7,
        }
    }
}

impl Ord for FilterValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FilterValue::Null, FilterValue::Null) => Ordering::Equal,
            (FilterValue::Bool(a), FilterValue::Bool(b)) => a.cmp(b),
            (FilterValue::Int(a), FilterValue::Int(b)) => a.cmp(b),
            (FilterValue::Float(a), FilterValue::Float(b)) => a.total_cmp(b),
            (FilterValue::String(a), FilterValue::String(b)) => a.cmp(b),
            (FilterValue::List(a), FilterValue::List(b)) => a.cmp(b),
            (FilterValue::Set(a), FilterValue::Set(b)) => a.cmp(b),
            (FilterValue::Map(a), FilterValue::Map(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for FilterValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FilterValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FilterValue {}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterValue::Null => serializer.serialize_unit(),
            FilterValue::Bool(b) => serializer.serialize_bool(*b),
            FilterValue::Int(i) => serializer.serialize_i64(*i),
            FilterValue::Float(f) => serializer.serialize_f64(*f),
            FilterValue::String(s) => serializer.serialize_str(s),
            FilterValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FilterValue::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FilterValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FilterValue {
                fn from(value: $ty) -> Self {
                    FilterValue::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_try_from_int {
    ($($ty:ty),*) => {
        $(
            /// Fails when the value does not fit in an `i64`.
            impl TryFrom<$ty> for FilterValue {
                type Error = TryFromIntError;

                fn try_from(value: $ty) -> Result<Self, Self::Error> {
                    i64::try_from(value).map(FilterValue::Int)
                }
            }
        )*
    };
}

impl_try_from_int!(u64, usize, isize, i128, u128);

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<f32> for FilterValue {
    fn from(value: f32) -> Self {
        FilterValue::Float(f64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Float(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FilterValue::Null, Into::into)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>, const N: usize> From<[T; N]> for FilterValue {
    fn from(values: [T; N]) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<BTreeSet<T>> for FilterValue {
    fn from(values: BTreeSet<T>) -> Self {
        FilterValue::Set(values.into_iter().map(Into::into).collect())
    }
}

impl From<JsonValue> for FilterValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => FilterValue::Null,
            JsonValue::Bool(b) => FilterValue::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => FilterValue::Int(i),
                None => FilterValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => FilterValue::String(s),
            JsonValue::Array(items) => FilterValue::List(items.into_iter().map(FilterValue::from).collect()),
            JsonValue::Object(entries) => {
                FilterValue::Map(entries.into_iter().map(|(k, v)| (k, FilterValue::from(v))).collect())
            }
        }
    }
}
