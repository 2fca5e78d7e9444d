//! Attribute value types for graphs, nodes and edges.
//!
//! Attribute values are schema-free: the store never validates them beyond
//! their shape, and any JSON-like value is representable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A schema-free attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<AttrValue>),
    Map(HashMap<String, AttrValue>),
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Numeric view of the value: integers widen to `f64`.
    ///
    /// This is what weight extraction uses, so both `{"weight": 2}` and
    /// `{"weight": 2.5}` behave.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Integer(i) => Some(*i as f64),
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            AttrValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, AttrValue>> {
        match self {
            AttrValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Null => "Null",
            AttrValue::Boolean(_) => "Boolean",
            AttrValue::Integer(_) => "Integer",
            AttrValue::Float(_) => "Float",
            AttrValue::String(_) => "String",
            AttrValue::Array(_) => "Array",
            AttrValue::Map(_) => "Map",
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => write!(f, "null"),
            AttrValue::Boolean(b) => write!(f, "{}", b),
            AttrValue::Integer(i) => write!(f, "{}", i),
            AttrValue::Float(fl) => write!(f, "{}", fl),
            AttrValue::String(s) => write!(f, "\"{}\"", s),
            AttrValue::Array(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            AttrValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Integer(i)
    }
}

impl From<i32> for AttrValue {
    fn from(i: i32) -> Self {
        AttrValue::Integer(i as i64)
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        AttrValue::Float(f)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Boolean(b)
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(values: Vec<AttrValue>) -> Self {
        AttrValue::Array(values)
    }
}

impl From<HashMap<String, AttrValue>> for AttrValue {
    fn from(map: HashMap<String, AttrValue>) -> Self {
        AttrValue::Map(map)
    }
}

/// Attribute mapping for graphs, nodes and edges.
pub type AttrMap = HashMap<String, AttrValue>;

/// Build an [`AttrMap`] from `(name, value)` pairs.
///
/// ```
/// use trellis::graph::attributes::attrs;
///
/// let map = attrs([("name", "Alice".into()), ("age", 34.into())]);
/// assert_eq!(map.len(), 2);
/// ```
pub fn attrs<const N: usize>(entries: [(&str, AttrValue); N]) -> AttrMap {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variants() {
        assert_eq!(AttrValue::from("hello").as_str(), Some("hello"));
        assert_eq!(AttrValue::from(42i64).as_integer(), Some(42));
        assert_eq!(AttrValue::from(3.5).as_float(), Some(3.5));
        assert_eq!(AttrValue::from(true).as_boolean(), Some(true));
        assert!(AttrValue::Null.is_null());
        assert_eq!(AttrValue::from("hello").as_integer(), None);
    }

    #[test]
    fn numbers_widen() {
        assert_eq!(AttrValue::from(2i64).as_number(), Some(2.0));
        assert_eq!(AttrValue::from(2.5).as_number(), Some(2.5));
        assert_eq!(AttrValue::from("2").as_number(), None);
    }

    #[test]
    fn type_names() {
        assert_eq!(AttrValue::Null.type_name(), "Null");
        assert_eq!(AttrValue::Array(vec![]).type_name(), "Array");
        assert_eq!(AttrValue::Map(HashMap::new()).type_name(), "Map");
    }

    #[test]
    fn attrs_builder() {
        let map = attrs([("a", 1.into()), ("b", "two".into())]);
        assert_eq!(map.get("a").and_then(AttrValue::as_integer), Some(1));
        assert_eq!(map.get("b").and_then(AttrValue::as_str), Some("two"));
    }

    #[test]
    fn json_round_trip() {
        let value = AttrValue::Map(attrs([
            ("n", AttrValue::Null),
            ("xs", AttrValue::Array(vec![1.into(), 2.into()])),
        ]));
        let json = serde_json::to_string(&value).unwrap();
        let back: AttrValue = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }
}
