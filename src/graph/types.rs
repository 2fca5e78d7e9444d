//! Core identity types for the graph store.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::attributes::AttrValue;

/// Which edge directedness a store accepts. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    Directed,
    Undirected,
    Mixed,
}

impl GraphKind {
    pub fn accepts_directed(self) -> bool {
        !matches!(self, GraphKind::Undirected)
    }

    pub fn accepts_undirected(self) -> bool {
        !matches!(self, GraphKind::Directed)
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GraphKind::Directed => "directed",
            GraphKind::Undirected => "undirected",
            GraphKind::Mixed => "mixed",
        };
        write!(f, "{}", label)
    }
}

/// Canonical string identity of a node or edge.
///
/// Every key-accepting operation converts its input to a `Key` exactly
/// once, at the API boundary, before any lookup or storage. The coercion
/// rules are pinned here:
///
/// * strings are used verbatim
/// * integers render in decimal (`17` → `"17"`)
/// * floats render as their shortest round-trip decimal (`1.0` → `"1"`,
///   `1.5` → `"1.5"`), with `-0.0` → `"0"`, `NaN` → `"NaN"` and the
///   infinities → `"Infinity"` / `"-Infinity"`
/// * booleans render as `"true"` / `"false"`
/// * [`AttrValue::Null`] renders as `"null"`
/// * non-primitive attribute values (arrays, maps) collapse to the fixed
///   placeholder `"[object]"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

/// Placeholder for key coercion of non-primitive values.
const OBJECT_PLACEHOLDER: &str = "[object]";

impl Key {
    pub fn new(key: impl Into<Key>) -> Self {
        key.into()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Coerce an arbitrary attribute value to its canonical key form,
    /// following the rules documented on [`Key`].
    pub fn coerce(value: &AttrValue) -> Self {
        match value {
            AttrValue::String(s) => Key(s.clone()),
            AttrValue::Integer(i) => Key(i.to_string()),
            AttrValue::Float(f) => Self::from_f64(*f),
            AttrValue::Boolean(b) => Key(b.to_string()),
            AttrValue::Null => Key("null".to_string()),
            AttrValue::Array(_) | AttrValue::Map(_) => Key(OBJECT_PLACEHOLDER.to_string()),
        }
    }

    fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            Key("NaN".to_string())
        } else if value == f64::INFINITY {
            Key("Infinity".to_string())
        } else if value == f64::NEG_INFINITY {
            Key("-Infinity".to_string())
        } else if value == 0.0 {
            // Folds -0.0 into "0".
            Key("0".to_string())
        } else {
            Key(value.to_string())
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Key(key.to_string())
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Key(key)
    }
}

impl From<&String> for Key {
    fn from(key: &String) -> Self {
        Key(key.clone())
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl From<i64> for Key {
    fn from(key: i64) -> Self {
        Key(key.to_string())
    }
}

impl From<i32> for Key {
    fn from(key: i32) -> Self {
        Key(key.to_string())
    }
}

impl From<u64> for Key {
    fn from(key: u64) -> Self {
        Key(key.to_string())
    }
}

impl From<u32> for Key {
    fn from(key: u32) -> Self {
        Key(key.to_string())
    }
}

impl From<f64> for Key {
    fn from(key: f64) -> Self {
        Key::from_f64(key)
    }
}

impl From<bool> for Key {
    fn from(key: bool) -> Self {
        Key(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn kind_capabilities() {
        assert!(GraphKind::Directed.accepts_directed());
        assert!(!GraphKind::Directed.accepts_undirected());
        assert!(!GraphKind::Undirected.accepts_directed());
        assert!(GraphKind::Mixed.accepts_directed());
        assert!(GraphKind::Mixed.accepts_undirected());
        assert_eq!(format!("{}", GraphKind::Mixed), "mixed");
    }

    #[test]
    fn primitive_keys_coerce_to_literal_text() {
        assert_eq!(Key::from("alice").as_str(), "alice");
        assert_eq!(Key::from(17i64).as_str(), "17");
        assert_eq!(Key::from(true).as_str(), "true");
        assert_eq!(Key::coerce(&AttrValue::Null).as_str(), "null");
    }

    #[test]
    fn float_keys_render_like_literals() {
        assert_eq!(Key::from(1.0).as_str(), "1");
        assert_eq!(Key::from(1.5).as_str(), "1.5");
        assert_eq!(Key::from(-0.0).as_str(), "0");
        assert_eq!(Key::from(f64::NAN).as_str(), "NaN");
        assert_eq!(Key::from(f64::INFINITY).as_str(), "Infinity");
        assert_eq!(Key::from(f64::NEG_INFINITY).as_str(), "-Infinity");
    }

    #[test]
    fn non_primitives_coerce_to_placeholder() {
        assert_eq!(Key::coerce(&AttrValue::Array(vec![])).as_str(), "[object]");
        assert_eq!(Key::coerce(&AttrValue::Map(HashMap::new())).as_str(), "[object]");
    }

    #[test]
    fn equal_coercions_are_equal_keys() {
        // "5" the string and 5 the number address the same entity.
        assert_eq!(Key::from("5"), Key::from(5i64));
        assert_eq!(Key::from(5i64), Key::from(5.0));
    }
}
