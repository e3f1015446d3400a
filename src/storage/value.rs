//! Value and Row types for minidb
//!
//! This module defines how data values are represented in memory.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

use crate::catalog::DataType;

/// A row: column name to value, in the order the columns were inserted
pub type Row = IndexMap<String, Value>;

/// A value in the database
#[derive(Debug, Clone)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number value (64-bit float)
    Number(f64),
    /// String value
    String(String),
}

/// Whole numbers small enough to print without an exponent, as integers
fn as_integer(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        Some(n as i64)
    } else {
        None
    }
}

/// Bit pattern used for number equality and hashing; folds -0.0 onto 0.0
fn number_bits(n: f64) -> u64 {
    if n == 0.0 {
        0
    } else {
        n.to_bits()
    }
}

// Exact value+type equality. Floats compare by bit pattern so Value can key a HashMap.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => number_bits(*a) == number_bits(*b),
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(v) => v.hash(state),
            Value::Number(v) => number_bits(*v).hash(state),
            Value::String(v) => v.hash(state),
        }
    }
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to read as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Storage type of this value; `None` for NULL
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Number(_) => Some(DataType::Number),
            Value::String(_) => Some(DataType::String),
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self.data_type() {
            Some(dt) => dt.name(),
            None => "null",
        }
    }

    /// Numeric ordering. `None` unless both sides are numbers.
    pub fn compare_numeric(&self, other: &Value) -> Option<Ordering> {
        self.as_number()?.partial_cmp(&other.as_number()?)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => match as_integer(*n) {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", n),
            },
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

// Untagged; whole numbers are written as JSON integers
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Number(n) => match as_integer(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Value::String(s) => serializer.serialize_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_exact_equality() {
        assert_eq!(Value::from(1), Value::Number(1.0));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::from(true), Value::from(1));
        assert_eq!(Value::Null, Value::Null);
    }

    #[test]
    fn test_negative_zero_hashes_like_zero() {
        let mut set = HashSet::new();
        set.insert(Value::Number(0.0));
        assert!(set.contains(&Value::Number(-0.0)));
    }

    #[test]
    fn test_compare_numeric() {
        assert_eq!(
            Value::from(1).compare_numeric(&Value::from(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(Value::from("a").compare_numeric(&Value::from(1)), None);
        assert_eq!(Value::from(1).as_number(), Some(1.0));
        assert_eq!(Value::Null.as_number(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(3).to_string(), "3");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(false).to_string(), "false");
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_serialize_untagged() {
        let json = serde_json::to_string(&vec![
            Value::from(1),
            Value::from(-2.5),
            Value::from("x"),
            Value::from(true),
            Value::Null,
        ])
        .unwrap();
        assert_eq!(json, r#"[1,-2.5,"x",true,null]"#);
    }
}
