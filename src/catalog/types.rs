//! Data types for minidb
//!
//! The engine stores three scalar types. Any SQL type name a caller writes in
//! CREATE TABLE is folded onto one of them through [`TYPE_RULES`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Text
    String,
    /// IEEE-754 double
    Number,
    /// true / false
    Boolean,
}

/// How a [`TypeRule`] matches a lower-cased type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeMatch {
    /// The whole name equals the pattern
    Exact(&'static str),
    /// The name starts with the pattern
    Prefix(&'static str),
}

impl TypeMatch {
    fn matches(&self, name: &str) -> bool {
        match self {
            TypeMatch::Exact(p) => name == *p,
            TypeMatch::Prefix(p) => name.starts_with(p),
        }
    }
}

/// One entry of the type normalisation table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeRule {
    pub pattern: TypeMatch,
    pub data_type: DataType,
}

const fn rule(pattern: TypeMatch, data_type: DataType) -> TypeRule {
    TypeRule { pattern, data_type }
}

/// Type names that fold onto each storage type. First match wins.
pub const TYPE_RULES: &[TypeRule] = &[
    rule(TypeMatch::Exact("string"), DataType::String),
    rule(TypeMatch::Prefix("varchar"), DataType::String),
    rule(TypeMatch::Prefix("char"), DataType::String),
    rule(TypeMatch::Exact("text"), DataType::String),
    rule(TypeMatch::Prefix("timestamp"), DataType::String),
    rule(TypeMatch::Prefix("date"), DataType::String),
    rule(TypeMatch::Exact("uuid"), DataType::String),
    rule(TypeMatch::Exact("number"), DataType::Number),
    rule(TypeMatch::Exact("serial"), DataType::Number),
    rule(TypeMatch::Exact("bigserial"), DataType::Number),
    rule(TypeMatch::Exact("int"), DataType::Number),
    rule(TypeMatch::Exact("integer"), DataType::Number),
    rule(TypeMatch::Exact("smallint"), DataType::Number),
    rule(TypeMatch::Prefix("bigint"), DataType::Number),
    rule(TypeMatch::Prefix("numeric"), DataType::Number),
    rule(TypeMatch::Prefix("decimal"), DataType::Number),
    rule(TypeMatch::Prefix("float"), DataType::Number),
    rule(TypeMatch::Prefix("double"), DataType::Number),
    rule(TypeMatch::Exact("real"), DataType::Number),
    rule(TypeMatch::Exact("bool"), DataType::Boolean),
    rule(TypeMatch::Exact("boolean"), DataType::Boolean),
];

/// Type used when no rule matches. Unknown type names never reject a statement.
pub const FALLBACK_TYPE: DataType = DataType::String;

impl DataType {
    /// Fold a declared SQL type name (e.g. `VARCHAR(255)`, `bigint`) onto a storage type.
    /// Only the first word, up to any `(`, takes part in the match.
    pub fn from_sql_name(name: &str) -> DataType {
        let name = name.trim().to_ascii_lowercase();
        let base = name
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or_default();
        TYPE_RULES
            .iter()
            .find(|r| r.pattern.matches(base))
            .map(|r| r.data_type)
            .unwrap_or(FALLBACK_TYPE)
    }

    /// Lower-case name reported by DESCRIBE
    pub fn name(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_types() {
        assert_eq!(DataType::from_sql_name("varchar(255)"), DataType::String);
        assert_eq!(DataType::from_sql_name("CHAR(2)"), DataType::String);
        assert_eq!(DataType::from_sql_name("text"), DataType::String);
        assert_eq!(
            DataType::from_sql_name("timestamp with time zone"),
            DataType::String
        );
    }

    #[test]
    fn test_number_types() {
        for name in ["serial", "int", "INTEGER", "number", "bigint", "bigint(20)"] {
            assert_eq!(DataType::from_sql_name(name), DataType::Number, "{}", name);
        }
    }

    #[test]
    fn test_boolean_types() {
        assert_eq!(DataType::from_sql_name("bool"), DataType::Boolean);
        assert_eq!(DataType::from_sql_name("BOOLEAN"), DataType::Boolean);
    }

    #[test]
    fn test_fallback() {
        assert_eq!(DataType::from_sql_name("geometry"), FALLBACK_TYPE);
        assert_eq!(DataType::from_sql_name("blob"), DataType::String);
        // "interval" must not be caught by the int rule
        assert_eq!(DataType::from_sql_name("interval"), DataType::String);
    }

    #[test]
    fn test_display() {
        assert_eq!(DataType::Number.to_string(), "number");
    }
}
