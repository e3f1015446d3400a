//! SQL Token definitions
//!
//! This module defines all tokens that can appear in a minidb statement.

use std::fmt;

/// SQL Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // ========== Keywords ==========
    // DDL Keywords
    Create,
    Drop,
    Table,
    Show,
    Tables,
    Describe,
    Desc,
    If,
    Exists,

    // DML Keywords
    Select,
    Insert,
    Update,
    Delete,
    Into,
    Values,
    Set,
    From,
    Where,
    And,

    // Joins
    Join,
    Inner,
    Left,
    Outer,
    On,

    // Constraints
    Primary,
    Key,
    Unique,
    Not,
    Null,
    Default,

    // Boolean Literals
    True,
    False,

    // ========== Literals ==========
    /// Numeric literal
    NumberLiteral(f64),
    /// Quoted string literal (single or double quotes)
    StringLiteral(String),
    /// Identifier (table name, column name, type name, bare word)
    Identifier(String),

    // ========== Operators ==========
    /// =
    Eq,
    /// <> or !=
    Neq,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Lte,
    /// >=
    Gte,
    /// *
    Asterisk,

    // ========== Delimiters ==========
    /// (
    LParen,
    /// )
    RParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,

    // ========== Special ==========
    /// End of input
    Eof,
}

impl Token {
    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        Token::keyword_text(self).is_some()
    }

    /// Try to parse a keyword from a string
    pub fn from_keyword(s: &str) -> Option<Token> {
        match s.to_uppercase().as_str() {
            "CREATE" => Some(Token::Create),
            "DROP" => Some(Token::Drop),
            "TABLE" => Some(Token::Table),
            "SHOW" => Some(Token::Show),
            "TABLES" => Some(Token::Tables),
            "DESCRIBE" => Some(Token::Describe),
            "DESC" => Some(Token::Desc),
            "IF" => Some(Token::If),
            "EXISTS" => Some(Token::Exists),

            "SELECT" => Some(Token::Select),
            "INSERT" => Some(Token::Insert),
            "UPDATE" => Some(Token::Update),
            "DELETE" => Some(Token::Delete),
            "INTO" => Some(Token::Into),
            "VALUES" => Some(Token::Values),
            "SET" => Some(Token::Set),
            "FROM" => Some(Token::From),
            "WHERE" => Some(Token::Where),
            "AND" => Some(Token::And),

            "JOIN" => Some(Token::Join),
            "INNER" => Some(Token::Inner),
            "LEFT" => Some(Token::Left),
            "OUTER" => Some(Token::Outer),
            "ON" => Some(Token::On),

            "PRIMARY" => Some(Token::Primary),
            "KEY" => Some(Token::Key),
            "UNIQUE" => Some(Token::Unique),
            "NOT" => Some(Token::Not),
            "NULL" => Some(Token::Null),
            "DEFAULT" => Some(Token::Default),

            "TRUE" => Some(Token::True),
            "FALSE" => Some(Token::False),

            _ => None,
        }
    }

    /// Keywords that mark statement structure and can never name a table or column
    pub fn is_reserved(&self) -> bool {
        matches!(
            self,
            Token::Create
                | Token::Drop
                | Token::Select
                | Token::Insert
                | Token::Update
                | Token::Delete
                | Token::Into
                | Token::From
                | Token::Where
                | Token::And
                | Token::Join
                | Token::On
                | Token::Not
                | Token::Null
                | Token::True
                | Token::False
        )
    }

    /// Text of a token usable as a name: an identifier as written, or an
    /// unreserved keyword in lower case
    pub fn as_name(&self) -> Option<String> {
        match self {
            Token::Identifier(name) => Some(name.clone()),
            other if !other.is_reserved() => other.keyword_text().map(str::to_lowercase),
            _ => None,
        }
    }

    fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            Token::Create => "CREATE",
            Token::Drop => "DROP",
            Token::Table => "TABLE",
            Token::Show => "SHOW",
            Token::Tables => "TABLES",
            Token::Describe => "DESCRIBE",
            Token::Desc => "DESC",
            Token::If => "IF",
            Token::Exists => "EXISTS",
            Token::Select => "SELECT",
            Token::Insert => "INSERT",
            Token::Update => "UPDATE",
            Token::Delete => "DELETE",
            Token::Into => "INTO",
            Token::Values => "VALUES",
            Token::Set => "SET",
            Token::From => "FROM",
            Token::Where => "WHERE",
            Token::And => "AND",
            Token::Join => "JOIN",
            Token::Inner => "INNER",
            Token::Left => "LEFT",
            Token::Outer => "OUTER",
            Token::On => "ON",
            Token::Primary => "PRIMARY",
            Token::Key => "KEY",
            Token::Unique => "UNIQUE",
            Token::Not => "NOT",
            Token::Null => "NULL",
            Token::Default => "DEFAULT",
            Token::True => "TRUE",
            Token::False => "FALSE",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(keyword) = self.keyword_text() {
            return write!(f, "{}", keyword);
        }
        match self {
            Token::NumberLiteral(n) => write!(f, "{}", n),
            Token::StringLiteral(s) => write!(f, "'{}'", s),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Eq => write!(f, "="),
            Token::Neq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Lte => write!(f, "<="),
            Token::Gte => write!(f, ">="),
            Token::Asterisk => write!(f, "*"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Dot => write!(f, "."),
            Token::Eof => write!(f, "end of input"),
            _ => write!(f, "{:?}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup_is_case_insensitive() {
        assert_eq!(Token::from_keyword("select"), Some(Token::Select));
        assert_eq!(Token::from_keyword("Desc"), Some(Token::Desc));
        assert_eq!(Token::from_keyword("users"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Token::Where.to_string(), "WHERE");
        assert_eq!(Token::Gte.to_string(), ">=");
        assert_eq!(Token::StringLiteral("a".to_string()).to_string(), "'a'");
        assert_eq!(Token::Eof.to_string(), "end of input");
        assert!(Token::Primary.is_keyword());
        assert!(!Token::Comma.is_keyword());
    }

    #[test]
    fn test_unreserved_keywords_usable_as_names() {
        assert_eq!(Token::Key.as_name(), Some("key".to_string()));
        assert_eq!(Token::Desc.as_name(), Some("desc".to_string()));
        assert_eq!(
            Token::Identifier("Name".to_string()).as_name(),
            Some("Name".to_string())
        );
        assert_eq!(Token::From.as_name(), None);
        assert_eq!(Token::Null.as_name(), None);
        assert_eq!(Token::Comma.as_name(), None);
    }
}
