//! Error types for minidb
//!
//! Every failure in the engine is one of four kinds (syntax, schema,
//! constraint, type). The facade turns them into failed query results.

use thiserror::Error;

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The statement (or one of its clauses) could not be parsed
    Syntax,
    /// A table is missing, already present, or declared inconsistently
    Schema,
    /// NOT NULL or PRIMARY KEY / UNIQUE violated
    Constraint,
    /// A value's runtime type does not match the declared column type
    Type,
}

/// The main error type for minidb
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ========== Lexer Errors ==========
    #[error("Syntax error: unexpected character '{0}' at position {1}")]
    UnexpectedCharacter(char, usize),

    #[error("Syntax error: unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    #[error("Syntax error: invalid number format at position {0}")]
    InvalidNumber(usize),

    // ========== Parser Errors ==========
    #[error("Syntax error: unexpected token '{found}', expected {expected}")]
    UnexpectedToken { expected: String, found: String },

    #[error("Syntax error: unsupported statement '{0}'")]
    UnsupportedStatement(String),

    #[error("Syntax error: {0}")]
    InvalidJoin(String),

    // ========== Schema Errors ==========
    #[error("Schema error: table '{0}' does not exist")]
    TableNotFound(String),

    #[error("Schema error: table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Schema error: table '{0}' declares more than one primary key")]
    MultiplePrimaryKeys(String),

    #[error("Schema error: column '{0}' is declared more than once in table '{1}'")]
    DuplicateColumn(String, String),

    #[error("Schema error: column '{0}' does not exist in table '{1}'")]
    ColumnNotFound(String, String),

    // ========== Constraint Errors ==========
    #[error("Constraint error: column '{0}' cannot be null")]
    NullNotAllowed(String),

    #[error("Constraint error: duplicate value {value} for column '{column}'")]
    DuplicateKey { column: String, value: String },

    // ========== Type Errors ==========
    #[error("Type error: column '{column}' expects {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnexpectedCharacter(..)
            | Error::UnterminatedString(_)
            | Error::InvalidNumber(_)
            | Error::UnexpectedToken { .. }
            | Error::UnsupportedStatement(_)
            | Error::InvalidJoin(_) => ErrorKind::Syntax,
            Error::TableNotFound(_)
            | Error::TableAlreadyExists(_)
            | Error::MultiplePrimaryKeys(_)
            | Error::DuplicateColumn(..)
            | Error::ColumnNotFound(..) => ErrorKind::Schema,
            Error::NullNotAllowed(_) | Error::DuplicateKey { .. } => ErrorKind::Constraint,
            Error::TypeMismatch { .. } => ErrorKind::Type,
        }
    }
}

/// Result type alias for minidb operations
pub type Result<T> = std::result::Result<T, Error>;
