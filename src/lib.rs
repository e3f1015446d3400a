//! minidb - A minimal in-memory relational data store
//!
//! This library provides the core components of a small SQL database:
//! - SQL parsing (lexer, parser, AST)
//! - Storage (typed values, rows, tables with hash indexes)
//! - Query execution (WHERE evaluation, nested-loop join)
//! - System catalog
//! - An interactive console with query history

pub mod catalog;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod executor;
pub mod sql;
pub mod storage;

pub use engine::Engine;
pub use error::{Error, ErrorKind, Result};
pub use executor::QueryResult;
