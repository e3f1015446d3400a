//! Query execution module
//!
//! This module contains the statement executor and the row-level helpers it
//! uses for WHERE evaluation and joins.

pub mod executor;
pub mod join;
pub mod predicate;

pub use executor::{QueryExecutor, QueryResult};
