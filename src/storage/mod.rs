//! Storage module
//!
//! In-memory table storage:
//! - Values and rows
//! - Hash indexes on primary-key / unique columns
//! - Tables

pub mod index;
pub mod table;
pub mod value;

pub use index::Index;
pub use table::{IgnoredField, Table, UpdateOutcome};
pub use value::{Row, Value};
