//! Catalog module
//!
//! This module contains the database (table registry), schema definitions, and data types.

pub mod database;
pub mod schema;
pub mod types;

pub use database::Database;
pub use schema::{Column, Schema};
pub use types::DataType;
