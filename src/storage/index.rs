//! Hash index for minidb
//!
//! Maps a column value to the positions of the rows that hold it. Only
//! primary-key and unique columns are indexed.

use std::collections::HashMap;

use super::value::Value;

/// Value -> row positions
#[derive(Debug, Clone, Default)]
pub struct Index {
    entries: HashMap<Value, Vec<usize>>,
}

impl Index {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the row at `position` holds `value`. NULLs are not indexed.
    pub fn add(&mut self, value: &Value, position: usize) {
        if value.is_null() {
            return;
        }
        let positions = self.entries.entry(value.clone()).or_default();
        if !positions.contains(&position) {
            positions.push(position);
        }
    }

    /// Forget that the row at `position` holds `value`
    pub fn remove(&mut self, value: &Value, position: usize) {
        if value.is_null() {
            return;
        }
        if let Some(positions) = self.entries.get_mut(value) {
            positions.retain(|&p| p != position);
            if positions.is_empty() {
                self.entries.remove(value);
            }
        }
    }

    /// Positions of rows holding `value`, in the order they were added
    pub fn find(&self, value: &Value) -> Vec<usize> {
        self.entries.get(value).cloned().unwrap_or_default()
    }

    /// Check whether any row holds `value`
    pub fn contains(&self, value: &Value) -> bool {
        self.entries.contains_key(value)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
