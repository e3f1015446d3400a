//! Query history
//!
//! A bounded list of the statements entered in the console. Only query text is
//! persisted; table data never touches the disk.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::config::DEFAULT_HISTORY_CAPACITY;

/// One executed query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Monotonic id, starting at 1
    pub id: u64,
    /// Query text as entered
    pub query: String,
    /// Whether the query succeeded
    pub success: bool,
}

/// Bounded query history; the oldest entry is evicted first
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    next_id: u64,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Record a query and return its id
    pub fn push(&mut self, query: impl Into<String>, success: bool) -> u64 {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_back(HistoryEntry {
            id,
            query: query.into(),
            success,
        });
        id
    }

    /// Entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// The `n` most recent entries, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget every entry. Ids keep increasing.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries whose query contains `needle`, case-insensitively
    pub fn search(&self, needle: &str) -> Vec<&HistoryEntry> {
        let needle = needle.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.query.to_lowercase().contains(&needle))
            .collect()
    }

    /// Append the queries stored in `path`, one per line. A missing file is
    /// an empty history. Loaded entries count as successful.
    pub fn load(&mut self, path: impl AsRef<Path>) -> io::Result<usize> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err),
        };

        let mut loaded = 0;
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            self.push(line, true);
            loaded += 1;
        }
        debug!(path = %path.display(), loaded, "history loaded");
        Ok(loaded)
    }

    /// Write the queries to `path`, one per line. Line breaks inside a query
    /// are folded to spaces.
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let mut content = String::new();
        for entry in &self.entries {
            content.push_str(&entry.query.replace(['\r', '\n'], " "));
            content.push('\n');
        }
        fs::write(path, content)?;
        debug!(path = %path.display(), entries = self.entries.len(), "history saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_evicts_oldest() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.push(format!("SELECT {}", i), true);
        }
        assert_eq!(history.len(), 3);
        let ids: Vec<u64> = history.entries().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
        assert_eq!(history.last().unwrap().query, "SELECT 4");
    }

    #[test]
    fn test_recent_and_search() {
        let mut history = History::default();
        history.push("CREATE TABLE t (id int)", true);
        history.push("select * from t", true);
        history.push("SELECT * FROM nope", false);

        let recent: Vec<&str> = history.recent(2).map(|e| e.query.as_str()).collect();
        assert_eq!(recent, vec!["select * from t", "SELECT * FROM nope"]);
        assert_eq!(history.recent(10).count(), 3);

        let found = history.search("SELECT");
        assert_eq!(found.len(), 2);
        assert!(!found[1].success);
    }

    #[test]
    fn test_clear_keeps_ids_increasing() {
        let mut history = History::new(10);
        history.push("a", true);
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.push("b", true), 2);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut history = History::new(0);
        history.push("a", true);
        history.push("b", true);
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.len(), 1);
    }
}
