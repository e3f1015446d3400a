//! Interactive console
//!
//! [`Console`] sits between a line editor and the [`Engine`]: it handles dot
//! commands, runs SQL, keeps the query history and renders results.

pub mod format;
pub mod history;

use std::fs;
use std::io;

use tracing::debug;

use crate::config::{ConsoleConfig, OutputMode};
use crate::engine::Engine;
use crate::executor::QueryResult;
use crate::sql::Statement;

pub use format::{render, render_json, render_table};
pub use history::{History, HistoryEntry};

const HELP: &str = "\
Commands:
  .help              Show this help message
  .quit, .exit       Exit minidb
  .tables            List all tables
  .schema [table]    Show table schema
  .history [n]       Show the last n queries (all by default)
  .search <text>     Find queries in the history
  .clear-history     Forget the query history
  .mode table|json   Set the output format
  .read <file>       Run the statements in a file

SQL Commands:
  CREATE TABLE [IF NOT EXISTS] ...   Create a new table
  DROP TABLE [IF EXISTS] ...         Drop a table
  INSERT INTO ...                    Insert rows
  SELECT ... [JOIN ...] [WHERE ...]  Query data
  UPDATE ... SET ...                 Update rows
  DELETE FROM ...                    Delete rows
  SHOW TABLES, DESCRIBE <table>      Inspect the schema

Examples:
  CREATE TABLE users (id INTEGER PRIMARY KEY, name VARCHAR(100) NOT NULL);
  INSERT INTO users VALUES (1, 'Alice'), (2, 'Bob');
  SELECT * FROM users WHERE id = 1;";

/// What the console produced for one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleOutput {
    /// Text to show; `success` is false if anything failed
    Text { text: String, success: bool },
    /// Nothing to show (blank input)
    Empty,
    /// The user asked to leave
    Quit,
}

impl ConsoleOutput {
    fn ok(text: impl Into<String>) -> Self {
        ConsoleOutput::Text {
            text: text.into(),
            success: true,
        }
    }

    fn error(text: impl std::fmt::Display) -> Self {
        ConsoleOutput::Text {
            text: format!("ERROR: {}", text),
            success: false,
        }
    }

    /// False only for failed text output
    pub fn is_success(&self) -> bool {
        !matches!(self, ConsoleOutput::Text { success: false, .. })
    }
}

/// Whether `input` is ready to execute: a dot command, or SQL ending in `;`
pub fn is_complete(input: &str) -> bool {
    let input = input.trim();
    input.is_empty() || input.starts_with('.') || input.ends_with(';')
}

/// Console session state
#[derive(Debug)]
pub struct Console {
    engine: Engine,
    history: History,
    config: ConsoleConfig,
}

impl Default for Console {
    fn default() -> Self {
        Self::new(ConsoleConfig::default())
    }
}

impl Console {
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            engine: Engine::with_config(config.engine.clone()),
            history: History::new(config.history_capacity),
            config,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn output_mode(&self) -> OutputMode {
        self.config.output_mode
    }

    /// Prompt for a fresh statement, or for a continuation line
    pub fn prompt(&self, continuation: bool) -> &str {
        if continuation {
            &self.config.continuation_prompt
        } else {
            &self.config.prompt
        }
    }

    /// Load the configured history file, if any
    pub fn load_history(&mut self) -> io::Result<usize> {
        match &self.config.history_file {
            Some(path) => self.history.load(path),
            None => Ok(0),
        }
    }

    /// Save to the configured history file, if any
    pub fn save_history(&self) -> io::Result<()> {
        match &self.config.history_file {
            Some(path) => self.history.save(path),
            None => Ok(()),
        }
    }

    /// Handle one complete input: a dot command or one or more SQL statements
    pub fn execute(&mut self, input: &str) -> ConsoleOutput {
        let input = input.trim();
        if input.is_empty() {
            return ConsoleOutput::Empty;
        }
        if input.starts_with('.') {
            return self.execute_command(input);
        }

        let results = self.engine.run_script(input);
        if results.is_empty() {
            return ConsoleOutput::Empty;
        }
        let success = results.iter().all(|r| r.success);
        self.history.push(input, success);

        ConsoleOutput::Text {
            text: self.render_all(&results),
            success,
        }
    }

    fn render_all(&self, results: &[QueryResult]) -> String {
        results
            .iter()
            .map(|r| render(r, self.config.output_mode))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn execute_command(&mut self, line: &str) -> ConsoleOutput {
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };
        debug!(command, "console command");

        match command {
            ".help" => ConsoleOutput::ok(HELP),
            ".quit" | ".exit" => ConsoleOutput::Quit,
            ".tables" => self.show_tables(),
            ".schema" => self.show_schema(arg),
            ".history" => self.show_history(arg),
            ".search" => self.search_history(arg),
            ".clear-history" => {
                self.history.clear();
                ConsoleOutput::ok("History cleared")
            }
            ".mode" => self.set_mode(arg),
            ".read" => self.read_script(arg),
            other => ConsoleOutput::error(format!(
                "unknown command '{}', type '.help' for available commands",
                other
            )),
        }
    }

    fn show_tables(&self) -> ConsoleOutput {
        let tables = self.engine.database().list_tables();
        if tables.is_empty() {
            return ConsoleOutput::ok("No tables found.");
        }
        let mut text = String::from("Tables:");
        for table in tables {
            text.push_str("\n  ");
            text.push_str(table);
        }
        ConsoleOutput::ok(text)
    }

    fn describe(&mut self, table: &str) -> QueryResult {
        match self.engine.execute(Statement::Describe(table.to_string())) {
            Ok(result) => result,
            Err(err) => QueryResult::failure(&err),
        }
    }

    fn show_schema(&mut self, table: &str) -> ConsoleOutput {
        if !table.is_empty() {
            let result = self.describe(table);
            let success = result.success;
            return ConsoleOutput::Text {
                text: render(&result, self.config.output_mode),
                success,
            };
        }

        let names: Vec<String> = self
            .engine
            .database()
            .list_tables()
            .into_iter()
            .map(String::from)
            .collect();
        if names.is_empty() {
            return ConsoleOutput::ok("No tables found.");
        }
        let sections: Vec<String> = names
            .iter()
            .map(|name| {
                let result = self.describe(name);
                format!("{}:\n{}", name, render(&result, self.config.output_mode))
            })
            .collect();
        ConsoleOutput::ok(sections.join("\n\n"))
    }

    fn show_history(&self, arg: &str) -> ConsoleOutput {
        let count = if arg.is_empty() {
            self.history.len()
        } else {
            match arg.parse::<usize>() {
                Ok(n) => n,
                Err(_) => return ConsoleOutput::error(format!("invalid history count '{}'", arg)),
            }
        };
        ConsoleOutput::ok(format_entries(self.history.recent(count)))
    }

    fn search_history(&self, needle: &str) -> ConsoleOutput {
        if needle.is_empty() {
            return ConsoleOutput::error("usage: .search <text>");
        }
        ConsoleOutput::ok(format_entries(self.history.search(needle).into_iter()))
    }

    fn set_mode(&mut self, arg: &str) -> ConsoleOutput {
        if arg.is_empty() {
            let name = match self.config.output_mode {
                OutputMode::Table => "table",
                OutputMode::Json => "json",
            };
            return ConsoleOutput::ok(format!("Output mode: {}", name));
        }
        match OutputMode::from_name(arg) {
            Some(mode) => {
                self.config.output_mode = mode;
                ConsoleOutput::ok(format!("Output mode set to {}", arg.to_ascii_lowercase()))
            }
            None => ConsoleOutput::error(format!("unknown mode '{}', expected table or json", arg)),
        }
    }

    fn read_script(&mut self, path: &str) -> ConsoleOutput {
        if path.is_empty() {
            return ConsoleOutput::error("usage: .read <file>");
        }
        let script = match fs::read_to_string(path) {
            Ok(script) => script,
            Err(err) => return ConsoleOutput::error(format!("cannot read '{}': {}", path, err)),
        };

        let results = self.engine.run_script(&script);
        let success = results.iter().all(|r| r.success);
        self.history.push(format!(".read {}", path), success);

        if results.is_empty() {
            return ConsoleOutput::Empty;
        }
        ConsoleOutput::Text {
            text: self.render_all(&results),
            success,
        }
    }
}

fn format_entries<'a>(entries: impl Iterator<Item = &'a HistoryEntry>) -> String {
    let lines: Vec<String> = entries
        .map(|e| {
            let marker = if e.success { "" } else { "  [failed]" };
            format!("{:>4}  {}{}", e.id, e.query, marker)
        })
        .collect();
    if lines.is_empty() {
        "No history.".to_string()
    } else {
        lines.join("\n")
    }
}
