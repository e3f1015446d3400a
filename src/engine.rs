//! Query facade
//!
//! [`Engine`] owns a database and an executor and turns query text into a
//! [`QueryResult`]. Failures never escape as `Err`; they come back as failed
//! results.

use tracing::debug;

use crate::catalog::Database;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::executor::{QueryExecutor, QueryResult};
use crate::sql::{parse, Parser, Statement};

/// An independent in-memory database with its query pipeline
#[derive(Debug, Default)]
pub struct Engine {
    database: Database,
    executor: QueryExecutor,
}

impl Engine {
    /// Create an empty engine with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty engine
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            database: Database::new(),
            executor: QueryExecutor::new(config),
        }
    }

    /// Parse and execute one statement
    pub fn run(&mut self, query: &str) -> QueryResult {
        let result = parse(query).and_then(|stmt| self.execute(stmt));
        into_result(result)
    }

    /// Run every `;`-separated statement of `script`, in order.
    ///
    /// Execution continues past failed statements. A script that does not
    /// tokenize or parse yields a single failed result and runs nothing.
    pub fn run_script(&mut self, script: &str) -> Vec<QueryResult> {
        let statements = match Parser::new(script).and_then(|mut p| p.parse_all()) {
            Ok(statements) => statements,
            Err(err) => return vec![into_result(Err(err))],
        };

        debug!(statements = statements.len(), "running script");
        statements
            .into_iter()
            .map(|stmt| into_result(self.execute(stmt)))
            .collect()
    }

    /// Execute an already parsed statement
    pub fn execute(&mut self, statement: Statement) -> Result<QueryResult> {
        self.executor.execute(&mut self.database, statement)
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn config(&self) -> &EngineConfig {
        self.executor.config()
    }
}

fn into_result(result: Result<QueryResult>) -> QueryResult {
    match result {
        Ok(result) => result,
        Err(err) => {
            debug!(error = %err, "query failed");
            QueryResult::failure(&err)
        }
    }
}
