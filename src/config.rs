//! Configuration for the engine and the console

use std::path::PathBuf;

/// Default number of queries the console history keeps
pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

/// What UPDATE does with an assignment whose value the column rejects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidFieldPolicy {
    /// Leave the field unchanged and say nothing
    Skip,
    /// Leave the field unchanged and report it in the result message
    #[default]
    Warn,
    /// Fail the whole statement before anything is changed
    Reject,
}

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Handling of invalid UPDATE fields
    pub invalid_field_policy: InvalidFieldPolicy,
}

impl EngineConfig {
    /// Create a new engine config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the invalid UPDATE field policy
    pub fn invalid_field_policy(mut self, policy: InvalidFieldPolicy) -> Self {
        self.invalid_field_policy = policy;
        self
    }
}

/// How the console renders results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Bordered ASCII table
    #[default]
    Table,
    /// Pretty-printed JSON result object
    Json,
}

impl OutputMode {
    /// Parse a `.mode` argument
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "table" => Some(OutputMode::Table),
            "json" => Some(OutputMode::Json),
            _ => None,
        }
    }
}

/// Console configuration
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Prompt for a fresh statement
    pub prompt: String,
    /// Prompt while a statement spans several lines
    pub continuation_prompt: String,
    /// Maximum number of history entries kept
    pub history_capacity: usize,
    /// File the history is loaded from and saved to
    pub history_file: Option<PathBuf>,
    /// Result rendering
    pub output_mode: OutputMode,
    /// Engine settings
    pub engine: EngineConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: "minidb> ".to_string(),
            continuation_prompt: "   ...> ".to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            history_file: None,
            output_mode: OutputMode::Table,
            engine: EngineConfig::default(),
        }
    }
}

impl ConsoleConfig {
    /// Create a new console config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prompt
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the history capacity (at least one entry is always kept)
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }

    /// Set the history file
    pub fn history_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_file = Some(path.into());
        self
    }

    /// Set the output mode
    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// Set the engine config
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}
