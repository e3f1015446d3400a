//! minidb - CLI Client

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use minidb::config::{
    ConsoleConfig, EngineConfig, InvalidFieldPolicy, OutputMode, DEFAULT_HISTORY_CAPACITY,
};
use minidb::console::{is_complete, Console, ConsoleOutput};

/// Interactive console for the minidb in-memory database
#[derive(Parser, Debug)]
#[command(name = "minidb-cli", version, about, long_about = None)]
struct Args {
    /// Script of `;`-separated statements to run instead of the console
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Run a single query and exit
    #[arg(short, long, value_name = "QUERY", conflicts_with = "script")]
    command: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// File the query history is loaded from and saved to
    #[arg(long, value_name = "FILE")]
    history_file: Option<PathBuf>,

    /// Number of queries kept in the history
    #[arg(long, value_name = "N", default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history_size: usize,

    /// Fail an UPDATE that assigns a value its column rejects
    #[arg(long, conflicts_with = "lenient_updates")]
    strict_updates: bool,

    /// Skip rejected UPDATE values without a warning
    #[arg(long)]
    lenient_updates: bool,
}

impl Args {
    fn console_config(&self) -> ConsoleConfig {
        let policy = if self.strict_updates {
            InvalidFieldPolicy::Reject
        } else if self.lenient_updates {
            InvalidFieldPolicy::Skip
        } else {
            InvalidFieldPolicy::Warn
        };
        let mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Table
        };

        let mut config = ConsoleConfig::new()
            .history_capacity(self.history_size)
            .output_mode(mode)
            .engine(EngineConfig::new().invalid_field_policy(policy));
        if let Some(path) = &self.history_file {
            config = config.history_file(path.clone());
        }
        config
    }
}

/// Print welcome banner
fn print_banner() {
    println!(
        r#"
 minidb {}
 An in-memory relational store with a small SQL dialect
 Type '.help' for help, '.quit' to exit
"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Run `input` once, print the output, and exit with status 1 on failure
fn run_batch(console: &mut Console, input: &str) -> anyhow::Result<()> {
    let output = console.execute(input);
    if let ConsoleOutput::Text { text, .. } = &output {
        println!("{}", text);
    }
    if !output.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Main REPL loop
fn run_repl(console: &mut Console) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;

    match console.load_history() {
        Ok(_) => {
            for entry in console.history().entries() {
                editor.add_history_entry(entry.query.as_str())?;
            }
        }
        Err(err) => warn!(error = %err, "could not load history"),
    }

    print_banner();

    let mut buffer = String::new();
    loop {
        let prompt = console.prompt(!buffer.is_empty()).to_string();
        match editor.readline(&prompt) {
            Ok(line) => {
                if buffer.is_empty() && line.trim().is_empty() {
                    continue;
                }
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                // Check if statement is complete (ends with semicolon)
                if !is_complete(&buffer) {
                    continue;
                }

                let input = std::mem::take(&mut buffer);
                editor.add_history_entry(input.trim())?;
                match console.execute(&input) {
                    ConsoleOutput::Text { text, .. } => println!("{}", text),
                    ConsoleOutput::Empty => {}
                    ConsoleOutput::Quit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    if let Err(err) = console.save_history() {
        warn!(error = %err, "could not save history");
    }
    println!("Goodbye!");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut console = Console::new(args.console_config());

    if let Some(query) = &args.command {
        return run_batch(&mut console, query);
    }
    if let Some(path) = &args.script {
        let script = fs::read_to_string(path)
            .with_context(|| format!("cannot read script '{}'", path.display()))?;
        return run_batch(&mut console, &script);
    }

    run_repl(&mut console)
}
