//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Pack test suites into batches for a pool of parallel worker processes
#[derive(Parser, Debug)]
#[command(name = "parabatch")]
#[command(version)]
#[command(about = "Plan batched test runs for parallel worker processes")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Configuration file (defaults to the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Batch the suites of a manifest and print the plan
    Plan(PlanArgs),

    /// List the suites of a manifest
    Suites(SuitesArgs),

    /// Show or create configuration
    Config(ConfigArgs),
}

/// Arguments for plan command
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Suite manifest (YAML or JSON) from test discovery
    #[arg(short, long)]
    pub suites: String,

    /// Number of worker processes
    #[arg(short, long)]
    pub processes: Option<usize>,

    /// Batch size: 0 (off), N (functions per batch) or /N (about N batches)
    #[arg(short, long, allow_hyphen_values = true)]
    pub batch_size: Option<String>,

    /// Test binary
    #[arg(long)]
    pub binary: Option<String>,

    /// Extra option for the test binary (key or key=value, repeatable)
    #[arg(short = 'o', long = "option")]
    pub options: Vec<String>,

    /// Plan one unit per test method instead of per suite
    #[arg(long)]
    pub functional: bool,

    /// Output format (table, json, json-pretty, csv, commands)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Save the plan to a file
    #[arg(long)]
    pub output: Option<String>,
}

/// Arguments for suites command
#[derive(Parser, Debug)]
pub struct SuitesArgs {
    /// Suite manifest (YAML or JSON)
    #[arg(short, long)]
    pub suites: String,

    /// Show test function names
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(default_value = "parabatch.yaml")]
        path: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Describe environment variable overrides
    Env,
}

/// Split a `key[=value]` option, dropping leading dashes from the key
pub fn parse_option(raw: &str) -> (String, Option<String>) {
    let raw = raw.trim_start_matches('-');
    match raw.split_once('=') {
        Some((key, value)) => (key.to_string(), Some(value.to_string())),
        None => (raw.to_string(), None),
    }
}
