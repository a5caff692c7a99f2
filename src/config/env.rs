//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "PARABATCH";

/// Configuration overrides from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Processes from PARABATCH_PROCESSES
    pub processes: Option<usize>,
    /// Batch size token from PARABATCH_BATCH_SIZE
    pub batch_size: Option<String>,
    /// Test binary from PARABATCH_BINARY
    pub binary: Option<String>,
    /// Config file from PARABATCH_CONFIG
    pub config_file: Option<String>,
    /// Verbose from PARABATCH_VERBOSE
    pub verbose: Option<bool>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            processes: get_env_parse("PROCESSES"),
            batch_size: get_env("BATCH_SIZE"),
            binary: get_env("BINARY"),
            config_file: get_env("CONFIG"),
            verbose: get_env_bool("VERBOSE"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.processes.is_some()
            || self.batch_size.is_some()
            || self.binary.is_some()
            || self.config_file.is_some()
            || self.verbose.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_PROCESSES:  {:?}", ENV_PREFIX, self.processes);
        println!("  {}_BATCH_SIZE: {:?}", ENV_PREFIX, self.batch_size);
        println!("  {}_BINARY:     {:?}", ENV_PREFIX, self.binary);
        println!("  {}_CONFIG:     {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_VERBOSE:    {:?}", ENV_PREFIX, self.verbose);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.trim().parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Print all PARABATCH environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_PROCESSES   Number of worker processes");
    println!("  {ENV_PREFIX}_BATCH_SIZE  Batch size: 0 (off), N (functions per batch) or /N (N batches)");
    println!("  {ENV_PREFIX}_BINARY      Test binary to invoke");
    println!("  {ENV_PREFIX}_CONFIG      Path to configuration file");
    println!("  {ENV_PREFIX}_VERBOSE     Enable verbose output (true/false)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_PROCESSES=8");
    println!("  export {ENV_PREFIX}_BATCH_SIZE=/8");
    println!("  parabatch plan --suites suites.yaml");
}
