//! Configuration module
//!
//! Handles loading and resolving the planner configuration.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};

use crate::batcher::{Batcher, Bootstrap};
use crate::models::{BatchSizePolicy, CommandOptions, ConfigurationError};

/// Default test binary
pub const DEFAULT_BINARY: &str = "vendor/bin/phpunit";

/// Application configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Number of worker processes the runner will use
    pub processes: usize,

    /// Batch size token ("0", "10" or "/4")
    #[serde(deserialize_with = "batch_size_token")]
    pub batch_size: String,

    /// Test binary invoked for every unit
    pub binary: String,

    /// Entry point batches are dispatched through
    pub bootstrap: Bootstrap,

    /// Extra options passed to the binary
    pub options: CommandOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            processes: 4,
            batch_size: "0".to_string(),
            binary: DEFAULT_BINARY.to_string(),
            bootstrap: Bootstrap::default(),
            options: CommandOptions::new(),
        }
    }
}

impl AppConfig {
    /// Apply overrides from the environment
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(processes) = env.processes {
            self.processes = processes;
        }
        if let Some(batch_size) = &env.batch_size {
            self.batch_size = batch_size.clone();
        }
        if let Some(binary) = &env.binary {
            self.binary = binary.clone();
        }
    }

    /// Parse the batch size token
    pub fn batch_size_policy(&self) -> Result<BatchSizePolicy, ConfigurationError> {
        self.batch_size.parse()
    }

    /// Build a batcher for this configuration
    pub fn batcher(&self) -> Result<Batcher, ConfigurationError> {
        Ok(Batcher::from_token(self.processes, &self.batch_size)?
            .with_bootstrap(self.bootstrap.clone()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.processes == 0 {
            anyhow::bail!("processes must be at least 1");
        }
        if self.binary.trim().is_empty() {
            anyhow::bail!("binary must not be empty");
        }
        if self.bootstrap.path.trim().is_empty()
            || self.bootstrap.class_name.trim().is_empty()
            || self.bootstrap.env_var.trim().is_empty()
        {
            anyhow::bail!("bootstrap path, class_name and env_var must all be set");
        }
        if !is_env_var_name(&self.bootstrap.env_var) {
            anyhow::bail!(
                "bootstrap env_var '{}' is not a valid environment variable name",
                self.bootstrap.env_var
            );
        }
        self.batch_size_policy()?;
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_env_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Accept the batch size as either a YAML/JSON number or a string
fn batch_size_token<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Token {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match Token::deserialize(deserializer)? {
        Token::Text(text) => text,
        Token::Integer(n) => n.to_string(),
        // Debug keeps the fraction so 0.0 is not read back as "0"
        Token::Float(n) => format!("{n:?}"),
    })
}
