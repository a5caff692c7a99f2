//! Batched suites
//!
//! A batch runs as a single process against a fixed bootstrap test file. The
//! classes to run are handed over in an environment variable; the bootstrap
//! splits it on whitespace and builds its suite from those classes.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use crate::models::{base_command, shell_quote, CommandOptions, ExecutableTest, Suite};

/// Bootstrap test file that reads the class list
pub const DEFAULT_BOOTSTRAP_PATH: &str = "tests/phpunit/EnvTests.php";

/// Class name of the bootstrap suite
pub const DEFAULT_BOOTSTRAP_CLASS: &str = "EnvTests";

/// Environment variable carrying the space-separated class list
pub const DEFAULT_ENV_VAR: &str = "PHPUNIT_TESTS";

/// Fixed entry point every batch is dispatched through
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bootstrap {
    pub path: String,
    pub class_name: String,
    pub env_var: String,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self {
            path: DEFAULT_BOOTSTRAP_PATH.to_string(),
            class_name: DEFAULT_BOOTSTRAP_CLASS.to_string(),
            env_var: DEFAULT_ENV_VAR.to_string(),
        }
    }
}

/// A suite whose membership is decided at run time by the bootstrap
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchedSuite {
    bootstrap: Bootstrap,
    classes: Vec<String>,
    function_count: usize,
}

impl BatchedSuite {
    pub fn new() -> Self {
        Self::with_bootstrap(Bootstrap::default())
    }

    pub fn with_bootstrap(bootstrap: Bootstrap) -> Self {
        Self {
            bootstrap,
            classes: Vec::new(),
            function_count: 0,
        }
    }

    /// Append a suite's class to the batch. No deduplication.
    pub fn add_suite(&mut self, suite: &Suite) {
        self.classes.push(suite.class_name().to_string());
        self.function_count += suite.function_count();
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn function_count(&self) -> usize {
        self.function_count
    }

    /// Space-separated class list, the wire format the bootstrap parses
    pub fn class_list(&self) -> String {
        self.classes.join(" ")
    }

    /// `NAME=value` as one quoted shell word
    pub fn env_assignment(&self) -> String {
        shell_quote(&format!("{}={}", self.bootstrap.env_var, self.class_list()))
    }
}

impl Default for BatchedSuite {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutableTest for BatchedSuite {
    fn path(&self) -> &str {
        &self.bootstrap.path
    }

    fn class_name(&self) -> &str {
        &self.bootstrap.class_name
    }

    fn command_string(&self, binary: &str, options: &CommandOptions) -> String {
        let command = base_command(
            binary,
            options,
            &self.bootstrap.class_name,
            &self.bootstrap.path,
        );
        format!("env {} {}", self.env_assignment(), command)
    }
}
