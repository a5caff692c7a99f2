//! Discovered test suites
//!
//! Suites are produced by an external discovery step and read here from a
//! manifest file. Once loaded they are never mutated.

#![allow(dead_code)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use super::executable::{base_command, CommandOptions, ExecutableTest};

/// One discovered test class with its ordered test functions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suite {
    path: String,
    class_name: String,
    #[serde(default)]
    functions: Vec<String>,
}

impl Suite {
    pub fn new(
        path: impl Into<String>,
        class_name: impl Into<String>,
        functions: Vec<String>,
    ) -> Self {
        Self {
            path: path.into(),
            class_name: class_name.into(),
            functions,
        }
    }

    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Expand into one `TestMethod` per function, in declaration order
    pub fn methods(&self) -> Vec<TestMethod> {
        self.functions
            .iter()
            .map(|name| TestMethod::new(&self.path, &self.class_name, name))
            .collect()
    }
}

impl ExecutableTest for Suite {
    fn path(&self) -> &str {
        &self.path
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} functions)", self.class_name, self.functions.len())
    }
}

/// A single test function of a suite
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMethod {
    path: String,
    class_name: String,
    name: String,
}

impl TestMethod {
    pub fn new(
        path: impl Into<String>,
        class_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            class_name: class_name.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filter expression selecting exactly this method
    pub fn filter(&self) -> String {
        format!("/\\b{}\\b/", self.name)
    }
}

impl ExecutableTest for TestMethod {
    fn path(&self) -> &str {
        &self.path
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn command_string(&self, binary: &str, options: &CommandOptions) -> String {
        let mut options = options.clone();
        options.insert("filter".to_string(), Some(self.filter()));
        base_command(binary, &options, &self.class_name, &self.path)
    }
}

impl fmt::Display for TestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class_name, self.name)
    }
}

/// Suite list written by the discovery collaborator
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SuiteManifest {
    #[serde(default)]
    pub suites: Vec<Suite>,
}

impl SuiteManifest {
    pub fn new(suites: Vec<Suite>) -> Self {
        Self { suites }
    }

    /// Load a manifest from a YAML or JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read suite manifest: {}", path.display()))?;

        let manifest: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML manifest: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON manifest: {}", path.display()))?
        };

        manifest.validate()?;
        Ok(manifest)
    }

    /// Save the manifest as YAML or JSON depending on the extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize manifest")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize manifest")?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write suite manifest: {}", path.display()))?;
        Ok(())
    }

    /// Reject suites the batcher cannot address
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for suite in &self.suites {
            if suite.class_name.trim().is_empty() {
                anyhow::bail!("Suite at '{}' has an empty class name", suite.path);
            }
            if suite.class_name.chars().any(char::is_whitespace) {
                anyhow::bail!(
                    "Class name '{}' contains whitespace and cannot be passed in a class list",
                    suite.class_name
                );
            }
            if !seen.insert(suite.class_name.as_str()) {
                anyhow::bail!("Duplicate suite class name: {}", suite.class_name);
            }
        }
        Ok(())
    }

    pub fn total_functions(&self) -> usize {
        self.suites.iter().map(Suite::function_count).sum()
    }
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
