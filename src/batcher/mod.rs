//! Batch planning
//!
//! Packs suites into batches and exposes every planned unit through the
//! `ExecutableTest` capability so the runner can spawn it.

mod batched;
mod packer;

pub use batched::{BatchedSuite, Bootstrap};
pub use packer::Batcher;

use serde::Serialize;
use std::fmt;

use crate::models::{CommandOptions, ExecutableTest, Suite, TestMethod};

/// What kind of unit the runner is handed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Suite,
    Batch,
    Method,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            UnitKind::Suite => "suite",
            UnitKind::Batch => "batch",
            UnitKind::Method => "method",
        })
    }
}

/// One planned process: a standalone suite, a batch or a single method
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutableUnit {
    Suite(Suite),
    Batch(BatchedSuite),
    Method(TestMethod),
}

impl ExecutableUnit {
    pub fn kind(&self) -> UnitKind {
        match self {
            ExecutableUnit::Suite(_) => UnitKind::Suite,
            ExecutableUnit::Batch(_) => UnitKind::Batch,
            ExecutableUnit::Method(_) => UnitKind::Method,
        }
    }

    /// Classes this unit will run
    pub fn classes(&self) -> Vec<&str> {
        match self {
            ExecutableUnit::Suite(suite) => vec![suite.class_name()],
            ExecutableUnit::Batch(batch) => batch.classes().iter().map(String::as_str).collect(),
            ExecutableUnit::Method(method) => vec![method.class_name()],
        }
    }

    pub fn function_count(&self) -> usize {
        match self {
            ExecutableUnit::Suite(suite) => suite.function_count(),
            ExecutableUnit::Batch(batch) => batch.function_count(),
            ExecutableUnit::Method(_) => 1,
        }
    }
}

impl ExecutableTest for ExecutableUnit {
    fn path(&self) -> &str {
        match self {
            ExecutableUnit::Suite(suite) => suite.path(),
            ExecutableUnit::Batch(batch) => batch.path(),
            ExecutableUnit::Method(method) => method.path(),
        }
    }

    fn class_name(&self) -> &str {
        match self {
            ExecutableUnit::Suite(suite) => suite.class_name(),
            ExecutableUnit::Batch(batch) => batch.class_name(),
            ExecutableUnit::Method(method) => method.class_name(),
        }
    }

    fn command_string(&self, binary: &str, options: &CommandOptions) -> String {
        match self {
            ExecutableUnit::Suite(suite) => suite.command_string(binary, options),
            ExecutableUnit::Batch(batch) => batch.command_string(binary, options),
            ExecutableUnit::Method(method) => method.command_string(binary, options),
        }
    }
}
