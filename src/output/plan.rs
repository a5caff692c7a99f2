//! Batch plan report
//!
//! A serializable snapshot of the planned units and their commands.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::batcher::{Batcher, ExecutableUnit, UnitKind};
use crate::models::{CommandOptions, ExecutableTest};

/// One process the runner should spawn
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    /// Position in the plan, starting at 1
    pub index: usize,
    pub kind: UnitKind,
    pub classes: Vec<String>,
    pub function_count: usize,
    pub command: String,
}

/// Planned units for one invocation
#[derive(Clone, Debug, Serialize)]
pub struct Plan {
    pub generated_at: DateTime<Utc>,
    pub processes: usize,
    pub batch_size: String,
    /// Resolved functions-per-batch ceiling, absent when batching is off
    pub target_size: Option<usize>,
    pub total_functions: usize,
    pub entries: Vec<PlanEntry>,
}

impl Plan {
    pub fn new(
        batcher: &Batcher,
        units: &[ExecutableUnit],
        binary: &str,
        options: &CommandOptions,
    ) -> Self {
        let total_functions: usize = units.iter().map(ExecutableUnit::function_count).sum();

        // Methods are never packed, so no target applies to them
        let target_size = if units.iter().any(|u| u.kind() == UnitKind::Method) {
            None
        } else {
            batcher.compute_batch_size(total_functions)
        };

        let entries = units
            .iter()
            .enumerate()
            .map(|(i, unit)| PlanEntry {
                index: i + 1,
                kind: unit.kind(),
                classes: unit.classes().into_iter().map(str::to_string).collect(),
                function_count: unit.function_count(),
                command: unit.command_string(binary, options),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            processes: batcher.processes(),
            batch_size: batcher.policy().to_string(),
            target_size,
            total_functions,
            entries,
        }
    }

    pub fn unit_count(&self) -> usize {
        self.entries.len()
    }

    /// Largest function count of any entry
    pub fn max_functions(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.function_count)
            .max()
            .unwrap_or(0)
    }
}
