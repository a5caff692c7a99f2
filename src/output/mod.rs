//! Output formatting module
//!
//! Renders batch plans for humans and for the runner.

mod formatter;
mod plan;

pub use formatter::{write_plan_to_file, OutputFormat, PlanFormatter};
pub use plan::{Plan, PlanEntry};
