//! Data models for suite batching
//!
//! Suites, test methods, batch-size policies and the executable-test capability.

mod batch_size;
mod executable;
mod suite;

pub use batch_size::{BatchSizePolicy, ConfigurationError};
pub use executable::{base_command, shell_quote, CommandOptions, ExecutableTest};
pub use suite::{Suite, SuiteManifest, TestMethod};
