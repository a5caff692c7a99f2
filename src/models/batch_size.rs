//! Batch-size policy
//!
//! The user-supplied batch size token is parsed once into a tagged policy:
//!
//! - `"0"` disables batching
//! - any other number at or below zero gives every suite its own batch
//! - `"10"` targets ~10 test functions per batch
//! - `"/5"` targets ~1/5th of all test functions per batch

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use thiserror::Error;

/// Invalid batch-size configuration. Fatal; nothing is batched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Unsupported batch size: {0:?}")]
    UnsupportedBatchSize(String),

    #[error("Invalid batch size divisor: {0:?} (expected /N with N >= 1)")]
    InvalidDivisor(String),
}

/// How many test functions to pack into each batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BatchSizePolicy {
    /// Run every suite standalone
    #[default]
    Disabled,
    /// Target roughly `n` functions per batch
    Fixed(usize),
    /// Target roughly `total / d` functions per batch
    Fraction(NonZeroUsize),
}

impl BatchSizePolicy {
    /// Resolve the target batch size for `total_functions`.
    ///
    /// Returns `None` when batching is disabled. A fraction rounds up by one so
    /// that an even split never needs more than `d` batches.
    pub fn target_size(&self, total_functions: usize) -> Option<usize> {
        match self {
            BatchSizePolicy::Disabled => None,
            BatchSizePolicy::Fixed(n) => Some(*n),
            BatchSizePolicy::Fraction(d) => Some(total_functions / d.get() + 1),
        }
    }
}

impl FromStr for BatchSizePolicy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();

        if let Some(divisor) = token.strip_prefix('/') {
            return divisor
                .trim()
                .parse::<NonZeroUsize>()
                .map(BatchSizePolicy::Fraction)
                .map_err(|_| ConfigurationError::InvalidDivisor(s.to_string()));
        }

        if token == "0" {
            return Ok(BatchSizePolicy::Disabled);
        }

        // Non-integral sizes floor to the same fit decisions on integer counts.
        // Anything at or below zero isolates every suite.
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                Ok(BatchSizePolicy::Fixed(value.max(0.0).floor() as usize))
            }
            _ => Err(ConfigurationError::UnsupportedBatchSize(s.to_string())),
        }
    }
}

impl fmt::Display for BatchSizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchSizePolicy::Disabled => write!(f, "0"),
            // "0" alone means disabled
            BatchSizePolicy::Fixed(0) => write!(f, "0.0"),
            BatchSizePolicy::Fixed(n) => write!(f, "{n}"),
            BatchSizePolicy::Fraction(d) => write!(f, "/{d}"),
        }
    }
}
