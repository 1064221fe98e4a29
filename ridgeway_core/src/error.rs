// Error types for grid construction and configuration loading.
//
// Search entry points do not return errors: an unreachable goal or a
// tripped AD* safety cap is a normal result (an empty or partial path).
// Errors here cover the places where a caller hands us malformed input.

use crate::types::Coord;
use thiserror::Error;

/// Problems building or validating a `Grid`.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid must have at least one cell")]
    EmptyGrid,

    #[error("height array has {actual} cells, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid height {height} at {coord}: heights must be finite and >= 0")]
    InvalidHeight { coord: Coord, height: f64 },

    #[error("coordinate {0} is outside the grid")]
    OutOfBounds(Coord),

    #[error("endpoint {0} is an obstacle")]
    BlockedEndpoint(Coord),
}

/// Problems loading or validating a `PlannerConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
