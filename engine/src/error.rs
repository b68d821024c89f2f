//! Error types for level construction and configuration loading.
//!
//! Simulation steps never fail; only building a level from descriptors
//! (or reading tuning from JSON) can.

use thiserror::Error;

/// Rejected level or shape descriptor.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("attractor {index}: {field} must be non-negative (got {value})")]
    NegativeParameter {
        index: usize,
        field: &'static str,
        value: f32,
    },

    #[error("attractor {index}: {field} is not finite")]
    NonFinite { index: usize, field: &'static str },

    #[error("attractor {index}: roundedness must be within [0, 1] (got {value})")]
    RoundednessOutOfRange { index: usize, value: f32 },

    #[error("attractor {index}: wire needs at least 2 joints (got {count})")]
    TooFewJoints { index: usize, count: usize },

    #[error("attractor {index}: mesh index count {count} is not a multiple of 3")]
    RaggedIndices { index: usize, count: usize },

    #[error("attractor {index}: mesh index {vertex} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        index: usize,
        vertex: u32,
        vertex_count: usize,
    },

    #[error("checkpoint {index}: min corner exceeds max corner")]
    InvertedCheckpoint { index: usize },

    #[error("failed to parse level: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Rejected tuning file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} must be non-negative (got {value})")]
    Negative { field: &'static str, value: f32 },
}
