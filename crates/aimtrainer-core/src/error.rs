//! Configuration errors.
//!
//! Invalid phase transitions and pool exhaustion are not errors; only
//! bad configuration data is reported through this type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("target template `{template}` has no target behavior")]
    MissingTargetBehavior { template: String },

    #[error("spawn zone weight must be >= 0, got {weight}")]
    NegativeZoneWeight { weight: f32 },

    #[error("spawn distance range is invalid: min {min} > max {max}")]
    InvalidSpawnDistance { min: f32, max: f32 },

    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("invalid configuration document: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
