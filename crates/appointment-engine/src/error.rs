//! Error types for appointment-engine operations.

use access_policy::PolicyError;
use thiserror::Error;

/// Startup-time configuration failures. Never produced while serving a request.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid clinic hours: {0}")]
    InvalidHours(String),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Access rules: {0}")]
    Policy(#[from] PolicyError),
}

/// Why a scheduling operation was rejected.
#[derive(Error, Debug)]
pub enum SchedulingError {
    /// Missing or malformed input, wrong duration, unknown doctor or patient.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Policy denial or identity mismatch. Carries no detail.
    #[error("Not authorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    /// The interval collides with another booking's buffered span.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The appointment store itself failed.
    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, SchedulingError>;
