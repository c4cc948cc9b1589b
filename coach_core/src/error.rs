//! Error types for the coach_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for coach_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog contents failed validation
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// The catalog could not be fetched or contained no usable exercises.
    /// Fatal for generation.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// The assessment could not be fetched or parsed.
    /// Generation absorbs this and proceeds without corrections.
    #[error("Assessment unavailable: {0}")]
    AssessmentUnavailable(String),

    /// Day index outside the bounds of the program type
    #[error("Invalid program/day combination: {program} has no day {day}")]
    InvalidProgramDay { program: String, day: u8 },

    /// Program type string that doesn't name a known program
    #[error("Unknown program type: {0}")]
    UnknownProgramType(String),

    /// The workout store refused a record in the form it was offered
    #[error("Workout store rejected record: {0}")]
    SinkRejected(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
