use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the meal tracker.
#[derive(Error, Debug)]
pub enum MealsError {
    /// A meal or an argument carried a malformed or missing value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An internal precondition was broken by the caller.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// The requested entity does not exist for the current user.
    #[error("Not found entity {entity} with id={id}")]
    NotFound { entity: &'static str, id: u32 },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the meal tracker crates.
pub type Result<T> = std::result::Result<T, MealsError>;
