//! Error types for room-window operations.
//!
//! Only failures that the caller can act on are typed here. A slot that names an
//! unknown room, or a window that no room can cover, is an ordinary outcome
//! (a dropped slot, a missing map entry) and never becomes an error.

use thiserror::Error;

/// Failure reported by the slot-fetch collaborator.
///
/// Any of these leaves the previously published slot store untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Decode failure: {0}")]
    Decode(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed catalog: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T, E = FetchError> = std::result::Result<T, E>;
