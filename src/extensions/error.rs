//! Error types for the extension system.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or invoking extensions.
#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Extension entrypoint not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to extract manifest from {entrypoint}: {message}")]
    ExecutionFailed { entrypoint: PathBuf, message: String },

    #[error("{0}")]
    SchemaInvalid(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Extensions cannot be run from within an extension (SUNBEAM is set)")]
    Nested,

    #[error("Command '{command}' requires parameter '{param}'")]
    MissingRequiredParam { command: String, param: String },

    #[error("Unknown command mode: {0}")]
    UnknownMode(String),

    #[error("Unknown action type: {0}")]
    UnknownActionType(String),

    #[error("Extension '{0}' not found")]
    ExtensionNotFound(String),

    #[error("Command '{command}' not found in extension '{extension}'")]
    CommandNotFound { extension: String, command: String },

    #[error("Invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for extension operations.
pub type ExtensionResult<T> = Result<T, ExtensionError>;
