//! Error types for Sunbeam
//!
//! Extension errors live in [`crate::extensions::error`]; this covers the
//! launcher's own configuration and platform integration.

use thiserror::Error;

use crate::extensions::ExtensionError;

/// Errors that can occur in Sunbeam
#[derive(Debug, Error)]
pub enum SunbeamError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extension loading or execution errors
    #[error(transparent)]
    Extension(#[from] ExtensionError),

    /// Clipboard operation errors
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Failed to open a URL or path
    #[error("Open error: {0}")]
    Open(String),

    /// Editor could not be started or exited with an error
    #[error("Editor error: {0}")]
    Editor(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias for Sunbeam operations
pub type SunbeamResult<T> = Result<T, SunbeamError>;
