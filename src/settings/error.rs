//! Error types for view settings persistence

use std::io;
use thiserror::Error;

/// Errors that can occur while loading or saving view settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Scope name cannot be used as a file name
    #[error("Invalid settings scope '{0}': only letters, digits, '-' and '_' are allowed")]
    InvalidScope(String),

    /// Column id not recognised
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// Column cannot be hidden
    #[error("Column '{0}' is always visible")]
    LockedColumn(&'static str),

    /// Settings location could not be determined
    #[error("Could not determine settings directory")]
    NoSettingsDir,
}

impl From<toml::de::Error> for SettingsError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for SettingsError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
