//! qui-select - selection and bulk actions for paginated torrent lists
//!
//! This library tracks which torrents a user selected in a filtered,
//! paginated qBittorrent list, including "select all matching" with
//! exclusions, and turns that selection into bulk action requests.

use thiserror::Error;

pub mod backend;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod output;
pub mod selection;
pub mod settings;
pub mod torrents;
pub mod view;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum QuiError {
    /// Backend error
    #[error("Backend error: {0}")]
    BackendError(#[from] backend::BackendError),
    /// View settings error
    #[error("Settings error: {0}")]
    SettingsError(#[from] settings::SettingsError),
    /// View error
    #[error("{0}")]
    ViewError(#[from] view::ViewError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
