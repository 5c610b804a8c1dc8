//! Backend error types
//!
//! Errors raised by a `TorrentClient` while listing torrents or executing a
//! bulk action. The owning view surfaces them to the user and leaves its
//! selection untouched so the action can be retried.

use crate::selection::RequestError;
use thiserror::Error;

/// Errors from the torrent backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// No instance with this id is known
    #[error("Unknown instance: {0}")]
    UnknownInstance(u32),

    /// The bulk action payload is malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// The backend refused or failed to execute the request
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Snapshot file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot file is not valid JSON
    #[error("Snapshot format error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(BackendError::UnknownInstance(7).to_string(), "Unknown instance: 7");
        assert_eq!(
            BackendError::Rejected("timeout".into()).to_string(),
            "Request rejected: timeout"
        );
    }

    #[test]
    fn test_request_error_conversion() {
        let error: BackendError = RequestError::NoTargets.into();
        assert!(matches!(error, BackendError::InvalidRequest(RequestError::NoTargets)));
        assert!(error.to_string().contains("does not target any torrents"));
    }
}
