//! Torrent backend seam
//!
//! The list endpoint and the bulk action endpoint are external collaborators.
//! `TorrentClient` is the seam a view talks through; `SnapshotBackend` is a
//! local implementation over a JSON snapshot that resolves requests the way
//! the server does.

pub mod error;
pub mod snapshot;

pub use error::BackendError;
pub use snapshot::{InstanceSnapshot, Snapshot, SnapshotBackend};

use crate::selection::BulkActionRequest;
use crate::torrents::{ListQuery, TorrentPage};
use serde::{Deserialize, Serialize};

/// Backend result type
pub type Result<T> = std::result::Result<T, BackendError>;

/// Response of a bulk action call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BulkActionResponse {
    /// Number of torrents the server applied the action to
    pub affected: usize,
}

/// Client for the list and bulk action endpoints
pub trait TorrentClient {
    /// Fetch one page of a filtered, sorted list
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the instance is unknown or the call fails.
    fn list(&self, query: &ListQuery) -> Result<TorrentPage>;

    /// Execute a bulk action
    ///
    /// For select-all requests the implementation resolves the matching set
    /// against its own current data.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the request is invalid or the call fails.
    fn bulk_action(&self, instance_id: u32, request: &BulkActionRequest)
    -> Result<BulkActionResponse>;
}
