//! Testing utilities for qui-select
//!
//! Torrent fixtures, a scripted client and a temporary settings directory.
//!
//! Only available when compiled with `cfg(test)`.

use crate::backend::{BackendError, BulkActionResponse, Result, SnapshotBackend, TorrentClient};
use crate::selection::BulkActionRequest;
use crate::settings::FileSettingsStore;
use crate::torrents::{ListQuery, Torrent, TorrentPage, TorrentState};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::Cell;
use tempfile::TempDir;

const STATES: [TorrentState; 4] = [
    TorrentState::Uploading,
    TorrentState::Downloading,
    TorrentState::StalledUp,
    TorrentState::QueuedDl,
];

const CATEGORIES: [&str; 3] = ["movies", "tv", ""];

/// Fixed reference time the fixtures are dated against
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// `n` torrents with hashes `t000`, `t001`, ...
///
/// None of them start paused. States, categories and sizes vary so filters
/// and sorting have something to work with; `t000` is the oldest.
#[must_use]
pub fn sample_torrents(n: usize) -> Vec<Torrent> {
    (0..n)
        .map(|i| {
            let state = STATES[i % STATES.len()];
            let mut torrent = Torrent::new(format!("t{i:03}"), format!("Sample Torrent {i}"));
            torrent.size = (i as u64 + 1) * 1_048_576;
            torrent.state = state;
            torrent.progress = if state.is_seeding() { 1.0 } else { 0.5 };
            torrent.category = CATEGORIES[i % CATEGORIES.len()].to_string();
            torrent.num_seeds = (i % 7) as u32;
            torrent.ratio = i as f64 / 10.0;
            torrent.added_on = epoch() + Duration::hours(i as i64);
            if i % 5 == 0 {
                torrent.tags = vec!["keep".to_string()];
            }
            torrent
        })
        .collect()
}

/// Snapshot backend with `n` sample torrents on one instance
#[must_use]
pub fn sample_backend(instance_id: u32, n: usize) -> SnapshotBackend {
    let backend = SnapshotBackend::default();
    for torrent in sample_torrents(n) {
        backend.upsert_torrent(instance_id, torrent);
    }
    backend
}

/// Seeding torrent with a name and category
#[must_use]
pub fn torrent_with(hash: &str, name: &str, category: &str) -> Torrent {
    let mut torrent = Torrent::new(hash, name);
    torrent.category = category.to_string();
    torrent.state = TorrentState::Uploading;
    torrent.progress = 1.0;
    torrent.added_on = epoch();
    torrent
}

/// Client that counts calls and can be told to reject bulk actions
pub struct ScriptedClient {
    backend: SnapshotBackend,
    fail_actions: Cell<bool>,
    list_calls: Cell<usize>,
    action_calls: Cell<usize>,
}

impl ScriptedClient {
    /// Forward everything to `backend`
    #[must_use]
    pub fn new(backend: SnapshotBackend) -> Self {
        Self {
            backend,
            fail_actions: Cell::new(false),
            list_calls: Cell::new(0),
            action_calls: Cell::new(0),
        }
    }

    /// Forward list calls, reject every bulk action
    #[must_use]
    pub fn failing(backend: SnapshotBackend) -> Self {
        let client = Self::new(backend);
        client.fail_actions.set(true);
        client
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail_actions.set(fail);
    }

    #[must_use]
    pub const fn backend(&self) -> &SnapshotBackend {
        &self.backend
    }

    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.get()
    }

    #[must_use]
    pub fn action_calls(&self) -> usize {
        self.action_calls.get()
    }
}

impl TorrentClient for ScriptedClient {
    fn list(&self, query: &ListQuery) -> Result<TorrentPage> {
        self.list_calls.set(self.list_calls.get() + 1);
        self.backend.list(query)
    }

    fn bulk_action(
        &self,
        instance_id: u32,
        request: &BulkActionRequest,
    ) -> Result<BulkActionResponse> {
        self.action_calls.set(self.action_calls.get() + 1);
        if self.fail_actions.get() {
            return Err(BackendError::Rejected("server unavailable".to_string()));
        }
        self.backend.bulk_action(instance_id, request)
    }
}

/// Temporary directory with a file settings store inside
///
/// The directory is removed when the guard is dropped.
pub struct TempSettings {
    _dir: TempDir,
    store: FileSettingsStore,
}

impl TempSettings {
    /// # Panics
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp settings dir");
        let store = FileSettingsStore::new(dir.path().join("views"));
        Self { _dir: dir, store }
    }

    #[must_use]
    pub const fn store(&self) -> &FileSettingsStore {
        &self.store
    }
}

impl Default for TempSettings {
    fn default() -> Self {
        Self::new()
    }
}
