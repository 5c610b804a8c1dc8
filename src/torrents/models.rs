//! Torrent data models
//!
//! These are pure data structures with minimal logic. The economy score and
//! deduplication factor are computed by the server and carried here only for
//! display, filtering and sorting.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Domain Types
// ============================================================================

/// A torrent row as returned by the list endpoint
///
/// `hash` is the stable key used by every selection structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Torrent {
    /// Info-hash (stable identifier)
    pub hash: String,

    /// Display name
    pub name: String,

    /// Total size in bytes
    #[serde(default)]
    pub size: u64,

    /// qBittorrent state
    #[serde(default)]
    pub state: TorrentState,

    /// Category (empty when uncategorised)
    #[serde(default)]
    pub category: String,

    /// Tags attached to the torrent
    #[serde(default)]
    pub tags: Vec<String>,

    /// Current tracker announce URL (empty when none is working)
    #[serde(default)]
    pub tracker: String,

    /// Number of seeds in the swarm
    #[serde(default)]
    pub num_seeds: u32,

    /// Share ratio
    #[serde(default)]
    pub ratio: f64,

    /// Download progress, 0.0 to 1.0
    #[serde(default)]
    pub progress: f64,

    /// When the torrent was added to the client
    #[serde(default)]
    pub added_on: DateTime<Utc>,

    /// Server-computed retention score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economy_score: Option<f64>,

    /// Server-computed deduplication factor (0 = duplicate)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deduplication_factor: Option<f64>,
}

/// qBittorrent torrent state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TorrentState {
    #[serde(rename = "downloading")]
    Downloading,
    #[serde(rename = "uploading")]
    Uploading,
    #[serde(rename = "stalledUP")]
    StalledUp,
    #[serde(rename = "stalledDL")]
    StalledDl,
    #[serde(rename = "pausedUP")]
    PausedUp,
    #[serde(rename = "pausedDL")]
    PausedDl,
    #[serde(rename = "queuedUP")]
    QueuedUp,
    #[serde(rename = "queuedDL")]
    QueuedDl,
    #[serde(rename = "checkingUP")]
    CheckingUp,
    #[serde(rename = "checkingDL")]
    CheckingDl,
    #[serde(rename = "forcedUP")]
    ForcedUp,
    #[serde(rename = "forcedDL")]
    ForcedDl,
    #[serde(rename = "metaDL")]
    MetaDl,
    #[serde(rename = "moving")]
    Moving,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "missingFiles")]
    MissingFiles,
    #[default]
    #[serde(rename = "unknown", other)]
    Unknown,
}

// ============================================================================
// Implementations
// ============================================================================

impl Torrent {
    /// Create a torrent with only the identifying fields set
    #[must_use]
    pub fn new(hash: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether all pieces have been downloaded
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Whether the server marked this torrent as a duplicate of another
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.deduplication_factor == Some(0.0)
    }

    /// Host part of the tracker URL
    ///
    /// Returns `None` when the torrent has no working tracker.
    #[must_use]
    pub fn tracker_domain(&self) -> Option<&str> {
        let url = self.tracker.trim();
        if url.is_empty() {
            return None;
        }

        let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
        let authority = rest.split(['/', '?']).next().unwrap_or(rest);
        let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
        let host = host.split(':').next().unwrap_or(host);

        (!host.is_empty()).then_some(host)
    }

    /// Time elapsed since the torrent was added
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.added_on).max(Duration::zero())
    }

    /// Move to the paused state matching the download progress
    pub fn pause(&mut self) {
        self.state = if self.is_complete() {
            TorrentState::PausedUp
        } else {
            TorrentState::PausedDl
        };
    }

    /// Move to the queued state matching the download progress
    pub fn resume(&mut self) {
        self.state = if self.is_complete() {
            TorrentState::QueuedUp
        } else {
            TorrentState::QueuedDl
        };
    }

    /// Move to the checking state matching the download progress
    pub fn recheck(&mut self) {
        self.state = if self.is_complete() {
            TorrentState::CheckingUp
        } else {
            TorrentState::CheckingDl
        };
    }
}

impl TorrentState {
    /// Paused by the user
    #[must_use]
    pub const fn is_paused(self) -> bool {
        matches!(self, Self::PausedUp | Self::PausedDl)
    }

    /// Downloading or waiting to download
    #[must_use]
    pub const fn is_downloading(self) -> bool {
        matches!(
            self,
            Self::Downloading | Self::StalledDl | Self::MetaDl | Self::ForcedDl | Self::QueuedDl
        )
    }

    /// Seeding or waiting to seed
    #[must_use]
    pub const fn is_seeding(self) -> bool {
        matches!(
            self,
            Self::Uploading | Self::StalledUp | Self::ForcedUp | Self::QueuedUp
        )
    }

    /// Actively transferring data
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(
            self,
            Self::Downloading | Self::Uploading | Self::ForcedUp | Self::ForcedDl | Self::MetaDl
        )
    }

    #[must_use]
    pub const fn is_stalled(self) -> bool {
        matches!(self, Self::StalledUp | Self::StalledDl)
    }

    #[must_use]
    pub const fn is_checking(self) -> bool {
        matches!(self, Self::CheckingUp | Self::CheckingDl)
    }

    #[must_use]
    pub const fn is_errored(self) -> bool {
        matches!(self, Self::Error | Self::MissingFiles)
    }

    /// Short label for display
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Downloading => "downloading",
            Self::Uploading => "seeding",
            Self::StalledUp => "stalled (up)",
            Self::StalledDl => "stalled (dl)",
            Self::PausedUp | Self::PausedDl => "paused",
            Self::QueuedUp | Self::QueuedDl => "queued",
            Self::CheckingUp | Self::CheckingDl => "checking",
            Self::ForcedUp | Self::ForcedDl => "forced",
            Self::MetaDl => "metadata",
            Self::Moving => "moving",
            Self::Error => "error",
            Self::MissingFiles => "missing files",
            Self::Unknown => "unknown",
        }
    }
}
