//! Filter and search matching for torrent lists
//!
//! A `FilterContext` is the scope a selection lives in: which instance, which
//! sidebar filters, which search term. Two views with different contexts show
//! different matching sets, so a selection made in one is meaningless in the
//! other.
//!
//! # Matching rules
//!
//! - Each non-empty filter list must match at least one value (OR within a
//!   list, AND across lists)
//! - The empty string means "uncategorised", "untagged" or "no tracker"
//! - Search terms with glob metacharacters match the name as a pattern,
//!   otherwise every word must appear in the name, category, tags or hash

use super::models::Torrent;
use clap::ValueEnum;
use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Status bucket from the filter sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    All,
    Downloading,
    Seeding,
    Completed,
    Paused,
    Resumed,
    Active,
    Inactive,
    Stalled,
    StalledUploading,
    StalledDownloading,
    Checking,
    Moving,
    Errored,
}

/// Sidebar filters applied to a torrent list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TorrentFilters {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<StatusFilter>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trackers: Vec<String>,
}

/// Everything that defines "matching" for one list view
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FilterContext {
    /// Backend instance the list belongs to
    pub instance_id: u32,

    /// Sidebar filters
    pub filters: TorrentFilters,

    /// Free-text search (None or blank matches everything)
    pub search: Option<String>,
}

impl StatusFilter {
    /// Check whether a torrent falls into this bucket
    #[must_use]
    pub fn matches(self, torrent: &Torrent) -> bool {
        let state = torrent.state;
        match self {
            Self::All => true,
            Self::Downloading => state.is_downloading(),
            Self::Seeding => state.is_seeding(),
            Self::Completed => torrent.is_complete(),
            Self::Paused => state.is_paused(),
            Self::Resumed => !state.is_paused(),
            Self::Active => state.is_active(),
            Self::Inactive => !state.is_active(),
            Self::Stalled => state.is_stalled(),
            Self::StalledUploading => state == super::TorrentState::StalledUp,
            Self::StalledDownloading => state == super::TorrentState::StalledDl,
            Self::Checking => state.is_checking(),
            Self::Moving => state == super::TorrentState::Moving,
            Self::Errored => state.is_errored(),
        }
    }
}

impl TorrentFilters {
    /// True when no filter list constrains the result
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
            && self.categories.is_empty()
            && self.tags.is_empty()
            && self.trackers.is_empty()
    }

    /// Check a torrent against all filter lists
    #[must_use]
    pub fn matches(&self, torrent: &Torrent) -> bool {
        let status_ok =
            self.status.is_empty() || self.status.iter().any(|status| status.matches(torrent));

        let category_ok = self.categories.is_empty()
            || self.categories.iter().any(|category| *category == torrent.category);

        let tags_ok = self.tags.is_empty()
            || self.tags.iter().any(|tag| {
                if tag.is_empty() {
                    torrent.tags.is_empty()
                } else {
                    torrent.tags.contains(tag)
                }
            });

        let trackers_ok = self.trackers.is_empty()
            || self.trackers.iter().any(|tracker| {
                match torrent.tracker_domain() {
                    None => tracker.is_empty(),
                    Some(domain) => domain.eq_ignore_ascii_case(tracker),
                }
            });

        status_ok && category_ok && tags_ok && trackers_ok
    }
}

impl FilterContext {
    /// Context for an instance with no filters or search
    #[must_use]
    pub fn for_instance(instance_id: u32) -> Self {
        Self {
            instance_id,
            ..Self::default()
        }
    }

    /// Search term if it constrains anything
    #[must_use]
    pub fn active_search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Check a torrent against filters and search
    #[must_use]
    pub fn matches(&self, torrent: &Torrent) -> bool {
        self.filters.matches(torrent)
            && self
                .active_search()
                .is_none_or(|term| search_matches(term, torrent))
    }
}

/// Match a search term against a torrent
///
/// Glob patterns (`*`, `?`, `[`) match the whole name case-insensitively. An
/// invalid pattern falls back to plain word matching.
#[must_use]
pub fn search_matches(term: &str, torrent: &Torrent) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }

    if is_glob(term)
        && let Ok(pattern) = Pattern::new(term)
    {
        return pattern.matches_with(&torrent.name, GLOB_OPTIONS);
    }

    let name = torrent.name.to_lowercase();
    let category = torrent.category.to_lowercase();
    let hash = torrent.hash.to_lowercase();

    term.split_whitespace().all(|word| {
        let word = word.to_lowercase();
        name.contains(&word)
            || category.contains(&word)
            || torrent.tags.iter().any(|tag| tag.to_lowercase().contains(&word))
            || hash.starts_with(&word)
    })
}

fn is_glob(term: &str) -> bool {
    term.contains(['*', '?', '['])
}
