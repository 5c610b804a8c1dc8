//! Torrent list domain: rows, filters and paged queries
//!
//! - `models`: `Torrent` and `TorrentState`
//! - `filter`: `TorrentFilters`, `StatusFilter`, search and `FilterContext`
//! - `query`: `ListQuery`, `TorrentPage`, sorting and pagination

pub mod filter;
pub mod models;
pub mod query;

pub use filter::{FilterContext, StatusFilter, TorrentFilters, search_matches};
pub use models::{Torrent, TorrentState};
pub use query::{ListQuery, SortField, SortOrder, TorrentPage, run_query, sort_torrents};
