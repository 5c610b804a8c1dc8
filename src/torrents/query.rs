//! List queries and pages
//!
//! A `ListQuery` identifies one page of one filtered, sorted view. It doubles
//! as the list cache key.

use super::filter::FilterContext;
use super::models::Torrent;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Column to sort the list by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Size,
    #[default]
    AddedOn,
    Seeds,
    Ratio,
    EconomyScore,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// One page request against the list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListQuery {
    pub context: FilterContext,
    pub sort: SortField,
    pub order: SortOrder,
    pub offset: usize,
    pub limit: usize,
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TorrentPage {
    /// Rows on this page
    pub torrents: Vec<Torrent>,

    /// Number of torrents matching the context across all pages
    pub total: usize,
}

impl ListQuery {
    /// First page of a context with default sorting
    #[must_use]
    pub fn first_page(context: FilterContext, limit: usize) -> Self {
        Self {
            context,
            sort: SortField::default(),
            order: SortOrder::default(),
            offset: 0,
            limit,
        }
    }

    /// Zero-based page number
    #[must_use]
    pub const fn page_index(&self) -> usize {
        if self.limit == 0 {
            0
        } else {
            self.offset / self.limit
        }
    }
}

impl TorrentPage {
    /// Hashes of the rows on this page, in display order
    #[must_use]
    pub fn hashes(&self) -> Vec<&str> {
        self.torrents.iter().map(|t| t.hash.as_str()).collect()
    }

    /// Number of pages needed for `total` rows
    #[must_use]
    pub const fn page_count(&self, limit: usize) -> usize {
        if limit == 0 {
            return 0;
        }
        self.total.div_ceil(limit)
    }
}

impl SortField {
    fn compare(self, a: &Torrent, b: &Torrent) -> Ordering {
        match self {
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::Size => a.size.cmp(&b.size),
            Self::AddedOn => a.added_on.cmp(&b.added_on),
            Self::Seeds => a.num_seeds.cmp(&b.num_seeds),
            Self::Ratio => a.ratio.total_cmp(&b.ratio),
            Self::EconomyScore => a
                .economy_score
                .unwrap_or(f64::MIN)
                .total_cmp(&b.economy_score.unwrap_or(f64::MIN)),
        }
    }
}

/// Sort rows in place; ties fall back to the hash so pages are stable
pub fn sort_torrents(torrents: &mut [Torrent], field: SortField, order: SortOrder) {
    torrents.sort_by(|a, b| {
        let ordering = field.compare(a, b).then_with(|| a.hash.cmp(&b.hash));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Filter, sort and slice rows for a query
#[must_use]
pub fn run_query<'a, I>(torrents: I, query: &ListQuery) -> TorrentPage
where
    I: IntoIterator<Item = &'a Torrent>,
{
    let mut matching: Vec<Torrent> = torrents
        .into_iter()
        .filter(|t| query.context.matches(t))
        .cloned()
        .collect();

    let total = matching.len();
    sort_torrents(&mut matching, query.sort, query.order);

    let torrents = matching
        .into_iter()
        .skip(query.offset)
        .take(query.limit)
        .collect();

    TorrentPage { torrents, total }
}
