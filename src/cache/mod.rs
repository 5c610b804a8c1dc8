//! Cached list pages with optimistic mutation
//!
//! Pages fetched from the list endpoint are kept in a `moka` cache with a
//! time-to-live, so no entry is older than the configured staleness window.
//!
//! After a destructive bulk action the affected rows are removed from every
//! cached page straight away and a reconciliation deadline is recorded. Once
//! the deadline passes the owner invalidates the instance and re-fetches, so
//! the optimistic edit is replaced by server data:
//!
//! ```text
//! bulk delete ok ──► remove_where() ──► schedule_reconcile(now + delay)
//!                                              │
//!                 poll: reconcile_due(now)? ───┴──► complete_reconcile() ──► re-fetch
//! ```

use crate::torrents::{FilterContext, ListQuery, Torrent, TorrentPage};
use moka::sync::Cache;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default number of pages kept
pub const DEFAULT_CAPACITY: u64 = 256;

/// Page cache for one view
pub struct ListCache {
    pages: Cache<ListQuery, Arc<TorrentPage>>,
    pending: HashMap<u32, Instant>,
}

impl ListCache {
    /// Create a cache whose entries expire after `ttl`
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CAPACITY)
    }

    /// Create a cache with a custom page capacity
    #[must_use]
    pub fn with_capacity(ttl: Duration, capacity: u64) -> Self {
        Self {
            pages: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            pending: HashMap::new(),
        }
    }

    /// Cached page for a query
    #[must_use]
    pub fn get(&self, query: &ListQuery) -> Option<Arc<TorrentPage>> {
        self.pages.get(query)
    }

    /// Store a freshly fetched page
    pub fn insert(&self, query: ListQuery, page: TorrentPage) -> Arc<TorrentPage> {
        let page = Arc::new(page);
        self.pages.insert(query, Arc::clone(&page));
        page
    }

    /// Optimistically drop rows from every cached page of an instance
    ///
    /// `predicate` sees the page's query and a row; rows for which it returns
    /// true are removed. Each page's `total` is reduced by the number of
    /// distinct rows removed from pages of the same filter context.
    ///
    /// Returns the number of distinct hashes removed.
    pub fn remove_where<F>(&self, instance_id: u32, predicate: F) -> usize
    where
        F: Fn(&ListQuery, &Torrent) -> bool,
    {
        let entries: Vec<(Arc<ListQuery>, Arc<TorrentPage>)> = self
            .pages
            .iter()
            .filter(|(query, _)| query.context.instance_id == instance_id)
            .collect();

        let mut removed_by_context: HashMap<FilterContext, HashSet<String>> = HashMap::new();
        for (query, page) in &entries {
            for torrent in page.torrents.iter().filter(|t| predicate(query, t)) {
                removed_by_context
                    .entry(query.context.clone())
                    .or_default()
                    .insert(torrent.hash.clone());
            }
        }

        for (query, page) in entries {
            let Some(removed) = removed_by_context.get(&query.context) else {
                continue;
            };

            let torrents: Vec<Torrent> = page
                .torrents
                .iter()
                .filter(|t| !removed.contains(&t.hash))
                .cloned()
                .collect();
            let updated = TorrentPage {
                torrents,
                total: page.total.saturating_sub(removed.len()),
            };
            self.pages.insert((*query).clone(), Arc::new(updated));
        }

        let distinct: HashSet<&String> = removed_by_context.values().flatten().collect();
        debug!(
            "optimistically removed {} row(s) from instance {}",
            distinct.len(),
            instance_id
        );
        distinct.len()
    }

    /// Overwrite the total of every cached page of a filter context
    ///
    /// Used after the server reports how many rows a select-all action
    /// removed, which can exceed what the cache ever held.
    pub fn set_context_total(&self, context: &FilterContext, total: usize) {
        let entries: Vec<(Arc<ListQuery>, Arc<TorrentPage>)> = self
            .pages
            .iter()
            .filter(|(query, page)| query.context == *context && page.total != total)
            .collect();

        for (query, page) in entries {
            let updated = TorrentPage {
                torrents: page.torrents.clone(),
                total,
            };
            self.pages.insert((*query).clone(), Arc::new(updated));
        }
    }

    /// Drop every cached page of an instance
    pub fn invalidate_instance(&self, instance_id: u32) {
        let keys: Vec<Arc<ListQuery>> = self
            .pages
            .iter()
            .filter(|(query, _)| query.context.instance_id == instance_id)
            .map(|(query, _)| query)
            .collect();

        for key in keys {
            self.pages.invalidate(key.as_ref());
        }
    }

    /// Record that an instance must be re-fetched at `at`
    ///
    /// An earlier pending deadline is kept.
    pub fn schedule_reconcile(&mut self, instance_id: u32, at: Instant) {
        self.pending
            .entry(instance_id)
            .and_modify(|deadline| *deadline = (*deadline).min(at))
            .or_insert(at);
    }

    /// Pending reconciliation deadline, if any
    #[must_use]
    pub fn pending_reconcile(&self, instance_id: u32) -> Option<Instant> {
        self.pending.get(&instance_id).copied()
    }

    /// Whether the reconciliation deadline has passed
    #[must_use]
    pub fn reconcile_due(&self, instance_id: u32, now: Instant) -> bool {
        self.pending
            .get(&instance_id)
            .is_some_and(|deadline| *deadline <= now)
    }

    /// Invalidate the instance and clear its deadline
    pub fn complete_reconcile(&mut self, instance_id: u32) {
        self.pending.remove(&instance_id);
        self.invalidate_instance(instance_id);
        debug!("reconciled cached pages of instance {instance_id}");
    }

    /// Number of cached pages
    #[must_use]
    pub fn page_count(&self) -> u64 {
        self.pages.run_pending_tasks();
        self.pages.entry_count()
    }
}
