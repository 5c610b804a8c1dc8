//! Torrent list view
//!
//! Composes the selection coordinator, the list cache, a `TorrentClient` and
//! a `SettingsStore` into the owner of one paginated, filterable list.
//!
//! # Lifecycle
//!
//! ```text
//! mount() ──► load settings, empty selection
//!    │
//!    ├─► load_page(now)          cache hit or client.list()
//!    ├─► set_filters/search/instance ──► selection.reset() if changed
//!    ├─► set_sort/next_page      selection kept
//!    │
//!    └─► run_bulk_action(action, now)
//!          ├─ nothing selected ──► NothingSelected, no request
//!          ├─ client error ──────► selection intact, error returned
//!          └─ success ───────────► optimistic cache edit
//!                                  schedule reconcile, reset selection
//! ```
//!
//! All calls happen on the owner's thread; `now` is passed in so the
//! reconciliation deadline can be driven from tests.

use crate::backend::{BackendError, TorrentClient};
use crate::cache::ListCache;
use crate::selection::{ActionTargets, BulkAction, BulkActionRequest, HeaderTriState, SelectionCoordinator};
use crate::settings::{SettingsError, SettingsStore, ViewSettings};
use crate::torrents::{FilterContext, ListQuery, SortField, SortOrder, TorrentFilters, TorrentPage};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// View result type
pub type Result<T> = std::result::Result<T, ViewError>;

/// Errors that can occur inside a view
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Tunables injected into a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    /// Rows per page
    pub page_size: usize,

    /// How long optimistic edits are shown before the list is re-fetched
    pub reconcile_delay: Duration,

    /// Upper bound on the age of a cached page
    pub cache_ttl: Duration,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            reconcile_delay: Duration::from_millis(1500),
            cache_ttl: Duration::from_secs(30),
        }
    }
}

/// Result of a bulk action issued from the view
///
/// Pure data; the CLI layer turns it into output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The server applied the action
    Success {
        affected_count: usize,
        details: String,
    },

    /// Empty selection, no request was sent
    NothingSelected,
}

/// One paginated torrent list with its selection and settings
pub struct TorrentView<'a, C, S> {
    client: &'a C,
    store: &'a S,
    scope: String,
    config: ViewConfig,
    settings: ViewSettings,
    query: ListQuery,
    selection: SelectionCoordinator,
    cache: ListCache,
    page: Option<Arc<TorrentPage>>,
}

impl<'a, C, S> TorrentView<'a, C, S>
where
    C: TorrentClient,
    S: SettingsStore,
{
    /// Create a view and load the settings of its scope
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Settings` if the stored settings cannot be read.
    pub fn mount(
        client: &'a C,
        store: &'a S,
        scope: &str,
        context: FilterContext,
        config: ViewConfig,
    ) -> Result<Self> {
        let settings = store.load(scope)?;
        debug!("mounted view '{scope}' on instance {}", context.instance_id);

        Ok(Self {
            client,
            store,
            scope: scope.to_string(),
            config,
            settings,
            query: ListQuery::first_page(context, config.page_size.max(1)),
            selection: SelectionCoordinator::new(),
            cache: ListCache::new(config.cache_ttl),
            page: None,
        })
    }

    #[must_use]
    pub const fn context(&self) -> &FilterContext {
        &self.query.context
    }

    #[must_use]
    pub const fn query(&self) -> &ListQuery {
        &self.query
    }

    #[must_use]
    pub const fn selection(&self) -> &SelectionCoordinator {
        &self.selection
    }

    #[must_use]
    pub const fn cache(&self) -> &ListCache {
        &self.cache
    }

    /// Last page handed out by `load_page`
    #[must_use]
    pub fn page(&self) -> Option<&TorrentPage> {
        self.page.as_deref()
    }

    /// Fetch the current page, from cache when possible
    ///
    /// A due reconciliation is completed first so stale optimistic data is
    /// never served past its deadline.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Backend` if the list call fails.
    pub fn load_page(&mut self, now: Instant) -> Result<Arc<TorrentPage>> {
        let instance_id = self.query.context.instance_id;
        if self.cache.reconcile_due(instance_id, now) {
            self.cache.complete_reconcile(instance_id);
        }

        let page = if let Some(page) = self.cache.get(&self.query) {
            debug!("list cache hit for page {}", self.query.page_index());
            page
        } else {
            debug!("list cache miss for page {}", self.query.page_index());
            let page = self.client.list(&self.query)?;
            self.cache.insert(self.query.clone(), page)
        };

        self.page = Some(Arc::clone(&page));
        Ok(page)
    }

    /// Replace the filters; resets the selection if they changed
    pub fn set_filters(&mut self, filters: TorrentFilters) {
        if self.query.context.filters == filters {
            return;
        }
        self.query.context.filters = filters;
        self.context_changed();
    }

    /// Replace the search term; resets the selection if it changed
    ///
    /// Blank terms are treated as no search.
    pub fn set_search(&mut self, search: Option<String>) {
        let search = search
            .map(|term| term.trim().to_string())
            .filter(|term| !term.is_empty());
        if self.query.context.search == search {
            return;
        }
        self.query.context.search = search;
        self.context_changed();
    }

    /// Switch instance; resets the selection if it changed
    pub fn set_instance(&mut self, instance_id: u32) {
        if self.query.context.instance_id == instance_id {
            return;
        }
        self.query.context.instance_id = instance_id;
        self.context_changed();
    }

    /// Change the sort; the selection is kept
    pub fn set_sort(&mut self, sort: SortField, order: SortOrder) {
        if self.query.sort == sort && self.query.order == order {
            return;
        }
        self.query.sort = sort;
        self.query.order = order;
        self.query.offset = 0;
        self.page = None;
    }

    /// Advance to the next page if there is one
    ///
    /// Returns false when the last loaded page was already the final one.
    pub fn next_page(&mut self) -> bool {
        let Some(page) = &self.page else {
            return false;
        };
        let next = self.query.offset + self.query.limit;
        if next >= page.total {
            return false;
        }
        self.query.offset = next;
        self.page = None;
        true
    }

    /// Go back one page; false on the first page
    pub fn prev_page(&mut self) -> bool {
        if self.query.offset == 0 {
            return false;
        }
        self.query.offset = self.query.offset.saturating_sub(self.query.limit);
        self.page = None;
        true
    }

    /// Jump to a zero-based page; the selection is kept
    pub fn go_to_page(&mut self, index: usize) {
        let offset = index.saturating_mul(self.query.limit);
        if offset != self.query.offset {
            self.query.offset = offset;
            self.page = None;
        }
    }

    pub fn toggle_item(&mut self, hash: &str, checked: bool) {
        self.selection.toggle_item(hash, checked);
    }

    pub fn toggle_select_all(&mut self) {
        self.selection.toggle_select_all();
    }

    #[must_use]
    pub fn is_selected(&self, hash: &str) -> bool {
        self.selection.is_selected(hash)
    }

    /// Selected count against the matching total of the loaded page
    #[must_use]
    pub fn selected_count(&self) -> usize {
        let total = self.page.as_ref().map_or(0, |page| page.total);
        self.selection.effective_count(total)
    }

    /// Header checkbox state for the loaded page
    #[must_use]
    pub fn header_state(&self) -> HeaderTriState {
        match &self.page {
            Some(page) => self
                .selection
                .header_tri_state(page.torrents.iter().map(|t| t.hash.as_str())),
            None => self.selection.header_tri_state(std::iter::empty::<&str>()),
        }
    }

    /// Request that would be sent for an action, without sending it
    #[must_use]
    pub fn plan_bulk_action(&self, action: &BulkAction) -> Option<BulkActionRequest> {
        self.selection
            .resolve_for_action(&self.query.context)
            .map(|targets| BulkActionRequest::new(&targets, action))
    }

    /// Send a bulk action for the current selection
    ///
    /// On failure the selection is left as it was so the user can retry.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Backend` if the client rejects the action.
    pub fn run_bulk_action(&mut self, action: &BulkAction, now: Instant) -> Result<ActionOutcome> {
        let Some(targets) = self.selection.resolve_for_action(&self.query.context) else {
            debug!("{} skipped: nothing selected", action.label());
            return Ok(ActionOutcome::NothingSelected);
        };

        let instance_id = self.query.context.instance_id;
        let request = BulkActionRequest::new(&targets, action);
        info!(
            "dispatching {} to instance {} ({})",
            action.label(),
            instance_id,
            describe_targets(&targets)
        );

        let response = match self.client.bulk_action(instance_id, &request) {
            Ok(response) => response,
            Err(e) => {
                warn!("{} failed, selection kept: {e}", action.label());
                return Err(e.into());
            }
        };

        if action.is_destructive() {
            self.remove_selected_rows(&targets, response.affected);
            self.cache
                .schedule_reconcile(instance_id, now + self.config.reconcile_delay);
            self.page = self.cache.get(&self.query);
        } else {
            self.cache.schedule_reconcile(instance_id, now);
        }

        self.selection.reset();
        info!("{} applied to {} torrent(s)", action.label(), response.affected);

        Ok(ActionOutcome::Success {
            affected_count: response.affected,
            details: action.label(),
        })
    }

    /// Re-fetch the current page once the reconciliation deadline passed
    ///
    /// Returns whether a re-fetch happened.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Backend` if the list call fails.
    pub fn poll_reconcile(&mut self, now: Instant) -> Result<bool> {
        if !self.cache.reconcile_due(self.query.context.instance_id, now) {
            return Ok(false);
        }
        self.load_page(now)?;
        Ok(true)
    }

    #[must_use]
    pub const fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Change the view settings and persist them
    ///
    /// The in-memory settings are only replaced once the store accepted them.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Settings` if the closure fails or saving fails.
    pub fn update_settings<F>(&mut self, update: F) -> Result<()>
    where
        F: FnOnce(&mut ViewSettings) -> std::result::Result<(), SettingsError>,
    {
        let mut settings = self.settings.clone();
        update(&mut settings)?;
        if settings == self.settings {
            return Ok(());
        }

        self.store.save(&self.scope, &settings)?;
        self.settings = settings;
        Ok(())
    }

    fn context_changed(&mut self) {
        debug!("filter context changed, resetting selection");
        self.selection.reset();
        self.query.offset = 0;
        self.page = None;
    }

    /// Drop deleted rows from the cache
    ///
    /// In select-all mode the server removed `affected` rows of the context,
    /// most of which were never loaded, so the context total is taken from
    /// the server count rather than from the rows the cache held.
    fn remove_selected_rows(&self, targets: &ActionTargets, affected: usize) {
        let instance_id = self.query.context.instance_id;
        match targets {
            ActionTargets::Hashes(hashes) => {
                let doomed: HashSet<&str> = hashes.iter().map(String::as_str).collect();
                self.cache
                    .remove_where(instance_id, |_, torrent| doomed.contains(torrent.hash.as_str()));
            }
            ActionTargets::AllMatching {
                context,
                exclude_hashes,
            } => {
                let previous_total = self
                    .cache
                    .get(&self.query)
                    .or_else(|| self.page.clone())
                    .map(|page| page.total);
                let kept: HashSet<&str> = exclude_hashes.iter().map(String::as_str).collect();
                self.cache.remove_where(instance_id, |query, torrent| {
                    query.context == *context && !kept.contains(torrent.hash.as_str())
                });
                if let Some(total) = previous_total {
                    self.cache
                        .set_context_total(context, total.saturating_sub(affected));
                }
            }
        }
    }
}

fn describe_targets(targets: &ActionTargets) -> String {
    match targets {
        ActionTargets::Hashes(hashes) => format!("{} explicit hash(es)", hashes.len()),
        ActionTargets::AllMatching { exclude_hashes, .. } => {
            format!("all matching, {} excluded", exclude_hashes.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionMode;
    use crate::settings::{Column, MemorySettingsStore};
    use crate::testing::{ScriptedClient, TempSettings, sample_backend};
    use crate::torrents::StatusFilter;

    fn config() -> ViewConfig {
        ViewConfig {
            page_size: 5,
            reconcile_delay: Duration::from_secs(2),
            cache_ttl: Duration::from_secs(60),
        }
    }

    fn client(n: usize) -> ScriptedClient {
        ScriptedClient::new(sample_backend(1, n))
    }

    fn mount<'a>(
        client: &'a ScriptedClient,
        store: &'a MemorySettingsStore,
    ) -> TorrentView<'a, ScriptedClient, MemorySettingsStore> {
        TorrentView::mount(client, store, "torrents", FilterContext::for_instance(1), config())
            .unwrap()
    }

    #[test]
    fn test_load_page_uses_cache() {
        let client = client(12);
        let store = MemorySettingsStore::new();
        let mut view = mount(&client, &store);
        let now = Instant::now();

        let page = view.load_page(now).unwrap();
        assert_eq!(page.torrents.len(), 5);
        assert_eq!(page.total, 12);

        view.load_page(now).unwrap();
        assert_eq!(client.list_calls(), 1);
    }

    #[test]
    fn test_nothing_selected_sends_no_request() {
        let client = client(5);
        let store = MemorySettingsStore::new();
        let mut view = mount(&client, &store);

        let outcome = view.run_bulk_action(&BulkAction::Pause, Instant::now()).unwrap();
        assert_eq!(outcome, ActionOutcome::NothingSelected);
        assert_eq!(client.action_calls(), 0);
    }

    #[test]
    fn test_explicit_delete_is_optimistic_then_reconciled() {
        let client = client(12);
        let store = MemorySettingsStore::new();
        let mut view = mount(&client, &store);
        let now = Instant::now();

        let page = view.load_page(now).unwrap();
        let doomed = page.torrents[0].hash.clone();
        view.toggle_item(&doomed, true);

        let outcome = view
            .run_bulk_action(&BulkAction::Delete { delete_files: false }, now)
            .unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::Success {
                affected_count: 1,
                details: "delete".to_string(),
            }
        );
        assert!(!view.selection().has_selection());

        // optimistic: the row is gone from the cached page without a re-fetch
        let page = view.load_page(now).unwrap();
        assert!(page.torrents.iter().all(|t| t.hash != doomed));
        assert_eq!(page.total, 11);
        assert_eq!(client.list_calls(), 1);

        assert!(!view.poll_reconcile(now + Duration::from_secs(1)).unwrap());
        assert!(view.poll_reconcile(now + Duration::from_secs(2)).unwrap());
        assert_eq!(client.list_calls(), 2);
        assert_eq!(view.page().unwrap().torrents.len(), 5);
        assert_eq!(view.page().unwrap().total, 11);
    }

    #[test]
    fn test_select_all_delete_keeps_exclusions() {
        let client = client(12);
        let store = MemorySettingsStore::new();
        let mut view = mount(&client, &store);
        let now = Instant::now();

        let page = view.load_page(now).unwrap();
        let kept = page.torrents[1].hash.clone();

        view.toggle_select_all();
        view.toggle_item(&kept, false);
        assert_eq!(view.selected_count(), 11);
        assert_eq!(
            view.header_state(),
            HeaderTriState {
                checked: false,
                indeterminate: true,
            }
        );

        let outcome = view
            .run_bulk_action(&BulkAction::Delete { delete_files: true }, now)
            .unwrap();
        assert!(matches!(outcome, ActionOutcome::Success { affected_count: 11, .. }));

        let page = view.load_page(now).unwrap();
        assert_eq!(page.torrents.len(), 1);
        assert_eq!(page.torrents[0].hash, kept);

        let remaining = client.backend().torrents(1).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].hash, kept);
    }

    #[test]
    fn test_select_all_delete_total_follows_server_count() {
        let client = client(12);
        let store = MemorySettingsStore::new();
        let mut view = mount(&client, &store);
        let now = Instant::now();

        let page = view.load_page(now).unwrap();
        let kept = page.torrents[0].hash.clone();
        view.toggle_select_all();
        view.toggle_item(&kept, false);

        view
            .run_bulk_action(&BulkAction::Delete { delete_files: false }, now)
            .unwrap();

        // before reconciliation the cached total already matches the server
        let page = view.page().unwrap();
        assert_eq!(page.total, client.backend().torrents(1).unwrap().len());
        assert_eq!(page.total, 1);
        assert_eq!(page.torrents.len(), 1);
        assert!(!view.next_page());
        assert_eq!(client.list_calls(), 1);
    }

    #[test]
    fn test_delete_from_uncached_page_does_not_reuse_stale_rows() {
        let client = client(12);
        let store = MemorySettingsStore::new();
        let mut view = mount(&client, &store);
        let now = Instant::now();

        let page = view.load_page(now).unwrap();
        let doomed = page.torrents[0].hash.clone();
        view.toggle_item(&doomed, true);
        view.cache.invalidate_instance(1);

        view
            .run_bulk_action(&BulkAction::Delete { delete_files: false }, now)
            .unwrap();
        assert!(view.page().is_none());

        let page = view.load_page(now).unwrap();
        assert!(page.torrents.iter().all(|t| t.hash != doomed));
        assert_eq!(page.total, 11);
        assert_eq!(client.list_calls(), 2);
    }

    #[test]
    fn test_failed_action_keeps_selection() {
        let client = ScriptedClient::failing(sample_backend(1, 5));
        let store = MemorySettingsStore::new();
        let mut view = mount(&client, &store);
        let now = Instant::now();

        view.load_page(now).unwrap();
        view.toggle_select_all();
        view.toggle_item("t002", false);
        let before = view.selection().clone();

        let result = view.run_bulk_action(&BulkAction::Pause, now);
        assert!(matches!(result, Err(ViewError::Backend(BackendError::Rejected(_)))));
        assert_eq!(view.selection(), &before);
        assert!(view.cache().pending_reconcile(1).is_none());

        client.set_failing(false);
        let outcome = view.run_bulk_action(&BulkAction::Pause, now).unwrap();
        assert!(matches!(outcome, ActionOutcome::Success { affected_count: 4, .. }));
    }

    #[test]
    fn test_non_destructive_action_reconciles_immediately() {
        let client = client(5);
        let store = MemorySettingsStore::new();
        let mut view = mount(&client, &store);
        let now = Instant::now();

        view.load_page(now).unwrap();
        view.toggle_item("t001", true);
        view.run_bulk_action(&BulkAction::Pause, now).unwrap();

        assert!(view.poll_reconcile(now).unwrap());
        let page = view.page().unwrap();
        let paused = page.torrents.iter().find(|t| t.hash == "t001").unwrap();
        assert!(paused.state.is_paused());
    }

    #[test]
    fn test_context_changes_reset_selection() {
        let client = client(12);
        let store = MemorySettingsStore::new();
        let mut view = mount(&client, &store);

        view.toggle_item("t000", true);
        view.set_search(Some("  ".to_string()));
        assert!(view.is_selected("t000"), "blank search is not a change");

        view.set_search(Some("sample".to_string()));
        assert!(!view.selection().has_selection());

        view.toggle_select_all();
        view.set_filters(TorrentFilters {
            status: vec![StatusFilter::Seeding],
            ..TorrentFilters::default()
        });
        assert_eq!(view.selection().mode(), &SelectionMode::default());

        view.toggle_item("t000", true);
        view.set_instance(1);
        assert!(view.is_selected("t000"));
        view.set_instance(2);
        assert!(!view.is_selected("t000"));
    }

    #[test]
    fn test_paging_and_sorting_keep_selection() {
        let client = client(12);
        let store = MemorySettingsStore::new();
        let mut view = mount(&client, &store);
        let now = Instant::now();

        view.load_page(now).unwrap();
        view.toggle_select_all();
        view.toggle_item("t003", false);

        assert!(view.next_page());
        view.load_page(now).unwrap();
        assert!(view.next_page());
        view.load_page(now).unwrap();
        assert!(!view.next_page(), "12 rows fit in three pages of five");

        view.set_sort(SortField::Name, SortOrder::Asc);
        assert_eq!(view.query().offset, 0);
        assert!(view.selection().is_all_matching());
        assert!(!view.is_selected("t003"));

        assert!(!view.prev_page());
    }

    #[test]
    fn test_update_settings_persists() {
        let client = client(1);
        let store = MemorySettingsStore::new();
        {
            let mut view = mount(&client, &store);
            view.update_settings(|s| s.columns.set_visible(Column::Tracker, true))
                .unwrap();
            // unchanged settings are not written again
            view.update_settings(|s| s.columns.set_visible(Column::Tracker, true))
                .unwrap();
        }
        assert_eq!(store.save_count(), 1);

        let view = mount(&client, &store);
        assert!(view.settings().columns.is_visible(Column::Tracker));
    }

    #[test]
    fn test_rejected_settings_change_is_not_applied() {
        let client = client(1);
        let settings = TempSettings::new();
        let mut view = TorrentView::mount(
            &client,
            settings.store(),
            "torrents",
            FilterContext::for_instance(1),
            config(),
        )
        .unwrap();

        let result = view.update_settings(|s| s.columns.set_visible(Column::Name, false));
        assert!(matches!(result, Err(ViewError::Settings(SettingsError::LockedColumn(_)))));
        assert!(view.settings().columns.is_visible(Column::Name));
    }
}
