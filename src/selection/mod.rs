//! Selection coordination for paginated torrent lists
//!
//! Tracks which torrents the user has selected without holding every key in
//! memory when "select all" is used on a list of tens of thousands of rows.
//!
//! # Modes
//!
//! - **Explicit**: a set of selected hashes, toggled one by one
//! - **All matching**: every torrent matching the current filter context is
//!   selected, except an explicit set of exclusions
//!
//! Only one mode is active at a time.
//!
//! # State machine
//!
//! ```text
//! EXPLICIT(∅) ──toggle_select_all()──► ALL_MATCHING(∅)
//!     │  ▲                                  │      ▲
//!     │  └──toggle_select_all() / reset()───┘      │
//!     │                                            │
//! toggle_item(k, true)              toggle_item(k, false / true)
//!     ▼                                            ▼
//! EXPLICIT({k, ..})                 ALL_MATCHING(excluded ± {k})
//! ```
//!
//! The coordinator never talks to a backend. `resolve_for_action` turns the
//! current state into `ActionTargets`; in all-matching mode the receiving
//! server resolves the actual set from the filter context.

pub mod request;

pub use request::{ActionKind, BulkAction, BulkActionRequest, RequestError, parse_tags};

use crate::torrents::FilterContext;
use std::collections::HashSet;
use tracing::debug;

/// Active selection representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    /// Individually selected hashes
    Explicit(HashSet<String>),

    /// Everything matching the filter context, minus exclusions
    AllMatching {
        /// Hashes the user deselected while in this mode
        excluded: HashSet<String>,
    },
}

/// Checkbox state for a table header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderTriState {
    pub checked: bool,
    pub indeterminate: bool,
}

/// What a bulk action should be applied to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTargets {
    /// A concrete list of hashes (sorted)
    Hashes(Vec<String>),

    /// Everything matching `context` except `exclude_hashes`
    AllMatching {
        context: FilterContext,
        exclude_hashes: Vec<String>,
    },
}

/// Selection state for one filtered list view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionCoordinator {
    mode: SelectionMode,
}

impl Default for SelectionMode {
    fn default() -> Self {
        Self::Explicit(HashSet::new())
    }
}

impl SelectionCoordinator {
    /// Create an empty selection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode
    #[must_use]
    pub const fn mode(&self) -> &SelectionMode {
        &self.mode
    }

    /// Whether "select all matching" is active
    #[must_use]
    pub const fn is_all_matching(&self) -> bool {
        matches!(self.mode, SelectionMode::AllMatching { .. })
    }

    /// Number of exclusions (always 0 in explicit mode)
    #[must_use]
    pub fn excluded_count(&self) -> usize {
        match &self.mode {
            SelectionMode::AllMatching { excluded } => excluded.len(),
            SelectionMode::Explicit(_) => 0,
        }
    }

    /// Whether anything is selected
    ///
    /// All-matching mode counts as a selection regardless of exclusions.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        match &self.mode {
            SelectionMode::Explicit(keys) => !keys.is_empty(),
            SelectionMode::AllMatching { .. } => true,
        }
    }

    /// Set the checked state of a single row
    ///
    /// In all-matching mode unchecking adds an exclusion and checking removes
    /// it. In explicit mode the key is inserted or removed.
    pub fn toggle_item(&mut self, key: &str, checked: bool) {
        match &mut self.mode {
            SelectionMode::AllMatching { excluded } => {
                if checked {
                    excluded.remove(key);
                } else if !excluded.contains(key) {
                    excluded.insert(key.to_string());
                }
            }
            SelectionMode::Explicit(keys) => {
                if checked {
                    if !keys.contains(key) {
                        keys.insert(key.to_string());
                    }
                } else {
                    keys.remove(key);
                }
            }
        }
    }

    /// Header checkbox click
    ///
    /// Clears everything if anything is selected, otherwise selects all rows
    /// matching the current filter context. A click never goes from a partial
    /// selection to a full one.
    pub fn toggle_select_all(&mut self) {
        if self.has_selection() {
            debug!("select-all toggled off, clearing selection");
            self.mode = SelectionMode::default();
        } else {
            debug!("select-all toggled on, selecting all matching");
            self.mode = SelectionMode::AllMatching {
                excluded: HashSet::new(),
            };
        }
    }

    /// Whether a row is selected
    #[must_use]
    pub fn is_selected(&self, key: &str) -> bool {
        match &self.mode {
            SelectionMode::AllMatching { excluded } => !excluded.contains(key),
            SelectionMode::Explicit(keys) => keys.contains(key),
        }
    }

    /// Number of selected torrents given the server's matching count
    ///
    /// Clamped at zero when exclusions outnumber a stale total.
    #[must_use]
    pub fn effective_count(&self, total_matching: usize) -> usize {
        match &self.mode {
            SelectionMode::AllMatching { excluded } => total_matching.saturating_sub(excluded.len()),
            SelectionMode::Explicit(keys) => keys.len(),
        }
    }

    /// Header checkbox state for the rows currently loaded
    #[must_use]
    pub fn header_tri_state<I, S>(&self, loaded: I) -> HeaderTriState
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match &self.mode {
            SelectionMode::AllMatching { excluded } => HeaderTriState {
                checked: excluded.is_empty(),
                indeterminate: !excluded.is_empty(),
            },
            SelectionMode::Explicit(keys) => {
                let mut loaded_count = 0usize;
                let mut selected_loaded = 0usize;
                for key in loaded {
                    loaded_count += 1;
                    if keys.contains(key.as_ref()) {
                        selected_loaded += 1;
                    }
                }

                let checked = loaded_count > 0 && selected_loaded == loaded_count;
                HeaderTriState {
                    checked,
                    indeterminate: !checked && !keys.is_empty(),
                }
            }
        }
    }

    /// Convert the selection into action targets
    ///
    /// Returns `None` for an empty explicit selection: a zero-key action has
    /// no defined meaning and must not be sent. In all-matching mode the
    /// matching hashes are never enumerated here.
    #[must_use]
    pub fn resolve_for_action(&self, context: &FilterContext) -> Option<ActionTargets> {
        match &self.mode {
            SelectionMode::Explicit(keys) if keys.is_empty() => None,
            SelectionMode::Explicit(keys) => Some(ActionTargets::Hashes(sorted(keys))),
            SelectionMode::AllMatching { excluded } => Some(ActionTargets::AllMatching {
                context: context.clone(),
                exclude_hashes: sorted(excluded),
            }),
        }
    }

    /// Clear back to an empty explicit selection
    pub fn reset(&mut self) {
        if self.has_selection() {
            debug!("selection reset");
        }
        self.mode = SelectionMode::default();
    }
}

impl HeaderTriState {
    /// Checkbox glyph for terminal output
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        if self.checked {
            "[x]"
        } else if self.indeterminate {
            "[-]"
        } else {
            "[ ]"
        }
    }
}

impl ActionTargets {
    /// Number of concrete hashes, or `None` when the server resolves the set
    #[must_use]
    pub fn explicit_len(&self) -> Option<usize> {
        match self {
            Self::Hashes(hashes) => Some(hashes.len()),
            Self::AllMatching { .. } => None,
        }
    }
}

fn sorted(keys: &HashSet<String>) -> Vec<String> {
    let mut list: Vec<String> = keys.iter().cloned().collect();
    list.sort();
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::torrents::TorrentFilters;

    fn keys(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    fn all_matching_empty() -> SelectionMode {
        SelectionMode::AllMatching {
            excluded: HashSet::new(),
        }
    }

    #[test]
    fn test_starts_empty_explicit() {
        let selection = SelectionCoordinator::new();
        assert_eq!(selection.mode(), &SelectionMode::Explicit(HashSet::new()));
        assert!(!selection.has_selection());
    }

    #[test]
    fn test_explicit_toggle_reflects_last_value() {
        let mut selection = SelectionCoordinator::new();
        let sequence = [
            ("a", true),
            ("b", true),
            ("a", false),
            ("c", true),
            ("b", true),
            ("c", false),
            ("a", true),
        ];

        for (key, checked) in sequence {
            selection.toggle_item(key, checked);
            assert_eq!(selection.is_selected(key), checked);
        }

        assert!(selection.is_selected("a"));
        assert!(selection.is_selected("b"));
        assert!(!selection.is_selected("c"));
        assert_eq!(selection.effective_count(1000), 2);
    }

    #[test]
    fn test_select_all_from_empty_enters_all_matching() {
        let mut selection = SelectionCoordinator::new();
        selection.toggle_select_all();
        assert_eq!(selection.mode(), &all_matching_empty());
    }

    #[test]
    fn test_select_all_with_selection_clears() {
        // explicit, non-empty
        let mut explicit = SelectionCoordinator::new();
        explicit.toggle_item("a", true);
        explicit.toggle_select_all();
        assert_eq!(explicit.mode(), &SelectionMode::Explicit(HashSet::new()));

        // all-matching with exclusions still counts as a selection
        let mut bulk = SelectionCoordinator::new();
        bulk.toggle_select_all();
        bulk.toggle_item("x", false);
        bulk.toggle_select_all();
        assert_eq!(bulk.mode(), &SelectionMode::Explicit(HashSet::new()));
    }

    #[test]
    fn test_entering_all_matching_drops_explicit_keys() {
        let mut selection = SelectionCoordinator::new();
        selection.toggle_item("a", true);
        selection.toggle_item("a", false);
        selection.toggle_select_all();

        assert_eq!(selection.mode(), &all_matching_empty());
        assert_eq!(selection.excluded_count(), 0);
    }

    #[test]
    fn test_exclusion_round_trip() {
        let mut selection = SelectionCoordinator::new();
        selection.toggle_select_all();

        for key in keys("k", 5) {
            assert!(selection.is_selected(&key));
            selection.toggle_item(&key, false);
            assert!(!selection.is_selected(&key));
            selection.toggle_item(&key, false);
            assert!(!selection.is_selected(&key));
            selection.toggle_item(&key, true);
            assert!(selection.is_selected(&key));
        }

        assert_eq!(selection.excluded_count(), 0);
    }

    #[test]
    fn test_reincluding_unexcluded_key_is_noop() {
        let mut selection = SelectionCoordinator::new();
        selection.toggle_select_all();
        selection.toggle_item("never-excluded", true);
        assert_eq!(selection.mode(), &all_matching_empty());
    }

    #[test]
    fn test_effective_count_monotonic_and_clamped() {
        let mut selection = SelectionCoordinator::new();
        selection.toggle_select_all();

        let total = 4;
        let mut previous = selection.effective_count(total);
        assert_eq!(previous, 4);

        for key in keys("x", 10) {
            selection.toggle_item(&key, false);
            let current = selection.effective_count(total);
            assert!(current <= previous);
            previous = current;
        }

        assert_eq!(selection.excluded_count(), 10);
        assert_eq!(selection.effective_count(total), 0);
    }

    #[test]
    fn test_header_tri_state_all_matching() {
        let mut selection = SelectionCoordinator::new();
        selection.toggle_select_all();
        let loaded = ["a", "b"];

        assert_eq!(
            selection.header_tri_state(loaded),
            HeaderTriState {
                checked: true,
                indeterminate: false
            }
        );

        selection.toggle_item("a", false);
        assert_eq!(
            selection.header_tri_state(loaded),
            HeaderTriState {
                checked: false,
                indeterminate: true
            }
        );
    }

    #[test]
    fn test_header_tri_state_explicit() {
        let loaded = keys("t", 5);
        let mut selection = SelectionCoordinator::new();

        let empty = selection.header_tri_state(&loaded);
        assert!(!empty.checked);
        assert!(!empty.indeterminate);
        assert_eq!(empty.symbol(), "[ ]");

        selection.toggle_item("t0", true);
        selection.toggle_item("t1", true);
        let partial = selection.header_tri_state(&loaded);
        assert!(!partial.checked);
        assert!(partial.indeterminate);
        assert_eq!(partial.symbol(), "[-]");

        for key in &loaded {
            selection.toggle_item(key, true);
        }
        let full = selection.header_tri_state(&loaded);
        assert!(full.checked);
        assert!(!full.indeterminate);
        assert_eq!(full.symbol(), "[x]");
    }

    #[test]
    fn test_header_never_checked_without_loaded_rows() {
        let selection = SelectionCoordinator::new();
        let none: [&str; 0] = [];
        assert!(!selection.header_tri_state(none).checked);
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut explicit = SelectionCoordinator::new();
        explicit.toggle_item("a", true);
        explicit.reset();
        assert_eq!(explicit, SelectionCoordinator::new());

        let mut bulk = SelectionCoordinator::new();
        bulk.toggle_select_all();
        bulk.toggle_item("x", false);
        bulk.reset();
        assert_eq!(bulk, SelectionCoordinator::new());

        let mut empty = SelectionCoordinator::new();
        empty.reset();
        assert_eq!(empty, SelectionCoordinator::new());
    }

    #[test]
    fn test_resolve_empty_explicit_is_none() {
        let selection = SelectionCoordinator::new();
        assert_eq!(selection.resolve_for_action(&FilterContext::for_instance(1)), None);
    }

    #[test]
    fn test_resolve_explicit_lists_sorted_hashes() {
        let mut selection = SelectionCoordinator::new();
        selection.toggle_item("b", true);
        selection.toggle_item("a", true);

        let targets = selection.resolve_for_action(&FilterContext::for_instance(1));
        assert_eq!(
            targets,
            Some(ActionTargets::Hashes(vec!["a".into(), "b".into()]))
        );
        assert_eq!(targets.and_then(|t| t.explicit_len()), Some(2));
    }

    #[test]
    fn test_resolve_all_matching_carries_context_not_keys() {
        let context = FilterContext {
            instance_id: 3,
            filters: TorrentFilters {
                categories: vec!["movies".into()],
                ..TorrentFilters::default()
            },
            search: Some("1080p".into()),
        };

        let mut selection = SelectionCoordinator::new();
        selection.toggle_select_all();
        selection.toggle_item("z", false);
        selection.toggle_item("y", false);

        match selection.resolve_for_action(&context) {
            Some(ActionTargets::AllMatching {
                context: resolved,
                exclude_hashes,
            }) => {
                assert_eq!(resolved, context);
                assert_eq!(exclude_hashes, vec!["y".to_string(), "z".to_string()]);
            }
            other => panic!("Expected AllMatching targets, got {other:?}"),
        }
    }

    #[test]
    fn test_scenario_select_all_exclude_reinclude() {
        let loaded = keys("row", 100);
        let mut selection = SelectionCoordinator::new();

        selection.toggle_select_all();
        assert_eq!(selection.mode(), &all_matching_empty());
        assert_eq!(selection.effective_count(250), 250);
        assert!(selection.header_tri_state(&loaded).checked);

        for key in &loaded[..3] {
            selection.toggle_item(key, false);
        }
        assert_eq!(selection.effective_count(250), 247);

        selection.toggle_item(&loaded[0], true);
        assert_eq!(selection.effective_count(250), 248);
    }

    #[test]
    fn test_scenario_explicit_then_fill_page() {
        let loaded = keys("row", 6);
        let mut selection = SelectionCoordinator::new();

        selection.toggle_item("row0", true);
        selection.toggle_item("row1", true);
        assert!(selection.header_tri_state(&loaded).indeterminate);

        for key in &loaded[2..] {
            selection.toggle_item(key, true);
        }
        let header = selection.header_tri_state(&loaded);
        assert!(header.checked);
        assert!(!header.indeterminate);
    }

    #[test]
    fn test_scenario_filter_change_resets() {
        let mut selection = SelectionCoordinator::new();
        selection.toggle_select_all();
        selection.toggle_item("x", false);

        // the owning view calls reset() when the filter changes
        selection.reset();

        assert!(!selection.has_selection());
        assert!(!selection.is_selected("x"));
        assert_eq!(selection.excluded_count(), 0);
        assert_eq!(selection.effective_count(500), 0);
    }
}
