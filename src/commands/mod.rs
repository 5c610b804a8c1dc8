//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI args
//! and runs the operation against the snapshot backend or the settings store.

pub mod bulk;
pub mod columns;
pub mod list;

// Re-export execute functions for convenience
pub use bulk::{apply, plan};
pub use columns::{execute as columns, incognito};
pub use list::execute as list;

use crate::backend::TorrentClient;
use crate::cli::SelectArgs;
use crate::settings::SettingsStore;
use crate::view::TorrentView;

/// Settings scope of the torrent table
pub const TORRENTS_SCOPE: &str = "torrents";

/// Replay selection flags onto a view the way clicks would
///
/// `--all` is a header click followed by unchecking each `--exclude`;
/// otherwise each `--select` checks one row.
pub fn replay_selection<C, S>(view: &mut TorrentView<'_, C, S>, args: &SelectArgs)
where
    C: TorrentClient,
    S: SettingsStore,
{
    if args.all {
        view.toggle_select_all();
        for hash in &args.exclude {
            view.toggle_item(hash, false);
        }
    } else {
        for hash in &args.select {
            view.toggle_item(hash, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettingsStore;
    use crate::testing::sample_backend;
    use crate::torrents::FilterContext;
    use crate::view::ViewConfig;

    #[test]
    fn test_replay_select_all_with_exclusions() {
        let backend = sample_backend(1, 4);
        let store = MemorySettingsStore::new();
        let mut view = TorrentView::mount(
            &backend,
            &store,
            TORRENTS_SCOPE,
            FilterContext::for_instance(1),
            ViewConfig::default(),
        )
        .unwrap();

        let args = SelectArgs {
            all: true,
            select: vec![],
            exclude: vec!["t001".into()],
        };
        replay_selection(&mut view, &args);

        assert!(view.selection().is_all_matching());
        assert!(!view.is_selected("t001"));
        assert!(view.is_selected("t002"));
    }

    #[test]
    fn test_replay_explicit_selection() {
        let backend = sample_backend(1, 4);
        let store = MemorySettingsStore::new();
        let mut view = TorrentView::mount(
            &backend,
            &store,
            TORRENTS_SCOPE,
            FilterContext::for_instance(1),
            ViewConfig::default(),
        )
        .unwrap();

        let args = SelectArgs {
            all: false,
            select: vec!["t000".into(), "t003".into()],
            exclude: vec![],
        };
        replay_selection(&mut view, &args);

        assert!(!view.selection().is_all_matching());
        assert!(view.is_selected("t003"));
        assert!(!view.is_selected("t001"));
    }
}
