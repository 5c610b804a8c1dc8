//! List command - show one page of torrents with selection markers

use super::{TORRENTS_SCOPE, replay_selection};
use crate::{
    QuiError,
    backend::TorrentClient,
    cli::SelectArgs,
    output,
    settings::SettingsStore,
    torrents::{FilterContext, SortField, SortOrder},
    view::{TorrentView, ViewConfig},
};
use std::time::Instant;

type Result<T> = std::result::Result<T, QuiError>;

/// What to list
#[derive(Debug, Clone)]
pub struct ListRequest {
    pub context: FilterContext,
    pub selection: SelectArgs,
    pub sort: SortField,
    pub order: SortOrder,
    /// Page number, starting at 1
    pub page: usize,
}

/// Execute the list command
///
/// # Errors
///
/// Returns `QuiError` if the settings cannot be loaded, the page number is
/// out of range or the backend call fails.
pub fn execute<C, S>(
    client: &C,
    store: &S,
    request: ListRequest,
    config: ViewConfig,
    quiet: bool,
) -> Result<()>
where
    C: TorrentClient,
    S: SettingsStore,
{
    if request.page == 0 {
        return Err(QuiError::InvalidInput("Pages are numbered from 1".into()));
    }

    let mut view = TorrentView::mount(client, store, TORRENTS_SCOPE, request.context, config)?;
    view.set_sort(request.sort, request.order);
    view.go_to_page(request.page - 1);
    replay_selection(&mut view, &request.selection);

    let page = view.load_page(Instant::now())?;
    let page_count = page.page_count(view.query().limit);

    if page.torrents.is_empty() {
        if !quiet {
            if page.total == 0 {
                println!("No torrents match.");
            } else {
                println!("Page {} is past the end ({page_count} page(s)).", request.page);
            }
        }
        return Ok(());
    }

    let settings = view.settings();
    output::print_page(
        &page,
        view.query().page_index(),
        page_count,
        &settings.columns,
        view.selection(),
        settings.incognito,
        quiet,
    );
    Ok(())
}
