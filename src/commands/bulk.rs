//! Bulk action commands - plan and apply actions on a selection
//!
//! `plan` prints the request a selection would send; `apply` sends it to the
//! snapshot backend and writes the snapshot back.

use super::{TORRENTS_SCOPE, replay_selection};
use crate::{
    QuiError,
    backend::SnapshotBackend,
    cli::SelectArgs,
    output,
    selection::BulkAction,
    settings::SettingsStore,
    torrents::FilterContext,
    view::{ActionOutcome, TorrentView, ViewConfig},
};
use colored::Colorize;
use dialoguer::Confirm;
use std::path::Path;
use std::time::Instant;
use tracing::info;

type Result<T> = std::result::Result<T, QuiError>;

/// Selection and action shared by `plan` and `apply`
#[derive(Debug, Clone)]
pub struct BulkRequest {
    pub context: FilterContext,
    pub selection: SelectArgs,
    pub action: BulkAction,
}

/// How `apply` confirms destructive actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Ask on the terminal
    Prompt,
    /// Proceed without asking (`--yes` or `confirm_delete = false`)
    Skip,
}

/// Print the request an action would send, without sending it
///
/// # Errors
///
/// Returns `QuiError` if the view cannot be mounted, the page cannot be
/// loaded or the request cannot be serialised.
pub fn plan<S: SettingsStore>(
    backend: &SnapshotBackend,
    store: &S,
    request: BulkRequest,
    config: ViewConfig,
    quiet: bool,
) -> Result<()> {
    let mut view = TorrentView::mount(backend, store, TORRENTS_SCOPE, request.context, config)?;
    replay_selection(&mut view, &request.selection);

    let Some(payload) = view.plan_bulk_action(&request.action) else {
        output::print_outcome(&ActionOutcome::NothingSelected, quiet);
        return Ok(());
    };

    if !quiet {
        let page = view.load_page(Instant::now())?;
        println!(
            "{} {}",
            request.action.label().bold(),
            output::selection_summary(view.selection(), page.total).cyan()
        );
    }
    output::print_request(&payload)?;
    Ok(())
}

/// Send an action to the snapshot backend and save the result
///
/// Nothing is written when the selection is empty, the user declines the
/// prompt or the backend rejects the action.
///
/// # Errors
///
/// Returns `QuiError` if the action fails, the prompt cannot be shown or the
/// snapshot cannot be saved.
pub fn apply<S: SettingsStore>(
    backend: &SnapshotBackend,
    snapshot_path: &Path,
    store: &S,
    request: BulkRequest,
    config: ViewConfig,
    confirmation: Confirmation,
    quiet: bool,
) -> Result<()> {
    let mut view = TorrentView::mount(backend, store, TORRENTS_SCOPE, request.context, config)?;
    replay_selection(&mut view, &request.selection);

    if !view.selection().has_selection() {
        output::print_outcome(&ActionOutcome::NothingSelected, quiet);
        return Ok(());
    }

    if request.action.is_destructive() && confirmation == Confirmation::Prompt {
        view.load_page(Instant::now())?;
        let prompt = format!(
            "{} {} torrent(s)?",
            request.action.label().to_uppercase(),
            view.selected_count()
        );
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| QuiError::InvalidInput(format!("Failed to get confirmation: {e}")))?;

        if !confirmed {
            if !quiet {
                println!("{}", "Cancelled.".yellow());
            }
            return Ok(());
        }
    }

    let outcome = view.run_bulk_action(&request.action, Instant::now())?;
    if let ActionOutcome::Success { affected_count, .. } = &outcome {
        backend.save(snapshot_path)?;
        info!("saved snapshot {} after {affected_count} change(s)", snapshot_path.display());
    }

    output::print_outcome(&outcome, quiet);
    Ok(())
}
