//! qui-select CLI application entry point
//!
//! Works on a JSON snapshot of one or more qBittorrent instances: list a
//! filtered page with selection markers, preview the bulk action request a
//! selection produces, or apply it.
//!
//! # Usage
//!
//! ```bash
//! # Show the first page of seeding movies
//! qui-select list --category movies --status seeding
//!
//! # Preview "select all, except two" as a request
//! qui-select plan --category movies --all --exclude abc --exclude def pause
//!
//! # Delete everything matching a search, with a confirmation prompt
//! qui-select apply --search "*.iso" --all delete --delete-files
//!
//! # Column layout and incognito mode
//! qui-select columns unhide tracker
//! qui-select incognito on
//! ```
//!
//! # Configuration
//!
//! Configuration is stored in the user's config directory
//! (`~/.config/qui-select/config.toml` on Linux); view settings live next to
//! it under `views/`.

use qui_select::{
    QuiError,
    backend::SnapshotBackend,
    cli::{Cli, Commands, sort_for},
    commands::{
        self,
        bulk::{BulkRequest, Confirmation},
        list::ListRequest,
    },
    config::QuiConfig,
    logging,
    settings::FileSettingsStore,
};
use std::path::PathBuf;
use tracing::debug;

type Result<T> = std::result::Result<T, QuiError>;

/// Snapshot path from the flag, falling back to the config
fn snapshot_path(cli: &Cli, config: &QuiConfig) -> Result<PathBuf> {
    cli.snapshot
        .clone()
        .or_else(|| config.snapshot.clone())
        .ok_or_else(|| {
            QuiError::InvalidInput(
                "No snapshot file given. Use --snapshot <path> or set 'snapshot' in the config file."
                    .into(),
            )
        })
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => QuiConfig::load_from(path)?,
        None => QuiConfig::load()?,
    };
    logging::init(cli.verbose, cli.quiet, config.log_level.as_deref());
    debug!("configuration: {config:?}");

    let store = FileSettingsStore::default_location()?;
    let view_config = config.view_config();
    let quiet = cli.quiet;

    match &cli.command {
        Commands::List {
            scope,
            selection,
            sort,
            desc,
            page,
        } => {
            let backend = SnapshotBackend::load(&snapshot_path(&cli, &config)?)?;
            let (sort, order) = sort_for(*sort, *desc);
            let request = ListRequest {
                context: scope.context(config.default_instance),
                selection: selection.clone(),
                sort,
                order,
                page: *page,
            };
            commands::list(&backend, &store, request, view_config, quiet)?;
        }
        Commands::Plan {
            scope,
            selection,
            action,
        } => {
            let backend = SnapshotBackend::load(&snapshot_path(&cli, &config)?)?;
            let request = BulkRequest {
                context: scope.context(config.default_instance),
                selection: selection.clone(),
                action: action.to_action(),
            };
            commands::plan(&backend, &store, request, view_config, quiet)?;
        }
        Commands::Apply {
            scope,
            selection,
            yes,
            action,
        } => {
            let path = snapshot_path(&cli, &config)?;
            let backend = SnapshotBackend::load(&path)?;
            let confirmation = if *yes || !config.confirm_delete {
                Confirmation::Skip
            } else {
                Confirmation::Prompt
            };
            let request = BulkRequest {
                context: scope.context(config.default_instance),
                selection: selection.clone(),
                action: action.to_action(),
            };
            commands::apply(
                &backend,
                &path,
                &store,
                request,
                view_config,
                confirmation,
                quiet,
            )?;
        }
        Commands::Columns { command } => commands::columns(&store, command, quiet)?,
        Commands::Incognito { state } => commands::incognito(&store, *state, quiet)?,
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
