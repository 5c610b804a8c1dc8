//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for qui-select using the `clap` crate.
//!
//! # Commands
//!
//! - **list**: Show one page of a filtered torrent list with selection markers
//! - **plan**: Print the bulk action request a selection would produce
//! - **apply**: Send the bulk action to the snapshot backend
//! - **columns**: Edit the persisted column layout
//! - **incognito**: Toggle placeholder names in output
//!
//! Scope flags (`--instance`, `--status`, `--category`, ...) and selection
//! flags (`--all`, `--select`, `--exclude`) go before the action name:
//!
//! ```text
//! qui-select apply --category movies --all --exclude abc123 delete --delete-files
//! ```

use crate::selection::{BulkAction, parse_tags};
use crate::torrents::{FilterContext, SortField, SortOrder, StatusFilter, TorrentFilters};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "qui-select")]
#[command(about = "Select and bulk-manage torrents across filtered lists", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of the default location
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot file to operate on (overrides config)
    #[arg(long = "snapshot", value_name = "PATH", global = true)]
    pub snapshot: Option<PathBuf>,

    /// Increase diagnostic output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors and results
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show one page of torrents
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        scope: ScopeArgs,

        #[command(flatten)]
        selection: SelectArgs,

        /// Column to sort by
        #[arg(long = "sort", value_enum)]
        sort: Option<SortField>,

        /// Sort descending (with --sort)
        #[arg(long = "desc", requires = "sort")]
        desc: bool,

        /// Page number, starting at 1
        #[arg(long = "page", default_value_t = 1)]
        page: usize,
    },

    /// Print the request a bulk action would send
    Plan {
        #[command(flatten)]
        scope: ScopeArgs,

        #[command(flatten)]
        selection: SelectArgs,

        #[command(subcommand)]
        action: ActionCommand,
    },

    /// Run a bulk action against the snapshot
    Apply {
        #[command(flatten)]
        scope: ScopeArgs,

        #[command(flatten)]
        selection: SelectArgs,

        /// Skip the confirmation prompt for destructive actions
        #[arg(short = 'y', long = "yes")]
        yes: bool,

        #[command(subcommand)]
        action: ActionCommand,
    },

    /// Edit the column layout of the torrent table
    Columns {
        #[command(subcommand)]
        command: ColumnsCommand,
    },

    /// Replace torrent names with placeholders in output
    Incognito {
        #[arg(value_enum)]
        state: Toggle,
    },
}

/// Which torrents a command looks at
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeArgs {
    /// Instance id (overrides config)
    #[arg(long = "instance", value_name = "ID")]
    pub instance: Option<u32>,

    /// Status bucket (repeatable)
    #[arg(long = "status", value_enum, value_name = "STATUS")]
    pub status: Vec<StatusFilter>,

    /// Category; an empty value matches uncategorised torrents (repeatable)
    #[arg(long = "category", value_name = "NAME")]
    pub category: Vec<String>,

    /// Tag; an empty value matches untagged torrents (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tag: Vec<String>,

    /// Tracker domain (repeatable)
    #[arg(long = "tracker", value_name = "DOMAIN")]
    pub tracker: Vec<String>,

    /// Search term; glob patterns match against the name
    #[arg(short = 's', long = "search", value_name = "TERM")]
    pub search: Option<String>,
}

/// Which torrents in scope are selected
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectArgs {
    /// Select every torrent matching the scope
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Select a torrent by hash (repeatable)
    #[arg(long = "select", value_name = "HASH", conflicts_with = "all")]
    pub select: Vec<String>,

    /// Leave a torrent out of --all (repeatable)
    #[arg(long = "exclude", value_name = "HASH", requires = "all")]
    pub exclude: Vec<String>,
}

/// Bulk actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ActionCommand {
    Pause,
    Resume,
    /// Remove torrents from the client
    Delete {
        /// Also delete downloaded data
        #[arg(long = "delete-files")]
        delete_files: bool,
    },
    Recheck,
    Reannounce,
    /// Add comma-separated tags
    AddTags { tags: String },
    /// Remove comma-separated tags
    RemoveTags { tags: String },
    /// Replace all tags with a comma-separated list
    SetTags { tags: String },
    /// Set the category (empty string clears it)
    SetCategory { name: String },
}

/// Column layout subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ColumnsCommand {
    /// Print the current layout
    Show,
    /// Hide a column
    Hide { column: String },
    /// Show a hidden column
    Unhide { column: String },
    /// Move a column to a position (0 = first)
    #[command(visible_alias = "mv")]
    Move { column: String, index: usize },
    /// Set the width of a column
    Resize { column: String, width: u16 },
    /// Restore the default layout
    Reset,
}

/// On/off switch
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl ScopeArgs {
    /// Filter context for these flags
    #[must_use]
    pub fn context(&self, default_instance: u32) -> FilterContext {
        FilterContext {
            instance_id: self.instance.unwrap_or(default_instance),
            filters: TorrentFilters {
                status: self.status.clone(),
                categories: self.category.clone(),
                tags: self.tag.clone(),
                trackers: self.tracker.clone(),
            },
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_string),
        }
    }
}

impl SelectArgs {
    /// Whether the flags select anything
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.all && self.select.is_empty()
    }
}

impl ActionCommand {
    /// Bulk action with parsed parameters
    #[must_use]
    pub fn to_action(&self) -> BulkAction {
        match self {
            Self::Pause => BulkAction::Pause,
            Self::Resume => BulkAction::Resume,
            Self::Delete { delete_files } => BulkAction::Delete {
                delete_files: *delete_files,
            },
            Self::Recheck => BulkAction::Recheck,
            Self::Reannounce => BulkAction::Reannounce,
            Self::AddTags { tags } => BulkAction::AddTags(parse_tags(tags)),
            Self::RemoveTags { tags } => BulkAction::RemoveTags(parse_tags(tags)),
            Self::SetTags { tags } => BulkAction::SetTags(parse_tags(tags)),
            Self::SetCategory { name } => BulkAction::SetCategory(name.trim().to_string()),
        }
    }
}

/// Sort field and order for `list` flags
#[must_use]
pub fn sort_for(sort: Option<SortField>, desc: bool) -> (SortField, SortOrder) {
    match sort {
        None => (SortField::default(), SortOrder::default()),
        Some(field) if desc => (field, SortOrder::Desc),
        Some(field) => (field, SortOrder::Asc),
    }
}
