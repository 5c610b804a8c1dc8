//! View settings data structures
//!
//! - `Column`: columns of the torrent table
//! - `ColumnLayout`: persisted order, visibility and widths
//! - `ViewSettings`: everything a view persists for one scope
//!
//! Column ids are stored as strings so a settings file written by a newer
//! version with extra columns still loads; unknown ids are ignored.

use super::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Narrowest width a column can be resized to
pub const MIN_COLUMN_WIDTH: u16 = 4;

/// Column of the torrent table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    Size,
    State,
    Seeds,
    Ratio,
    Age,
    EconomyScore,
    Dedup,
    Category,
    Tags,
    Tracker,
}

/// Persisted column order, visibility and widths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    /// Column ids in display order (may be partial)
    #[serde(default)]
    pub order: Vec<String>,

    /// Hidden column ids
    #[serde(default = "default_hidden")]
    pub hidden: Vec<String>,

    /// Width overrides by column id
    #[serde(default)]
    pub widths: BTreeMap<String, u16>,
}

/// Settings persisted for one view scope
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewSettings {
    #[serde(default)]
    pub columns: ColumnLayout,

    /// Replace torrent names with stable placeholders in output
    #[serde(default)]
    pub incognito: bool,

    /// Whether the filter sidebar is collapsed
    #[serde(default)]
    pub filters_collapsed: bool,
}

impl Column {
    /// All columns in default order
    pub const ALL: [Self; 11] = [
        Self::Name,
        Self::Size,
        Self::State,
        Self::Seeds,
        Self::Ratio,
        Self::Age,
        Self::EconomyScore,
        Self::Dedup,
        Self::Category,
        Self::Tags,
        Self::Tracker,
    ];

    /// Stable id used in settings files and on the command line
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Size => "size",
            Self::State => "state",
            Self::Seeds => "seeds",
            Self::Ratio => "ratio",
            Self::Age => "age",
            Self::EconomyScore => "score",
            Self::Dedup => "dedup",
            Self::Category => "category",
            Self::Tags => "tags",
            Self::Tracker => "tracker",
        }
    }

    /// Header title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Size => "Size",
            Self::State => "State",
            Self::Seeds => "Seeds",
            Self::Ratio => "Ratio",
            Self::Age => "Age",
            Self::EconomyScore => "Score",
            Self::Dedup => "Dedup",
            Self::Category => "Category",
            Self::Tags => "Tags",
            Self::Tracker => "Tracker",
        }
    }

    /// Width used when no override is stored
    #[must_use]
    pub const fn default_width(self) -> u16 {
        match self {
            Self::Name => 40,
            Self::Size | Self::State => 12,
            Self::Seeds | Self::Ratio | Self::Age | Self::EconomyScore | Self::Dedup => 7,
            Self::Category => 12,
            Self::Tags | Self::Tracker => 20,
        }
    }

    /// Hidden unless the user turns them on
    #[must_use]
    pub const fn hidden_by_default(self) -> bool {
        matches!(self, Self::Tracker | Self::Dedup)
    }

    /// Look up a column by id
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.id() == id)
    }

    /// Look up a column by id, failing on unknown ids
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::UnknownColumn` if no column has this id.
    pub fn parse(id: &str) -> Result<Self, SettingsError> {
        Self::from_id(id).ok_or_else(|| SettingsError::UnknownColumn(id.to_string()))
    }
}

impl ColumnLayout {
    /// All columns in display order, hidden ones included
    ///
    /// Persisted ids come first; unknown or duplicate ids are skipped and
    /// columns missing from the persisted order are appended in default order.
    #[must_use]
    pub fn ordered(&self) -> Vec<Column> {
        let mut columns: Vec<Column> = Vec::with_capacity(Column::ALL.len());
        for column in self.order.iter().filter_map(|id| Column::from_id(id)) {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        for column in Column::ALL {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        columns
    }

    /// Whether a column is shown
    #[must_use]
    pub fn is_visible(&self, column: Column) -> bool {
        !self.hidden.iter().any(|id| id == column.id())
    }

    /// Columns to render, in order
    #[must_use]
    pub fn visible_columns(&self) -> Vec<Column> {
        self.ordered()
            .into_iter()
            .filter(|column| self.is_visible(*column))
            .collect()
    }

    /// Show or hide a column
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::LockedColumn` when hiding the name column.
    pub fn set_visible(&mut self, column: Column, visible: bool) -> Result<(), SettingsError> {
        if column == Column::Name && !visible {
            return Err(SettingsError::LockedColumn(column.id()));
        }

        self.hidden.retain(|id| id != column.id());
        if !visible {
            self.hidden.push(column.id().to_string());
        }
        Ok(())
    }

    /// Move a column to a position in the full order (clamped)
    pub fn move_column(&mut self, column: Column, index: usize) {
        let mut columns = self.ordered();
        columns.retain(|c| *c != column);
        let index = index.min(columns.len());
        columns.insert(index, column);
        self.order = columns.iter().map(|c| c.id().to_string()).collect();
    }

    /// Set a width override (clamped to `MIN_COLUMN_WIDTH`)
    pub fn resize(&mut self, column: Column, width: u16) {
        self.widths
            .insert(column.id().to_string(), width.max(MIN_COLUMN_WIDTH));
    }

    /// Effective width of a column
    #[must_use]
    pub fn width(&self, column: Column) -> u16 {
        self.widths
            .get(column.id())
            .copied()
            .unwrap_or_else(|| column.default_width())
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            hidden: default_hidden(),
            widths: BTreeMap::new(),
        }
    }
}

fn default_hidden() -> Vec<String> {
    Column::ALL
        .into_iter()
        .filter(|column| column.hidden_by_default())
        .map(|column| column.id().to_string())
        .collect()
}
