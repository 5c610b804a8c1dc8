//! Bulk action payload
//!
//! `BulkActionRequest` is the JSON body sent to the bulk action endpoint. In
//! explicit mode it carries the hashes; in select-all mode it carries the
//! filter context and exclusions instead, and the server resolves the set.
//!
//! ```text
//! { "hashes": [], "selectAll": true, "excludeHashes": ["..."],
//!   "search": "...", "filters": { ... }, "action": "delete",
//!   "deleteFiles": false }
//! ```

use super::ActionTargets;
use crate::torrents::TorrentFilters;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when reading a request back into an action
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// A parameter required by the action is absent
    #[error("Action '{action}' requires '{parameter}'")]
    MissingParameter {
        action: &'static str,
        parameter: &'static str,
    },

    /// Neither hashes nor select-all were given
    #[error("Request does not target any torrents")]
    NoTargets,

    /// Exclusions only make sense with select-all
    #[error("excludeHashes is only valid together with selectAll")]
    ExclusionsWithoutSelectAll,
}

/// Wire name of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Pause,
    Resume,
    Delete,
    Recheck,
    Reannounce,
    AddTags,
    RemoveTags,
    SetTags,
    SetCategory,
}

/// An action together with its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    Pause,
    Resume,
    /// Remove torrents, optionally with their data
    Delete {
        delete_files: bool,
    },
    Recheck,
    Reannounce,
    AddTags(Vec<String>),
    RemoveTags(Vec<String>),
    /// Replace all tags
    SetTags(Vec<String>),
    /// Empty string clears the category
    SetCategory(String),
}

/// JSON body of a bulk action call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkActionRequest {
    /// Explicit targets (empty when `select_all` is set)
    #[serde(default)]
    pub hashes: Vec<String>,

    #[serde(default)]
    pub select_all: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_hashes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<TorrentFilters>,

    pub action: ActionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_files: Option<bool>,

    /// Comma-separated tag list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ActionKind {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Delete => "delete",
            Self::Recheck => "recheck",
            Self::Reannounce => "reannounce",
            Self::AddTags => "addTags",
            Self::RemoveTags => "removeTags",
            Self::SetTags => "setTags",
            Self::SetCategory => "setCategory",
        }
    }
}

impl BulkAction {
    /// Wire kind of this action
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Pause => ActionKind::Pause,
            Self::Resume => ActionKind::Resume,
            Self::Delete { .. } => ActionKind::Delete,
            Self::Recheck => ActionKind::Recheck,
            Self::Reannounce => ActionKind::Reannounce,
            Self::AddTags(_) => ActionKind::AddTags,
            Self::RemoveTags(_) => ActionKind::RemoveTags,
            Self::SetTags(_) => ActionKind::SetTags,
            Self::SetCategory(_) => ActionKind::SetCategory,
        }
    }

    /// Whether the action removes rows from the list
    #[must_use]
    pub const fn is_destructive(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }

    /// Human readable description
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Pause => "pause".to_string(),
            Self::Resume => "resume".to_string(),
            Self::Delete { delete_files: true } => "delete (with files)".to_string(),
            Self::Delete { delete_files: false } => "delete".to_string(),
            Self::Recheck => "recheck".to_string(),
            Self::Reannounce => "reannounce".to_string(),
            Self::AddTags(tags) => format!("add tags: {}", tags.join(", ")),
            Self::RemoveTags(tags) => format!("remove tags: {}", tags.join(", ")),
            Self::SetTags(tags) => format!("set tags: {}", tags.join(", ")),
            Self::SetCategory(category) if category.is_empty() => "clear category".to_string(),
            Self::SetCategory(category) => format!("set category: {category}"),
        }
    }
}

impl BulkActionRequest {
    /// Build the payload for an action on resolved targets
    #[must_use]
    pub fn new(targets: &ActionTargets, action: &BulkAction) -> Self {
        let (hashes, select_all, exclude_hashes, search, filters) = match targets {
            ActionTargets::Hashes(hashes) => (hashes.clone(), false, Vec::new(), None, None),
            ActionTargets::AllMatching {
                context,
                exclude_hashes,
            } => (
                Vec::new(),
                true,
                exclude_hashes.clone(),
                context.active_search().map(str::to_string),
                (!context.filters.is_empty()).then(|| context.filters.clone()),
            ),
        };

        let mut request = Self {
            hashes,
            select_all,
            exclude_hashes,
            search,
            filters,
            action: action.kind(),
            delete_files: None,
            tags: None,
            category: None,
        };

        match action {
            BulkAction::Delete { delete_files } => request.delete_files = Some(*delete_files),
            BulkAction::AddTags(tags) | BulkAction::RemoveTags(tags) | BulkAction::SetTags(tags) => {
                request.tags = Some(tags.join(","));
            }
            BulkAction::SetCategory(category) => request.category = Some(category.clone()),
            BulkAction::Pause | BulkAction::Resume | BulkAction::Recheck | BulkAction::Reannounce => {}
        }

        request
    }

    /// Number of explicit hashes, or `None` when the server resolves the set
    #[must_use]
    pub fn target_count_hint(&self) -> Option<usize> {
        (!self.select_all).then_some(self.hashes.len())
    }

    /// Check that the request targets something
    ///
    /// # Errors
    ///
    /// Returns `RequestError` if no hashes are given without select-all, or if
    /// exclusions are given without select-all.
    pub fn validate(&self) -> Result<(), RequestError> {
        if !self.select_all {
            if self.hashes.is_empty() {
                return Err(RequestError::NoTargets);
            }
            if !self.exclude_hashes.is_empty() {
                return Err(RequestError::ExclusionsWithoutSelectAll);
            }
        }
        Ok(())
    }

    /// Read the action and its parameters back from the payload
    ///
    /// # Errors
    ///
    /// Returns `RequestError::MissingParameter` if a parameterised action
    /// lacks its parameter.
    pub fn action(&self) -> Result<BulkAction, RequestError> {
        let kind = self.action;
        let tags = || {
            self.tags
                .as_deref()
                .map(parse_tags)
                .ok_or(RequestError::MissingParameter {
                    action: kind.as_str(),
                    parameter: "tags",
                })
        };

        Ok(match kind {
            ActionKind::Pause => BulkAction::Pause,
            ActionKind::Resume => BulkAction::Resume,
            ActionKind::Delete => BulkAction::Delete {
                delete_files: self.delete_files.unwrap_or(false),
            },
            ActionKind::Recheck => BulkAction::Recheck,
            ActionKind::Reannounce => BulkAction::Reannounce,
            ActionKind::AddTags => BulkAction::AddTags(tags()?),
            ActionKind::RemoveTags => BulkAction::RemoveTags(tags()?),
            ActionKind::SetTags => BulkAction::SetTags(tags()?),
            ActionKind::SetCategory => BulkAction::SetCategory(self.category.clone().ok_or(
                RequestError::MissingParameter {
                    action: kind.as_str(),
                    parameter: "category",
                },
            )?),
        })
    }
}

/// Split a comma-separated tag list, dropping blanks
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
