//! In-memory backend over a JSON snapshot
//!
//! Holds the torrents of one or more instances and answers list and bulk
//! action calls against them. Select-all requests are resolved here, at
//! action time, against whatever the snapshot contains then; a client-side
//! total that went stale in the meantime does not matter.

use super::{BackendError, BulkActionResponse, Result, TorrentClient};
use crate::selection::{BulkAction, BulkActionRequest};
use crate::torrents::{FilterContext, ListQuery, Torrent, TorrentPage, run_query};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Serialised snapshot file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub instances: Vec<InstanceSnapshot>,
}

/// Torrents of one backend instance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstanceSnapshot {
    pub id: u32,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub torrents: Vec<Torrent>,
}

/// Local `TorrentClient` backed by a snapshot
///
/// Calls run to completion on one thread, so interior mutability through a
/// `RefCell` is enough.
#[derive(Debug, Default)]
pub struct SnapshotBackend {
    snapshot: RefCell<Snapshot>,
}

impl Snapshot {
    fn instance(&self, id: u32) -> Result<&InstanceSnapshot> {
        self.instances
            .iter()
            .find(|instance| instance.id == id)
            .ok_or(BackendError::UnknownInstance(id))
    }

    fn instance_mut(&mut self, id: u32) -> Result<&mut InstanceSnapshot> {
        self.instances
            .iter_mut()
            .find(|instance| instance.id == id)
            .ok_or(BackendError::UnknownInstance(id))
    }
}

impl SnapshotBackend {
    /// Wrap an in-memory snapshot
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RefCell::new(snapshot),
        }
    }

    /// Read a snapshot file
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        let snapshot: Snapshot = serde_json::from_slice(&data)?;
        debug!(
            "loaded snapshot {} with {} instance(s)",
            path.display(),
            snapshot.instances.len()
        );
        Ok(Self::new(snapshot))
    }

    /// Write the current state back to a snapshot file
    ///
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_vec_pretty(&*self.snapshot.borrow())?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    /// All torrents of an instance
    ///
    /// # Errors
    ///
    /// Returns `BackendError::UnknownInstance` if the instance doesn't exist.
    pub fn torrents(&self, instance_id: u32) -> Result<Vec<Torrent>> {
        Ok(self.snapshot.borrow().instance(instance_id)?.torrents.clone())
    }

    /// Insert or replace a torrent, creating the instance when needed
    pub fn upsert_torrent(&self, instance_id: u32, torrent: Torrent) {
        let mut snapshot = self.snapshot.borrow_mut();
        let instance = if let Some(index) = snapshot
            .instances
            .iter()
            .position(|instance| instance.id == instance_id)
        {
            &mut snapshot.instances[index]
        } else {
            snapshot.instances.push(InstanceSnapshot {
                id: instance_id,
                ..InstanceSnapshot::default()
            });
            let last = snapshot.instances.len() - 1;
            &mut snapshot.instances[last]
        };

        match instance.torrents.iter_mut().find(|t| t.hash == torrent.hash) {
            Some(existing) => *existing = torrent,
            None => instance.torrents.push(torrent),
        }
    }

    /// Resolve the hashes a request applies to
    ///
    /// Explicit hashes unknown to the instance are skipped. Select-all
    /// requests match the filters and search in the request, minus the
    /// exclusions.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the request is invalid or the instance is
    /// unknown.
    pub fn resolve_targets(
        &self,
        instance_id: u32,
        request: &BulkActionRequest,
    ) -> Result<Vec<String>> {
        request.validate()?;

        let snapshot = self.snapshot.borrow();
        let instance = snapshot.instance(instance_id)?;

        let hashes = if request.select_all {
            let context = FilterContext {
                instance_id,
                filters: request.filters.clone().unwrap_or_default(),
                search: request.search.clone(),
            };
            let excluded: HashSet<&str> =
                request.exclude_hashes.iter().map(String::as_str).collect();

            instance
                .torrents
                .iter()
                .filter(|t| context.matches(t) && !excluded.contains(t.hash.as_str()))
                .map(|t| t.hash.clone())
                .collect()
        } else {
            let requested: HashSet<&str> = request.hashes.iter().map(String::as_str).collect();
            instance
                .torrents
                .iter()
                .filter(|t| requested.contains(t.hash.as_str()))
                .map(|t| t.hash.clone())
                .collect()
        };

        Ok(hashes)
    }
}

impl TorrentClient for SnapshotBackend {
    fn list(&self, query: &ListQuery) -> Result<TorrentPage> {
        let snapshot = self.snapshot.borrow();
        let instance = snapshot.instance(query.context.instance_id)?;
        Ok(run_query(&instance.torrents, query))
    }

    fn bulk_action(
        &self,
        instance_id: u32,
        request: &BulkActionRequest,
    ) -> Result<BulkActionResponse> {
        let action = request.action()?;
        let targets = self.resolve_targets(instance_id, request)?;
        let target_set: HashSet<&str> = targets.iter().map(String::as_str).collect();

        let mut snapshot = self.snapshot.borrow_mut();
        let instance = snapshot.instance_mut(instance_id)?;

        if let BulkAction::Delete { .. } = action {
            instance
                .torrents
                .retain(|t| !target_set.contains(t.hash.as_str()));
        } else {
            for torrent in instance
                .torrents
                .iter_mut()
                .filter(|t| target_set.contains(t.hash.as_str()))
            {
                apply_action(torrent, &action);
            }
        }

        info!(
            "{} applied to {} torrent(s) on instance {}",
            action.kind().as_str(),
            targets.len(),
            instance_id
        );

        Ok(BulkActionResponse {
            affected: targets.len(),
        })
    }
}

/// Apply a non-destructive action to one torrent
fn apply_action(torrent: &mut Torrent, action: &BulkAction) {
    match action {
        BulkAction::Pause => torrent.pause(),
        BulkAction::Resume => torrent.resume(),
        BulkAction::Recheck => torrent.recheck(),
        BulkAction::AddTags(tags) => {
            for tag in tags {
                if !torrent.tags.contains(tag) {
                    torrent.tags.push(tag.clone());
                }
            }
        }
        BulkAction::RemoveTags(tags) => torrent.tags.retain(|tag| !tags.contains(tag)),
        BulkAction::SetTags(tags) => torrent.tags.clone_from(tags),
        BulkAction::SetCategory(category) => torrent.category.clone_from(category),
        BulkAction::Reannounce | BulkAction::Delete { .. } => {}
    }
}
