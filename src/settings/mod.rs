//! Scoped, persisted view settings
//!
//! Each view owns a named scope ("torrents", "cross-seed", ...). Settings are
//! read once when the view mounts and written back whenever they change; no
//! view reaches for another view's settings.

pub mod error;
pub mod types;

pub use error::SettingsError;
pub use types::{Column, ColumnLayout, MIN_COLUMN_WIDTH, ViewSettings};

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings result type
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Storage for per-scope view settings
pub trait SettingsStore {
    /// Load the settings of a scope, falling back to defaults
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the scope name is invalid or stored data
    /// cannot be read.
    fn load(&self, scope: &str) -> Result<ViewSettings>;

    /// Persist the settings of a scope
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the scope name is invalid or the data
    /// cannot be written.
    fn save(&self, scope: &str, settings: &ViewSettings) -> Result<()>;
}

/// Check that a scope name is usable as a file stem
///
/// # Errors
///
/// Returns `SettingsError::InvalidScope` for empty names or names with
/// characters outside `[A-Za-z0-9_-]`.
pub fn validate_scope(scope: &str) -> Result<()> {
    let valid = !scope.is_empty()
        && scope
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(SettingsError::InvalidScope(scope.to_string()))
    }
}

/// One TOML file per scope inside a directory
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    dir: PathBuf,
}

impl FileSettingsStore {
    /// Store settings under `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted in the user's config directory
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::NoSettingsDir` if the config directory cannot
    /// be determined.
    pub fn default_location() -> Result<Self> {
        let config_dir = dirs::config_dir().ok_or(SettingsError::NoSettingsDir)?;
        Ok(Self::new(config_dir.join("qui-select").join("views")))
    }

    /// Directory holding the scope files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a scope
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidScope` if the scope name is invalid.
    pub fn path_for(&self, scope: &str) -> Result<PathBuf> {
        validate_scope(scope)?;
        Ok(self.dir.join(format!("{scope}.toml")))
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self, scope: &str) -> Result<ViewSettings> {
        let path = self.path_for(scope)?;
        if !path.exists() {
            debug!("no stored settings for scope '{scope}', using defaults");
            return Ok(ViewSettings::default());
        }

        let contents = fs::read_to_string(&path)?;
        let settings = toml::from_str(&contents)?;
        debug!("loaded settings for scope '{scope}' from {}", path.display());
        Ok(settings)
    }

    fn save(&self, scope: &str, settings: &ViewSettings) -> Result<()> {
        let path = self.path_for(scope)?;
        fs::create_dir_all(&self.dir)?;

        let contents = toml::to_string_pretty(settings)?;
        fs::write(&path, contents)?;
        debug!("saved settings for scope '{scope}'");
        Ok(())
    }
}

/// In-memory store for tests and embedding
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    scopes: RefCell<HashMap<String, ViewSettings>>,
    saves: Cell<usize>,
}

impl MemorySettingsStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self, scope: &str) -> Result<ViewSettings> {
        validate_scope(scope)?;
        Ok(self.scopes.borrow().get(scope).cloned().unwrap_or_default())
    }

    fn save(&self, scope: &str, settings: &ViewSettings) -> Result<()> {
        validate_scope(scope)?;
        self.scopes
            .borrow_mut()
            .insert(scope.to_string(), settings.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_scope() {
        assert!(validate_scope("torrents").is_ok());
        assert!(validate_scope("cross-seed_2").is_ok());
        assert!(matches!(validate_scope(""), Err(SettingsError::InvalidScope(_))));
        assert!(matches!(
            validate_scope("../escape"),
            Err(SettingsError::InvalidScope(_))
        ));
    }

    #[test]
    fn test_file_store_missing_scope_loads_defaults() {
        let temp = TempDir::new().unwrap();
        let store = FileSettingsStore::new(temp.path());

        let settings = store.load("torrents").unwrap();
        assert_eq!(settings, ViewSettings::default());
        assert!(!store.path_for("torrents").unwrap().exists());
    }

    #[test]
    fn test_file_store_persists_per_scope() {
        let temp = TempDir::new().unwrap();
        let store = FileSettingsStore::new(temp.path().join("views"));

        let mut settings = ViewSettings::default();
        settings.incognito = true;
        settings.columns.move_column(Column::Ratio, 0);
        settings.columns.resize(Column::Name, 55);
        store.save("torrents", &settings).unwrap();

        let reloaded = FileSettingsStore::new(store.dir().to_path_buf());
        assert_eq!(reloaded.load("torrents").unwrap(), settings);
        assert_eq!(reloaded.load("economy").unwrap(), ViewSettings::default());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let store = FileSettingsStore::new(temp.path());
        fs::write(store.path_for("torrents").unwrap(), "incognito = \"maybe\"").unwrap();

        assert!(matches!(
            store.load("torrents"),
            Err(SettingsError::Serialization(_))
        ));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let store = FileSettingsStore::new(temp.path());
        fs::write(store.path_for("torrents").unwrap(), "incognito = true\n").unwrap();

        let settings = store.load("torrents").unwrap();
        assert!(settings.incognito);
        assert_eq!(settings.columns, ColumnLayout::default());
        assert!(!settings.columns.is_visible(Column::Tracker));
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let store = MemorySettingsStore::new();
        assert_eq!(store.load("torrents").unwrap(), ViewSettings::default());

        let settings = ViewSettings {
            filters_collapsed: true,
            ..ViewSettings::default()
        };
        store.save("torrents", &settings).unwrap();
        store.save("torrents", &settings).unwrap();

        assert_eq!(store.save_count(), 2);
        assert!(store.load("torrents").unwrap().filters_collapsed);
    }
}
