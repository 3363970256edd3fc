use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use essentials::{debug, info};
use serde_json::{Map, Value};

use crate::User;

pub const DEFAULT_KEY: &str = "swipe-quota.user";

/// User record persisted as a JSON blob under a fixed key of a local file.
///
/// The file is a JSON object so several keys can share it; keys this store does
/// not own are written back untouched. There is no locking between processes.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
    key: String,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_key(path, DEFAULT_KEY)
    }

    pub fn with_key(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<User>> {
        self.read()?
            .remove(&self.key)
            .map(|value| {
                serde_json::from_value(value)
                    .with_context(|| format!("Invalid user record under key: {}", self.key))
            })
            .transpose()
    }

    pub fn save(&self, user: &User) -> Result<()> {
        let mut entries = self.read()?;
        entries.insert(
            self.key.clone(),
            serde_json::to_value(user)
                .with_context(|| format!("Failed to serialize user: {}", user.id))?,
        );
        self.write(&entries)?;
        debug!(key = %self.key, user = %user.id, "Saved user record");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let mut entries = self.read()?;
        if entries.remove(&self.key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }

    /// Rewrites a legacy shaped record in the canonical shape.
    /// Returns whether the stored record changed.
    pub fn migrate(&self) -> Result<bool> {
        let mut entries = self.read()?;
        let Some(stored) = entries.get(&self.key).cloned() else {
            return Ok(false);
        };
        let user: User = serde_json::from_value(stored.clone())
            .with_context(|| format!("Invalid user record under key: {}", self.key))?;
        let canonical = serde_json::to_value(&user)
            .with_context(|| format!("Failed to serialize user: {}", user.id))?;
        if canonical == stored {
            return Ok(false);
        }
        entries.insert(self.key.clone(), canonical);
        self.write(&entries)?;
        info!(key = %self.key, user = %user.id, "Migrated legacy user record");
        Ok(true)
    }

    fn read(&self) -> Result<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read store: {}", self.path.display()))
            }
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&contents)
            .with_context(|| format!("Store is not a JSON object: {}", self.path.display()))
    }

    fn write(&self, entries: &Map<String, Value>) -> Result<()> {
        let contents = serde_json::to_string_pretty(entries)?;
        let temp = self.path.with_extension("tmp");
        fs::write(&temp, contents)
            .with_context(|| format!("Failed to write store: {}", temp.display()))?;
        fs::rename(&temp, &self.path)
            .with_context(|| format!("Failed to replace store: {}", self.path.display()))
    }
}
