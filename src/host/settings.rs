//! Settings storage backends
//!
//! The real design tool keeps plugin settings in its own preference store.
//! `FileSettings` stands in for it outside the host: a flat JSON map under
//! the user data directory, written atomically. `MemorySettings` backs tests.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use super::SettingsStore;

/// JSON-file-backed settings map
pub struct FileSettings {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl FileSettings {
    /// Open the default store under the user's local data directory
    pub fn open() -> Result<Self> {
        Self::at(default_path()?)
    }

    /// Open a store at an explicit path
    pub fn at(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings at {}", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("settings file at {} is not valid JSON", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(entries).context("failed to serialize settings")?;

        // Write to a temp file then rename for atomicity
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json)
            .with_context(|| format!("failed to write settings to {}", tmp.display()))?;

        // The store holds the access token, keep it owner-readable only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&tmp, perms);
        }

        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to move settings into place at {}", self.path.display()))?;
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("settings store poisoned"))?;
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("settings store poisoned"))?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

fn default_path() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .context("could not determine data directory")?;
    Ok(base.join("vkdata").join("settings.json"))
}

/// In-memory settings map for tests and embedding hosts
#[derive(Default)]
pub struct MemorySettings {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("settings store poisoned"))?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("settings store poisoned"))?
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = FileSettings::at(path.clone()).unwrap();
        store.set("ACCESS_TOKEN", json!("abc123")).unwrap();
        store.set("USER_ID", json!("42")).unwrap();
        assert_eq!(store.get_str("ACCESS_TOKEN").as_deref(), Some("abc123"));

        // A fresh handle sees the persisted values
        let reopened = FileSettings::at(path).unwrap();
        assert_eq!(reopened.get_str("USER_ID").as_deref(), Some("42"));
    }

    #[test]
    fn remove_deletes_the_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettings::at(dir.path().join("settings.json")).unwrap();

        store.set("SCOPE_KEY", json!("offline,friends")).unwrap();
        store.remove("SCOPE_KEY").unwrap();
        assert!(store.get("SCOPE_KEY").is_none());

        // Removing an absent key is fine
        store.remove("SCOPE_KEY").unwrap();
    }

    #[test]
    fn memory_settings_behave_like_a_map() {
        let store = MemorySettings::new();
        assert!(store.get("missing").is_none());

        store.set("k", json!({"nested": true})).unwrap();
        assert_eq!(store.get("k"), Some(json!({"nested": true})));
        assert!(store.get_str("k").is_none());

        store.remove("k").unwrap();
        assert!(store.get("k").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn settings_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = FileSettings::at(path.clone()).unwrap();
        store.set("ACCESS_TOKEN", json!("secret")).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
