//! Named string settings (`get` / `set`), used by the addon banner and
//! cache-conflict helpers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use nb_domain::error::{Error, Result};

pub trait SettingsStore: Send + Sync {
    fn get(&self, name: &str) -> Result<Option<String>>;
    fn set(&self, name: &str, value: &str) -> Result<()>;
}

#[derive(Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.values.read().get(name).cloned())
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        self.values.write().insert(name.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Settings persisted as one JSON object at `<state_path>/settings.json`,
/// rewritten on every `set`.
pub struct JsonSettings {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl JsonSettings {
    pub fn open(state_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(state_path).map_err(Error::Io)?;

        let path = state_path.join("settings.json");
        let values = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(Error::Io)?;
            match serde_json::from_str(&raw) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "settings file unreadable, starting empty"
                    );
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        tracing::info!(
            settings = values.len(),
            path = %path.display(),
            "settings loaded"
        );

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }
}

impl SettingsStore for JsonSettings {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.values.read().get(name).cloned())
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        let mut values = self.values.write();
        let previous = values.insert(name.to_owned(), value.to_owned());
        let json = serde_json::to_string_pretty(&*values)
            .map_err(|e| Error::Other(format!("serializing settings: {e}")))?;
        if let Err(e) = std::fs::write(&self.path, json) {
            // Keep memory and disk in agreement.
            match previous {
                Some(p) => values.insert(name.to_owned(), p),
                None => values.remove(name),
            };
            return Err(Error::Io(e));
        }
        Ok(())
    }
}
