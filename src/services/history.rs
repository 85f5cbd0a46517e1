//! Root item history.
//!
//! Records when each root item was last used so the root list can show the
//! most recently used entries first. The store is a flat JSON object mapping
//! item id to a unix timestamp.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

/// Last-used timestamps with persistence.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    /// Map of root item id to unix timestamp of last use.
    entries: HashMap<String, u64>,

    /// Path to the data file.
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl History {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location of the history file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|p| p.join("sunbeam").join("history.json"))
    }

    /// Load history from `path`.
    ///
    /// Returns empty history if the file doesn't exist or is corrupted.
    pub fn load(path: &Path) -> Self {
        let mut history = if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                    warn!(path = %path.display(), error = %e, "ignoring corrupt history");
                    Self::default()
                }),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read history");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        history.path = Some(path.to_path_buf());
        history
    }

    /// Unix timestamp of the last use, if any.
    pub fn last_used(&self, id: &str) -> Option<u64> {
        self.entries.get(id).copied()
    }

    /// Record that an item was used now, and persist.
    pub fn touch(&mut self, id: &str) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.touch_at(id, now);
    }

    pub fn touch_at(&mut self, id: &str, timestamp: u64) {
        self.entries.insert(id.to_string(), timestamp);
        self.save();
    }

    /// Most recently used first; never-used items compare equal.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.last_used(b)
            .unwrap_or(0)
            .cmp(&self.last_used(a).unwrap_or(0))
    }

    /// Save data to disk.
    pub fn save(&self) {
        let Some(ref path) = self.path else {
            return;
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "failed to create history directory");
                return;
            }
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    warn!(path = %path.display(), error = %e, "failed to write history");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize history"),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
