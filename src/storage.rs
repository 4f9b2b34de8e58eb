//! Persisted front-end state
//!
//! Remembers the last `.kbi` file opened. Storage is best-effort: every
//! failure is logged and swallowed, and a failed read looks like "nothing
//! stored".

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Default, Serialize, Deserialize)]
struct State {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_file_path: Option<String>,
}

/// Key-value state kept in a small TOML file
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Default for Storage {
    fn default() -> Self {
        Self::with_path(Self::default_path())
    }
}

impl Storage {
    /// `$XDG_DATA_HOME/keybard/state.toml`
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keybard")
            .join("state.toml")
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_last_file_path(&self) -> Option<String> {
        match self.read() {
            Ok(state) => state.last_file_path,
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn set_last_file_path(&self, path: &str) {
        let result = self.read().and_then(|mut state| {
            state.last_file_path = Some(path.to_string());
            self.write(&state)
        });
        if let Err(e) = result {
            warn!("Failed to save file path: {}", e);
        }
    }

    pub fn clear_last_file_path(&self) {
        let result = self.read().and_then(|mut state| {
            state.last_file_path = None;
            self.write(&state)
        });
        if let Err(e) = result {
            warn!("Failed to clear file path: {}", e);
        }
    }

    fn read(&self) -> anyhow::Result<State> {
        if !self.path.exists() {
            return Ok(State::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn write(&self, state: &State) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(state)?)?;
        Ok(())
    }
}
