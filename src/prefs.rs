//! Persisted bypass preference
//!
//! A single boolean survives process restarts in a small TOML state file
//! under the per-user config directory. Last-writer-wins; the daemon is the
//! sole writer apart from explicit CLI toggles run by the same user, so no
//! concurrent-writer protection is needed.

use color_eyre::eyre::{Context, ContextCompat, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Read/write capability for the bypass flag, injected into the reconciler
/// so tests can substitute an in-memory store.
pub trait PreferenceStore {
    /// Current bypass value; `false` if never set.
    fn bypass(&self) -> bool;

    /// Persist a new bypass value.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn set_bypass(&self, value: bool) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    bypass: bool,
}

/// TOML-file-backed store
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    /// Store at the well-known per-user path
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined.
    pub fn open_default() -> Result<Self> {
        let dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("dacbridge");
        Ok(Self {
            path: dir.join("state.toml"),
        })
    }

    /// Store at an explicit path (used by tests)
    #[must_use]
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn bypass(&self) -> bool {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            // Never set: default off (mixed mode).
            return false;
        };
        match toml::from_str::<StateFile>(&contents) {
            Ok(state) => state.bypass,
            Err(e) => {
                warn!("unreadable state file {:?}: {e}", self.path);
                false
            }
        }
    }

    fn set_bypass(&self, value: bool) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create state dir: {parent:?}"))?;
        }
        let contents = toml::to_string(&StateFile { bypass: value })
            .context("Failed to serialize state")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write state file: {:?}", self.path))?;
        Ok(())
    }
}
