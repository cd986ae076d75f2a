use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

/// What a successful login leaves behind for later `play` runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub address: String,
}

/// Lives in the temp dir so a reboot forgets it.
pub fn state_dir() -> PathBuf {
    std::env::temp_dir().join("nimmt")
}

pub fn default_path() -> PathBuf {
    state_dir().join("session.json")
}

impl Session {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            bail!("No saved session found, please login first");
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read session file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("session file {} is corrupt", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)
            .with_context(|| format!("failed to write session file {}", path.display()))?;
        log::debug!("Session saved to {}", path.display());
        Ok(())
    }
}
