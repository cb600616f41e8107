#[cfg(test)]
#[path = "snapshots_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use tokio::fs;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::PageSnapshot;

/// Reads the page snapshot, the local stand-in for server rendered session
/// state.
pub struct Snapshots {
    pub file_path: path::PathBuf,
}

impl Default for Snapshots {
    fn default() -> Snapshots {
        return Snapshots::new(path::PathBuf::from(Config::get(ConfigKey::SnapshotFile)));
    }
}

impl Snapshots {
    pub fn new(file_path: path::PathBuf) -> Snapshots {
        return Snapshots { file_path };
    }

    pub async fn load(&self) -> Result<PageSnapshot> {
        if !self.file_path.exists() {
            tracing::debug!(path = ?self.file_path, "No snapshot file, starting empty");
            return Ok(PageSnapshot::default());
        }

        let payload = fs::read_to_string(&self.file_path).await?;
        let snapshot: PageSnapshot = serde_yaml::from_str(&payload)?;

        return Ok(snapshot);
    }
}
