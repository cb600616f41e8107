#[cfg(test)]
#[path = "workspace_test.rs"]
mod tests;

use std::fs::Permissions;
use std::path;

use anyhow::bail;
use anyhow::Result;
use tokio::fs;
use tokio::sync::Mutex;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::SourceFile;

/// The directory holding the team's editable files. Writable files are the
/// editable ones; read-only files are reference material.
pub struct Workspace {
    root: path::PathBuf,
    // Files made read-only by `lock`, with the permissions they had before.
    locked: Mutex<Vec<(path::PathBuf, Permissions)>>,
}

impl Default for Workspace {
    fn default() -> Workspace {
        return Workspace::new(path::PathBuf::from(Config::get(ConfigKey::Workspace)));
    }
}

fn relative_name(root: &path::Path, file_path: &path::Path) -> Result<String> {
    let res = file_path
        .strip_prefix(root)?
        .components()
        .map(|e| return e.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<String>>()
        .join("/");

    return Ok(res);
}

impl Workspace {
    pub fn new(root: path::PathBuf) -> Workspace {
        return Workspace {
            root,
            locked: Mutex::new(vec![]),
        };
    }

    /// Fails unless the root is an existing directory.
    pub async fn ensure_exists(&self) -> Result<()> {
        match fs::metadata(&self.root).await {
            Ok(metadata) if metadata.is_dir() => return Ok(()),
            _ => bail!(
                "Workspace directory '{}' does not exist, create it or pass --workspace",
                self.root.display()
            ),
        }
    }

    async fn editable_files(&self) -> Result<Vec<path::PathBuf>> {
        let mut res = vec![];
        let mut dirs = vec![self.root.clone()];

        while let Some(dir) = dirs.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                if entry.file_name().to_string_lossy().starts_with('.') {
                    continue;
                }

                let metadata = entry.metadata().await?;
                if metadata.is_dir() {
                    dirs.push(entry.path());
                } else if metadata.is_file() && !metadata.permissions().readonly() {
                    res.push(entry.path());
                }
            }
        }

        res.sort();
        return Ok(res);
    }

    /// Content of every editable file, with `/` separated names relative to
    /// the workspace root.
    pub async fn sources(&self) -> Result<Vec<SourceFile>> {
        let mut res = vec![];
        for file_path in self.editable_files().await? {
            let content = match fs::read_to_string(&file_path).await {
                Ok(content) => content,
                Err(err) => {
                    tracing::warn!(path = ?file_path, error = ?err, "Skipping unreadable source");
                    continue;
                }
            };

            res.push(SourceFile {
                filename: relative_name(&self.root, &file_path)?,
                content,
            });
        }

        return Ok(res);
    }

    /// Makes every editable file read-only. Returns how many were changed.
    /// Files changed before a failure stay recorded, so `unlock` can still
    /// restore them.
    pub async fn lock(&self) -> Result<usize> {
        let files = self.editable_files().await?;
        let mut locked = self.locked.lock().await;
        for file_path in &files {
            let original = fs::metadata(file_path).await?.permissions();
            let mut permissions = original.clone();
            permissions.set_readonly(true);
            fs::set_permissions(file_path, permissions).await?;
            locked.push((file_path.clone(), original));
        }

        tracing::info!(files = files.len(), "Workspace locked");
        return Ok(files.len());
    }

    /// Gives back write access to the files this workspace locked, and only
    /// those. Returns how many were restored.
    pub async fn unlock(&self) -> Result<usize> {
        let mut locked = self.locked.lock().await;
        let mut restored = 0;
        while let Some((file_path, permissions)) = locked.pop() {
            match fs::set_permissions(&file_path, permissions).await {
                Ok(()) => restored += 1,
                Err(err) => {
                    tracing::warn!(path = ?file_path, error = ?err, "Unable to unlock source");
                }
            }
        }

        if restored > 0 {
            tracing::info!(files = restored, "Workspace unlocked");
        }
        return Ok(restored);
    }
}
