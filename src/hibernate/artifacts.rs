//! Managed config files and systemd units: write-if-changed, enable, remove.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::hibernate::Artifact;
use crate::system::executor;

/// Remove a file, treating absence as success.
pub async fn remove_path(path: &str) -> Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(anyhow!("Failed to remove {}: {}", path, e)),
    }
}

/// A config file whose contents this agent fully owns.
pub struct ManagedFile {
    name: &'static str,
    path: String,
    contents: String,
    mode: u32,
}

impl ManagedFile {
    pub fn new(name: &'static str, path: &str, contents: String) -> Self {
        Self {
            name,
            path: path.to_string(),
            contents,
            mode: 0o644,
        }
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Write the file unless it already carries exactly the wanted contents.
    /// Returns true when the file changed on disk.
    pub async fn write_if_changed(&self) -> Result<bool> {
        if let Ok(existing) = tokio::fs::read_to_string(&self.path).await {
            if existing == self.contents {
                debug!("{} already up to date", self.path);
                return Ok(false);
            }
        }

        if let Some(parent) = Path::new(&self.path).parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        tokio::fs::write(&self.path, &self.contents)
            .await
            .with_context(|| format!("Failed to write {}", self.path))?;

        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(self.mode))
                .await
                .with_context(|| format!("Failed to set permissions on {}", self.path))?;
        }

        debug!("Wrote {}", self.path);
        Ok(true)
    }

    pub async fn delete(&self) -> Result<bool> {
        remove_path(&self.path).await
    }
}

#[async_trait]
impl Artifact for ManagedFile {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn exists(&self) -> bool {
        Path::new(&self.path).exists()
    }

    async fn ensure(&self) -> Result<()> {
        self.write_if_changed().await.map(|_| ())
    }

    async fn remove(&self) -> Result<bool> {
        self.delete().await
    }
}

/// A systemd unit file that additionally gets enabled on install and
/// disabled on removal.
pub struct ManagedUnit {
    file: ManagedFile,
    unit: &'static str,
}

impl ManagedUnit {
    pub fn new(name: &'static str, path: &str, unit: &'static str, contents: String) -> Self {
        Self {
            file: ManagedFile::new(name, path, contents),
            unit,
        }
    }
}

#[async_trait]
impl Artifact for ManagedUnit {
    fn name(&self) -> &'static str {
        self.file.name()
    }

    async fn exists(&self) -> bool {
        self.file.exists().await
    }

    async fn ensure(&self) -> Result<()> {
        let changed = self.file.write_if_changed().await?;
        if changed {
            executor::daemon_reload().await;
        }
        if !executor::try_systemctl(&["enable", self.unit]).await {
            warn!("Failed to enable {} (run: systemctl enable {})", self.unit, self.unit);
        }
        Ok(())
    }

    async fn remove(&self) -> Result<bool> {
        // Disable first so the wants-links go away, then drop the unit file.
        executor::try_systemctl(&["disable", self.unit]).await;
        self.file.delete().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hibernado-test-{}-{}", name, uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn write_if_changed_creates_then_skips() {
        let path = temp_path("managed-file");
        let file = ManagedFile::new("test file", path.to_str().unwrap(), "hello\n".to_string());

        assert!(!file.exists().await);
        assert!(file.write_if_changed().await.unwrap());
        assert!(file.exists().await);

        // Identical contents: second run is a no-op.
        assert!(!file.write_if_changed().await.unwrap());

        let updated = ManagedFile::new("test file", path.to_str().unwrap(), "world\n".to_string());
        assert!(updated.write_if_changed().await.unwrap());
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "world\n");

        assert!(file.delete().await.unwrap());
    }

    #[tokio::test]
    async fn write_creates_missing_parent_dirs() {
        let dir = temp_path("managed-dir");
        let nested = dir.join("a/b/fragment.conf");
        let file = ManagedFile::new("nested file", nested.to_str().unwrap(), "x\n".to_string());

        assert!(file.write_if_changed().await.unwrap());
        assert!(nested.exists());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn delete_absent_is_not_an_error() {
        let path = temp_path("never-written");
        let file = ManagedFile::new("ghost", path.to_str().unwrap(), String::new());
        assert!(!file.delete().await.unwrap());
    }

    #[tokio::test]
    async fn with_mode_applies_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path("script");
        let file = ManagedFile::new("script", path.to_str().unwrap(), "#!/bin/bash\n".to_string())
            .with_mode(0o700);

        file.write_if_changed().await.unwrap();
        let mode = tokio::fs::metadata(&path).await.unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);

        file.delete().await.unwrap();
    }
}
