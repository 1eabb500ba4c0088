//! Volume browsing facade
//!
//! A [`Client`] talks to the container runtime's API; a [`Volume`]
//! resolves a named volume to its on-disk mount path and performs
//! filesystem operations against it, including the tree copies.

mod writable;

pub use writable::WritableVolume;

use crate::api::{Transport, VolumeInfo};
use crate::config::{ClientConfig, CopyConfig, Platform};
use crate::core::{CopyEngine, CopyReport};
use crate::error::{Result, VolcpError};
use crate::fs::{self, DirectoryEntry, PathStat, TreeWalker};
use crate::progress::ProgressSink;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Entry point: a configured connection to the container runtime
#[derive(Debug, Clone)]
pub struct Client {
    transport: Transport,
    platform: Platform,
}

impl Client {
    /// Create a client, validating the configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let platform = config.platform()?;
        let transport = Transport::from_config(&config)?;
        Ok(Self {
            transport,
            platform,
        })
    }

    /// Check that the runtime API is reachable
    pub async fn ping(&self) -> Result<()> {
        self.transport.ping().await
    }

    /// Get a handle on a named volume
    pub fn volume(&self, name: impl Into<String>) -> Volume {
        Volume {
            transport: self.transport.clone(),
            name: name.into(),
            platform: self.platform,
            copy_config: CopyConfig::default(),
        }
    }
}

/// A named volume exposed through its host mount path
#[derive(Debug, Clone)]
pub struct Volume {
    transport: Transport,
    name: String,
    platform: Platform,
    copy_config: CopyConfig,
}

impl Volume {
    /// Volume name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the copy options used by `copy_dir_*`
    pub fn with_copy_config(mut self, config: CopyConfig) -> Self {
        self.copy_config = config;
        self
    }

    /// Fetch the volume's description from the runtime
    pub async fn inspect(&self) -> Result<VolumeInfo> {
        self.transport
            .get_json(&format!("/volumes/{}", self.name))
            .await
    }

    /// Resolve where the volume's data lives on the host machine.
    ///
    /// The runtime reports the mount point within its own filesystem
    /// namespace; the last two components (volume name and `_data`) are
    /// re-rooted under the platform's volume base directory.
    pub async fn local_path(&self) -> Result<PathBuf> {
        let info = self.inspect().await?;
        mount_local_path(&info.mountpoint, self.platform)
    }

    /// List files and directories at `path` within the volume (`""` or
    /// `"/"` for the volume root)
    pub async fn read_dir(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        let target = self.resolve(path).await?;
        TreeWalker::list(&target)
    }

    /// Read a file's contents from the volume
    pub async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let target = self.resolve(path).await?;
        fs::read_file(&target)
    }

    /// Stat a path within the volume
    pub async fn stat(&self, path: &str) -> Result<PathStat> {
        let target = self.resolve(path).await?;
        fs::stat(&target)
    }

    /// Copy a single file out of the volume to a host destination
    pub async fn copy_file(&self, source: &str, destination: &Path) -> Result<u64> {
        let src = self.resolve(source).await?;
        fs::copy_file_bytes(&src, destination, self.copy_config.overwrite)
    }

    /// Copy a directory subtree out of the volume, blocking until the
    /// whole tree is copied or the first error
    pub async fn copy_dir_blocking(&self, source: &str, destination: &Path) -> Result<CopyReport> {
        let src = self.resolve(source).await?;
        let engine = CopyEngine::new(self.copy_config.clone());
        engine.copy_tree_blocking(&src, destination)
    }

    /// Copy a directory subtree out of the volume with concurrent fan-out,
    /// reporting progress to `sink`
    pub async fn copy_dir_progressive(
        &self,
        source: &str,
        destination: &Path,
        sink: Option<Arc<dyn ProgressSink>>,
    ) -> Result<CopyReport> {
        let src = self.resolve(source).await?;
        let engine = CopyEngine::new(self.copy_config.clone());
        engine.copy_tree_progressive(&src, destination, sink).await
    }

    /// Get a write-capable handle, resolving the mount path once
    pub async fn writable(&self) -> Result<WritableVolume> {
        let root = self.local_path().await?;
        Ok(WritableVolume::new(root))
    }

    async fn resolve(&self, path: &str) -> Result<PathBuf> {
        let root = self.local_path().await?;
        join_volume_path(&root, path)
    }
}

/// Re-root a runtime-reported mount point under the platform's volume
/// base directory, keeping its last two components.
fn mount_local_path(mountpoint: &str, platform: Platform) -> Result<PathBuf> {
    let components: Vec<&str> = mountpoint.split('/').filter(|c| !c.is_empty()).collect();
    if components.len() < 2 {
        return Err(VolcpError::InvalidPath(format!(
            "unexpected mount point: {mountpoint}"
        )));
    }
    let mut path = platform.volume_base();
    for component in &components[components.len() - 2..] {
        path.push(component);
    }
    Ok(path)
}

/// Join a caller-supplied volume-relative path onto the resolved root,
/// rejecting traversal outside the volume.
pub(crate) fn join_volume_path(root: &Path, path: &str) -> Result<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Ok(root.to_path_buf());
    }
    let relative = Path::new(trimmed);
    for component in relative.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(VolcpError::InvalidPath(format!(
                    "path escapes the volume root: {path}"
                )))
            }
        }
    }
    Ok(root.join(relative))
}
