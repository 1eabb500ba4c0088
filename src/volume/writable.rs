//! Write-capable volume facade
//!
//! Thin wrappers over the filesystem primitives, operating on paths
//! inside an already-resolved volume mount. Every operation takes a
//! volume-relative path and refuses empty paths and traversal outside
//! the volume root.

use crate::error::{Result, VolcpError};
use crate::fs;
use crate::volume::join_volume_path;
use std::path::{Path, PathBuf};

/// Handle for writing into a volume's mount
#[derive(Debug, Clone)]
pub struct WritableVolume {
    root: PathBuf,
}

impl WritableVolume {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolved mount root this handle writes under
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write data to a file inside the volume, creating or truncating it
    pub fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        fs::write_file(&self.target(path)?, data)
    }

    /// Delete a file inside the volume
    pub fn unlink(&self, path: &str) -> Result<()> {
        fs::remove_file(&self.target(path)?)
    }

    /// Create a directory inside the volume; the parent must exist
    pub fn mkdir(&self, path: &str) -> Result<()> {
        let target = self.target(path)?;
        std::fs::create_dir(&target).map_err(|e| VolcpError::io(target, e))
    }

    /// Delete a directory inside the volume; `recursive` removes
    /// non-empty directories
    pub fn rmdir(&self, path: &str, recursive: bool) -> Result<()> {
        fs::remove_dir(&self.target(path)?, recursive)
    }

    /// Copy a file from the host into the volume
    pub fn copy_file_into(&self, source: &Path, destination: &str) -> Result<u64> {
        let target = self.target(destination)?;
        fs::copy_file_bytes(
            source,
            &target,
            crate::config::OverwritePolicy::MergeExisting,
        )
    }

    fn target(&self, path: &str) -> Result<PathBuf> {
        if path.trim_start_matches('/').is_empty() {
            return Err(VolcpError::InvalidPath(
                "a non-empty path inside the volume is required".to_string(),
            ));
        }
        join_volume_path(&self.root, path)
    }
}
