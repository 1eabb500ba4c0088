//! Single-node filesystem primitives
//!
//! Directory creation, byte copies, and the read/write/stat/delete
//! wrappers consumed by the volume facades. All errors carry path
//! context and are classified into the crate taxonomy.

use crate::config::OverwritePolicy;
use crate::error::{IoResultExt, Result, VolcpError};
use crate::fs::EntryKind;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::SystemTime;
use tokio::io::AsyncWriteExt;

/// Buffer size for streamed byte copies
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Metadata snapshot of a path
#[derive(Debug, Clone)]
pub struct PathStat {
    /// Size in bytes
    pub size: u64,
    /// File or directory
    pub kind: EntryKind,
    /// Modification time, if the filesystem reports one
    pub modified: Option<SystemTime>,
    /// Creation time, if the filesystem reports one
    pub created: Option<SystemTime>,
    /// Read-only flag
    pub readonly: bool,
}

/// Stat a path
pub fn stat(path: &Path) -> Result<PathStat> {
    let meta = std::fs::metadata(path).with_path(path)?;
    Ok(PathStat {
        size: meta.len(),
        kind: if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        },
        modified: meta.modified().ok(),
        created: meta.created().ok(),
        readonly: meta.permissions().readonly(),
    })
}

/// Create a destination directory, honoring the overwrite policy.
///
/// Returns `true` if the directory was created, `false` if it already
/// existed and the policy is `MergeExisting`.
pub fn create_dir(path: &Path, policy: OverwritePolicy) -> Result<bool> {
    match std::fs::create_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => match policy {
            OverwritePolicy::MergeExisting if path.is_dir() => Ok(false),
            _ => Err(VolcpError::AlreadyExists(path.to_path_buf())),
        },
        Err(e) => Err(VolcpError::io(path, e)),
    }
}

/// Async variant of [`create_dir`]
pub async fn create_dir_async(path: &Path, policy: OverwritePolicy) -> Result<bool> {
    match tokio::fs::create_dir(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            let is_dir = tokio::fs::metadata(path)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            match policy {
                OverwritePolicy::MergeExisting if is_dir => Ok(false),
                _ => Err(VolcpError::AlreadyExists(path.to_path_buf())),
            }
        }
        Err(e) => Err(VolcpError::io(path, e)),
    }
}

/// Copy a file's bytes from `src` to `dest`, returning the byte count.
///
/// With `FailIfExists` the destination must not exist; with
/// `MergeExisting` an existing destination file is truncated.
pub fn copy_file_bytes(src: &Path, dest: &Path, policy: OverwritePolicy) -> Result<u64> {
    let reader = std::fs::File::open(src).with_path(src)?;
    let writer = open_dest_sync(dest, policy)?;

    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, reader);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, writer);
    let bytes = std::io::copy(&mut reader, &mut writer).with_path(dest)?;
    std::io::Write::flush(&mut writer).with_path(dest)?;
    Ok(bytes)
}

fn open_dest_sync(dest: &Path, policy: OverwritePolicy) -> Result<std::fs::File> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true);
    match policy {
        OverwritePolicy::FailIfExists => options.create_new(true),
        OverwritePolicy::MergeExisting => options.create(true).truncate(true),
    };
    options.open(dest).with_path(dest)
}

/// Async variant of [`copy_file_bytes`], used by the progressive engine.
pub async fn copy_file_bytes_async(
    src: &Path,
    dest: &Path,
    policy: OverwritePolicy,
) -> Result<u64> {
    let reader = tokio::fs::File::open(src).await.with_path(src)?;

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true);
    match policy {
        OverwritePolicy::FailIfExists => options.create_new(true),
        OverwritePolicy::MergeExisting => options.create(true).truncate(true),
    };
    let mut writer = options.open(dest).await.with_path(dest)?;

    let mut reader = tokio::io::BufReader::with_capacity(COPY_BUFFER_SIZE, reader);
    let bytes = tokio::io::copy_buf(&mut reader, &mut writer)
        .await
        .with_path(dest)?;
    writer.flush().await.with_path(dest)?;
    Ok(bytes)
}

/// Read a file's contents
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_path(path)
}

/// Write data to a file, creating or truncating it
pub fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    std::fs::write(path, data).with_path(path)
}

/// Delete a file
pub fn remove_file(path: &Path) -> Result<()> {
    std::fs::remove_file(path).with_path(path)
}

/// Delete a directory; `recursive` removes non-empty directories
pub fn remove_dir(path: &Path, recursive: bool) -> Result<()> {
    if recursive {
        std::fs::remove_dir_all(path).with_path(path)
    } else {
        std::fs::remove_dir(path).with_path(path)
    }
}
