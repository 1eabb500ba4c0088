//! Directory enumeration
//!
//! Lists a single directory level at a time; the copy engine discovers
//! the tree by listing as it recurses, so there is no recursive pre-scan
//! and no caching across calls. The walker never mutates the filesystem.

use crate::error::{IoResultExt, Result, VolcpError};
use std::ffi::OsString;
use std::path::Path;

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file (or anything that is not a directory)
    File,
    /// Directory
    Directory,
}

impl EntryKind {
    /// True for directories
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// One entry produced by listing a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// File name within the listed directory
    pub name: OsString,
    /// File or directory
    pub kind: EntryKind,
}

/// Directory lister used by the copy engine and the volume facade
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeWalker;

impl TreeWalker {
    /// List the entries of `path` in the order the OS reports them.
    ///
    /// Reflects the directory's contents at call time. Fails with
    /// `NotFound` if the path does not exist, `PermissionDenied` if it is
    /// unreadable, and `NotADirectory` if it is a file.
    pub fn list(path: &Path) -> Result<Vec<DirectoryEntry>> {
        let meta = std::fs::metadata(path).with_path(path)?;
        if !meta.is_dir() {
            return Err(VolcpError::NotADirectory(path.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path).with_path(path)? {
            let entry = entry.with_path(path)?;
            let file_type = entry.file_type().with_path(entry.path())?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(DirectoryEntry {
                name: entry.file_name(),
                kind,
            });
        }
        Ok(entries)
    }

    /// Async variant of [`TreeWalker::list`], used by the progressive engine.
    pub async fn list_async(path: &Path) -> Result<Vec<DirectoryEntry>> {
        let meta = tokio::fs::metadata(path).await.with_path(path)?;
        if !meta.is_dir() {
            return Err(VolcpError::NotADirectory(path.to_path_buf()));
        }

        let mut reader = tokio::fs::read_dir(path).await.with_path(path)?;
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await.with_path(path)? {
            let file_type = entry.file_type().await.with_path(entry.path())?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(DirectoryEntry {
                name: entry.file_name(),
                kind,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_and_dirs() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("a.txt"))
            .unwrap()
            .write_all(b"a")
            .unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let mut entries = TreeWalker::list(dir.path()).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.txt");
        assert_eq!(entries[0].kind, EntryKind::File);
        assert_eq!(entries[1].name, "sub");
        assert_eq!(entries[1].kind, EntryKind::Directory);
    }

    #[test]
    fn test_list_missing_path() {
        let dir = TempDir::new().unwrap();
        let err = TreeWalker::list(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, VolcpError::NotFound(_)));
    }

    #[test]
    fn test_list_file_is_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain.txt");
        File::create(&file).unwrap();
        let err = TreeWalker::list(&file).unwrap_err();
        assert!(matches!(err, VolcpError::NotADirectory(_)));
    }

    #[test]
    fn test_list_reflects_current_contents() {
        let dir = TempDir::new().unwrap();
        assert!(TreeWalker::list(dir.path()).unwrap().is_empty());

        File::create(dir.path().join("new.txt")).unwrap();
        assert_eq!(TreeWalker::list(dir.path()).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_async_matches_sync() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("x")).unwrap();
        std::fs::create_dir(dir.path().join("y")).unwrap();

        let mut sync_entries = TreeWalker::list(dir.path()).unwrap();
        let mut async_entries = TreeWalker::list_async(dir.path()).await.unwrap();
        sync_entries.sort_by(|a, b| a.name.cmp(&b.name));
        async_entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(sync_entries, async_entries);
    }
}
