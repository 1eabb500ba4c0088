//! Error types for volcp
//!
//! This module defines all error types used throughout the crate,
//! providing detailed error information for debugging and user feedback.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for volcp operations
#[derive(Error, Debug)]
pub enum VolcpError {
    /// File or directory not found
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Permission denied
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// A directory listing was required but the path is not a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Destination already exists and the overwrite policy forbids reuse
    #[error("Path already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// I/O error during file operations
    #[error("I/O error at '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A tree copy quiesced with one or more failed tasks
    #[error(
        "copy failed at '{}' after {completed}/{total} tasks ({failed} failed): {source}",
        .path.display()
    )]
    CopyFailed {
        /// First failing path
        path: PathBuf,
        /// Tasks that finished successfully before quiescence
        completed: u64,
        /// Tasks discovered in total
        total: u64,
        /// Tasks that failed
        failed: u64,
        /// First error encountered
        #[source]
        source: Box<VolcpError>,
    },

    /// Operation cancelled before completion
    #[error("Operation cancelled")]
    Cancelled,

    /// The runtime API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Could not reach the runtime API endpoint
    #[error("Connection error to '{endpoint}': {message}")]
    Connection { endpoint: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid path argument (empty, escaping the volume root, ...)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Platform without a known volume mount base
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

impl VolcpError {
    /// Create an I/O error with path context, classifying well-known kinds
    /// into their dedicated variants.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists(path),
            _ => Self::Io { path, source },
        }
    }

    /// Create an API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this error is a permission issue
    pub fn is_permission_error(&self) -> bool {
        match self {
            Self::PermissionDenied(_) => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. }
            | Self::NotFound(path)
            | Self::PermissionDenied(path)
            | Self::NotADirectory(path)
            | Self::AlreadyExists(path)
            | Self::CopyFailed { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for volcp operations
pub type Result<T> = std::result::Result<T, VolcpError>;

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| VolcpError::io(path, e))
    }
}
