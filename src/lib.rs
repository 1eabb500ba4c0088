//! # volcp - browse and copy container volume contents
//!
//! volcp resolves a named storage volume managed by a container runtime
//! (the Docker Engine API) to its on-disk mount path, then performs
//! ordinary filesystem operations against it: listing, reading, stat'ing,
//! and copying whole directory subtrees out of (or into) the volume.
//!
//! The centerpiece is the recursive tree-copy engine, available in two
//! modes:
//!
//! - **Blocking**: depth-first on the calling thread, returns once the
//!   whole tree is copied or on the first error.
//! - **Progressive**: concurrent fan-out over directory entries, emitting
//!   [`progress::ProgressEvent`]s as tasks are discovered and finished,
//!   resolving exactly once when all work has quiesced.
//!
//! ## Browsing a volume
//!
//! ```no_run
//! use volcp::config::ClientConfig;
//! use volcp::volume::Client;
//!
//! # async fn example() -> volcp::Result<()> {
//! let client = Client::new(ClientConfig::default())?;
//! let volume = client.volume("pgdata");
//!
//! for entry in volume.read_dir("/").await? {
//!     println!("{:?} ({:?})", entry.name, entry.kind);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Copying a tree with progress
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use volcp::config::{ClientConfig, CopyConfig};
//! use volcp::progress::ChannelSink;
//! use volcp::volume::Client;
//!
//! # async fn example() -> volcp::Result<()> {
//! let client = Client::new(ClientConfig::default())?;
//! let volume = client.volume("pgdata").with_copy_config(CopyConfig::default());
//!
//! let (sink, mut events) = ChannelSink::new();
//! let copy = volume.copy_dir_progressive("/", Path::new("/tmp/backup"), Some(Arc::new(sink)));
//!
//! tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         println!("{}/{} done", event.completed, event.total);
//!     }
//! });
//!
//! let report = copy.await?;
//! report.print_summary();
//! # Ok(())
//! # }
//! ```
//!
//! ## Using the engine directly
//!
//! The engine works on plain paths; the volume layer is just one way to
//! obtain them.
//!
//! ```no_run
//! use std::path::Path;
//! use volcp::config::CopyConfig;
//! use volcp::core::CopyEngine;
//!
//! # fn example() -> volcp::Result<()> {
//! let engine = CopyEngine::new(CopyConfig::default());
//! let report = engine.copy_tree_blocking(Path::new("/data/in"), Path::new("/data/out"))?;
//! println!("copied {} files", report.files_copied);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod fs;
pub mod progress;
pub mod volume;

// Re-export commonly used types
pub use config::{ClientConfig, CopyConfig, OverwritePolicy};
pub use core::{CopyEngine, CopyReport};
pub use error::{Result, VolcpError};
pub use progress::{ProgressEvent, ProgressPhase, ProgressSink};
pub use volume::{Client, Volume};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use volcp::prelude::*;
    //! ```

    pub use crate::api::VolumeInfo;
    pub use crate::config::{ClientConfig, CopyConfig, Endpoint, OverwritePolicy, Platform};
    pub use crate::core::{CopyEngine, CopyReport};
    pub use crate::error::{Result, VolcpError};
    pub use crate::fs::{DirectoryEntry, EntryKind, PathStat, TreeWalker};
    pub use crate::progress::{ChannelSink, CollectingSink, ProgressEvent, ProgressPhase, ProgressSink};
    pub use crate::volume::{Client, Volume, WritableVolume};
}
