//! Recursive tree-copy engine
//!
//! Replicates a directory subtree from a source root to a destination
//! root in one of two modes sharing the same traversal:
//!
//! - **Blocking**: depth-first on the caller's thread, returns after the
//!   whole tree is copied or on the first error. No progress events.
//! - **Progressive**: concurrent fan-out over directory entries on the
//!   tokio runtime, delivering [`ProgressEvent`]s as work is discovered
//!   and finished, resolving exactly once when the entire tree has
//!   quiesced.
//!
//! On error both modes leave a partially copied destination tree behind;
//! there is no rollback.

use crate::config::{CopyConfig, OverwritePolicy};
use crate::core::ProgressTracker;
use crate::error::{IoResultExt, Result, VolcpError};
use crate::fs::{self, DirectoryEntry, EntryKind, TreeWalker};
use crate::progress::ProgressSink;
use async_recursion::async_recursion;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Copy operation report
#[derive(Debug, Default)]
pub struct CopyReport {
    /// Tasks discovered (one per entry found by listing)
    pub total: u64,
    /// Tasks that finished successfully
    pub completed: u64,
    /// Tasks that failed
    pub failed: u64,
    /// Files copied
    pub files_copied: u64,
    /// Directories created
    pub dirs_created: u64,
    /// Bytes copied
    pub bytes_copied: u64,
    /// Failed paths with their error messages
    pub failures: Vec<(PathBuf, String)>,
    /// Total duration
    pub duration: Duration,
}

impl CopyReport {
    /// Check if the copy was completely successful
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        println!("\n=== Copy Summary ===");
        println!("Tasks:        {}/{}", self.completed, self.total);
        println!("Files copied: {}", self.files_copied);
        println!("Directories:  {}", self.dirs_created);
        println!(
            "Bytes copied: {}",
            humansize::format_size(self.bytes_copied, humansize::BINARY)
        );
        println!("Duration:     {:.2?}", self.duration);

        if !self.failures.is_empty() {
            println!("\nFailures: {}", self.failures.len());
            for (path, error) in &self.failures {
                println!("  {} - {}", path.display(), error);
            }
        }
    }
}

// Owned traversal context cloned into spawned tasks.
struct TraversalCtx {
    policy: OverwritePolicy,
    tracker: ProgressTracker,
    file_permits: Option<Semaphore>,
    cancelled: Arc<AtomicBool>,
}

impl TraversalCtx {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Recursive tree-copy engine
pub struct CopyEngine {
    config: CopyConfig,
    cancelled: Arc<AtomicBool>,
}

impl CopyEngine {
    /// Create a new copy engine
    pub fn new(config: CopyConfig) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get cancellation flag for external control. Cancellation is
    /// observed at task-start boundaries; in-flight I/O finishes.
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Cancel a progressive copy
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Copy the tree rooted at `source` to `destination`, depth-first on
    /// the calling thread. Returns after the whole tree is copied, or with
    /// the first error encountered, leaving any partial destination tree
    /// in place.
    pub fn copy_tree_blocking(&self, source: &Path, destination: &Path) -> Result<CopyReport> {
        let start = Instant::now();
        let mut report = CopyReport::default();

        // Resolve the source before touching the destination, so a missing
        // source never creates an artifact.
        let meta = std::fs::metadata(source).with_path(source)?;
        if meta.is_dir() {
            self.copy_dir_blocking(source, destination, &mut report)?;
        } else {
            let bytes = fs::copy_file_bytes(source, destination, self.config.overwrite)?;
            report.total += 1;
            report.completed += 1;
            report.files_copied += 1;
            report.bytes_copied += bytes;
        }

        report.duration = start.elapsed();
        Ok(report)
    }

    fn copy_dir_blocking(&self, src: &Path, dest: &Path, report: &mut CopyReport) -> Result<()> {
        if fs::create_dir(dest, self.config.overwrite)? {
            report.dirs_created += 1;
        }

        let entries = TreeWalker::list(src)?;
        for DirectoryEntry { name, kind } in entries {
            report.total += 1;
            let child_src = src.join(&name);
            let child_dest = dest.join(&name);
            match kind {
                EntryKind::Directory => {
                    self.copy_dir_blocking(&child_src, &child_dest, report)?;
                }
                EntryKind::File => {
                    let bytes =
                        fs::copy_file_bytes(&child_src, &child_dest, self.config.overwrite)?;
                    report.files_copied += 1;
                    report.bytes_copied += bytes;
                }
            }
            report.completed += 1;
        }
        Ok(())
    }

    /// Copy the tree rooted at `source` to `destination` with concurrent
    /// fan-out, reporting progress to `sink` as work is discovered and
    /// finished. The returned future resolves exactly once, after every
    /// spawned task has finished.
    ///
    /// A failing task does not abort its siblings; running work quiesces
    /// and the result is [`VolcpError::CopyFailed`] carrying the first
    /// cause and the completed/failed counts.
    #[tracing::instrument(skip(self, sink), fields(source = %source.display(), destination = %destination.display()))]
    pub async fn copy_tree_progressive(
        &self,
        source: &Path,
        destination: &Path,
        sink: Option<Arc<dyn ProgressSink>>,
    ) -> Result<CopyReport> {
        let start = Instant::now();

        // As in blocking mode: a missing source fails before any
        // destination artifact exists and before any event is emitted.
        let meta = tokio::fs::metadata(source).await.with_path(source)?;

        let ctx = Arc::new(TraversalCtx {
            policy: self.config.overwrite,
            tracker: ProgressTracker::new(sink),
            file_permits: self.config.max_in_flight.map(Semaphore::new),
            cancelled: Arc::clone(&self.cancelled),
        });

        if meta.is_dir() {
            copy_dir_progressive(
                Arc::clone(&ctx),
                source.to_path_buf(),
                destination.to_path_buf(),
                true,
            )
            .await;
        } else {
            ctx.tracker.register();
            copy_file_task(Arc::clone(&ctx), source.to_path_buf(), destination.to_path_buf()).await;
        }

        // The structured join above has resolved, so no task is still
        // registering children; the terminal event is safe to emit.
        let done = ctx.tracker.finish();
        tracing::debug!(completed = done.completed, total = done.total, "copy quiesced");

        let accounting = ctx.tracker.into_accounting();
        let report = CopyReport {
            total: accounting.total,
            completed: accounting.completed,
            failed: accounting.failed,
            files_copied: accounting.files_copied,
            dirs_created: accounting.dirs_created,
            bytes_copied: accounting.bytes_copied,
            failures: accounting.failures,
            duration: start.elapsed(),
        };

        if self.cancelled.load(Ordering::SeqCst) {
            return Err(VolcpError::Cancelled);
        }
        match accounting.first_error {
            Some((path, source)) => Err(VolcpError::CopyFailed {
                path,
                completed: report.completed,
                total: report.total,
                failed: report.failed,
                source: Box::new(source),
            }),
            None => Ok(report),
        }
    }
}

/// One directory's fan-out: create the destination directory, list the
/// source, register every child before spawning it, then await all
/// children. The future resolves only after the full subtree has, which
/// is what makes the root's resolution the global completion point.
#[async_recursion]
async fn copy_dir_progressive(ctx: Arc<TraversalCtx>, src: PathBuf, dest: PathBuf, is_root: bool) {
    if ctx.is_cancelled() {
        fail_dir_step(&ctx, src, VolcpError::Cancelled, is_root);
        return;
    }

    // The destination directory must exist before any child task is
    // registered, so no child can race a write into a missing parent.
    match fs::create_dir_async(&dest, ctx.policy).await {
        Ok(created) => {
            if created {
                ctx.tracker.dir_created();
            }
        }
        Err(e) => {
            fail_dir_step(&ctx, dest, e, is_root);
            return;
        }
    }

    let entries = match TreeWalker::list_async(&src).await {
        Ok(entries) => entries,
        Err(e) => {
            fail_dir_step(&ctx, src, e, is_root);
            return;
        }
    };

    let mut children = JoinSet::new();
    for DirectoryEntry { name, kind } in entries {
        let child_src = src.join(&name);
        let child_dest = dest.join(&name);
        // Register before spawning: total is always ahead of running work.
        ctx.tracker.register();
        let ctx = Arc::clone(&ctx);
        match kind {
            EntryKind::Directory => {
                children.spawn(async move {
                    copy_dir_progressive(ctx, child_src, child_dest, false).await;
                });
            }
            EntryKind::File => {
                children.spawn(async move {
                    copy_file_task(ctx, child_src, child_dest).await;
                });
            }
        }
    }

    // This directory's own unit of work is its enumeration; its children
    // are separate tasks already registered above.
    if !is_root {
        ctx.tracker.complete_dir();
    }

    while let Some(joined) = children.join_next().await {
        if let Err(join_err) = joined {
            // A panicked child never reported back; balance the counters.
            ctx.tracker.fail(
                src.clone(),
                VolcpError::Io {
                    path: src.clone(),
                    source: std::io::Error::other(join_err),
                },
            );
        }
    }
}

async fn copy_file_task(ctx: Arc<TraversalCtx>, src: PathBuf, dest: PathBuf) {
    if ctx.is_cancelled() {
        ctx.tracker.fail(src, VolcpError::Cancelled);
        return;
    }

    // Bound concurrent file I/O when configured; the permit is held for
    // the duration of the byte copy only.
    let _permit = match &ctx.file_permits {
        Some(permits) => permits.acquire().await.ok(),
        None => None,
    };

    match fs::copy_file_bytes_async(&src, &dest, ctx.policy).await {
        Ok(bytes) => ctx.tracker.complete_file(bytes),
        Err(e) => ctx.tracker.fail(src, e),
    }
}

fn fail_dir_step(ctx: &TraversalCtx, path: PathBuf, error: VolcpError, is_root: bool) {
    if is_root {
        ctx.tracker.record_root_error(path, error);
    } else {
        ctx.tracker.fail(path, error);
    }
}
