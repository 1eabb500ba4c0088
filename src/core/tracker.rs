//! Progress bookkeeping for progressive copies
//!
//! One tracker exists per top-level copy invocation and is never shared
//! across unrelated copies. It counts work and emits events; it does not
//! decide completion. Completion is the engine's structured join: the
//! root task's future resolves only after every descendant's does, so by
//! the time [`ProgressTracker::finish`] is called no task can still be
//! registering children.

use crate::error::VolcpError;
use crate::progress::{ProgressEvent, ProgressPhase, ProgressSink};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct TrackerState {
    total: u64,
    completed: u64,
    failed: u64,
    in_flight: u64,
    files_copied: u64,
    dirs_created: u64,
    bytes_copied: u64,
    failures: Vec<(PathBuf, String)>,
    first_error: Option<(PathBuf, VolcpError)>,
    done_emitted: bool,
}

impl TrackerState {
    fn snapshot(&self, phase: ProgressPhase) -> ProgressEvent {
        ProgressEvent {
            completed: self.completed,
            total: self.total,
            in_flight: self.in_flight,
            phase,
        }
    }
}

/// Counters and event emission for one progressive copy invocation
pub(crate) struct ProgressTracker {
    state: Mutex<TrackerState>,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl ProgressTracker {
    pub(crate) fn new(sink: Option<Arc<dyn ProgressSink>>) -> Self {
        Self {
            state: Mutex::new(TrackerState::default()),
            sink,
        }
    }

    /// Record a newly discovered task. Called before the task is spawned,
    /// so `total` can never lag behind running work.
    pub(crate) fn register(&self) {
        self.with_state(|state| {
            state.total += 1;
            state.in_flight += 1;
        });
    }

    /// A file task finished successfully
    pub(crate) fn complete_file(&self, bytes: u64) {
        self.with_state(|state| {
            state.completed += 1;
            state.in_flight -= 1;
            state.files_copied += 1;
            state.bytes_copied += bytes;
        });
    }

    /// A directory task finished enumerating and registering its children
    pub(crate) fn complete_dir(&self) {
        self.with_state(|state| {
            state.completed += 1;
            state.in_flight -= 1;
        });
    }

    /// A registered task failed; its siblings keep running
    pub(crate) fn fail(&self, path: PathBuf, error: VolcpError) {
        tracing::debug!(path = %path.display(), %error, "copy task failed");
        self.with_state(|state| {
            state.failed += 1;
            state.in_flight -= 1;
            state.failures.push((path.clone(), error.to_string()));
            if state.first_error.is_none() {
                state.first_error = Some((path, error));
            }
        });
    }

    /// Record a failure of the root itself, which is not a registered task
    pub(crate) fn record_root_error(&self, path: PathBuf, error: VolcpError) {
        tracing::debug!(path = %path.display(), %error, "root copy step failed");
        self.with_state(|state| {
            state.failures.push((path.clone(), error.to_string()));
            if state.first_error.is_none() {
                state.first_error = Some((path, error));
            }
        });
    }

    /// Count a created destination directory. Not a task transition, so
    /// no event is emitted.
    pub(crate) fn dir_created(&self) {
        self.state.lock().expect("tracker poisoned").dirs_created += 1;
    }

    /// Emit the terminal `Done` event. Idempotent: racing callers emit it
    /// at most once.
    pub(crate) fn finish(&self) -> ProgressEvent {
        let mut state = self.state.lock().expect("tracker poisoned");
        let event = state.snapshot(ProgressPhase::Done);
        if !state.done_emitted {
            state.done_emitted = true;
            if let Some(sink) = &self.sink {
                sink.on_event(event);
            }
        }
        event
    }

    /// Current counters without emitting anything
    pub(crate) fn snapshot(&self) -> ProgressEvent {
        self.state
            .lock()
            .expect("tracker poisoned")
            .snapshot(ProgressPhase::Working)
    }

    /// Drain the terminal accounting: counters, recorded failures, and the
    /// first typed error if any task failed.
    pub(crate) fn into_accounting(&self) -> TrackerAccounting {
        let mut state = self.state.lock().expect("tracker poisoned");
        TrackerAccounting {
            total: state.total,
            completed: state.completed,
            failed: state.failed,
            files_copied: state.files_copied,
            dirs_created: state.dirs_created,
            bytes_copied: state.bytes_copied,
            failures: std::mem::take(&mut state.failures),
            first_error: state.first_error.take(),
        }
    }

    // Mutate under the lock and emit the resulting snapshot while still
    // holding it, so the delivered event sequence is monotone.
    fn with_state(&self, f: impl FnOnce(&mut TrackerState)) {
        let mut state = self.state.lock().expect("tracker poisoned");
        f(&mut state);
        debug_assert!(state.completed + state.failed <= state.total);
        if let Some(sink) = &self.sink {
            sink.on_event(state.snapshot(ProgressPhase::Working));
        }
    }
}

/// Terminal counters drained from the tracker after quiescence
pub(crate) struct TrackerAccounting {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub files_copied: u64,
    pub dirs_created: u64,
    pub bytes_copied: u64,
    pub failures: Vec<(PathBuf, String)>,
    pub first_error: Option<(PathBuf, VolcpError)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::CollectingSink;

    #[test]
    fn test_counters_and_events() {
        let sink = Arc::new(CollectingSink::new());
        let tracker = ProgressTracker::new(Some(sink.clone()));

        tracker.register();
        tracker.register();
        tracker.complete_file(10);
        tracker.complete_dir();
        let done = tracker.finish();

        assert_eq!(done.total, 2);
        assert_eq!(done.completed, 2);
        assert_eq!(done.in_flight, 0);
        assert!(done.is_done());

        let events = sink.events();
        assert_eq!(events.len(), 5);
        assert!(events[..4].iter().all(|e| !e.is_done()));
        assert!(events[4].is_done());
    }

    #[test]
    fn test_event_sequence_is_monotone() {
        let sink = Arc::new(CollectingSink::new());
        let tracker = ProgressTracker::new(Some(sink.clone()));

        for _ in 0..5 {
            tracker.register();
        }
        for _ in 0..5 {
            tracker.complete_file(1);
        }
        tracker.finish();

        let events = sink.events();
        for pair in events.windows(2) {
            assert!(pair[1].total >= pair[0].total);
            assert!(pair[1].completed >= pair[0].completed);
            assert!(pair[1].completed <= pair[1].total);
        }
    }

    #[test]
    fn test_finish_emits_done_exactly_once() {
        let sink = Arc::new(CollectingSink::new());
        let tracker = ProgressTracker::new(Some(sink.clone()));

        tracker.finish();
        tracker.finish();
        tracker.finish();

        let done_count = sink.events().iter().filter(|e| e.is_done()).count();
        assert_eq!(done_count, 1);
    }

    #[test]
    fn test_finish_races() {
        let sink = Arc::new(CollectingSink::new());
        let tracker = Arc::new(ProgressTracker::new(Some(sink.clone())));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    tracker.finish();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let done_count = sink.events().iter().filter(|e| e.is_done()).count();
        assert_eq!(done_count, 1);
    }

    #[test]
    fn test_failure_accounting() {
        let tracker = ProgressTracker::new(None);
        tracker.register();
        tracker.register();
        tracker.complete_file(5);
        tracker.fail(
            PathBuf::from("/bad"),
            VolcpError::PermissionDenied(PathBuf::from("/bad")),
        );

        let accounting = tracker.into_accounting();
        assert_eq!(accounting.completed, 1);
        assert_eq!(accounting.failed, 1);
        assert_eq!(accounting.failures.len(), 1);
        let (path, err) = accounting.first_error.unwrap();
        assert_eq!(path, PathBuf::from("/bad"));
        assert!(err.is_permission_error());
    }
}
