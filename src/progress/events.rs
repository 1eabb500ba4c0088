//! Progress events and sinks

use std::sync::Mutex;
use tokio::sync::mpsc;

/// Phase of a progressive copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// Tasks are still being discovered or executed
    Working,
    /// All tasks have finished; emitted exactly once, last
    Done,
}

/// Snapshot of copy progress at one observation point.
///
/// `total` counts tasks discovered so far and only grows as directories
/// are listed; `completed` counts tasks that have finished. At every
/// observation `completed <= total`, and the sequence of events a sink
/// receives is non-decreasing in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Tasks that have finished (file copied, or directory enumerated)
    pub completed: u64,
    /// Tasks discovered so far
    pub total: u64,
    /// Tasks currently executing
    pub in_flight: u64,
    /// Working or Done
    pub phase: ProgressPhase,
}

impl ProgressEvent {
    /// True once every discovered task has finished
    pub fn is_done(&self) -> bool {
        self.phase == ProgressPhase::Done
    }
}

/// Observer for progress events.
///
/// Implementations must be cheap and non-blocking; the tracker calls
/// them from inside the traversal.
pub trait ProgressSink: Send + Sync {
    /// Receive one event
    fn on_event(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_event(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Sink that forwards events into an unbounded channel, decoupling the
/// engine from the consumer's pace.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiving half
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn on_event(&self, event: ProgressEvent) {
        // A dropped receiver just means nobody is listening anymore.
        let _ = self.tx.send(event);
    }
}

/// Sink that records every event, for inspection after the copy settles
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingSink {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a copy of all events received so far
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().expect("sink poisoned").clone()
    }
}

impl ProgressSink for CollectingSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events.lock().expect("sink poisoned").push(event);
    }
}
