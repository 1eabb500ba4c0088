//! Progress reporting module
//!
//! Progressive copies deliver a stream of [`ProgressEvent`] values to an
//! observer. Delivery is fire-and-forget: events are plain copies, a sink
//! never holds a reference into engine internals, and a slow consumer
//! cannot stall the traversal.

mod events;

pub use events::*;
