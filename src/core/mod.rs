//! Core copy engine module
//!
//! Provides the recursive tree-copy engine with its blocking and
//! progressive execution modes.

mod engine;
mod tracker;

pub use engine::*;
pub(crate) use tracker::ProgressTracker;
