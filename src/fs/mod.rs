//! File system layer
//!
//! Provides directory enumeration for the copy engine and the
//! single-node primitives used by the volume facades.

mod operations;
mod walker;

pub use operations::*;
pub use walker::*;
