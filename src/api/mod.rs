//! Runtime API client module
//!
//! Minimal client for the container runtime's HTTP API, reachable over
//! TCP or a local unix socket. Only the volume endpoints this crate
//! consumes are modeled; there is no retry, backoff, or authentication.

mod models;
mod transport;

pub use models::*;
pub use transport::*;
