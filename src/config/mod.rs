//! Configuration module for volcp
//!
//! Provides configuration for the copy engine and for the
//! runtime API client.

mod settings;

pub use settings::*;
