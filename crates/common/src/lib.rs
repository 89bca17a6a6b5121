//! Stridelab Common Utilities
//!
//! Shared infrastructure for all Stridelab crates:
//! - Error types and result aliases
//! - Time-unit conversions for nanosecond sample timestamps
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
