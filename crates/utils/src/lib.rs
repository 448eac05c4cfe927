//! Shared utilities for the Surfside tracker
//!
//! Retry policy used by the emitter, and the tracing setup shared by binaries.

pub mod resilience;
pub mod tracing;

pub use resilience::*;
