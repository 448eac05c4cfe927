//! Configuration for the Surfside tracker
//!
//! `TrackerConfig` is the single source of truth for a tracker instance. It is
//! built once (programmatically, from the environment, or from a JSON file),
//! validated, and then shared read-only by the tracker and its emitter.

pub mod config;
pub mod loader;
mod serde_helpers;


pub use config::{EmitterConfig, Environment, TrackerConfig, TrackerConfigBuilder};
pub use loader::ConfigLoader;
