//! Core domain types, errors, and constants for the Surfside tracker.
//!
//! This crate holds the building blocks shared by the configuration layer,
//! the tracker/emitter and the demo CLI.
//!
//! ## Key Components
//!
//! - **`errors`**: The `Error` enum and `Result` alias covering configuration,
//!   validation and delivery failures.
//! - **`types`**: The immutable `Event` model, context entities (location,
//!   source, segment, product) and validated newtypes such as `SchemaUri`.
//! - **`diagnostics`**: The fire-and-forget observability channel the tracker
//!   reports through.
//! - **`constants`**: Schema URIs, collector endpoints and environment variable names.

pub mod constants;
pub mod diagnostics;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    diagnostics::{DiagnosticRecord, DiagnosticSubscriber, DiagnosticsBus, TrackerDiagnostic},
    errors::{Error, Result, Validate},
    types::*,
};
