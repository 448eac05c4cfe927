//! Event tracking client for the Surfside collector
//!
//! A [`Tracker`] owns a namespace, a [`ContextRegistry`] and an [`Emitter`].
//! Tracking an event captures a snapshot of the current contexts and queues
//! it; flushing hands the queue to a background task that POSTs batches to the
//! collector, retrying transient failures with backoff.
//!
//! ```no_run
//! # async fn demo() -> surfside_core::Result<()> {
//! use surfside_config::TrackerConfig;
//! use surfside_core::Event;
//! use surfside_tracker::Tracker;
//!
//! let config = TrackerConfig::builder("iosTracker")
//!     .credentials("00000-1", "00000-2")
//!     .build()?;
//! let tracker = Tracker::builder(config).build()?;
//! tracker.track(Event::screen_view("Home")?)?;
//! let report = tracker.flush_and_wait().await;
//! assert_eq!(report.events_delivered, 1);
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod context;
pub mod emitter;
pub mod lifecycle;
pub mod registry;
pub mod tracker;

pub use command::{Command, CommandExecutor, CommandOutcome};
pub use context::ContextRegistry;
pub use emitter::transport::{HttpTransport, PostRequest, RecordingTransport, Transport};
pub use emitter::{Emitter, FlushHandle, FlushReport};
pub use lifecycle::TrackerLifecycle;
pub use registry::TrackerRegistry;
pub use tracker::{Tracker, TrackerBuilder};
