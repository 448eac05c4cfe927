//! Two-state tracker lifecycle
//!
//! Operations on an uninitialized tracker return [`Error::NotInitialized`]
//! instead of silently doing nothing. The transition is one-way.

use crate::tracker::{Tracker, TrackerBuilder};
use surfside_core::{Error, Result};
use tracing::warn;

#[derive(Debug, Default)]
pub enum TrackerLifecycle {
    #[default]
    Uninitialized,
    Initialized(Box<Tracker>),
}

impl TrackerLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self, TrackerLifecycle::Initialized(_))
    }

    /// Build the tracker and move to the initialized state
    ///
    /// A second call fails: with [`Error::DuplicateNamespace`] for the same
    /// namespace, otherwise with a configuration error. The current tracker
    /// is kept either way.
    pub fn initialize(&mut self, builder: TrackerBuilder) -> Result<&mut Tracker> {
        if let TrackerLifecycle::Initialized(current) = self {
            let requested = builder.config().namespace.trim();
            warn!(current = %current.namespace(), requested, "Tracker already initialized");
            return Err(if current.namespace().as_str() == requested {
                Error::duplicate_namespace(requested)
            } else {
                Error::configuration(format!(
                    "tracker already initialized with namespace '{}'",
                    current.namespace()
                ))
            });
        }

        *self = TrackerLifecycle::Initialized(Box::new(builder.build()?));
        self.tracker_mut("initialize")
    }

    /// The tracker, or `NotInitialized` naming the attempted operation
    pub fn tracker(&self, operation: &str) -> Result<&Tracker> {
        match self {
            TrackerLifecycle::Initialized(tracker) => Ok(&**tracker),
            TrackerLifecycle::Uninitialized => Err(Error::not_initialized(operation)),
        }
    }

    pub fn tracker_mut(&mut self, operation: &str) -> Result<&mut Tracker> {
        match self {
            TrackerLifecycle::Initialized(tracker) => Ok(&mut **tracker),
            TrackerLifecycle::Uninitialized => Err(Error::not_initialized(operation)),
        }
    }
}
