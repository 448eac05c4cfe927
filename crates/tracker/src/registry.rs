//! Several trackers keyed by namespace
//!
//! The registry is an owned value, not a process-wide singleton: whoever
//! needs namespace uniqueness holds one. Context writes can target a subset
//! of namespaces, or every registered tracker when no list is given.

use crate::emitter::transport::Transport;
use crate::emitter::FlushHandle;
use crate::tracker::Tracker;
use indexmap::IndexMap;
use std::sync::Arc;
use surfside_config::TrackerConfig;
use surfside_core::{
    DiagnosticsBus, Error, Location, Product, Result, Segment, Source, TrackingId,
};
use tracing::{debug, info};

#[derive(Default)]
pub struct TrackerRegistry {
    trackers: IndexMap<String, Tracker>,
    diagnostics: Arc<DiagnosticsBus>,
    transport: Option<Arc<dyn Transport>>,
}

impl std::fmt::Debug for TrackerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerRegistry")
            .field("namespaces", &self.namespaces())
            .field("transport", &self.transport.as_ref().map(|t| t.name()))
            .finish()
    }
}

impl TrackerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share one diagnostics bus across every tracker created here
    pub fn with_diagnostics(mut self, diagnostics: Arc<DiagnosticsBus>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Transport handed to every tracker created here, instead of HTTP
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn diagnostics(&self) -> &Arc<DiagnosticsBus> {
        &self.diagnostics
    }

    /// Create and register a tracker
    ///
    /// Fails with [`Error::DuplicateNamespace`] if the namespace is live.
    pub fn initialize(&mut self, config: TrackerConfig) -> Result<&mut Tracker> {
        let namespace = config.namespace()?.to_string();
        if self.trackers.contains_key(&namespace) {
            return Err(Error::duplicate_namespace(namespace));
        }

        let mut builder = Tracker::builder(config).diagnostics(Arc::clone(&self.diagnostics));
        if let Some(transport) = &self.transport {
            builder = builder.transport(Arc::clone(transport));
        }
        let tracker = builder.build()?;

        info!(namespace = %namespace, trackers = self.trackers.len() + 1, "Tracker registered");
        let entry = self.trackers.entry(namespace).or_insert(tracker);
        Ok(entry)
    }

    pub fn get(&self, namespace: &str) -> Option<&Tracker> {
        self.trackers.get(namespace)
    }

    pub fn get_mut(&mut self, namespace: &str) -> Option<&mut Tracker> {
        self.trackers.get_mut(namespace)
    }

    /// Unregister a tracker; its namespace becomes available again
    pub fn remove(&mut self, namespace: &str) -> Option<Tracker> {
        self.trackers.shift_remove(namespace)
    }

    /// Registered namespaces in registration order
    pub fn namespaces(&self) -> Vec<&str> {
        self.trackers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    pub fn set_location(&mut self, location: Location, namespaces: Option<&[&str]>) -> Result<()> {
        location.validate()?;
        self.for_each_target("set_location", namespaces, |tracker| {
            tracker.set_location(location.clone())
        })
    }

    pub fn set_source(&mut self, source: Source, namespaces: Option<&[&str]>) -> Result<()> {
        source.validate()?;
        self.for_each_target("set_source", namespaces, |tracker| {
            tracker.set_source(source.clone())
        })
    }

    pub fn set_segment(&mut self, segment: Segment, namespaces: Option<&[&str]>) -> Result<()> {
        segment.validate()?;
        self.for_each_target("set_segment", namespaces, |tracker| {
            tracker.set_segment(segment.clone())
        })
    }

    pub fn add_product(&mut self, product: Product, namespaces: Option<&[&str]>) -> Result<()> {
        product.validate()?;
        self.for_each_target("add_product", namespaces, |tracker| {
            tracker.add_product(product.clone())
        })
    }

    /// Fire the commerce action on each targeted tracker, consuming its products
    pub fn set_commerce_action(
        &mut self,
        action: &str,
        namespaces: Option<&[&str]>,
    ) -> Result<Vec<TrackingId>> {
        let mut ids = Vec::new();
        self.for_each_target("set_commerce_action", namespaces, |tracker| {
            ids.push(tracker.set_commerce_action(action)?);
            Ok(())
        })?;
        Ok(ids)
    }

    /// Start a flush on every tracker
    pub fn flush_all(&self) -> Vec<FlushHandle> {
        self.trackers.values().map(Tracker::flush).collect()
    }

    /// Resolve every target before touching any tracker, so an unknown
    /// namespace leaves all of them unchanged
    fn for_each_target<F>(
        &mut self,
        operation: &str,
        namespaces: Option<&[&str]>,
        mut apply: F,
    ) -> Result<()>
    where
        F: FnMut(&mut Tracker) -> Result<()>,
    {
        let targets: Vec<String> = match namespaces {
            None => self.trackers.keys().cloned().collect(),
            Some(list) => {
                if let Some(missing) = list.iter().find(|ns| !self.trackers.contains_key(**ns)) {
                    return Err(Error::not_initialized(format!(
                        "{operation} for namespace '{missing}'"
                    )));
                }
                list.iter().map(|ns| ns.to_string()).collect()
            }
        };

        debug!(operation, targets = targets.len(), "Applying to trackers");
        for namespace in targets {
            if let Some(tracker) = self.trackers.get_mut(&namespace) {
                apply(tracker)?;
            }
        }
        Ok(())
    }
}
