//! Domain types for the tracker: events, contexts and validated newtypes

pub mod commerce;
pub mod context;
pub mod event;
pub mod newtypes;
pub mod payload;

pub use commerce::{CommerceAction, Product, ProductBuilder};
pub use context::{ContextSnapshot, Location, Segment, Source};
pub use event::{Event, EventType, TrackedEvent};
pub use newtypes::{Namespace, SchemaUri, TrackingId};
pub use payload::{Payload, SelfDescribingJson};
