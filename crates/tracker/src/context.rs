//! Mutable context state attached to subsequently tracked events
//!
//! Location, source and segment hold exactly one value each; a write replaces
//! the previous value. Products accumulate until a commerce action takes them.

use surfside_core::{ContextSnapshot, Location, Product, Segment, Source};

#[derive(Debug, Clone, Default)]
pub struct ContextRegistry {
    location: Option<Location>,
    source: Option<Source>,
    segment: Option<Segment>,
    products: Vec<Product>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-seeded with a source context
    pub fn with_source(source: Option<Source>) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    pub fn set_location(&mut self, location: Location) {
        self.location = Some(location);
    }

    pub fn set_source(&mut self, source: Source) {
        self.source = Some(source);
    }

    pub fn set_segment(&mut self, segment: Segment) {
        self.segment = Some(segment);
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Remove and return the accumulated products, in insertion order
    pub fn take_products(&mut self) -> Vec<Product> {
        std::mem::take(&mut self.products)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    pub fn segment(&self) -> Option<&Segment> {
        self.segment.as_ref()
    }

    /// Copy of the single-valued contexts for an event being tracked now
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            location: self.location.clone(),
            source: self.source.clone(),
            segment: self.segment.clone(),
        }
    }
}
