//! Handler list resolution.
//!
//! Maps an event type to the handler list the host keeps its listeners in.
//! A type without its own list borrows the nearest ancestor's; the root
//! type never counts. Outcomes are cached per type for the process
//! lifetime, since the host's type table is static for a run.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::ResolutionError;

use super::event::EventTypeId;
use super::hierarchy::{EventHierarchy, HandlerGroup};

/// Resolves event types to handler groups, with caching.
///
/// Safe to share between host threads. Two threads resolving the same
/// uncached type both compute it; the first insert wins and both see the
/// same value.
#[derive(Debug)]
pub struct HandlerListResolver {
    hierarchy: Arc<EventHierarchy>,
    cache: Mutex<FxHashMap<EventTypeId, Result<HandlerGroup, ResolutionError>>>,
}

impl HandlerListResolver {
    /// Create a resolver over a host type table.
    pub fn new(hierarchy: Arc<EventHierarchy>) -> Self {
        Self {
            hierarchy,
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    /// The type table this resolver walks.
    #[must_use]
    pub fn hierarchy(&self) -> &EventHierarchy {
        &self.hierarchy
    }

    /// Resolve `event_type` to its handler group.
    ///
    /// Failures are logged once, when first computed, and then served from
    /// the cache like successes: a missing handler list won't appear later.
    pub fn resolve(&self, event_type: EventTypeId) -> Result<HandlerGroup, ResolutionError> {
        if let Some(cached) = self.cache.lock().get(&event_type) {
            return cached.clone();
        }

        let computed = self.walk(event_type);

        let mut cache = self.cache.lock();
        let vacant = !cache.contains_key(&event_type);
        let outcome = cache.entry(event_type).or_insert(computed).clone();
        drop(cache);

        if vacant {
            if let Err(err) = &outcome {
                tracing::error!(
                    event_type = %event_type,
                    error = %err,
                    "Failed to get handler list for event type"
                );
            }
        }
        outcome
    }

    /// Do two types resolve to the same handler group?
    ///
    /// False if either fails to resolve.
    #[must_use]
    pub fn same_group(&self, a: EventTypeId, b: EventTypeId) -> bool {
        match (self.resolve(a), self.resolve(b)) {
            (Ok(ga), Ok(gb)) => ga == gb,
            _ => false,
        }
    }

    /// Number of cached outcomes.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    fn walk(&self, event_type: EventTypeId) -> Result<HandlerGroup, ResolutionError> {
        if !self.hierarchy.contains(event_type) {
            return Err(ResolutionError::UnknownEventType { event_type });
        }

        let mut current = event_type;
        loop {
            if !current.is_root() && self.hierarchy.declares_handler_list(current) {
                return Ok(HandlerGroup(current));
            }
            match self.hierarchy.parent(current) {
                Some(parent) if !parent.is_root() => current = parent,
                _ => {
                    return Err(ResolutionError::NoHandlerGroup {
                        event_type,
                        name: self.hierarchy.name(event_type),
                    })
                }
            }
        }
    }
}
