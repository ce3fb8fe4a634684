//! Priority routers.
//!
//! The host attaches listeners per (event type, priority). Rather than one
//! listener per trigger, the core registers one router per priority stage
//! and lets the engine pick the triggers for whichever stage is firing.

use std::sync::Arc;

use crate::core::Priority;
use crate::events::Event;

use super::engine::{DispatchEngine, DispatchReport};

/// The listener the host calls for one priority stage.
pub struct PriorityRouter {
    priority: Priority,
    engine: Arc<DispatchEngine>,
}

impl PriorityRouter {
    /// Create a router for one stage.
    pub fn new(priority: Priority, engine: Arc<DispatchEngine>) -> Self {
        Self { priority, engine }
    }

    /// The stage this router serves.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Host entry point: an event fired at this router's stage.
    pub fn on_event(&self, event: &dyn Event) -> DispatchReport {
        self.engine.dispatch(event, self.priority)
    }
}

impl std::fmt::Debug for PriorityRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityRouter")
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// One router per priority, created once.
#[derive(Debug)]
pub struct PriorityRouters {
    routers: [Arc<PriorityRouter>; Priority::COUNT],
}

impl PriorityRouters {
    /// Create the full set of routers over one engine.
    pub fn new(engine: &Arc<DispatchEngine>) -> Self {
        Self {
            routers: Priority::ALL.map(|p| Arc::new(PriorityRouter::new(p, Arc::clone(engine)))),
        }
    }

    /// The router for a stage.
    #[must_use]
    pub fn get(&self, priority: Priority) -> &Arc<PriorityRouter> {
        &self.routers[priority.index()]
    }

    /// All routers, in host invocation order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<PriorityRouter>> {
        self.routers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Verbosity;
    use crate::dispatch::{CancellationPolicy, ListenCancelled, TracingTimings};
    use crate::events::{EventHierarchy, HandlerListResolver, HostEvent, EventTypeId};
    use crate::triggers::TriggerRegistry;

    fn routers() -> PriorityRouters {
        let resolver = Arc::new(HandlerListResolver::new(Arc::new(EventHierarchy::new())));
        let engine = Arc::new(DispatchEngine::new(
            Arc::new(TriggerRegistry::new(resolver)),
            Arc::new(ListenCancelled::new()),
            CancellationPolicy::default(),
            Arc::new(TracingTimings),
            Verbosity::Normal,
        ));
        PriorityRouters::new(&engine)
    }

    #[test]
    fn test_one_router_per_priority() {
        let routers = routers();
        assert_eq!(routers.iter().count(), Priority::COUNT);
        for priority in Priority::ALL {
            assert_eq!(routers.get(priority).priority(), priority);
        }
    }

    #[test]
    fn test_router_identity_stable() {
        let routers = routers();
        let a = Arc::clone(routers.get(Priority::High));
        assert!(Arc::ptr_eq(&a, routers.get(Priority::High)));
        assert!(!Arc::ptr_eq(&a, routers.get(Priority::Low)));
    }

    #[test]
    fn test_on_event_tags_priority() {
        let routers = routers();
        let report = routers.get(Priority::Highest).on_event(&HostEvent::new(EventTypeId::new(1)));
        assert_eq!(report.priority, Priority::Highest);
        assert_eq!(report.candidates, 0);
    }
}
