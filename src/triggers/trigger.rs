//! Compiled triggers.
//!
//! A trigger is what script compilation produces for one event handler:
//! a priority, an instance predicate, and an execute function. The dispatch
//! core holds triggers by `Arc` and never owns their lifecycle; the script
//! loader does.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{Priority, ScriptOrigin};
use crate::error::BoxError;
use crate::events::Event;

/// Unique identifier for a trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

impl TriggerId {
    /// Create a new trigger ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TriggerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Trigger({})", self.0)
    }
}

/// Instance predicate: does this trigger care about this particular event?
pub type Predicate = Arc<dyn Fn(&dyn Event) -> bool + Send + Sync>;

/// Execute function. Side effects only; errors are logged by the engine.
pub type Executor = Arc<dyn Fn(&dyn Event) -> Result<(), BoxError> + Send + Sync>;

/// A trigger's own host registration mechanism.
///
/// Self-managing triggers (periodic or scheduled events, for example)
/// attach themselves to the host without going through the priority
/// routers. The dispatch core only asks them to detach on unload.
pub trait SelfRegistration: Send + Sync {
    /// Detach one trigger.
    fn unregister(&self, trigger: &Trigger);

    /// Whether [`unregister_all`](SelfRegistration::unregister_all) is
    /// available. When it is, a full teardown calls it once per mechanism
    /// instead of calling `unregister` per trigger.
    fn supports_unregister_all(&self) -> bool {
        false
    }

    /// Detach every trigger this mechanism manages.
    fn unregister_all(&self) {}
}

/// How a trigger reaches the host.
#[derive(Clone)]
pub enum Routing {
    /// Dispatched through the shared priority routers.
    Routed,
    /// Registers and unregisters itself with the host.
    SelfManaged(Arc<dyn SelfRegistration>),
}

impl Routing {
    /// Label used in errors and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Routing::Routed => "routed",
            Routing::SelfManaged(_) => "self-managed",
        }
    }
}

impl std::fmt::Debug for Routing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

/// The event side of a trigger: priority, routing, and instance filter.
#[derive(Clone)]
pub struct EventDescriptor {
    /// Stage this trigger runs at.
    pub priority: Priority,

    /// Routed through the core, or self-managed.
    pub routing: Routing,

    predicate: Predicate,
}

impl Default for EventDescriptor {
    fn default() -> Self {
        Self {
            priority: Priority::default(),
            routing: Routing::Routed,
            predicate: Arc::new(|_| true),
        }
    }
}

impl EventDescriptor {
    /// Does this descriptor accept the event instance?
    #[must_use]
    pub fn check(&self, event: &dyn Event) -> bool {
        (self.predicate)(event)
    }

    /// Is this a self-managed descriptor?
    #[must_use]
    pub fn is_self_managed(&self) -> bool {
        matches!(self.routing, Routing::SelfManaged(_))
    }
}

impl std::fmt::Debug for EventDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDescriptor")
            .field("priority", &self.priority)
            .field("routing", &self.routing)
            .finish_non_exhaustive()
    }
}

/// A compiled trigger.
///
/// ## Example
///
/// ```
/// use script_dispatch::core::{Priority, ScriptOrigin};
/// use script_dispatch::events::{Event, EventTypeId, HostEvent};
/// use script_dispatch::triggers::{Trigger, TriggerId};
///
/// let trigger = Trigger::new(TriggerId::new(1), "on join", ScriptOrigin::from("join.sk"), |_| Ok(()))
///     .with_priority(Priority::High)
///     .with_predicate(|event| event.cancelled() != Some(true));
///
/// assert_eq!(trigger.priority(), Priority::High);
/// assert_eq!(trigger.debug_label(), "join.sk: on join");
/// assert!(trigger.check(&HostEvent::new(EventTypeId::new(1))));
/// ```
#[derive(Clone)]
pub struct Trigger {
    /// Unique identifier.
    pub id: TriggerId,

    /// Human-readable name (for logging).
    pub name: String,

    /// Script this trigger was compiled from.
    pub origin: ScriptOrigin,

    /// Priority, routing, and instance predicate.
    pub descriptor: EventDescriptor,

    executor: Executor,
}

impl Trigger {
    /// Create a routed trigger at normal priority that accepts every event.
    pub fn new<F>(id: TriggerId, name: impl Into<String>, origin: ScriptOrigin, execute: F) -> Self
    where
        F: Fn(&dyn Event) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            id,
            name: name.into(),
            origin,
            descriptor: EventDescriptor::default(),
            executor: Arc::new(execute),
        }
    }

    /// Set the priority (builder pattern).
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.descriptor.priority = priority;
        self
    }

    /// Set the instance predicate (builder pattern).
    #[must_use]
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&dyn Event) -> bool + Send + Sync + 'static,
    {
        self.descriptor.predicate = Arc::new(predicate);
        self
    }

    /// Make this trigger self-managed (builder pattern).
    #[must_use]
    pub fn self_managed(mut self, mechanism: Arc<dyn SelfRegistration>) -> Self {
        self.descriptor.routing = Routing::SelfManaged(mechanism);
        self
    }

    /// The stage this trigger runs at.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.descriptor.priority
    }

    /// Does this trigger accept the event instance?
    #[must_use]
    pub fn check(&self, event: &dyn Event) -> bool {
        self.descriptor.check(event)
    }

    /// Run the trigger against an event.
    pub fn execute(&self, event: &dyn Event) -> Result<(), BoxError> {
        (self.executor)(event)
    }

    /// Label used to tag timing samples: `"<origin>: <name>"`.
    #[must_use]
    pub fn debug_label(&self) -> String {
        format!("{}: {}", self.origin, self.name)
    }
}

impl std::fmt::Debug for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trigger")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
