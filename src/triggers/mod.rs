//! Trigger model and registry.
//!
//! Triggers are compiled script units. The script loader creates them and
//! binds each to one or more event types; the registry keeps those
//! bindings and answers "which triggers care about this event?".
//!
//! ## Key Components
//!
//! - [`TriggerId`]: Identifier for a compiled trigger
//! - [`Trigger`]: Priority, predicate, and execute function
//! - [`Routing`]: Routed through the priority routers, or self-managed
//! - [`TriggerRegistry`]: Bindings in registration order, plus
//!   self-registered triggers tracked for unload
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use script_dispatch::core::ScriptOrigin;
//! use script_dispatch::events::{EventHierarchy, EventTypeConfig, EventTypeId, HandlerListResolver};
//! use script_dispatch::triggers::{Trigger, TriggerId, TriggerRegistry};
//!
//! const JOIN: EventTypeId = EventTypeId::new(1);
//!
//! let hierarchy = EventHierarchy::from_table([
//!     EventTypeConfig::new(JOIN, "PlayerJoinEvent").with_handler_list(),
//! ])
//! .unwrap();
//! let resolver = Arc::new(HandlerListResolver::new(Arc::new(hierarchy)));
//! let registry = TriggerRegistry::new(resolver);
//!
//! let greet = Trigger::new(TriggerId::new(1), "greet", ScriptOrigin::from("join.sk"), |_| Ok(()));
//! registry.add_binding(JOIN, Arc::new(greet));
//!
//! assert_eq!(registry.candidates_for(JOIN).count(), 1);
//! ```

mod registry;
mod trigger;

pub use registry::{Candidates, RemovalCounts, TriggerBinding, TriggerRegistry};
pub use trigger::{EventDescriptor, Executor, Predicate, Routing, SelfRegistration, Trigger, TriggerId};
