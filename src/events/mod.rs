//! Host event model.
//!
//! The host owns its event taxonomy; the dispatch core only consumes it.
//! Hosts describe their types once at startup and hand event instances to
//! the routers they registered.
//!
//! ## Key Components
//!
//! - [`EventTypeId`]: Opaque identifier for event types (host-defined)
//! - [`Event`]: What the core needs from an event instance
//! - [`EventHierarchy`]: Parent-pointer table over all event types
//! - [`HandlerListResolver`]: Maps a type to the handler list it shares

mod event;
mod hierarchy;
mod resolver;

pub use event::{Event, EventTypeId, HostEvent, InteractAction, Interaction, UseResult};
pub use hierarchy::{Ancestors, EventHierarchy, EventTypeConfig, HandlerGroup};
pub use resolver::HandlerListResolver;
