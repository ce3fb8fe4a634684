//! # script-dispatch
//!
//! The event-trigger dispatch core of an embedded scripting engine.
//!
//! Scripts compile to triggers bound to host event types. This crate maps
//! each event the host fires to the triggers interested in it, runs them
//! at the priority stage they declared, and keeps the host's listener
//! registrations in step with what scripts have loaded.
//!
//! ## Design Principles
//!
//! 1. **Host-Agnostic**: No hardcoded event types. Hosts describe their
//!    taxonomy once at startup as an explicit parent-pointer table.
//!
//! 2. **One Router Per Priority**: The host sees six listeners at most per
//!    handler list, no matter how many triggers are loaded.
//!
//! 3. **Scripts Can't Break the Host**: Trigger failures and panics are
//!    logged and contained; sibling triggers and the host's own pipeline
//!    carry on.
//!
//! ## Architecture
//!
//! ```text
//! host fires event ─▶ PriorityRouter (per stage) ─▶ DispatchEngine
//!                                                      │
//!                         TriggerRegistry::candidates_for ◀─┘
//!                                  │
//!                         HandlerListResolver (cached)
//!
//! script loader ─▶ DispatchCore::add_trigger ─▶ TriggerRegistry
//!               ─▶ DispatchCore::register_with_host ─▶ RegistrationSynchronizer ─▶ host
//! ```
//!
//! ## Modules
//!
//! - `core`: Priorities, script origins, configuration
//! - `events`: Event types, the type hierarchy, handler list resolution
//! - `triggers`: Compiled triggers and the registry
//! - `dispatch`: Routers, the dispatch engine, cancellation policy, timings
//! - `host`: Host integration and registration synchronization
//! - `runtime`: The `DispatchCore` facade used by the script loader
//! - `commands`: Script command collaborator used on unload
//! - `error`: Error types

pub mod commands;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod host;
pub mod runtime;
pub mod triggers;

// Re-export commonly used types
pub use crate::core::{CompanionFamily, DispatchConfig, Priority, ScriptOrigin, Verbosity};

pub use crate::events::{
    Event, EventHierarchy, EventTypeConfig, EventTypeId, HandlerGroup, HandlerListResolver,
    HostEvent, InteractAction, Interaction, UseResult,
};

pub use crate::triggers::{
    EventDescriptor, Routing, SelfRegistration, Trigger, TriggerBinding, TriggerId,
    TriggerRegistry,
};

pub use crate::dispatch::{
    CancellationPolicy, DispatchEngine, DispatchReport, ListenCancelled, PriorityRouter,
    PriorityRouters, TimingSink, TracingTimings,
};

pub use crate::host::{EventHost, ListenerKind, RegisteredListener, RegistrationSynchronizer, SyncReport};

pub use crate::runtime::{DispatchCore, DispatchCoreBuilder, UnloadSummary};

pub use crate::commands::{CommandRegistry, NoCommands};

pub use crate::error::{
    BoxError, DispatchError, HierarchyError, HostError, ResolutionError, TriggerFault,
};
