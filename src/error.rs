//! Error types for the dispatch core.
//!
//! Every fault the core can observe is a typed error. None of them are
//! allowed to interrupt the host's own event pipeline: they are logged at
//! the boundary where they occur and dispatch carries on.

use thiserror::Error;

use crate::events::EventTypeId;
use crate::triggers::TriggerId;

/// Boxed error returned by trigger executors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure to resolve an event type to its handler group.
///
/// A missing handler list is a static property of the host's type table,
/// so these are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("No handler list found for event type {name} ({event_type}) or any of its ancestors")]
    NoHandlerGroup {
        event_type: EventTypeId,
        name: String,
    },

    #[error("Event type {event_type} is not known to the event hierarchy")]
    UnknownEventType {
        event_type: EventTypeId,
    },
}

/// Invalid entries in the host's event type table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("Event type {event_type} is already registered as '{existing}'")]
    DuplicateType {
        event_type: EventTypeId,
        existing: String,
    },

    #[error("Event type '{name}' ({event_type}) extends unknown parent {parent}")]
    UnknownParent {
        event_type: EventTypeId,
        name: String,
        parent: EventTypeId,
    },

    #[error("Event type id {event_type} is reserved for the root event type")]
    ReservedRoot {
        event_type: EventTypeId,
    },
}

/// The host refused a registration or could not list its listeners.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("Host rejected listener registration for {event_type}: {reason}")]
    Rejected {
        event_type: EventTypeId,
        reason: String,
    },

    #[error("Host could not supply the listener list for {event_type}: {reason}")]
    ListenersUnavailable {
        event_type: EventTypeId,
        reason: String,
    },
}

/// A trigger's execute call failed.
#[derive(Debug, Error)]
pub enum TriggerFault {
    #[error("{trigger} ('{name}') failed: {source}")]
    Failed {
        trigger: TriggerId,
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("{trigger} ('{name}') panicked: {message}")]
    Panicked {
        trigger: TriggerId,
        name: String,
        message: String,
    },
}

impl TriggerFault {
    /// The trigger that faulted.
    #[must_use]
    pub fn trigger(&self) -> TriggerId {
        match self {
            TriggerFault::Failed { trigger, .. } | TriggerFault::Panicked { trigger, .. } => *trigger,
        }
    }
}

/// Top-level error for dispatch core operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("{trigger} ('{name}') uses {actual} routing but {expected} routing was required")]
    RoutingMismatch {
        trigger: TriggerId,
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Result alias for dispatch core operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
