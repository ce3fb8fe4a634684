//! Host event instances.
//!
//! Events represent things that happen in the host. The dispatch core
//! never interprets an event's payload; it only needs the event's runtime
//! type, whether it was cancelled, and (for one interaction family) what
//! kind of click produced it.
//!
//! ## Design Philosophy
//!
//! Event types are host-defined, not hardcoded. The core doesn't know
//! about "player joined" or "block broken" - hosts describe their types
//! in an [`EventHierarchy`](super::EventHierarchy) and hand instances to
//! the routers they registered.

use serde::{Deserialize, Serialize};

/// Event type identifier. Hosts define what event types exist.
///
/// The core doesn't interpret these - they're opaque identifiers.
/// `EventTypeId(0)` is reserved for the root event type every other type
/// descends from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventTypeId(pub u32);

impl EventTypeId {
    /// The root "Event" type.
    pub const ROOT: EventTypeId = EventTypeId(0);

    /// Create a new event type ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Is this the root event type?
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == Self::ROOT.0
    }
}

impl std::fmt::Display for EventTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EventType({})", self.0)
    }
}

/// What kind of click produced an interaction event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractAction {
    LeftClickBlock,
    RightClickBlock,
    LeftClickAir,
    RightClickAir,
    /// Stepping on a pressure plate, trampling, etc.
    Physical,
}

impl InteractAction {
    /// A click that hit nothing.
    #[must_use]
    pub const fn is_air_click(self) -> bool {
        matches!(self, InteractAction::LeftClickAir | InteractAction::RightClickAir)
    }
}

/// Whether the host will let the held item be used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UseResult {
    Deny,
    #[default]
    Default,
    Allow,
}

/// Click details carried by interaction events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interaction {
    pub action: InteractAction,
    pub use_item: UseResult,
}

impl Interaction {
    /// Create interaction details.
    #[must_use]
    pub const fn new(action: InteractAction, use_item: UseResult) -> Self {
        Self { action, use_item }
    }
}

/// A host event instance, as seen by the dispatch core and by triggers.
///
/// Only [`event_type`](Event::event_type) is required. Events that can be
/// cancelled report their flag through [`cancelled`](Event::cancelled);
/// everything else returns `None`.
pub trait Event {
    /// The event's exact runtime type.
    fn event_type(&self) -> EventTypeId;

    /// `Some(flag)` if the event is cancellable, `None` otherwise.
    fn cancelled(&self) -> Option<bool> {
        None
    }

    /// Click details, for interaction events only.
    fn interaction(&self) -> Option<Interaction> {
        None
    }
}

/// A plain host event with contextual data.
///
/// Hosts with their own event structs implement [`Event`] directly;
/// `HostEvent` covers hosts (and tests) that only need a type, the
/// cancellation flag and click details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEvent {
    /// The type of event.
    pub event_type: EventTypeId,

    /// Cancellation flag. `None` for events that can't be cancelled.
    pub cancelled: Option<bool>,

    /// Click details for interaction events.
    pub interaction: Option<Interaction>,
}

impl HostEvent {
    /// Create a new event with just a type.
    pub fn new(event_type: EventTypeId) -> Self {
        Self {
            event_type,
            cancelled: None,
            interaction: None,
        }
    }

    /// Make the event cancellable with the given flag (builder pattern).
    #[must_use]
    pub fn cancellable(mut self, cancelled: bool) -> Self {
        self.cancelled = Some(cancelled);
        self
    }

    /// Attach click details (builder pattern).
    #[must_use]
    pub fn with_interaction(mut self, action: InteractAction, use_item: UseResult) -> Self {
        self.interaction = Some(Interaction::new(action, use_item));
        self
    }

    /// Set the cancellation flag on a cancellable event.
    ///
    /// Has no effect on events that aren't cancellable.
    pub fn set_cancelled(&mut self, cancelled: bool) {
        if self.cancelled.is_some() {
            self.cancelled = Some(cancelled);
        }
    }
}

impl Event for HostEvent {
    fn event_type(&self) -> EventTypeId {
        self.event_type
    }

    fn cancelled(&self) -> Option<bool> {
        self.cancelled
    }

    fn interaction(&self) -> Option<Interaction> {
        self.interaction
    }
}
