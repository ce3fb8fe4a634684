//! Host integration.
//!
//! The host owns the real event pipeline. The dispatch core needs two
//! things from it: attach a router to an event type at a priority, and
//! list the listeners already attached to a handler list so that
//! registration stays idempotent.

mod sync;

pub use sync::{RegisteredHandlerKey, RegistrationSynchronizer, SyncReport};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::Priority;
use crate::dispatch::PriorityRouter;
use crate::error::HostError;
use crate::events::{EventTypeId, HandlerGroup};

/// What kind of listener a host registration holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListenerKind {
    /// A dispatch core router serving the given stage.
    PriorityRouter(Priority),
    /// Anything else (other plugins' listeners).
    Other,
}

/// One entry in a host handler list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredListener {
    /// Identity of whoever registered the listener.
    pub owner: String,

    /// Stage the host calls it at.
    pub priority: Priority,

    /// The listener itself.
    pub kind: ListenerKind,
}

impl RegisteredListener {
    /// Is this the router `owner` registered for `priority`?
    #[must_use]
    pub fn is_router_of(&self, owner: &str, priority: Priority) -> bool {
        self.owner == owner && self.kind == ListenerKind::PriorityRouter(priority)
    }
}

/// The host's event notification mechanism.
pub trait EventHost: Send + Sync {
    /// Listeners currently attached to a handler list.
    fn registered_listeners(&self, group: HandlerGroup) -> Result<Vec<RegisteredListener>, HostError>;

    /// Attach `router` to `event_type` at the router's priority on behalf
    /// of `owner`.
    fn register_router(
        &self,
        event_type: EventTypeId,
        router: Arc<PriorityRouter>,
        owner: &str,
    ) -> Result<(), HostError>;
}
