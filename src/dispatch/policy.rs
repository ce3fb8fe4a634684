//! Cancellation policy.
//!
//! Scripts normally don't see events another listener already cancelled.
//! Two things override that: a process-wide allow-list of event types that
//! are observed even when cancelled, and an exemption predicate for events
//! the host marks cancelled by default even though nothing was stopped.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashSet;

use crate::events::{Event, EventTypeId, UseResult};

/// Event types dispatched even when reported cancelled.
///
/// Matches the event's exact type; ancestors don't count. Other parts of
/// the script engine fill this in before dispatch begins.
#[derive(Debug, Default)]
pub struct ListenCancelled {
    types: RwLock<FxHashSet<EventTypeId>>,
}

impl ListenCancelled {
    /// Create an empty allow-list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type. Returns false if it was already present.
    pub fn insert(&self, event_type: EventTypeId) -> bool {
        self.types.write().insert(event_type)
    }

    /// Remove a type. Returns false if it wasn't present.
    pub fn remove(&self, event_type: EventTypeId) -> bool {
        self.types.write().remove(&event_type)
    }

    /// Is this type observed even when cancelled?
    #[must_use]
    pub fn contains(&self, event_type: EventTypeId) -> bool {
        self.types.read().contains(&event_type)
    }

    /// Number of allow-listed types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Check if the allow-list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl FromIterator<EventTypeId> for ListenCancelled {
    fn from_iter<I: IntoIterator<Item = EventTypeId>>(iter: I) -> Self {
        Self {
            types: RwLock::new(iter.into_iter().collect()),
        }
    }
}

/// Predicate exempting a cancelled event from suppression.
pub type Exemption = Arc<dyn Fn(&dyn Event) -> bool + Send + Sync>;

/// The default exemption: an air click whose item use isn't denied.
///
/// Hosts typically report clicks on nothing as already cancelled, yet
/// scripts still expect to see them. Whether that holds depends on the
/// host version, which is why the policy is replaceable.
#[must_use]
pub fn air_click_exemption(event: &dyn Event) -> bool {
    event
        .interaction()
        .is_some_and(|i| i.action.is_air_click() && i.use_item != UseResult::Deny)
}

/// Decides whether a dispatch is suppressed because its event was
/// cancelled.
#[derive(Clone)]
pub struct CancellationPolicy {
    exemption: Option<Exemption>,
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self::air_click()
    }
}

impl CancellationPolicy {
    /// Suppress cancelled events except non-denied air clicks.
    #[must_use]
    pub fn air_click() -> Self {
        Self {
            exemption: Some(Arc::new(air_click_exemption)),
        }
    }

    /// Suppress every cancelled event that isn't allow-listed.
    #[must_use]
    pub fn strict() -> Self {
        Self { exemption: None }
    }

    /// Use a custom exemption predicate.
    pub fn with_exemption<F>(exemption: F) -> Self
    where
        F: Fn(&dyn Event) -> bool + Send + Sync + 'static,
    {
        Self {
            exemption: Some(Arc::new(exemption)),
        }
    }

    /// Is the event exempt from cancellation suppression?
    #[must_use]
    pub fn is_exempt(&self, event: &dyn Event) -> bool {
        self.exemption.as_ref().is_some_and(|f| f(event))
    }

    /// Should this dispatch be skipped entirely?
    ///
    /// True when the event reports cancelled, its exact type isn't
    /// allow-listed, and the exemption doesn't apply.
    #[must_use]
    pub fn suppresses(&self, event: &dyn Event, listen_cancelled: &ListenCancelled) -> bool {
        let cancelled = event.cancelled() == Some(true) && !listen_cancelled.contains(event.event_type());
        cancelled && !self.is_exempt(event)
    }
}

impl std::fmt::Debug for CancellationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationPolicy")
            .field("exemption", &self.exemption.is_some())
            .finish()
    }
}
