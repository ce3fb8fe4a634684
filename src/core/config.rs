//! Dispatch configuration types.
//!
//! Hosts configure the dispatch core at startup by providing:
//! - `DispatchConfig`: owner identity, verbosity, exception lists
//! - `CompanionFamily`: event types that must be registered as a unit
//!
//! The core never hardcodes host event types - hosts name them here.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::events::EventTypeId;

/// Diagnostic verbosity.
///
/// Mirrors the script engine's own verbosity setting; the dispatch core
/// only logs per-event and per-trigger lines at [`Verbosity::VeryHigh`]
/// and above.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    High,
    VeryHigh,
    Debug,
}

impl Verbosity {
    /// Whether per-event diagnostics should be logged.
    #[must_use]
    pub fn is_very_high(self) -> bool {
        self >= Verbosity::VeryHigh
    }
}

/// A primary event type plus companion subtypes sharing one conceptual
/// action.
///
/// This is a named exception list, not a general rule. Hosts whose
/// interaction events split one action across several types (for example
/// an entity-interact event with an "interact at position" subtype and an
/// "armor stand manipulate" subtype) declare the family here:
///
/// - binding the primary registers the primary *and* every
///   `co_registered` companion under the primary's router;
/// - bindings on any companion (`co_registered` or `covered`) are skipped
///   during registration, since the primary's registration satisfies them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionFamily {
    /// The type whose binding drives registration.
    pub primary: EventTypeId,

    /// Companions registered alongside the primary.
    #[serde(default)]
    pub co_registered: SmallVec<[EventTypeId; 2]>,

    /// Companions already reached through a co-registered type's handler
    /// list; skipped, never registered directly.
    #[serde(default)]
    pub covered: SmallVec<[EventTypeId; 2]>,
}

impl CompanionFamily {
    /// Create a family with no companions yet.
    pub fn new(primary: EventTypeId) -> Self {
        Self {
            primary,
            co_registered: SmallVec::new(),
            covered: SmallVec::new(),
        }
    }

    /// Add a companion registered together with the primary (builder pattern).
    #[must_use]
    pub fn with_companion(mut self, event_type: EventTypeId) -> Self {
        self.co_registered.push(event_type);
        self
    }

    /// Add a companion that is covered without its own registration
    /// (builder pattern).
    #[must_use]
    pub fn with_covered(mut self, event_type: EventTypeId) -> Self {
        self.covered.push(event_type);
        self
    }

    /// Is `event_type` one of this family's companions?
    #[must_use]
    pub fn is_companion(&self, event_type: EventTypeId) -> bool {
        self.co_registered.contains(&event_type) || self.covered.contains(&event_type)
    }
}

/// Complete dispatch configuration.
///
/// Hosts provide this at startup to configure the dispatch core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Identity under which routers are registered with the host, and by
    /// which they are recognised in the host's listener lists.
    pub owner: String,

    /// Diagnostic verbosity.
    pub verbosity: Verbosity,

    /// Event type families registered as a unit.
    pub companion_families: Vec<CompanionFamily>,

    /// Event types dispatched even when reported cancelled.
    pub listen_cancelled: Vec<EventTypeId>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            owner: "scripts".to_string(),
            verbosity: Verbosity::default(),
            companion_families: Vec::new(),
            listen_cancelled: Vec::new(),
        }
    }
}

impl DispatchConfig {
    /// Create a configuration for the given owner identity.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }

    /// Set verbosity (builder pattern).
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Add a companion family (builder pattern).
    #[must_use]
    pub fn with_companion_family(mut self, family: CompanionFamily) -> Self {
        self.companion_families.push(family);
        self
    }

    /// Observe an event type even when cancelled (builder pattern).
    #[must_use]
    pub fn with_listen_cancelled(mut self, event_type: EventTypeId) -> Self {
        if !self.listen_cancelled.contains(&event_type) {
            self.listen_cancelled.push(event_type);
        }
        self
    }

    /// Find the family whose primary is `event_type`.
    #[must_use]
    pub fn family_of_primary(&self, event_type: EventTypeId) -> Option<&CompanionFamily> {
        self.companion_families.iter().find(|f| f.primary == event_type)
    }

    /// Is `event_type` a companion in any family?
    #[must_use]
    pub fn is_companion(&self, event_type: EventTypeId) -> bool {
        self.companion_families.iter().any(|f| f.is_companion(event_type))
    }
}
