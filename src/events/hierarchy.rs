//! The host's event type table.
//!
//! Hosts describe their event taxonomy once at startup: each type names
//! its parent and says whether it declares its own handler list. The
//! table is single-rooted; every type descends from the root "Event" type,
//! which is always present under [`EventTypeId::ROOT`].

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::HierarchyError;

use super::event::EventTypeId;

/// Identity of a host handler list.
///
/// A handler list belongs to the type that declares it, so the group is
/// named by that declaring type. Subtypes without their own list share
/// their ancestor's group, and the host de-duplicates listener
/// registrations per group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandlerGroup(pub EventTypeId);

impl HandlerGroup {
    /// The type that declares this handler list.
    #[must_use]
    pub const fn declaring_type(self) -> EventTypeId {
        self.0
    }
}

impl std::fmt::Display for HandlerGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HandlerGroup({})", self.0.raw())
    }
}

/// Configuration for one event type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeConfig {
    /// Unique identifier for this event type.
    pub id: EventTypeId,

    /// Human-readable name (for logging).
    pub name: String,

    /// Direct parent. Defaults to the root type.
    pub parent: EventTypeId,

    /// Does this type declare its own handler list?
    pub declares_handler_list: bool,
}

impl EventTypeConfig {
    /// Create a direct child of the root type with no handler list.
    pub fn new(id: EventTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent: EventTypeId::ROOT,
            declares_handler_list: false,
        }
    }

    /// Set the parent type (builder pattern).
    #[must_use]
    pub fn extends(mut self, parent: EventTypeId) -> Self {
        self.parent = parent;
        self
    }

    /// Declare a handler list on this type (builder pattern).
    #[must_use]
    pub fn with_handler_list(mut self) -> Self {
        self.declares_handler_list = true;
        self
    }
}

/// The host's event type hierarchy.
///
/// Built once at startup; hosts don't add event types mid-run. Types must
/// be registered parent-first, which keeps the parent chain acyclic.
///
/// ## Example
///
/// ```
/// use script_dispatch::events::{EventHierarchy, EventTypeConfig, EventTypeId};
///
/// const PLAYER: EventTypeId = EventTypeId::new(1);
/// const JOIN: EventTypeId = EventTypeId::new(2);
///
/// let hierarchy = EventHierarchy::from_table([
///     EventTypeConfig::new(PLAYER, "PlayerEvent"),
///     EventTypeConfig::new(JOIN, "PlayerJoinEvent").extends(PLAYER).with_handler_list(),
/// ])
/// .unwrap();
///
/// assert!(hierarchy.is_subtype_of(JOIN, PLAYER));
/// assert!(!hierarchy.is_subtype_of(PLAYER, JOIN));
/// ```
#[derive(Clone, Debug)]
pub struct EventHierarchy {
    types: FxHashMap<EventTypeId, EventTypeConfig>,
}

impl Default for EventHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHierarchy {
    /// Name of the root type.
    pub const ROOT_NAME: &'static str = "Event";

    /// Create a hierarchy containing only the root type.
    #[must_use]
    pub fn new() -> Self {
        let mut types = FxHashMap::default();
        types.insert(
            EventTypeId::ROOT,
            EventTypeConfig {
                id: EventTypeId::ROOT,
                name: Self::ROOT_NAME.to_string(),
                parent: EventTypeId::ROOT,
                declares_handler_list: false,
            },
        );
        Self { types }
    }

    /// Build a hierarchy from a static table, parents before children.
    pub fn from_table(
        table: impl IntoIterator<Item = EventTypeConfig>,
    ) -> Result<Self, HierarchyError> {
        let mut hierarchy = Self::new();
        for config in table {
            hierarchy.register(config)?;
        }
        Ok(hierarchy)
    }

    /// Register one event type. Its parent must already be registered.
    pub fn register(&mut self, config: EventTypeConfig) -> Result<(), HierarchyError> {
        if config.id.is_root() {
            return Err(HierarchyError::ReservedRoot { event_type: config.id });
        }
        if let Some(existing) = self.types.get(&config.id) {
            return Err(HierarchyError::DuplicateType {
                event_type: config.id,
                existing: existing.name.clone(),
            });
        }
        if !self.types.contains_key(&config.parent) {
            return Err(HierarchyError::UnknownParent {
                event_type: config.id,
                name: config.name,
                parent: config.parent,
            });
        }
        self.types.insert(config.id, config);
        Ok(())
    }

    /// Get a type's configuration.
    #[must_use]
    pub fn get(&self, event_type: EventTypeId) -> Option<&EventTypeConfig> {
        self.types.get(&event_type)
    }

    /// Check if a type is registered.
    #[must_use]
    pub fn contains(&self, event_type: EventTypeId) -> bool {
        self.types.contains_key(&event_type)
    }

    /// A type's direct parent. `None` for the root and for unknown types.
    #[must_use]
    pub fn parent(&self, event_type: EventTypeId) -> Option<EventTypeId> {
        if event_type.is_root() {
            return None;
        }
        self.types.get(&event_type).map(|c| c.parent)
    }

    /// A type's name, or its id rendering if unknown.
    #[must_use]
    pub fn name(&self, event_type: EventTypeId) -> String {
        self.types
            .get(&event_type)
            .map_or_else(|| event_type.to_string(), |c| c.name.clone())
    }

    /// Does `event_type` declare a handler list itself?
    #[must_use]
    pub fn declares_handler_list(&self, event_type: EventTypeId) -> bool {
        self.types.get(&event_type).is_some_and(|c| c.declares_handler_list)
    }

    /// Walk from `event_type` up to (and including) the root.
    ///
    /// Yields nothing for unknown types.
    pub fn ancestors(&self, event_type: EventTypeId) -> Ancestors<'_> {
        Ancestors {
            hierarchy: self,
            next: self.contains(event_type).then_some(event_type),
        }
    }

    /// Is `event_type` the same type as `ancestor` or a subtype of it?
    #[must_use]
    pub fn is_subtype_of(&self, event_type: EventTypeId, ancestor: EventTypeId) -> bool {
        self.ancestors(event_type).any(|t| t == ancestor)
    }

    /// Number of registered types, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false; the root type is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Iterator over a type and its ancestors, nearest first.
pub struct Ancestors<'a> {
    hierarchy: &'a EventHierarchy,
    next: Option<EventTypeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = EventTypeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.hierarchy.parent(current);
        Some(current)
    }
}
