//! Trigger registry.
//!
//! The registry is the source of truth for which triggers listen to which
//! event types. Bindings are kept in registration order, which is also
//! execution order among triggers sharing an event type and priority.
//!
//! Bindings live in a persistent vector: a lookup clones it in O(1) under
//! a read lock and scans the clone with no lock held, so script load and
//! unload can run while a dispatch is iterating.

use std::sync::Arc;

use im::Vector;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashSet;

use crate::commands::CommandRegistry;
use crate::core::{Priority, ScriptOrigin};
use crate::events::{EventTypeId, HandlerGroup, HandlerListResolver};

use super::trigger::{Routing, Trigger};

/// One (event type, trigger) pair.
///
/// A trigger declared against several event types gets one binding per
/// type, all sharing the same `Arc<Trigger>`.
#[derive(Clone, Debug)]
pub struct TriggerBinding {
    /// The event type the trigger was declared against.
    pub event_type: EventTypeId,

    /// The bound trigger.
    pub trigger: Arc<Trigger>,
}

/// What an unload removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemovalCounts {
    /// Routed bindings removed.
    pub bindings_removed: usize,

    /// Self-registered triggers removed (each was told to unregister).
    pub self_registered_removed: usize,

    /// Commands removed by the command collaborator.
    pub commands_removed: usize,
}

/// Registry for triggers.
///
/// When an event fires, use [`candidates_for`](TriggerRegistry::candidates_for)
/// to get the triggers bound to its type or any supertype sharing its
/// handler list.
#[derive(Debug)]
pub struct TriggerRegistry {
    resolver: Arc<HandlerListResolver>,

    /// Routed bindings, in registration order.
    bindings: RwLock<Vector<TriggerBinding>>,

    /// Triggers that manage their own host registration.
    self_registered: Mutex<Vec<Arc<Trigger>>>,
}

impl TriggerRegistry {
    /// Create a new empty registry.
    pub fn new(resolver: Arc<HandlerListResolver>) -> Self {
        Self {
            resolver,
            bindings: RwLock::new(Vector::new()),
            self_registered: Mutex::new(Vec::new()),
        }
    }

    /// The resolver used to compare handler groups.
    #[must_use]
    pub fn resolver(&self) -> &Arc<HandlerListResolver> {
        &self.resolver
    }

    /// Append a binding. No de-duplication.
    pub fn add_binding(&self, event_type: EventTypeId, trigger: Arc<Trigger>) {
        self.bindings.write().push_back(TriggerBinding { event_type, trigger });
    }

    /// Track a self-registering trigger for later unload.
    pub fn add_self_registered(&self, trigger: Arc<Trigger>) {
        self.self_registered.lock().push(trigger);
    }

    /// Triggers interested in an event of type `event_type`, in
    /// registration order.
    ///
    /// A binding matches when `event_type` is its bound type or a subtype
    /// of it, *and* both resolve to the same handler group. The second
    /// check keeps a subtype with its own handler list from reaching
    /// triggers bound to its ancestor's list.
    ///
    /// Priority and instance predicates are not checked here. The returned
    /// sequence works on a snapshot taken now; later registry changes don't
    /// affect it.
    pub fn candidates_for(&self, event_type: EventTypeId) -> Candidates<'_> {
        let group = self.resolver.resolve(event_type).ok();
        let snapshot = self.bindings.read().clone();
        Candidates {
            resolver: &self.resolver,
            event_type,
            group,
            snapshot: snapshot.into_iter(),
        }
    }

    /// Remove everything `origin` registered.
    ///
    /// Self-registered triggers are told to unregister while still
    /// tracked, with no registry lock held, and are dropped afterwards.
    /// Commands are delegated to `commands`.
    pub fn remove_by_origin(
        &self,
        origin: &ScriptOrigin,
        commands: &dyn CommandRegistry,
    ) -> RemovalCounts {
        let bindings_removed = {
            let mut bindings = self.bindings.write();
            let before = bindings.len();
            let kept: Vector<TriggerBinding> = bindings
                .iter()
                .filter(|b| b.trigger.origin != *origin)
                .cloned()
                .collect();
            *bindings = kept;
            before - bindings.len()
        };

        let removed: Vec<Arc<Trigger>> = self
            .self_registered
            .lock()
            .iter()
            .filter(|t| t.origin == *origin)
            .cloned()
            .collect();

        for trigger in &removed {
            if let Routing::SelfManaged(mechanism) = &trigger.descriptor.routing {
                mechanism.unregister(trigger);
            }
        }

        self.self_registered
            .lock()
            .retain(|t| !removed.iter().any(|r| Arc::ptr_eq(r, t)));

        RemovalCounts {
            bindings_removed,
            self_registered_removed: removed.len(),
            commands_removed: commands.unregister_commands(origin),
        }
    }

    /// Remove every binding and self-registered trigger.
    ///
    /// Mechanisms that support bulk unregistration are asked once each;
    /// the rest are asked per trigger.
    pub fn clear_all(&self) -> RemovalCounts {
        let bindings_removed = {
            let mut bindings = self.bindings.write();
            let count = bindings.len();
            bindings.clear();
            count
        };

        let removed = std::mem::take(&mut *self.self_registered.lock());

        let mut bulk_done = FxHashSet::default();
        for trigger in &removed {
            let Routing::SelfManaged(mechanism) = &trigger.descriptor.routing else {
                continue;
            };
            if mechanism.supports_unregister_all() {
                let key = Arc::as_ptr(mechanism).cast::<()>() as usize;
                if bulk_done.insert(key) {
                    mechanism.unregister_all();
                }
            } else {
                mechanism.unregister(trigger);
            }
        }

        RemovalCounts {
            bindings_removed,
            self_registered_removed: removed.len(),
            commands_removed: 0,
        }
    }

    /// Snapshot of every binding, in registration order.
    #[must_use]
    pub fn bindings(&self) -> Vector<TriggerBinding> {
        self.bindings.read().clone()
    }

    /// Distinct (event type, priority) pairs implied by current bindings,
    /// in first-seen order.
    #[must_use]
    pub fn bound_pairs(&self) -> Vec<(EventTypeId, Priority)> {
        let snapshot = self.bindings();
        let mut seen = FxHashSet::default();
        snapshot
            .iter()
            .map(|b| (b.event_type, b.trigger.priority()))
            .filter(|pair| seen.insert(*pair))
            .collect()
    }

    /// Distinct bound event types, in first-seen order.
    #[must_use]
    pub fn bound_event_types(&self) -> Vec<EventTypeId> {
        let snapshot = self.bindings();
        let mut seen = FxHashSet::default();
        snapshot
            .iter()
            .map(|b| b.event_type)
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// Number of routed bindings.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.read().len()
    }

    /// Number of tracked self-registered triggers.
    #[must_use]
    pub fn self_registered_count(&self) -> usize {
        self.self_registered.lock().len()
    }

    /// Check if registry holds nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.binding_count() == 0 && self.self_registered_count() == 0
    }
}

/// Lazy sequence of candidate triggers for one event type.
///
/// Single pass; built from a snapshot of the registry.
pub struct Candidates<'a> {
    resolver: &'a HandlerListResolver,
    event_type: EventTypeId,
    group: Option<HandlerGroup>,
    snapshot: im::vector::ConsumingIter<TriggerBinding>,
}

impl Candidates<'_> {
    /// The handler group the event type resolved to, if any.
    #[must_use]
    pub fn group(&self) -> Option<HandlerGroup> {
        self.group
    }
}

impl Iterator for Candidates<'_> {
    type Item = Arc<Trigger>;

    fn next(&mut self) -> Option<Self::Item> {
        let group = self.group?;
        let hierarchy = self.resolver.hierarchy();
        loop {
            let binding = self.snapshot.next()?;
            if hierarchy.is_subtype_of(self.event_type, binding.event_type)
                && self.resolver.resolve(binding.event_type).ok() == Some(group)
            {
                return Some(binding.trigger);
            }
        }
    }
}
