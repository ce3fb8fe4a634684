//! Shared fixtures for integration tests: a small host event table and a
//! stub host that records registrations and fires events stage by stage.

#![allow(dead_code)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use script_dispatch::core::{Priority, ScriptOrigin};
use script_dispatch::dispatch::{DispatchReport, PriorityRouter};
use script_dispatch::error::HostError;
use script_dispatch::events::{
    Event, EventHierarchy, EventTypeConfig, EventTypeId, HandlerGroup, HandlerListResolver,
};
use script_dispatch::host::{EventHost, ListenerKind, RegisteredListener};
use script_dispatch::triggers::{Trigger, TriggerId};

pub const PLAYER_EVENT: EventTypeId = EventTypeId::new(1);
pub const PLAYER_JOIN: EventTypeId = EventTypeId::new(2);
pub const PLAYER_QUIT: EventTypeId = EventTypeId::new(3);
pub const BLOCK_EVENT: EventTypeId = EventTypeId::new(4);
pub const BLOCK_BREAK: EventTypeId = EventTypeId::new(5);
pub const PLAYER_INTERACT: EventTypeId = EventTypeId::new(6);
pub const INTERACT_ENTITY: EventTypeId = EventTypeId::new(7);
pub const INTERACT_AT_ENTITY: EventTypeId = EventTypeId::new(8);
pub const ARMOR_STAND_MANIPULATE: EventTypeId = EventTypeId::new(9);
pub const VIP_JOIN: EventTypeId = EventTypeId::new(10);
pub const ORPHAN: EventTypeId = EventTypeId::new(11);

/// A trimmed-down game server event table.
pub fn hierarchy() -> Arc<EventHierarchy> {
    let table = [
        EventTypeConfig::new(PLAYER_EVENT, "PlayerEvent"),
        EventTypeConfig::new(PLAYER_JOIN, "PlayerJoinEvent").extends(PLAYER_EVENT).with_handler_list(),
        EventTypeConfig::new(PLAYER_QUIT, "PlayerQuitEvent").extends(PLAYER_EVENT).with_handler_list(),
        EventTypeConfig::new(BLOCK_EVENT, "BlockEvent"),
        EventTypeConfig::new(BLOCK_BREAK, "BlockBreakEvent").extends(BLOCK_EVENT).with_handler_list(),
        EventTypeConfig::new(PLAYER_INTERACT, "PlayerInteractEvent").extends(PLAYER_EVENT).with_handler_list(),
        EventTypeConfig::new(INTERACT_ENTITY, "PlayerInteractEntityEvent")
            .extends(PLAYER_EVENT)
            .with_handler_list(),
        EventTypeConfig::new(INTERACT_AT_ENTITY, "PlayerInteractAtEntityEvent")
            .extends(INTERACT_ENTITY)
            .with_handler_list(),
        EventTypeConfig::new(ARMOR_STAND_MANIPULATE, "PlayerArmorStandManipulateEvent")
            .extends(INTERACT_AT_ENTITY),
        EventTypeConfig::new(VIP_JOIN, "VipJoinEvent").extends(PLAYER_JOIN),
        EventTypeConfig::new(ORPHAN, "OrphanEvent"),
    ];
    Arc::new(EventHierarchy::from_table(table).unwrap())
}

/// Host stub: keeps handler lists per group, records every registration
/// call, and fires events through attached routers in priority order.
pub struct StubHost {
    resolver: HandlerListResolver,
    lists: Mutex<FxHashMap<HandlerGroup, Vec<(RegisteredListener, Arc<PriorityRouter>)>>>,
    calls: Mutex<Vec<(EventTypeId, Priority)>>,
    reject: Mutex<Vec<EventTypeId>>,
    listing_delay: Mutex<Option<Duration>>,
}

impl StubHost {
    pub fn new(hierarchy: Arc<EventHierarchy>) -> Self {
        Self {
            resolver: HandlerListResolver::new(hierarchy),
            lists: Mutex::new(FxHashMap::default()),
            calls: Mutex::new(Vec::new()),
            reject: Mutex::new(Vec::new()),
            listing_delay: Mutex::new(None),
        }
    }

    /// Make every listener-list read take at least `delay`.
    pub fn slow_listing(&self, delay: Duration) {
        *self.listing_delay.lock() = Some(delay);
    }

    /// Refuse registrations for `event_type` from now on.
    pub fn reject(&self, event_type: EventTypeId) {
        self.reject.lock().push(event_type);
    }

    /// Every registration call accepted so far.
    pub fn registration_calls(&self) -> Vec<(EventTypeId, Priority)> {
        self.calls.lock().clone()
    }

    /// Fire an event through every router attached to its handler list,
    /// lowest priority first.
    pub fn fire(&self, event: &dyn Event) -> Vec<DispatchReport> {
        let Ok(group) = self.resolver.resolve(event.event_type()) else {
            return Vec::new();
        };
        let mut routers: Vec<Arc<PriorityRouter>> = self
            .lists
            .lock()
            .get(&group)
            .map(|list| list.iter().map(|(_, r)| Arc::clone(r)).collect())
            .unwrap_or_default();
        routers.sort_by_key(|r| r.priority());
        routers.iter().map(|r| r.on_event(event)).collect()
    }
}

impl EventHost for StubHost {
    fn registered_listeners(&self, group: HandlerGroup) -> Result<Vec<RegisteredListener>, HostError> {
        let delay = *self.listing_delay.lock();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        Ok(self
            .lists
            .lock()
            .get(&group)
            .map(|list| list.iter().map(|(l, _)| l.clone()).collect())
            .unwrap_or_default())
    }

    fn register_router(
        &self,
        event_type: EventTypeId,
        router: Arc<PriorityRouter>,
        owner: &str,
    ) -> Result<(), HostError> {
        if self.reject.lock().contains(&event_type) {
            return Err(HostError::Rejected {
                event_type,
                reason: "event type is not listenable".to_string(),
            });
        }
        let group = self.resolver.resolve(event_type).map_err(|e| HostError::Rejected {
            event_type,
            reason: e.to_string(),
        })?;

        let listener = RegisteredListener {
            owner: owner.to_string(),
            priority: router.priority(),
            kind: ListenerKind::PriorityRouter(router.priority()),
        };
        self.calls.lock().push((event_type, router.priority()));
        self.lists.lock().entry(group).or_default().push((listener, router));
        Ok(())
    }
}

/// Shared execution log.
pub type ExecutionLog = Arc<Mutex<Vec<String>>>;

pub fn execution_log() -> ExecutionLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// A trigger that appends its name to `log` when executed.
pub fn recording_trigger(id: u32, name: &str, origin: &str, priority: Priority, log: &ExecutionLog) -> Trigger {
    let log = Arc::clone(log);
    let label = name.to_string();
    Trigger::new(TriggerId::new(id), name, ScriptOrigin::from(origin), move |_| {
        log.lock().push(label.clone());
        Ok(())
    })
    .with_priority(priority)
}
