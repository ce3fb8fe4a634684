//! The dispatch core facade.
//!
//! [`DispatchCore`] owns every piece of process-scoped dispatch state: the
//! resolver cache, the trigger registry, the observe-cancelled allow-list,
//! the engine, and the routers. The script loader talks to it; the host
//! talks to its routers. Create one at engine startup and drop it at
//! shutdown.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use script_dispatch::core::{Priority, ScriptOrigin};
//! use script_dispatch::dispatch::PriorityRouter;
//! use script_dispatch::error::HostError;
//! use script_dispatch::events::{EventHierarchy, EventTypeConfig, EventTypeId, HandlerGroup, HostEvent};
//! use script_dispatch::host::{EventHost, RegisteredListener};
//! use script_dispatch::runtime::DispatchCore;
//! use script_dispatch::triggers::{Trigger, TriggerId};
//!
//! const JOIN: EventTypeId = EventTypeId::new(1);
//!
//! struct NullHost;
//!
//! impl EventHost for NullHost {
//!     fn registered_listeners(&self, _group: HandlerGroup) -> Result<Vec<RegisteredListener>, HostError> {
//!         Ok(Vec::new())
//!     }
//!
//!     fn register_router(&self, _event_type: EventTypeId, _router: Arc<PriorityRouter>, _owner: &str) -> Result<(), HostError> {
//!         Ok(())
//!     }
//! }
//!
//! let hierarchy = EventHierarchy::from_table([
//!     EventTypeConfig::new(JOIN, "PlayerJoinEvent").with_handler_list(),
//! ])
//! .unwrap();
//! let core = DispatchCore::builder(Arc::new(hierarchy), Arc::new(NullHost)).build();
//!
//! let greet = Trigger::new(TriggerId::new(1), "greet", ScriptOrigin::from("join.sk"), |_| Ok(()));
//! core.add_trigger(&[JOIN], greet).unwrap();
//! assert_eq!(core.register_with_host().registered, 1);
//!
//! let report = core.router(Priority::Normal).on_event(&HostEvent::new(JOIN));
//! assert_eq!(report.executed, 1);
//!
//! let summary = core.remove_triggers(&ScriptOrigin::from("join.sk"));
//! assert_eq!(summary.triggers, 1);
//! ```

use std::sync::Arc;

use crate::commands::{CommandRegistry, NoCommands};
use crate::core::{DispatchConfig, Priority, ScriptOrigin};
use crate::dispatch::{
    CancellationPolicy, DispatchEngine, DispatchReport, ListenCancelled, PriorityRouter,
    PriorityRouters, TimingSink, TracingTimings,
};
use crate::error::{DispatchError, Result};
use crate::events::{Event, EventHierarchy, EventTypeId, HandlerListResolver};
use crate::host::{EventHost, RegistrationSynchronizer, SyncReport};
use crate::triggers::{RemovalCounts, Routing, Trigger, TriggerRegistry};

/// What unloading one script removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnloadSummary {
    /// Script files unloaded.
    pub files: usize,

    /// Bindings plus self-registered triggers removed.
    pub triggers: usize,

    /// Commands removed.
    pub commands: usize,
}

impl From<RemovalCounts> for UnloadSummary {
    fn from(counts: RemovalCounts) -> Self {
        Self {
            files: 1,
            triggers: counts.bindings_removed + counts.self_registered_removed,
            commands: counts.commands_removed,
        }
    }
}

/// Process-scoped dispatch state.
pub struct DispatchCore {
    config: Arc<DispatchConfig>,
    resolver: Arc<HandlerListResolver>,
    registry: Arc<TriggerRegistry>,
    listen_cancelled: Arc<ListenCancelled>,
    engine: Arc<DispatchEngine>,
    routers: PriorityRouters,
    synchronizer: RegistrationSynchronizer,
    commands: Arc<dyn CommandRegistry>,
}

impl DispatchCore {
    /// Start building a core over a host type table and a host.
    pub fn builder(hierarchy: Arc<EventHierarchy>, host: Arc<dyn EventHost>) -> DispatchCoreBuilder {
        DispatchCoreBuilder {
            hierarchy,
            host,
            config: DispatchConfig::default(),
            policy: CancellationPolicy::default(),
            timings: Arc::new(TracingTimings),
            commands: Arc::new(NoCommands),
        }
    }

    /// Bind a compiled trigger to one or more event types.
    ///
    /// Self-managed triggers belong in
    /// [`add_self_registering_trigger`](Self::add_self_registering_trigger).
    pub fn add_trigger(&self, event_types: &[EventTypeId], trigger: impl Into<Arc<Trigger>>) -> Result<()> {
        let trigger = trigger.into();
        if let Routing::SelfManaged(_) = trigger.descriptor.routing {
            return Err(routing_mismatch(&trigger, "routed"));
        }
        for &event_type in event_types {
            self.registry.add_binding(event_type, Arc::clone(&trigger));
        }
        Ok(())
    }

    /// Track a trigger that has already registered itself with the host.
    pub fn add_self_registering_trigger(&self, trigger: impl Into<Arc<Trigger>>) -> Result<()> {
        let trigger = trigger.into();
        if let Routing::Routed = trigger.descriptor.routing {
            return Err(routing_mismatch(&trigger, "self-managed"));
        }
        self.registry.add_self_registered(trigger);
        Ok(())
    }

    /// Unload everything one script registered.
    pub fn remove_triggers(&self, origin: &ScriptOrigin) -> UnloadSummary {
        let counts = self.registry.remove_by_origin(origin, self.commands.as_ref());
        let summary = UnloadSummary::from(counts);
        tracing::debug!(
            origin = %origin,
            triggers = summary.triggers,
            commands = summary.commands,
            "Unloaded script triggers"
        );
        summary
    }

    /// Unload every trigger.
    pub fn remove_all_triggers(&self) -> RemovalCounts {
        let counts = self.registry.clear_all();
        tracing::debug!(
            bindings = counts.bindings_removed,
            self_registered = counts.self_registered_removed,
            "Removed all triggers"
        );
        counts
    }

    /// Attach routers to the host for every currently bound event type.
    ///
    /// Safe to call after every load batch; already attached pairs are
    /// left alone.
    pub fn register_with_host(&self) -> SyncReport {
        let pairs = self.registry.bound_pairs();
        self.synchronizer.ensure_registered(&pairs, &self.routers)
    }

    /// Dispatch an event at one priority, as that stage's router would.
    pub fn dispatch(&self, event: &dyn Event, priority: Priority) -> DispatchReport {
        self.engine.dispatch(event, priority)
    }

    /// The observe-cancelled allow-list.
    #[must_use]
    pub fn listen_cancelled(&self) -> &ListenCancelled {
        &self.listen_cancelled
    }

    /// The router for one stage.
    #[must_use]
    pub fn router(&self, priority: Priority) -> &Arc<PriorityRouter> {
        self.routers.get(priority)
    }

    /// All routers.
    #[must_use]
    pub fn routers(&self) -> &PriorityRouters {
        &self.routers
    }

    /// The trigger registry.
    #[must_use]
    pub fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }

    /// The handler list resolver.
    #[must_use]
    pub fn resolver(&self) -> &HandlerListResolver {
        &self.resolver
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }
}

impl std::fmt::Debug for DispatchCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchCore")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .field("synchronizer", &self.synchronizer)
            .finish_non_exhaustive()
    }
}

fn routing_mismatch(trigger: &Trigger, expected: &'static str) -> DispatchError {
    DispatchError::RoutingMismatch {
        trigger: trigger.id,
        name: trigger.name.clone(),
        expected,
        actual: trigger.descriptor.routing.kind(),
    }
}

/// Builder for [`DispatchCore`].
pub struct DispatchCoreBuilder {
    hierarchy: Arc<EventHierarchy>,
    host: Arc<dyn EventHost>,
    config: DispatchConfig,
    policy: CancellationPolicy,
    timings: Arc<dyn TimingSink>,
    commands: Arc<dyn CommandRegistry>,
}

impl DispatchCoreBuilder {
    /// Set the configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the cancellation policy (builder pattern).
    #[must_use]
    pub fn with_cancellation_policy(mut self, policy: CancellationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the timing sink (builder pattern).
    #[must_use]
    pub fn with_timings(mut self, timings: Arc<dyn TimingSink>) -> Self {
        self.timings = timings;
        self
    }

    /// Set the command collaborator (builder pattern).
    #[must_use]
    pub fn with_commands(mut self, commands: Arc<dyn CommandRegistry>) -> Self {
        self.commands = commands;
        self
    }

    /// Build the core. Routers are created here, once per priority.
    pub fn build(self) -> DispatchCore {
        let config = Arc::new(self.config);
        let resolver = Arc::new(HandlerListResolver::new(self.hierarchy));
        let registry = Arc::new(TriggerRegistry::new(Arc::clone(&resolver)));
        let listen_cancelled: Arc<ListenCancelled> =
            Arc::new(config.listen_cancelled.iter().copied().collect());
        let engine = Arc::new(DispatchEngine::new(
            Arc::clone(&registry),
            Arc::clone(&listen_cancelled),
            self.policy,
            self.timings,
            config.verbosity,
        ));
        let routers = PriorityRouters::new(&engine);
        let synchronizer =
            RegistrationSynchronizer::new(self.host, Arc::clone(&resolver), Arc::clone(&config));

        DispatchCore {
            config,
            resolver,
            registry,
            listen_cancelled,
            engine,
            routers,
            synchronizer,
            commands: self.commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::events::{EventTypeConfig, HandlerGroup, HostEvent};
    use crate::host::RegisteredListener;
    use crate::triggers::{SelfRegistration, TriggerId};

    const JOIN: EventTypeId = EventTypeId::new(1);
    const QUIT: EventTypeId = EventTypeId::new(2);

    struct NullHost;

    impl EventHost for NullHost {
        fn registered_listeners(&self, _group: HandlerGroup) -> std::result::Result<Vec<RegisteredListener>, HostError> {
            Ok(Vec::new())
        }

        fn register_router(
            &self,
            _event_type: EventTypeId,
            _router: Arc<PriorityRouter>,
            _owner: &str,
        ) -> std::result::Result<(), HostError> {
            Ok(())
        }
    }

    struct Periodic;

    impl SelfRegistration for Periodic {
        fn unregister(&self, _trigger: &Trigger) {}
    }

    fn core(config: DispatchConfig) -> DispatchCore {
        let hierarchy = EventHierarchy::from_table([
            EventTypeConfig::new(JOIN, "PlayerJoinEvent").with_handler_list(),
            EventTypeConfig::new(QUIT, "PlayerQuitEvent").with_handler_list(),
        ])
        .unwrap();
        DispatchCore::builder(Arc::new(hierarchy), Arc::new(NullHost))
            .with_config(config)
            .build()
    }

    fn noop(id: u32, origin: &str) -> Trigger {
        Trigger::new(TriggerId::new(id), format!("t{}", id), ScriptOrigin::from(origin), |_| Ok(()))
    }

    #[test]
    fn test_add_trigger_binds_each_type() {
        let core = core(DispatchConfig::default());
        core.add_trigger(&[JOIN, QUIT], noop(1, "a.sk")).unwrap();

        assert_eq!(core.registry().binding_count(), 2);
        assert_eq!(core.dispatch(&HostEvent::new(QUIT), Priority::Normal).executed, 1);
    }

    #[test]
    fn test_routing_mismatch_rejected() {
        let core = core(DispatchConfig::default());
        let managed = noop(1, "a.sk").self_managed(Arc::new(Periodic));

        let err = core.add_trigger(&[JOIN], managed.clone()).unwrap_err();
        assert!(matches!(err, DispatchError::RoutingMismatch { expected: "routed", .. }));

        let err = core.add_self_registering_trigger(noop(2, "a.sk")).unwrap_err();
        assert!(matches!(err, DispatchError::RoutingMismatch { expected: "self-managed", .. }));

        core.add_self_registering_trigger(managed).unwrap();
        assert_eq!(core.registry().self_registered_count(), 1);
    }

    #[test]
    fn test_remove_triggers_summary() {
        let core = core(DispatchConfig::default());
        core.add_trigger(&[JOIN, QUIT], noop(1, "a.sk")).unwrap();
        core.add_self_registering_trigger(noop(2, "a.sk").self_managed(Arc::new(Periodic)))
            .unwrap();
        core.add_trigger(&[JOIN], noop(3, "b.sk")).unwrap();

        let summary = core.remove_triggers(&ScriptOrigin::from("a.sk"));
        assert_eq!(summary, UnloadSummary { files: 1, triggers: 3, commands: 0 });
        assert_eq!(core.registry().binding_count(), 1);
    }

    #[test]
    fn test_listen_cancelled_from_config() {
        let core = core(DispatchConfig::default().with_listen_cancelled(JOIN));
        core.add_trigger(&[JOIN, QUIT], noop(1, "a.sk")).unwrap();

        assert!(core.listen_cancelled().contains(JOIN));
        let join = core.dispatch(&HostEvent::new(JOIN).cancellable(true), Priority::Normal);
        let quit = core.dispatch(&HostEvent::new(QUIT).cancellable(true), Priority::Normal);
        assert_eq!(join.executed, 1);
        assert!(quit.suppressed);
    }

    #[test]
    fn test_remove_all_triggers() {
        let core = core(DispatchConfig::default());
        core.add_trigger(&[JOIN], noop(1, "a.sk")).unwrap();
        core.add_self_registering_trigger(noop(2, "b.sk").self_managed(Arc::new(Periodic)))
            .unwrap();

        let counts = core.remove_all_triggers();
        assert_eq!(counts.bindings_removed, 1);
        assert_eq!(counts.self_registered_removed, 1);
        assert!(core.registry().is_empty());
    }
}
