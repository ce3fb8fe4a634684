//! Registration synchronization.
//!
//! Reconciles the registry's bindings with the host's listener lists. Each
//! (handler group, priority) pair gets at most one router registration;
//! the host's own list is the record of what is already attached.
//!
//! Companion families are a named exception: their primary type's binding
//! registers the primary and its co-registered companions together, and
//! any binding on a companion is skipped. No other type gets this
//! treatment.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::core::{DispatchConfig, Priority};
use crate::dispatch::PriorityRouters;
use crate::error::HostError;
use crate::events::{EventTypeId, HandlerGroup, HandlerListResolver};

use super::EventHost;

/// "This stage's router is attached to this handler list."
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegisteredHandlerKey {
    pub group: HandlerGroup,
    pub priority: Priority,
}

/// What one synchronization pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Router registrations issued to the host.
    pub registered: usize,

    /// Pairs skipped because the host already had the router.
    pub already_registered: usize,

    /// Companion bindings skipped in favour of their primary.
    pub skipped_companions: usize,

    /// Pairs that failed to resolve or register.
    pub failed: usize,
}

/// Attaches routers to the host for every bound event type.
pub struct RegistrationSynchronizer {
    host: Arc<dyn EventHost>,
    resolver: Arc<HandlerListResolver>,
    config: Arc<DispatchConfig>,
    pass: Mutex<()>,
}

impl RegistrationSynchronizer {
    /// Create a synchronizer for one host.
    pub fn new(
        host: Arc<dyn EventHost>,
        resolver: Arc<HandlerListResolver>,
        config: Arc<DispatchConfig>,
    ) -> Self {
        Self {
            host,
            resolver,
            config,
            pass: Mutex::new(()),
        }
    }

    /// Make sure every (event type, priority) pair has its router attached.
    ///
    /// Idempotent: a second pass over the same pairs issues no
    /// registrations. Passes are serialized, so concurrent load batches
    /// can't both attach the same router. Faults are logged and counted;
    /// they never stop the pass.
    pub fn ensure_registered(
        &self,
        pairs: &[(EventTypeId, Priority)],
        routers: &PriorityRouters,
    ) -> SyncReport {
        let _pass = self.pass.lock();
        let mut report = SyncReport::default();
        let mut seen = FxHashSet::default();

        for &(event_type, priority) in pairs {
            if self.config.is_companion(event_type) {
                report.skipped_companions += 1;
                continue;
            }

            if !self.attach(event_type, priority, &mut seen, &mut report, routers) {
                continue;
            }

            // Companions go through the same key check: one sharing a
            // handler list with something already attached is satisfied.
            if let Some(family) = self.config.family_of_primary(event_type) {
                for &companion in &family.co_registered {
                    self.attach(companion, priority, &mut seen, &mut report, routers);
                }
            }
        }

        tracing::debug!(
            registered = report.registered,
            already_registered = report.already_registered,
            skipped_companions = report.skipped_companions,
            failed = report.failed,
            "Synchronized event registrations"
        );
        report
    }

    /// Attach the router for one pair unless its handler list already has
    /// it. Returns true only when a new registration was issued.
    fn attach(
        &self,
        event_type: EventTypeId,
        priority: Priority,
        seen: &mut FxHashSet<RegisteredHandlerKey>,
        report: &mut SyncReport,
        routers: &PriorityRouters,
    ) -> bool {
        let Ok(group) = self.resolver.resolve(event_type) else {
            report.failed += 1;
            return false;
        };
        let key = RegisteredHandlerKey { group, priority };
        if seen.contains(&key) {
            report.already_registered += 1;
            return false;
        }

        match self.is_registered(key) {
            Ok(true) => {
                seen.insert(key);
                report.already_registered += 1;
                return false;
            }
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(event_type = %event_type, error = %err, "Could not read host listener list");
                report.failed += 1;
                return false;
            }
        }

        if !self.register(event_type, priority, report, routers) {
            return false;
        }
        seen.insert(key);
        true
    }

    fn is_registered(&self, key: RegisteredHandlerKey) -> Result<bool, HostError> {
        let owner = self.config.owner.as_str();
        Ok(self
            .host
            .registered_listeners(key.group)?
            .iter()
            .any(|l| l.is_router_of(owner, key.priority)))
    }

    fn register(
        &self,
        event_type: EventTypeId,
        priority: Priority,
        report: &mut SyncReport,
        routers: &PriorityRouters,
    ) -> bool {
        let router = Arc::clone(routers.get(priority));
        match self.host.register_router(event_type, router, &self.config.owner) {
            Ok(()) => {
                report.registered += 1;
                true
            }
            Err(err) => {
                tracing::warn!(
                    event_type = %event_type,
                    priority = %priority,
                    error = %err,
                    "Host rejected event registration"
                );
                report.failed += 1;
                false
            }
        }
    }
}

impl std::fmt::Debug for RegistrationSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationSynchronizer")
            .field("owner", &self.config.owner)
            .finish_non_exhaustive()
    }
}
