//! The dispatch engine.
//!
//! One call to [`DispatchEngine::dispatch`] handles one (event, priority)
//! pair delivered by a router:
//!
//! 1. Collect candidate triggers for the event's type. None: done.
//! 2. Drop the whole dispatch if the event is cancelled and neither
//!    allow-listed nor exempt.
//! 3. Run, in registration order, every candidate declared at this
//!    priority whose predicate accepts the event. Each run is timed and
//!    isolated: a failing or panicking trigger is logged and its siblings
//!    still run.
//!
//! Candidates span every priority; only the ones matching the currently
//! firing stage run, since the host calls each stage's router in turn.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use smallvec::SmallVec;

use crate::core::{Priority, Verbosity};
use crate::error::TriggerFault;
use crate::events::Event;
use crate::triggers::{Trigger, TriggerRegistry};

use super::policy::{CancellationPolicy, ListenCancelled};
use super::timings::TimingSink;

/// Outcome of one dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// The stage that fired.
    pub priority: Priority,

    /// Candidate triggers across all priorities.
    pub candidates: usize,

    /// Triggers that ran (faulted ones included).
    pub executed: usize,

    /// Triggers whose predicate or execute call failed.
    pub faults: usize,

    /// The event was cancelled and not observed.
    pub suppressed: bool,
}

/// Routes host events to the triggers registered for them.
pub struct DispatchEngine {
    registry: Arc<TriggerRegistry>,
    listen_cancelled: Arc<ListenCancelled>,
    policy: CancellationPolicy,
    timings: Arc<dyn TimingSink>,
    verbosity: Verbosity,
}

impl DispatchEngine {
    /// Create an engine over a registry.
    pub fn new(
        registry: Arc<TriggerRegistry>,
        listen_cancelled: Arc<ListenCancelled>,
        policy: CancellationPolicy,
        timings: Arc<dyn TimingSink>,
        verbosity: Verbosity,
    ) -> Self {
        Self {
            registry,
            listen_cancelled,
            policy,
            timings,
            verbosity,
        }
    }

    /// The registry this engine reads from.
    #[must_use]
    pub fn registry(&self) -> &Arc<TriggerRegistry> {
        &self.registry
    }

    /// The observe-cancelled allow-list.
    #[must_use]
    pub fn listen_cancelled(&self) -> &Arc<ListenCancelled> {
        &self.listen_cancelled
    }

    /// Dispatch one event at one priority stage.
    pub fn dispatch(&self, event: &dyn Event, priority: Priority) -> DispatchReport {
        let event_type = event.event_type();
        let candidates: SmallVec<[Arc<Trigger>; 8]> = self.registry.candidates_for(event_type).collect();

        let mut report = DispatchReport {
            priority,
            candidates: candidates.len(),
            ..DispatchReport::default()
        };
        if candidates.is_empty() {
            return report;
        }

        let verbose = self.verbosity.is_very_high();
        let started = Instant::now();
        if verbose {
            let any_will_run = candidates
                .iter()
                .any(|t| t.priority() == priority && matches!(self.accepts(t, event), Ok(true)));
            if !any_will_run {
                return report;
            }
            let name = self.registry.resolver().hierarchy().name(event_type);
            tracing::info!("");
            tracing::info!("== {} ==", name);
        }

        if self.policy.suppresses(event, &self.listen_cancelled) {
            if verbose {
                tracing::info!(" -x- was cancelled");
            }
            report.suppressed = true;
            return report;
        }

        for trigger in &candidates {
            if trigger.priority() != priority {
                continue;
            }
            match self.accepts(trigger, event) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(fault) => {
                    log_fault(trigger, &fault);
                    report.faults += 1;
                    continue;
                }
            }

            report.executed += 1;
            if let Err(fault) = self.run(trigger, event, verbose) {
                log_fault(trigger, &fault);
                report.faults += 1;
            }
        }

        if verbose {
            tracing::info!("== took {:.3} milliseconds ==", millis(started));
        }
        report
    }

    fn accepts(&self, trigger: &Trigger, event: &dyn Event) -> Result<bool, TriggerFault> {
        catch_unwind(AssertUnwindSafe(|| trigger.check(event))).map_err(|payload| TriggerFault::Panicked {
            trigger: trigger.id,
            name: trigger.name.clone(),
            message: panic_message(payload.as_ref()),
        })
    }

    fn run(&self, trigger: &Trigger, event: &dyn Event, verbose: bool) -> Result<(), TriggerFault> {
        if verbose {
            tracing::info!("# {}", trigger.name);
        }
        let started = Instant::now();

        let outcome = catch_unwind(AssertUnwindSafe(|| trigger.execute(event)));

        let elapsed = started.elapsed();
        self.timings.record(&trigger.debug_label(), elapsed);
        if verbose {
            tracing::info!("# {} took {:.3} milliseconds", trigger.name, millis(started));
        }

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(TriggerFault::Failed {
                trigger: trigger.id,
                name: trigger.name.clone(),
                source,
            }),
            Err(payload) => Err(TriggerFault::Panicked {
                trigger: trigger.id,
                name: trigger.name.clone(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

impl std::fmt::Debug for DispatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchEngine")
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

fn log_fault(trigger: &Trigger, fault: &TriggerFault) {
    tracing::error!(
        trigger = %trigger.id,
        name = %trigger.name,
        origin = %trigger.origin,
        error = %fault,
        "Trigger execution failed"
    );
}

fn millis(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScriptOrigin;
    use crate::events::{EventHierarchy, EventTypeConfig, EventTypeId, HandlerListResolver, HostEvent};
    use crate::triggers::TriggerId;
    use parking_lot::Mutex;
    use std::time::Duration;

    const JOIN: EventTypeId = EventTypeId::new(1);
    const BREAK: EventTypeId = EventTypeId::new(2);

    #[derive(Default)]
    struct RecordingTimings(Mutex<Vec<String>>);

    impl TimingSink for RecordingTimings {
        fn record(&self, label: &str, _elapsed: Duration) {
            self.0.lock().push(label.to_string());
        }
    }

    struct Fixture {
        engine: DispatchEngine,
        registry: Arc<TriggerRegistry>,
        listen_cancelled: Arc<ListenCancelled>,
        timings: Arc<RecordingTimings>,
        log: Arc<Mutex<Vec<u32>>>,
    }

    fn fixture(verbosity: Verbosity) -> Fixture {
        let hierarchy = EventHierarchy::from_table([
            EventTypeConfig::new(JOIN, "PlayerJoinEvent").with_handler_list(),
            EventTypeConfig::new(BREAK, "BlockBreakEvent").with_handler_list(),
        ])
        .unwrap();
        let resolver = Arc::new(HandlerListResolver::new(Arc::new(hierarchy)));
        let registry = Arc::new(TriggerRegistry::new(resolver));
        let listen_cancelled = Arc::new(ListenCancelled::new());
        let timings = Arc::new(RecordingTimings::default());
        let engine = DispatchEngine::new(
            registry.clone(),
            listen_cancelled.clone(),
            CancellationPolicy::default(),
            timings.clone(),
            verbosity,
        );
        Fixture {
            engine,
            registry,
            listen_cancelled,
            timings,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn logging_trigger(id: u32, log: &Arc<Mutex<Vec<u32>>>) -> Trigger {
        let log = Arc::clone(log);
        Trigger::new(TriggerId::new(id), format!("t{}", id), ScriptOrigin::from("test.sk"), move |_| {
            log.lock().push(id);
            Ok(())
        })
    }

    #[test]
    fn test_no_candidates_fast_path() {
        let f = fixture(Verbosity::Normal);
        let report = f.engine.dispatch(&HostEvent::new(JOIN), Priority::Normal);
        assert_eq!(report, DispatchReport { priority: Priority::Normal, ..DispatchReport::default() });
        assert!(f.timings.0.lock().is_empty());
    }

    #[test]
    fn test_runs_only_matching_priority() {
        let f = fixture(Verbosity::Normal);
        f.registry.add_binding(JOIN, Arc::new(logging_trigger(1, &f.log)));
        f.registry.add_binding(JOIN, Arc::new(logging_trigger(2, &f.log).with_priority(Priority::High)));

        let report = f.engine.dispatch(&HostEvent::new(JOIN), Priority::High);
        assert_eq!(report.candidates, 2);
        assert_eq!(report.executed, 1);
        assert_eq!(*f.log.lock(), vec![2]);
    }

    #[test]
    fn test_predicate_filters() {
        let f = fixture(Verbosity::Normal);
        f.registry.add_binding(
            JOIN,
            Arc::new(logging_trigger(1, &f.log).with_predicate(|e| e.cancelled().is_some())),
        );

        f.engine.dispatch(&HostEvent::new(JOIN), Priority::Normal);
        assert!(f.log.lock().is_empty());

        f.engine.dispatch(&HostEvent::new(JOIN).cancellable(false), Priority::Normal);
        assert_eq!(*f.log.lock(), vec![1]);
    }

    #[test]
    fn test_cancelled_suppressed_then_allow_listed() {
        let f = fixture(Verbosity::Normal);
        f.registry.add_binding(BREAK, Arc::new(logging_trigger(1, &f.log)));
        let event = HostEvent::new(BREAK).cancellable(true);

        let report = f.engine.dispatch(&event, Priority::Normal);
        assert!(report.suppressed);
        assert_eq!(report.executed, 0);

        f.listen_cancelled.insert(BREAK);
        let report = f.engine.dispatch(&event, Priority::Normal);
        assert!(!report.suppressed);
        assert_eq!(*f.log.lock(), vec![1]);
    }

    #[test]
    fn test_fault_isolation() {
        let f = fixture(Verbosity::Normal);
        f.registry.add_binding(
            JOIN,
            Arc::new(Trigger::new(TriggerId::new(1), "broken", ScriptOrigin::from("test.sk"), |_| {
                Err("no such variable".into())
            })),
        );
        f.registry.add_binding(
            JOIN,
            Arc::new(Trigger::new(TriggerId::new(2), "panics", ScriptOrigin::from("test.sk"), |_| {
                panic!("script bug")
            })),
        );
        f.registry.add_binding(JOIN, Arc::new(logging_trigger(3, &f.log)));

        let report = f.engine.dispatch(&HostEvent::new(JOIN), Priority::Normal);
        assert_eq!(report.executed, 3);
        assert_eq!(report.faults, 2);
        assert_eq!(*f.log.lock(), vec![3]);
    }

    #[test]
    fn test_panicking_predicate_isolated() {
        let f = fixture(Verbosity::Normal);
        f.registry.add_binding(
            JOIN,
            Arc::new(logging_trigger(1, &f.log).with_predicate(|_| panic!("bad condition"))),
        );
        f.registry.add_binding(JOIN, Arc::new(logging_trigger(2, &f.log)));

        let report = f.engine.dispatch(&HostEvent::new(JOIN), Priority::Normal);
        assert_eq!(report.faults, 1);
        assert_eq!(report.executed, 1);
        assert_eq!(*f.log.lock(), vec![2]);
    }

    #[test]
    fn test_timing_sample_per_trigger() {
        let f = fixture(Verbosity::Normal);
        f.registry.add_binding(JOIN, Arc::new(logging_trigger(1, &f.log)));
        f.registry.add_binding(JOIN, Arc::new(logging_trigger(2, &f.log)));

        f.engine.dispatch(&HostEvent::new(JOIN), Priority::Normal);
        assert_eq!(*f.timings.0.lock(), vec!["test.sk: t1".to_string(), "test.sk: t2".to_string()]);
    }

    #[test]
    fn test_verbose_precheck_skips_when_nothing_runs() {
        let f = fixture(Verbosity::VeryHigh);
        f.registry.add_binding(BREAK, Arc::new(logging_trigger(1, &f.log).with_priority(Priority::Monitor)));

        // Cancelled, but nothing at this priority would run anyway.
        let report = f.engine.dispatch(&HostEvent::new(BREAK).cancellable(true), Priority::Normal);
        assert!(!report.suppressed);
        assert_eq!(report.executed, 0);

        let report = f.engine.dispatch(&HostEvent::new(BREAK).cancellable(false), Priority::Monitor);
        assert_eq!(report.executed, 1);
        assert_eq!(*f.log.lock(), vec![1]);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
