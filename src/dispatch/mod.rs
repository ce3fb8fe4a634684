//! Event dispatch.
//!
//! Host events arrive through one [`PriorityRouter`] per priority stage.
//! The [`DispatchEngine`] picks the candidate triggers, applies the
//! [`CancellationPolicy`], and runs the survivors in registration order,
//! reporting a timing sample per trigger to a [`TimingSink`].

mod engine;
mod policy;
mod router;
mod timings;

pub use engine::{DispatchEngine, DispatchReport};
pub use policy::{air_click_exemption, CancellationPolicy, Exemption, ListenCancelled};
pub use router::{PriorityRouter, PriorityRouters};
pub use timings::{TimingSink, TracingTimings};
