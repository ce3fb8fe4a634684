//! Core dispatch types: priorities, script origins, configuration.
//!
//! This module contains the building blocks shared by every other module.
//! Hosts configure these via `DispatchConfig` rather than modifying the core.

pub mod config;
pub mod origin;
pub mod priority;

pub use config::{CompanionFamily, DispatchConfig, Verbosity};
pub use origin::ScriptOrigin;
pub use priority::Priority;
