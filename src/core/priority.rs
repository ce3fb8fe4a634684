//! Listener priorities.
//!
//! The host invokes listeners one priority stage at a time, from
//! [`Priority::Lowest`] up to [`Priority::Monitor`]. Triggers declare the
//! stage they run at, and the dispatch core keeps exactly one router per
//! stage.

use serde::{Deserialize, Serialize};

/// A fixed ordering stage at which the host invokes listeners.
///
/// Variants are declared in host invocation order, so the derived `Ord`
/// matches the order the host fires them in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Runs first; for listeners that only want a first look.
    Lowest,
    /// Runs before most listeners.
    Low,
    /// The default stage.
    #[default]
    Normal,
    /// Runs after most listeners.
    High,
    /// Runs last among listeners allowed to change the outcome.
    Highest,
    /// Observes the final outcome; should not modify the event.
    Monitor,
}

impl Priority {
    /// Every priority, in host invocation order.
    pub const ALL: [Priority; 6] = [
        Priority::Lowest,
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Highest,
        Priority::Monitor,
    ];

    /// Number of priority stages.
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this priority in [`Priority::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Upper-case name as the host spells it.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Priority::Lowest => "LOWEST",
            Priority::Low => "LOW",
            Priority::Normal => "NORMAL",
            Priority::High => "HIGH",
            Priority::Highest => "HIGHEST",
            Priority::Monitor => "MONITOR",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
