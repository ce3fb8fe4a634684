//! Script command collaborator.
//!
//! Commands are registered by the script loader, not by the dispatch core,
//! but unloading a script has to drop them too. The core delegates that
//! part and only counts the result.

use crate::core::ScriptOrigin;

/// Unregisters the commands a script declared.
pub trait CommandRegistry: Send + Sync {
    /// Remove every command declared by `origin`, returning how many.
    fn unregister_commands(&self, origin: &ScriptOrigin) -> usize;
}

/// Command registry for hosts without script commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCommands;

impl CommandRegistry for NoCommands {
    fn unregister_commands(&self, _origin: &ScriptOrigin) -> usize {
        0
    }
}
