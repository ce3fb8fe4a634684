//! Script origin identity.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The script a trigger was compiled from.
///
/// Origins group triggers for bulk unload: unloading a script removes
/// every binding and self-registered trigger whose origin compares equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptOrigin(PathBuf);

impl ScriptOrigin {
    /// Create an origin from a script path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The script path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for ScriptOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&str> for ScriptOrigin {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_equality() {
        let a = ScriptOrigin::new("scripts/join.sk");
        let b = ScriptOrigin::from("scripts/join.sk");
        let c = ScriptOrigin::from("scripts/quit.sk");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.path(), Path::new("scripts/join.sk"));
        assert_eq!(format!("{}", a), "scripts/join.sk");
    }
}
