//! The caller-facing outcome of a reconciliation.

use serde::{Deserialize, Serialize};

/// Outcome of one reconciliation call.
///
/// `conflicts` carries partial-application failures reported by the backing
/// store, verbatim. `errors` carries transport or store-level failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub success: bool,
    #[serde(default)]
    pub conflicts: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl SyncResult {
    /// A successful outcome with nothing to report.
    pub fn ok() -> Self {
        Self {
            success: true,
            conflicts: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// A failed outcome carrying a single error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            conflicts: Vec::new(),
            errors: vec![message.into()],
        }
    }

    /// A failed outcome carrying conflicts reported by the backing store.
    pub fn conflicted(conflicts: Vec<String>) -> Self {
        Self {
            success: false,
            conflicts,
            errors: Vec::new(),
        }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}
