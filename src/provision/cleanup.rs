//! Best-effort directory removal.

use std::path::Path;

use tracing::{info, warn};

use crate::sys;

/// Outcome of a best-effort removal.
///
/// Failures are reported as [`Cleanup::Warning`] and logged, never
/// propagated: provisioning proceeds optimistically and a later staleness
/// check catches anything left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleanup {
    Removed,
    Absent,
    Warning(String),
}

impl Cleanup {
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }
}

/// Remove `path` if it exists, swallowing errors.
pub fn remove_best_effort(path: &Path) -> Cleanup {
    match sys::remove_any(path) {
        Ok(true) => {
            info!("Removed {}", path.display());
            Cleanup::Removed
        }
        Ok(false) => Cleanup::Absent,
        Err(e) => {
            let msg = format!("Could not fully remove {}: {}", path.display(), e);
            warn!("{}", msg);
            Cleanup::Warning(msg)
        }
    }
}
