//! Reclaiming space from old managed installs.
//!
//! Every run that uses a managed install rewrites its sibling
//! `<install>.used` stamp, so the stamp's modification time is when that
//! install was last used. Installs provisioned before stamps existed fall
//! back to their tag file. Sibling installs under the same base last used
//! before a cutoff can be removed, together with their stamp.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::provision::locator::sibling;
use crate::provision::{remove_best_effort, Cleanup, TAG_FILE, USED_SUFFIX};

/// One install considered for pruning.
#[derive(Debug, Clone, Serialize)]
pub struct PruneCandidate {
    pub path: PathBuf,
    pub last_used: DateTime<Utc>,
    /// Whether it was removed. Always false on a dry run.
    pub removed: bool,
    #[serde(skip)]
    pub cleanup: Option<Cleanup>,
}

impl PruneCandidate {
    /// Whole days between last use and `now`.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_used).num_days()
    }
}

/// Find (and unless `dry_run`, remove) installs under `base` last used
/// more than `older_than_days` before `now`.
///
/// Only directories holding a tag file are considered, and `keep` is
/// never touched.
pub fn prune(
    base: &Path,
    keep: &Path,
    older_than_days: u32,
    dry_run: bool,
    now: DateTime<Utc>,
) -> Result<Vec<PruneCandidate>> {
    if !base.is_dir() {
        debug!("{} does not exist, nothing to prune", base.display());
        return Ok(Vec::new());
    }

    let cutoff = now - Duration::days(i64::from(older_than_days));
    let mut entries: Vec<_> = fs::read_dir(base)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry.path();
        if path == keep || !entry.file_type()?.is_dir() {
            continue;
        }

        let tag_file = path.join(TAG_FILE);
        if !tag_file.is_file() {
            debug!("Skipping {}: no tag file", path.display());
            continue;
        }
        let stamp = sibling(&path, USED_SUFFIX);
        let marker = if stamp.is_file() { &stamp } else { &tag_file };
        let last_used: DateTime<Utc> = fs::metadata(marker)?.modified()?.into();
        if last_used >= cutoff {
            continue;
        }

        let cleanup = if dry_run {
            info!("Would remove {}", path.display());
            None
        } else {
            let cleanup = remove_best_effort(&path);
            remove_best_effort(&stamp);
            Some(cleanup)
        };
        candidates.push(PruneCandidate {
            removed: matches!(cleanup, Some(Cleanup::Removed)),
            path,
            last_used,
            cleanup,
        });
    }

    Ok(candidates)
}
