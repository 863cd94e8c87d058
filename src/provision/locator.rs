//! Install directory location.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;

use super::tag::Tag;

/// Name of the file recording the tag of the last completed run.
pub const TAG_FILE: &str = ".id";
/// Name of the file recording the tag of an extracted prebuilt archive.
pub const PREBUILD_TAG_FILE: &str = ".prebuild";
/// Suffix of the sibling file stamped on every run that uses an install.
pub const USED_SUFFIX: &str = ".used";

/// Where a dependency bundle lives and who owns its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallLocation {
    /// Keyed on a tag under a base directory; cleaned and re-tagged as
    /// needed.
    Managed { base: PathBuf, tag: Tag },
    /// Supplied by the caller; never cleaned and never tagged.
    Pinned(PathBuf),
}

impl InstallLocation {
    /// The install directory.
    pub fn install_path(&self) -> PathBuf {
        match self {
            Self::Managed { base, tag } => base.join(tag.id()),
            Self::Pinned(path) => path.clone(),
        }
    }

    /// Sibling `<install>.lock` path.
    ///
    /// Computed for operators and logging only. Nothing acquires it.
    pub fn lock_path(&self) -> PathBuf {
        sibling(&self.install_path(), ".lock")
    }

    /// Sibling `<install>.used` stamp, rewritten whenever a run uses the
    /// install. Lives outside the install so stamping never changes it.
    pub fn used_path(&self) -> PathBuf {
        sibling(&self.install_path(), USED_SUFFIX)
    }

    /// Tag file inside the install directory.
    pub fn tag_file(&self) -> PathBuf {
        self.install_path().join(TAG_FILE)
    }

    /// Prebuild tag file inside the install directory.
    pub fn prebuild_tag_file(&self) -> PathBuf {
        self.install_path().join(PREBUILD_TAG_FILE)
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::Pinned(_))
    }

    /// Base directory of a managed location.
    pub fn base(&self) -> Option<&Path> {
        match self {
            Self::Managed { base, .. } => Some(base),
            Self::Pinned(_) => None,
        }
    }
}

/// `<path><suffix>` next to `path`.
pub(crate) fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Serializable summary of a location, for `status --json`.
#[derive(Debug, Clone, Serialize)]
pub struct LocationSummary {
    pub install_path: PathBuf,
    pub lock_path: PathBuf,
    pub pinned: bool,
}

impl From<&InstallLocation> for LocationSummary {
    fn from(location: &InstallLocation) -> Self {
        Self {
            install_path: location.install_path(),
            lock_path: location.lock_path(),
            pinned: location.is_pinned(),
        }
    }
}

/// Compute the install location for a dependency bundle.
///
/// A pinned path wins verbatim. Otherwise the location is
/// `base / tag.id()` and `base` is created if missing. The result is a
/// pure function of its inputs; the only side effect is the idempotent
/// directory creation.
pub fn locate(base: &Path, tag: &Tag, pinned: Option<&Path>) -> Result<InstallLocation> {
    let location = match pinned {
        Some(path) => InstallLocation::Pinned(path.to_path_buf()),
        None => {
            fs::create_dir_all(base)?;
            InstallLocation::Managed {
                base: base.to_path_buf(),
                tag: tag.clone(),
            }
        }
    };

    info!("Using install path {}", location.install_path().display());
    debug!("Lock path {}", location.lock_path().display());

    Ok(location)
}
