//! Environment pass-through files.
//!
//! Some ports run CMake in a context that cannot see the caller's
//! environment. Values they need are written to `<build_root>/_env/<VAR>.txt`
//! and the whole directory is copied into the vcpkg install before
//! packages are built.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::provision::remove_best_effort;
use crate::sys;

/// Directory name used on both sides.
pub const ENV_DIR: &str = "_env";

/// The `_env` directory under a build root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFiles {
    dir: PathBuf,
}

impl EnvFiles {
    pub fn new(build_root: &Path) -> Self {
        Self {
            dir: build_root.join(ENV_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record `value` for `var`, replacing any previous value.
    pub fn write(&self, var: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.file(var), value)?;
        Ok(())
    }

    /// Value recorded for `var`, if any.
    pub fn read(&self, var: &str) -> Option<String> {
        fs::read_to_string(self.file(var)).ok()
    }

    /// Replace `<install>/_env` with a copy of this directory.
    pub fn copy_into(&self, install: &Path) -> Result<()> {
        info!("Passing on variables to vcpkg");
        fs::create_dir_all(&self.dir)?;
        let dest = install.join(ENV_DIR);
        remove_best_effort(&dest);
        sys::copy_tree(&self.dir, &dest)?;
        Ok(())
    }

    fn file(&self, var: &str) -> PathBuf {
        self.dir.join(format!("{var}.txt"))
    }
}
