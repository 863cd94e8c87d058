//! Per-run provisioning configuration.
//!
//! Configuration is layered: command-line flags (which clap lets fall
//! back to environment variables) are resolved into one immutable
//! [`ProvisionOptions`], and provisioner-level variables such as base
//! directories are read from the captured [`EnvSnapshot`].
//!
//! # Example
//!
//! ```
//! use depsmith::config::{base_dir, ProvisionOptions};
//! use depsmith::environment::{EnvSnapshot, QT_BASE_VAR};
//!
//! let env = EnvSnapshot::from_pairs([(QT_BASE_VAR, "/deps/qt")]);
//! let base = base_dir(&env, QT_BASE_VAR, "hifi/qt").unwrap();
//! assert_eq!(base, std::path::PathBuf::from("/deps/qt"));
//!
//! let options = ProvisionOptions::new("/work/build");
//! assert!(!options.android);
//! ```

use std::path::{Path, PathBuf};

use anyhow::anyhow;

use crate::environment::EnvSnapshot;
use crate::error::Result;
use crate::provision::ForceFlags;

/// Default package holding tools that run on the build host.
pub const DEFAULT_HOST_TOOLS_PACKAGE: &str = "hifi-host-tools";
/// Default package holding libraries linked into the target.
pub const DEFAULT_CLIENT_DEPS_PACKAGE: &str = "hifi-client-deps";

/// vcpkg packages installed after bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packages {
    /// Installed for the host triplet.
    pub host_tools: String,
    /// Installed for the target triplet. Skipped for Android.
    pub client_deps: String,
}

impl Default for Packages {
    fn default() -> Self {
        Self {
            host_tools: DEFAULT_HOST_TOOLS_PACKAGE.to_string(),
            client_deps: DEFAULT_CLIENT_DEPS_PACKAGE.to_string(),
        }
    }
}

/// Resolved options for one provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOptions {
    /// Build directory receiving the generated includes and `_env` files.
    pub build_root: PathBuf,
    /// Custom port overlay copied into vcpkg's `ports` directory.
    pub ports_path: PathBuf,
    /// Explicit vcpkg checkout. Pins the install like `TIVOLI_VCPKG_PATH`.
    pub vcpkg_root: Option<PathBuf>,
    /// Optional build type qualifier, e.g. `release`.
    pub vcpkg_build_type: Option<String>,
    /// Target Android instead of the host.
    pub android: bool,
    pub force: ForceFlags,
    pub packages: Packages,
}

impl ProvisionOptions {
    /// Options with defaults for everything except the build root.
    ///
    /// The ports overlay defaults to `cmake/ports` under the current
    /// directory.
    pub fn new(build_root: impl Into<PathBuf>) -> Self {
        Self {
            build_root: build_root.into(),
            ports_path: PathBuf::from("cmake").join("ports"),
            vcpkg_root: None,
            vcpkg_build_type: None,
            android: false,
            force: ForceFlags::default(),
            packages: Packages::default(),
        }
    }

    /// The build type, treating an empty string as absent.
    pub fn build_type(&self) -> Option<&str> {
        self.vcpkg_build_type.as_deref().filter(|b| !b.is_empty())
    }

    /// Path of a generated file under the build root.
    pub fn build_file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.build_root.join(name)
    }
}

/// Resolve a base directory: the variable if set, else `~/<default_rel>`.
pub fn base_dir(env: &EnvSnapshot, var: &str, default_rel: &str) -> Result<PathBuf> {
    if let Some(path) = env.path(var) {
        return Ok(path);
    }
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home.join(default_rel))
}
