//! depsmith - Qt and vcpkg dependency provisioning for native builds.
//!
//! depsmith makes sure a CMake build has its third-party dependencies in
//! place before configuring: a packaged Qt distribution and a vendored
//! vcpkg instance keyed on the project's custom ports. Installs are
//! content-addressed and tagged, so an unchanged checkout reuses them and
//! an edited port moves the build to a fresh install.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`cmake`] - Generated CMake includes
//! - [`config`] - Per-run options and base paths
//! - [`environment`] - Process environment snapshot and host platform
//! - [`error`] - Error types and result aliases
//! - [`fetch`] - Archive download, verification and extraction
//! - [`provision`] - Tags, install locations, staleness checks and acquisition
//! - [`qt`] - Qt provisioner
//! - [`shell`] - Subprocess execution
//! - [`sys`] - Filesystem helpers
//! - [`ui`] - Terminal output
//! - [`vcpkg`] - vcpkg provisioner
//!
//! # Example
//!
//! ```
//! use depsmith::provision::{locate, Fingerprint, Tag};
//!
//! let base = tempfile::tempdir().unwrap();
//! let tag = Tag::new(Fingerprint::new("abc12345"), Some("release"));
//! let location = locate(base.path(), &tag, None).unwrap();
//!
//! assert_eq!(location.install_path(), base.path().join("abc12345-release"));
//! assert_eq!(tag.contents(), "abc12345-release_1");
//! ```

pub mod cli;
pub mod cmake;
pub mod config;
pub mod environment;
pub mod error;
pub mod fetch;
pub mod provision;
pub mod qt;
pub mod shell;
pub mod sys;
pub mod ui;
pub mod vcpkg;

pub use error::{ProvisionError, Result};
