//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use std::path::{Path, PathBuf};

use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::config::ProvisionOptions;
use crate::provision::ForceFlags;

/// depsmith - Qt and vcpkg dependency provisioning for native builds.
#[derive(Debug, Parser)]
#[command(name = "depsmith")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Build directory receiving the generated CMake includes (defaults to
    /// the current directory)
    #[arg(short, long, global = true, env = "DEPSMITH_BUILD_ROOT")]
    pub build_root: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install Qt if needed and write qt.cmake
    Qt(ProvisionArgs),

    /// Bootstrap vcpkg, install dependencies and write vcpkg.cmake
    Vcpkg(VcpkgArgs),

    /// Provision Qt, then vcpkg built against it
    Prebuild(ProvisionArgs),

    /// Show where dependencies live and whether they are current
    Status(StatusArgs),

    /// Remove managed vcpkg installs that have not been used recently
    Prune(PruneArgs),

    /// Print the fingerprint of a ports directory
    Fingerprint(FingerprintArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every provisioning command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ProvisionArgs {
    /// Rebuild even if the install is up to date
    #[arg(long, env = "DEPSMITH_FORCE_BUILD", value_parser = BoolishValueParser::new())]
    pub force_build: bool,

    /// Re-download and re-bootstrap vcpkg even if it is present
    #[arg(long, env = "DEPSMITH_FORCE_BOOTSTRAP", value_parser = BoolishValueParser::new())]
    pub force_bootstrap: bool,

    /// Use this vcpkg checkout as-is instead of a managed install
    #[arg(long, value_name = "PATH")]
    pub vcpkg_root: Option<PathBuf>,

    /// Build type qualifier for vcpkg triplets (e.g. release)
    #[arg(long, value_name = "TYPE")]
    pub vcpkg_build_type: Option<String>,

    /// Target Android
    #[arg(long)]
    pub android: bool,

    /// Custom vcpkg ports overlay
    #[arg(long, value_name = "PATH", default_value = "cmake/ports")]
    pub ports_path: PathBuf,
}

impl ProvisionArgs {
    /// Resolve into per-run options.
    pub fn options(&self, build_root: &Path) -> ProvisionOptions {
        ProvisionOptions {
            ports_path: self.ports_path.clone(),
            vcpkg_root: self.vcpkg_root.clone(),
            vcpkg_build_type: self.vcpkg_build_type.clone(),
            android: self.android,
            force: ForceFlags {
                rebuild: self.force_build,
                bootstrap: self.force_bootstrap,
            },
            ..ProvisionOptions::new(build_root)
        }
    }
}

/// Arguments for the `vcpkg` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct VcpkgArgs {
    #[command(flatten)]
    pub provision: ProvisionArgs,

    /// Qt CMake prefix handed to ports that build against Qt
    #[arg(long, value_name = "PATH")]
    pub qt_prefix: Option<PathBuf>,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub provision: ProvisionArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `prune` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PruneArgs {
    #[command(flatten)]
    pub provision: ProvisionArgs,

    /// Remove installs last used more than this many days ago
    #[arg(long, value_name = "DAYS", default_value_t = 30)]
    pub older_than_days: u32,

    /// Only show what would be removed
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `fingerprint` command.
#[derive(Debug, Clone, clap::Args)]
pub struct FingerprintArgs {
    /// Directory to fingerprint
    #[arg(default_value = "cmake/ports")]
    pub path: PathBuf,

    /// Print the full tag (with build type and format version)
    #[arg(long)]
    pub tag: bool,

    /// Build type qualifier included in the tag
    #[arg(long, value_name = "TYPE", requires = "tag")]
    pub build_type: Option<String>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
