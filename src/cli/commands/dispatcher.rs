//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::cli::services::Services;
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying results
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher<'a> {
    build_root: PathBuf,
    services: &'a Services,
}

impl<'a> CommandDispatcher<'a> {
    /// Create a new dispatcher writing generated files under `build_root`.
    pub fn new(build_root: PathBuf, services: &'a Services) -> Self {
        Self {
            build_root,
            services,
        }
    }

    /// Get the build root path.
    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let root = &self.build_root;
        let services = self.services;
        match &cli.command {
            Commands::Qt(args) => {
                let cmd = super::qt::QtCommand::new(root, args.clone(), services);
                cmd.execute(ui)
            }
            Commands::Vcpkg(args) => {
                let cmd = super::vcpkg::VcpkgCommand::new(root, args.clone(), services);
                cmd.execute(ui)
            }
            Commands::Prebuild(args) => {
                let cmd = super::prebuild::PrebuildCommand::new(root, args.clone(), services);
                cmd.execute(ui)
            }
            Commands::Status(args) => {
                let cmd = super::status::StatusCommand::new(root, args.clone(), services);
                cmd.execute(ui)
            }
            Commands::Prune(args) => {
                let cmd = super::prune::PruneCommand::new(root, args.clone(), services);
                cmd.execute(ui)
            }
            Commands::Fingerprint(args) => {
                let cmd = super::fingerprint::FingerprintCommand::new(args.clone());
                cmd.execute(ui)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
        }
    }
}
