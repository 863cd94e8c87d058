//! Prebuild command implementation.
//!
//! The `depsmith prebuild` command provisions Qt first, then vcpkg with
//! the Qt prefix handed to ports that build against it.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cli::args::ProvisionArgs;
use crate::cli::services::Services;
use crate::error::Result;
use crate::ui::{format_duration, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::qt::provision_qt;
use super::vcpkg::provision_vcpkg;

/// The prebuild command implementation.
pub struct PrebuildCommand<'a> {
    build_root: PathBuf,
    args: ProvisionArgs,
    services: &'a Services,
}

impl<'a> PrebuildCommand<'a> {
    /// Create a new prebuild command.
    pub fn new(build_root: &Path, args: ProvisionArgs, services: &'a Services) -> Self {
        Self {
            build_root: build_root.to_path_buf(),
            args,
            services,
        }
    }
}

impl Command for PrebuildCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let start = Instant::now();
        let options = self.args.options(&self.build_root);

        let qt = provision_qt(&options, self.services, ui)?;
        provision_vcpkg(&options, self.services, Some(qt.prefix_path()), ui)?;

        ui.success(&format!(
            "Dependencies ready in {}",
            format_duration(start.elapsed())
        ));
        Ok(CommandResult::success())
    }
}
