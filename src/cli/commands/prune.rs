//! Prune command implementation.
//!
//! The `depsmith prune` command removes managed vcpkg installs that sit
//! next to the current one and have not been used recently.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::cli::args::PruneArgs;
use crate::cli::services::Services;
use crate::error::Result;
use crate::provision::Cleanup;
use crate::ui::{format_age, UserInterface};
use crate::vcpkg::{prune, VcpkgProvisioner};

use super::dispatcher::{Command, CommandResult};

/// The prune command implementation.
pub struct PruneCommand<'a> {
    build_root: PathBuf,
    args: PruneArgs,
    services: &'a Services,
}

impl<'a> PruneCommand<'a> {
    /// Create a new prune command.
    pub fn new(build_root: &Path, args: PruneArgs, services: &'a Services) -> Self {
        Self {
            build_root: build_root.to_path_buf(),
            args,
            services,
        }
    }
}

impl Command for PruneCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let options = self.args.provision.options(&self.build_root);
        let vcpkg =
            VcpkgProvisioner::new(&options, &self.services.env, &self.services.platform()?)?;

        let Some(base) = vcpkg.location().base() else {
            ui.message("vcpkg is pinned, nothing to prune");
            return Ok(CommandResult::success());
        };

        let now = Utc::now();
        let candidates = prune(
            base,
            &vcpkg.install_path(),
            self.args.older_than_days,
            self.args.dry_run,
            now,
        )?;

        if candidates.is_empty() {
            ui.success(&format!(
                "No installs under {} older than {} days",
                base.display(),
                self.args.older_than_days
            ));
            return Ok(CommandResult::success());
        }

        let mut removed = 0;
        for candidate in &candidates {
            let age = format_age(candidate.last_used, now);
            match &candidate.cleanup {
                None => ui.message(&format!(
                    "Would remove {} (last used {})",
                    candidate.path.display(),
                    age
                )),
                Some(Cleanup::Warning(msg)) => ui.warning(msg),
                Some(_) => {
                    removed += 1;
                    ui.message(&format!(
                        "Removed {} (last used {})",
                        candidate.path.display(),
                        age
                    ));
                }
            }
        }

        if !self.args.dry_run {
            ui.success(&format!("Removed {} of {} old installs", removed, candidates.len()));
        }
        Ok(CommandResult::success())
    }
}
