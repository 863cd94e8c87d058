//! Vcpkg command implementation.
//!
//! The `depsmith vcpkg` command bootstraps vcpkg, installs the dependency
//! packages and writes `vcpkg.cmake` into the build root.

use std::path::{Path, PathBuf};

use crate::cli::args::VcpkgArgs;
use crate::cli::services::Services;
use crate::config::ProvisionOptions;
use crate::environment::QT_PREFIX_VAR;
use crate::error::Result;
use crate::ui::UserInterface;
use crate::vcpkg::{VcpkgProvisioner, VcpkgReport};

use super::dispatcher::{Command, CommandResult};
use super::display;

/// The vcpkg command implementation.
pub struct VcpkgCommand<'a> {
    build_root: PathBuf,
    args: VcpkgArgs,
    services: &'a Services,
}

impl<'a> VcpkgCommand<'a> {
    /// Create a new vcpkg command.
    pub fn new(build_root: &Path, args: VcpkgArgs, services: &'a Services) -> Self {
        Self {
            build_root: build_root.to_path_buf(),
            args,
            services,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &VcpkgArgs {
        &self.args
    }

    /// `--qt-prefix`, falling back to `QT_CMAKE_PREFIX_PATH`.
    fn qt_prefix(&self) -> Option<PathBuf> {
        self.args
            .qt_prefix
            .clone()
            .or_else(|| self.services.env.path(QT_PREFIX_VAR))
    }
}

impl Command for VcpkgCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let options = self.args.provision.options(&self.build_root);
        provision_vcpkg(&options, self.services, self.qt_prefix().as_deref(), ui)?;
        Ok(CommandResult::success())
    }
}

/// Run the full vcpkg lifecycle and report it.
pub(super) fn provision_vcpkg(
    options: &ProvisionOptions,
    services: &Services,
    qt_prefix: Option<&Path>,
    ui: &mut dyn UserInterface,
) -> Result<VcpkgReport> {
    ui.show_header("vcpkg");
    let platform = services.platform()?;
    let vcpkg = VcpkgProvisioner::new(options, &services.env, &platform)?;
    display::show_location(ui, vcpkg.location(), vcpkg.tag());
    if ui.output_mode().shows_details() {
        ui.key_value("triplet", &vcpkg.target_triplet());
        if let Some(url) = vcpkg.prebuilt_url() {
            ui.key_value("prebuilt", url);
        }
    }

    let report = vcpkg.provision(services.fetcher.as_ref(), services.runner.as_ref(), qt_prefix)?;
    display::show_outcome(ui, "vcpkg", &report.acquire);
    for package in &report.installed {
        ui.message(&format!("Installed {}", package));
    }
    display::show_cleanups(ui, &report.cleanups);
    display::show_config_written(ui, &report.config_file);
    Ok(report)
}
