//! Status command implementation.
//!
//! The `depsmith status` command shows where Qt and vcpkg live and
//! whether their installs are current, without installing anything.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use crate::cli::args::StatusArgs;
use crate::cli::services::Services;
use crate::config::ProvisionOptions;
use crate::error::Result;
use crate::provision::{Freshness, InstallLocation, LocationSummary, Tag};
use crate::qt::QtProvisioner;
use crate::ui::UserInterface;
use crate::vcpkg::VcpkgProvisioner;

use super::dispatcher::{Command, CommandResult};
use super::display;

/// Status of one dependency bundle.
#[derive(Debug, Serialize)]
struct ComponentStatus {
    name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<LocationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    freshness: Option<Freshness>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip)]
    install: Option<(InstallLocation, Tag)>,
}

impl ComponentStatus {
    fn inspect(
        name: &'static str,
        resolve: impl FnOnce() -> Result<(InstallLocation, Tag, Freshness)>,
    ) -> Self {
        match resolve() {
            Ok((location, tag, freshness)) => Self {
                name,
                location: Some(LocationSummary::from(&location)),
                tag: Some(tag.contents()),
                freshness: Some(freshness),
                error: None,
                install: Some((location, tag)),
            },
            Err(e) => Self {
                name,
                location: None,
                tag: None,
                freshness: None,
                error: Some(e.to_string()),
                install: None,
            },
        }
    }
}

/// The status command implementation.
pub struct StatusCommand<'a> {
    build_root: PathBuf,
    args: StatusArgs,
    services: &'a Services,
}

impl<'a> StatusCommand<'a> {
    /// Create a new status command.
    pub fn new(build_root: &Path, args: StatusArgs, services: &'a Services) -> Self {
        Self {
            build_root: build_root.to_path_buf(),
            args,
            services,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &StatusArgs {
        &self.args
    }

    fn collect(&self, options: &ProvisionOptions) -> Vec<ComponentStatus> {
        let services = self.services;
        let qt = ComponentStatus::inspect("qt", || {
            let qt = QtProvisioner::new(options, &services.env, || services.platform())?;
            let freshness = qt.freshness()?;
            Ok((qt.location().clone(), qt.tag().clone(), freshness))
        });
        let vcpkg = ComponentStatus::inspect("vcpkg", || {
            let vcpkg = VcpkgProvisioner::new(options, &services.env, &services.platform()?)?;
            let freshness = vcpkg.freshness()?;
            Ok((vcpkg.location().clone(), vcpkg.tag().clone(), freshness))
        });
        vec![qt, vcpkg]
    }
}

impl Command for StatusCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let options = self.args.provision.options(&self.build_root);
        let components = self.collect(&options);
        let failed = components.iter().any(|c| c.error.is_some());

        if self.args.json {
            let json = serde_json::to_string_pretty(&components)
                .context("Failed to serialize status")?;
            ui.raw(&json);
        } else {
            for component in &components {
                ui.show_header(component.name);
                if let Some(error) = &component.error {
                    ui.error(error);
                    continue;
                }
                if let Some((location, tag)) = &component.install {
                    display::show_location(ui, location, tag);
                }
                if let Some(freshness) = &component.freshness {
                    display::show_freshness(ui, freshness);
                }
            }
        }

        if failed {
            Ok(CommandResult::failure(1))
        } else {
            Ok(CommandResult::success())
        }
    }
}
