//! Qt command implementation.
//!
//! The `depsmith qt` command installs Qt when needed and writes
//! `qt.cmake` into the build root.

use std::path::{Path, PathBuf};

use crate::cli::args::ProvisionArgs;
use crate::cli::services::Services;
use crate::config::ProvisionOptions;
use crate::error::Result;
use crate::qt::QtProvisioner;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display;

/// The qt command implementation.
pub struct QtCommand<'a> {
    build_root: PathBuf,
    args: ProvisionArgs,
    services: &'a Services,
}

impl<'a> QtCommand<'a> {
    /// Create a new qt command.
    pub fn new(build_root: &Path, args: ProvisionArgs, services: &'a Services) -> Self {
        Self {
            build_root: build_root.to_path_buf(),
            args,
            services,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ProvisionArgs {
        &self.args
    }
}

impl Command for QtCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let options = self.args.options(&self.build_root);
        provision_qt(&options, self.services, ui)?;
        Ok(CommandResult::success())
    }
}

/// Install Qt if stale and write its include. Returns the provisioner so
/// callers can reuse the resolved prefix.
pub(super) fn provision_qt(
    options: &ProvisionOptions,
    services: &Services,
    ui: &mut dyn UserInterface,
) -> Result<QtProvisioner> {
    ui.show_header("Qt");
    let qt = QtProvisioner::new(options, &services.env, || services.platform())?;
    display::show_location(ui, qt.location(), qt.tag());

    let report = qt.install(services.fetcher.as_ref(), services.runner.as_ref())?;
    display::show_outcome(ui, "Qt", &report);

    let config = qt.write_config()?;
    display::show_config_written(ui, &config);
    Ok(qt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{EnvSnapshot, HostPlatform, QT_BASE_VAR, QT_PREFIX_VAR};
    use crate::provision::testing::{FakeFetcher, RecordingRunner};
    use crate::provision::TAG_FILE;
    use crate::qt::archive_url;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn services(env: EnvSnapshot, fetcher: FakeFetcher) -> Services {
        Services::new(env, Box::new(fetcher), Box::new(RecordingRunner::default()))
            .with_platform(HostPlatform::MacOs)
    }

    #[test]
    fn pinned_qt_writes_include_only() {
        let temp = TempDir::new().unwrap();
        let env = EnvSnapshot::from_pairs([
            (QT_BASE_VAR, temp.path().join("qt").display().to_string()),
            (QT_PREFIX_VAR, "/opt/qt/lib/cmake".to_string()),
        ]);
        let services = services(env, FakeFetcher::default());
        let cmd = QtCommand::new(temp.path(), ProvisionArgs::default(), &services);

        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert_eq!(ui.value_of("mode"), Some("pinned"));
        assert_eq!(ui.successes(), ["Qt is up to date"]);
        let include = fs::read_to_string(temp.path().join("qt.cmake")).unwrap();
        assert!(include.contains("/opt/qt/lib/cmake"));
    }

    #[test]
    fn managed_qt_downloads_then_reuses() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("qt");
        let env = EnvSnapshot::from_pairs([(QT_BASE_VAR, base.display().to_string())]);
        let url = archive_url(&HostPlatform::MacOs).unwrap();
        let fetcher = FakeFetcher::default()
            .with_archive(&url, &[("qt5-install/lib/cmake/Qt5/Qt5Config.cmake", "")]);
        let services = services(env, fetcher);
        let cmd = QtCommand::new(temp.path(), ProvisionArgs::default(), &services);

        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();
        assert_eq!(ui.successes(), ["Bootstrapped and installed Qt"]);
        assert_eq!(
            fs::read_to_string(base.join("5.12.3").join(TAG_FILE)).unwrap(),
            "5.12.3_1"
        );

        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();
        assert_eq!(ui.successes(), ["Qt is up to date"]);
    }

    #[test]
    fn download_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let env = EnvSnapshot::from_pairs([(
            QT_BASE_VAR,
            temp.path().join("qt").display().to_string(),
        )]);
        let services = services(env, FakeFetcher::default());
        let cmd = QtCommand::new(temp.path(), ProvisionArgs::default(), &services);

        let err = cmd.execute(&mut MockUI::new()).unwrap_err();
        assert!(err.to_string().contains("404"));
        assert!(!temp.path().join("qt.cmake").exists());
    }
}
