//! Packaged Qt distribution.
//!
//! Qt is keyed on its release rather than on content: the install lives
//! at `<base>/<version>` and its tag file records the version. Setting
//! `QT_CMAKE_PREFIX_PATH` pins Qt to a caller-provided build, in which
//! case nothing is downloaded and the host platform is never inspected.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::cmake::BuildInclude;
use crate::config::{base_dir, ProvisionOptions};
use crate::environment::{EnvSnapshot, HostPlatform, QT_BASE_VAR, QT_PREFIX_VAR};
use crate::error::{ProvisionError, Result};
use crate::fetch::ArchiveFetcher;
use crate::provision::{
    locate, AcquirePlan, AcquireReport, Acquirer, ArchiveSource, Bootstrap, Fingerprint,
    Freshness, InstallLocation, StalenessChecker, Tag,
};
use crate::shell::ProcessRunner;

/// Qt release provisioned.
pub const QT_VERSION: &str = "5.12.3";
/// Top-level directory inside every Qt archive.
pub const QT_PAYLOAD: &str = "qt5-install";

const DEFAULT_BASE: &str = "hifi/qt";
const CDN: &str = "https://cdn.tivolicloud.com/dependencies/vcpkg";

/// Archive URL for a host, or `UnsupportedPlatform`.
pub fn archive_url(platform: &HostPlatform) -> Result<String> {
    let name = match platform {
        HostPlatform::Windows => format!("tivoli-qt5-install-{QT_VERSION}-windows.tar.gz"),
        HostPlatform::MacOs => format!("qt5-install-{QT_VERSION}-macos.tar.gz"),
        HostPlatform::Linux(distro) => match (distro.name.as_str(), distro.major) {
            ("Ubuntu", Some(16)) => {
                format!("qt5-install-{QT_VERSION}-ubuntu-16.04-with-symbols.tar.gz")
            }
            ("Ubuntu", Some(18)) => format!("qt5-install-{QT_VERSION}-ubuntu-18.04.tar.gz"),
            _ => {
                return Err(ProvisionError::UnsupportedPlatform {
                    message: format!("No Qt {} build for Linux distribution {}", QT_VERSION, distro),
                })
            }
        },
    };
    Ok(format!("{CDN}/{name}"))
}

/// Locates, installs and records a Qt distribution.
#[derive(Debug, Clone)]
pub struct QtProvisioner {
    plan: AcquirePlan,
    prefix_path: PathBuf,
    config_file: PathBuf,
}

impl QtProvisioner {
    /// Resolve the Qt install for this run.
    ///
    /// `platform` is only called when Qt is not pinned.
    pub fn new(
        options: &ProvisionOptions,
        env: &EnvSnapshot,
        platform: impl FnOnce() -> Result<HostPlatform>,
    ) -> Result<Self> {
        let tag = Tag::new(Fingerprint::new(QT_VERSION), None);
        let pinned = env.path(QT_PREFIX_VAR);

        let base = base_dir(env, QT_BASE_VAR, DEFAULT_BASE)?;
        let location = locate(&base, &tag, pinned.as_deref())?;

        let (prefix_path, bootstrap) = match &location {
            InstallLocation::Pinned(prefix) => {
                info!("Using Qt from {}", QT_PREFIX_VAR);
                (prefix.clone(), None)
            }
            InstallLocation::Managed { .. } => {
                let url = archive_url(&platform()?)?;
                let prefix = location.install_path().join(QT_PAYLOAD).join("lib").join("cmake");
                let bootstrap = Bootstrap {
                    source: ArchiveSource::new(url),
                    markers: vec![PathBuf::from(QT_PAYLOAD)],
                    command: None,
                };
                (prefix, Some(bootstrap))
            }
        };

        let plan = AcquirePlan {
            markers: vec![PathBuf::from(QT_PAYLOAD)],
            force: options.force,
            bootstrap,
            ..AcquirePlan::new(location, tag)
        };

        Ok(Self {
            plan,
            prefix_path,
            config_file: options.build_file(crate::cmake::QT_INCLUDE),
        })
    }

    pub fn location(&self) -> &InstallLocation {
        &self.plan.location
    }

    pub fn tag(&self) -> &Tag {
        &self.plan.tag
    }

    /// Directory to hand CMake as `QT_CMAKE_PREFIX_PATH`.
    pub fn prefix_path(&self) -> &Path {
        &self.prefix_path
    }

    /// Archive that would be downloaded, if any.
    pub fn archive_url(&self) -> Option<&str> {
        self.plan.bootstrap.as_ref().map(|b| b.source.url.as_str())
    }

    /// Check without changing anything.
    pub fn freshness(&self) -> Result<Freshness> {
        StalenessChecker::new(&self.plan.location, &self.plan.tag, &self.plan.markers)
            .check(self.plan.force)
    }

    /// Download and unpack Qt if the install is stale, then tag it.
    pub fn install(
        &self,
        fetcher: &dyn ArchiveFetcher,
        runner: &dyn ProcessRunner,
    ) -> Result<AcquireReport> {
        let acquirer = Acquirer::new(fetcher, runner);
        let mut report = acquirer.acquire(&self.plan)?;
        if report.needs_tag() {
            info!("Qt {} installed at {}", QT_VERSION, self.plan.location.install_path().display());
        } else {
            info!("Qt has already been downloaded");
        }
        acquirer.finish(&self.plan, &mut report)?;
        Ok(report)
    }

    pub fn include(&self) -> BuildInclude {
        BuildInclude::Qt {
            prefix_path: self.prefix_path.clone(),
        }
    }

    /// Write `qt.cmake` under the build root.
    pub fn write_config(&self) -> Result<PathBuf> {
        self.include().write_to(&self.config_file)?;
        Ok(self.config_file.clone())
    }
}
