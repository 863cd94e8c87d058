//! Vendored vcpkg instance.
//!
//! The install is keyed on a fingerprint of the custom ports overlay, so
//! editing a port moves the build to a fresh install while the old one
//! stays on disk for other checkouts (see [`prune`] for reclaiming it).
//!
//! A full run mirrors what a developer would do by hand:
//!
//! 1. download the vcpkg sources and run its bootstrap script
//! 2. replace `ports/` with the overlay
//! 3. `vcpkg install` the host tools and the client dependencies
//! 4. tag the install and write `vcpkg.cmake` for the build
//!
//! In GitHub CI a prebuilt archive replaces steps 1 to 3.

pub mod env_files;
pub mod prune;
pub mod triplet;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::cmake::{BuildInclude, VCPKG_INCLUDE};
use crate::config::{base_dir, ProvisionOptions};
use crate::environment::{
    EnvOverlay, EnvSnapshot, HostPlatform, ANDROID_PRECOMPILED_VAR, QT_PREFIX_VAR,
    VCPKG_BASE_VAR, VCPKG_PATH_VAR,
};
use crate::error::{ProvisionError, Result};
use crate::fetch::{ArchiveFetcher, ArchiveKind, FetchRequest};
use crate::provision::{
    hash_directory_tree, locate, remove_best_effort, AcquirePlan, AcquireReport, Acquirer,
    ArchiveSource, Bootstrap, Cleanup, Freshness, InstallLocation, Overlay, StalenessChecker, Tag,
};
use crate::shell::{Invocation, ProcessRunner};
use crate::sys;

pub use env_files::EnvFiles;
pub use prune::{prune, PruneCandidate};
pub use triplet::{host_triplet, with_build_type, ANDROID_TRIPLET};

const DEFAULT_BASE: &str = "tivoli/vcpkg";
const SOURCE_URL: &str = "https://codeload.github.com/microsoft/vcpkg/zip/master";
const SOURCE_DIR: &str = "vcpkg-master";
const BUILDS_CDN: &str = "https://cdn.tivolicloud.com/dependencies/vcpkg/builds";
const ANDROID_ARCHIVE_URL: &str =
    "https://cdn.tivolicloud.com/dependencies/vcpkg/vcpkg-arm64-android.tar.gz";

/// Marker file at the root of every vcpkg checkout.
pub const ROOT_MARKER: &str = ".vcpkg-root";
/// Line prefix stripped from the toolchain for Android builds.
const TRIPLET_OVERRIDE_PREFIX: &str = "set(VCPKG_TARGET_TRIPLET ";

/// Prebuilt vcpkg archive published for GitHub CI on this host, if any.
pub fn prebuilt_archive_url(platform: &HostPlatform) -> Option<String> {
    match platform {
        HostPlatform::Windows => Some(format!("{BUILDS_CDN}/vcpkg-win32.zip")),
        HostPlatform::MacOs => Some(format!("{BUILDS_CDN}/vcpkg-osx.tgz")),
        HostPlatform::Linux(_) => None,
    }
}

/// What a full vcpkg run did.
#[derive(Debug, Clone)]
pub struct VcpkgReport {
    pub acquire: AcquireReport,
    /// Generated include.
    pub config_file: PathBuf,
    /// Packages installed, as `package:triplet`.
    pub installed: Vec<String>,
    /// Best-effort removals of build leftovers.
    pub cleanups: Vec<(PathBuf, Cleanup)>,
}

/// Locates, bootstraps and records a vcpkg instance.
#[derive(Debug, Clone)]
pub struct VcpkgProvisioner {
    plan: AcquirePlan,
    options: ProvisionOptions,
    exe: PathBuf,
    host_triplet: &'static str,
    target_triplet: &'static str,
    android_precompiled: PathBuf,
    build_env: EnvOverlay,
    ci: bool,
}

impl VcpkgProvisioner {
    /// Resolve the vcpkg install for this run.
    ///
    /// Fingerprints the ports overlay, so it must exist even when the
    /// install is pinned.
    pub fn new(
        options: &ProvisionOptions,
        env: &EnvSnapshot,
        platform: &HostPlatform,
    ) -> Result<Self> {
        let ports = &options.ports_path;
        if !ports.is_dir() {
            return Err(ProvisionError::MissingPath {
                what: "ports overlay".to_string(),
                path: ports.clone(),
            });
        }
        let tag = Tag::new(hash_directory_tree(ports)?, options.build_type());

        let pinned = env.path(VCPKG_PATH_VAR).or_else(|| options.vcpkg_root.clone());
        let mut base = base_dir(env, VCPKG_BASE_VAR, DEFAULT_BASE)?;
        if options.android {
            base.push("android");
        }
        let location = locate(&base, &tag, pinned.as_deref())?;
        let install = location.install_path();

        let exe_name = format!("vcpkg{}", platform.exe_suffix());
        let script = if platform.is_windows() {
            "bootstrap-vcpkg.bat"
        } else {
            "bootstrap-vcpkg.sh"
        };
        let mut bootstrap_env = EnvOverlay::new(env);
        if matches!(platform, HostPlatform::MacOs) {
            bootstrap_env = bootstrap_env.with("MACOSX_DEPLOYMENT_TARGET", "10.15");
        }
        let markers = vec![PathBuf::from(&exe_name), PathBuf::from(ROOT_MARKER)];

        let prebuilt = if env.is_github_ci() && !location.is_pinned() {
            prebuilt_archive_url(platform).map(ArchiveSource::new)
        } else {
            None
        };

        let host_triplet = host_triplet(platform);
        let target_triplet = if options.android {
            ANDROID_TRIPLET
        } else {
            host_triplet
        };
        let android_precompiled = env
            .path(ANDROID_PRECOMPILED_VAR)
            .unwrap_or_else(|| install.join("android"));

        let plan = AcquirePlan {
            markers: markers.clone(),
            force: options.force,
            prebuilt,
            bootstrap: Some(Bootstrap {
                source: ArchiveSource::new(SOURCE_URL)
                    .with_kind(ArchiveKind::Zip)
                    .hoisting(SOURCE_DIR),
                markers,
                command: Some(
                    Invocation::new(install.join(script), &install, bootstrap_env)
                        .args(["-disableMetrics"]),
                ),
            }),
            overlay: Some(Overlay {
                source: ports.clone(),
                destination: PathBuf::from("ports"),
            }),
            ..AcquirePlan::new(location, tag)
        };

        Ok(Self {
            exe: install.join(exe_name),
            plan,
            options: options.clone(),
            host_triplet,
            target_triplet,
            android_precompiled,
            build_env: EnvOverlay::new(env),
            ci: env.is_ci(),
        })
    }

    pub fn location(&self) -> &InstallLocation {
        &self.plan.location
    }

    pub fn tag(&self) -> &Tag {
        &self.plan.tag
    }

    pub fn install_path(&self) -> PathBuf {
        self.plan.location.install_path()
    }

    /// The vcpkg executable.
    pub fn exe(&self) -> &Path {
        &self.exe
    }

    /// Prebuilt archive in use, if this run takes the prebuilt path.
    pub fn prebuilt_url(&self) -> Option<&str> {
        self.plan.prebuilt.as_ref().map(|p| p.url.as_str())
    }

    /// Host triplet qualified with the build type.
    pub fn host_triplet(&self) -> String {
        with_build_type(self.host_triplet, self.options.build_type())
    }

    /// Target triplet qualified with the build type.
    pub fn target_triplet(&self) -> String {
        with_build_type(self.target_triplet, self.options.build_type())
    }

    /// Check without changing anything.
    pub fn freshness(&self) -> Result<Freshness> {
        StalenessChecker::new(&self.plan.location, &self.plan.tag, &self.plan.markers)
            .check(self.plan.force)
    }

    /// Run the whole lifecycle: acquire, install packages, tag, write the
    /// include and remove build leftovers.
    ///
    /// `qt_prefix` is forwarded to ports that build against Qt.
    pub fn provision(
        &self,
        fetcher: &dyn ArchiveFetcher,
        runner: &dyn ProcessRunner,
        qt_prefix: Option<&Path>,
    ) -> Result<VcpkgReport> {
        let acquirer = Acquirer::new(fetcher, runner);
        let mut acquire = acquirer.acquire(&self.plan)?;

        let installed = if acquire.needs_install() {
            self.setup_dependencies(fetcher, runner, qt_prefix)?
        } else {
            Vec::new()
        };

        acquirer.finish(&self.plan, &mut acquire)?;

        if self.options.android {
            self.fixup_toolchain()?;
        }
        let config_file = self.write_config()?;

        let mut cleanups = self.clean_builds();
        if self.ci {
            cleanups.extend(self.cleanup_development_files());
        }

        Ok(VcpkgReport {
            acquire,
            config_file,
            installed,
            cleanups,
        })
    }

    fn setup_dependencies(
        &self,
        fetcher: &dyn ArchiveFetcher,
        runner: &dyn ProcessRunner,
        qt_prefix: Option<&Path>,
    ) -> Result<Vec<String>> {
        let env_files = EnvFiles::new(&self.options.build_root);
        let mut build_env = self.build_env.clone();
        if let Some(qt) = qt_prefix {
            let qt = qt.display().to_string();
            env_files.write(QT_PREFIX_VAR, &qt)?;
            build_env = build_env.with(QT_PREFIX_VAR, qt);
        }
        env_files.copy_into(&self.install_path())?;

        if self.options.android {
            info!("Installing Android binaries");
            self.setup_android_dependencies(fetcher)?;
        }

        let mut installed = Vec::new();

        info!("Installing host tools");
        let host = self.prepare_triplet(self.host_triplet)?;
        self.install_package(runner, &build_env, &host, &self.options.packages.host_tools)?;
        installed.push(format!("{}:{}", self.options.packages.host_tools, host));

        if !self.options.android {
            info!("Installing build dependencies");
            let target = self.prepare_triplet(self.target_triplet)?;
            self.install_package(
                runner,
                &build_env,
                &target,
                &self.options.packages.client_deps,
            )?;
            installed.push(format!("{}:{}", self.options.packages.client_deps, target));
        }

        Ok(installed)
    }

    fn prepare_triplet(&self, triplet: &str) -> Result<String> {
        match self.options.build_type() {
            Some(build_type) => {
                triplet::copy_for_build_type(&self.install_path(), triplet, build_type)
            }
            None => Ok(triplet.to_string()),
        }
    }

    fn install_package(
        &self,
        runner: &dyn ProcessRunner,
        env: &EnvOverlay,
        triplet: &str,
        package: &str,
    ) -> Result<()> {
        let install = self.install_path();
        let invocation = Invocation::new(&self.exe, &install, env.clone()).args([
            "--vcpkg-root".to_string(),
            install.display().to_string(),
            "install".to_string(),
            "--triplet".to_string(),
            triplet.to_string(),
            package.to_string(),
        ]);
        runner.run(&invocation)
    }

    /// Unpack the prebuilt Android libraries into `installed/` unless
    /// they are already there.
    fn setup_android_dependencies(&self, fetcher: &dyn ArchiveFetcher) -> Result<()> {
        let installed = self.install_path().join("installed");
        if installed.join(ANDROID_TRIPLET).is_dir() {
            return Ok(());
        }
        fetcher.fetch_and_extract(&FetchRequest::new(ANDROID_ARCHIVE_URL, installed))
    }

    /// Remove triplet overrides from vcpkg's toolchain so the one set by
    /// the Android build wins. Returns whether the file changed.
    pub fn fixup_toolchain(&self) -> Result<bool> {
        let script = self.toolchain_file();
        if !script.is_file() {
            return Ok(false);
        }
        let changed = sys::filter_lines(&script, |line| line.starts_with(TRIPLET_OVERRIDE_PREFIX))?;
        if changed {
            info!("Removed triplet overrides from {}", script.display());
        }
        Ok(changed)
    }

    fn toolchain_file(&self) -> PathBuf {
        self.install_path()
            .join("scripts")
            .join("buildsystems")
            .join("vcpkg.cmake")
    }

    pub fn include(&self) -> Result<BuildInclude> {
        let installed = self.install_path().join("installed");
        let android_precompiled = if self.options.android {
            Some(std::path::absolute(&self.android_precompiled)?)
        } else {
            None
        };

        Ok(BuildInclude::Vcpkg {
            toolchain: self.toolchain_file(),
            install_root: installed.join(self.target_triplet()),
            tools_dir: installed.join(self.host_triplet()).join("tools"),
            triplet: self.host_triplet(),
            android_precompiled,
        })
    }

    /// Write `vcpkg.cmake` under the build root.
    pub fn write_config(&self) -> Result<PathBuf> {
        let path = self.options.build_file(VCPKG_INCLUDE);
        self.include()?.write_to(&path)?;
        Ok(path)
    }

    /// Wipe `buildtrees`. Pinned installs are left alone.
    pub fn clean_builds(&self) -> Vec<(PathBuf, Cleanup)> {
        self.remove_leftovers(&["buildtrees"])
    }

    /// Wipe `downloads` and `packages` to keep CI caches small.
    pub fn cleanup_development_files(&self) -> Vec<(PathBuf, Cleanup)> {
        self.remove_leftovers(&["downloads", "packages"])
    }

    fn remove_leftovers(&self, names: &[&str]) -> Vec<(PathBuf, Cleanup)> {
        if self.plan.location.is_pinned() {
            return Vec::new();
        }
        names
            .iter()
            .map(|name| {
                let path = self.install_path().join(name);
                let cleanup = remove_best_effort(&path);
                (path, cleanup)
            })
            .collect()
    }
}
