//! Process-wide collaborators handed to commands.

use std::sync::OnceLock;

use crate::environment::{EnvSnapshot, HostPlatform};
use crate::error::Result;
use crate::fetch::{ArchiveFetcher, HttpArchiveFetcher};
use crate::shell::{ProcessRunner, SystemRunner};

/// Environment, fetcher and process runner for one run.
///
/// Captured once in `main`; tests build one around in-memory doubles.
pub struct Services {
    pub env: EnvSnapshot,
    pub fetcher: Box<dyn ArchiveFetcher>,
    pub runner: Box<dyn ProcessRunner>,
    platform: OnceLock<HostPlatform>,
    detect: fn() -> Result<HostPlatform>,
}

impl Services {
    pub fn new(
        env: EnvSnapshot,
        fetcher: Box<dyn ArchiveFetcher>,
        runner: Box<dyn ProcessRunner>,
    ) -> Self {
        Self {
            env,
            fetcher,
            runner,
            platform: OnceLock::new(),
            detect: HostPlatform::detect,
        }
    }

    /// Real environment, HTTP downloads and subprocesses.
    pub fn system(env: EnvSnapshot, show_progress: bool) -> Result<Self> {
        Ok(Self::new(
            env,
            Box::new(HttpArchiveFetcher::new(show_progress)?),
            Box::new(SystemRunner),
        ))
    }

    /// Use a fixed platform instead of detecting the host.
    pub fn with_platform(self, platform: HostPlatform) -> Self {
        let _ = self.platform.set(platform);
        self
    }

    /// The host platform. Detected on first use and reused afterwards, so
    /// a pinned Qt never inspects the host at all.
    pub fn platform(&self) -> Result<HostPlatform> {
        if let Some(platform) = self.platform.get() {
            return Ok(platform.clone());
        }
        let detected = (self.detect)()?;
        Ok(self.platform.get_or_init(|| detected).clone())
    }
}
