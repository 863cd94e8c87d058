//! Host platform resolution.
//!
//! The host is resolved once at startup into a closed [`HostPlatform`]
//! enum. Everything downstream matches on it instead of comparing OS
//! names or re-reading `/etc/issue`.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{ProvisionError, Result};

/// Linux distribution identity parsed from `/etc/issue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinuxDistro {
    /// Distribution name, e.g. `Ubuntu`.
    pub name: String,
    /// Major release number, e.g. `18` for `18.04`.
    pub major: Option<u32>,
}

impl LinuxDistro {
    /// A distro whose identity could not be determined.
    pub fn unknown() -> Self {
        Self {
            name: "unknown".to_string(),
            major: None,
        }
    }

    /// Parse the contents of `/etc/issue`.
    ///
    /// The first word is the distribution name and the first number that
    /// follows is its release, e.g. `Ubuntu 18.04.3 LTS \n \l`.
    pub fn parse_issue(issue: &str) -> Self {
        static ISSUE_RE: OnceLock<Regex> = OnceLock::new();
        let re = ISSUE_RE.get_or_init(|| {
            Regex::new(r"^\s*(?P<name>[^\s\\]+)(?:[^\d\n]*(?P<major>\d+))?")
                .expect("issue regex is valid")
        });

        match re.captures(issue) {
            Some(caps) => Self {
                name: caps["name"].to_string(),
                major: caps.name("major").and_then(|m| m.as_str().parse().ok()),
            },
            None => Self::unknown(),
        }
    }
}

impl fmt::Display for LinuxDistro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.major {
            Some(major) => write!(f, "{} {}", self.name, major),
            None => write!(f, "{}", self.name),
        }
    }
}

/// The operating system the provisioners run on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "os", rename_all = "lowercase")]
pub enum HostPlatform {
    Windows,
    MacOs,
    Linux(LinuxDistro),
}

impl HostPlatform {
    /// Resolve the platform of the running process.
    pub fn detect() -> Result<Self> {
        Self::resolve(std::env::consts::OS, Path::new("/etc/issue"))
    }

    /// Resolve from an OS name and an issue file (for testing).
    ///
    /// An unreadable issue file yields [`LinuxDistro::unknown`]; only
    /// consumers that need the distro (Qt) reject it.
    pub fn resolve(os: &str, issue_file: &Path) -> Result<Self> {
        match os {
            "windows" => Ok(Self::Windows),
            "macos" => Ok(Self::MacOs),
            "linux" => {
                let distro = std::fs::read_to_string(issue_file)
                    .map(|issue| LinuxDistro::parse_issue(&issue))
                    .unwrap_or_else(|_| LinuxDistro::unknown());
                Ok(Self::Linux(distro))
            }
            other => Err(ProvisionError::UnsupportedPlatform {
                message: format!("Unknown operating system: {}", other),
            }),
        }
    }

    /// Whether this is Windows.
    pub fn is_windows(&self) -> bool {
        matches!(self, Self::Windows)
    }

    /// File name suffix for executables.
    pub fn exe_suffix(&self) -> &'static str {
        if self.is_windows() {
            ".exe"
        } else {
            ""
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "Windows"),
            Self::MacOs => write!(f, "macOS"),
            Self::Linux(distro) => write!(f, "Linux ({})", distro),
        }
    }
}
