//! Output verbosity.

use std::str::FromStr;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show everything, including per-path details.
    Verbose,
    /// Show decisions and results.
    #[default]
    Normal,
    /// Show errors and the final result only.
    Quiet,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Resolve from the global `--verbose`/`--quiet` flags. Quiet wins.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Whether per-path details are shown.
    pub fn shows_details(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Whether download bars are shown.
    pub fn shows_progress(&self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Whether status messages are shown.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Quiet)
    }
}
