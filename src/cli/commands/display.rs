//! Shared display helpers for provisioning results.
//!
//! Used by `qt`, `vcpkg`, `prebuild` and `status` so install locations
//! and outcomes read the same everywhere.

use std::path::{Path, PathBuf};

use crate::provision::{AcquireReport, Cleanup, Freshness, InstallLocation, Outcome, Tag};
use crate::ui::UserInterface;

/// Print where an install lives and which tag it is keyed on.
pub fn show_location(ui: &mut dyn UserInterface, location: &InstallLocation, tag: &Tag) {
    ui.key_value("path", &location.install_path().display().to_string());
    if location.is_pinned() {
        ui.key_value("mode", "pinned");
    } else {
        ui.key_value("tag", &tag.contents());
        ui.key_value("lock", &location.lock_path().display().to_string());
    }
}

/// One-word freshness label.
pub fn freshness_label(freshness: &Freshness) -> &'static str {
    match freshness {
        Freshness::Current { .. } => "current",
        Freshness::Stale { .. } => "stale",
    }
}

/// Print a freshness line, with the stale reason when there is one.
pub fn show_freshness(ui: &mut dyn UserInterface, freshness: &Freshness) {
    match freshness.stale_reason() {
        Some(reason) => ui.key_value("state", &format!("stale ({})", reason)),
        None => ui.key_value("state", freshness_label(freshness)),
    }
}

/// Summarize what an acquisition did for `name`.
pub fn show_outcome(ui: &mut dyn UserInterface, name: &str, report: &AcquireReport) {
    if ui.output_mode().shows_details() {
        let states: Vec<String> = report.transitions.iter().map(|s| s.to_string()).collect();
        ui.key_value("states", &states.join(" -> "));
    }
    if let Some(reason) = report.freshness.stale_reason() {
        ui.message(&reason.to_string());
    }
    if let Some(Cleanup::Warning(msg)) = &report.cleanup {
        ui.warning(msg);
    }

    match report.outcome {
        Outcome::UpToDate => ui.success(&format!("{} is up to date", name)),
        Outcome::Prebuilt { fetched: true } => ui.success(&format!("Installed prebuilt {}", name)),
        Outcome::Prebuilt { fetched: false } => {
            ui.success(&format!("Prebuilt {} already in place", name))
        }
        Outcome::Provisioned { bootstrapped: true } => {
            ui.success(&format!("Bootstrapped and installed {}", name))
        }
        Outcome::Provisioned { bootstrapped: false } => {
            ui.success(&format!("Updated {}", name))
        }
    }
}

/// Warn about leftovers that could not be removed; list the rest in
/// verbose mode.
pub fn show_cleanups(ui: &mut dyn UserInterface, cleanups: &[(PathBuf, Cleanup)]) {
    for (path, cleanup) in cleanups {
        match cleanup {
            Cleanup::Warning(msg) => ui.warning(msg),
            Cleanup::Removed if ui.output_mode().shows_details() => {
                ui.message(&format!("Removed {}", path.display()))
            }
            _ => {}
        }
    }
}

/// Report a generated CMake include.
pub fn show_config_written(ui: &mut dyn UserInterface, path: &Path) {
    ui.message(&format!("Wrote {}", path.display()));
}
