//! Fingerprint command implementation.
//!
//! The `depsmith fingerprint` command prints the content fingerprint of a
//! directory, the same value vcpkg installs are keyed on.

use crate::cli::args::FingerprintArgs;
use crate::error::{ProvisionError, Result};
use crate::provision::{hash_directory_tree, Tag};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The fingerprint command implementation.
pub struct FingerprintCommand {
    args: FingerprintArgs,
}

impl FingerprintCommand {
    /// Create a new fingerprint command.
    pub fn new(args: FingerprintArgs) -> Self {
        Self { args }
    }
}

impl Command for FingerprintCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if !self.args.path.is_dir() {
            return Err(ProvisionError::MissingPath {
                what: "directory".to_string(),
                path: self.args.path.clone(),
            });
        }

        let fingerprint = hash_directory_tree(&self.args.path)?;
        if self.args.tag {
            let tag = Tag::new(fingerprint, self.args.build_type.as_deref());
            ui.raw(&tag.contents());
        } else {
            ui.raw(fingerprint.as_str());
        }
        Ok(CommandResult::success())
    }
}
