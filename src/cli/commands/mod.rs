//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`depsmith qt`, `depsmith status`)
//! - Shared collaborators ([`Services`](crate::cli::Services)) for every command
//! - Consistent global flag handling

pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod fingerprint;
pub mod prebuild;
pub mod prune;
pub mod qt;
pub mod status;
pub mod vcpkg;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
