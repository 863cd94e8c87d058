//! Command-line interface for depsmith.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations
//! - [`services`] - Environment, fetcher and process runner shared by commands

pub mod args;
pub mod commands;
pub mod services;

pub use args::{
    Cli, Commands, CompletionsArgs, FingerprintArgs, ProvisionArgs, PruneArgs, StatusArgs,
    VcpkgArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
pub use services::Services;
