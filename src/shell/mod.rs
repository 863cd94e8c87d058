//! Subprocess execution.

pub mod command;

pub use command::{Invocation, ProcessRunner, SystemRunner};
