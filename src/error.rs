//! Error types for provisioning operations.
//!
//! This module defines [`ProvisionError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Acquisition failures (download, extraction, subprocess) are fatal and
//!   propagate to `main` untouched; there is no retry layer.
//! - Best-effort cleanup never produces a `ProvisionError`, see
//!   [`Cleanup`](crate::provision::Cleanup).
//! - Use `anyhow::Error` (via `ProvisionError::Other`) for unexpected errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for provisioning operations.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Host OS or distribution has no known dependency bundle.
    #[error("Unsupported platform: {message}")]
    UnsupportedPlatform { message: String },

    /// Downloading an archive failed.
    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },

    /// Downloaded archive did not match its expected checksum.
    #[error("Checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    /// Unpacking an archive failed.
    #[error("Failed to extract {archive}: {message}")]
    Extract { archive: String, message: String },

    /// External command exited unsuccessfully. `code` is `None` when it
    /// was killed by a signal.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// External command could not be started at all.
    #[error("Could not run {command}: {message}")]
    CommandSpawn { command: String, message: String },

    /// A path that must exist for the requested operation is missing.
    #[error("Missing {what}: {path}")]
    MissingPath { what: String, path: PathBuf },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;
