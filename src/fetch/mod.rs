//! Archive acquisition.
//!
//! Provisioners depend on the [`ArchiveFetcher`] trait only. The
//! production implementation, [`HttpArchiveFetcher`], downloads over
//! HTTP(S), verifies an optional checksum and unpacks into a directory.

pub mod archive;
pub mod checksum;
pub mod http;

use std::path::PathBuf;

use crate::error::Result;

pub use archive::{extract, ArchiveKind};
pub use checksum::{Checksum, HashAlgorithm};
pub use http::HttpArchiveFetcher;

/// One archive to fetch and unpack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub destination: PathBuf,
    pub kind: ArchiveKind,
    pub checksum: Option<Checksum>,
}

impl FetchRequest {
    /// Request with the archive kind guessed from the URL and no checksum.
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        let url = url.into();
        Self {
            kind: ArchiveKind::from_url(&url),
            url,
            destination: destination.into(),
            checksum: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ArchiveKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_checksum(mut self, checksum: Checksum) -> Self {
        self.checksum = Some(checksum);
        self
    }
}

/// Downloads an archive and extracts it into a directory.
pub trait ArchiveFetcher {
    /// Fetch `request.url` and unpack it into `request.destination`,
    /// creating the destination if needed.
    ///
    /// Fails on transport errors, non-success HTTP status, checksum
    /// mismatch and extraction errors.
    fn fetch_and_extract(&self, request: &FetchRequest) -> Result<()>;
}
