//! HTTP archive fetching.
//!
//! Streams the response body to a temporary file, verifies it when a
//! checksum is supplied, then unpacks it. Only connecting is bounded by a
//! timeout; a stalled transfer blocks the run.

use std::io;
use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::error::{ProvisionError, Result};
use crate::ui::download_bar;

use super::{archive, ArchiveFetcher, FetchRequest};

/// Fetches archives over HTTP/HTTPS.
pub struct HttpArchiveFetcher {
    client: Client,
    show_progress: bool,
}

impl HttpArchiveFetcher {
    /// Create a fetcher. `show_progress` enables a terminal download bar.
    pub fn new(show_progress: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("depsmith/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            show_progress,
        })
    }

    fn download_error(url: &str, message: impl Into<String>) -> ProvisionError {
        ProvisionError::Download {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

impl ArchiveFetcher for HttpArchiveFetcher {
    fn fetch_and_extract(&self, request: &FetchRequest) -> Result<()> {
        let url = request.url.as_str();
        info!("Downloading {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Self::download_error(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::download_error(
                url,
                format!("HTTP {}", response.status()),
            ));
        }

        let bar = download_bar(response.content_length(), url, self.show_progress);
        let mut download = tempfile::NamedTempFile::new()?;
        let mut reader = bar.wrap_read(response);
        io::copy(&mut reader, download.as_file_mut())
            .map_err(|e| Self::download_error(url, e.to_string()))?;
        bar.finish_and_clear();
        debug!("Downloaded {} to {}", url, download.path().display());

        if let Some(checksum) = &request.checksum {
            checksum.verify(download.path(), url)?;
        }

        info!("Extracting {} to {}", url, request.destination.display());
        archive::extract(download.path(), request.kind, &request.destination)
    }
}
