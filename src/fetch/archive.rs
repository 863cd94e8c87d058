//! Archive extraction.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::{ProvisionError, Result};

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveKind {
    /// Guess the format from a URL or file name. Anything that is not
    /// recognisably zip or plain tar is treated as gzipped tar.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
        if path.ends_with(".zip") {
            Self::Zip
        } else if path.ends_with(".tar") {
            Self::Tar
        } else {
            Self::TarGz
        }
    }
}

/// Unpack `archive` into `destination`, creating it if needed.
pub fn extract(archive: &Path, kind: ArchiveKind, destination: &Path) -> Result<()> {
    fs::create_dir_all(destination)?;
    let file = File::open(archive)?;
    let failed = |message: String| ProvisionError::Extract {
        archive: archive.display().to_string(),
        message,
    };

    match kind {
        ArchiveKind::Zip => {
            let mut zip = zip::ZipArchive::new(file).map_err(|e| failed(e.to_string()))?;
            zip.extract(destination).map_err(|e| failed(e.to_string()))?;
        }
        ArchiveKind::Tar => {
            tar::Archive::new(BufReader::new(file))
                .unpack(destination)
                .map_err(|e| failed(e.to_string()))?;
        }
        ArchiveKind::TarGz => {
            tar::Archive::new(GzDecoder::new(BufReader::new(file)))
                .unpack(destination)
                .map_err(|e| failed(e.to_string()))?;
        }
    }

    Ok(())
}
