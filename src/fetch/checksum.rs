//! Download checksum verification.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256, Sha512};

use crate::error::{ProvisionError, Result};

/// Digest algorithms accepted for verified downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
}

/// Expected digest of a download, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    pub algorithm: HashAlgorithm,
    pub hex: String,
}

impl Checksum {
    pub fn sha256(hex: impl Into<String>) -> Self {
        Self {
            algorithm: HashAlgorithm::Sha256,
            hex: hex.into(),
        }
    }

    pub fn sha512(hex: impl Into<String>) -> Self {
        Self {
            algorithm: HashAlgorithm::Sha512,
            hex: hex.into(),
        }
    }

    /// Check a downloaded file. `url` is only used for the error message.
    pub fn verify(&self, path: &Path, url: &str) -> Result<()> {
        let actual = digest_file(path, self.algorithm)?;
        if actual.eq_ignore_ascii_case(self.hex.trim()) {
            Ok(())
        } else {
            Err(ProvisionError::ChecksumMismatch {
                url: url.to_string(),
                expected: self.hex.clone(),
                actual,
            })
        }
    }
}

/// Hex digest of a file's contents.
pub fn digest_file(path: &Path, algorithm: HashAlgorithm) -> io::Result<String> {
    let mut file = File::open(path)?;
    match algorithm {
        HashAlgorithm::Sha256 => stream::<Sha256>(&mut file),
        HashAlgorithm::Sha512 => stream::<Sha512>(&mut file),
    }
}

fn stream<D: Digest>(reader: &mut impl Read) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(&hasher.finalize()[..]))
}
