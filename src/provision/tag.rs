//! Fingerprints and tags.
//!
//! A [`Tag`] names one exact expected install state. Its [`id`](Tag::id)
//! keys the install directory and its [`contents`](Tag::contents) is what
//! gets written to the tag file once provisioning completes.

use std::fmt;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::Result;

/// Format version appended to every tag.
///
/// Increment to force every install to rebuild without the overlay
/// content changing.
pub const FORMAT_VERSION: u32 = 1;

/// Number of hex characters kept from a directory tree hash.
pub const FINGERPRINT_LEN: usize = 8;

/// Short identifier of the content a dependency bundle was built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already-computed fingerprint, or a version string for
    /// bundles keyed on a release rather than on content.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The fingerprint text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash every regular file under `root` into a [`Fingerprint`].
///
/// Files are visited in sorted order and identified by their path
/// relative to `root` with `/` separators, so the result depends only on
/// the tree's content and layout, never on where it lives or on the host
/// OS.
pub fn hash_directory_tree(root: &Path) -> Result<Fingerprint> {
    let mut hasher = Sha256::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or_else(|_| entry.path());
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let content = fs::read(entry.path())?;
        hasher.update(rel.as_bytes());
        hasher.update([0u8]);
        hasher.update((content.len() as u64).to_le_bytes());
        hasher.update(&content);
    }

    let digest = hasher.finalize();
    let hex = hex::encode(&digest[..]);
    Ok(Fingerprint(hex[..FINGERPRINT_LEN].to_string()))
}

/// Fingerprint, optional build-type qualifier and format version.
///
/// Two tags are equal iff all three parts match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    fingerprint: Fingerprint,
    build_type: Option<String>,
    version: u32,
}

impl Tag {
    /// Create a tag at the current [`FORMAT_VERSION`].
    ///
    /// An empty build type is treated as absent.
    pub fn new(fingerprint: Fingerprint, build_type: Option<&str>) -> Self {
        Self {
            fingerprint,
            build_type: build_type.filter(|b| !b.is_empty()).map(String::from),
            version: FORMAT_VERSION,
        }
    }

    /// Same tag at a different format version.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn build_type(&self) -> Option<&str> {
        self.build_type.as_deref()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Directory name for this tag: `fingerprint[-build_type]`.
    pub fn id(&self) -> String {
        match &self.build_type {
            Some(build_type) => format!("{}-{}", self.fingerprint, build_type),
            None => self.fingerprint.to_string(),
        }
    }

    /// Tag file contents: `id_version`.
    pub fn contents(&self) -> String {
        format!("{}_{}", self.id(), self.version)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.contents())
    }
}
