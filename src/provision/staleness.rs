//! Up-to-date checks for install directories.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::Result;

use super::locator::InstallLocation;
use super::tag::Tag;

/// Caller-requested overrides of the normal lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForceFlags {
    /// Treat the install as stale even if its tag matches.
    pub rebuild: bool,
    /// Re-fetch and re-bootstrap even if the tool is present.
    pub bootstrap: bool,
}

/// Why an install is considered current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpToDate {
    /// The caller owns the lifecycle.
    Pinned,
    /// Markers exist and the tag file matches.
    TagMatches,
}

/// Why an install needs to be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StaleReason {
    ForceRebuild,
    MissingMarker { path: PathBuf },
    MissingTagFile { path: PathBuf },
    TagMismatch { found: String, expected: String },
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForceRebuild => write!(f, "Force build, out of date"),
            Self::MissingMarker { path } => {
                write!(f, "Marker {} not found, out of date", path.display())
            }
            Self::MissingTagFile { path } => {
                write!(f, "Tag file {} not found, out of date", path.display())
            }
            Self::TagMismatch { found, expected } => write!(
                f,
                "Tag file contents {:?} don't match computed tag {:?}, out of date",
                found, expected
            ),
        }
    }
}

/// Result of a staleness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Freshness {
    Current { why: UpToDate },
    Stale { why: StaleReason },
}

impl Freshness {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, Self::Current { .. })
    }

    /// The stale reason, if any.
    pub fn stale_reason(&self) -> Option<&StaleReason> {
        match self {
            Self::Stale { why } => Some(why),
            Self::Current { .. } => None,
        }
    }
}

/// Decides whether an install directory matches an expected tag.
///
/// Checks short-circuit in a fixed order, cheapest first:
///
/// 1. pinned location: always current
/// 2. force rebuild requested
/// 3. a required marker is missing (in the order given)
/// 4. the tag file is missing
/// 5. the tag file content differs from the expected tag
pub struct StalenessChecker<'a> {
    location: &'a InstallLocation,
    expected: &'a Tag,
    markers: &'a [PathBuf],
}

impl<'a> StalenessChecker<'a> {
    /// Create a checker. `markers` are relative to the install directory.
    pub fn new(location: &'a InstallLocation, expected: &'a Tag, markers: &'a [PathBuf]) -> Self {
        Self {
            location,
            expected,
            markers,
        }
    }

    /// Run the checks. Only reading the tag file can fail; unreadable
    /// contents are a mismatch, not an error.
    pub fn check(&self, force: ForceFlags) -> Result<Freshness> {
        let freshness = self.evaluate(force)?;
        if let Freshness::Stale { why } = &freshness {
            info!("{}", why);
        }
        Ok(freshness)
    }

    fn evaluate(&self, force: ForceFlags) -> Result<Freshness> {
        if self.location.is_pinned() {
            return Ok(Freshness::Current {
                why: UpToDate::Pinned,
            });
        }

        if force.rebuild {
            return Ok(stale(StaleReason::ForceRebuild));
        }

        let install = self.location.install_path();
        if let Some(missing) = first_missing(&install, self.markers) {
            return Ok(stale(StaleReason::MissingMarker { path: missing }));
        }

        let tag_file = self.location.tag_file();
        if !tag_file.is_file() {
            return Ok(stale(StaleReason::MissingTagFile { path: tag_file }));
        }

        let found = String::from_utf8_lossy(&fs::read(&tag_file)?).into_owned();
        let expected = self.expected.contents();
        if found != expected {
            return Ok(stale(StaleReason::TagMismatch { found, expected }));
        }

        Ok(Freshness::Current {
            why: UpToDate::TagMatches,
        })
    }
}

fn stale(why: StaleReason) -> Freshness {
    Freshness::Stale { why }
}

/// First marker under `root` that does not exist, as an absolute path.
pub(crate) fn first_missing(root: &Path, markers: &[PathBuf]) -> Option<PathBuf> {
    markers
        .iter()
        .map(|m| root.join(m))
        .find(|path| !path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::tag::Fingerprint;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        location: InstallLocation,
        tag: Tag,
        markers: Vec<PathBuf>,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let tag = Tag::new(Fingerprint::new("abc12345"), None);
            let location = InstallLocation::Managed {
                base: temp.path().to_path_buf(),
                tag: tag.clone(),
            };
            fs::create_dir_all(location.install_path()).unwrap();
            Self {
                _temp: temp,
                location,
                tag,
                markers: vec![PathBuf::from("vcpkg"), PathBuf::from(".vcpkg-root")],
            }
        }

        fn touch(&self, rel: &str) {
            fs::write(self.location.install_path().join(rel), "").unwrap();
        }

        fn write_tag(&self, contents: &str) {
            fs::write(self.location.tag_file(), contents).unwrap();
        }

        fn complete(&self) {
            self.touch("vcpkg");
            self.touch(".vcpkg-root");
            self.write_tag("abc12345_1");
        }

        fn check(&self, force: ForceFlags) -> Freshness {
            StalenessChecker::new(&self.location, &self.tag, &self.markers)
                .check(force)
                .unwrap()
        }
    }

    #[test]
    fn complete_install_is_current() {
        let fx = Fixture::new();
        fx.complete();
        assert_eq!(
            fx.check(ForceFlags::default()),
            Freshness::Current {
                why: UpToDate::TagMatches
            }
        );
    }

    #[test]
    fn pinned_is_always_current() {
        let temp = TempDir::new().unwrap();
        let location = InstallLocation::Pinned(temp.path().join("does-not-exist"));
        let tag = Tag::new(Fingerprint::new("abc12345"), None);
        let markers = vec![PathBuf::from("vcpkg")];

        let freshness = StalenessChecker::new(&location, &tag, &markers)
            .check(ForceFlags {
                rebuild: true,
                bootstrap: true,
            })
            .unwrap();

        assert_eq!(
            freshness,
            Freshness::Current {
                why: UpToDate::Pinned
            }
        );
    }

    #[test]
    fn force_rebuild_beats_complete_install() {
        let fx = Fixture::new();
        fx.complete();
        let freshness = fx.check(ForceFlags {
            rebuild: true,
            bootstrap: false,
        });
        assert_eq!(freshness.stale_reason(), Some(&StaleReason::ForceRebuild));
    }

    #[test]
    fn missing_executable_reported_before_stale_tag() {
        let fx = Fixture::new();
        fx.touch(".vcpkg-root");
        fx.write_tag("abc12345_0");

        let freshness = fx.check(ForceFlags::default());

        assert_eq!(
            freshness.stale_reason(),
            Some(&StaleReason::MissingMarker {
                path: fx.location.install_path().join("vcpkg")
            })
        );
    }

    #[test]
    fn markers_checked_in_given_order() {
        let fx = Fixture::new();
        let freshness = fx.check(ForceFlags::default());
        assert_eq!(
            freshness.stale_reason(),
            Some(&StaleReason::MissingMarker {
                path: fx.location.install_path().join("vcpkg")
            })
        );
    }

    #[test]
    fn missing_root_marker() {
        let fx = Fixture::new();
        fx.touch("vcpkg");
        fx.write_tag("abc12345_1");
        assert_eq!(
            fx.check(ForceFlags::default()).stale_reason(),
            Some(&StaleReason::MissingMarker {
                path: fx.location.install_path().join(".vcpkg-root")
            })
        );
    }

    #[test]
    fn missing_tag_file() {
        let fx = Fixture::new();
        fx.touch("vcpkg");
        fx.touch(".vcpkg-root");
        assert_eq!(
            fx.check(ForceFlags::default()).stale_reason(),
            Some(&StaleReason::MissingTagFile {
                path: fx.location.tag_file()
            })
        );
    }

    #[test]
    fn garbled_tag_file_is_a_mismatch() {
        let fx = Fixture::new();
        fx.complete();
        fs::write(fx.location.tag_file(), [0xff, 0xfe, 0x00]).unwrap();

        let freshness = fx.check(ForceFlags::default());

        assert!(matches!(
            freshness.stale_reason(),
            Some(StaleReason::TagMismatch { expected, .. }) if expected == "abc12345_1"
        ));
    }

    #[test]
    fn stale_tag_version() {
        let fx = Fixture::new();
        fx.complete();
        fx.write_tag("abc12345_0");
        assert_eq!(
            fx.check(ForceFlags::default()).stale_reason(),
            Some(&StaleReason::TagMismatch {
                found: "abc12345_0".into(),
                expected: "abc12345_1".into()
            })
        );
    }

    #[test]
    fn tag_comparison_is_exact() {
        let fx = Fixture::new();
        fx.complete();
        fx.write_tag("abc12345_1\n");
        assert!(!fx.check(ForceFlags::default()).is_up_to_date());
    }

    #[test]
    fn force_bootstrap_alone_does_not_make_stale() {
        let fx = Fixture::new();
        fx.complete();
        assert!(fx
            .check(ForceFlags {
                rebuild: false,
                bootstrap: true
            })
            .is_up_to_date());
    }

    #[test]
    fn stale_reasons_have_distinct_messages() {
        let reasons = [
            StaleReason::ForceRebuild,
            StaleReason::MissingMarker {
                path: PathBuf::from("/x/vcpkg"),
            },
            StaleReason::MissingTagFile {
                path: PathBuf::from("/x/.id"),
            },
            StaleReason::TagMismatch {
                found: "a_0".into(),
                expected: "a_1".into(),
            },
        ];
        let messages: std::collections::HashSet<String> =
            reasons.iter().map(|r| r.to_string()).collect();
        assert_eq!(messages.len(), reasons.len());
    }
}
