//! Immutable capture of the process environment.
//!
//! Provisioners never call `std::env::var` directly. The environment is
//! captured once at startup into an [`EnvSnapshot`] and passed down, which
//! keeps every decision testable with a hand-built map.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Pinned vcpkg install path; disables all lifecycle management.
pub const VCPKG_PATH_VAR: &str = "TIVOLI_VCPKG_PATH";
/// Base directory holding managed vcpkg installs.
pub const VCPKG_BASE_VAR: &str = "TIVOLI_VCPKG_BASE";
/// Base directory holding managed Qt installs.
pub const QT_BASE_VAR: &str = "HIFI_QT_BASE";
/// Pinned Qt CMake prefix; disables Qt download.
pub const QT_PREFIX_VAR: &str = "QT_CMAKE_PREFIX_PATH";
/// CI marker. `Github` enables prebuilt vcpkg archives.
pub const CI_BUILD_VAR: &str = "CI_BUILD";
/// Override for the Android precompiled package directory.
pub const ANDROID_PRECOMPILED_VAR: &str = "HIFI_ANDROID_PRECOMPILED";

/// A frozen view of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<OsString, OsString>,
}

impl EnvSnapshot {
    /// Capture the current process environment, including variables
    /// that are not valid Unicode.
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars_os().collect(),
        }
    }

    /// Build a snapshot from explicit pairs (for testing).
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable. Values that are not valid Unicode read as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_os(key).and_then(OsStr::to_str)
    }

    /// Look up a variable without requiring Unicode.
    pub fn get_os(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    /// Look up a variable, treating an empty value as unset.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Look up a variable as a path.
    pub fn path(&self, key: &str) -> Option<PathBuf> {
        self.get_os(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }

    /// Whether a variable is present at all.
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(OsStr::new(key))
    }

    /// Whether `CI_BUILD` is set.
    pub fn is_ci(&self) -> bool {
        self.contains(CI_BUILD_VAR)
    }

    /// Whether this is a GitHub CI build, which may use prebuilt archives.
    pub fn is_github_ci(&self) -> bool {
        self.get(CI_BUILD_VAR) == Some("Github")
    }

    /// Iterate over all captured variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_and_get() {
        let env = EnvSnapshot::from_pairs([("A", "1"), ("B", "")]);
        assert_eq!(env.get("A"), Some("1"));
        assert_eq!(env.get("B"), Some(""));
        assert_eq!(env.get("C"), None);
    }

    #[test]
    fn empty_values_are_unset_for_paths() {
        let env = EnvSnapshot::from_pairs([(VCPKG_PATH_VAR, "")]);
        assert!(env.contains(VCPKG_PATH_VAR));
        assert!(env.path(VCPKG_PATH_VAR).is_none());
    }

    #[test]
    fn github_ci_requires_exact_value() {
        assert!(EnvSnapshot::from_pairs([(CI_BUILD_VAR, "Github")]).is_github_ci());
        assert!(!EnvSnapshot::from_pairs([(CI_BUILD_VAR, "github")]).is_github_ci());
        assert!(EnvSnapshot::from_pairs([(CI_BUILD_VAR, "Jenkins")]).is_ci());
        assert!(!EnvSnapshot::default().is_ci());
    }

    #[test]
    fn iter_is_sorted_by_name() {
        let env = EnvSnapshot::from_pairs([("ZED", "z"), ("ALPHA", "a")]);
        let names: Vec<&OsStr> = env.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec![OsStr::new("ALPHA"), OsStr::new("ZED")]);
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_values_are_kept() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(vec![b'/', b'o', b'p', b't', 0xff]);
        let env = EnvSnapshot::from_pairs([(OsString::from("ODD"), raw.clone())]);

        assert!(env.contains("ODD"));
        assert_eq!(env.get("ODD"), None);
        assert_eq!(env.get_os("ODD"), Some(raw.as_os_str()));
        assert_eq!(env.path("ODD"), Some(PathBuf::from(raw)));
    }

    #[test]
    fn capture_does_not_panic() {
        let _ = EnvSnapshot::capture();
    }
}
