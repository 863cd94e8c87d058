//! Environment overlays for subprocesses.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

use super::EnvSnapshot;

/// An immutable environment for a child process: the captured ambient
/// environment plus named overrides.
///
/// [`with`](EnvOverlay::with) returns a new overlay, so a bootstrap
/// environment and a build environment derived from the same base never
/// observe each other's overrides.
///
/// # Example
///
/// ```
/// use depsmith::environment::{EnvOverlay, EnvSnapshot};
///
/// let base = EnvOverlay::new(&EnvSnapshot::from_pairs([("PATH", "/usr/bin")]));
/// let bootstrap = base.with("MACOSX_DEPLOYMENT_TARGET", "10.15");
///
/// assert_eq!(base.get("MACOSX_DEPLOYMENT_TARGET"), None);
/// assert_eq!(bootstrap.get("MACOSX_DEPLOYMENT_TARGET"), Some("10.15"));
/// assert_eq!(bootstrap.get("PATH"), Some("/usr/bin"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverlay {
    ambient: BTreeMap<OsString, OsString>,
    overrides: BTreeMap<String, String>,
}

impl EnvOverlay {
    /// Create an overlay over a captured environment.
    pub fn new(ambient: &EnvSnapshot) -> Self {
        Self {
            ambient: ambient
                .iter()
                .map(|(k, v)| (k.to_os_string(), v.to_os_string()))
                .collect(),
            overrides: BTreeMap::new(),
        }
    }

    /// Return a copy of this overlay with one more override.
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.overrides.insert(key.into(), value.into());
        next
    }

    /// Look up the effective value of a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self.overrides.get(key) {
            Some(value) => Some(value.as_str()),
            None => self.ambient.get(OsStr::new(key)).and_then(|v| v.to_str()),
        }
    }

    /// Only the overrides, in name order.
    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.overrides.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The merged environment the child process should see.
    pub fn vars(&self) -> BTreeMap<&OsStr, &OsStr> {
        let mut merged: BTreeMap<&OsStr, &OsStr> = self
            .ambient
            .iter()
            .map(|(k, v)| (k.as_os_str(), v.as_os_str()))
            .collect();
        merged.extend(
            self.overrides()
                .map(|(k, v)| (OsStr::new(k), OsStr::new(v))),
        );
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_shadow_ambient() {
        let overlay =
            EnvOverlay::new(&EnvSnapshot::from_pairs([("CC", "gcc")])).with("CC", "clang");
        assert_eq!(overlay.get("CC"), Some("clang"));
        assert_eq!(
            overlay.vars().get(OsStr::new("CC")),
            Some(&OsStr::new("clang"))
        );
    }

    #[test]
    fn with_leaves_original_untouched() {
        let base = EnvOverlay::new(&EnvSnapshot::default());
        let derived = base.with("QT_CMAKE_PREFIX_PATH", "/qt/lib/cmake");
        assert_eq!(base.overrides().count(), 0);
        assert_eq!(derived.overrides().count(), 1);
    }

    #[test]
    fn vars_contains_ambient_and_overrides() {
        let overlay = EnvOverlay::new(&EnvSnapshot::from_pairs([("HOME", "/home/dev")]))
            .with("EXTRA", "1");
        let vars = overlay.vars();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get(OsStr::new("HOME")), Some(&OsStr::new("/home/dev")));
        assert_eq!(vars.get(OsStr::new("EXTRA")), Some(&OsStr::new("1")));
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_ambient_reaches_children() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(vec![b'x', 0xfe]);
        let overlay = EnvOverlay::new(&EnvSnapshot::from_pairs([(OsString::from("ODD"), raw.clone())]));

        assert_eq!(overlay.get("ODD"), None);
        assert_eq!(overlay.vars().get(OsStr::new("ODD")), Some(&raw.as_os_str()));
    }
}
