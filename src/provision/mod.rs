//! Tag-keyed install lifecycle shared by every dependency bundle.
//!
//! A bundle is located ([`locate`]), checked ([`StalenessChecker`]) and,
//! when stale, acquired ([`Acquirer`]). The tag file is written last, so
//! an interrupted run is always detected as stale on the next one.

pub mod acquirer;
pub mod cleanup;
pub mod locator;
pub mod staleness;
pub mod tag;

#[cfg(test)]
pub(crate) mod testing;

pub use acquirer::{
    mark_used, write_tag, AcquirePlan, AcquireReport, AcquireState, Acquirer, ArchiveSource, Bootstrap,
    Outcome, Overlay,
};
pub use cleanup::{remove_best_effort, Cleanup};
pub use locator::{
    locate, InstallLocation, LocationSummary, PREBUILD_TAG_FILE, TAG_FILE, USED_SUFFIX,
};
pub use staleness::{ForceFlags, Freshness, StaleReason, StalenessChecker, UpToDate};
pub use tag::{hash_directory_tree, Fingerprint, Tag, FINGERPRINT_LEN, FORMAT_VERSION};
