//! Process environment and host platform.
//!
//! Both are resolved once at startup and consumed as data afterwards:
//!
//! - [`EnvSnapshot`] - frozen copy of the process environment
//! - [`EnvOverlay`] - immutable child-process environment (snapshot + overrides)
//! - [`HostPlatform`] - closed enum of supported operating systems

pub mod overlay;
pub mod platform;
pub mod snapshot;

pub use overlay::EnvOverlay;
pub use platform::{HostPlatform, LinuxDistro};
pub use snapshot::{
    EnvSnapshot, ANDROID_PRECOMPILED_VAR, CI_BUILD_VAR, QT_BASE_VAR, QT_PREFIX_VAR,
    VCPKG_BASE_VAR, VCPKG_PATH_VAR,
};
