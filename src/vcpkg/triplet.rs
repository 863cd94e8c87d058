//! vcpkg triplets.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::environment::HostPlatform;
use crate::error::{ProvisionError, Result};

/// Target triplet for Android builds.
pub const ANDROID_TRIPLET: &str = "arm64-android";

/// Triplet for tools running on the build host.
pub fn host_triplet(platform: &HostPlatform) -> &'static str {
    match platform {
        HostPlatform::Windows => "x64-windows",
        HostPlatform::MacOs => "x64-osx",
        HostPlatform::Linux(_) => "x64-linux",
    }
}

/// `triplet` qualified with a build type: `x64-linux` + `release` gives
/// `x64-linux-release`.
pub fn with_build_type(triplet: &str, build_type: Option<&str>) -> String {
    match build_type {
        Some(build_type) => format!("{triplet}-{build_type}"),
        None => triplet.to_string(),
    }
}

/// Create `triplets/<triplet>-<build_type>.cmake` from the stock triplet,
/// appending `set(VCPKG_BUILD_TYPE <build_type>)`.
///
/// The copy is recreated from the stock file each time, so repeated calls
/// never stack the appended line.
pub fn copy_for_build_type(install: &Path, triplet: &str, build_type: &str) -> Result<String> {
    let qualified = with_build_type(triplet, Some(build_type));
    let triplets = install.join("triplets");
    let stock = triplets.join(format!("{triplet}.cmake"));
    let copy = triplets.join(format!("{qualified}.cmake"));

    if !stock.is_file() {
        return Err(ProvisionError::MissingPath {
            what: format!("triplet {triplet}"),
            path: stock,
        });
    }

    info!("Copying triplet {} to have build type {}", triplet, build_type);
    fs::copy(&stock, &copy)?;
    let mut file = OpenOptions::new().append(true).open(&copy)?;
    writeln!(file, "set(VCPKG_BUILD_TYPE {build_type})")?;

    Ok(qualified)
}
