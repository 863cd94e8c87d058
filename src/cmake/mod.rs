//! Generated CMake includes.
//!
//! Each provisioner records where its bundle lives in a small include
//! file under the build root. The downstream build pulls it in before
//! `project()`. Both includes pin the location with a cached/uncached
//! `get_filename_component` pair so that a later run pointing somewhere
//! else fails loudly instead of silently mixing two dependency sets.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;

/// File name of the Qt include.
pub const QT_INCLUDE: &str = "qt.cmake";
/// File name of the vcpkg include.
pub const VCPKG_INCLUDE: &str = "vcpkg.cmake";

/// Everything a downstream build needs to find one dependency bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildInclude {
    Qt {
        /// Directory passed to CMake as `QT_CMAKE_PREFIX_PATH`.
        prefix_path: PathBuf,
    },
    Vcpkg {
        /// `scripts/buildsystems/vcpkg.cmake` inside the install.
        toolchain: PathBuf,
        /// `installed/<target triplet>`.
        install_root: PathBuf,
        /// `installed/<host triplet>/tools`.
        tools_dir: PathBuf,
        /// Host triplet, qualified with the build type if any.
        triplet: String,
        /// Set for Android builds. Replaces the toolchain guard.
        android_precompiled: Option<PathBuf>,
    },
}

impl BuildInclude {
    /// Render the include. Identical inputs give identical bytes.
    pub fn render(&self) -> String {
        let mut out = IncludeWriter::new();
        match self {
            Self::Qt { prefix_path } => {
                out.pinned_path("QT_CMAKE_PREFIX_PATH", prefix_path);
                out.blank();
                out.guard("QT_CMAKE_PREFIX_PATH");
            }
            Self::Vcpkg {
                toolchain,
                install_root,
                tools_dir,
                triplet,
                android_precompiled,
            } => {
                out.pinned_path("CMAKE_TOOLCHAIN_FILE", toolchain);
                out.set("VCPKG_INSTALL_ROOT", &install_root.display().to_string());
                out.set("VCPKG_TOOLS_DIR", &tools_dir.display().to_string());
                out.set("VCPKG_TARGET_TRIPLET", triplet);
                match android_precompiled {
                    Some(precompiled) => {
                        out.set("HIFI_ANDROID_PRECOMPILED", &precompiled.display().to_string())
                    }
                    None => {
                        out.blank();
                        out.guard("CMAKE_TOOLCHAIN_FILE");
                    }
                }
            }
        }
        out.finish()
    }

    /// Fully rewrite `path` with the rendered include.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        info!("Writing cmake config to {}", path.display());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render())?;
        Ok(())
    }
}

struct IncludeWriter {
    buf: String,
}

impl IncludeWriter {
    fn new() -> Self {
        Self {
            buf: format!(
                "\n# this file auto-generated by depsmith {}\n",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }

    fn pinned_path(&mut self, var: &str, path: &Path) {
        let path = path.display();
        let _ = writeln!(
            self.buf,
            "get_filename_component({var} \"{path}\" ABSOLUTE CACHE)"
        );
        let _ = writeln!(
            self.buf,
            "get_filename_component({var}_UNCACHED \"{path}\" ABSOLUTE)"
        );
    }

    fn set(&mut self, var: &str, value: &str) {
        let _ = writeln!(self.buf, "set({var} \"{value}\")");
    }

    fn guard(&mut self, var: &str) {
        let _ = writeln!(
            self.buf,
            "# If the cached path is different from the computed one, exit"
        );
        let _ = writeln!(self.buf, "if(NOT ({var}_UNCACHED STREQUAL {var}))");
        let _ = writeln!(
            self.buf,
            "    message(FATAL_ERROR \"{var} has changed, please wipe the build directory and rerun cmake\")"
        );
        let _ = writeln!(self.buf, "endif()");
    }

    fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// CMake treats backslashes as escapes, so Windows paths are
    /// normalized to forward slashes.
    fn finish(self) -> String {
        self.buf.replace('\\', "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vcpkg(android: Option<&str>) -> BuildInclude {
        BuildInclude::Vcpkg {
            toolchain: PathBuf::from("/deps/vcpkg/abc12345/scripts/buildsystems/vcpkg.cmake"),
            install_root: PathBuf::from("/deps/vcpkg/abc12345/installed/x64-linux"),
            tools_dir: PathBuf::from("/deps/vcpkg/abc12345/installed/x64-linux/tools"),
            triplet: "x64-linux".to_string(),
            android_precompiled: android.map(PathBuf::from),
        }
    }

    #[test]
    fn qt_include_pins_prefix_and_guards() {
        let text = BuildInclude::Qt {
            prefix_path: PathBuf::from("/deps/qt/5.12.3/qt5-install/lib/cmake"),
        }
        .render();

        assert!(text.contains(
            "get_filename_component(QT_CMAKE_PREFIX_PATH \"/deps/qt/5.12.3/qt5-install/lib/cmake\" ABSOLUTE CACHE)"
        ));
        assert!(text.contains(
            "get_filename_component(QT_CMAKE_PREFIX_PATH_UNCACHED \"/deps/qt/5.12.3/qt5-install/lib/cmake\" ABSOLUTE)"
        ));
        assert!(text.contains("if(NOT (QT_CMAKE_PREFIX_PATH_UNCACHED STREQUAL QT_CMAKE_PREFIX_PATH))"));
        assert!(text.contains(
            "message(FATAL_ERROR \"QT_CMAKE_PREFIX_PATH has changed, please wipe the build directory and rerun cmake\")"
        ));
    }

    #[test]
    fn vcpkg_include_records_layout() {
        let text = vcpkg(None).render();

        assert!(text.contains("get_filename_component(CMAKE_TOOLCHAIN_FILE \"/deps/vcpkg/abc12345/scripts/buildsystems/vcpkg.cmake\" ABSOLUTE CACHE)"));
        assert!(text.contains("set(VCPKG_INSTALL_ROOT \"/deps/vcpkg/abc12345/installed/x64-linux\")"));
        assert!(text.contains("set(VCPKG_TOOLS_DIR \"/deps/vcpkg/abc12345/installed/x64-linux/tools\")"));
        assert!(text.contains("set(VCPKG_TARGET_TRIPLET \"x64-linux\")"));
        assert!(text.contains("CMAKE_TOOLCHAIN_FILE has changed"));
        assert!(!text.contains("HIFI_ANDROID_PRECOMPILED"));
    }

    #[test]
    fn android_include_skips_guard() {
        let text = vcpkg(Some("/deps/android")).render();

        assert!(text.contains("set(HIFI_ANDROID_PRECOMPILED \"/deps/android\")"));
        assert!(!text.contains("FATAL_ERROR"));
    }

    #[test]
    fn backslashes_become_forward_slashes() {
        let text = BuildInclude::Qt {
            prefix_path: PathBuf::from(r"C:\deps\qt\5.12.3\qt5-install\lib\cmake"),
        }
        .render();

        assert!(!text.contains('\\'));
        assert!(text.contains("\"C:/deps/qt/5.12.3/qt5-install/lib/cmake\""));
    }

    #[test]
    fn rendering_is_byte_identical() {
        assert_eq!(vcpkg(None).render(), vcpkg(None).render());
    }

    #[test]
    fn write_to_replaces_previous_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(VCPKG_INCLUDE);
        fs::write(&path, "stale contents that are much longer than anything rendered ".repeat(50)).unwrap();

        vcpkg(None).write_to(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), vcpkg(None).render());
    }

    #[test]
    fn write_to_missing_build_root_creates_it() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("build/qt.cmake");
        BuildInclude::Qt {
            prefix_path: PathBuf::from("/qt"),
        }
        .write_to(&path)
        .unwrap();
        assert!(path.is_file());
    }
}
