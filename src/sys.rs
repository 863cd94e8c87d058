//! Filesystem helpers.
//!
//! Small wrappers over `std::fs` and `walkdir` used by the acquirer and
//! the vcpkg provisioner: tree copies, top-level directory hoisting and
//! executable bits.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Copy a directory tree.
///
/// Entries are visited in sorted order and symlinks are copied as the
/// files they point to, so the same source always yields the same
/// destination bytes. `dst` must not exist yet.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    if !src.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source directory {} does not exist", src.display()),
        ));
    }

    for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::other(format!("strip_prefix failed: {e}")))?;
        let out = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&out)?;
        } else {
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &out)?;
        }
    }

    Ok(())
}

/// Remove whatever is at `path`: a symlink is unlinked (its target is left
/// alone), a directory is removed recursively, a file is deleted.
///
/// Returns `Ok(false)` if nothing was there.
pub fn remove_any(path: &Path) -> io::Result<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    if meta.file_type().is_symlink() {
        remove_symlink(path)?;
    } else if meta.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(true)
}

#[cfg(windows)]
fn remove_symlink(path: &Path) -> io::Result<()> {
    // Directory symlinks and junctions need remove_dir on Windows.
    fs::remove_dir(path).or_else(|_| fs::remove_file(path))
}

#[cfg(not(windows))]
fn remove_symlink(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

/// Move the contents of `root/name` up into `root` and remove the
/// now-empty `root/name`.
///
/// Source archives such as GitHub zipballs wrap everything in a single
/// top-level directory.
pub fn hoist_directory(root: &Path, name: &str) -> io::Result<()> {
    let nested = root.join(name);
    let mut entries: Vec<_> = fs::read_dir(&nested)?.collect::<io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        fs::rename(entry.path(), root.join(entry.file_name()))?;
    }
    fs::remove_dir(&nested)
}

/// Add the executable bits to a file.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o111);
    fs::set_permissions(path, perms)
}

/// Add the executable bits to a file.
#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Rewrite a text file without the lines matching `drop`.
///
/// Returns whether any line was removed. The file is left untouched when
/// nothing matches.
pub fn filter_lines(path: &Path, drop: impl Fn(&str) -> bool) -> io::Result<bool> {
    let original = fs::read_to_string(path)?;
    let mut changed = false;
    let kept: String = original
        .split_inclusive('\n')
        .filter(|line| {
            let remove = drop(line);
            changed |= remove;
            !remove
        })
        .collect();

    if changed {
        fs::write(path, kept)?;
    }
    Ok(changed)
}
