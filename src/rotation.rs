//! Log file rotation.
//!
//! One rotation renumbers every existing `<name>.<N>` sibling of the active
//! file to `<name>.<N+1>`, highest index first so nothing is overwritten,
//! then moves the active file to `<name>.0`. Reopening the active path is
//! the sink's job (see [`FileSink::rotate`](crate::sink::FileSink::rotate)).
//!
//! When to rotate is decided elsewhere; this module only performs one
//! rotation when asked. A failed step aborts the rotation and is returned
//! as is, without undoing the renames already done.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{ElogError, Result};

/// Path of the `index`-th rotated file of `active`.
pub fn rotated_path(active: &Path, index: u64) -> PathBuf {
    let mut name: OsString = active.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}", index));
    active.with_file_name(name)
}

/// Parses `file_name` as `<base>.<digits>` and returns the index.
///
/// The base is matched literally, so characters such as `.` or `+` in it
/// carry no special meaning. Only the canonical spelling of an index is
/// accepted: `app.log.01` is not a rotated file, so no two siblings can
/// share an index.
pub fn parse_rotated_index(base: &str, file_name: &str) -> Option<u64> {
    let digits = file_name.strip_prefix(base)?.strip_prefix('.')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

/// Lists the rotated siblings of `active` as `(index, path)`, highest first.
pub fn rotated_files(active: &Path) -> Result<Vec<(u64, PathBuf)>> {
    let dir = parent_dir(active);
    let base = active
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let entries = fs::read_dir(&dir).map_err(|e| ElogError::rotation(&dir, e))?;
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ElogError::rotation(&dir, e))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(index) = parse_rotated_index(&base, name) {
            found.push((index, entry.path()));
        }
    }
    found.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(found)
}

/// Shifts every rotated file up by one and moves `active` to `<active>.0`.
///
/// Fails before renaming anything if the highest index cannot be shifted.
pub fn shift_files(active: &Path) -> Result<()> {
    let rotated = rotated_files(active)?;
    if let Some((index, path)) = rotated.first() {
        if index.checked_add(1).is_none() {
            return Err(ElogError::rotation(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "rotation index out of range"),
            ));
        }
    }
    for (index, path) in &rotated {
        let target = rotated_path(active, index + 1);
        fs::rename(path, &target).map_err(|e| ElogError::rotation(path, e))?;
    }
    let first = rotated_path(active, 0);
    fs::rename(active, &first).map_err(|e| ElogError::rotation(active, e))?;
    tracing::info!(
        path = %active.display(),
        shifted = rotated.len(),
        "rotated log file"
    );
    Ok(())
}

fn parent_dir(active: &Path) -> PathBuf {
    match active.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
