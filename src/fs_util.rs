//! Symlink-safe filesystem helpers shared by source traversal and the store.
//!
//! Type checks use `symlink_metadata()`, so a symlinked directory inside a
//! source tree is never followed out of it.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::{ConvertError, Result};

/// Maximum directory depth followed when copying a container.
pub(crate) const MAX_COPY_DEPTH: usize = 10;

/// Returns `true` if the path is a regular file (not a symlink).
#[must_use]
pub(crate) fn is_regular_file(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.file_type().is_file())
        .unwrap_or(false)
}

/// Returns `true` if the path is a regular directory (not a symlink).
#[must_use]
pub(crate) fn is_regular_dir(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.file_type().is_dir())
        .unwrap_or(false)
}

/// Read a UTF-8 file, attributing any failure to `path`.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))
}

/// Regular files directly inside `dir`, sorted by file name.
///
/// A missing directory yields an empty list.
pub(crate) fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !is_regular_dir(dir) {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| ConvertError::io(dir, e))? {
        let path = entry.map_err(|e| ConvertError::io(dir, e))?.path();
        if is_regular_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Regular files below `src`, relative to it, in walk order.
///
/// # Errors
///
/// Returns an error if the tree is deeper than [`MAX_COPY_DEPTH`] or cannot
/// be walked.
pub(crate) fn tree_files(src: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        if entry.depth() > MAX_COPY_DEPTH {
            return Err(ConvertError::Source {
                message: format!(
                    "{}: exceeded maximum directory depth ({MAX_COPY_DEPTH})",
                    src.display()
                ),
            });
        }
        if entry.file_type().is_file() {
            if let Ok(rel) = entry.path().strip_prefix(src) {
                files.push(rel.to_path_buf());
            }
        }
    }
    Ok(files)
}

/// Copy every regular file below `src` into `dest`, creating directories.
/// Returns the number of files copied.
pub(crate) fn copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    let files = tree_files(src)?;
    std::fs::create_dir_all(dest).map_err(|e| ConvertError::io(dest, e))?;
    for rel in &files {
        let target = dest.join(rel);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
        }
        std::fs::copy(src.join(rel), &target).map_err(|e| ConvertError::io(&target, e))?;
    }
    Ok(files.len())
}
