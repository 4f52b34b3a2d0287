//! Source acquisition: local directories or shallow clones.
//!
//! Clones land in one temporary directory that is removed when the
//! [`AcquiredSources`] value is dropped, unless it was kept.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::{debug, info};

use crate::errors::{ConvertError, Result};
use crate::fs_util::is_regular_dir;
use crate::source::SourceTree;

/// Repository holding the pre-built persona bundles.
pub const BUNDLES_REPO: &str = "https://github.com/bmad-code-org/bmad-bundles.git";

/// Repository holding the method sources (workflows, tasks, data).
pub const METHOD_REPO: &str = "https://github.com/bmad-code-org/BMAD-METHOD.git";

/// Where one source root comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Local(PathBuf),
    Remote(String),
}

impl SourceLocation {
    /// A local directory if given, otherwise the default repository.
    #[must_use]
    pub fn local_or(dir: Option<&Path>, repo: &str) -> Self {
        match dir {
            Some(d) => Self::Local(d.to_path_buf()),
            None => Self::Remote(repo.to_string()),
        }
    }
}

/// Acquired source roots. Owns the clone directory, if any.
#[derive(Debug)]
pub struct AcquiredSources {
    pub tree: SourceTree,
    temp: Option<TempDir>,
    kept: Option<PathBuf>,
}

impl AcquiredSources {
    /// The retained clone directory, when `keep_temp` was requested.
    #[must_use]
    pub fn kept_dir(&self) -> Option<&Path> {
        self.kept.as_deref()
    }

    /// Whether any root was cloned into a temporary directory.
    #[must_use]
    pub fn is_cloned(&self) -> bool {
        self.temp.is_some() || self.kept.is_some()
    }
}

/// Resolve both roots, cloning remote ones.
///
/// # Errors
///
/// Returns [`ConvertError::Source`] when a local directory is missing or a
/// clone fails. Nothing has been converted at that point.
pub fn acquire(
    bundles: &SourceLocation,
    method: &SourceLocation,
    keep_temp: bool,
) -> Result<AcquiredSources> {
    let needs_clone = matches!(bundles, SourceLocation::Remote(_))
        || matches!(method, SourceLocation::Remote(_));
    let temp = if needs_clone {
        let dir = tempfile::Builder::new()
            .prefix("bmad2vibe-")
            .tempdir()
            .map_err(|e| ConvertError::Source {
                message: format!("cannot create temporary directory: {e}"),
            })?;
        debug!(dir = %dir.path().display(), "created clone directory");
        Some(dir)
    } else {
        None
    };

    let bundles_dir = resolve(bundles, temp.as_ref(), "bmad-bundles")?;
    let method_dir = resolve(method, temp.as_ref(), "bmad-method")?;
    let tree = SourceTree::new(bundles_dir, method_dir);

    let (temp, kept) = match temp {
        Some(dir) if keep_temp => {
            let path = dir.keep();
            info!(dir = %path.display(), "keeping cloned sources");
            (None, Some(path))
        }
        other => (other, None),
    };

    Ok(AcquiredSources { tree, temp, kept })
}

fn resolve(location: &SourceLocation, temp: Option<&TempDir>, name: &str) -> Result<PathBuf> {
    match location {
        SourceLocation::Local(dir) => {
            if is_regular_dir(dir) {
                Ok(dir.clone())
            } else {
                Err(ConvertError::Source {
                    message: format!("source directory not found: {}", dir.display()),
                })
            }
        }
        SourceLocation::Remote(url) => {
            let Some(temp) = temp else {
                return Err(ConvertError::Source {
                    message: format!("no clone directory for {url}"),
                });
            };
            let dest = temp.path().join(name);
            shallow_clone(url, &dest)?;
            Ok(dest)
        }
    }
}

/// `git clone --depth 1 <url> <dest>`
fn shallow_clone(url: &str, dest: &Path) -> Result<()> {
    info!(url, dest = %dest.display(), "cloning");
    let output = Command::new("git")
        .args(["clone", "--depth", "1", "--quiet", url])
        .arg(dest)
        .output()
        .map_err(|e| ConvertError::Source {
            message: format!("failed to run git: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConvertError::Source {
            message: format!("git clone {url} failed: {}", stderr.trim()),
        });
    }
    Ok(())
}
