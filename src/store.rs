//! Persistence of rendered artifacts under the Vibe home.
//!
//! In [`StoreMode::Write`] text goes to disk; in [`StoreMode::Preview`]
//! nothing is touched. Both modes record every (relative path, text) pair and
//! every copied container, so the computed artifact set is identical.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::{ConvertError, Result};
use crate::fs_util::{copy_tree, is_regular_file, tree_files};

pub const AGENTS_DIR: &str = "agents";
pub const PROMPTS_DIR: &str = "prompts";
pub const SKILLS_DIR: &str = "skills";
pub const SKILL_FILE: &str = "SKILL.md";
pub const INDEX_FILE: &str = "AGENTS.md";

/// `agents/<id>.toml`
#[must_use]
pub fn agent_path(id: &str) -> PathBuf {
    Path::new(AGENTS_DIR).join(format!("{id}.toml"))
}

/// `prompts/<id>.md`
#[must_use]
pub fn prompt_path(id: &str) -> PathBuf {
    Path::new(PROMPTS_DIR).join(format!("{id}.md"))
}

/// `skills/<id>`
#[must_use]
pub fn skill_dir(id: &str) -> PathBuf {
    Path::new(SKILLS_DIR).join(id)
}

/// `skills/<id>/SKILL.md`
#[must_use]
pub fn skill_path(id: &str) -> PathBuf {
    skill_dir(id).join(SKILL_FILE)
}

/// Whether the store persists or only records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Write,
    Preview,
}

/// Sink for rendered artifacts, rooted at the Vibe home.
#[derive(Debug)]
pub struct ArtifactStore {
    root: PathBuf,
    mode: StoreMode,
    rendered: BTreeMap<PathBuf, String>,
    containers: BTreeSet<PathBuf>,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>, mode: StoreMode) -> Self {
        Self {
            root: root.into(),
            mode,
            rendered: BTreeMap::new(),
            containers: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.mode == StoreMode::Preview
    }

    /// Record `text` at `rel` and, in write mode, persist it.
    ///
    /// Existing files are overwritten. The record is kept even if the write
    /// fails, so the run's artifact set does not depend on the disk.
    ///
    /// # Errors
    ///
    /// Returns the I/O error, attributed to the absolute path.
    pub fn write(&mut self, rel: impl Into<PathBuf>, text: String) -> Result<()> {
        let rel = rel.into();
        let abs = self.root.join(&rel);
        let result = match self.mode {
            StoreMode::Preview => {
                debug!(path = %abs.display(), "preview: would write");
                Ok(())
            }
            StoreMode::Write => write_file(&abs, &text),
        };
        self.rendered.insert(rel, text);
        result
    }

    /// Current text at `rel`: this run's record first, then the disk.
    #[must_use]
    pub fn existing(&self, rel: &Path) -> Option<String> {
        if let Some(text) = self.rendered.get(rel) {
            return Some(text.clone());
        }
        let abs = self.root.join(rel);
        if is_regular_file(&abs) {
            std::fs::read_to_string(abs).ok()
        } else {
            None
        }
    }

    /// Copy the tree at `src` into the container `rel_dest`.
    ///
    /// Returns the number of files copied (or that would be copied in
    /// preview mode).
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be walked or a file cannot be
    /// copied.
    pub fn copy_dir(&mut self, src: &Path, rel_dest: impl Into<PathBuf>) -> Result<usize> {
        let rel_dest = rel_dest.into();
        let abs = self.root.join(&rel_dest);
        let count = match self.mode {
            StoreMode::Preview => {
                let n = tree_files(src)?.len();
                debug!(src = %src.display(), dest = %abs.display(), files = n, "preview: would copy");
                n
            }
            StoreMode::Write => {
                let n = copy_tree(src, &abs)?;
                info!(src = %src.display(), dest = %abs.display(), files = n, "copied");
                n
            }
        };
        self.containers.insert(rel_dest);
        Ok(count)
    }

    /// Every (relative path, text) pair recorded during this run.
    #[must_use]
    pub fn rendered(&self) -> &BTreeMap<PathBuf, String> {
        &self.rendered
    }

    /// Every container directory populated by a copy during this run.
    #[must_use]
    pub fn containers(&self) -> &BTreeSet<PathBuf> {
        &self.containers
    }
}

fn write_file(abs: &Path, text: &str) -> Result<()> {
    if let Some(parent) = abs.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
    }
    std::fs::write(abs, text).map_err(|e| ConvertError::io(abs, e))
}
