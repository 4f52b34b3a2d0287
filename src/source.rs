//! Traversal of the two BMAD source trees.
//!
//! Persona bundles live under `<bundles>/<module>/agents/*.xml`; workflows,
//! tasks and supporting data under `<method>/src/modules/<module>/`. Each
//! traversal is a fresh iterator over [`SourceEntry`] values, so calling it
//! again restarts from the beginning. Bodies are only read by
//! [`SourceEntry::load`].

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::errors::{ConvertError, Result};
use crate::fs_util::{is_regular_dir, is_regular_file, read_text, sorted_files};
use crate::models::{Auxiliary, NamedContent, SourceItem, SourceKind};

/// Supporting directories copied verbatim into bulk containers.
pub const SUPPORT_DIRS: &[&str] = &["data", "docs"];

/// Case-insensitive name fragments marking a sibling file as a template.
const TEMPLATE_MARKERS: &[&str] = &["template", "tmpl"];

/// Root paths of an acquired BMAD distribution.
#[derive(Debug, Clone)]
pub struct SourceTree {
    bundles_dir: PathBuf,
    method_dir: PathBuf,
}

/// A located but not yet read source item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub module: String,
    pub kind: SourceKind,
    /// Path relative to the kind's subtree.
    pub rel_path: PathBuf,
    pub abs_path: PathBuf,
}

impl SourceTree {
    pub fn new(bundles_dir: impl Into<PathBuf>, method_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundles_dir: bundles_dir.into(),
            method_dir: method_dir.into(),
        }
    }

    fn module_dir(&self, module: &str) -> PathBuf {
        self.method_dir.join("src").join("modules").join(module)
    }

    #[must_use]
    pub fn agents_dir(&self, module: &str) -> PathBuf {
        self.bundles_dir.join(module).join("agents")
    }

    #[must_use]
    pub fn workflows_dir(&self, module: &str) -> PathBuf {
        self.module_dir(module).join("workflows")
    }

    #[must_use]
    pub fn tasks_dir(&self, module: &str) -> PathBuf {
        self.module_dir(module).join("tasks")
    }

    /// `data` or `docs` directory of a module.
    #[must_use]
    pub fn support_dir(&self, module: &str, sub: &str) -> PathBuf {
        self.module_dir(module).join(sub)
    }

    /// Persona bundles of `module`, in file-name order.
    ///
    /// Returns `None` when the module has no agents directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be listed.
    pub fn personas(&self, module: &str) -> Result<Option<Vec<SourceEntry>>> {
        flat_entries(module, SourceKind::Persona, &self.agents_dir(module), "xml")
    }

    /// Task documents of `module`, in file-name order.
    ///
    /// Returns `None` when the module has no tasks directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be listed.
    pub fn tasks(&self, module: &str) -> Result<Option<Vec<SourceEntry>>> {
        flat_entries(module, SourceKind::Task, &self.tasks_dir(module), "md")
    }

    /// Workflow documents of `module`: every `workflow*.md` file below the
    /// workflows directory, walked in file-name order.
    ///
    /// Returns `None` when the module has no workflows directory. The walk is
    /// lazy; unreadable directory entries surface as `Err` items.
    #[must_use]
    pub fn workflows<'a>(
        &self,
        module: &'a str,
    ) -> Option<impl Iterator<Item = Result<SourceEntry>> + 'a> {
        let root = self.workflows_dir(module);
        if !is_regular_dir(&root) {
            return None;
        }
        let walk_root = root.clone();
        let iter = WalkDir::new(walk_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Err(e) => Some(Err(ConvertError::from(e))),
                Ok(e) if !e.file_type().is_file() => None,
                Ok(e) if !is_workflow_file(&e.file_name().to_string_lossy()) => None,
                Ok(e) => {
                    let rel = e.path().strip_prefix(&root).ok()?.to_path_buf();
                    Some(Ok(SourceEntry {
                        module: module.to_string(),
                        kind: SourceKind::Workflow,
                        rel_path: rel,
                        abs_path: e.path().to_path_buf(),
                    }))
                }
            });
        Some(iter)
    }
}

fn is_workflow_file(name: &str) -> bool {
    name.starts_with("workflow") && name.ends_with(".md")
}

fn flat_entries(
    module: &str,
    kind: SourceKind,
    dir: &Path,
    ext: &str,
) -> Result<Option<Vec<SourceEntry>>> {
    if !is_regular_dir(dir) {
        return Ok(None);
    }
    let entries = sorted_files(dir)?
        .into_iter()
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .filter_map(|abs| {
            let rel = PathBuf::from(abs.file_name()?);
            Some(SourceEntry {
                module: module.to_string(),
                kind,
                rel_path: rel,
                abs_path: abs,
            })
        })
        .collect();
    Ok(Some(entries))
}

impl SourceEntry {
    /// `<module>/<subtree>/<relative path>`, as shown in messages.
    #[must_use]
    pub fn origin(&self) -> String {
        let subtree = match self.kind {
            SourceKind::Persona => "agents",
            SourceKind::Workflow => "workflows",
            SourceKind::Task => "tasks",
        };
        format!("{}/{subtree}/{}", self.module, self.rel_path.display())
    }

    /// Read the body, and for workflows the auxiliary files next to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the item's own body cannot be read. Unreadable
    /// auxiliary files are skipped.
    pub fn load(&self) -> Result<SourceItem> {
        let body = read_text(&self.abs_path)?;
        let item = SourceItem::new(&self.module, self.kind, &self.rel_path, body);
        if self.kind != SourceKind::Workflow {
            return Ok(item);
        }
        let dir = self.abs_path.parent().unwrap_or(Path::new("."));
        Ok(item.with_aux(collect_aux(dir)))
    }
}

/// Gather `steps/*.md`, `data/*` and template-named siblings of a workflow.
#[must_use]
pub fn collect_aux(dir: &Path) -> Auxiliary {
    Auxiliary {
        steps: collect(&dir.join("steps"), |name| name.ends_with(".md")),
        templates: collect(dir, |name| {
            let lower = name.to_lowercase();
            TEMPLATE_MARKERS.iter().any(|m| lower.contains(m))
        }),
        data: collect(&dir.join("data"), |_| true),
    }
}

fn collect(dir: &Path, keep: impl Fn(&str) -> bool) -> Vec<NamedContent> {
    let Ok(files) = sorted_files(dir) else {
        return Vec::new();
    };
    files
        .into_iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().into_owned();
            if !keep(&name) || !is_regular_file(&path) {
                return None;
            }
            match read_text(&path) {
                Ok(content) => Some(NamedContent::new(name, content)),
                Err(e) => {
                    debug!(error = %e, "skipping auxiliary file");
                    None
                }
            }
        })
        .collect()
}
