//! Read-back validation of the produced artifact set.
//!
//! The validator works on an [`ArtifactIndex`], a snapshot of the `bmad-*`
//! agents, prompts and skill containers under a Vibe home. Checks are
//! additive: every problem is reported, none stops the others.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::diagnostics::{Diagnostic, V000, V001, V002, V003, V004, V005, V006, V007, V008, V009, V010};
use crate::fs_util::{is_regular_dir, is_regular_file, read_text};
use crate::models::SafetyTier;
use crate::render::{self, IndexEntry};
use crate::slug::ID_PREFIX;
use crate::store::{
    agent_path, prompt_path, skill_path, ArtifactStore, AGENTS_DIR, PROMPTS_DIR, SKILLS_DIR,
    SKILL_FILE,
};

/// Prompts shorter than this many bytes are flagged.
pub const MIN_PROMPT_BYTES: usize = 50;

/// Container suffixes exempt from the `SKILL.md` requirement.
pub const BULK_SUFFIXES: &[&str] = &["-data", "-docs"];

/// Fields every agent record must carry (besides `system_prompt_id`).
const MANDATORY_FIELDS: &[&str] = &["display_name", "description", "safety", "enabled_tools"];

/// Snapshot of the artifacts under a Vibe home.
#[derive(Debug, Clone, Default)]
pub struct ArtifactIndex {
    /// Agent id → raw TOML text.
    agents: BTreeMap<String, String>,
    /// Prompt id → text.
    prompts: BTreeMap<String, String>,
    /// Skill container id → whether it holds a `SKILL.md`.
    skills: BTreeMap<String, bool>,
    /// Problems met while reading the tree.
    load_errors: Vec<Diagnostic>,
}

fn is_bmad_id(id: &str) -> bool {
    id.starts_with(ID_PREFIX) && id[ID_PREFIX.len()..].starts_with('-')
}

impl ArtifactIndex {
    /// Read the `bmad-*` artifacts under `root`.
    ///
    /// Missing directories are empty. Unreadable entries are recorded as
    /// `V000` errors and surface in [`validate_artifacts`].
    #[must_use]
    pub fn load(root: &Path) -> Self {
        let mut index = Self::default();

        for (id, path) in index.list_files(&root.join(AGENTS_DIR), "toml") {
            match read_text(&path) {
                Ok(text) => {
                    index.agents.insert(id, text);
                }
                Err(e) => index.load_errors.push(infra_error(&agent_path(&id), &e)),
            }
        }

        for (id, path) in index.list_files(&root.join(PROMPTS_DIR), "md") {
            match read_text(&path) {
                Ok(text) => {
                    index.prompts.insert(id, text);
                }
                Err(e) => index.load_errors.push(infra_error(&prompt_path(&id), &e)),
            }
        }

        let skills_dir = root.join(SKILLS_DIR);
        if is_regular_dir(&skills_dir) {
            match std::fs::read_dir(&skills_dir) {
                Ok(entries) => {
                    for entry in entries.flatten() {
                        let path = entry.path();
                        let name = entry.file_name().to_string_lossy().into_owned();
                        if is_regular_dir(&path) && is_bmad_id(&name) {
                            let has_skill = is_regular_file(&path.join(SKILL_FILE));
                            index.skills.insert(name, has_skill);
                        }
                    }
                }
                Err(e) => index.load_errors.push(
                    Diagnostic::error(V000, format!("cannot list directory: {e}"))
                        .with_artifact(SKILLS_DIR),
                ),
            }
        }

        debug!(
            agents = index.agents.len(),
            prompts = index.prompts.len(),
            skills = index.skills.len(),
            root = %root.display(),
            "loaded artifact index"
        );
        index
    }

    /// `bmad-*` files with extension `ext` directly inside `dir`, keyed by stem.
    fn list_files(&mut self, dir: &Path, ext: &str) -> Vec<(String, std::path::PathBuf)> {
        if !is_regular_dir(dir) {
            return Vec::new();
        }
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                let name = dir.file_name().map(|n| n.to_string_lossy().into_owned());
                self.load_errors.push(
                    Diagnostic::error(V000, format!("cannot list directory: {e}"))
                        .with_artifact(name.unwrap_or_default()),
                );
                return Vec::new();
            }
        };
        let mut files: Vec<(String, std::path::PathBuf)> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| is_regular_file(p) && p.extension().is_some_and(|e| e == ext))
            .filter_map(|p| {
                let stem = p.file_stem()?.to_string_lossy().into_owned();
                is_bmad_id(&stem).then_some((stem, p))
            })
            .collect();
        files.sort();
        files
    }

    /// Overlay what `store` recorded during this run onto the snapshot.
    pub fn overlay(&mut self, store: &ArtifactStore) {
        for (rel, text) in store.rendered() {
            let mut parts = rel.iter().map(|p| p.to_string_lossy());
            match (parts.next().as_deref(), parts.next(), parts.next(), parts.next()) {
                (Some(AGENTS_DIR), Some(file), None, None) => {
                    if let Some(id) = file.strip_suffix(".toml") {
                        self.agents.insert(id.to_string(), text.clone());
                    }
                }
                (Some(PROMPTS_DIR), Some(file), None, None) => {
                    if let Some(id) = file.strip_suffix(".md") {
                        self.prompts.insert(id.to_string(), text.clone());
                    }
                }
                (Some(SKILLS_DIR), Some(id), Some(file), None) if file == SKILL_FILE => {
                    self.skills.insert(id.into_owned(), true);
                }
                _ => {}
            }
        }
        for container in store.containers() {
            if let Some(id) = container.file_name() {
                self.skills
                    .entry(id.to_string_lossy().into_owned())
                    .or_insert(false);
            }
        }
    }

    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn prompt_count(&self) -> usize {
        self.prompts.len()
    }

    #[must_use]
    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    /// Raw TOML of an agent record, if present.
    #[must_use]
    pub fn agent(&self, id: &str) -> Option<&str> {
        self.agents.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn has_skill(&self, id: &str) -> bool {
        self.skills.contains_key(id)
    }

    /// Rows for `AGENTS.md`, in id order. Unparseable records are skipped.
    #[must_use]
    pub fn index_entries(&self) -> Vec<IndexEntry> {
        self.agents
            .iter()
            .filter_map(|(id, text)| {
                let table: toml::Table = toml::from_str(text).ok()?;
                let field = |k: &str| {
                    table
                        .get(k)
                        .and_then(toml::Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                Some(IndexEntry {
                    id: id.clone(),
                    display_name: field("display_name"),
                    description: field("description"),
                    shortcut: render::is_shortcut_record(text),
                })
            })
            .collect()
    }
}

fn infra_error(rel: &Path, err: &crate::errors::ConvertError) -> Diagnostic {
    Diagnostic::error(V000, format!("cannot read: {err}")).with_artifact(rel.display().to_string())
}

/// Counts and diagnostics of one validation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationOutcome {
    pub agents: usize,
    pub prompts: usize,
    pub skills: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationOutcome {
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// Run every consistency check over `index`.
#[must_use]
pub fn validate_artifacts(index: &ArtifactIndex) -> ValidationOutcome {
    let mut diags = index.load_errors.clone();

    for (id, text) in &index.agents {
        check_agent(index, id, text, &mut diags);
    }

    for (id, text) in &index.prompts {
        let artifact = prompt_path(id).display().to_string();
        if text.len() < MIN_PROMPT_BYTES {
            diags.push(
                Diagnostic::warning(
                    V006,
                    format!("prompt is only {} bytes (minimum {MIN_PROMPT_BYTES})", text.len()),
                )
                .with_artifact(artifact.clone()),
            );
        }
        if !index.agents.contains_key(id) {
            diags.push(
                Diagnostic::warning(V007, "orphan prompt: no agent record with this id")
                    .with_artifact(artifact)
                    .with_suggestion(format!("remove it or add {}", agent_path(id).display())),
            );
        }
    }

    for (id, has_skill) in &index.skills {
        let bulk = BULK_SUFFIXES.iter().any(|s| id.ends_with(s));
        if !has_skill && !bulk {
            diags.push(
                Diagnostic::warning(V008, format!("skill container has no {SKILL_FILE}"))
                    .with_artifact(format!("{SKILLS_DIR}/{id}")),
            );
        }
    }

    for (id, text) in &index.agents {
        if render::is_shortcut_record(text) {
            check_shortcut(index, id, text, &mut diags);
        }
    }

    ValidationOutcome {
        agents: index.agents.len(),
        prompts: index.prompts.len(),
        skills: index.skills.len(),
        diagnostics: diags,
    }
}

fn prompt_id_of(table: &toml::Table) -> Option<&str> {
    table.get("system_prompt_id").and_then(toml::Value::as_str)
}

fn check_agent(index: &ArtifactIndex, id: &str, text: &str, diags: &mut Vec<Diagnostic>) {
    let artifact = agent_path(id).display().to_string();
    let table: toml::Table = match toml::from_str(text) {
        Ok(t) => t,
        Err(e) => {
            diags.push(
                Diagnostic::error(V001, format!("invalid TOML: {}", e.message()))
                    .with_artifact(artifact),
            );
            return;
        }
    };

    for field in MANDATORY_FIELDS {
        if !table.contains_key(*field) {
            diags.push(
                Diagnostic::error(V002, format!("missing mandatory field `{field}`"))
                    .with_artifact(artifact.clone()),
            );
        }
    }

    if let Some(value) = table.get("safety") {
        let valid = value
            .as_str()
            .is_some_and(|s| s.parse::<SafetyTier>().is_ok());
        if !valid {
            diags.push(
                Diagnostic::error(V003, format!("invalid safety value {value}"))
                    .with_artifact(artifact.clone())
                    .with_suggestion(format!(
                        "use one of: {}",
                        SafetyTier::ACCEPTED.join(", ")
                    )),
            );
        }
    }

    match prompt_id_of(&table) {
        None => diags.push(
            Diagnostic::error(V004, "missing `system_prompt_id`").with_artifact(artifact),
        ),
        Some(prompt) if !index.prompts.contains_key(prompt) => diags.push(
            Diagnostic::error(
                V005,
                format!("system_prompt_id \"{prompt}\" has no prompt document"),
            )
            .with_artifact(artifact)
            .with_suggestion(format!("create {}", prompt_path(prompt).display())),
        ),
        Some(_) => {}
    }
}

fn check_shortcut(index: &ArtifactIndex, id: &str, text: &str, diags: &mut Vec<Diagnostic>) {
    let prompt_id = toml::from_str::<toml::Table>(text)
        .ok()
        .and_then(|t| prompt_id_of(&t).map(str::to_string))
        .unwrap_or_else(|| id.to_string());
    let Some(prompt) = index.prompts.get(&prompt_id) else {
        return;
    };
    let artifact = prompt_path(&prompt_id).display().to_string();
    match render::extract_skill_pointer(prompt) {
        None => diags.push(
            Diagnostic::error(V010, "shortcut prompt has no skill reference")
                .with_artifact(artifact),
        ),
        Some(skill) if !index.has_skill(&skill) => diags.push(
            Diagnostic::error(V009, format!("shortcut references missing skill \"{skill}\""))
                .with_artifact(artifact)
                .with_suggestion(format!("expected {}", skill_path(&skill).display())),
        ),
        Some(_) => {}
    }
}

/// Load and validate the artifact set under `root`.
#[must_use]
pub fn validate_tree(root: &Path) -> ValidationOutcome {
    validate_artifacts(&ArtifactIndex::load(root))
}
