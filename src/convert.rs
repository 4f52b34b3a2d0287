//! The conversion pipeline.
//!
//! Each phase runs over the configured modules in order:
//!
//! 1. persona bundles → agent records + prompts
//! 2. workflow documents → skills
//! 3. task documents → skills
//! 4. workflow skills → shortcut agents + prompts
//! 5. `data/` and `docs/` → bulk skill containers
//! 6. `AGENTS.md` discovery index
//! 7. consistency validation
//!
//! Per-item failures are recorded in the [`ConversionReport`] and the run
//! continues. The `plan_*` functions are pure; only [`Converter::run`] talks
//! to the store.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::ConvertOptions;
use crate::consistency::{validate_artifacts, ArtifactIndex, ValidationOutcome};
use crate::errors::Result;
use crate::fs_util::is_regular_dir;
use crate::metadata::extract_agent_meta;
use crate::models::SourceItem;
use crate::render;
use crate::report::ConversionReport;
use crate::safety::SafetyPolicy;
use crate::slug;
use crate::source::{SourceTree, SUPPORT_DIRS};
use crate::store::{
    agent_path, prompt_path, skill_dir, skill_path, ArtifactStore, StoreMode, INDEX_FILE,
};

/// Files to write for one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedArtifact {
    pub id: String,
    /// (path relative to the Vibe home, text)
    pub files: Vec<(PathBuf, String)>,
}

/// Plan the agent record and prompt of a persona bundle.
#[must_use]
pub fn plan_persona(item: &SourceItem, policy: &SafetyPolicy) -> PlannedArtifact {
    let stem = item.stem();
    let meta = extract_agent_meta(&item.body);
    let tier = policy.classify_persona(&item.module, &stem);
    let record = render::persona_record(&item.module, &stem, &meta, tier, policy);
    PlannedArtifact {
        files: vec![
            (
                agent_path(&record.id),
                render::render_persona_agent(&record, &item.module, &meta),
            ),
            (
                prompt_path(&record.system_prompt_id),
                render::render_persona_prompt(&item.module, &stem, &meta, &item.body),
            ),
        ],
        id: record.id,
    }
}

/// Plan the skill of a workflow document.
///
/// Returns `Ok(None)` when no identifier can be derived from its path.
///
/// # Errors
///
/// Returns an error if the skill front matter cannot be serialized.
pub fn plan_workflow_skill(item: &SourceItem) -> Result<Option<PlannedArtifact>> {
    let Some(id) = slug::workflow_skill_id(&item.module, &item.rel_path) else {
        return Ok(None);
    };
    let text = render::render_workflow_skill(&item.module, &id, &item.body, &item.aux)?;
    Ok(Some(PlannedArtifact {
        files: vec![(skill_path(&id), text)],
        id,
    }))
}

/// Plan the skill of a task document.
///
/// # Errors
///
/// Returns an error if the skill front matter cannot be serialized.
pub fn plan_task_skill(item: &SourceItem) -> Result<PlannedArtifact> {
    let id = slug::task_skill_id(&item.module, &item.stem());
    let text = render::render_task_skill(&item.module, &id, &item.body)?;
    Ok(PlannedArtifact {
        files: vec![(skill_path(&id), text)],
        id,
    })
}

/// Plan the shortcut agent and prompt that run `skill_id` directly.
#[must_use]
pub fn plan_shortcut(module: &str, skill_id: &str, policy: &SafetyPolicy) -> PlannedArtifact {
    let tier = policy.classify_workflow(module, slug::short_name(module, skill_id));
    let record = render::shortcut_record(module, skill_id, tier, policy);
    PlannedArtifact {
        files: vec![
            (agent_path(&record.id), render::render_shortcut_agent(&record)),
            (
                prompt_path(&record.system_prompt_id),
                render::render_shortcut_prompt(&record),
            ),
        ],
        id: record.id,
    }
}

/// Identifiers taken so far in one namespace, with the source that took them.
/// The first source in traversal order keeps an identifier.
#[derive(Debug, Default)]
struct IdClaims {
    owners: BTreeMap<String, String>,
}

impl IdClaims {
    /// Take `id` for `origin`. Returns the earlier owner if `id` is taken.
    fn claim(&mut self, id: &str, origin: &str) -> std::result::Result<(), String> {
        match self.owners.get(id) {
            Some(owner) => Err(owner.clone()),
            None => {
                self.owners.insert(id.to_string(), origin.to_string());
                Ok(())
            }
        }
    }

    /// Claim `id`, or record a collision error and return `false`.
    fn claim_or_report(
        &mut self,
        kind: &str,
        id: &str,
        origin: &str,
        report: &mut ConversionReport,
    ) -> bool {
        match self.claim(id, origin) {
            Ok(()) => true,
            Err(owner) => {
                warn!(id, origin, owner = %owner, "identifier collision");
                report.error(format!(
                    "{kind} id \"{id}\" from {origin} is already produced by {owner}; skipped"
                ));
                false
            }
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct ConversionRun {
    pub report: ConversionReport,
    pub validation: ValidationOutcome,
    pub store: ArtifactStore,
}

/// Drives the seven phases against one source tree and target root.
pub struct Converter<'a> {
    options: &'a ConvertOptions,
    policy: &'a SafetyPolicy,
    source: &'a SourceTree,
}

impl<'a> Converter<'a> {
    pub fn new(options: &'a ConvertOptions, policy: &'a SafetyPolicy, source: &'a SourceTree) -> Self {
        Self {
            options,
            policy,
            source,
        }
    }

    /// Run every phase. Never fails as a whole; problems land in the report.
    #[must_use]
    pub fn run(&self) -> ConversionRun {
        let mode = if self.options.preview {
            StoreMode::Preview
        } else {
            StoreMode::Write
        };
        let mut store = ArtifactStore::new(&self.options.vibe_home, mode);
        let mut report = ConversionReport::new();
        let mut agent_ids = IdClaims::default();
        let mut skill_ids = IdClaims::default();

        info!(
            vibe_home = %self.options.vibe_home.display(),
            modules = ?self.options.modules,
            preview = self.options.preview,
            "starting conversion"
        );

        info!("phase 1: persona agents");
        for module in &self.options.modules {
            self.convert_personas(module, &mut agent_ids, &mut store, &mut report);
        }

        info!("phase 2: workflow skills");
        let mut workflow_skills: Vec<(String, String)> = Vec::new();
        for module in &self.options.modules {
            for id in self.convert_workflows(module, &mut skill_ids, &mut store, &mut report) {
                workflow_skills.push((module.clone(), id));
            }
        }

        info!("phase 3: task skills");
        for module in &self.options.modules {
            self.convert_tasks(module, &mut skill_ids, &mut store, &mut report);
        }

        info!("phase 4: workflow shortcut agents");
        for (module, skill_id) in &workflow_skills {
            self.generate_shortcut(module, skill_id, &mut store, &mut report);
        }

        info!("phase 5: supporting data");
        for module in &self.options.modules {
            self.copy_support(module, &mut skill_ids, &mut store, &mut report);
        }

        info!("phase 6: AGENTS.md");
        let index = current_index(&store);
        let text = render::render_agents_index(&index.index_entries());
        if let Err(e) = store.write(INDEX_FILE, text) {
            report.error(format!("write {INDEX_FILE}: {e}"));
        }

        info!("phase 7: consistency validation");
        let validation = validate_artifacts(&current_index(&store));
        report.absorb(&validation.diagnostics);
        info!(
            agents = validation.agents,
            prompts = validation.prompts,
            skills = validation.skills,
            errors = validation.error_count(),
            warnings = validation.warning_count(),
            "validation finished"
        );

        ConversionRun {
            report,
            validation,
            store,
        }
    }

    fn convert_personas(
        &self,
        module: &str,
        claims: &mut IdClaims,
        store: &mut ArtifactStore,
        report: &mut ConversionReport,
    ) {
        let entries = match self.source.personas(module) {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                warn!(module, "no agents directory");
                report.warn(format!("no agents dir for module \"{module}\""));
                return;
            }
            Err(e) => {
                report.warn(format!("list agents of \"{module}\": {e}"));
                return;
            }
        };

        for entry in entries {
            let item = match entry.load() {
                Ok(item) => item,
                Err(e) => {
                    report.warn(format!("read persona {}: {e}", entry.rel_path.display()));
                    continue;
                }
            };
            let planned = plan_persona(&item, self.policy);
            debug!(source = %entry.rel_path.display(), id = %planned.id, "persona");
            if !claims.claim_or_report("agent", &planned.id, &entry.origin(), report) {
                continue;
            }
            if persist(store, report, &planned) {
                report.add_agent(&planned.id);
                report.add_prompt(&planned.id);
            }
        }
    }

    /// Returns the ids of the workflow skills produced for `module`.
    fn convert_workflows(
        &self,
        module: &str,
        claims: &mut IdClaims,
        store: &mut ArtifactStore,
        report: &mut ConversionReport,
    ) -> Vec<String> {
        let Some(walk) = self.source.workflows(module) else {
            warn!(module, "no workflows directory");
            report.warn(format!("no workflows dir for module \"{module}\""));
            return Vec::new();
        };

        let mut ids = Vec::new();
        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    report.warn(format!("walk workflows of \"{module}\": {e}"));
                    continue;
                }
            };
            let item = match entry.load() {
                Ok(item) => item,
                Err(e) => {
                    report.warn(format!("read workflow {}: {e}", entry.rel_path.display()));
                    continue;
                }
            };
            let planned = match plan_workflow_skill(&item) {
                Ok(Some(planned)) => planned,
                Ok(None) => {
                    report.warn(format!(
                        "cannot derive a skill id for workflow {} in \"{module}\"",
                        entry.rel_path.display()
                    ));
                    continue;
                }
                Err(e) => {
                    report.error(format!("render workflow {}: {e}", entry.rel_path.display()));
                    continue;
                }
            };
            debug!(source = %entry.rel_path.display(), id = %planned.id, "workflow");
            if !claims.claim_or_report("skill", &planned.id, &entry.origin(), report) {
                continue;
            }
            if persist(store, report, &planned) {
                report.add_skill(&planned.id);
                ids.push(planned.id);
            }
        }
        ids
    }

    fn convert_tasks(
        &self,
        module: &str,
        claims: &mut IdClaims,
        store: &mut ArtifactStore,
        report: &mut ConversionReport,
    ) {
        let entries = match self.source.tasks(module) {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                debug!(module, "no tasks directory");
                return;
            }
            Err(e) => {
                report.warn(format!("list tasks of \"{module}\": {e}"));
                return;
            }
        };

        for entry in entries {
            let item = match entry.load() {
                Ok(item) => item,
                Err(e) => {
                    report.warn(format!("read task {}: {e}", entry.rel_path.display()));
                    continue;
                }
            };
            match plan_task_skill(&item) {
                Ok(planned) => {
                    debug!(source = %entry.rel_path.display(), id = %planned.id, "task");
                    if !claims.claim_or_report("skill", &planned.id, &entry.origin(), report) {
                        continue;
                    }
                    if persist(store, report, &planned) {
                        report.add_skill(&planned.id);
                    }
                }
                Err(e) => report.error(format!("render task {}: {e}", entry.rel_path.display())),
            }
        }
    }

    fn generate_shortcut(
        &self,
        module: &str,
        skill_id: &str,
        store: &mut ArtifactStore,
        report: &mut ConversionReport,
    ) {
        // Persona records are never replaced; earlier shortcuts are refreshed.
        if let Some(existing) = store.existing(&agent_path(skill_id)) {
            if !render::is_shortcut_record(&existing) {
                debug!(id = skill_id, "agent record exists, skipping shortcut");
                return;
            }
        }
        let planned = plan_shortcut(module, skill_id, self.policy);
        debug!(id = %planned.id, "shortcut");
        if persist(store, report, &planned) {
            report.add_workflow_agent(&planned.id);
            report.add_prompt(&planned.id);
        }
    }

    fn copy_support(
        &self,
        module: &str,
        claims: &mut IdClaims,
        store: &mut ArtifactStore,
        report: &mut ConversionReport,
    ) {
        for sub in SUPPORT_DIRS {
            let src = self.source.support_dir(module, sub);
            if !is_regular_dir(&src) {
                continue;
            }
            let container = slug::bulk_container_id(module, sub);
            if !claims.claim_or_report("skill", &container, &format!("{module}/{sub}/"), report) {
                continue;
            }
            match store.copy_dir(&src, skill_dir(&container)) {
                Ok(files) => debug!(module, sub, files, "supporting data"),
                Err(e) => report.warn(format!("copy {module}/{sub}: {e}")),
            }
        }
    }
}

/// Write every file of `planned`; returns `false` if any write failed.
fn persist(store: &mut ArtifactStore, report: &mut ConversionReport, planned: &PlannedArtifact) -> bool {
    let mut ok = true;
    for (rel, text) in &planned.files {
        if let Err(e) = store.write(rel, text.clone()) {
            report.error(format!("write {e}"));
            ok = false;
        }
    }
    ok
}

/// The artifact set as this run sees it: the disk, plus this run's records
/// when nothing was written.
fn current_index(store: &ArtifactStore) -> ArtifactIndex {
    let mut index = ArtifactIndex::load(store.root());
    if store.is_preview() {
        index.overlay(store);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SafetyTier, SourceKind};
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    const ANALYST: &str = "<agent id=\"analyst\" title=\"Analyst\" icon=\"📊\">\n  <persona>Research things.</persona>\n</agent>\n";

    fn put(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    /// A tiny BMAD distribution with one module, `demo`.
    fn fixture() -> (TempDir, SourceTree) {
        let dir = tempdir().unwrap();
        let root = dir.path();
        put(root, "bundles/demo/agents/analyst.xml", ANALYST);
        put(
            root,
            "method/src/modules/demo/workflows/planning/workflow-create-spec.md",
            "# Create Spec\n\nWrite the spec.\n",
        );
        put(
            root,
            "method/src/modules/demo/workflows/planning/steps/step-01-init.md",
            "Initialize.",
        );
        put(
            root,
            "method/src/modules/demo/workflows/dev-story/workflow.md",
            "# Dev Story\n",
        );
        put(root, "method/src/modules/demo/tasks/shard-doc.md", "Shard a document.");
        put(root, "method/src/modules/demo/data/levels.csv", "a,b\n");
        let tree = SourceTree::new(root.join("bundles"), root.join("method"));
        (dir, tree)
    }

    fn options(home: &Path, preview: bool) -> ConvertOptions {
        ConvertOptions::new(home.to_path_buf(), vec!["demo".into()], preview).unwrap()
    }

    fn run(tree: &SourceTree, home: &Path, preview: bool) -> ConversionRun {
        let opts = options(home, preview);
        let policy = SafetyPolicy::default();
        Converter::new(&opts, &policy, tree).run()
    }

    #[test]
    fn plan_persona_example() {
        let item = SourceItem::new("demo", SourceKind::Persona, "analyst.xml", ANALYST);
        let planned = plan_persona(&item, &SafetyPolicy::default());
        assert_eq!(planned.id, "bmad-demo-analyst");
        let table: toml::Table = toml::from_str(&planned.files[0].1).unwrap();
        assert_eq!(table["safety"].as_str(), Some("neutral"));
        assert_eq!(table["auto_approve"].as_bool(), Some(false));
        let tools: Vec<&str> = table["enabled_tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        let policy = SafetyPolicy::default();
        assert_eq!(tools, policy.tools_for(SafetyTier::Neutral));
        let description = table["description"].as_str().unwrap();
        assert!(description.contains("demo") && description.contains("Analyst"));
    }

    #[test]
    fn plan_workflow_example() {
        let item = SourceItem::new(
            "demo",
            SourceKind::Workflow,
            "planning/workflow-create-spec.md",
            "# Spec",
        );
        let planned = plan_workflow_skill(&item).unwrap().unwrap();
        assert_eq!(planned.id, "bmad-demo-planning-create-spec");
        assert_eq!(
            planned.files[0].0,
            PathBuf::from("skills/bmad-demo-planning-create-spec/SKILL.md")
        );
    }

    #[test]
    fn plan_workflow_without_id_is_none() {
        let item = SourceItem::new("demo", SourceKind::Workflow, "workflow.md", "# Root");
        assert!(plan_workflow_skill(&item).unwrap().is_none());
    }

    #[test]
    fn plan_shortcut_classifies_by_short_name() {
        let policy = SafetyPolicy::default();
        let planned = plan_shortcut("demo", "bmad-demo-dev-story", &policy);
        let table: toml::Table = toml::from_str(&planned.files[0].1).unwrap();
        assert_eq!(table["safety"].as_str(), Some("destructive"));
        assert!(render::is_shortcut_record(&planned.files[0].1));
    }

    #[test]
    fn full_run_produces_consistent_tree() {
        let (_src, tree) = fixture();
        let home = tempdir().unwrap();
        let result = run(&tree, home.path(), false);

        assert_eq!(result.report.exit_code(), 0, "{:?}", result.report.errors());
        assert!(result.validation.diagnostics.is_empty(), "{:?}", result.validation.diagnostics);

        let summary = result.report.summary();
        assert_eq!(summary.agents, vec!["bmad-demo-analyst"]);
        assert_eq!(
            summary.skills,
            vec![
                "bmad-demo-dev-story",
                "bmad-demo-planning-create-spec",
                "bmad-demo-task-shard-doc"
            ]
        );
        assert_eq!(
            summary.workflow_agents,
            vec!["bmad-demo-dev-story", "bmad-demo-planning-create-spec"]
        );

        let h = home.path();
        assert!(h.join("agents/bmad-demo-analyst.toml").is_file());
        assert!(h.join("prompts/bmad-demo-planning-create-spec.md").is_file());
        assert!(h.join("skills/bmad-demo-data/levels.csv").is_file());
        let skill =
            fs::read_to_string(h.join("skills/bmad-demo-planning-create-spec/SKILL.md")).unwrap();
        assert!(skill.contains("## step-01-init.md"));
        let index = fs::read_to_string(h.join("AGENTS.md")).unwrap();
        assert!(index.contains("`vibe --agent bmad-demo-analyst`"));
        assert!(index.contains("`vibe --agent bmad-demo-dev-story`"));
    }

    #[test]
    fn runs_are_deterministic() {
        let (_src, tree) = fixture();
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        let first = run(&tree, a.path(), false);
        let second = run(&tree, b.path(), false);
        assert_eq!(first.store.rendered(), second.store.rendered());
    }

    #[test]
    fn rerun_is_idempotent() {
        let (_src, tree) = fixture();
        let home = tempdir().unwrap();
        let first = run(&tree, home.path(), false);
        let second = run(&tree, home.path(), false);
        assert_eq!(first.store.rendered(), second.store.rendered());
        assert_eq!(first.report.summary(), second.report.summary());
        assert!(!second.validation.has_errors());
    }

    #[test]
    fn preview_matches_write() {
        let (_src, tree) = fixture();
        let written = tempdir().unwrap();
        let previewed = tempdir().unwrap();
        let w = run(&tree, written.path(), false);
        let p = run(&tree, previewed.path(), true);

        assert_eq!(w.store.rendered(), p.store.rendered());
        assert_eq!(w.store.containers(), p.store.containers());
        assert_eq!(w.report.summary(), p.report.summary());
        assert_eq!(w.validation.agents, p.validation.agents);
        assert_eq!(w.validation.skills, p.validation.skills);
        assert_eq!(fs::read_dir(previewed.path()).unwrap().count(), 0);
    }

    #[test]
    fn persona_is_not_replaced_by_shortcut() {
        let (src, tree) = fixture();
        put(src.path(), "bundles/demo/agents/create-spec.xml", ANALYST);
        put(
            src.path(),
            "method/src/modules/demo/workflows/workflow-create-spec.md",
            "# Root Spec",
        );
        let home = tempdir().unwrap();
        let result = run(&tree, home.path(), false);
        let agent = fs::read_to_string(home.path().join("agents/bmad-demo-create-spec.toml")).unwrap();
        assert!(!render::is_shortcut_record(&agent));
        assert!(!result.report.summary().workflow_agents.contains(&"bmad-demo-create-spec".to_string()));
    }

    #[test]
    fn missing_module_dirs_warn_without_failing() {
        let src = tempdir().unwrap();
        let tree = SourceTree::new(src.path().join("bundles"), src.path().join("method"));
        let home = tempdir().unwrap();
        let result = run(&tree, home.path(), false);
        assert_eq!(result.report.exit_code(), 0);
        assert_eq!(result.report.warnings().len(), 2);
        assert!(home.path().join("AGENTS.md").is_file());
    }

    #[test]
    fn root_workflow_without_marker_is_skipped_with_warning() {
        let (src, tree) = fixture();
        put(src.path(), "method/src/modules/demo/workflows/workflow.md", "# Root");
        let home = tempdir().unwrap();
        let result = run(&tree, home.path(), false);
        assert_eq!(result.report.exit_code(), 0);
        assert!(result
            .report
            .warnings()
            .iter()
            .any(|w| w.contains("cannot derive a skill id")));
    }

    fn collision_errors(result: &ConversionRun, id: &str) -> Vec<String> {
        result
            .report
            .errors()
            .iter()
            .filter(|e| e.contains(&format!("\"{id}\"")))
            .cloned()
            .collect()
    }

    #[test]
    fn workflows_sharing_an_id_are_reported() {
        let (src, tree) = fixture();
        put(
            src.path(),
            "method/src/modules/demo/workflows/planning/create-spec/workflow.md",
            "# Nested Spec\n",
        );
        let home = tempdir().unwrap();
        let result = run(&tree, home.path(), false);

        let errors = collision_errors(&result, "bmad-demo-planning-create-spec");
        assert_eq!(errors.len(), 1, "{:?}", result.report.errors());
        assert!(errors[0].contains("demo/workflows/planning/create-spec/workflow.md"));
        assert!(errors[0].contains("demo/workflows/planning/workflow-create-spec.md"));
        assert_eq!(result.report.exit_code(), 1);

        // The walk reaches the nested directory first; that source keeps the id.
        let skill = fs::read_to_string(
            home.path().join("skills/bmad-demo-planning-create-spec/SKILL.md"),
        )
        .unwrap();
        assert!(skill.contains("# Nested Spec"));
        assert!(!skill.contains("Write the spec."));
    }

    #[test]
    fn task_colliding_with_workflow_is_reported() {
        let (src, tree) = fixture();
        put(
            src.path(),
            "method/src/modules/demo/workflows/task/workflow-shard-doc.md",
            "# Shard Workflow\n",
        );
        let home = tempdir().unwrap();
        let result = run(&tree, home.path(), false);

        let errors = collision_errors(&result, "bmad-demo-task-shard-doc");
        assert_eq!(errors.len(), 1, "{:?}", result.report.errors());
        assert!(errors[0].contains("demo/tasks/shard-doc.md"));
        assert!(errors[0].contains("demo/workflows/task/workflow-shard-doc.md"));
    }

    #[test]
    fn bulk_container_colliding_with_workflow_is_reported() {
        let (src, tree) = fixture();
        put(
            src.path(),
            "method/src/modules/demo/workflows/data/workflow.md",
            "# Data Workflow\n",
        );
        let home = tempdir().unwrap();
        let result = run(&tree, home.path(), false);

        let errors = collision_errors(&result, "bmad-demo-data");
        assert_eq!(errors.len(), 1, "{:?}", result.report.errors());
        assert!(errors[0].contains("demo/data/"));
        assert!(!home.path().join("skills/bmad-demo-data/levels.csv").exists());
    }

    #[test]
    fn personas_sharing_an_id_are_reported() {
        let (src, tree) = fixture();
        put(src.path(), "bundles/demo/agents/pm-lead.xml", ANALYST);
        put(src.path(), "bundles/demo/agents/pm--lead.xml", ANALYST);
        let home = tempdir().unwrap();
        let result = run(&tree, home.path(), false);

        let errors = collision_errors(&result, "bmad-demo-pm-lead");
        assert_eq!(errors.len(), 1, "{:?}", result.report.errors());
        assert!(errors[0].contains("demo/agents/pm-lead.xml"));
        assert!(errors[0].contains("demo/agents/pm--lead.xml"));
        assert_eq!(result.report.summary().agents, vec!["bmad-demo-analyst", "bmad-demo-pm-lead"]);
    }

    #[test]
    fn stale_ghost_agent_fails_the_run() {
        let (_src, tree) = fixture();
        let home = tempdir().unwrap();
        put(
            home.path(),
            "agents/bmad-demo-ghost.toml",
            "display_name = \"G\"\ndescription = \"g\"\nsafety = \"safe\"\nsystem_prompt_id = \"bmad-demo-nope\"\nenabled_tools = []\n",
        );
        let result = run(&tree, home.path(), false);
        assert_eq!(result.validation.error_count(), 1);
        assert_eq!(result.report.exit_code(), 1);
    }
}
