//! Rendering of Vibe artifacts: agent records, prompt documents, skill
//! documents and the `AGENTS.md` discovery index.
//!
//! Every function here is pure and deterministic. Identical inputs produce
//! byte-identical output; nothing touches the filesystem.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::Result;
use crate::models::{AgentMeta, AgentRecord, Auxiliary, SafetyTier, SkillFrontmatter};
use crate::safety::{SafetyPolicy, TASK_SKILL_TOOLS, WORKFLOW_SKILL_TOOLS};
use crate::slug;

/// Comment marker identifying workflow shortcut agent records.
pub const SHORTCUT_MARKER: &str = "workflow shortcut";

/// License stamped into every generated skill.
pub const SKILL_LICENSE: &str = "MIT";

static SKILL_POINTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Skill slug: `([^`]+)`").expect("skill pointer regex"));

/// The pointer line a shortcut prompt uses to reference its skill.
#[must_use]
pub fn skill_pointer(skill_id: &str) -> String {
    format!("Skill slug: `{skill_id}`")
}

/// Extract the skill id referenced by a shortcut prompt, if any.
#[must_use]
pub fn extract_skill_pointer(prompt: &str) -> Option<String> {
    SKILL_POINTER_RE
        .captures(prompt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether a rendered agent record is a workflow shortcut.
///
/// Only comment lines are considered, so a description mentioning the marker
/// does not count.
#[must_use]
pub fn is_shortcut_record(toml_text: &str) -> bool {
    toml_text
        .lines()
        .any(|l| l.trim_start().starts_with('#') && l.contains(SHORTCUT_MARKER))
}

/// Escape a value as a TOML string.
fn toml_string(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

fn toml_string_array(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| toml_string(s)).collect();
    format!("[{}]", quoted.join(", "))
}

// ── Agent records ───────────────────────────────────────────────────────

/// Build the agent record for a persona.
///
/// An empty title falls back to the title-cased file stem; an empty
/// description is synthesized from module and title.
#[must_use]
pub fn persona_record(
    module: &str,
    stem: &str,
    meta: &AgentMeta,
    tier: SafetyTier,
    policy: &SafetyPolicy,
) -> AgentRecord {
    let id = slug::persona_id(module, stem);
    let title = persona_title(stem, meta);

    let mut display_name = format!("BMAD {} {title}", module.to_uppercase());
    if !meta.name.is_empty() && meta.name != title {
        display_name.push_str(&format!(" ({})", meta.name));
    }

    let description = if meta.description.is_empty() {
        format!("BMAD {module} agent: {title}")
    } else {
        meta.description.clone()
    };

    AgentRecord {
        system_prompt_id: id.clone(),
        id,
        display_name,
        description,
        safety: tier,
        enabled_tools: policy.tools_for(tier).to_vec(),
        shortcut_for: None,
    }
}

fn persona_title(stem: &str, meta: &AgentMeta) -> String {
    if meta.title.is_empty() {
        slug::to_title(stem)
    } else {
        meta.title.clone()
    }
}

/// Build the shortcut agent record that runs `skill_id` directly.
#[must_use]
pub fn shortcut_record(
    module: &str,
    skill_id: &str,
    tier: SafetyTier,
    policy: &SafetyPolicy,
) -> AgentRecord {
    let title = slug::to_title(slug::short_name(module, skill_id));
    AgentRecord {
        id: skill_id.to_string(),
        display_name: format!("BMAD {title}"),
        description: format!("BMAD {module} workflow: {title}"),
        safety: tier,
        system_prompt_id: skill_id.to_string(),
        enabled_tools: policy.tools_for(tier).to_vec(),
        shortcut_for: Some(skill_id.to_string()),
    }
}

fn agent_fields(record: &AgentRecord) -> String {
    format!(
        "display_name = {}\n\
         description = {}\n\
         safety = {}\n\
         auto_approve = {}\n\
         system_prompt_id = {}\n\
         \n\
         enabled_tools = {}\n",
        toml_string(&record.display_name),
        toml_string(&record.description),
        toml_string(record.safety.as_str()),
        record.auto_approve(),
        toml_string(&record.system_prompt_id),
        toml_string_array(&record.enabled_tools),
    )
}

/// Render a persona agent record as TOML.
#[must_use]
pub fn render_persona_agent(record: &AgentRecord, module: &str, meta: &AgentMeta) -> String {
    let mut out = String::new();
    out.push_str("# Auto-generated by bmad2vibe\n");
    out.push_str(&format!("# BMAD Agent: {}\n", record.id));
    out.push_str(&format!(
        "# Source module: {module} | Persona: {} {}\n\n",
        meta.icon, meta.name
    ));
    out.push_str(&agent_fields(record));
    out
}

/// Render a workflow shortcut agent record as TOML.
#[must_use]
pub fn render_shortcut_agent(record: &AgentRecord) -> String {
    let skill = record.shortcut_for.as_deref().unwrap_or(&record.id);
    let mut out = String::new();
    out.push_str(&format!("# Auto-generated {SHORTCUT_MARKER} agent by bmad2vibe\n"));
    out.push_str(&format!("# Runs workflow {skill} directly.\n\n"));
    out.push_str(&agent_fields(record));
    out
}

// ── Prompt documents ────────────────────────────────────────────────────

const ADAPTATION_TABLE: &str = "\
| BMAD reference | Vibe equivalent |
|---|---|
| `{project-root}` | Current working directory |
| `{output_folder}` | `_bmad-output/` |
| `{planning_artifacts}` | `_bmad-output/planning-artifacts/` |
| `{implementation_artifacts}` | `_bmad-output/implementation-artifacts/` |
| Slash commands (`/bmad-...`) | Execute the workflow instructions inline |
| `ask_user_question` | Vibe interactive question tool |
| `workflow.xml` engine | Follow workflow steps sequentially |
| `task` tool (subagent) | Vibe `task` tool for delegation |
";

/// Render the system prompt of a persona agent.
///
/// The raw bundle is embedded verbatim (trimmed) in an `xml` fence after a
/// fixed runtime-adaptation header.
#[must_use]
pub fn render_persona_prompt(module: &str, stem: &str, meta: &AgentMeta, raw: &str) -> String {
    let title = persona_title(stem, meta);
    let mut out = String::new();

    let heading = [meta.icon.as_str(), title.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&format!("# {heading}"));
    if !meta.name.is_empty() {
        out.push_str(&format!(" ({})", meta.name));
    }
    out.push_str("\n\n");
    out.push_str(&format!(
        "> Module: {} | Agent: {stem} | Generated by bmad2vibe\n\n",
        module.to_uppercase()
    ));

    out.push_str("## Vibe Runtime Adaptation\n\n");
    out.push_str("You are running inside **Mistral Vibe** CLI, NOT Claude Code/Cursor/Windsurf.\n");
    out.push_str("Apply these substitutions when following BMAD instructions:\n\n");
    out.push_str(ADAPTATION_TABLE);
    out.push('\n');
    out.push_str("When a menu item references a workflow, read its SKILL.md from\n");
    out.push_str(&format!(
        "`~/.vibe/skills/bmad-{module}-<workflow-name>/SKILL.md` and execute it.\n\n"
    ));

    out.push_str("## Full Agent Definition\n\n");
    out.push_str("Follow the agent specification below exactly, adapting tool calls to Vibe.\n\n");
    out.push_str(&format!("```xml\n{}\n```\n", raw.trim()));
    out
}

/// Render the prompt of a workflow shortcut agent.
#[must_use]
pub fn render_shortcut_prompt(record: &AgentRecord) -> String {
    let skill = record.shortcut_for.as_deref().unwrap_or(&record.id);
    let title = record
        .display_name
        .strip_prefix("BMAD ")
        .unwrap_or(&record.display_name);
    format!(
        "# BMAD Workflow: {title}\n\
         \n\
         > Workflow shortcut agent, auto-generated by bmad2vibe.\n\
         \n\
         ## Instructions\n\
         \n\
         1. Read `~/.vibe/skills/{skill}/SKILL.md`\n\
         2. Follow all instructions sequentially\n\
         3. Substitute `{{project-root}}` → cwd\n\
         4. Substitute `{{output_folder}}` → `_bmad-output/`\n\
         5. Substitute `{{planning_artifacts}}` → `_bmad-output/planning-artifacts/`\n\
         6. Use `ask_user_question` for interactive prompts\n\
         \n\
         {}\n",
        skill_pointer(skill)
    )
}

// ── Skill documents ─────────────────────────────────────────────────────

fn frontmatter(name: &str, description: String, tools: &[&str]) -> Result<String> {
    let fm = SkillFrontmatter {
        name: name.to_string(),
        description,
        license: SKILL_LICENSE.to_string(),
        user_invocable: true,
        allowed_tools: tools.iter().map(|t| (*t).to_string()).collect(),
    };
    let yaml = serde_yaml_ng::to_string(&fm)?;
    Ok(format!("---\n{yaml}---\n\n"))
}

/// Render a workflow skill document.
///
/// Auxiliary sections follow the body in the order steps, templates, data;
/// a section is omitted entirely when its list is empty.
///
/// # Errors
///
/// Returns an error if the front matter cannot be serialized.
pub fn render_workflow_skill(
    module: &str,
    skill_id: &str,
    body: &str,
    aux: &Auxiliary,
) -> Result<String> {
    let upper = module.to_uppercase();
    let mut out = frontmatter(
        skill_id,
        format!("BMAD {upper} workflow, auto-generated by bmad2vibe"),
        WORKFLOW_SKILL_TOOLS,
    )?;

    out.push_str(&format!("> Auto-generated by bmad2vibe from BMAD {upper} module.\n"));
    out.push_str("> `{project-root}` → cwd | `{output_folder}` → `_bmad-output/`\n");
    out.push_str("> `{planning_artifacts}` → `_bmad-output/planning-artifacts/`\n");
    out.push_str("> When instructions say \"load workflow engine\", follow steps sequentially.\n\n");
    out.push_str(body);
    out.push('\n');

    if !aux.steps.is_empty() {
        out.push_str("\n---\n\n# Workflow Steps\n\n");
        out.push_str("Execute these steps in order.\n\n");
        for s in &aux.steps {
            out.push_str(&format!("## {}\n\n{}\n\n", s.name, s.content));
        }
    }

    if !aux.templates.is_empty() {
        out.push_str("\n---\n\n# Templates\n\n");
        for t in &aux.templates {
            out.push_str(&format!(
                "## Template: {}\n\n```{}\n{}\n```\n\n",
                t.name,
                t.fence_lang(),
                t.content
            ));
        }
    }

    if !aux.data.is_empty() {
        out.push_str("\n---\n\n# Data Files\n\n");
        for d in &aux.data {
            out.push_str(&format!(
                "## Data: {}\n\n```{}\n{}\n```\n\n",
                d.name,
                d.fence_lang(),
                d.content
            ));
        }
    }

    Ok(out)
}

/// Render a task skill document.
///
/// # Errors
///
/// Returns an error if the front matter cannot be serialized.
pub fn render_task_skill(module: &str, skill_id: &str, body: &str) -> Result<String> {
    let upper = module.to_uppercase();
    let mut out = frontmatter(
        skill_id,
        format!("BMAD {upper} task, auto-generated by bmad2vibe"),
        TASK_SKILL_TOOLS,
    )?;
    out.push_str(&format!("> BMAD {upper} task. `{{project-root}}` → cwd.\n\n"));
    out.push_str(body);
    out.push('\n');
    Ok(out)
}

// ── Discovery index ─────────────────────────────────────────────────────

/// One row of the `AGENTS.md` index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub shortcut: bool,
}

/// Fold a value into one Markdown table cell.
fn table_cell(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

fn index_row(e: &IndexEntry) -> String {
    format!(
        "| {} | `vibe --agent {}` | {} |\n",
        table_cell(&e.display_name),
        e.id,
        table_cell(&e.description)
    )
}

/// Render `AGENTS.md` from agent records, in the order given.
#[must_use]
pub fn render_agents_index(entries: &[IndexEntry]) -> String {
    let mut out = String::new();
    out.push_str("# AGENTS.md: BMAD Method for Mistral Vibe\n\n");
    out.push_str(
        "Auto-generated by bmad2vibe. Copy to your project root for Vibe AGENTS.md support.\n\n",
    );
    out.push_str("## Persona Agents\n\n");
    out.push_str("Launch: `vibe --agent <name>` or `Shift+Tab` in interactive mode.\n\n");
    out.push_str("| Agent | Command | Description |\n|---|---|---|\n");
    for e in entries.iter().filter(|e| !e.shortcut) {
        out.push_str(&index_row(e));
    }

    let shortcuts: Vec<&IndexEntry> = entries.iter().filter(|e| e.shortcut).collect();
    if !shortcuts.is_empty() {
        out.push_str("\n## Workflow Shortcut Agents\n\n");
        out.push_str("| Agent | Command | Description |\n|---|---|---|\n");
        for e in shortcuts {
            out.push_str(&index_row(e));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NamedContent;

    fn analyst_meta() -> AgentMeta {
        AgentMeta {
            title: "Analyst".into(),
            ..AgentMeta::default()
        }
    }

    #[test]
    fn persona_record_example() {
        let policy = SafetyPolicy::default();
        let tier = policy.classify_persona("demo", "analyst");
        let rec = persona_record("demo", "analyst", &analyst_meta(), tier, &policy);
        assert_eq!(rec.id, "bmad-demo-analyst");
        assert_eq!(rec.safety, SafetyTier::Neutral);
        assert_eq!(rec.enabled_tools, policy.tools_for(SafetyTier::Neutral));
        assert!(!rec.auto_approve());
        assert!(rec.description.contains("demo"));
        assert!(rec.description.contains("Analyst"));
        assert_eq!(rec.system_prompt_id, rec.id);
    }

    #[test]
    fn persona_display_name_includes_distinct_name() {
        let policy = SafetyPolicy::default();
        let meta = AgentMeta {
            name: "Mary".into(),
            title: "Business Analyst".into(),
            ..AgentMeta::default()
        };
        let rec = persona_record("bmm", "analyst", &meta, SafetyTier::Safe, &policy);
        assert_eq!(rec.display_name, "BMAD BMM Business Analyst (Mary)");
    }

    #[test]
    fn persona_empty_title_falls_back_to_stem() {
        let policy = SafetyPolicy::default();
        let rec = persona_record(
            "bmm",
            "tech-writer",
            &AgentMeta::default(),
            SafetyTier::Safe,
            &policy,
        );
        assert_eq!(rec.display_name, "BMAD BMM Tech Writer");
    }

    #[test]
    fn agent_toml_has_all_mandatory_fields() {
        let policy = SafetyPolicy::default();
        let rec = persona_record("demo", "analyst", &analyst_meta(), SafetyTier::Safe, &policy);
        let toml_text = render_persona_agent(&rec, "demo", &analyst_meta());
        let table: toml::Table = toml::from_str(&toml_text).unwrap();
        for key in [
            "display_name",
            "description",
            "safety",
            "auto_approve",
            "system_prompt_id",
            "enabled_tools",
        ] {
            assert!(table.contains_key(key), "missing {key}");
        }
        assert_eq!(table["auto_approve"].as_bool(), Some(true));
        assert_eq!(table["safety"].as_str(), Some("safe"));
        assert_eq!(table["enabled_tools"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn agent_toml_escapes_quotes() {
        let policy = SafetyPolicy::default();
        let meta = AgentMeta {
            title: "The \"Best\" Analyst".into(),
            description: "Says \"hi\"\nand more".into(),
            ..AgentMeta::default()
        };
        let rec = persona_record("demo", "analyst", &meta, SafetyTier::Neutral, &policy);
        let table: toml::Table = toml::from_str(&render_persona_agent(&rec, "demo", &meta)).unwrap();
        assert_eq!(table["description"].as_str(), Some("Says \"hi\"\nand more"));
    }

    #[test]
    fn shortcut_record_and_rendering() {
        let policy = SafetyPolicy::default();
        let rec = shortcut_record(
            "demo",
            "bmad-demo-planning-create-spec",
            SafetyTier::Neutral,
            &policy,
        );
        assert_eq!(rec.display_name, "BMAD Planning Create Spec");
        assert!(!rec.auto_approve());
        let toml_text = render_shortcut_agent(&rec);
        assert!(is_shortcut_record(&toml_text));
        let persona = persona_record("demo", "analyst", &analyst_meta(), SafetyTier::Safe, &policy);
        assert!(!is_shortcut_record(&render_persona_agent(&persona, "demo", &analyst_meta())));
        let prompt = render_shortcut_prompt(&rec);
        assert!(prompt.starts_with("# BMAD Workflow: Planning Create Spec\n"));
        assert_eq!(
            extract_skill_pointer(&prompt).as_deref(),
            Some("bmad-demo-planning-create-spec")
        );
    }

    #[test]
    fn persona_prompt_wraps_body() {
        let raw = "\n<agent title=\"Analyst\">\n  <persona/>\n</agent>\n\n";
        let prompt = render_persona_prompt("demo", "analyst", &analyst_meta(), raw);
        assert!(prompt.starts_with("# Analyst\n\n"));
        assert!(prompt.contains("## Vibe Runtime Adaptation"));
        assert!(prompt.contains("`~/.vibe/skills/bmad-demo-<workflow-name>/SKILL.md`"));
        assert!(prompt.ends_with("```xml\n<agent title=\"Analyst\">\n  <persona/>\n</agent>\n```\n"));
        assert!(prompt.len() > 50);
    }

    #[test]
    fn workflow_skill_front_matter_and_body() {
        let out =
            render_workflow_skill("demo", "bmad-demo-x", "# Body", &Auxiliary::default()).unwrap();
        assert!(out.starts_with("---\nname: bmad-demo-x\n"));
        let fm_end = out[4..].find("---\n").unwrap() + 4;
        let fm: SkillFrontmatter = serde_yaml_ng::from_str(&out[4..fm_end]).unwrap();
        assert_eq!(fm.license, "MIT");
        assert!(fm.user_invocable);
        assert_eq!(fm.allowed_tools.len(), WORKFLOW_SKILL_TOOLS.len());
        assert!(out.contains("# Body\n"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let out =
            render_workflow_skill("demo", "bmad-demo-x", "body", &Auxiliary::default()).unwrap();
        assert!(!out.contains("# Workflow Steps"));
        assert!(!out.contains("# Templates"));
        assert!(!out.contains("# Data Files"));
    }

    #[test]
    fn sections_render_in_order() {
        let aux = Auxiliary {
            steps: vec![NamedContent::new("step-01-init.md", "Start.")],
            templates: vec![NamedContent::new("prd-template.md", "# PRD")],
            data: vec![NamedContent::new("levels.csv", "a,b")],
        };
        let out = render_workflow_skill("demo", "bmad-demo-x", "body", &aux).unwrap();
        let steps = out.find("# Workflow Steps").unwrap();
        let templates = out.find("# Templates").unwrap();
        let data = out.find("# Data Files").unwrap();
        assert!(steps < templates && templates < data);
        assert!(out.contains("## step-01-init.md\n\nStart.\n"));
        assert!(out.contains("## Template: prd-template.md\n\n```markdown\n# PRD\n```"));
        assert!(out.contains("## Data: levels.csv\n\n```csv\na,b\n```"));
    }

    #[test]
    fn only_nonempty_sections_render() {
        let aux = Auxiliary {
            data: vec![NamedContent::new("facts.yaml", "k: v")],
            ..Auxiliary::default()
        };
        let out = render_workflow_skill("demo", "bmad-demo-x", "body", &aux).unwrap();
        assert!(!out.contains("# Workflow Steps"));
        assert!(!out.contains("# Templates"));
        assert!(out.contains("# Data Files"));
    }

    #[test]
    fn task_skill_render() {
        let out = render_task_skill("bmm", "bmad-bmm-task-shard-doc", "Shard it.").unwrap();
        assert!(out.starts_with("---\nname: bmad-bmm-task-shard-doc\n"));
        assert!(out.contains("- bash\n"));
        assert!(out.ends_with("Shard it.\n"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let aux = Auxiliary {
            steps: vec![NamedContent::new("s.md", "x")],
            ..Auxiliary::default()
        };
        let a = render_workflow_skill("demo", "bmad-demo-x", "body", &aux).unwrap();
        let b = render_workflow_skill("demo", "bmad-demo-x", "body", &aux).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn agents_index_splits_personas_and_shortcuts() {
        let entries = vec![
            IndexEntry {
                id: "bmad-demo-analyst".into(),
                display_name: "BMAD DEMO Analyst".into(),
                description: "d1".into(),
                shortcut: false,
            },
            IndexEntry {
                id: "bmad-demo-create-spec".into(),
                display_name: "BMAD Create Spec".into(),
                description: "d2".into(),
                shortcut: true,
            },
        ];
        let out = render_agents_index(&entries);
        let persona = out.find("`vibe --agent bmad-demo-analyst`").unwrap();
        let section = out.find("## Workflow Shortcut Agents").unwrap();
        let shortcut = out.find("`vibe --agent bmad-demo-create-spec`").unwrap();
        assert!(persona < section && section < shortcut);
    }

    #[test]
    fn agents_index_row_stays_on_one_line() {
        let entries = vec![IndexEntry {
            id: "bmad-demo-pipe".into(),
            display_name: "BMAD A|B".into(),
            description: "first line\nsecond | part".into(),
            shortcut: false,
        }];
        let out = render_agents_index(&entries);
        let row = out
            .lines()
            .find(|l| l.contains("bmad-demo-pipe"))
            .unwrap();
        assert_eq!(
            row,
            "| BMAD A\\|B | `vibe --agent bmad-demo-pipe` | first line second \\| part |"
        );
    }

    #[test]
    fn agents_index_without_shortcuts_has_no_shortcut_section() {
        let out = render_agents_index(&[]);
        assert!(!out.contains("Workflow Shortcut Agents"));
    }

    #[test]
    fn extract_skill_pointer_absent() {
        assert_eq!(extract_skill_pointer("# Nothing here"), None);
    }
}
