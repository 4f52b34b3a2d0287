use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of a convertible BMAD source item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// An agent persona bundle (`<module>/agents/<name>.xml`).
    Persona,
    /// A workflow document (`workflows/**/workflow*.md`).
    Workflow,
    /// A standalone task document (`tasks/<name>.md`).
    Task,
}

/// A named file body collected next to a workflow (step, template, data file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedContent {
    pub name: String,
    pub content: String,
}

impl NamedContent {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Fence language for this file, taken from its extension.
    #[must_use]
    pub fn fence_lang(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((_, "md")) => "markdown",
            Some((_, ext)) => ext,
            None => "",
        }
    }
}

/// Auxiliary sections attached to a workflow skill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Auxiliary {
    pub steps: Vec<NamedContent>,
    pub templates: Vec<NamedContent>,
    pub data: Vec<NamedContent>,
}

impl Auxiliary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.templates.is_empty() && self.data.is_empty()
    }
}

/// One convertible unit read from a source tree.
///
/// `rel_path` is relative to the kind's well-known subtree (the module's
/// `agents/`, `workflows/` or `tasks/` directory). The body is opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub module: String,
    pub kind: SourceKind,
    pub rel_path: PathBuf,
    pub body: String,
    pub aux: Auxiliary,
}

impl SourceItem {
    pub fn new(
        module: impl Into<String>,
        kind: SourceKind,
        rel_path: impl Into<PathBuf>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            kind,
            rel_path: rel_path.into(),
            body: body.into(),
            aux: Auxiliary::default(),
        }
    }

    #[must_use]
    pub fn with_aux(mut self, aux: Auxiliary) -> Self {
        self.aux = aux;
        self
    }

    /// File stem of the item (`analyst` for `analyst.xml`).
    #[must_use]
    pub fn stem(&self) -> String {
        self.rel_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Persona metadata scanned from the leading tag of an agent bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentMeta {
    /// Persona name (e.g. "Mary").
    pub name: String,
    /// Role title (e.g. "Business Analyst").
    pub title: String,
    pub icon: String,
    pub description: String,
}

/// Safety tier controlling which tools an agent may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyTier {
    Safe,
    Neutral,
    Destructive,
    /// Accepted in hand-authored records; never assigned by the classifier.
    Yolo,
}

impl SafetyTier {
    /// All accepted tier strings, in risk order.
    pub const ACCEPTED: &'static [&'static str] = &["safe", "neutral", "destructive", "yolo"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SafetyTier::Safe => "safe",
            SafetyTier::Neutral => "neutral",
            SafetyTier::Destructive => "destructive",
            SafetyTier::Yolo => "yolo",
        }
    }
}

impl fmt::Display for SafetyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafetyTier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "safe" => Ok(SafetyTier::Safe),
            "neutral" => Ok(SafetyTier::Neutral),
            "destructive" => Ok(SafetyTier::Destructive),
            "yolo" => Ok(SafetyTier::Yolo),
            other => Err(format!("unknown safety tier: \"{other}\"")),
        }
    }
}

/// A Vibe agent configuration record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRecord {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub safety: SafetyTier,
    pub system_prompt_id: String,
    pub enabled_tools: Vec<String>,
    /// Skill id this agent delegates to, for workflow shortcut agents.
    pub shortcut_for: Option<String>,
}

impl AgentRecord {
    /// Only the lowest-risk tier runs without confirmation.
    #[must_use]
    pub fn auto_approve(&self) -> bool {
        self.safety == SafetyTier::Safe
    }

    #[must_use]
    pub fn is_shortcut(&self) -> bool {
        self.shortcut_for.is_some()
    }
}

/// YAML front matter of a generated SKILL.md.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillFrontmatter {
    pub name: String,
    pub description: String,
    pub license: String,
    #[serde(rename = "user-invocable")]
    pub user_invocable: bool,
    #[serde(rename = "allowed-tools")]
    pub allowed_tools: Vec<String>,
}
