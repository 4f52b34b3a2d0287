//! Safety classification of persona and workflow agents.
//!
//! A [`SafetyPolicy`] holds the persona override table, the workflow
//! heuristic tokens and the tier→tool table. It is built once at startup
//! (defaults merged with configuration) and passed by reference, so
//! classification is a pure function of `(identifier, policy)`.

use std::collections::BTreeMap;

use crate::config::SafetyConfig;
use crate::errors::{ConvertError, Result};
use crate::models::SafetyTier;

/// Built-in persona tiers, scoped by module.
const DEFAULT_OVERRIDES: &[(&str, &str, SafetyTier)] = &[
    ("bmm", "analyst", SafetyTier::Safe),
    ("bmm", "architect", SafetyTier::Safe),
    ("bmm", "pm", SafetyTier::Safe),
    ("bmm", "sm", SafetyTier::Safe),
    ("bmm", "tea", SafetyTier::Safe),
    ("bmm", "tech-writer", SafetyTier::Safe),
    ("bmm", "ux-designer", SafetyTier::Safe),
    ("bmm", "dev", SafetyTier::Destructive),
    ("bmm", "quick-flow-solo-dev", SafetyTier::Destructive),
    ("bmgd", "game-dev", SafetyTier::Destructive),
    ("bmgd", "game-solo-dev", SafetyTier::Destructive),
    ("bmgd", "game-architect", SafetyTier::Safe),
    ("bmgd", "game-designer", SafetyTier::Safe),
    ("bmgd", "game-scrum-master", SafetyTier::Safe),
    ("bmgd", "game-qa", SafetyTier::Safe),
    ("cis", "brainstorming-coach", SafetyTier::Safe),
    ("cis", "creative-problem-solver", SafetyTier::Safe),
    ("cis", "design-thinking-coach", SafetyTier::Safe),
    ("cis", "innovation-strategist", SafetyTier::Safe),
    ("cis", "presentation-master", SafetyTier::Safe),
    ("cis", "storyteller", SafetyTier::Safe),
    ("bmb", "bmad-builder", SafetyTier::Destructive),
    ("bmb", "agent-builder", SafetyTier::Destructive),
    ("bmb", "module-builder", SafetyTier::Destructive),
    ("bmb", "workflow-builder", SafetyTier::Destructive),
];

/// Workflow identifiers containing one of these are classified destructive.
const DEFAULT_DESTRUCTIVE_TOKENS: &[&str] = &["dev", "implement"];

const SAFE_TOOLS: &[&str] = &["read_file", "grep", "list_dir", "ask_user_question"];

const NEUTRAL_TOOLS: &[&str] = &[
    "read_file",
    "grep",
    "list_dir",
    "write_file",
    "search_replace",
    "ask_user_question",
];

const DESTRUCTIVE_TOOLS: &[&str] = &[
    "read_file",
    "grep",
    "list_dir",
    "write_file",
    "search_replace",
    "bash",
    "ask_user_question",
    "task",
];

/// Tools granted to every workflow skill.
pub const WORKFLOW_SKILL_TOOLS: &[&str] = &[
    "read_file",
    "write_file",
    "search_replace",
    "grep",
    "bash",
    "ask_user_question",
    "list_dir",
];

/// Tools granted to every task skill.
pub const TASK_SKILL_TOOLS: &[&str] = &[
    "read_file",
    "write_file",
    "grep",
    "bash",
    "ask_user_question",
    "list_dir",
];

fn owned(tools: &[&str]) -> Vec<String> {
    tools.iter().map(|t| (*t).to_string()).collect()
}

/// Read-only classification tables.
#[derive(Debug, Clone)]
pub struct SafetyPolicy {
    /// Keys are either `module/name` (scoped) or `name` (any module).
    overrides: BTreeMap<String, SafetyTier>,
    destructive_tokens: Vec<String>,
    tools: BTreeMap<SafetyTier, Vec<String>>,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        let overrides = DEFAULT_OVERRIDES
            .iter()
            .map(|(module, name, tier)| (format!("{module}/{name}"), *tier))
            .collect();
        let mut tools = BTreeMap::new();
        tools.insert(SafetyTier::Safe, owned(SAFE_TOOLS));
        tools.insert(SafetyTier::Neutral, owned(NEUTRAL_TOOLS));
        tools.insert(SafetyTier::Destructive, owned(DESTRUCTIVE_TOOLS));
        tools.insert(SafetyTier::Yolo, owned(DESTRUCTIVE_TOOLS));
        Self {
            overrides,
            destructive_tokens: owned(DEFAULT_DESTRUCTIVE_TOKENS),
            tools,
        }
    }
}

impl SafetyPolicy {
    /// A policy with the default tool table and no persona overrides.
    #[must_use]
    pub fn without_overrides() -> Self {
        Self {
            overrides: BTreeMap::new(),
            ..Self::default()
        }
    }

    /// Merge configuration onto the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Config`] when an override assigns `yolo` or a
    /// tool list is empty. Neither can be produced by the classifier.
    pub fn from_config(cfg: &SafetyConfig) -> Result<Self> {
        let mut policy = Self::default();

        for (key, tier) in &cfg.overrides {
            if *tier == SafetyTier::Yolo {
                return Err(ConvertError::Config {
                    message: format!(
                        "safety override for \"{key}\" is \"yolo\"; that tier is reserved for hand-authored agents"
                    ),
                });
            }
            policy.overrides.insert(key.clone(), *tier);
        }

        if let Some(tokens) = &cfg.destructive_tokens {
            policy.destructive_tokens = tokens.iter().map(|t| t.to_lowercase()).collect();
        }

        for (tier, list) in [
            (SafetyTier::Safe, &cfg.tools.safe),
            (SafetyTier::Neutral, &cfg.tools.neutral),
            (SafetyTier::Destructive, &cfg.tools.destructive),
        ] {
            if let Some(list) = list {
                if list.is_empty() {
                    return Err(ConvertError::Config {
                        message: format!("tool list for tier \"{tier}\" must not be empty"),
                    });
                }
                policy.tools.insert(tier, list.clone());
            }
        }

        Ok(policy)
    }

    fn lookup(&self, module: &str, name: &str) -> Option<SafetyTier> {
        self.overrides
            .get(&format!("{module}/{name}"))
            .or_else(|| self.overrides.get(name))
            .copied()
    }

    /// Classify a persona by its un-prefixed name. Unknown personas are
    /// `neutral`, which still forbids shell execution.
    #[must_use]
    pub fn classify_persona(&self, module: &str, name: &str) -> SafetyTier {
        self.lookup(module, name).unwrap_or(SafetyTier::Neutral)
    }

    /// Classify a workflow by its un-prefixed name.
    ///
    /// The override table wins; otherwise a case-insensitive substring match
    /// on implementation tokens selects `destructive`.
    #[must_use]
    pub fn classify_workflow(&self, module: &str, name: &str) -> SafetyTier {
        if let Some(tier) = self.lookup(module, name) {
            return tier;
        }
        let lower = name.to_lowercase();
        if self
            .destructive_tokens
            .iter()
            .any(|t| lower.contains(t.as_str()))
        {
            SafetyTier::Destructive
        } else {
            SafetyTier::Neutral
        }
    }

    /// Ordered tool list for a tier. Never empty.
    #[must_use]
    pub fn tools_for(&self, tier: SafetyTier) -> &[String] {
        self.tools.get(&tier).map(Vec::as_slice).unwrap_or_default()
    }
}
