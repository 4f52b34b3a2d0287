//! Run configuration: an optional `bmad2vibe.toml` plus command-line options.
//!
//! Resolution order for the file: explicit `--config` path, then the
//! `BMAD2VIBE_CONFIG` environment variable, then none (built-in defaults).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{ConvertError, Result};
use crate::models::SafetyTier;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "BMAD2VIBE_CONFIG";

/// Modules converted when neither the command line nor the file selects any.
pub const DEFAULT_MODULES: &[&str] = &["bmm", "cis", "bmgd"];

/// Root of `bmad2vibe.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Default module selection.
    pub modules: Option<Vec<String>>,
    /// Default target root (otherwise `~/.vibe`).
    pub vibe_home: Option<PathBuf>,
    pub safety: SafetyConfig,
}

/// `[safety]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SafetyConfig {
    /// Extra persona/workflow tiers. Keys are `name` or `module/name`.
    pub overrides: BTreeMap<String, SafetyTier>,
    /// Replaces the workflow heuristic tokens (`dev`, `implement`).
    pub destructive_tokens: Option<Vec<String>>,
    pub tools: ToolsConfig,
}

/// `[safety.tools]` table; each list replaces the built-in one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub safe: Option<Vec<String>>,
    pub neutral: Option<Vec<String>>,
    pub destructive: Option<Vec<String>>,
}

impl FileConfig {
    /// Resolve the config path: explicit path > `BMAD2VIBE_CONFIG` > none.
    #[must_use]
    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(p) = explicit {
            return Some(p.to_path_buf());
        }
        std::env::var(CONFIG_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    /// Load the config file if one is configured, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when a configured file cannot be read or parsed.
    /// Defaults are only used when no file is configured at all.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::resolve_path(explicit) else {
            debug!("no config file configured, using defaults");
            return Ok(Self::default());
        };
        info!(config = %path.display(), "loading configuration");
        let raw = std::fs::read_to_string(&path).map_err(|e| ConvertError::io(&path, e))?;
        Self::parse(&raw).map_err(|e| ConvertError::Config {
            message: format!("failed to parse {}: {e}", path.display()),
        })
    }

    /// Parse config file contents.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed input or unknown keys.
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

/// Options for one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Target root (`agents/`, `prompts/`, `skills/`, `AGENTS.md`).
    pub vibe_home: PathBuf,
    /// Modules to convert, in order.
    pub modules: Vec<String>,
    /// Compute everything but write nothing.
    pub preview: bool,
}

impl ConvertOptions {
    /// Build options, rejecting an empty module selection.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Config`] when `modules` is empty.
    pub fn new(vibe_home: PathBuf, modules: Vec<String>, preview: bool) -> Result<Self> {
        if modules.is_empty() {
            return Err(ConvertError::Config {
                message: "no modules selected".into(),
            });
        }
        Ok(Self {
            vibe_home,
            modules,
            preview,
        })
    }
}

/// Split a comma-separated module list, trimming and dropping empties.
#[must_use]
pub fn split_modules(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// `~/.vibe`, or `./.vibe` when the home directory is unknown.
#[must_use]
pub fn default_vibe_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".vibe")
}
