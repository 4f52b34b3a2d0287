//! Structured diagnostics produced by the consistency validator.
//!
//! Each diagnostic carries a stable code, a severity, the artifact it concerns
//! and an optional fix suggestion. Errors fail the run; warnings and info
//! messages are advisory.

use std::fmt;

use serde::Serialize;

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A broken invariant that causes a non-zero exit.
    Error,
    /// A suspicious artifact that does not cause failure.
    Warning,
    /// An informational note.
    Info,
}

/// A structured diagnostic message from consistency validation.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Stable code (e.g., `"V001"`).
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Artifact the diagnostic is about (e.g., `"bmad-bmm-pm.toml"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    /// Suggested fix (actionable text).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with the given severity, code, and message.
    #[must_use]
    pub fn new(severity: Severity, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            artifact: None,
            suggestion: None,
        }
    }

    /// Shorthand for an error diagnostic.
    #[must_use]
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Shorthand for a warning diagnostic.
    #[must_use]
    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Set the artifact this diagnostic concerns.
    #[must_use]
    pub fn with_artifact(mut self, artifact: impl Into<String>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }

    /// Set a suggested fix for this diagnostic.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Returns `true` if this diagnostic is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Returns `true` if this diagnostic is a warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// Display format is `"<artifact>: <message>"` when an artifact is set.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.artifact {
            Some(artifact) => write!(f, "{artifact}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

// ── Diagnostic codes ────────────────────────────────────────────────────

/// Infrastructure error (directory unreadable, file unreadable).
pub const V000: &str = "V000";

// Agent record checks (V001–V005)

/// Agent record is not valid TOML.
pub const V001: &str = "V001";
/// Agent record is missing a mandatory field.
pub const V002: &str = "V002";
/// Agent record has a safety value outside the accepted tiers.
pub const V003: &str = "V003";
/// Agent record is missing `system_prompt_id`.
pub const V004: &str = "V004";
/// `system_prompt_id` does not resolve to a prompt document.
pub const V005: &str = "V005";

// Prompt checks (V006–V007)

/// Prompt document is suspiciously small.
pub const V006: &str = "V006";
/// Prompt document has no matching agent record.
pub const V007: &str = "V007";

// Skill checks (V008)

/// Skill container has no SKILL.md.
pub const V008: &str = "V008";

// Shortcut checks (V009–V010)

/// Shortcut prompt references a skill that does not exist.
pub const V009: &str = "V009";
/// Shortcut prompt carries no skill reference.
pub const V010: &str = "V010";
