//! Run accumulator: what was produced, what went wrong.

use serde::Serialize;

use crate::diagnostics::{Diagnostic, Severity};

/// Appended to by every conversion phase; summarized once at the end.
///
/// Lists keep insertion order and duplicates; [`ConversionReport::summary`]
/// dedups and sorts.
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    agents: Vec<String>,
    workflow_agents: Vec<String>,
    prompts: Vec<String>,
    skills: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
}

/// Deduplicated, sorted view of a [`ConversionReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub agents: Vec<String>,
    pub workflow_agents: Vec<String>,
    pub prompts: Vec<String>,
    pub skills: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

fn sorted_unique(items: &[String]) -> Vec<String> {
    let mut out = items.to_vec();
    out.sort();
    out.dedup();
    out
}

impl ConversionReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_agent(&mut self, id: impl Into<String>) {
        self.agents.push(id.into());
    }

    pub fn add_workflow_agent(&mut self, id: impl Into<String>) {
        self.workflow_agents.push(id.into());
    }

    pub fn add_prompt(&mut self, id: impl Into<String>) {
        self.prompts.push(id.into());
    }

    pub fn add_skill(&mut self, id: impl Into<String>) {
        self.skills.push(id.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Append validator diagnostics. Info diagnostics are dropped.
    pub fn absorb(&mut self, diagnostics: &[Diagnostic]) {
        for d in diagnostics {
            let line = format!("[{}] {d}", d.code);
            match d.severity {
                Severity::Error => self.error(line),
                Severity::Warning => self.warn(line),
                Severity::Info => {}
            }
        }
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            agents: sorted_unique(&self.agents),
            workflow_agents: sorted_unique(&self.workflow_agents),
            prompts: sorted_unique(&self.prompts),
            skills: sorted_unique(&self.skills),
            warnings: sorted_unique(&self.warnings),
            errors: sorted_unique(&self.errors),
        }
    }

    /// 0 iff no errors were recorded. Warnings never affect it.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.errors.is_empty())
    }
}
