//! Identifier derivation for every produced artifact.
//!
//! Identifiers are path-derived: the same relative source path always yields
//! the same identifier, sibling directories with equal leaf names never
//! collide, and a renamed directory yields a new identifier.

use std::path::{Component, Path};

/// Prefix shared by every produced identifier.
pub const ID_PREFIX: &str = "bmad";

/// Structural prefixes stripped from each path segment, in order.
const STRUCTURAL_PREFIXES: &[&str] = &["workflow-", "bmad-"];

/// Leaf-name marker for workflow documents that carry their own stem.
const WORKFLOW_MARKER: &str = "workflow-";

/// Join non-empty segments onto `bmad-<module>` with `-`.
///
/// Every segment is split on `-` and empty pieces are dropped, so the result
/// never contains an empty segment or a doubled separator.
#[must_use]
pub fn join_id<'a>(module: &str, segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut id = format!("{ID_PREFIX}-{module}");
    for piece in segments.into_iter().flat_map(|seg| seg.split('-')) {
        if !piece.is_empty() {
            id.push('-');
            id.push_str(piece);
        }
    }
    id
}

/// The `bmad-<module>-` prefix every identifier of `module` starts with.
#[must_use]
pub fn module_prefix(module: &str) -> String {
    format!("{ID_PREFIX}-{module}-")
}

fn strip_structural(segment: &str) -> &str {
    STRUCTURAL_PREFIXES
        .iter()
        .fold(segment, |s, prefix| s.strip_prefix(prefix).unwrap_or(s))
}

/// Derive the skill identifier of a workflow document.
///
/// `rel` is the document's path relative to the module's `workflows/`
/// directory. Directory segments contribute in order after structural-prefix
/// stripping; a `workflow-<stem>.<ext>` leaf contributes its stem.
///
/// Returns `None` when nothing beyond the module prefix can be derived (a bare
/// `workflow.md` at the root of the tree).
#[must_use]
pub fn workflow_skill_id(module: &str, rel: &Path) -> Option<String> {
    let mut segments: Vec<String> = Vec::new();

    if let Some(parent) = rel.parent() {
        for comp in parent.components() {
            if let Component::Normal(os) = comp {
                let seg = os.to_string_lossy();
                let stripped = strip_structural(&seg);
                if !stripped.is_empty() {
                    segments.push(stripped.to_string());
                }
            }
        }
    }

    if let Some(leaf) = rel.file_name().map(|n| n.to_string_lossy()) {
        if let Some(rest) = leaf.strip_prefix(WORKFLOW_MARKER) {
            if let Some((stem, _ext)) = rest.rsplit_once('.') {
                segments.push(stem.to_string());
            }
        }
    }

    let id = join_id(module, segments.iter().map(String::as_str));
    if id.len() > module_prefix(module).len() {
        Some(id)
    } else {
        None
    }
}

/// Identifier of a persona agent and its prompt (`bmad-<module>-<stem>`).
#[must_use]
pub fn persona_id(module: &str, stem: &str) -> String {
    join_id(module, [stem])
}

/// Identifier of a task skill (`bmad-<module>-task-<stem>`).
#[must_use]
pub fn task_skill_id(module: &str, stem: &str) -> String {
    join_id(module, ["task", stem])
}

/// Identifier of a bulk-data container (`bmad-<module>-data`, `-docs`).
#[must_use]
pub fn bulk_container_id(module: &str, sub: &str) -> String {
    join_id(module, [sub])
}

/// Identifier without its `bmad-<module>-` prefix.
#[must_use]
pub fn short_name<'a>(module: &str, id: &'a str) -> &'a str {
    id.strip_prefix(&module_prefix(module)).unwrap_or(id)
}

/// Title-case a kebab identifier (`create-spec` becomes `Create Spec`).
#[must_use]
pub fn to_title(s: &str) -> String {
    s.split(['-', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn wf(module: &str, rel: &str) -> Option<String> {
        workflow_skill_id(module, &PathBuf::from(rel))
    }

    #[test]
    fn leaf_marker_contributes_stem() {
        assert_eq!(
            wf("demo", "planning/workflow-create-spec.md").as_deref(),
            Some("bmad-demo-planning-create-spec")
        );
    }

    #[test]
    fn plain_workflow_leaf_contributes_nothing() {
        assert_eq!(
            wf("bmm", "2-plan-workflows/prd/workflow.md").as_deref(),
            Some("bmad-bmm-2-plan-workflows-prd")
        );
    }

    #[test]
    fn structural_prefixes_are_stripped_per_segment() {
        assert_eq!(
            wf("bmm", "workflow-status/bmad-init/workflow.md").as_deref(),
            Some("bmad-bmm-status-init")
        );
    }

    #[test]
    fn segment_empty_after_stripping_is_dropped() {
        assert_eq!(
            wf("bmm", "workflow-/research/workflow.md").as_deref(),
            Some("bmad-bmm-research")
        );
    }

    #[test]
    fn current_dir_segment_contributes_nothing() {
        assert_eq!(
            wf("cis", "./storytelling/workflow.md").as_deref(),
            Some("bmad-cis-storytelling")
        );
    }

    #[test]
    fn root_workflow_without_marker_has_no_id() {
        assert_eq!(wf("cis", "workflow.md"), None);
    }

    #[test]
    fn root_workflow_with_marker_has_id() {
        assert_eq!(
            wf("cis", "workflow-party-mode.md").as_deref(),
            Some("bmad-cis-party-mode")
        );
    }

    #[test]
    fn siblings_with_same_leaf_do_not_collide() {
        let a = wf("bmm", "a/review/workflow.md");
        let b = wf("bmm", "b/review/workflow.md");
        assert_ne!(a, b);
    }

    #[test]
    fn derivation_is_deterministic() {
        let rel = "3-solutioning/architecture/workflow-design.md";
        assert_eq!(wf("bmm", rel), wf("bmm", rel));
    }

    #[test]
    fn ids_never_contain_doubled_separator() {
        for rel in [
            "workflow-/x/workflow-.md",
            "bmad-/y/workflow-z.md",
            "-lead/workflow.md",
            "a//b/workflow.md",
            "foo--bar/workflow.md",
            "x/workflow-a---b.md",
            "trail-/workflow.md",
        ] {
            if let Some(id) = wf("m", rel) {
                assert!(!id.contains("--"), "{rel} produced {id}");
                assert!(id.starts_with("bmad-m-"), "{rel} produced {id}");
            }
        }
    }

    #[test]
    fn inner_doubled_separator_is_collapsed() {
        assert_eq!(wf("demo", "foo--bar/workflow.md").as_deref(), Some("bmad-demo-foo-bar"));
        assert_eq!(persona_id("demo", "pm--lead"), "bmad-demo-pm-lead");
    }

    #[test]
    fn persona_task_and_bulk_ids() {
        assert_eq!(persona_id("demo", "analyst"), "bmad-demo-analyst");
        assert_eq!(task_skill_id("bmm", "shard-doc"), "bmad-bmm-task-shard-doc");
        assert_eq!(bulk_container_id("bmm", "data"), "bmad-bmm-data");
    }

    #[test]
    fn short_name_strips_module_prefix() {
        assert_eq!(short_name("demo", "bmad-demo-create-spec"), "create-spec");
        assert_eq!(short_name("demo", "other"), "other");
    }

    #[test]
    fn to_title_capitalizes_words() {
        assert_eq!(to_title("planning-create-spec"), "Planning Create Spec");
        assert_eq!(to_title("dev-story"), "Dev Story");
        assert_eq!(to_title(""), "");
    }
}
