pub mod acquire;
pub mod config;
pub mod consistency;
pub mod convert;
pub mod diagnostics;
pub mod errors;
pub(crate) mod fs_util;
pub mod metadata;
pub mod models;
pub mod render;
pub mod report;
pub mod safety;
pub mod slug;
pub mod source;
pub mod store;

// Re-export key types at crate root for convenience.
pub use acquire::{acquire, AcquiredSources, SourceLocation};
pub use config::{ConvertOptions, FileConfig};
pub use consistency::{validate_artifacts, validate_tree, ArtifactIndex, ValidationOutcome};
pub use convert::{ConversionRun, Converter};
pub use diagnostics::{Diagnostic, Severity};
pub use errors::{ConvertError, Result};
pub use models::{AgentMeta, AgentRecord, SafetyTier, SourceItem, SourceKind};
pub use report::{ConversionReport, ReportSummary};
pub use safety::SafetyPolicy;
pub use source::SourceTree;
pub use store::{ArtifactStore, StoreMode};
