use std::path::PathBuf;

use bmad2vibe::config::{default_vibe_home, FileConfig};

pub(crate) fn run(vibe_home: Option<PathBuf>, config: Option<PathBuf>, format: super::Format) {
    // Only the config's vibe_home is used here.
    let configured = match FileConfig::load(config.as_deref()) {
        Ok(cfg) => cfg.vibe_home,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };
    let root = vibe_home.or(configured).unwrap_or_else(default_vibe_home);

    let outcome = bmad2vibe::validate_tree(&root);

    match format {
        super::Format::Text => {
            for d in &outcome.diagnostics {
                let level = if d.is_error() { "error" } else { "warning" };
                eprintln!("{level}[{}]: {d}", d.code);
            }
            eprintln!(
                "{}: {} agents, {} prompts, {} skills; {} errors, {} warnings",
                root.display(),
                outcome.agents,
                outcome.prompts,
                outcome.skills,
                outcome.error_count(),
                outcome.warning_count()
            );
            if outcome.diagnostics.is_empty() {
                eprintln!("ok");
            }
        }
        super::Format::Json => super::print_json(&serde_json::json!({
            "path": root.display().to_string(),
            "agents": outcome.agents,
            "prompts": outcome.prompts,
            "skills": outcome.skills,
            "diagnostics": outcome.diagnostics,
        })),
    }

    if outcome.has_errors() {
        std::process::exit(1);
    }
}
