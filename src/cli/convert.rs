use std::path::PathBuf;

use clap::Args;

use bmad2vibe::acquire::{acquire, SourceLocation, BUNDLES_REPO, METHOD_REPO};
use bmad2vibe::config::{default_vibe_home, split_modules, ConvertOptions, FileConfig, DEFAULT_MODULES};
use bmad2vibe::{ConversionRun, Converter, SafetyPolicy};

#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Target Vibe home [default: ~/.vibe]
    #[arg(long)]
    vibe_home: Option<PathBuf>,
    /// Comma-separated modules to convert [default: bmm,cis,bmgd]
    #[arg(long)]
    modules: Option<String>,
    /// Compute and validate everything without writing
    #[arg(long)]
    dry_run: bool,
    /// Keep the clone directory after the run
    #[arg(long)]
    keep_temp: bool,
    /// Local bmad-bundles checkout instead of cloning
    #[arg(long)]
    bundles_dir: Option<PathBuf>,
    /// Local BMAD-METHOD checkout instead of cloning
    #[arg(long)]
    method_dir: Option<PathBuf>,
    /// Config file [default: $BMAD2VIBE_CONFIG]
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = super::Format::Text)]
    format: super::Format,
}

fn usage_error(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(2);
}

pub(crate) fn run(args: ConvertArgs, verbose: bool) {
    let file_cfg = FileConfig::load(args.config.as_deref()).unwrap_or_else(|e| usage_error(e));

    let modules = match (&args.modules, &file_cfg.modules) {
        (Some(list), _) => split_modules(list),
        (None, Some(list)) => list.clone(),
        (None, None) => DEFAULT_MODULES.iter().map(|m| (*m).to_string()).collect(),
    };
    let vibe_home = args
        .vibe_home
        .clone()
        .or_else(|| file_cfg.vibe_home.clone())
        .unwrap_or_else(default_vibe_home);

    let options = ConvertOptions::new(vibe_home, modules, args.dry_run)
        .unwrap_or_else(|e| usage_error(e));
    let policy = SafetyPolicy::from_config(&file_cfg.safety).unwrap_or_else(|e| usage_error(e));

    let bundles = SourceLocation::local_or(args.bundles_dir.as_deref(), BUNDLES_REPO);
    let method = SourceLocation::local_or(args.method_dir.as_deref(), METHOD_REPO);
    let acquired = match acquire(&bundles, &method, args.keep_temp) {
        Ok(acquired) => acquired,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let result = Converter::new(&options, &policy, &acquired.tree).run();

    match args.format {
        super::Format::Text => print_text(&options, &result, verbose),
        super::Format::Json => super::print_json(&serde_json::json!({
            "vibe_home": options.vibe_home.display().to_string(),
            "modules": options.modules,
            "dry_run": options.preview,
            "report": result.report.summary(),
            "validation": result.validation,
        })),
    }

    if let Some(dir) = acquired.kept_dir() {
        eprintln!("Sources kept at {}", dir.display());
    }

    let code = result.report.exit_code();
    // Clones are removed on drop; exit() would skip it.
    drop(acquired);
    if code != 0 {
        std::process::exit(code);
    }
}

fn print_text(options: &ConvertOptions, result: &ConversionRun, verbose: bool) {
    let summary = result.report.summary();
    let mode = if options.preview { " (dry run)" } else { "" };
    println!(
        "Converted {} into {}{mode}",
        options.modules.join(", "),
        options.vibe_home.display()
    );

    let sections = [
        ("persona agents", &summary.agents),
        ("workflow agents", &summary.workflow_agents),
        ("prompts", &summary.prompts),
        ("skills", &summary.skills),
    ];
    for (label, ids) in sections {
        println!("  {label:<16} {}", ids.len());
        if verbose {
            for id in ids {
                println!("    {id}");
            }
        }
    }

    let v = &result.validation;
    println!(
        "Validation: {} agents, {} prompts, {} skills",
        v.agents, v.prompts, v.skills
    );

    if !summary.warnings.is_empty() {
        eprintln!("\nWarnings ({}):", summary.warnings.len());
        for w in &summary.warnings {
            eprintln!("  - {w}");
        }
    }
    if !summary.errors.is_empty() {
        eprintln!("\nErrors ({}):", summary.errors.len());
        for e in &summary.errors {
            eprintln!("  - {e}");
        }
    } else {
        println!("ok");
    }
}
