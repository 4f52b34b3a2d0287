use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod convert;
mod validate;

#[derive(Parser)]
#[command(
    name = "bmad2vibe",
    version,
    about = "Convert BMAD Method agents, workflows and tasks into Mistral Vibe artifacts"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Show project information
    #[arg(long)]
    about: bool,

    /// Log progress at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Format {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON object
    Json,
}

#[derive(Subcommand)]
#[command(next_display_order = None)]
enum Commands {
    /// Convert BMAD sources into Vibe agents, prompts and skills
    Convert(convert::ConvertArgs),
    /// Check an existing Vibe home for consistency
    Validate {
        /// Vibe home to check [default: ~/.vibe]
        #[arg(long)]
        vibe_home: Option<PathBuf>,
        /// Config file [default: $BMAD2VIBE_CONFIG]
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

pub fn run(cli: Cli) {
    if cli.about {
        print_about();
        return;
    }

    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Convert(args)) => convert::run(args, cli.verbose),
        Some(Commands::Validate {
            vibe_home,
            config,
            format,
        }) => validate::run(vibe_home, config, format),
        None => {
            eprintln!("Usage: bmad2vibe <command> [args]");
            eprintln!("Run `bmad2vibe --help` for details.");
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so `--format json` output stays parseable.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("error: cannot serialize output: {e}");
            std::process::exit(1);
        }
    }
}

fn print_about() {
    println!(
        "bmad2vibe: BMAD Method to Mistral Vibe converter\n\
         ├─ version:    {}\n\
         ├─ author:     {}\n\
         ├─ source:     {}\n\
         └─ licence:    {} https://www.apache.org/licenses/LICENSE-2.0",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS"),
        env!("CARGO_PKG_REPOSITORY"),
        env!("CARGO_PKG_LICENSE"),
    );
}
