//! `schemagen` command-line interface.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use schemagen_core::{GenerationConfig, generate_all, generate_ir, generate_target};

#[derive(Parser)]
#[command(
    name = "schemagen",
    version,
    about = "Generate pydantic, dataclass, and GraphQL artifacts from TypeScript schemas"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract schema definitions into the IR document
    Extract(CommonArgs),
    /// Emit one target's artifact from the IR document
    Emit(EmitArgs),
    /// Run extraction and every emitter
    All(CommonArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// JSON config file; defaults apply when omitted
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Directory scanned for .ts sources
    #[arg(long, value_name = "DIR")]
    source_root: Option<PathBuf>,
    /// Directory receiving the IR document and artifacts
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct EmitArgs {
    /// Target language: pydantic, dataclass, or graphql
    target: String,
    #[command(flatten)]
    common: CommonArgs,
}

fn load_config(args: &CommonArgs) -> Result<GenerationConfig, schemagen_core::GenError> {
    let mut config = GenerationConfig::load(args.config.as_deref())?;
    if let Some(source_root) = &args.source_root {
        config.source_root.clone_from(source_root);
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir.clone_from(output_dir);
    }
    tracing::debug!(
        source_root = %config.source_root.display(),
        output_dir = %config.output_dir.display(),
        "Resolved generation config."
    );
    Ok(config)
}

fn run_extract(args: &CommonArgs) -> i32 {
    match load_config(args).and_then(|config| generate_ir(&config)) {
        Ok(path) => {
            println!("extracted -> {}", path.display());
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn run_emit(args: &EmitArgs) -> i32 {
    match load_config(&args.common).and_then(|config| generate_target(&config, &args.target)) {
        Ok(path) => {
            println!("emitted {} -> {}", args.target, path.display());
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn run_all(args: &CommonArgs) -> i32 {
    match load_config(args).and_then(|config| generate_all(&config)) {
        Ok(paths) => {
            println!("generated {} files", paths.len());
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

// SCHEMAGEN_LOG controls log level: "trace", "debug", "info", "warn", "error"
// or a full tracing filter spec like "schemagen_core=debug".
fn init_tracing() {
    let filter = match std::env::var("SCHEMAGEN_LOG") {
        Ok(level) if is_plain_level(&level) => {
            format!("schemagen={level},schemagen_core={level}")
        }
        Ok(spec) => spec,
        Err(_) => "schemagen=info,schemagen_core=info".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let code = match &cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Emit(args) => run_emit(args),
        Commands::All(args) => run_all(args),
    };
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
