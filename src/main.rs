//! Stack composer CLI entrypoint.
//!
//! This is the main entrypoint for the stack-composer command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use stack_composer::cli::{Cli, Commands, OutputFormatter};
use stack_composer::composer::{CompositionResult, StackComposer};
use stack_composer::config::{find_context_file, ContextLoader, DefaultTable, RawConfig};
use stack_composer::engine::ManifestEngine;
use stack_composer::error::Result;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    // Environment variables feed clap's `env` defaults
    if let Err(e) = ContextLoader::new().load_dotenv() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();

    init_logging(cli.verbose);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(option) = e.option() {
                eprintln!("  option: {option}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);
    let result = compose(&cli)?;

    match cli.command {
        Commands::Validate { warnings } => emit(&formatter.format_validation(&result, warnings)),
        Commands::Plan => emit(&formatter.format_plan(&result)),
        Commands::Graph { unit } => {
            let focus = unit.as_deref().map(|id| result.unit_by_id(id)).transpose()?;
            emit(&formatter.format_graph(&result, focus))
        }
        Commands::Export { out } => cmd_export(&result, &out, &formatter).await,
    }
}

/// Hands the composition to the manifest engine and writes the manifest.
async fn cmd_export(result: &CompositionResult, out: &Path, formatter: &OutputFormatter) -> Result<()> {
    let mut engine = ManifestEngine::for_composition(result);
    let summary = result.apply(&mut engine).await?;
    debug!(
        "Manifest engine accepted {} units and {} dependencies",
        summary.units_registered, summary.dependencies_declared
    );

    let manifest = engine.into_manifest();
    manifest.write_to(out).await?;
    emit(&formatter.format_export(&manifest, out))
}

/// Loads the selected context block and defaults, then composes.
fn compose(cli: &Cli) -> Result<CompositionResult> {
    let context_file = resolve_context_path(cli.context_file.as_ref())?;
    let loader = ContextLoader::new();

    let raw: RawConfig = loader.load_context(&context_file, cli.context_id.as_deref().unwrap_or_default())?;
    let defaults: DefaultTable = match &cli.defaults {
        Some(path) => loader.load_defaults(path)?,
        None => ContextLoader::builtin_defaults()?,
    };

    info!("Composing context '{}' from {}", cli.context_id.as_deref().unwrap_or_default(), context_file.display());
    StackComposer::new(cli.compose_context()).compose(&defaults, &raw)
}

/// Resolves the context file path.
fn resolve_context_path(context_file: Option<&PathBuf>) -> Result<PathBuf> {
    context_file.map_or_else(|| find_context_file("."), |path| Ok(path.clone()))
}

/// Writes command output to stdout.
fn emit(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}
