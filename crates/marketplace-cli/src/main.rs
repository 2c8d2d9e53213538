//! Marketplace CLI.
//!
//! Generates constitutional genome types and runs the marketplace checks.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use tracing_subscriber::{fmt, EnvFilter};

use genome_typegen::validate::{detect_dead_templates, validate_comprehensive};
use genome_typegen::{
    GenerationReport, GeneratorConfig, GeneratorError, ModuleType, TypeGenerator, ValidatorConfig,
};

mod ui;

#[derive(Parser, Debug)]
#[command(name = "marketplace")]
#[command(about = "Marketplace tooling - constitutional types, template and compliance checks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate TypeScript types for every module in the marketplace
    Generate {
        /// Marketplace root, or changed files inside it
        paths: Vec<PathBuf>,

        /// Output directory (default: <root>/types/generated)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail instead of writing when generated files are out of date
        #[arg(long)]
        check: bool,
    },

    /// Report missing and unused blueprint templates
    Templates {
        /// Marketplace root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Also fail on templates no blueprint refers to
        #[arg(long)]
        strict: bool,
    },

    /// Run every marketplace check and track the compliance score
    Validate {
        /// Marketplace root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Contract validation command (default: npm run validate:contracts)
        #[arg(long)]
        contracts_cmd: Option<String>,

        /// Skip the contract validation command
        #[arg(long)]
        skip_contracts: bool,

        /// Compliance manifest (default: <root>/manifest.json)
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// Regenerate types whenever the marketplace changes
    Watch {
        /// Marketplace root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Output directory (default: <root>/types/generated)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Generate {
            paths,
            output,
            check,
        } => {
            let root = resolve_root(&paths);
            let config = generator_config(&root, output);
            if check {
                check_types(config)
            } else {
                generate_types(config)
            }
        }

        Commands::Templates { root, strict } => check_templates(&root, strict),

        Commands::Validate {
            root,
            contracts_cmd,
            skip_contracts,
            manifest,
        } => {
            let mut config = ValidatorConfig::for_marketplace(root);
            if let Some(manifest) = manifest {
                config.manifest_path = manifest;
            }
            if skip_contracts {
                config.contracts_command = None;
            } else if let Some(command) = contracts_cmd {
                config.contracts_command = Some(command.split_whitespace().map(String::from).collect());
            }
            run_validation(&config)
        }

        Commands::Watch { root, output } => {
            let config = generator_config(&root, output);
            run_watch_mode(config).await
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn generator_config(root: &Path, output: Option<PathBuf>) -> GeneratorConfig {
    let config = GeneratorConfig::for_marketplace(root);
    match output {
        Some(out_dir) => config.with_out_dir(out_dir),
        None => config,
    }
}

fn is_marketplace_root(dir: &Path) -> bool {
    ModuleType::ALL
        .iter()
        .any(|t| dir.join(t.dir_name()).is_dir())
}

/// Finds the marketplace root from the `generate` arguments.
///
/// A directory argument is the root as given. File arguments (changed files
/// passed by a pre-commit hook) resolve to the nearest ancestor holding
/// `adapters/`, `connectors/` or `features/`.
fn resolve_root(paths: &[PathBuf]) -> PathBuf {
    let Some(first) = paths.first() else {
        return PathBuf::from(".");
    };
    if !first.is_file() {
        return first.clone();
    }

    for path in paths.iter().filter(|p| p.is_file()) {
        let start = path.parent().unwrap_or(Path::new(""));
        if let Some(root) = start.ancestors().find(|dir| is_marketplace_root(non_empty(dir))) {
            let root = non_empty(root);
            tracing::debug!(root = %root.display(), "inferred marketplace root");
            return root.to_path_buf();
        }
    }

    non_empty(first.parent().unwrap_or(Path::new(""))).to_path_buf()
}

/// `Path::ancestors` of a relative path ends at `""`, which means the
/// current directory.
fn non_empty(dir: &Path) -> &Path {
    if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    }
}

fn generate_types(config: GeneratorConfig) -> miette::Result<()> {
    ui::print_compact_header(env!("CARGO_PKG_VERSION"));
    let start = Instant::now();
    let spinner = ui::spinner("Generating constitutional types...");

    let generator = TypeGenerator::new(config);
    let report = match generator.generate_all_types() {
        Ok(report) => report,
        Err(e) => {
            spinner.finish_and_clear();
            ui::nope_header();
            return Err(e.into());
        }
    };
    spinner.finish_and_clear();

    print_report(&report, generator.config().out_dir.as_path());
    ui::timing("Done", start.elapsed().as_millis());
    println!();
    Ok(())
}

fn print_report(report: &GenerationReport, out_dir: &Path) {
    let max = report.adapters.max(report.connectors).max(report.features);

    ui::box_header("MODULES");
    ui::box_line("");
    ui::box_line(&ui::count_line("adapters", report.adapters, max));
    ui::box_line(&ui::count_line("connectors", report.connectors, max));
    ui::box_line(&ui::count_line("features", report.features, max));
    ui::box_line("");
    ui::box_footer();
    println!();

    ui::success(&format!(
        "{} module(s), {} capabilit{} {} {} file(s) written {} {} unchanged",
        report.modules(),
        report.capabilities,
        if report.capabilities == 1 { "y" } else { "ies" },
        ui::symbols::DOT,
        report.files_written.len(),
        ui::symbols::DOT,
        report.files_unchanged
    ));
    ui::dim(&format!("Output: {}", out_dir.display()));

    if !report.warnings.is_empty() {
        println!();
        for warning in &report.warnings {
            ui::warning(&format!("Skipped {}", warning));
        }
    }
}

fn check_types(config: GeneratorConfig) -> miette::Result<()> {
    let spinner = ui::spinner("Checking generated types...");
    let generator = TypeGenerator::new(config);
    let stale = generator.check();
    spinner.finish_and_clear();

    let stale = stale?;
    if stale.is_empty() {
        ui::looking_good();
        return Ok(());
    }

    ui::nope_header();
    for path in &stale {
        ui::error(&format!("out of date: {}", path.display()));
    }
    println!();
    ui::dim("Run `marketplace generate` to update them.");
    Err(miette::miette!("{} generated file(s) out of date", stale.len()))
}

fn check_templates(root: &Path, strict: bool) -> miette::Result<()> {
    let spinner = ui::spinner("Scanning blueprint templates...");
    let report = detect_dead_templates(root);
    spinner.finish_and_clear();
    let report = report?;

    ui::info(&format!(
        "{} reference(s) {} {} template file(s)",
        report.references,
        ui::symbols::DOT,
        report.templates_on_disk
    ));

    for missing in &report.missing {
        let location = ui::file_link(
            &missing.span.file.display().to_string(),
            missing.span.start_line + 1,
        );
        ui::error(&format!("{} '{}' not found ({})", missing.module, missing.template, location));
    }
    for dead in &report.dead {
        if strict {
            ui::error(&format!("unused: {}", dead.display()));
        } else {
            ui::dim(&format!("unused: {}", dead.display()));
        }
    }

    if !report.missing.is_empty() {
        ui::nope_header();
        return Err(GeneratorError::MissingTemplates {
            count: report.missing.len(),
        }
        .into());
    }
    if !report.is_clean(strict) {
        ui::nope_header();
        return Err(miette::miette!("{} unused template(s)", report.dead.len()));
    }

    ui::looking_good();
    Ok(())
}

fn run_validation(config: &ValidatorConfig) -> miette::Result<()> {
    let spinner = ui::spinner("Validating marketplace...");
    let report = validate_comprehensive(config);
    spinner.finish_and_clear();
    let report = report?;

    for result in &report.results {
        ui::check_line(result.passed, &result.name, &result.message);
        if !result.passed {
            for detail in &result.details {
                ui::dim(&format!("    {}", detail));
            }
        }
    }
    println!();

    let score = format!(
        "Compliance {:.1}% ({}/{} modules)",
        report.score(),
        report.manifest.passing,
        report.manifest.modules
    );
    match report.previous_score {
        Some(previous) if report.regressed() => {
            ui::error(&format!("{} {} down from {:.1}%", score, ui::symbols::DOT, previous))
        }
        Some(previous) => ui::info(&format!("{} {} previously {:.1}%", score, ui::symbols::DOT, previous)),
        None => ui::info(&score),
    }

    if !report.passed() {
        ui::nope_header();
    }
    report.into_result()?;
    ui::looking_good();
    Ok(())
}

/// Watches the marketplace and regenerates on every debounced change.
async fn run_watch_mode(config: GeneratorConfig) -> miette::Result<()> {
    let root = std::fs::canonicalize(&config.marketplace_dir)
        .map_err(|e| GeneratorError::io(&config.marketplace_dir, e.to_string()))?;
    std::fs::create_dir_all(&config.out_dir)
        .map_err(|e| GeneratorError::io(&config.out_dir, e.to_string()))?;
    let out_dir = std::fs::canonicalize(&config.out_dir)
        .map_err(|e| GeneratorError::io(&config.out_dir, e.to_string()))?;

    let generator = TypeGenerator::new(config);
    generate_once(&generator);

    let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);
    let ignored = out_dir.clone();
    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |result: DebounceEventResult| match result {
            Ok(events) => {
                if events.iter().any(|e| !e.path.starts_with(&ignored)) {
                    let _ = tx.try_send(());
                }
            }
            Err(e) => tracing::warn!(error = %e, "watch error"),
        },
    )
    .map_err(|e| miette::miette!("Failed to create file watcher: {}", e))?;

    debouncer
        .watcher()
        .watch(&root, RecursiveMode::Recursive)
        .map_err(|e| miette::miette!("Failed to watch {}: {}", root.display(), e))?;

    println!();
    ui::info(&format!("Watching {}", root.display()));
    ui::dim("Ready! Waiting for changes...");

    loop {
        tokio::select! {
            _ = rx.recv() => {
                println!();
                generate_once(&generator);
                ui::dim("Ready! Waiting for changes...");
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                ui::dim("Stopping watch mode.");
                break;
            }
        }
    }

    Ok(())
}

fn generate_once(generator: &TypeGenerator) {
    let spinner = ui::spinner("Change detected, regenerating...");
    let start = Instant::now();
    match generator.generate_all_types() {
        Ok(report) => {
            spinner.finish_and_clear();
            ui::success(&format!(
                "Generated {} module(s), {} file(s) written in {}ms",
                report.modules(),
                report.files_written.len(),
                start.elapsed().as_millis()
            ));
            for warning in &report.warnings {
                ui::warning(&format!("Skipped {}", warning));
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            ui::error(&format!("{}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_root_from_changed_files() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("adapters/database/drizzle/adapter.json");
        std::fs::create_dir_all(manifest.parent().unwrap()).unwrap();
        std::fs::write(&manifest, "{}").unwrap();

        assert_eq!(resolve_root(&[manifest]), dir.path());
        assert_eq!(resolve_root(&[dir.path().to_path_buf()]), dir.path());
        assert_eq!(resolve_root(&[]), PathBuf::from("."));
    }

    #[test]
    fn test_resolve_root_keeps_nested_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("adapters")).unwrap();
        let nested = dir.path().join("fixtures/empty");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(resolve_root(&[nested.clone()]), nested);
    }

    #[test]
    fn test_relative_ancestors_map_to_current_dir() {
        assert_eq!(non_empty(Path::new("")), Path::new("."));
        assert_eq!(non_empty(Path::new("adapters")), Path::new("adapters"));
    }

    #[test]
    fn test_resolve_root_falls_back_to_argument() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nowhere");
        assert_eq!(resolve_root(&[missing.clone()]), missing);
    }

    #[test]
    fn test_cli_parses_verbosity() {
        let cli = Cli::parse_from(["marketplace", "-vv", "templates", "--strict"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Templates { strict: true, .. }));
    }
}
