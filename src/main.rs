//! dlogcover CLI entry point.
//!
//! Parses arguments, loads configuration, runs the orchestrator, and
//! writes the resulting coverage report. Exit codes follow
//! [`dlogcover::errors::AnalysisError::exit_code`].

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dlogcover::compile_commands::CompileCommandsStore;
use dlogcover::config::Config;
use dlogcover::errors::AnalysisError;
use dlogcover::io::output::{CoverageReport, JsonWriter, ReportWriter, TextWriter};
use dlogcover::observability::{
    extract_thread_panic_message, init_tracing, install_panic_hook, set_phase, AnalysisPhase,
};
use dlogcover::orchestrator::Orchestrator;
use std::path::PathBuf;

const MAIN_STACK_SIZE: usize = 16 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "dlogcover", version, about = "Log coverage analysis for C/C++ and Go source trees")]
struct Cli {
    /// Path to a dlogcover config file (YAML or TOML). Overridable via
    /// DLOGCOVER_CONFIG.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a source tree and emit a coverage report.
    Analyze {
        /// Project directory to analyze. Defaults to the config's
        /// project.directory, or the current directory.
        path: Option<PathBuf>,

        /// Output report format: text or json.
        #[arg(short, long)]
        format: Option<String>,

        /// Where to write the report. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate a compile_commands.json via CMake and exit.
    GenerateCompileCommands {
        /// Project directory containing CMakeLists.txt.
        project_dir: PathBuf,

        /// Build directory to generate into.
        build_dir: PathBuf,

        /// Extra arguments forwarded to cmake.
        #[arg(last = true)]
        cmake_args: Vec<String>,
    },
}

fn resolve_config_path(cli_path: &Option<PathBuf>) -> Option<PathBuf> {
    cli_path
        .clone()
        .or_else(|| std::env::var_os("DLOGCOVER_CONFIG").map(PathBuf::from))
}

fn load_config(cli: &Cli) -> Result<Config, AnalysisError> {
    match resolve_config_path(&cli.config) {
        Some(path) => Config::load(&path),
        None => {
            let mut config = Config::default();
            config.apply_flat_aliases();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
    }
}

fn main() -> Result<()> {
    install_panic_hook();

    // Spawn the real work on a thread with a larger stack; deep AST trees
    // from heavily templated C++ can blow past the default 1-2MB main
    // thread stack during recursive traversal.
    std::thread::Builder::new()
        .stack_size(MAIN_STACK_SIZE)
        .spawn(main_inner)?
        .join()
        .map_err(|e| anyhow::anyhow!("Thread panic: {}", extract_thread_panic_message(&e)))?
}

fn main_inner() -> Result<()> {
    let cli = Cli::parse();

    let _phase = set_phase(AnalysisPhase::ConfigLoad);
    let mut config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(e.exit_code());
        }
    };
    drop(_phase);

    init_tracing(&config.output.log_level, config.output.log_file.as_deref());

    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
        } => {
            if let Some(path) = path {
                config.project.directory = path;
            }
            run_analyze(config, format, output)
        }
        Commands::GenerateCompileCommands {
            project_dir,
            build_dir,
            cmake_args,
        } => run_generate_compile_commands(&project_dir, &build_dir, &cmake_args),
    }
}

fn run_analyze(config: Config, format: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let orchestrator = Orchestrator::new(config.clone());
    let run = match orchestrator.run() {
        Ok(run) => run,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    if !run.failures.is_empty() {
        for failure in &run.failures {
            tracing::warn!(
                path = %failure.path.display(),
                operation = failure.operation.as_str(),
                error = %failure.error,
                "analysis failure"
            );
        }
    }
    for line in &run.analyzer_statistics {
        tracing::info!("{}", line);
    }

    let axes = dlogcover::coverage::AxisConfig {
        function: config.analysis.function_coverage,
        branch: config.analysis.branch_coverage,
        exception: config.analysis.exception_coverage,
        key_path: config.analysis.key_path_coverage,
    };
    let report = CoverageReport::build(run.per_file, run.overall, &axes);

    let format = format
        .or_else(|| std::env::var("DLOGCOVER_REPORT_FORMAT").ok())
        .unwrap_or_else(|| "text".to_string());

    let contents = match format.as_str() {
        "json" => JsonWriter
            .write_report(&report, config.output.show_uncovered_paths_details)
            .map_err(|e| anyhow::anyhow!(e))?,
        _ => TextWriter
            .write_report(&report, config.output.show_uncovered_paths_details)
            .map_err(|e| anyhow::anyhow!(e))?,
    };

    let destination = output.or_else(|| config.output.report_file.clone());
    dlogcover::io::output::write_to(destination.as_deref(), &contents)
        .map_err(|e| anyhow::anyhow!(e))?;

    if run.overall_ratio < 1.0 && config.output.show_uncovered_paths_details {
        tracing::debug!(ratio = run.overall_ratio, "coverage below 100%");
    }

    Ok(())
}

fn run_generate_compile_commands(
    project_dir: &std::path::Path,
    build_dir: &std::path::Path,
    cmake_args: &[String],
) -> Result<()> {
    let _store = CompileCommandsStore::generate(project_dir, build_dir, cmake_args)
        .context("generating compile_commands.json")?;
    println!(
        "generated compile_commands.json for {}",
        project_dir.display()
    );
    Ok(())
}
