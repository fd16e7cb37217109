//! firstmate - Main entry point
//!
//! Parses the command line, loads settings, runs one install or update
//! against one host and maps the outcome to the process exit status.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use firstmate::cli::{Cli, Commands, ExitStatus, RunArgs};
use firstmate::{
    FirstmateError, JobTracker, Operation, ProgressPrinter, Registry, RunResult, Settings,
    StepExecutor,
};

/// Initialize tracing. `RUST_LOG` wins over `--verbose`. Logs go to stderr
/// so progress lines on stdout stay clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    Ok(settings)
}

fn list_applications(registry: &Registry) -> ExitStatus {
    for name in registry.names() {
        match registry.create(name) {
            Ok(component) => println!("{:<14} {}", name, component.description()),
            Err(_) => println!("{}", name),
        }
    }
    ExitStatus::Success
}

fn validate_settings(path: &Path) -> ExitStatus {
    info!("Validating settings file: {}", path.display());
    match Settings::load_from_file(path).and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => {
            println!("✓ Settings file is valid: {:?}", settings);
            ExitStatus::Success
        }
        Err(e) => {
            eprintln!("✗ Settings file is invalid: {}", e);
            ExitStatus::Usage
        }
    }
}

fn init_settings(path: &Path) -> Result<ExitStatus> {
    Settings::default()
        .save_to_file(path)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;
    println!("Wrote default settings to {}", path.display());
    Ok(ExitStatus::Success)
}

fn run_operation(
    operation: Operation,
    args: &RunArgs,
    settings_path: Option<&Path>,
    registry: &Registry,
) -> Result<ExitStatus> {
    let missing = args.missing_required();
    if !missing.is_empty() {
        eprintln!("Missing required flags: {}", missing.join(", "));
        return Ok(ExitStatus::MissingFlags);
    }

    let factory = match registry.lookup(args.app_name()).map_err(FirstmateError::from) {
        Ok(factory) => factory,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Available: {}", registry.names().collect::<Vec<_>>().join(", "));
            return Ok(ExitStatus::UnknownApplication);
        }
    };
    let component = factory();

    if component.requires_secondary(operation) {
        let missing = args.missing_secondary();
        if !missing.is_empty() {
            eprintln!(
                "{} {} needs secondary credentials; missing flags: {}",
                component.name(),
                operation,
                missing.join(", ")
            );
            return Ok(ExitStatus::MissingFlags);
        }
    }

    let mut settings = load_settings(settings_path)?;
    args.apply_to(&mut settings);
    settings.validate().context("Invalid settings")?;
    debug!("Effective settings: {:?}", settings);

    let target = args.target();
    target.validate()?;

    let tracker = JobTracker::new();
    let executor = StepExecutor::with_config(
        settings.connector(),
        tracker.clone(),
        settings.executor_config(),
    );

    let printer = ProgressPrinter::stdout(tracker);
    let result = component.execute(operation, &executor, &target);
    if let Err(e) = printer.finish() {
        warn!("Progress output failed: {}", e);
    }

    let status = match &result {
        RunResult::Succeeded { .. } => ExitStatus::Success,
        RunResult::ConnectionFailed { reason } => {
            let err = FirstmateError::run_failed(
                component.name(),
                operation.title(),
                FirstmateError::from(reason.clone()).to_string(),
            );
            error!("{}", err);
            eprintln!("{}", err);
            ExitStatus::RunFailed
        }
        RunResult::PartialFailure { failures, .. } => {
            for failure in failures {
                warn!("step {} ({}) failed: {}", failure.index + 1, failure.label, failure.error);
            }
            if settings.fails_on_step_error() {
                let err =
                    FirstmateError::run_failed(component.name(), operation.title(), result.summary());
                error!("{}", err);
                eprintln!("{}", err);
                ExitStatus::RunFailed
            } else {
                ExitStatus::Success
            }
        }
    };
    Ok(status)
}

fn run(cli: &Cli) -> Result<ExitStatus> {
    let registry = Registry::builtin();
    match &cli.command {
        Commands::List => Ok(list_applications(&registry)),
        Commands::Validate { path } => Ok(validate_settings(path)),
        Commands::Init { path } => init_settings(path),
        Commands::Install(args) => {
            run_operation(Operation::Install, args, cli.config.as_deref(), &registry)
        }
        Commands::Update(args) => {
            run_operation(Operation::Update, args, cli.config.as_deref(), &registry)
        }
    }
}

fn main() -> ExitCode {
    // .env never overrides variables already set in the environment
    let dotenv = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitStatus::Usage.into()
            } else {
                ExitStatus::Success.into()
            };
        }
    };

    init_tracing(cli.verbose);
    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Failed to load .env: {}", e),
    }

    match run(&cli) {
        Ok(status) => status.into(),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitStatus::Usage.into()
        }
    }
}
