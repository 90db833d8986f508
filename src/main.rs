//! Stride - declarative test orchestration
//!
//! Runs test suites described in YAML files. Each suite holds test cases,
//! each case an ordered list of steps. A step is performed by a named
//! executor (`exec` runs a shell script, `http` sends a request) and its
//! result is checked against assertions.
//!
//! ## Usage
//!
//! ```bash
//! # Run every suite in the current directory
//! stride run
//!
//! # Run matching suites, four at a time, and write a JUnit report
//! stride run 'suites/*.yml' --parallel 4 --output-dir reports
//!
//! # Substitute a word in exec scripts
//! stride run suites --alias 'api:curl -s http://localhost:8080'
//!
//! # List executors
//! stride list --detailed
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, info};

mod assertions;
mod cli;
mod config;
mod engine;
mod executors;
mod http;
mod models;
mod output;
mod utils;

use cli::Args;
use config::{AppConfig, ConfigFile, EnvConfig};
use engine::{DetailLevel, Engine, SetupError};
use output::{ReportFormat, ResultFormatter};
use utils::{init_logger, LogLevel, Timer};

/// Exit status of a run with failing tests
const EXIT_TESTS_FAILED: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    match args.command {
        cli::Command::Run(run_args) => run(run_args).await,
        cli::Command::List(list_args) => {
            init_logger(LogLevel::Warn);
            list_executors(list_args);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Layer defaults, config file, environment and flags
fn load_config(args: &cli::RunArgs) -> Result<AppConfig> {
    let env = EnvConfig::load();
    let explicit = args.config.as_deref().or(env.config_file.as_deref());

    let mut config = ConfigFile::resolve(explicit)?.app;
    env.apply(&mut config);
    args.apply_to(&mut config);
    Ok(config)
}

async fn run(args: cli::RunArgs) -> Result<ExitCode> {
    let config = load_config(&args)?;

    init_logger(LogLevel::from_str(&config.log_level).unwrap_or(LogLevel::Warn));
    debug!("Configuration: {:?}", config);

    let format = ReportFormat::from_str(&config.format)
        .ok_or_else(|| SetupError::InvalidFormat(config.format.clone()))?;
    let detail: DetailLevel = config.details.parse()?;

    let engine = Engine::default()
        .with_default_executor(&config.default_executor)
        .with_step_timeout(config.step_timeout())
        .with_suite_timeout(config.suite_timeout())
        .with_load_parallelism(config.load_parallelism);

    info!("Running suites from {}", args.path);
    let timer = Timer::start("run");
    let tests = engine
        .process(&args.path, &config.aliases, config.parallel, &config.details)
        .await?;
    let elapsed = timer.stop();

    let formatter = ResultFormatter::new(format);

    if detail == DetailLevel::High {
        println!("{}", formatter.format_report(&tests)?);
    }

    if let Some(dir) = &config.output_dir {
        let path = output::write_report(dir, &tests, format)
            .with_context(|| format!("Cannot write report to {}", dir.display()))?;
        println!("Report written to {}", path.display());
    }

    if config.resume {
        println!(
            "{}",
            formatter.format_summary(&tests, elapsed, config.resume_failures)
        );
    }

    if tests.total_ko > 0 {
        Ok(ExitCode::from(EXIT_TESTS_FAILED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn list_executors(args: cli::ListArgs) {
    let engine = Engine::default();
    let registry = engine.registry();

    if registry.is_empty() {
        println!("No executors registered");
        return;
    }

    println!("\nRegistered executors ({} total)\n", registry.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for name in registry.names() {
        println!("  {name}");
        if !args.detailed {
            continue;
        }
        if let Ok(executor) = registry.resolve(name) {
            for assertion in executor.default_assertions() {
                println!("      default: {assertion}");
            }
        }
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}
