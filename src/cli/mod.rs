//! CLI argument parsing
//!
//! Defines command-line interface using clap. Flags left unset keep the
//! value from the config file or environment.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;

/// Declarative test orchestration
#[derive(Parser, Debug)]
#[command(name = "stride")]
#[command(version)]
#[command(about = "Run YAML-defined test suites in parallel and report the results")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run test suites
    Run(RunArgs),

    /// List registered executors
    List(ListArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Suite file, directory or glob pattern
    #[arg(default_value = ".")]
    pub path: String,

    /// Alias as name:value, repeatable
    #[arg(short, long = "alias", value_name = "NAME:VALUE")]
    pub aliases: Vec<String>,

    /// Report format (xml, json, yaml)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Number of suites run in parallel
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log: Option<String>,

    /// Directory the report file is written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output detail (low, medium, high)
    #[arg(short, long)]
    pub details: Option<String>,

    /// Print the run summary
    #[arg(long)]
    pub resume: Option<bool>,

    /// List failed suites in the run summary
    #[arg(long)]
    pub resume_failures: Option<bool>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Timeout for a single step, in seconds
    #[arg(long, value_name = "SECS")]
    pub step_timeout: Option<u64>,

    /// Timeout for a whole suite, in seconds
    #[arg(long, value_name = "SECS")]
    pub suite_timeout: Option<u64>,
}

impl RunArgs {
    /// Override `config` with the flags given on the command line
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(format) = &self.format {
            config.format = format.clone();
        }
        if let Some(parallel) = self.parallel {
            config.parallel = parallel;
        }
        if let Some(level) = &self.log {
            config.log_level = level.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(details) = &self.details {
            config.details = details.clone();
        }
        if let Some(resume) = self.resume {
            config.resume = resume;
        }
        if let Some(resume_failures) = self.resume_failures {
            config.resume_failures = resume_failures;
        }
        if let Some(secs) = self.step_timeout {
            config.step_timeout_secs = Some(secs);
        }
        if let Some(secs) = self.suite_timeout {
            config.suite_timeout_secs = Some(secs);
        }
        config.aliases.extend(self.aliases.iter().cloned());
    }
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show default assertions of each executor
    #[arg(short, long)]
    pub detailed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["stride", "list", "--detailed"]);
        match args.command {
            Command::List(list_args) => {
                assert!(list_args.detailed);
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_run_defaults() {
        let args = Args::parse_from(["stride", "run"]);
        match args.command {
            Command::Run(run_args) => {
                assert_eq!(run_args.path, ".");
                assert!(run_args.aliases.is_empty());
                assert!(run_args.parallel.is_none());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_args() {
        let args = Args::parse_from([
            "stride",
            "run",
            "suites/*.yml",
            "--alias",
            "up:echo up",
            "-a",
            "down:echo down",
            "--parallel",
            "4",
            "--format",
            "json",
            "--resume",
            "false",
            "--step-timeout",
            "5",
        ]);
        match args.command {
            Command::Run(run_args) => {
                assert_eq!(run_args.path, "suites/*.yml");
                assert_eq!(run_args.aliases, vec!["up:echo up", "down:echo down"]);
                assert_eq!(run_args.parallel, Some(4));
                assert_eq!(run_args.resume, Some(false));
                assert_eq!(run_args.step_timeout, Some(5));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_apply_to_overrides_config() {
        let mut config = AppConfig {
            parallel: 2,
            aliases: vec!["a:from file".to_string()],
            ..Default::default()
        };
        let args = Args::parse_from(["stride", "run", "--details", "high", "-a", "b:cli"]);
        let Command::Run(run_args) = args.command else {
            panic!("Expected Run command");
        };
        run_args.apply_to(&mut config);

        assert_eq!(config.parallel, 2);
        assert_eq!(config.details, "high");
        assert_eq!(config.aliases, vec!["a:from file", "b:cli"]);
    }
}
