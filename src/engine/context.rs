//! Run context
//!
//! Everything a run shares between its tasks: executor bindings, aliases,
//! the assertion evaluator and run options. Built once before any suite
//! starts and only read afterwards.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::error::SetupError;
use crate::assertions::{AssertionEvaluator, DefaultEvaluator};
use crate::executors::ExecutorRegistry;

/// Executor used for steps that do not name one
pub const DEFAULT_EXECUTOR: &str = "exec";

/// How much progress and report output a run produces
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetailLevel {
    /// Summary results only
    Low,
    /// Progress and summary
    #[default]
    Medium,
    /// Progress, per-step detail and the full report
    High,
}

impl FromStr for DetailLevel {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(DetailLevel::Low),
            "medium" => Ok(DetailLevel::Medium),
            "high" => Ok(DetailLevel::High),
            _ => Err(SetupError::InvalidDetailLevel(s.to_string())),
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailLevel::Low => write!(f, "low"),
            DetailLevel::Medium => write!(f, "medium"),
            DetailLevel::High => write!(f, "high"),
        }
    }
}

/// Name substitutions available to executors
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    /// Parse `name:value` entries. Entries without a colon are ignored; the
    /// value keeps any further colons.
    pub fn parse(entries: &[String]) -> Self {
        let aliases = entries
            .iter()
            .filter_map(|entry| entry.split_once(':'))
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Self { aliases }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Replace every space-separated word that names an alias by its value
    pub fn expand(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }

        text.split('\n')
            .map(|line| {
                line.split(' ')
                    .map(|word| self.get(word).unwrap_or(word))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Tunables of a single run
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Maximum number of suites executing at once, at least 1
    pub parallel: usize,
    pub default_executor: String,
    /// Deadline for a single step
    pub step_timeout: Option<Duration>,
    /// Deadline for a whole suite, counted from when it starts executing
    pub suite_timeout: Option<Duration>,
    /// Maximum number of suite files read at once, unbounded when `None`
    pub load_parallelism: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            parallel: 1,
            default_executor: DEFAULT_EXECUTOR.to_string(),
            step_timeout: None,
            suite_timeout: None,
            load_parallelism: None,
        }
    }
}

/// Shared, read-only state of one run
#[derive(Clone)]
pub struct RunContext {
    pub registry: ExecutorRegistry,
    pub aliases: AliasTable,
    pub evaluator: Arc<dyn AssertionEvaluator>,
    pub options: RunOptions,
}

impl RunContext {
    pub fn new(registry: ExecutorRegistry) -> Self {
        Self {
            registry,
            aliases: AliasTable::default(),
            evaluator: Arc::new(DefaultEvaluator),
            options: RunOptions::default(),
        }
    }

    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn AssertionEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("registry", &self.registry)
            .field("aliases", &self.aliases)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
