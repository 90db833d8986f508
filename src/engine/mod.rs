//! Test orchestration engine
//!
//! Loads suite files, runs them under a parallelism cap and aggregates the
//! results. [`Engine::process`] is the entry point of a run.

pub mod aggregator;
pub mod context;
pub mod error;
pub mod loader;
pub mod parallel;
pub mod progress;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{AliasTable, DetailLevel, RunContext, RunOptions, DEFAULT_EXECUTOR};
pub use error::SetupError;
pub use parallel::SuiteScheduler;
pub use progress::ProgressReporter;

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::assertions::{AssertionEvaluator, DefaultEvaluator};
use crate::executors::ExecutorRegistry;
use crate::models::Tests;

/// Configured engine, reusable across runs
pub struct Engine {
    registry: ExecutorRegistry,
    evaluator: Arc<dyn AssertionEvaluator>,
    default_executor: String,
    step_timeout: Option<Duration>,
    suite_timeout: Option<Duration>,
    load_parallelism: Option<usize>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(ExecutorRegistry::builtin())
    }
}

impl Engine {
    pub fn new(registry: ExecutorRegistry) -> Self {
        Self {
            registry,
            evaluator: Arc::new(DefaultEvaluator),
            default_executor: DEFAULT_EXECUTOR.to_string(),
            step_timeout: None,
            suite_timeout: None,
            load_parallelism: None,
        }
    }

    pub fn with_default_executor(mut self, name: impl Into<String>) -> Self {
        self.default_executor = name.into();
        self
    }

    pub fn with_step_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.step_timeout = timeout;
        self
    }

    pub fn with_suite_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.suite_timeout = timeout;
        self
    }

    pub fn with_load_parallelism(mut self, limit: Option<usize>) -> Self {
        self.load_parallelism = limit;
        self
    }

    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }

    /// Run every suite found at `path`.
    ///
    /// Fails only when the run cannot start: an invalid path pattern or an
    /// unknown detail level. Suite files that do not load are left out, and
    /// everything that goes wrong inside a suite is recorded in the result.
    pub async fn process(
        &self,
        path: &str,
        aliases: &[String],
        parallel: usize,
        details: &str,
    ) -> Result<Tests, SetupError> {
        let detail: DetailLevel = details.parse()?;
        let aliases = AliasTable::parse(aliases);
        let files = loader::discover(path)?;

        if files.is_empty() {
            warn!("No suite files found at {}", path);
        }
        info!("Found {} suite files, {} aliases", files.len(), aliases.len());

        let options = RunOptions {
            parallel: parallel.max(1),
            default_executor: self.default_executor.clone(),
            step_timeout: self.step_timeout,
            suite_timeout: self.suite_timeout,
            load_parallelism: self.load_parallelism,
        };
        let ctx = Arc::new(
            RunContext::new(self.registry.clone())
                .with_aliases(aliases)
                .with_evaluator(self.evaluator.clone())
                .with_options(options),
        );

        let (progress, reporter) = ProgressReporter::spawn(detail);

        let suites = loader::load_all(files, ctx.options.load_parallelism, &progress).await;
        let tests = SuiteScheduler::new(ctx.options.parallel)
            .run(ctx, suites, progress)
            .await;

        if let Err(e) = reporter.await {
            warn!("Progress reporter failed: {}", e);
        }

        Ok(tests)
    }
}
