//! Parallel suite execution
//!
//! Suites run concurrently, at most `max_concurrent` at a time. Cases and
//! steps inside one suite always run sequentially.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info};

use super::aggregator::Aggregator;
use super::context::RunContext;
use super::progress::ProgressSender;
use super::runner::SuiteRunner;
use crate::models::{TestSuite, Tests};

/// Bounded-parallel suite scheduler
pub struct SuiteScheduler {
    max_concurrent: usize,
}

impl SuiteScheduler {
    /// A cap of zero is treated as one
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Run every suite and return the aggregate once all have finished
    pub async fn run(
        &self,
        ctx: Arc<RunContext>,
        suites: Vec<TestSuite>,
        progress: ProgressSender,
    ) -> Tests {
        info!(
            "Running {} suites (max {} concurrent)",
            suites.len(),
            self.max_concurrent
        );

        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let (tx, rx) = mpsc::unbounded_channel();
        let aggregator = Aggregator::spawn(rx);

        let mut handles = Vec::new();

        for mut suite in suites {
            let semaphore = semaphore.clone();
            let ctx = ctx.clone();
            let progress = progress.clone();
            let tx = tx.clone();

            let handle = tokio::spawn(async move {
                let permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        error!("Cannot schedule {}: {}", suite.name, e);
                        return;
                    }
                };

                debug!("Starting suite {}", suite.name);
                SuiteRunner::new(&ctx, &progress).run_suite(&mut suite).await;
                drop(permit);

                if tx.send(suite).is_err() {
                    error!("Result aggregator stopped before all suites finished");
                }
            });

            handles.push(handle);
        }
        drop(tx);

        for result in join_all(handles).await {
            if let Err(e) = result {
                error!("Suite task failed: {}", e);
            }
        }

        let tests = match aggregator.await {
            Ok(tests) => tests,
            Err(e) => {
                error!("Result aggregator failed: {}", e);
                Tests::default()
            }
        };

        info!(
            "Run completed in {}ms - ok: {}, ko: {}, skipped: {}",
            start.elapsed().as_millis(),
            tests.total_ok,
            tests.total_ko,
            tests.total_skipped
        );

        tests
    }
}
