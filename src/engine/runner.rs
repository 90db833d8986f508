//! Suite execution runner
//!
//! Runs the cases of one suite in order, and the steps of each case in
//! order. A case stops at its first failing step: only that step's errors or
//! failures are recorded and the remaining steps never run.

use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn, Instrument};

use super::context::RunContext;
use super::progress::ProgressSender;
use crate::executors::{ExecutorError, ResultDocument, StepContext};
use crate::models::{CaseStatus, Failure, TestCase, TestSuite};
use crate::utils::Timer;

/// Error type for executor resolution problems, recorded as case errors
pub const RESOLUTION_ERROR: &str = "resolution";
/// Failure type for errors returned by an executor run
pub const EXECUTOR_FAILURE: &str = "executor";
/// Failure type for step and suite deadlines
pub const TIMEOUT_FAILURE: &str = "timeout";
/// Failure type for steps whose reserved fields are malformed
pub const SCHEMA_FAILURE: &str = "schema";

/// Runs suites against a shared run context
pub struct SuiteRunner<'a> {
    ctx: &'a RunContext,
    progress: &'a ProgressSender,
}

impl<'a> SuiteRunner<'a> {
    pub fn new(ctx: &'a RunContext, progress: &'a ProgressSender) -> Self {
        Self { ctx, progress }
    }

    /// Run every case of `suite` and roll the outcomes into its counters
    pub async fn run_suite(&self, suite: &mut TestSuite) {
        let timer = Timer::start(&suite.name);
        let deadline = self.ctx.options.suite_timeout.map(|t| Instant::now() + t);

        suite.timestamp = timer.timestamp();
        suite.hostname = std::env::var("HOSTNAME").unwrap_or_default();
        suite.failures = 0;
        suite.errors = 0;

        info!("Running suite {}", suite.name);

        for case in &mut suite.test_cases {
            if !case.is_skipped() {
                let span = info_span!("case", suite = %suite.name, case = %case.name);
                self.run_case(&suite.name, &suite.package, case, deadline)
                    .instrument(span)
                    .await;
            }
            case.settle();

            suite.failures += case.failures.len();
            suite.errors += case.errors.len();
        }
        suite.count_skipped();

        suite.time = timer.elapsed_secs_str();
        let elapsed = timer.stop();

        info!(
            "Suite {} finished in {}ms - failures: {}, errors: {}, skipped: {}",
            suite.name,
            elapsed.as_millis(),
            suite.failures,
            suite.errors,
            suite.skipped
        );

        self.progress
            .suite_done(&suite.package, suite.is_success(), elapsed);
    }

    /// Run the steps of one case until the first failing step
    pub async fn run_case(
        &self,
        suite_name: &str,
        package: &str,
        case: &mut TestCase,
        deadline: Option<Instant>,
    ) {
        let timer = Timer::start(&case.name);
        case.status = CaseStatus::Running;
        info!("start");

        for (index, step) in case.steps.iter().enumerate() {
            let budget = step_budget(self.ctx.options.step_timeout, deadline);
            if budget == Some(Duration::ZERO) {
                case.failures.push(
                    Failure::new("suite deadline exceeded before step could start")
                        .with_kind(TIMEOUT_FAILURE),
                );
                break;
            }

            let executor_name = match step.executor_name() {
                Ok(name) => name.unwrap_or(self.ctx.options.default_executor.as_str()),
                Err(e) => {
                    case.errors
                        .push(Failure::new(e.to_string()).with_kind(SCHEMA_FAILURE));
                    break;
                }
            };

            let executor = match self.ctx.registry.resolve(executor_name) {
                Ok(executor) => executor,
                Err(e) => {
                    warn!("Step {}: {}", index, e);
                    case.errors
                        .push(Failure::new(e.to_string()).with_kind(RESOLUTION_ERROR));
                    break;
                }
            };

            let step_ctx = StepContext::new(suite_name, &case.name, index).with_timeout(budget);
            let run = executor.run(&step_ctx, &self.ctx.aliases, step);
            let outcome = match budget {
                Some(limit) => tokio::time::timeout(limit, run)
                    .await
                    .unwrap_or(Err(ExecutorError::Timeout(limit))),
                None => run.await,
            };

            let result = match outcome {
                Ok(result) => result,
                Err(ExecutorError::Timeout(limit)) => {
                    case.failures.push(
                        Failure::new(format!("step {index} timed out after {limit:?}"))
                            .with_kind(TIMEOUT_FAILURE),
                    );
                    self.progress.step_done(package);
                    break;
                }
                Err(e) => {
                    debug!("Step {} executor error: {}", index, e);
                    case.failures
                        .push(Failure::new(e.to_string()).with_kind(EXECUTOR_FAILURE));
                    ResultDocument::new()
                }
            };

            debug!("result: {:?}", result);
            case.systemout.append(output_of(&result, "systemout"));
            case.systemerr.append(output_of(&result, "systemerr"));

            match step.assertions() {
                Ok(declared) => {
                    let failures = self.ctx.evaluator.evaluate(
                        &result,
                        &declared,
                        &executor.default_assertions(),
                    );
                    case.failures.extend(failures);
                }
                Err(e) => case
                    .failures
                    .push(Failure::new(e.to_string()).with_kind(SCHEMA_FAILURE)),
            }

            self.progress.step_done(package);

            if !case.failures.is_empty() {
                debug!("Step {} failed, skipping the rest of the case", index);
                break;
            }
        }

        case.time = timer.elapsed_secs_str();
        info!("end");
    }
}

/// Time a step may take given the step timeout and the suite deadline.
/// `Some(ZERO)` means the suite deadline already passed.
fn step_budget(step_timeout: Option<Duration>, deadline: Option<Instant>) -> Option<Duration> {
    let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
    match (step_timeout, remaining) {
        (Some(step), Some(left)) => Some(step.min(left)),
        (step, left) => step.or(left),
    }
}

fn output_of<'r>(result: &'r ResultDocument, key: &str) -> &'r str {
    result.get(key).and_then(Value::as_str).unwrap_or_default()
}
