//! Shell command executor
//!
//! Runs the step's `script` through `sh -c` and reports exit code and
//! captured output.

use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use serde_json::Value;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::debug;

use super::{Executor, ExecutorError, ResultDocument, StepContext};
use crate::assertions::Assertion;
use crate::engine::AliasTable;
use crate::models::TestStep;

pub const NAME: &str = "exec";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExecStep {
    script: String,
}

/// Executor running shell scripts
#[derive(Clone, Debug)]
pub struct ExecExecutor {
    shell: String,
}

impl ExecExecutor {
    pub fn new() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }

    async fn execute(
        &self,
        ctx: &StepContext,
        aliases: &AliasTable,
        step: &TestStep,
    ) -> Result<ResultDocument, ExecutorError> {
        let exec_step: ExecStep = step.decode(NAME)?;
        let script = aliases.expand(&exec_step.script);
        debug!("{} / {} step {}: running script: {}", ctx.suite, ctx.case, ctx.index, script);

        let start = Instant::now();
        let mut command = Command::new(&self.shell);
        command
            .arg("-c")
            .arg(&script)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        let child = command.output();

        let output = match ctx.timeout {
            Some(limit) => tokio::time::timeout(limit, child)
                .await
                .map_err(|_| ExecutorError::Timeout(limit))?,
            None => child.await,
        }
        .map_err(|e| ExecutorError::Spawn(e.to_string()))?;

        let elapsed = start.elapsed();
        let code = output.status.code().unwrap_or(-1);
        debug!("Script exited with code {} in {}ms", code, elapsed.as_millis());

        let mut result = ResultDocument::new();
        result.insert("systemout".into(), Value::String(trim_output(&output.stdout)));
        result.insert("systemerr".into(), Value::String(trim_output(&output.stderr)));
        result.insert("code".into(), Value::from(code));
        result.insert("timeseconds".into(), Value::from(elapsed.as_secs_f64()));
        result.insert("timehuman".into(), Value::String(format!("{elapsed:?}")));
        Ok(result)
    }
}

impl Default for ExecExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for ExecExecutor {
    fn run<'a>(
        &'a self,
        ctx: &'a StepContext,
        aliases: &'a AliasTable,
        step: &'a TestStep,
    ) -> BoxFuture<'a, Result<ResultDocument, ExecutorError>> {
        self.execute(ctx, aliases, step).boxed()
    }

    fn default_assertions(&self) -> Vec<Assertion> {
        vec![Assertion::new("result.code ShouldEqual 0")]
    }
}

fn trim_output(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end_matches('\n').to_string()
}
