//! Step executors
//!
//! An executor performs the side effect of a step (run a command, send a
//! request) and returns a result document for the assertion evaluator.
//! Executors are bound to names in an [`ExecutorRegistry`] before a run
//! starts; the registry is read-only while suites execute.

mod exec;
mod http;

pub use exec::ExecExecutor;
pub use http::HttpExecutor;

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::assertions::Assertion;
use crate::engine::AliasTable;
use crate::models::{SchemaError, TestStep};

/// Document returned by an executor run
pub type ResultDocument = Map<String, Value>;

/// Errors reported by an executor run
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("failed to start command: {0}")]
    Spawn(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Lookup of an executor name that nothing was registered under
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no executor registered under '{name}'")]
pub struct ResolutionError {
    pub name: String,
}

/// What an executor knows about the step it runs
#[derive(Clone, Debug)]
pub struct StepContext {
    pub suite: String,
    pub case: String,
    /// Zero-based position of the step in its case
    pub index: usize,
    /// Time left for this step, if a deadline applies
    pub timeout: Option<Duration>,
}

impl StepContext {
    pub fn new(suite: impl Into<String>, case: impl Into<String>, index: usize) -> Self {
        Self {
            suite: suite.into(),
            case: case.into(),
            index,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A named capability that performs a step
pub trait Executor: Send + Sync {
    /// Run one step. Errors are recorded as case failures, never fatal to the run.
    fn run<'a>(
        &'a self,
        ctx: &'a StepContext,
        aliases: &'a AliasTable,
        step: &'a TestStep,
    ) -> BoxFuture<'a, Result<ResultDocument, ExecutorError>>;

    /// Assertions applied to every step this executor handles
    fn default_assertions(&self) -> Vec<Assertion> {
        Vec::new()
    }
}

/// Name to executor bindings
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: BTreeMap<String, Arc<dyn Executor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `exec` and `http` executors
    pub fn builtin() -> Self {
        Self::new()
            .with(exec::NAME, ExecExecutor::new())
            .with(http::NAME, HttpExecutor::new())
    }

    /// Bind `name` to `executor`, replacing any previous binding
    pub fn register(&mut self, name: impl Into<String>, executor: impl Executor + 'static) {
        self.executors.insert(name.into(), Arc::new(executor));
    }

    pub fn with(mut self, name: impl Into<String>, executor: impl Executor + 'static) -> Self {
        self.register(name, executor);
        self
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Executor>, ResolutionError> {
        self.executors
            .get(name)
            .cloned()
            .ok_or_else(|| ResolutionError {
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.executors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.executors.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    struct Echo;

    impl Executor for Echo {
        fn run<'a>(
            &'a self,
            _ctx: &'a StepContext,
            _aliases: &'a AliasTable,
            step: &'a TestStep,
        ) -> BoxFuture<'a, Result<ResultDocument, ExecutorError>> {
            async move { Ok(step.fields().clone()) }.boxed()
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = ExecutorRegistry::new().with("echo", Echo);
        assert!(registry.resolve("echo").is_ok());
        assert_eq!(registry.len(), 1);

        let err = registry.resolve("Echo").err().unwrap();
        assert_eq!(err.name, "Echo");
        assert_eq!(err.to_string(), "no executor registered under 'Echo'");
    }

    #[test]
    fn test_builtin_registry() {
        let registry = ExecutorRegistry::builtin();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["exec", "http"]);
        assert!(!registry.resolve("exec").unwrap().default_assertions().is_empty());
    }

    #[test]
    fn test_default_assertions_empty_by_default() {
        assert!(Echo.default_assertions().is_empty());
    }

    #[test]
    fn test_run_through_registry() {
        let registry = ExecutorRegistry::new().with("echo", Echo);
        let executor = registry.resolve("echo").unwrap();
        let ctx = StepContext::new("suite", "case", 0);
        let step = TestStep::of_type("echo").with("value", 42);

        let result = tokio_test::block_on(executor.run(&ctx, &AliasTable::default(), &step)).unwrap();
        assert_eq!(result.get("value"), Some(&Value::from(42)));
    }
}
