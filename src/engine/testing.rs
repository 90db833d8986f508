//! Executors used by engine tests

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::context::AliasTable;
use crate::executors::{Executor, ExecutorError, ResultDocument, StepContext};
use crate::models::TestStep;

fn ok_result() -> ResultDocument {
    let mut result = ResultDocument::new();
    result.insert("code".to_string(), Value::from(0));
    result
}

/// Always succeeds with `code: 0`
pub struct Passing;

impl Executor for Passing {
    fn run<'a>(
        &'a self,
        _ctx: &'a StepContext,
        _aliases: &'a AliasTable,
        _step: &'a TestStep,
    ) -> BoxFuture<'a, Result<ResultDocument, ExecutorError>> {
        async { Ok(ok_result()) }.boxed()
    }
}

/// Always returns an executor error
pub struct Failing;

impl Executor for Failing {
    fn run<'a>(
        &'a self,
        _ctx: &'a StepContext,
        _aliases: &'a AliasTable,
        _step: &'a TestStep,
    ) -> BoxFuture<'a, Result<ResultDocument, ExecutorError>> {
        async { Err(ExecutorError::Request("boom".to_string())) }.boxed()
    }
}

/// Succeeds and counts how often it ran
pub struct Counting {
    calls: Arc<AtomicUsize>,
}

impl Counting {
    pub fn new(calls: Arc<AtomicUsize>) -> Self {
        Self { calls }
    }
}

impl Executor for Counting {
    fn run<'a>(
        &'a self,
        _ctx: &'a StepContext,
        _aliases: &'a AliasTable,
        _step: &'a TestStep,
    ) -> BoxFuture<'a, Result<ResultDocument, ExecutorError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async { Ok(ok_result()) }.boxed()
    }
}

/// Sleeps before succeeding, tracking how many runs overlap
pub struct Sleeping {
    delay: Duration,
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Sleeping {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            current: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle on the highest number of overlapping runs seen
    pub fn peak(&self) -> Arc<AtomicUsize> {
        self.peak.clone()
    }
}

impl Executor for Sleeping {
    fn run<'a>(
        &'a self,
        _ctx: &'a StepContext,
        _aliases: &'a AliasTable,
        _step: &'a TestStep,
    ) -> BoxFuture<'a, Result<ResultDocument, ExecutorError>> {
        async move {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(ok_result())
        }
        .boxed()
    }
}
