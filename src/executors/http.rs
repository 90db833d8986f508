//! HTTP request executor

use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

use super::{Executor, ExecutorError, ResultDocument, StepContext};
use crate::assertions::Assertion;
use crate::engine::AliasTable;
use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::models::TestStep;

pub const NAME: &str = "http";

/// Longest a request may take when no step deadline is tighter
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HttpStep {
    #[serde(default = "default_method")]
    method: String,
    url: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
}

impl HttpStep {
    fn into_request(self) -> HttpRequest {
        let url = if self.path.is_empty() {
            self.url
        } else {
            format!(
                "{}/{}",
                self.url.trim_end_matches('/'),
                self.path.trim_start_matches('/')
            )
        };

        let request = HttpRequest::new(self.method, url).headers(self.headers);
        match self.body {
            Some(body) => request.body(body),
            None => request,
        }
    }
}

/// Executor sending one HTTP request per step.
///
/// The client is built on first use and shared by every later step, so
/// connections are pooled across the run.
#[derive(Debug, Default)]
pub struct HttpExecutor {
    client: OnceCell<HttpClient>,
}

impl HttpExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    async fn client(&self) -> Result<&HttpClient, ExecutorError> {
        self.client
            .get_or_try_init(|| async { HttpClient::with_timeout(REQUEST_TIMEOUT) })
            .await
            .map_err(request_error)
    }

    async fn execute(
        &self,
        ctx: &StepContext,
        step: &TestStep,
    ) -> Result<ResultDocument, ExecutorError> {
        let timeout = ctx.timeout.map_or(REQUEST_TIMEOUT, |t| t.min(REQUEST_TIMEOUT));
        let request = step
            .decode::<HttpStep>(NAME)?
            .into_request()
            .timeout(timeout);
        debug!(
            "{} / {} step {}: {} {}",
            ctx.suite, ctx.case, ctx.index, request.method, request.url
        );

        let response = self.client().await?.send(&request).await.map_err(|e| match e {
            HttpError::Timeout(limit) => ExecutorError::Timeout(limit),
            other => request_error(other),
        })?;

        debug!("{} {} -> {}", request.method, request.url, response.status_code);
        Ok(into_result(response))
    }
}

impl Executor for HttpExecutor {
    fn run<'a>(
        &'a self,
        ctx: &'a StepContext,
        _aliases: &'a AliasTable,
        step: &'a TestStep,
    ) -> BoxFuture<'a, Result<ResultDocument, ExecutorError>> {
        self.execute(ctx, step).boxed()
    }

    fn default_assertions(&self) -> Vec<Assertion> {
        vec![Assertion::new("result.statuscode ShouldEqual 200")]
    }
}

fn request_error(e: HttpError) -> ExecutorError {
    ExecutorError::Request(e.to_string())
}

fn into_result(response: HttpResponse) -> ResultDocument {
    let headers = response
        .headers
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    let mut result = ResultDocument::new();
    result.insert("statuscode".into(), Value::from(response.status_code));
    if let Ok(json) = serde_json::from_str::<Value>(&response.body) {
        result.insert("bodyjson".into(), json);
    }
    result.insert("body".into(), Value::String(response.body));
    result.insert("headers".into(), Value::Object(headers));
    result.insert(
        "timeseconds".into(),
        Value::from(response.duration.as_secs_f64()),
    );
    result.insert(
        "timehuman".into(),
        Value::String(format!("{:?}", response.duration)),
    );
    result
}
