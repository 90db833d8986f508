//! HTTP client used by the `http` executor
//!
//! Thin wrapper over reqwest that keeps response headers and timing in a
//! plain, serializable response type.

use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// HTTP client errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Failed to create HTTP client: {0}")]
    Build(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Connection refused to {0}")]
    ConnectionRefused(String),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// HTTP client for step requests. Clones share one connection pool.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create client with custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Send HTTP request; a request timeout overrides the client's
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        debug!("Sending {} request to {}", request.method, request.url);

        let method = Method::from_bytes(request.method.to_uppercase().as_bytes())
            .map_err(|_| HttpError::InvalidMethod(request.method.clone()))?;

        let mut req_builder = self.client.request(method, &request.url);

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        if let Some(timeout) = request.timeout {
            req_builder = req_builder.timeout(timeout);
        }
        let limit = request.timeout.unwrap_or(self.timeout);

        let start = Instant::now();

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(limit)
            } else if e.is_connect() {
                HttpError::ConnectionRefused(request.url.clone())
            } else {
                HttpError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();

        let headers = response
            .headers()
            .iter()
            .filter_map(|(key, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (key.to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .text()
            .await
            .map_err(|e| HttpError::Body(e.to_string()))?;

        let duration = start.elapsed();

        debug!(
            "Response: {} {} in {}ms",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            duration.as_millis()
        );

        Ok(HttpResponse {
            status_code: status.as_u16(),
            headers,
            body,
            duration,
        })
    }
}

/// HTTP request builder
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP response
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_request_builder() {
        let req = HttpRequest::new("GET", "http://example.com")
            .headers(BTreeMap::from([
                ("Host".to_string(), "example.com".to_string()),
                ("X-Custom".to_string(), "value".to_string()),
            ]))
            .body("{}");

        assert_eq!(req.method, "GET");
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.body.as_deref(), Some("{}"));
        assert!(req.timeout.is_none());
    }

    #[tokio::test]
    async fn test_invalid_method() {
        let client = HttpClient::with_timeout(Duration::from_secs(30)).unwrap();
        let err = client
            .send(&HttpRequest::new("NOT A METHOD", "http://127.0.0.1:1/"))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::InvalidMethod(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let client = HttpClient::with_timeout(Duration::from_secs(30)).unwrap();
        let err = client
            .send(&HttpRequest::new("GET", "http://127.0.0.1:1/").timeout(Duration::from_secs(2)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HttpError::ConnectionRefused(_) | HttpError::RequestFailed(_)
        ));
    }
}
