//! HTTP client module
//!
//! Provides the HTTP client backing the `http` step executor.

mod client;

pub use client::{HttpClient, HttpError, HttpRequest, HttpResponse};
