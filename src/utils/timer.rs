//! Timer utilities
//!
//! Wall-clock measurement for suites, cases and whole runs.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Simple timer for measuring elapsed time
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    started_at: DateTime<Utc>,
    label: String,
}

impl Timer {
    /// Create and start a new timer
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            started_at: Utc::now(),
            label: label.into(),
        }
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed seconds with millisecond precision, as reported in results
    pub fn elapsed_secs_str(&self) -> String {
        format!("{:.3}", self.elapsed().as_secs_f64())
    }

    /// RFC 3339 timestamp of when the timer started
    pub fn timestamp(&self) -> String {
        self.started_at.to_rfc3339()
    }

    /// Stop timer and return elapsed time
    pub fn stop(self) -> Duration {
        let elapsed = self.elapsed();
        tracing::debug!("{}: {}ms", self.label, elapsed.as_millis());
        elapsed
    }
}
