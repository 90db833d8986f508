//! Progress reporting
//!
//! One task owns all progress state and prints it. Loader and runners only
//! send events, so nothing here needs a lock.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::context::DetailLevel;

const PACKAGE_WIDTH: usize = 47;

/// Structured progress events
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    SuiteQueued { package: String, steps: usize },
    StepDone { package: String },
    SuiteDone {
        package: String,
        success: bool,
        elapsed: Duration,
    },
}

/// Sending half handed to loader and runner tasks
#[derive(Clone, Debug)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSender {
    /// Sender whose events go nowhere
    #[cfg(test)]
    pub fn discard() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        Self { tx }
    }

    fn send(&self, event: ProgressEvent) {
        // The reporter going away only loses display output.
        let _ = self.tx.send(event);
    }

    pub fn suite_queued(&self, package: &str, steps: usize) {
        self.send(ProgressEvent::SuiteQueued {
            package: package.to_string(),
            steps,
        });
    }

    pub fn step_done(&self, package: &str) {
        self.send(ProgressEvent::StepDone {
            package: package.to_string(),
        });
    }

    pub fn suite_done(&self, package: &str, success: bool, elapsed: Duration) {
        self.send(ProgressEvent::SuiteDone {
            package: package.to_string(),
            success,
            elapsed,
        });
    }
}

#[derive(Debug, Default)]
struct SuiteProgress {
    total: usize,
    done: usize,
}

/// Owner of the progress display
#[derive(Debug)]
pub struct ProgressReporter {
    detail: DetailLevel,
    suites: HashMap<String, SuiteProgress>,
}

impl ProgressReporter {
    pub fn new(detail: DetailLevel) -> Self {
        Self {
            detail,
            suites: HashMap::new(),
        }
    }

    /// Start the reporter task; it ends once every sender is dropped
    pub fn spawn(detail: DetailLevel) -> (ProgressSender, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut reporter = ProgressReporter::new(detail);
            while let Some(event) = rx.recv().await {
                if let Some(line) = reporter.handle(event) {
                    println!("{line}");
                }
            }
        });
        (ProgressSender { tx }, handle)
    }

    /// Apply an event and return the line to display, if any
    pub fn handle(&mut self, event: ProgressEvent) -> Option<String> {
        match event {
            ProgressEvent::SuiteQueued { package, steps } => {
                self.suites.insert(
                    package,
                    SuiteProgress {
                        total: steps,
                        done: 0,
                    },
                );
                None
            }
            ProgressEvent::StepDone { package } => {
                let entry = self.suites.entry(package.clone()).or_default();
                entry.done += 1;
                (self.detail == DetailLevel::High).then(|| {
                    format!(
                        "⚙ {} [{}/{}]",
                        right_pad(&package, PACKAGE_WIDTH),
                        entry.done,
                        entry.total
                    )
                })
            }
            ProgressEvent::SuiteDone {
                package,
                success,
                elapsed,
            } => {
                let mark = if success { "✅" } else { "❌" };
                let line = match self.detail {
                    DetailLevel::Low => {
                        format!("{mark} {} {:?}", right_pad(&package, PACKAGE_WIDTH), elapsed)
                    }
                    DetailLevel::Medium | DetailLevel::High => {
                        let progress = self.suites.get(&package);
                        format!(
                            "{mark} {} [{}/{} steps] {:?}",
                            right_pad(&package, PACKAGE_WIDTH),
                            progress.map_or(0, |p| p.done),
                            progress.map_or(0, |p| p.total),
                            elapsed
                        )
                    }
                };
                Some(line)
            }
        }
    }
}

/// Pad or cut `s` to exactly `width` characters
fn right_pad(s: &str, width: usize) -> String {
    format!("{:<width$.width$}", s, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_pad() {
        assert_eq!(right_pad("ab", 4), "ab  ");
        assert_eq!(right_pad("abcdef", 4), "abcd");
    }

    #[test]
    fn test_medium_reports_suite_completion_only() {
        let mut reporter = ProgressReporter::new(DetailLevel::Medium);
        assert!(reporter
            .handle(ProgressEvent::SuiteQueued {
                package: "a.yml".into(),
                steps: 2,
            })
            .is_none());
        assert!(reporter
            .handle(ProgressEvent::StepDone {
                package: "a.yml".into()
            })
            .is_none());

        let line = reporter
            .handle(ProgressEvent::SuiteDone {
                package: "a.yml".into(),
                success: false,
                elapsed: Duration::from_millis(3),
            })
            .unwrap();
        assert!(line.starts_with("❌ a.yml"));
        assert!(line.contains("[1/2 steps]"));
    }

    #[test]
    fn test_high_reports_each_step() {
        let mut reporter = ProgressReporter::new(DetailLevel::High);
        reporter.handle(ProgressEvent::SuiteQueued {
            package: "b.yml".into(),
            steps: 3,
        });
        let line = reporter
            .handle(ProgressEvent::StepDone {
                package: "b.yml".into(),
            })
            .unwrap();
        assert!(line.ends_with("[1/3]"));
    }

    #[tokio::test]
    async fn test_reporter_stops_when_senders_drop() {
        let (sender, handle) = ProgressReporter::spawn(DetailLevel::Low);
        sender.suite_queued("c.yml", 1);
        sender.suite_done("c.yml", true, Duration::from_millis(1));
        drop(sender);
        assert!(handle.await.is_ok());
    }
}
