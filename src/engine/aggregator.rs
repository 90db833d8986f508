//! Result aggregation
//!
//! Completed suites arrive over a channel and are folded into the run totals
//! by a single task, so no lock guards the aggregate.

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::{TestSuite, Tests};

/// Folds completed suites into a [`Tests`] aggregate
#[derive(Debug, Default)]
pub struct Aggregator {
    tests: Tests,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, suite: TestSuite) {
        debug!(
            "Aggregating {} (failures: {}, skipped: {})",
            suite.name, suite.failures, suite.skipped
        );
        self.tests.add_suite(suite);
    }

    pub fn finish(self) -> Tests {
        self.tests
    }

    /// Fold every suite received until all senders are dropped
    pub fn spawn(mut receiver: UnboundedReceiver<TestSuite>) -> JoinHandle<Tests> {
        tokio::spawn(async move {
            let mut aggregator = Aggregator::new();
            while let Some(suite) = receiver.recv().await {
                aggregator.fold(suite);
            }
            aggregator.finish()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestCase;
    use tokio::sync::mpsc;

    fn suite(name: &str, cases: usize, failures: usize) -> TestSuite {
        let mut suite = TestSuite::new(name, format!("{name}.yml"));
        for i in 0..cases {
            suite = suite.with_case(TestCase::new(format!("{name} {i}")));
        }
        suite.failures = failures;
        suite
    }

    #[test]
    fn test_fold() {
        let mut aggregator = Aggregator::new();
        aggregator.fold(suite("a", 1, 0));
        aggregator.fold(suite("b", 2, 1));

        let tests = aggregator.finish();
        assert_eq!(tests.total_ok, 1);
        assert_eq!(tests.total_ko, 1);
        assert_eq!(tests.total_skipped, 0);
        assert_eq!(tests.total, 2);
    }

    #[test]
    fn test_empty_run() {
        let tests = Aggregator::new().finish();
        assert_eq!(tests.total, 0);
        assert!(tests.test_suites.is_empty());
    }

    #[tokio::test]
    async fn test_spawn_collects_until_senders_drop() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = Aggregator::spawn(rx);

        let tx2 = tx.clone();
        tx.send(suite("a", 3, 0)).unwrap();
        tx2.send(suite("b", 1, 0)).unwrap();
        drop(tx);
        drop(tx2);

        let tests = handle.await.unwrap();
        assert_eq!(tests.test_suites.len(), 2);
        assert_eq!(tests.total_ok, 4);
    }
}
