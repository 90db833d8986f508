//! Data models for suite execution
//!
//! Suite definitions as written by users, open step documents, and the
//! results the engine aggregates into a report.

mod definition;
mod step;
mod test_result;

pub use definition::SuiteDefinition;
pub use step::{SchemaError, TestStep};
pub use test_result::{CaseStatus, Failure, InnerResult, TestCase, TestSuite, Tests};
