//! Open step documents
//!
//! A step is an ordered key-value document. The `type` key picks the
//! executor and `assertions` lists expectations on its result; every other
//! key belongs to the executor and is only decoded when the step is
//! dispatched.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::assertions::Assertion;

/// Reserved key selecting the executor by name
pub const EXECUTOR_KEY: &str = "type";

/// Reserved key holding the step's declared assertions
pub const ASSERTIONS_KEY: &str = "assertions";

/// A step document that does not fit the schema expected of it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("field '{field}' must be {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },

    #[error("step does not match the '{executor}' executor schema: {reason}")]
    Mismatch { executor: String, reason: String },
}

/// A single executor-dispatched unit of work
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestStep(Map<String, Value>);

impl TestStep {
    /// Executor named by the step, `None` when the selector is absent
    pub fn executor_name(&self) -> Result<Option<&str>, SchemaError> {
        match self.0.get(EXECUTOR_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(name)) => Ok(Some(name.as_str())),
            Some(_) => Err(SchemaError::InvalidField {
                field: EXECUTOR_KEY.to_string(),
                expected: "a string",
            }),
        }
    }

    /// Assertions declared on the step itself
    pub fn assertions(&self) -> Result<Vec<Assertion>, SchemaError> {
        let invalid = || SchemaError::InvalidField {
            field: ASSERTIONS_KEY.to_string(),
            expected: "a list of strings",
        };

        match self.0.get(ASSERTIONS_KEY) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(Assertion::new).ok_or_else(invalid))
                .collect(),
            Some(_) => Err(invalid()),
        }
    }

    /// Decode the executor-specific part of the step against `T`.
    ///
    /// Reserved keys are stripped first, so `T` should deny unknown fields to
    /// reject typos in step documents.
    pub fn decode<T: DeserializeOwned>(&self, executor: &str) -> Result<T, SchemaError> {
        let fields: Map<String, Value> = self
            .0
            .iter()
            .filter(|(key, _)| key.as_str() != EXECUTOR_KEY && key.as_str() != ASSERTIONS_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        serde_json::from_value(Value::Object(fields)).map_err(|e| SchemaError::Mismatch {
            executor: executor.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Builders for steps assembled in code rather than parsed from a suite file
#[cfg(test)]
impl TestStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step bound to a named executor
    pub fn of_type(executor: impl Into<String>) -> Self {
        Self::new().with(EXECUTOR_KEY, executor.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn with_assertion(mut self, assertion: impl Into<String>) -> Self {
        let entry = self
            .0
            .entry(ASSERTIONS_KEY.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = entry {
            items.push(Value::String(assertion.into()));
        }
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for TestStep {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
