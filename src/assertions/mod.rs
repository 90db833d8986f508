//! Assertion evaluation
//!
//! Assertions are one-line expectations on an executor result, written as
//! `<key> <Operator> [expected...]`, for example
//! `result.statuscode ShouldEqual 200`.

use serde_json::Value;
use std::fmt;

use crate::executors::ResultDocument;
use crate::models::Failure;

/// Failure type recorded for unmet assertions
pub const ASSERTION_FAILURE: &str = "assertion";

/// A declared expectation on a step result
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assertion(String);

impl Assertion {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Result key targeted by the assertion, normalised for comparison
    pub fn key(&self) -> Option<String> {
        self.0.split_whitespace().next().map(normalize_key)
    }

    fn parse(&self) -> Result<(String, Operator, Vec<&str>), String> {
        let mut parts = self.0.split_whitespace();
        let key = parts.next().ok_or("empty assertion")?;
        let op = parts.next().ok_or("missing operator")?;
        let op = Operator::from_str(op).ok_or_else(|| format!("unknown operator '{op}'"))?;
        Ok((normalize_key(key), op, parts.collect()))
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize_key(key: &str) -> String {
    let lower = key.to_lowercase();
    lower
        .strip_prefix("result.")
        .map(str::to_string)
        .unwrap_or(lower)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operator {
    Equal,
    NotEqual,
    ContainSubstring,
    NotContainSubstring,
    StartWith,
    EndWith,
    BeEmpty,
    NotBeEmpty,
    BeGreaterThan,
    BeLessThan,
}

impl Operator {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "ShouldEqual" => Some(Operator::Equal),
            "ShouldNotEqual" => Some(Operator::NotEqual),
            "ShouldContainSubstring" => Some(Operator::ContainSubstring),
            "ShouldNotContainSubstring" => Some(Operator::NotContainSubstring),
            "ShouldStartWith" => Some(Operator::StartWith),
            "ShouldEndWith" => Some(Operator::EndWith),
            "ShouldBeEmpty" => Some(Operator::BeEmpty),
            "ShouldNotBeEmpty" => Some(Operator::NotBeEmpty),
            "ShouldBeGreaterThan" => Some(Operator::BeGreaterThan),
            "ShouldBeLessThan" => Some(Operator::BeLessThan),
            _ => None,
        }
    }

    fn needs_expected(self) -> bool {
        !matches!(self, Operator::BeEmpty | Operator::NotBeEmpty)
    }

    fn check(self, actual: &Value, expected: &str) -> Result<(), String> {
        let rendered = render(actual);
        let ok = match self {
            Operator::Equal => rendered == expected,
            Operator::NotEqual => rendered != expected,
            Operator::ContainSubstring => rendered.contains(expected),
            Operator::NotContainSubstring => !rendered.contains(expected),
            Operator::StartWith => rendered.starts_with(expected),
            Operator::EndWith => rendered.ends_with(expected),
            Operator::BeEmpty => is_empty(actual),
            Operator::NotBeEmpty => !is_empty(actual),
            Operator::BeGreaterThan | Operator::BeLessThan => {
                let (a, e) = (as_number(&rendered)?, as_number(expected)?);
                if self == Operator::BeGreaterThan {
                    a > e
                } else {
                    a < e
                }
            }
        };

        if ok {
            Ok(())
        } else {
            Err(format!("got \"{rendered}\""))
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn as_number(s: &str) -> Result<f64, String> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| format!("\"{s}\" is not a number"))
}

/// Judges a step result against its assertions
pub trait AssertionEvaluator: Send + Sync {
    /// Return one failure per unmet assertion, empty when all hold
    fn evaluate(
        &self,
        result: &ResultDocument,
        declared: &[Assertion],
        defaults: &[Assertion],
    ) -> Vec<Failure>;
}

/// Built-in evaluator for the `Should*` operator family
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultEvaluator;

impl DefaultEvaluator {
    /// Declared assertions always apply; a default assertion is dropped when
    /// a declared one targets the same key.
    pub fn merge<'a>(declared: &'a [Assertion], defaults: &'a [Assertion]) -> Vec<&'a Assertion> {
        let declared_keys: Vec<Option<String>> = declared.iter().map(Assertion::key).collect();

        defaults
            .iter()
            .filter(|d| !declared_keys.contains(&d.key()))
            .chain(declared.iter())
            .collect()
    }

    fn check(result: &ResultDocument, assertion: &Assertion) -> Option<Failure> {
        let (key, op, expected) = match assertion.parse() {
            Ok(parsed) => parsed,
            Err(reason) => {
                return Some(failure(assertion, &format!("invalid assertion: {reason}")));
            }
        };

        if op.needs_expected() && expected.is_empty() {
            return Some(failure(assertion, "invalid assertion: missing expected value"));
        }

        let actual = result
            .iter()
            .find(|(k, _)| k.to_lowercase() == key)
            .map(|(_, v)| v);

        let Some(actual) = actual else {
            return Some(failure(assertion, &format!("key '{key}' not found in result")));
        };

        op.check(actual, &expected.join(" "))
            .err()
            .map(|reason| failure(assertion, &reason))
    }
}

impl AssertionEvaluator for DefaultEvaluator {
    fn evaluate(
        &self,
        result: &ResultDocument,
        declared: &[Assertion],
        defaults: &[Assertion],
    ) -> Vec<Failure> {
        Self::merge(declared, defaults)
            .into_iter()
            .filter_map(|assertion| Self::check(result, assertion))
            .collect()
    }
}

fn failure(assertion: &Assertion, reason: &str) -> Failure {
    Failure::new(format!("Assertion \"{assertion}\" failed: {reason}"))
        .with_kind(ASSERTION_FAILURE)
        .with_message(assertion.as_str())
}
