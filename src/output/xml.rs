//! JUnit-style XML rendering

use std::fmt::{self, Write};

use crate::models::{Failure, InnerResult, TestCase, TestSuite, Tests};

const HEADER: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Render the aggregate as a `<testsuites>` document
pub fn render(tests: &Tests) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{HEADER}")?;

    if tests.test_suites.is_empty() {
        writeln!(out, "<testsuites></testsuites>")?;
        return Ok(out);
    }

    writeln!(out, "<testsuites>")?;
    for suite in &tests.test_suites {
        write_suite(&mut out, suite)?;
    }
    writeln!(out, "</testsuites>")?;
    Ok(out)
}

fn write_suite(out: &mut String, suite: &TestSuite) -> fmt::Result {
    write!(out, "  <testsuite")?;
    count_attr(out, "disabled", suite.disabled)?;
    count_attr(out, "errors", suite.errors)?;
    count_attr(out, "failures", suite.failures)?;
    attr(out, "hostname", &suite.hostname)?;
    attr(out, "id", &suite.id)?;
    write!(out, " name=\"{}\"", escape(&suite.name))?;
    attr(out, "package", &suite.package)?;
    count_attr(out, "skipped", suite.skipped)?;
    write!(out, " tests=\"{}\"", suite.total)?;
    attr(out, "time", &suite.time)?;
    attr(out, "timestamp", &suite.timestamp)?;

    if suite.test_cases.is_empty() {
        return writeln!(out, "></testsuite>");
    }

    writeln!(out, ">")?;
    for case in &suite.test_cases {
        write_case(out, case)?;
    }
    writeln!(out, "  </testsuite>")
}

fn write_case(out: &mut String, case: &TestCase) -> fmt::Result {
    write!(out, "    <testcase")?;
    attr(out, "assertions", &case.assertions)?;
    attr(out, "classname", &case.classname)?;
    write!(out, " name=\"{}\"", escape(&case.name))?;
    attr(out, "status", case.status.as_str())?;
    attr(out, "time", &case.time)?;

    let has_body = !case.errors.is_empty()
        || !case.failures.is_empty()
        || case.is_skipped()
        || !case.systemout.is_empty()
        || !case.systemerr.is_empty();
    if !has_body {
        return writeln!(out, "></testcase>");
    }

    writeln!(out, ">")?;
    for error in &case.errors {
        write_failure(out, "error", error)?;
    }
    for failure in &case.failures {
        write_failure(out, "failure", failure)?;
    }
    if case.is_skipped() {
        writeln!(out, "      <skipped></skipped>")?;
    }
    write_output(out, "system-out", &case.systemout)?;
    write_output(out, "system-err", &case.systemerr)?;
    writeln!(out, "    </testcase>")
}

fn write_failure(out: &mut String, tag: &str, failure: &Failure) -> fmt::Result {
    write!(out, "      <{tag}")?;
    if let Some(kind) = &failure.kind {
        attr(out, "type", kind)?;
    }
    if let Some(message) = &failure.message {
        attr(out, "message", message)?;
    }
    writeln!(out, ">{}</{tag}>", escape(&failure.value))
}

fn write_output(out: &mut String, tag: &str, output: &InnerResult) -> fmt::Result {
    if output.is_empty() {
        return Ok(());
    }
    writeln!(out, "      <{tag}>{}</{tag}>", escape(&output.value))
}

fn attr(out: &mut String, name: &str, value: &str) -> fmt::Result {
    if value.is_empty() {
        return Ok(());
    }
    write!(out, " {name}=\"{}\"", escape(value))
}

fn count_attr(out: &mut String, name: &str, value: usize) -> fmt::Result {
    if value == 0 {
        return Ok(());
    }
    write!(out, " {name}=\"{value}\"")
}

/// Escape text for use in XML content and attribute values.
/// Characters XML 1.0 cannot carry become U+FFFD.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            '\n' => escaped.push_str("&#xA;"),
            '\r' => escaped.push_str("&#xD;"),
            '\t' => escaped.push_str("&#x9;"),
            c if c < '\u{20}' || c == '\u{FFFE}' || c == '\u{FFFF}' => {
                escaped.push(char::REPLACEMENT_CHARACTER)
            }
            c => escaped.push(c),
        }
    }
    escaped
}
