//! Conversion test file parser and runner.
//!
//! Each case names a signature with `# type:` and optionally extra classpath
//! types with `# classpath: a, b`. The input is the raw value, validated at
//! offset 0 against a project carrying the builtin converters. The expected
//! section lists one `[start..end] message` line per diagnostic, in order;
//! an empty section means the value converts cleanly. With `# expect: error`
//! the expected section is text the resolution error must contain.

use std::sync::Arc;

use typeconv_kernel::builtin::standard_project;
use typeconv_kernel::{ConverterSession, SessionConfig};
use typeconv_types::Diagnostic;

use crate::format::parse_blocks;
use crate::{TestResult, TestSummary};

/// A single conversion test case.
#[derive(Debug, Clone)]
pub struct ConversionTestCase {
    pub name: String,
    pub line_number: usize,
    /// Signature from the `# type:` header; `None` is reported as an error.
    pub signature: Option<String>,
    /// Types added to the project on top of the JDK baseline.
    pub classpath: Vec<String>,
    /// The raw value.
    pub input: String,
    pub expected: ConversionExpectation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionExpectation {
    /// Rendered diagnostics, one per line.
    Diagnostics(String),
    /// Text the resolution error must contain.
    Error(String),
}

/// Parse the *.test file format into test cases.
pub fn parse_conversion_tests(content: &str) -> Vec<ConversionTestCase> {
    parse_blocks(content)
        .into_iter()
        .map(|block| {
            let expected = match block.header("expect") {
                Some("error") => ConversionExpectation::Error(block.expected.clone()),
                _ => ConversionExpectation::Diagnostics(block.expected.clone()),
            };
            let classpath = block
                .header("classpath")
                .map(|types| {
                    types
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();
            ConversionTestCase {
                signature: block.header("type").map(String::from),
                name: block.name,
                line_number: block.line_number,
                classpath,
                input: block.input,
                expected,
            }
        })
        .collect()
}

/// `[start..end] message`, one line per diagnostic.
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("[{}..{}] {}", d.start, d.end, d.message))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ConversionTestCase {
    fn session(&self) -> ConverterSession {
        let mut project = standard_project(format!("conversions:{}", self.name));
        for name in &self.classpath {
            project.add_type(name.as_str());
        }
        ConverterSession::new(Arc::new(project), SessionConfig::named(&self.name))
    }

    /// Run this test case and return the result.
    pub fn run(&self) -> TestResult {
        let Some(signature) = &self.signature else {
            return TestResult::Error {
                message: "missing `# type:` header".to_string(),
            };
        };

        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let outcome = self
            .session()
            .try_validate(&self.input, signature, 0, &mut diagnostics);

        match (outcome, &self.expected) {
            (Ok(()), ConversionExpectation::Diagnostics(expected)) => {
                TestResult::compare(expected, &format_diagnostics(&diagnostics))
            }
            (Ok(()), ConversionExpectation::Error(expected)) => TestResult::Fail {
                expected: format!("error: {expected}"),
                actual: format_diagnostics(&diagnostics),
            },
            (Err(error), ConversionExpectation::Error(expected)) => {
                let actual = error.to_string();
                if actual.contains(expected.as_str()) {
                    TestResult::Pass
                } else {
                    TestResult::Fail {
                        expected: format!("error containing: {expected}"),
                        actual: format!("error: {actual}"),
                    }
                }
            }
            (Err(error), ConversionExpectation::Diagnostics(expected)) => TestResult::Fail {
                expected: expected.clone(),
                actual: format!("error: {error}"),
            },
        }
    }
}

/// Run all conversion test cases and return a summary.
pub fn run_conversion_tests(cases: &[ConversionTestCase]) -> TestSummary {
    let mut summary = TestSummary::new();
    for case in cases {
        summary.record(&case.name, case.line_number, case.run());
    }
    summary
}
