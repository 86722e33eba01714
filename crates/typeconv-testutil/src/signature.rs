//! Signature test file parser and runner.
//!
//! Parses the `tests/signatures/*.test` format and runs each case through
//! the signature parser. `# expect: ok` cases compare the descriptor tree;
//! `# expect: error` cases pass when the error message contains the
//! expected text.

use typeconv_kernel::parse_signature;

use crate::format::parse_blocks;
use crate::sexpr::format_descriptor;
use crate::{TestResult, TestSummary};

/// A single signature test case.
#[derive(Debug, Clone)]
pub struct SignatureTestCase {
    /// Test name from the `# test: name` line.
    pub name: String,
    /// Line number where the test starts (1-indexed).
    pub line_number: usize,
    /// The signature to parse.
    pub input: String,
    pub expected: SignatureExpectation,
}

/// What we expect from parsing a signature.
#[derive(Debug, Clone, PartialEq)]
pub enum SignatureExpectation {
    /// Descriptor tree as an S-expression.
    Ok(String),
    /// Text the error message must contain.
    Error(String),
}

/// Parse the *.test file format into test cases.
pub fn parse_signature_tests(content: &str) -> Vec<SignatureTestCase> {
    parse_blocks(content)
        .into_iter()
        .map(|block| {
            let expected = match block.header("expect") {
                Some("error") => SignatureExpectation::Error(block.expected.clone()),
                _ => SignatureExpectation::Ok(block.expected.clone()),
            };
            SignatureTestCase {
                name: block.name,
                line_number: block.line_number,
                input: block.input,
                expected,
            }
        })
        .collect()
}

impl SignatureTestCase {
    /// Run this test case and return the result.
    pub fn run(&self) -> TestResult {
        match (parse_signature(&self.input), &self.expected) {
            (Ok(descriptor), SignatureExpectation::Ok(expected)) => {
                TestResult::compare(expected, &format_descriptor(&descriptor))
            }
            (Ok(descriptor), SignatureExpectation::Error(expected)) => TestResult::Fail {
                expected: format!("error: {expected}"),
                actual: format_descriptor(&descriptor),
            },
            (Err(error), SignatureExpectation::Error(expected)) => {
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
            (Err(error), SignatureExpectation::Ok(expected)) => TestResult::Fail {
                expected: expected.clone(),
                actual: format!("error: {error}"),
            },
        }
    }
}

/// Run all signature test cases and return a summary.
pub fn run_signature_tests(cases: &[SignatureTestCase]) -> TestSummary {
    let mut summary = TestSummary::new();
    for case in cases {
        summary.record(&case.name, case.line_number, case.run());
    }
    summary
}
