//! Test utilities for typeconv.
//!
//! Provides parsers and runners for the test file formats used in the typeconv project:
//! - `tests/signatures/*.test`: signatures with the expected descriptor tree or error
//! - `tests/conversions/*.test`: raw values checked against a signature, with expected diagnostics

pub mod conversion;
pub mod sexpr;
pub mod signature;

mod format;

use std::fmt;

/// The result of running a single test case.
#[derive(Debug, Clone)]
pub enum TestResult {
    /// Test passed.
    Pass,
    /// Test failed with expected vs actual mismatch.
    Fail { expected: String, actual: String },
    /// Error running the test.
    Error { message: String },
}

impl TestResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, TestResult::Fail { .. })
    }

    /// Pass when `actual` equals `expected` after collapsing whitespace.
    pub fn compare(expected: &str, actual: &str) -> Self {
        if normalize(expected) == normalize(actual) {
            TestResult::Pass
        } else {
            TestResult::Fail {
                expected: expected.to_string(),
                actual: actual.to_string(),
            }
        }
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Summary of running multiple test cases.
#[derive(Debug, Default)]
pub struct TestSummary {
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub failures: Vec<TestFailure>,
}

/// A single test failure with context.
#[derive(Debug, Clone)]
pub struct TestFailure {
    pub name: String,
    pub line: usize,
    pub result: TestResult,
}

impl TestSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: impl Into<String>, line: usize, result: TestResult) {
        match &result {
            TestResult::Pass => self.passed += 1,
            TestResult::Fail { .. } | TestResult::Error { .. } => {
                if result.is_fail() {
                    self.failed += 1;
                } else {
                    self.errors += 1;
                }
                self.failures.push(TestFailure {
                    name: name.into(),
                    line,
                    result,
                });
            }
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errors
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

impl fmt::Display for TestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{}", "═".repeat(60))?;
        writeln!(f, "Test Summary: {} total", self.total())?;
        writeln!(
            f,
            "  ✓ {} passed  ✗ {} failed  ⚠ {} errors",
            self.passed, self.failed, self.errors
        )?;

        for failure in &self.failures {
            writeln!(f, "\n  {} (line {})", failure.name, failure.line)?;
            match &failure.result {
                TestResult::Fail { expected, actual } => {
                    writeln!(f, "    expected: {expected}")?;
                    writeln!(f, "    actual:   {actual}")?;
                }
                TestResult::Error { message } => writeln!(f, "    error: {message}")?,
                TestResult::Pass => {}
            }
        }
        writeln!(f, "{}", "═".repeat(60))
    }
}
