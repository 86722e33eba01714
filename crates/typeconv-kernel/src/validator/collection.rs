//! Element-wise validation of delimited values (`List<T>`, `Set<T>`, `T[]`).

use typeconv_types::DiagnosticsCollector;

use super::{DiagnosticLabels, Validator};
use crate::error::CapabilityError;

/// How a raw collection value is split into elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Split on every `,`. There is no escaping: an element cannot contain a comma.
    Comma,
}

impl SplitPolicy {
    fn delimiter(self) -> char {
        match self {
            SplitPolicy::Comma => ',',
        }
    }
}

/// Validates each element of a delimited value with one delegate.
#[derive(Debug)]
pub struct CollectionValidator {
    delegate: Box<Validator>,
    policy: SplitPolicy,
}

impl CollectionValidator {
    pub fn new(delegate: Validator, policy: SplitPolicy) -> Self {
        Self {
            delegate: Box::new(delegate),
            policy,
        }
    }

    pub fn delegate(&self) -> &Validator {
        &self.delegate
    }

    /// Validate every element, left to right.
    ///
    /// Elements are passed untrimmed. Empty elements between delimiters are
    /// validated; an empty trailing element (`"1,2,"`, or `""`) is not.
    /// Each element's offset is `start` plus the characters consumed so far.
    pub fn validate(
        &self,
        value: &str,
        start: usize,
        labels: &DiagnosticLabels,
        collector: &mut dyn DiagnosticsCollector,
    ) -> Result<(), CapabilityError> {
        let delimiter = self.policy.delimiter();
        let mut offset = start;
        let mut elements = value.split(delimiter).peekable();

        while let Some(element) = elements.next() {
            let is_last = elements.peek().is_none();
            if is_last && element.is_empty() {
                break;
            }
            self.delegate.validate(element, offset, labels, collector)?;
            offset += element.chars().count() + delimiter.len_utf8();
        }

        Ok(())
    }
}
