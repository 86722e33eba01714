//! Validator trees: composable checks built from a type descriptor.
//!
//! A validator never parses or resolves anything. It walks a raw value and
//! asks the conversion capability about each scalar piece, reporting
//! failures as diagnostics positioned within the owning document.
//!
//! - **Scalar**: one conversion check for one raw type name
//! - **Collection**: comma-splits the value and validates each element
//! - **PassThrough**: forwards unchanged, for wrappers like `Optional<T>`

mod collection;

pub use collection::{CollectionValidator, SplitPolicy};

use std::fmt;
use std::sync::Arc;

use typeconv_types::{Diagnostic, DiagnosticsCollector};

use crate::capability::{Conversion, ConversionContext};
use crate::error::CapabilityError;

/// Source and code stamped on every diagnostic a validator emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticLabels {
    pub source: String,
    pub code: String,
}

impl DiagnosticLabels {
    pub fn new(source: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            code: code.into(),
        }
    }
}

/// A resolved validation strategy for one type signature.
#[derive(Debug)]
pub enum Validator {
    Scalar(ScalarValidator),
    Collection(CollectionValidator),
    PassThrough(Box<Validator>),
}

impl Validator {
    pub fn scalar(type_name: impl Into<String>, conversion: Option<Arc<dyn ConversionContext>>) -> Self {
        Self::Scalar(ScalarValidator {
            type_name: type_name.into(),
            conversion,
        })
    }

    pub fn collection(delegate: Validator) -> Self {
        Self::Collection(CollectionValidator::new(delegate, SplitPolicy::Comma))
    }

    pub fn pass_through(delegate: Validator) -> Self {
        Self::PassThrough(Box::new(delegate))
    }

    /// Validate `value`, which starts at absolute offset `start`.
    ///
    /// Diagnostics are appended to `collector` left to right. `Err` means the
    /// capability failed; diagnostics already collected should be discarded.
    pub fn validate(
        &self,
        value: &str,
        start: usize,
        labels: &DiagnosticLabels,
        collector: &mut dyn DiagnosticsCollector,
    ) -> Result<(), CapabilityError> {
        match self {
            Validator::Scalar(scalar) => scalar.validate(value, start, labels, collector),
            Validator::Collection(collection) => {
                collection.validate(value, start, labels, collector)
            }
            Validator::PassThrough(delegate) => delegate.validate(value, start, labels, collector),
        }
    }

    /// Whether validating can ever produce a diagnostic.
    pub fn can_validate(&self) -> bool {
        match self {
            Validator::Scalar(scalar) => scalar.can_validate(),
            Validator::Collection(collection) => collection.delegate().can_validate(),
            Validator::PassThrough(delegate) => delegate.can_validate(),
        }
    }
}

/// S-expression form, e.g. `(collection (scalar int))`.
impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Scalar(scalar) => {
                write!(f, "(scalar {}", scalar.type_name())?;
                if !scalar.can_validate() {
                    f.write_str(" unchecked")?;
                }
                f.write_str(")")
            }
            Validator::Collection(collection) => write!(f, "(collection {})", collection.delegate()),
            Validator::PassThrough(delegate) => write!(f, "(pass {delegate})"),
        }
    }
}

/// Converts a whole value to one raw type through the capability.
pub struct ScalarValidator {
    type_name: String,
    /// `None` when the capability is unavailable or has no converter for the type.
    conversion: Option<Arc<dyn ConversionContext>>,
}

impl ScalarValidator {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Name of the provider whose context this validator converts through.
    pub fn provider(&self) -> Option<&str> {
        self.conversion.as_ref().map(|c| c.provider())
    }

    pub fn can_validate(&self) -> bool {
        self.conversion.is_some()
    }

    fn validate(
        &self,
        value: &str,
        start: usize,
        labels: &DiagnosticLabels,
        collector: &mut dyn DiagnosticsCollector,
    ) -> Result<(), CapabilityError> {
        let Some(conversion) = &self.conversion else {
            return Ok(());
        };

        if let Conversion::Rejected { message } = conversion.convert(value, &self.type_name)? {
            let end = start + value.chars().count();
            collector.collect(Diagnostic::new(
                message,
                labels.source.as_str(),
                labels.code.as_str(),
                start,
                end,
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ScalarValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarValidator")
            .field("type_name", &self.type_name)
            .field("provider", &self.provider())
            .finish()
    }
}
