//! Error types for the typeconv kernel.
//!
//! Expected "value does not convert" outcomes are not errors; they are
//! reported as diagnostics. Errors here are structural (bad signatures,
//! unknown types) or come from the externally supplied capability.

use thiserror::Error;

/// A type signature that violates the signature grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset} in `{signature}`")]
pub struct SignatureSyntaxError {
    /// What went wrong, e.g. `expected '>', found end of input`.
    pub message: String,
    /// Character offset into `signature` where parsing stopped.
    pub offset: usize,
    /// The full signature being parsed.
    pub signature: String,
}

/// Failure turning a signature into a validator.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Syntax(#[from] SignatureSyntaxError),

    #[error("unknown type: {name}")]
    UnresolvableType { name: String },

    #[error("capability failed during resolution: {0}")]
    Capability(#[from] CapabilityError),
}

/// Failures raised by, or while locating, a conversion capability.
///
/// None of these reach users of `ConverterSession::validate`; they are
/// logged and validation degrades to producing no diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("capability provider {name} is not available")]
    ProviderUnavailable { name: String },

    #[error("provider {provider} could not build a conversion context: {reason}")]
    Build { provider: String, reason: String },

    #[error("conversion to {type_name} failed unexpectedly: {reason}")]
    Conversion { type_name: String, reason: String },

    #[error("provider discovery failed: {reason}")]
    Discovery { reason: String },

    #[error("capability panicked during {operation}: {message}")]
    Panicked {
        operation: &'static str,
        message: String,
    },
}
