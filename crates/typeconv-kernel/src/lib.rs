//! typeconv-kernel: checks raw configuration values against Java type signatures.
//!
//! This crate provides:
//!
//! - **Parser**: turns `java.util.List<java.lang.Integer>` into a [`TypeDescriptor`]
//! - **Resolver**: maps a descriptor onto a [`Validator`] tree by shape
//! - **Capability**: discovers and wraps the project's conversion facility
//! - **Cache**: per-session validators keyed by signature
//! - **Session**: the `validate` entry point and its lifecycle
//!
//! ```text
//! signature ──parse──▶ TypeDescriptor ──resolve──▶ Validator ──validate(value)──▶ Diagnostics
//!                                          ▲
//!                                 CapabilityBridge (once per session)
//! ```

pub mod builtin;
pub mod cache;
pub mod capability;
pub mod error;
pub mod parser;
pub mod project;
pub mod resolver;
pub mod runtime;
pub mod session;
pub mod validator;

pub use capability::{
    CapabilityBridge, CapabilityProvider, Conversion, ConversionContext, DiscoveryPolicy,
    ProviderRegistry,
};
pub use error::{CapabilityError, ResolveError, SignatureSyntaxError};
pub use parser::parse_signature;
pub use project::{ProjectContext, StaticProject};
pub use resolver::ConverterResolver;
pub use runtime::ProjectRuntimes;
pub use session::{ConverterSession, SessionConfig};
pub use validator::Validator;

pub use typeconv_types::{Diagnostic, DiagnosticsCollector, TypeDescriptor};
