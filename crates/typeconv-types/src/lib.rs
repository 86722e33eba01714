//! typeconv-types: pure data types shared across typeconv crates.
//!
//! - [`TypeDescriptor`]: parsed form of a generic type signature such as
//!   `java.util.Map<java.lang.String, java.util.List<java.lang.Integer>>`
//! - [`Diagnostic`] and [`DiagnosticsCollector`]: positional reports produced
//!   when a raw configuration value does not convert to its declared type
//!
//! Nothing here performs parsing or validation; see `typeconv-kernel`.

mod descriptor;
mod diagnostic;

pub use descriptor::TypeDescriptor;
pub use diagnostic::{Diagnostic, DiagnosticsCollector};
