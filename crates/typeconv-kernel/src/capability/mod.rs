//! Conversion capabilities supplied by the host project.
//!
//! A capability is an external facility that knows how to convert raw
//! strings into values of a target type, e.g. a MicroProfile Config
//! implementation found on a project's classpath. The kernel never
//! converts values itself; it asks a capability.
//!
//! ```text
//! ProjectContext ──load_provider / discover_providers──▶ CapabilityProvider
//!                                                            │ build_context
//!                                                            ▼
//!                                     CapabilityBridge ◀── ConversionContext (handle)
//! ```
//!
//! Capabilities are untrusted code. Every call into them goes through
//! [`contain_panic`] so a misbehaving provider cannot take the caller down.

mod bridge;
mod registry;

pub use bridge::{CapabilityBridge, DiscoveryPolicy};
pub use registry::ProviderRegistry;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::CapabilityError;
use crate::project::ProjectContext;

/// Outcome of converting one raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Accepted,
    /// The value does not convert. `message` is shown to the user verbatim.
    Rejected { message: String },
}

impl Conversion {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// A usable conversion handle, built once per session by a provider.
pub trait ConversionContext: Send + Sync {
    /// Name of the provider that built this context.
    fn provider(&self) -> &str;

    /// Whether a converter exists for `type_name`.
    fn can_convert(&self, type_name: &str) -> bool;

    /// Convert a single raw value.
    ///
    /// `Err` means the capability itself failed, not that the value is bad.
    fn convert(&self, value: &str, type_name: &str) -> Result<Conversion, CapabilityError>;
}

/// Factory for conversion contexts, discovered through a [`ProjectContext`].
pub trait CapabilityProvider: Send + Sync {
    /// Implementation name this provider is registered and discovered under.
    fn name(&self) -> &str;

    /// Build a conversion context bound to `project`.
    fn build_context(
        &self,
        project: &dyn ProjectContext,
    ) -> Result<Arc<dyn ConversionContext>, CapabilityError>;
}

/// Run a call into capability code, turning a panic into `CapabilityError::Panicked`.
pub(crate) fn contain_panic<T, E>(
    operation: &'static str,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E>
where
    E: From<CapabilityError>,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(CapabilityError::Panicked {
            operation,
            message: panic_message(payload.as_ref()),
        }
        .into())
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contain_panic_passes_results_through() {
        let ok: Result<u8, CapabilityError> = contain_panic("test", || Ok(7));
        assert_eq!(ok, Ok(7));

        let err: Result<u8, CapabilityError> = contain_panic("test", || {
            Err(CapabilityError::Discovery {
                reason: "nope".into(),
            })
        });
        assert!(matches!(err, Err(CapabilityError::Discovery { .. })));
    }

    #[test]
    fn contain_panic_converts_panics() {
        let result: Result<(), CapabilityError> =
            contain_panic("convert", || -> Result<(), CapabilityError> {
                panic!("converter exploded")
            });
        assert_eq!(
            result,
            Err(CapabilityError::Panicked {
                operation: "convert",
                message: "converter exploded".into(),
            })
        );
    }

    #[test]
    fn contain_panic_handles_formatted_payloads() {
        let code = 42;
        let result: Result<(), CapabilityError> =
            contain_panic("build", || -> Result<(), CapabilityError> {
                panic!("failed with {code}")
            });
        match result {
            Err(CapabilityError::Panicked { message, .. }) => assert_eq!(message, "failed with 42"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
