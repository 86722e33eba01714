//! Builtin capability providers.
//!
//! Used by the REPL and tests to stand in for a real MicroProfile Config
//! implementation on a project classpath.

mod standard;

pub use standard::{StandardContext, StandardConverters, STANDARD_CONVERTERS};

use std::sync::Arc;

use crate::capability::{CapabilityProvider, ProviderRegistry};
use crate::project::StaticProject;
use crate::session::DEFAULT_PROVIDER_INTERFACE;

/// Register every builtin provider, by name and as a service of the default
/// provider interface.
pub fn register_builtins(registry: &mut ProviderRegistry) {
    let standard: Arc<dyn CapabilityProvider> = Arc::new(StandardConverters);
    registry.register_arc(Arc::clone(&standard));
    registry.register_service(DEFAULT_PROVIDER_INTERFACE, standard);
}

/// A JDK-baseline project with the builtin providers registered.
pub fn standard_project(name: impl Into<String>) -> StaticProject {
    let mut project = StaticProject::new(name);
    register_builtins(project.providers_mut());
    project
}
