//! The host project seen by the kernel: known types and capability providers.
//!
//! Real integrations back [`ProjectContext`] with a build tool's classpath.
//! [`StaticProject`] is an in-memory model used by the REPL and tests.

use std::collections::HashSet;
use std::sync::Arc;

use crate::capability::{CapabilityProvider, ProviderRegistry};
use crate::error::CapabilityError;

/// Class-name resolution and provider discovery for one project.
pub trait ProjectContext: Send + Sync {
    /// Project name, used for logging and as the session key.
    fn name(&self) -> &str;

    /// Whether `name` resolves to a type on the project classpath.
    ///
    /// Not consulted for primitive names like `int`.
    fn contains_type(&self, name: &str) -> bool;

    /// Load a provider by implementation name.
    ///
    /// `Ok(None)` means the implementation is simply not on the classpath.
    fn load_provider(
        &self,
        implementation: &str,
    ) -> Result<Option<Arc<dyn CapabilityProvider>>, CapabilityError>;

    /// Scan for providers registered against `interface`, in discovery order.
    fn discover_providers(
        &self,
        interface: &str,
    ) -> Result<Vec<Arc<dyn CapabilityProvider>>, CapabilityError>;
}

/// Types every JVM classpath carries.
pub const JDK_TYPES: &[&str] = &[
    "java.lang.Object",
    "java.lang.String",
    "java.lang.CharSequence",
    "java.lang.Boolean",
    "java.lang.Byte",
    "java.lang.Short",
    "java.lang.Integer",
    "java.lang.Long",
    "java.lang.Float",
    "java.lang.Double",
    "java.lang.Character",
    "java.util.List",
    "java.util.Set",
    "java.util.Map",
    "java.util.Optional",
    "java.util.function.Supplier",
];

/// In-memory project: a fixed set of type names plus a provider registry.
#[derive(Debug, Clone)]
pub struct StaticProject {
    name: String,
    types: HashSet<String>,
    providers: ProviderRegistry,
}

impl StaticProject {
    /// A project whose classpath holds the JDK baseline and no providers.
    pub fn new(name: impl Into<String>) -> Self {
        let mut project = Self::empty(name);
        project.types.extend(JDK_TYPES.iter().map(|t| t.to_string()));
        project
    }

    /// A project with nothing on its classpath.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: HashSet::new(),
            providers: ProviderRegistry::new(),
        }
    }

    /// Add a type name to the classpath.
    pub fn add_type(&mut self, name: impl Into<String>) {
        self.types.insert(name.into());
    }

    pub fn with_type(mut self, name: impl Into<String>) -> Self {
        self.add_type(name);
        self
    }

    /// Add a provider reachable by its implementation name.
    pub fn with_provider(mut self, provider: impl CapabilityProvider + 'static) -> Self {
        self.providers.register(provider);
        self
    }

    /// Add a provider reachable only through a service scan of `interface`.
    pub fn with_service(mut self, interface: &str, provider: Arc<dyn CapabilityProvider>) -> Self {
        self.providers.register_service(interface, provider);
        self
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn providers_mut(&mut self) -> &mut ProviderRegistry {
        &mut self.providers
    }

    /// Sorted list of known type names (for debugging).
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.types.iter().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

impl ProjectContext for StaticProject {
    fn name(&self) -> &str {
        &self.name
    }

    fn contains_type(&self, name: &str) -> bool {
        self.types.contains(name)
    }

    fn load_provider(
        &self,
        implementation: &str,
    ) -> Result<Option<Arc<dyn CapabilityProvider>>, CapabilityError> {
        Ok(self.providers.get(implementation))
    }

    fn discover_providers(
        &self,
        interface: &str,
    ) -> Result<Vec<Arc<dyn CapabilityProvider>>, CapabilityError> {
        Ok(self.providers.services(interface))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_has_jdk_baseline() {
        let project = StaticProject::new("app");
        assert!(project.contains_type("java.lang.Integer"));
        assert!(project.contains_type("java.util.List"));
        assert!(!project.contains_type("com.example.Money"));
        assert_eq!(project.name(), "app");
    }

    #[test]
    fn empty_knows_nothing() {
        let project = StaticProject::empty("bare");
        assert!(!project.contains_type("java.lang.String"));
        assert!(project.type_names().is_empty());
    }

    #[test]
    fn added_types_resolve() {
        let project = StaticProject::new("app").with_type("com.example.Money");
        assert!(project.contains_type("com.example.Money"));
    }

    #[test]
    fn missing_provider_is_not_an_error() {
        let project = StaticProject::new("app");
        assert!(matches!(project.load_provider("com.example.Missing"), Ok(None)));
        assert!(project
            .discover_providers("com.example.spi.Resolver")
            .map(|found| found.is_empty())
            .unwrap_or(false));
    }
}
