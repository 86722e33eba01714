//! Registry of capability providers known to a project.
//!
//! Providers are looked up two ways: directly by implementation name (the
//! well-known list), or as ordered services registered against a provider
//! interface name (the service scan).

use std::collections::HashMap;
use std::sync::Arc;

use super::CapabilityProvider;

/// Providers available on a project's classpath.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn CapabilityProvider>>,
    services: HashMap<String, Vec<Arc<dyn CapabilityProvider>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own name.
    pub fn register(&mut self, provider: impl CapabilityProvider + 'static) {
        self.register_arc(Arc::new(provider));
    }

    /// Register a provider that's already in an Arc.
    pub fn register_arc(&mut self, provider: Arc<dyn CapabilityProvider>) {
        let name = provider.name().to_string();
        self.providers.insert(name, provider);
    }

    /// Register a provider as an implementation of `interface`.
    ///
    /// Service order is registration order, which is also discovery order.
    pub fn register_service(&mut self, interface: &str, provider: Arc<dyn CapabilityProvider>) {
        self.services
            .entry(interface.to_string())
            .or_default()
            .push(provider);
    }

    /// Look up a provider by implementation name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn CapabilityProvider>> {
        self.providers.get(name).cloned()
    }

    /// All providers registered for `interface`, in registration order.
    pub fn services(&self, interface: &str) -> Vec<Arc<dyn CapabilityProvider>> {
        self.services.get(interface).cloned().unwrap_or_default()
    }

    /// Check if a provider exists.
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// List all provider names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Number of providers registered by name.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty() && self.services.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let services: Vec<_> = self
            .services
            .iter()
            .map(|(interface, providers)| (interface.as_str(), providers.len()))
            .collect();
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .field("services", &services)
            .finish()
    }
}
