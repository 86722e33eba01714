//! Lazily discovered, per-session conversion capability.
//!
//! The bridge runs discovery at most once per session. Callers that arrive
//! while discovery is in flight block on the state lock and then observe its
//! outcome. `reset` takes the same lock, so a reader never sees a handle from
//! before the reset paired with a cache from after it.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use super::{contain_panic, CapabilityProvider, ConversionContext};
use crate::cache::ValidatorCache;
use crate::project::ProjectContext;

/// Where to look for a capability provider, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryPolicy {
    /// Implementation names tried first, in order.
    pub well_known_providers: Vec<String>,
    /// Interface name used for the service scan when no well-known provider loads.
    pub provider_interface: String,
}

#[derive(Default)]
struct CapabilityState {
    resolved: bool,
    handle: Option<Arc<dyn ConversionContext>>,
    discoveries: usize,
}

/// Bridge between a session and its project's conversion capability.
pub struct CapabilityBridge {
    project: Arc<dyn ProjectContext>,
    policy: DiscoveryPolicy,
    state: Mutex<CapabilityState>,
    cache: ValidatorCache,
}

impl CapabilityBridge {
    pub fn new(project: Arc<dyn ProjectContext>, policy: DiscoveryPolicy) -> Self {
        Self {
            project,
            policy,
            state: Mutex::new(CapabilityState::default()),
            cache: ValidatorCache::new(),
        }
    }

    /// The conversion handle, running discovery on first use.
    ///
    /// `None` means no provider could be found or built. That outcome is
    /// sticky until [`reset`](Self::reset).
    pub fn get_capability(&self) -> Option<Arc<dyn ConversionContext>> {
        self.capability_with_epoch().0
    }

    /// The conversion handle paired with the cache epoch it belongs to.
    ///
    /// Both are read under the state lock, so a validator built from this
    /// handle and stored at this epoch can never outlive a [`reset`](Self::reset).
    pub fn capability_with_epoch(&self) -> (Option<Arc<dyn ConversionContext>>, u64) {
        let mut state = self.state.lock();
        if !state.resolved {
            state.handle = self.discover();
            state.resolved = true;
            state.discoveries += 1;
        }
        (state.handle.clone(), self.cache.epoch())
    }

    /// Whether a usable handle exists, forcing discovery if not yet attempted.
    pub fn has_capability(&self) -> bool {
        self.get_capability().is_some()
    }

    /// Forget the handle and every cached validator.
    ///
    /// Call when the project's classpath changes. The next request runs
    /// discovery again.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.resolved = false;
        state.handle = None;
        self.cache.clear();
        debug!(project = self.project.name(), "capability reset");
    }

    /// Number of discovery runs so far.
    pub fn discoveries(&self) -> usize {
        self.state.lock().discoveries
    }

    pub fn cache(&self) -> &ValidatorCache {
        &self.cache
    }

    pub fn project(&self) -> &dyn ProjectContext {
        self.project.as_ref()
    }

    pub fn policy(&self) -> &DiscoveryPolicy {
        &self.policy
    }

    /// Try well-known providers, then the service scan. First context built wins.
    fn discover(&self) -> Option<Arc<dyn ConversionContext>> {
        let project = self.project.as_ref();

        for name in &self.policy.well_known_providers {
            match contain_panic("load_provider", || project.load_provider(name)) {
                Ok(Some(provider)) => {
                    if let Some(context) = self.build(provider.as_ref()) {
                        return Some(context);
                    }
                }
                Ok(None) => trace!(provider = %name, "well-known provider not on classpath"),
                Err(error) => info!(provider = %name, %error, "cannot load capability provider"),
            }
        }

        let interface = &self.policy.provider_interface;
        match contain_panic("discover_providers", || project.discover_providers(interface)) {
            Ok(providers) => {
                for provider in providers {
                    if let Some(context) = self.build(provider.as_ref()) {
                        return Some(context);
                    }
                }
            }
            Err(error) => info!(%interface, %error, "service scan for capability providers failed"),
        }

        warn!(project = project.name(), "no conversion capability provider found");
        None
    }

    fn build(&self, provider: &dyn CapabilityProvider) -> Option<Arc<dyn ConversionContext>> {
        let project = self.project.as_ref();
        match contain_panic("build_context", || provider.build_context(project)) {
            Ok(context) => {
                info!(
                    project = project.name(),
                    provider = provider.name(),
                    "loaded conversion capability"
                );
                Some(context)
            }
            Err(error) => {
                info!(provider = provider.name(), %error, "cannot build conversion context");
                None
            }
        }
    }
}

impl std::fmt::Debug for CapabilityBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CapabilityBridge")
            .field("project", &self.project.name())
            .field("resolved", &state.resolved)
            .field("provider", &state.handle.as_ref().map(|h| h.provider().to_string()))
            .field("cached_validators", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Conversion;
    use crate::error::CapabilityError;
    use crate::project::StaticProject;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const INTERFACE: &str = "spi.Resolver";

    struct AcceptAll(String);

    impl ConversionContext for AcceptAll {
        fn provider(&self) -> &str {
            &self.0
        }
        fn can_convert(&self, _type_name: &str) -> bool {
            true
        }
        fn convert(&self, _value: &str, _type_name: &str) -> Result<Conversion, CapabilityError> {
            Ok(Conversion::Accepted)
        }
    }

    /// Provider whose build either succeeds, fails, or panics; counts builds.
    struct TestProvider {
        name: &'static str,
        mode: Mode,
        builds: Arc<AtomicUsize>,
    }

    #[derive(Clone, Copy)]
    enum Mode {
        Ok,
        Fail,
        Panic,
    }

    impl TestProvider {
        fn new(name: &'static str, mode: Mode) -> (Self, Arc<AtomicUsize>) {
            let builds = Arc::new(AtomicUsize::new(0));
            let provider = Self {
                name,
                mode,
                builds: Arc::clone(&builds),
            };
            (provider, builds)
        }
    }

    impl CapabilityProvider for TestProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn build_context(
            &self,
            _project: &dyn ProjectContext,
        ) -> Result<Arc<dyn ConversionContext>, CapabilityError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                Mode::Ok => Ok(Arc::new(AcceptAll(self.name.to_string()))),
                Mode::Fail => Err(CapabilityError::Build {
                    provider: self.name.to_string(),
                    reason: "missing config".into(),
                }),
                Mode::Panic => panic!("provider blew up"),
            }
        }
    }

    fn policy(well_known: &[&str]) -> DiscoveryPolicy {
        DiscoveryPolicy {
            well_known_providers: well_known.iter().map(|s| s.to_string()).collect(),
            provider_interface: INTERFACE.to_string(),
        }
    }

    fn provider_name(bridge: &CapabilityBridge) -> Option<String> {
        bridge.get_capability().map(|c| c.provider().to_string())
    }

    #[test]
    fn well_known_provider_wins() {
        let (known, _) = TestProvider::new("known", Mode::Ok);
        let (service, service_builds) = TestProvider::new("service", Mode::Ok);
        let project = StaticProject::new("app")
            .with_provider(known)
            .with_service(INTERFACE, Arc::new(service));

        let bridge = CapabilityBridge::new(Arc::new(project), policy(&["known"]));
        assert_eq!(provider_name(&bridge).as_deref(), Some("known"));
        assert_eq!(service_builds.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn falls_back_to_service_scan() {
        let (service, _) = TestProvider::new("service", Mode::Ok);
        let project = StaticProject::new("app").with_service(INTERFACE, Arc::new(service));

        let bridge = CapabilityBridge::new(Arc::new(project), policy(&["missing"]));
        assert_eq!(provider_name(&bridge).as_deref(), Some("service"));
    }

    #[test]
    fn failing_and_panicking_candidates_are_skipped() {
        let (broken, _) = TestProvider::new("broken", Mode::Fail);
        let (explosive, _) = TestProvider::new("explosive", Mode::Panic);
        let (service, _) = TestProvider::new("service", Mode::Ok);
        let project = StaticProject::new("app")
            .with_provider(broken)
            .with_provider(explosive)
            .with_service(INTERFACE, Arc::new(service));

        let bridge = CapabilityBridge::new(Arc::new(project), policy(&["broken", "explosive"]));
        assert_eq!(provider_name(&bridge).as_deref(), Some("service"));
    }

    #[test]
    fn unavailable_is_sticky_until_reset() {
        let bridge = CapabilityBridge::new(Arc::new(StaticProject::new("app")), policy(&["x"]));

        assert!(!bridge.has_capability());
        assert!(!bridge.has_capability());
        assert_eq!(bridge.discoveries(), 1);

        bridge.reset();
        assert!(!bridge.has_capability());
        assert_eq!(bridge.discoveries(), 2);
    }

    #[test]
    fn discovery_runs_once_under_contention() {
        let (known, builds) = TestProvider::new("known", Mode::Ok);
        let project = StaticProject::new("app").with_provider(known);
        let bridge = CapabilityBridge::new(Arc::new(project), policy(&["known"]));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| assert!(bridge.has_capability()));
            }
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(bridge.discoveries(), 1);
    }

    #[test]
    fn reset_moves_the_epoch_with_the_handle() {
        let (known, _) = TestProvider::new("known", Mode::Ok);
        let project = StaticProject::new("app").with_provider(known);
        let bridge = CapabilityBridge::new(Arc::new(project), policy(&["known"]));

        let (first, epoch) = bridge.capability_with_epoch();
        assert!(first.is_some());
        assert_eq!(bridge.capability_with_epoch().1, epoch);

        bridge.reset();
        let (_, after) = bridge.capability_with_epoch();
        assert_ne!(after, epoch);
    }

    #[test]
    fn reset_rediscovers() {
        let (known, builds) = TestProvider::new("known", Mode::Ok);
        let project = StaticProject::new("app").with_provider(known);
        let bridge = CapabilityBridge::new(Arc::new(project), policy(&["known"]));

        let first = bridge.get_capability().unwrap();
        bridge.reset();
        let second = bridge.get_capability().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }
}
