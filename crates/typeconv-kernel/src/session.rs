//! Per-project validation sessions.
//!
//! A [`ConverterSession`] owns one capability bridge and its validator cache.
//! Sessions are independent: resetting one never touches another.

use std::sync::Arc;

use tracing::{debug, warn};
use typeconv_types::{Diagnostic, DiagnosticsCollector};

use crate::capability::{contain_panic, CapabilityBridge, DiscoveryPolicy};
use crate::error::ResolveError;
use crate::parser::parse_signature;
use crate::project::ProjectContext;
use crate::resolver::ConverterResolver;
use crate::validator::{DiagnosticLabels, Validator};

/// Implementation name tried before any service scan.
pub const DEFAULT_WELL_KNOWN_PROVIDERS: &[&str] =
    &["io.smallrye.config.SmallRyeConfigProviderResolver"];

/// Interface scanned for providers when no well-known one loads.
pub const DEFAULT_PROVIDER_INTERFACE: &str =
    "org.eclipse.microprofile.config.spi.ConfigProviderResolver";

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Session name, used in logs.
    pub name: String,

    /// Provider implementation names tried first, in order.
    pub well_known_providers: Vec<String>,

    /// Interface used for the fallback service scan.
    pub provider_interface: String,

    /// Source stamped on every diagnostic.
    pub diagnostic_source: String,

    /// Code stamped on every diagnostic.
    pub diagnostic_code: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            well_known_providers: DEFAULT_WELL_KNOWN_PROVIDERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            provider_interface: DEFAULT_PROVIDER_INTERFACE.to_string(),
            diagnostic_source: "typeconv".to_string(),
            diagnostic_code: "value".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_well_known_providers(mut self, providers: Vec<String>) -> Self {
        self.well_known_providers = providers;
        self
    }

    pub fn with_provider_interface(mut self, interface: impl Into<String>) -> Self {
        self.provider_interface = interface.into();
        self
    }

    pub fn with_diagnostic_source(mut self, source: impl Into<String>) -> Self {
        self.diagnostic_source = source.into();
        self
    }

    pub fn with_diagnostic_code(mut self, code: impl Into<String>) -> Self {
        self.diagnostic_code = code.into();
        self
    }

    pub fn discovery_policy(&self) -> DiscoveryPolicy {
        DiscoveryPolicy {
            well_known_providers: self.well_known_providers.clone(),
            provider_interface: self.provider_interface.clone(),
        }
    }

    pub fn labels(&self) -> DiagnosticLabels {
        DiagnosticLabels::new(&self.diagnostic_source, &self.diagnostic_code)
    }
}

/// Validates raw values against type signatures for one project.
#[derive(Debug)]
pub struct ConverterSession {
    config: SessionConfig,
    labels: DiagnosticLabels,
    bridge: CapabilityBridge,
}

impl ConverterSession {
    pub fn new(project: Arc<dyn ProjectContext>, config: SessionConfig) -> Self {
        let bridge = CapabilityBridge::new(project, config.discovery_policy());
        let labels = config.labels();
        Self {
            config,
            labels,
            bridge,
        }
    }

    /// Validate `value`, found at offset `start` of its document, against `signature`.
    ///
    /// Never fails. A malformed signature or unknown type is logged and
    /// yields no diagnostics, as does any failure of the capability.
    pub fn validate(
        &self,
        value: &str,
        signature: &str,
        start: usize,
        collector: &mut dyn DiagnosticsCollector,
    ) {
        match self.try_validate(value, signature, start, collector) {
            Ok(()) => {}
            Err(error @ (ResolveError::Syntax(_) | ResolveError::UnresolvableType { .. })) => {
                warn!(session = %self.config.name, signature, %error, "cannot validate value");
            }
            Err(ResolveError::Capability(error)) => {
                debug!(session = %self.config.name, signature, %error, "capability failed; no diagnostics");
            }
        }
    }

    /// Like [`validate`](Self::validate) but reports why validation did not run.
    ///
    /// Diagnostics reach `collector` only when the whole value was checked.
    pub fn try_validate(
        &self,
        value: &str,
        signature: &str,
        start: usize,
        collector: &mut dyn DiagnosticsCollector,
    ) -> Result<(), ResolveError> {
        let Some(validator) = self.validator_for(signature)? else {
            return Ok(());
        };

        let mut pending: Vec<Diagnostic> = Vec::new();
        contain_panic("convert", || {
            validator.validate(value, start, &self.labels, &mut pending)
        })?;

        for diagnostic in pending {
            collector.collect(diagnostic);
        }
        Ok(())
    }

    /// The cached validator for `signature`, resolving it on first use.
    ///
    /// `Ok(None)` when no capability is available; nothing is cached then.
    pub fn validator_for(&self, signature: &str) -> Result<Option<Arc<Validator>>, ResolveError> {
        let cache = self.bridge.cache();
        if let Some(found) = cache.get(signature) {
            return Ok(Some(found));
        }

        let (Some(conversion), epoch) = self.bridge.capability_with_epoch() else {
            return Ok(None);
        };

        let validator = cache.get_or_try_insert_at(epoch, signature, || {
            contain_panic("resolve", || {
                let descriptor = parse_signature(signature)?;
                ConverterResolver::new(self.bridge.project(), Some(Arc::clone(&conversion)))
                    .resolve(&descriptor)
            })
        })?;
        debug!(session = %self.config.name, signature, validator = %validator, "validator ready");
        Ok(Some(validator))
    }

    /// Whether a conversion capability is available, discovering it if needed.
    pub fn has_capability(&self) -> bool {
        self.bridge.has_capability()
    }

    /// Drop the capability handle and all cached validators.
    pub fn reset(&self) {
        self.bridge.reset();
    }

    /// Number of validators currently cached.
    pub fn cached_validators(&self) -> usize {
        self.bridge.cache().len()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn bridge(&self) -> &CapabilityBridge {
        &self.bridge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{CapabilityProvider, Conversion, ConversionContext};
    use crate::error::CapabilityError;
    use crate::project::StaticProject;
    use crate::validator::tests::DigitsOnly;

    struct Digits;

    impl CapabilityProvider for Digits {
        fn name(&self) -> &str {
            "digits"
        }

        fn build_context(
            &self,
            _project: &dyn ProjectContext,
        ) -> Result<Arc<dyn ConversionContext>, CapabilityError> {
            Ok(Arc::new(DigitsOnly))
        }
    }

    /// Converts `int` but panics on the value "boom" and errors on "fail".
    struct Treacherous;

    impl ConversionContext for Treacherous {
        fn provider(&self) -> &str {
            "treacherous"
        }

        fn can_convert(&self, type_name: &str) -> bool {
            type_name == "int"
        }

        fn convert(&self, value: &str, type_name: &str) -> Result<Conversion, CapabilityError> {
            match value {
                "boom" => panic!("conversion exploded"),
                "fail" => Err(CapabilityError::Conversion {
                    type_name: type_name.to_string(),
                    reason: "classloader closed".into(),
                }),
                _ => Ok(Conversion::rejected("bad")),
            }
        }
    }

    impl CapabilityProvider for Treacherous {
        fn name(&self) -> &str {
            "treacherous"
        }

        fn build_context(
            &self,
            _project: &dyn ProjectContext,
        ) -> Result<Arc<dyn ConversionContext>, CapabilityError> {
            Ok(Arc::new(Treacherous))
        }
    }

    fn session_with(provider: impl CapabilityProvider + 'static) -> ConverterSession {
        let name = provider.name().to_string();
        let project = StaticProject::new("app").with_provider(provider);
        let config = SessionConfig::named("test").with_well_known_providers(vec![name]);
        ConverterSession::new(Arc::new(project), config)
    }

    fn diagnostics(session: &ConverterSession, value: &str, signature: &str) -> Vec<Diagnostic> {
        let mut collected: Vec<Diagnostic> = Vec::new();
        session.validate(value, signature, 0, &mut collected);
        collected
    }

    #[test]
    fn default_config_targets_microprofile() {
        let config = SessionConfig::default();
        assert_eq!(
            config.well_known_providers,
            vec!["io.smallrye.config.SmallRyeConfigProviderResolver".to_string()]
        );
        assert_eq!(
            config.provider_interface,
            "org.eclipse.microprofile.config.spi.ConfigProviderResolver"
        );
        assert_eq!(config.labels(), DiagnosticLabels::new("typeconv", "value"));
    }

    #[test]
    fn diagnostics_carry_configured_labels() {
        let project = StaticProject::new("app").with_provider(Digits);
        let config = SessionConfig::named("test")
            .with_well_known_providers(vec!["digits".into()])
            .with_diagnostic_source("microprofile")
            .with_diagnostic_code("InvalidValue");
        let session = ConverterSession::new(Arc::new(project), config);

        let found = diagnostics(&session, "x", "int");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source, "microprofile");
        assert_eq!(found[0].code, "InvalidValue");
    }

    #[test]
    fn malformed_signature_is_silent_but_reported_by_try() {
        let session = session_with(Digits);
        assert!(diagnostics(&session, "x", "java.util.List<int").is_empty());

        let mut sink: Vec<Diagnostic> = Vec::new();
        let result = session.try_validate("x", "java.util.List<int", 0, &mut sink);
        assert!(matches!(result, Err(ResolveError::Syntax(_))));
        assert_eq!(session.cached_validators(), 0);
    }

    #[test]
    fn unknown_type_is_silent() {
        let session = session_with(Digits);
        assert!(diagnostics(&session, "x", "com.example.Money").is_empty());
        assert!(matches!(
            session.validator_for("com.example.Money"),
            Err(ResolveError::UnresolvableType { .. })
        ));
    }

    #[test]
    fn no_capability_means_no_diagnostics_and_no_cache() {
        let session = ConverterSession::new(Arc::new(StaticProject::new("app")), SessionConfig::default());
        assert!(diagnostics(&session, "x", "int").is_empty());
        assert!(matches!(session.validator_for("int"), Ok(None)));
        assert!(!session.has_capability());
        assert_eq!(session.cached_validators(), 0);
    }

    #[test]
    fn capability_panic_discards_partial_diagnostics() {
        let session = session_with(Treacherous);
        // "x" would be rejected, but "boom" panics afterwards.
        assert!(diagnostics(&session, "x,boom", "int[]").is_empty());

        let mut sink: Vec<Diagnostic> = Vec::new();
        let result = session.try_validate("x,boom", "int[]", 0, &mut sink);
        assert!(matches!(
            result,
            Err(ResolveError::Capability(CapabilityError::Panicked { .. }))
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn capability_error_discards_partial_diagnostics() {
        let session = session_with(Treacherous);
        assert!(diagnostics(&session, "x,fail", "int[]").is_empty());
        assert_eq!(diagnostics(&session, "x,y", "int[]").len(), 2);
    }

    #[test]
    fn validator_is_cached_per_signature() {
        let session = session_with(Digits);
        let first = session.validator_for("int[]").unwrap().unwrap();
        let second = session.validator_for("int[]").unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(session.bridge().cache().builds(), 1);
        assert_eq!(session.cached_validators(), 1);
    }

    #[test]
    fn reset_empties_cache() {
        let session = session_with(Digits);
        let before = session.validator_for("int").unwrap().unwrap();
        session.reset();
        assert_eq!(session.cached_validators(), 0);

        let after = session.validator_for("int").unwrap().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(session.bridge().discoveries(), 2);
    }
}
