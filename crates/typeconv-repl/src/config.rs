//! REPL configuration, read from `$XDG_CONFIG_HOME/typeconv/config.toml`.
//!
//! ```toml
//! project = "billing"
//! signature = "java.util.List<java.lang.Integer>"
//! extra_types = ["com.example.Money"]
//! builtin_provider = true
//!
//! [session]
//! well_known_providers = ["io.smallrye.config.SmallRyeConfigProviderResolver"]
//! diagnostic_source = "microprofile"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use typeconv_kernel::builtin::register_builtins;
use typeconv_kernel::{SessionConfig, StaticProject};

use crate::paths;

/// Everything the REPL reads from its config file. Missing keys use defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplConfig {
    /// Name of the in-memory project.
    pub project: String,
    /// Signature selected at startup.
    pub signature: Option<String>,
    /// Types added to the project on top of the JDK baseline.
    pub extra_types: Vec<String>,
    /// Register the builtin standard converters as a discoverable provider.
    pub builtin_provider: bool,
    pub session: SessionOverrides,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            project: "repl".to_string(),
            signature: None,
            extra_types: Vec::new(),
            builtin_provider: true,
            session: SessionOverrides::default(),
        }
    }
}

/// Optional overrides of the kernel's [`SessionConfig`] defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionOverrides {
    pub well_known_providers: Option<Vec<String>>,
    pub provider_interface: Option<String>,
    pub diagnostic_source: Option<String>,
    pub diagnostic_code: Option<String>,
}

impl ReplConfig {
    /// Load from the XDG config file, or defaults if there is none.
    pub fn load() -> Result<Self> {
        let path = paths::config_file();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::named(&self.project);
        let overrides = &self.session;
        if let Some(providers) = &overrides.well_known_providers {
            config = config.with_well_known_providers(providers.clone());
        }
        if let Some(interface) = &overrides.provider_interface {
            config = config.with_provider_interface(interface);
        }
        if let Some(source) = &overrides.diagnostic_source {
            config = config.with_diagnostic_source(source);
        }
        if let Some(code) = &overrides.diagnostic_code {
            config = config.with_diagnostic_code(code);
        }
        config
    }

    /// Build the in-memory project this config describes.
    pub fn project(&self) -> StaticProject {
        let mut project = StaticProject::new(&self.project);
        for name in &self.extra_types {
            project.add_type(name.as_str());
        }
        if self.builtin_provider {
            register_builtins(project.providers_mut());
        }
        project
    }
}
