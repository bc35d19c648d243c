use alloc::{format, string::String};
use figment::{
    providers::{Env, Format as _, Toml},
    Figment,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use super::ProvisionConfig;
use crate::errors::ConfigErrorKind;

/// Default configuration template, as published by [`crate::Publisher::default_config`]
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../config/default.toml");
/// Table the provisioning options live in
pub const DEFAULT_NAMESPACE: &str = "schema";
/// Prefix of environment variables, e.g. `PROVISIO_SCHEMA__IS_CACHED=false`
pub const DEFAULT_ENV_PREFIX: &str = "PROVISIO";

/// Loads [`ProvisionConfig`] once, at startup.
///
/// Sources are merged in this order (later sources override earlier):
/// 1. TOML file, if specified and exists
/// 2. Environment variables `{prefix}_{NAMESPACE}__{KEY}`
///
/// Options absent from every source take their [`ProvisionConfig::default`] values.
#[derive(Clone, Debug)]
pub struct ConfigLoader {
    namespace: String,
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.into(),
            config_path: None,
            env_prefix: DEFAULT_ENV_PREFIX.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    #[must_use]
    pub fn figment(&self) -> Figment {
        let mut figment = Figment::new();

        if let Some(path) = &self.config_path {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
                debug!(path = %path.display(), "Config file merged");
            } else {
                debug!(path = %path.display(), "Config file not found, skipped");
            }
        }

        figment.merge(Env::prefixed(&format!("{}_", self.env_prefix)).split("__"))
    }

    /// # Errors
    /// Returns [`ConfigErrorKind::Extract`] if an option is present but has the wrong shape,
    /// e.g. a non-boolean `is_cached`.
    pub fn load(&self) -> Result<ProvisionConfig, ConfigErrorKind> {
        let figment = self.figment();
        // Missing options fall back to `#[serde(default)]`, so aliased keys never collide with defaults
        if !figment.contains(&self.namespace) {
            debug!(namespace = %self.namespace, "No options configured, defaults used");
            return Ok(ProvisionConfig::default());
        }

        match figment.extract_inner::<ProvisionConfig>(&self.namespace) {
            Ok(config) => {
                debug!(?config, namespace = %self.namespace, "Config loaded");
                Ok(config)
            }
            Err(err) => {
                let err = ConfigErrorKind::from(err);
                error!("{}", err);
                Err(err)
            }
        }
    }
}
