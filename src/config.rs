mod loader;

pub use loader::{ConfigLoader, DEFAULT_CONFIG_TOML, DEFAULT_ENV_PREFIX, DEFAULT_NAMESPACE};

use alloc::string::String;
use serde::{Deserialize, Serialize};

/// Cache key used when none is configured
pub const DEFAULT_CACHE_KEY: &str = "meltingServer.schema.tree";
/// Resource version used when none is configured
pub const DEFAULT_VERSION: &str = "latest";

/// Options of a provisioner
/// ## Fields
/// - `is_cached`:
///   If `false`, every provisioning builds a fresh resource and the cache store isn't touched.
/// - `cache_key`:
///   Key the resource is stored under.
/// - `version`:
///   Passed to the builder. Changing it doesn't refresh an already cached resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    #[serde(alias = "isCached")]
    pub is_cached: bool,
    #[serde(alias = "cacheKey")]
    pub cache_key: String,
    pub version: String,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            is_cached: true,
            cache_key: DEFAULT_CACHE_KEY.into(),
            version: DEFAULT_VERSION.into(),
        }
    }
}

impl ProvisionConfig {
    #[inline]
    #[must_use]
    pub fn with_cached(mut self, is_cached: bool) -> Self {
        self.is_cached = is_cached;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_cache_key(mut self, cache_key: impl Into<String>) -> Self {
        self.cache_key = cache_key.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// Config for a registry entry
/// ## Fields
/// - `cache_provides`:
///   If `true`, the resource resolved from the registry is kept and reused for the registry lifetime,
///   independently of the cache store.
/// - `exclusive`:
///   If `true`, population of the cache store is serialized per cache key within the process,
///   so concurrent misses build the resource once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub cache_provides: bool,
    pub exclusive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_provides: true,
            exclusive: false,
        }
    }
}
