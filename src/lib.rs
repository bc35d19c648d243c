//! Cache-backed singleton provisioning.
//!
//! A [`Provisioner`] returns a resource from a [`CacheStore`] or builds it once with its configured version
//! and stores it without expiry. A [`Registry`] holds one provisioner per resource type
//! and resolves resources on demand.

extern crate alloc;

pub(crate) mod any;
pub(crate) mod builder;
pub(crate) mod config;
pub(crate) mod errors;
pub(crate) mod expiry;
pub(crate) mod lock;
pub(crate) mod provisioner;
pub(crate) mod publish;
pub(crate) mod registry;
pub(crate) mod store;

pub use any::{RcAny, TypeInfo};
pub use builder::{instance, Builder};
pub use config::{
    Config, ConfigLoader, ProvisionConfig, DEFAULT_CACHE_KEY, DEFAULT_CONFIG_TOML, DEFAULT_ENV_PREFIX, DEFAULT_NAMESPACE,
    DEFAULT_VERSION,
};
pub use errors::{BuildErrorKind, ConfigErrorKind, ProvisionErrorKind, PublishErrorKind, ResolveErrorKind, StoreErrorKind};
pub use expiry::Expiry;
pub use lock::KeyedLocks;
pub use provisioner::Provisioner;
pub use publish::Publisher;
pub use registry::{Registry, RegistryBuilder};
pub use store::{CacheStore, MemoryStore};
