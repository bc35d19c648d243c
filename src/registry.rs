use alloc::{collections::BTreeMap, sync::Arc};
use core::any::type_name;
use parking_lot::Mutex;
use tracing::{debug, error, info_span, warn};

use crate::{
    any::{self, RcAny, TypeInfo},
    builder::Builder,
    config::{Config, ProvisionConfig},
    errors::ResolveErrorKind,
    lock::KeyedLocks,
    provisioner::Provisioner,
    store::CacheStore,
};

#[derive(Clone)]
pub(crate) struct ProvisionerData {
    pub(crate) provisioner: RcAny,
    pub(crate) config: Config,
}

/// Collects provisioners, one per resource type.
/// All of them share the cache store and the population locks.
pub struct RegistryBuilder {
    store: Arc<dyn CacheStore>,
    locks: KeyedLocks,
    entries: BTreeMap<TypeInfo, ProvisionerData>,
}

impl RegistryBuilder {
    #[inline]
    #[must_use]
    pub fn new<S: CacheStore + 'static>(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }

    #[inline]
    #[must_use]
    pub fn from_arc(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
            entries: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn provide<B: Builder>(self, builder: B, provision_config: ProvisionConfig) -> Self {
        self.provide_with_config(builder, provision_config, Config::default())
    }

    /// Registers a provisioner for `B::Provides`, replacing a previous one for the same type.
    #[must_use]
    pub fn provide_with_config<B: Builder>(mut self, builder: B, provision_config: ProvisionConfig, config: Config) -> Self {
        let mut provisioner = Provisioner::new(provision_config, self.store.clone(), builder);
        if config.exclusive {
            provisioner = provisioner.exclusive(self.locks.clone());
        }

        let type_info = TypeInfo::of::<B::Provides>();
        let data = ProvisionerData {
            provisioner: Arc::new(provisioner),
            config,
        };
        if self.entries.insert(type_info, data).is_some() {
            warn!(resource = type_info.short_name(), "Provisioner replaced");
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn build(self) -> Registry {
        Registry {
            store: self.store,
            entries: self.entries,
            resolved: Mutex::new(any::Map::new()),
        }
    }
}

/// Resolves registered resources on demand.
///
/// Nothing is built at registration: a resource is provisioned on its first [`Self::get`].
/// With [`Config::cache_provides`] the resolved resource is kept by the registry,
/// so later calls don't reach the cache store at all.
pub struct Registry {
    store: Arc<dyn CacheStore>,
    entries: BTreeMap<TypeInfo, ProvisionerData>,
    resolved: Mutex<any::Map>,
}

impl Registry {
    /// Gets a resource
    #[allow(clippy::missing_errors_doc)]
    pub fn get<R: Send + Sync + 'static>(&self) -> Result<Arc<R>, ResolveErrorKind> {
        let span = info_span!("get", resource = type_name::<R>());
        let _guard = span.enter();

        let type_info = TypeInfo::of::<R>();

        if let Some(resource) = self.resolved.lock().get(&type_info) {
            debug!("Found in registry");
            return downcast(resource.clone());
        }

        let ProvisionerData { provisioner, config } = self.data(type_info)?;
        let resource = downcast_provisioner::<R>(provisioner.clone())?.provision()?;

        if config.cache_provides {
            // Another thread may have resolved it meanwhile, the first resolved value is kept
            let resource = self.resolved.lock().entry(type_info).or_insert(resource as RcAny).clone();
            debug!("Kept in registry");
            return downcast(resource);
        }

        Ok(resource)
    }

    /// Gets a provisioner to pass it to a consumer
    #[allow(clippy::missing_errors_doc)]
    pub fn provisioner<R: Send + Sync + 'static>(&self) -> Result<Provisioner<R>, ResolveErrorKind> {
        let ProvisionerData { provisioner, .. } = self.data(TypeInfo::of::<R>())?;
        downcast_provisioner::<R>(provisioner.clone()).map(|provisioner| (*provisioner).clone())
    }

    /// Types of the registered resources
    pub fn provides(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.entries.keys().copied()
    }

    #[inline]
    #[must_use]
    pub fn is_provided<R: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeInfo::of::<R>())
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Drops the resources kept by the registry. The cache store isn't affected.
    pub fn reset(&self) {
        self.resolved.lock().clear();
        debug!("Registry reset");
    }
}

impl Registry {
    fn data(&self, type_info: TypeInfo) -> Result<&ProvisionerData, ResolveErrorKind> {
        self.entries.get(&type_info).ok_or_else(|| {
            let err = ResolveErrorKind::NoProvisioner { type_info };
            error!("{}", err);
            err
        })
    }
}

fn downcast<R: Send + Sync + 'static>(resource: RcAny) -> Result<Arc<R>, ResolveErrorKind> {
    resource.downcast().map_err(|_| incorrect_type::<R>())
}

fn downcast_provisioner<R: Send + Sync + 'static>(provisioner: RcAny) -> Result<Arc<Provisioner<R>>, ResolveErrorKind> {
    provisioner.downcast().map_err(|_| incorrect_type::<R>())
}

fn incorrect_type<R: 'static>() -> ResolveErrorKind {
    let err = ResolveErrorKind::IncorrectType {
        expected: TypeInfo::of::<R>(),
    };
    error!("{}", err);
    err
}
