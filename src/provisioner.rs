use alloc::sync::Arc;
use core::any::type_name;
use tracing::{debug, error, info_span, warn};

use crate::{
    any::{RcAny, TypeInfo},
    builder::{BoxCloneBuilder, Builder},
    config::ProvisionConfig,
    errors::{BuildErrorKind, ProvisionErrorKind, StoreErrorKind},
    expiry::Expiry,
    lock::KeyedLocks,
    store::CacheStore,
};

/// Returns a resource from the cache store or builds and stores it.
///
/// - `is_cached` is `false`: builds a fresh resource on every call, the store isn't touched.
/// - Store has an entry under `cache_key`: returns it as is, without checking its version.
/// - Otherwise: builds the resource and stores it with [`Expiry::Never`].
///
/// # Concurrency
/// By default the `has`/`get`/`put` sequence isn't atomic: concurrent misses on the same key
/// may each build the resource and the last `put` wins.
/// Builds with the same version are expected to be equivalent.
/// Use [`Self::exclusive`] to build at most once per process.
pub struct Provisioner<R> {
    config: ProvisionConfig,
    store: Arc<dyn CacheStore>,
    builder: BoxCloneBuilder<R>,
    locks: Option<KeyedLocks>,
}

impl<R> Clone for Provisioner<R> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            store: self.store.clone(),
            builder: self.builder.clone(),
            locks: self.locks.clone(),
        }
    }
}

impl<R: Send + Sync + 'static> Provisioner<R> {
    #[inline]
    #[must_use]
    pub fn new<B>(config: ProvisionConfig, store: Arc<dyn CacheStore>, builder: B) -> Self
    where
        B: Builder<Provides = R>,
    {
        Self {
            config,
            store,
            builder: BoxCloneBuilder::new(builder),
            locks: None,
        }
    }

    /// Serializes population of the store per cache key, using the passed locks.
    /// Provisioners sharing the locks and the cache key build the resource at most once per process.
    ///
    /// The builder may provision other keys, but must not provision its own key: that never returns.
    #[inline]
    #[must_use]
    pub fn exclusive(mut self, locks: KeyedLocks) -> Self {
        self.locks = Some(locks);
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Gets the resource
    ///
    /// # Errors
    /// - [`ProvisionErrorKind::Build`] if the builder fails. Nothing is stored in this case.
    /// - [`ProvisionErrorKind::Store`] if the store fails, including a failed `put` after a successful build.
    /// - [`ProvisionErrorKind::IncorrectType`] if the entry under the cache key holds another type.
    pub fn provision(&self) -> Result<Arc<R>, ProvisionErrorKind> {
        let span = info_span!(
            "provision",
            resource = type_name::<R>(),
            cache_key = %self.config.cache_key,
            version = %self.config.version
        );
        let _guard = span.enter();

        if !self.config.is_cached {
            debug!("Caching disabled");
            return self.build().map(Arc::new);
        }

        match &self.locks {
            Some(locks) => {
                let lock = locks.get(&self.config.cache_key);
                let _guard = lock.lock();
                self.get_or_build()
            }
            None => self.get_or_build(),
        }
    }

    /// Removes the resource from the store, so the next provisioning builds it with the current version.
    ///
    /// # Errors
    /// Returns [`ProvisionErrorKind::Store`] if the store fails
    pub fn invalidate(&self) -> Result<bool, ProvisionErrorKind> {
        match self.store.forget(&self.config.cache_key) {
            Ok(existed) => {
                debug!(cache_key = %self.config.cache_key, existed, "Invalidated");
                Ok(existed)
            }
            Err(err) => Err(store_error(err)),
        }
    }
}

impl<R: Send + Sync + 'static> Provisioner<R> {
    fn get_or_build(&self) -> Result<Arc<R>, ProvisionErrorKind> {
        let cache_key = self.config.cache_key.as_str();

        if self.store.has(cache_key).map_err(store_error)? {
            match self.store.get(cache_key).map_err(store_error)? {
                Some(value) => {
                    debug!("Found in cache");
                    return downcast(cache_key, value);
                }
                None => warn!("Entry vanished after check, treating as miss"),
            }
        } else {
            debug!("Not found in cache");
        }

        let resource = Arc::new(self.build()?);
        self.store
            .put(cache_key, resource.clone(), Expiry::Never)
            .map_err(store_error)?;
        debug!("Cached");

        Ok(resource)
    }

    fn build(&self) -> Result<R, ProvisionErrorKind> {
        match self.builder.clone().build(&self.config.version) {
            Ok(resource) => {
                debug!("Built");
                Ok(resource)
            }
            Err(err) => Err(build_error(err)),
        }
    }
}

fn downcast<R: Send + Sync + 'static>(cache_key: &str, value: RcAny) -> Result<Arc<R>, ProvisionErrorKind> {
    value.downcast().map_err(|_| {
        let err = ProvisionErrorKind::IncorrectType {
            cache_key: cache_key.into(),
            expected: TypeInfo::of::<R>(),
        };
        error!("{}", err);
        err
    })
}

fn build_error(err: BuildErrorKind) -> ProvisionErrorKind {
    error!("{}", err);
    ProvisionErrorKind::Build(err)
}

fn store_error(err: StoreErrorKind) -> ProvisionErrorKind {
    error!("{}", err);
    ProvisionErrorKind::Store(err)
}
