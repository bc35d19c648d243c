use alloc::{collections::BTreeMap, string::String};
use parking_lot::RwLock;
use tracing::debug;

use crate::{any::RcAny, errors::StoreErrorKind, expiry::Expiry};

/// Key-value store the provisioner persists resources in.
///
/// Implementations must be safe to share between threads.
/// Nothing here is atomic across calls: a `has` followed by a `get` may observe different states.
pub trait CacheStore: Send + Sync {
    fn has(&self, key: &str) -> Result<bool, StoreErrorKind>;

    /// Returns `None` if the entry is absent or expired.
    fn get(&self, key: &str) -> Result<Option<RcAny>, StoreErrorKind>;

    /// Stores the value, replacing any previous entry under the same key.
    fn put(&self, key: &str, value: RcAny, expiry: Expiry) -> Result<(), StoreErrorKind>;

    /// Removes the entry. Returns `true` if it existed.
    fn forget(&self, key: &str) -> Result<bool, StoreErrorKind>;

    fn flush(&self) -> Result<(), StoreErrorKind>;
}

struct Entry {
    value: RcAny,
    expiry: Expiry,
}

/// In-process [`CacheStore`].
/// Expired entries are treated as absent. They're dropped on the next read of their key,
/// and every `put` purges all expired entries, so keys that are never read again don't accumulate.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Entry>>,
}

impl MemoryStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().values().filter(|entry| !entry.expiry.is_expired()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expiry of a live entry
    #[must_use]
    pub fn expiry(&self, key: &str) -> Option<Expiry> {
        self.entries
            .read()
            .get(key)
            .map(|entry| entry.expiry)
            .filter(|expiry| !expiry.is_expired())
    }

    fn evict_expired(&self, key: &str) {
        let mut guard = self.entries.write();
        if guard.get(key).is_some_and(|entry| entry.expiry.is_expired()) {
            guard.remove(key);
            debug!(key, "Evicted expired entry");
        }
    }
}

impl CacheStore for MemoryStore {
    fn has(&self, key: &str) -> Result<bool, StoreErrorKind> {
        Ok(self.get(key)?.is_some())
    }

    fn get(&self, key: &str) -> Result<Option<RcAny>, StoreErrorKind> {
        let value = match self.entries.read().get(key) {
            Some(entry) if !entry.expiry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => None,
            None => return Ok(None),
        };
        self.evict_expired(key);
        Ok(value)
    }

    fn put(&self, key: &str, value: RcAny, expiry: Expiry) -> Result<(), StoreErrorKind> {
        let mut guard = self.entries.write();
        let before = guard.len();
        guard.retain(|_, entry| !entry.expiry.is_expired());
        let purged = before - guard.len();
        if purged > 0 {
            debug!(purged, "Purged expired entries");
        }
        guard.insert(key.into(), Entry { value, expiry });
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<bool, StoreErrorKind> {
        Ok(self.entries.write().remove(key).is_some())
    }

    fn flush(&self) -> Result<(), StoreErrorKind> {
        self.entries.write().clear();
        Ok(())
    }
}
