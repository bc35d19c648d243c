use alloc::{collections::BTreeMap, string::String, sync::Arc};
use parking_lot::Mutex;

/// Population locks shared between provisioners, one mutex per exact cache key.
///
/// Locks aren't reentrant: a builder must not provision its own cache key.
/// Builders provisioning other keys are fine.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<Mutex<BTreeMap<String, Arc<Mutex<()>>>>>,
}

impl KeyedLocks {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub(crate) fn get(&self, key: &str) -> Arc<Mutex<()>> {
        let mut guard = self.locks.lock();
        match guard.get(key) {
            Some(lock) => lock.clone(),
            None => guard.entry(key.into()).or_default().clone(),
        }
    }
}
