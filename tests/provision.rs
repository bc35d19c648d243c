use provisio::{
    BuildErrorKind, CacheStore, Expiry, MemoryStore, ProvisionConfig, ProvisionErrorKind, Provisioner, RcAny, StoreErrorKind,
    DEFAULT_CACHE_KEY,
};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tracing_test::traced_test;

const CENTURY: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Tree {
    version: String,
}

impl Tree {
    fn new(version: &str) -> Result<Self, BuildErrorKind> {
        if version == "bad" {
            return Err(BuildErrorKind::InvalidVersion {
                version: version.to_owned(),
                reason: "unknown schema release".to_owned(),
            });
        }
        Ok(Self {
            version: version.to_owned(),
        })
    }
}

#[derive(Default)]
struct Calls {
    has: AtomicUsize,
    get: AtomicUsize,
    put: AtomicUsize,
}

impl Calls {
    fn total(&self) -> usize {
        self.has.load(Ordering::SeqCst) + self.get.load(Ordering::SeqCst) + self.put.load(Ordering::SeqCst)
    }
}

/// Counts calls and remembers the last expiry passed to `put`
#[derive(Default)]
struct RecordingStore {
    inner: MemoryStore,
    calls: Calls,
    last_expiry: parking_lot::Mutex<Option<Expiry>>,
}

impl CacheStore for RecordingStore {
    fn has(&self, key: &str) -> Result<bool, StoreErrorKind> {
        self.calls.has.fetch_add(1, Ordering::SeqCst);
        self.inner.has(key)
    }

    fn get(&self, key: &str) -> Result<Option<RcAny>, StoreErrorKind> {
        self.calls.get.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: RcAny, expiry: Expiry) -> Result<(), StoreErrorKind> {
        self.calls.put.fetch_add(1, Ordering::SeqCst);
        *self.last_expiry.lock() = Some(expiry);
        self.inner.put(key, value, expiry)
    }

    fn forget(&self, key: &str) -> Result<bool, StoreErrorKind> {
        self.inner.forget(key)
    }

    fn flush(&self) -> Result<(), StoreErrorKind> {
        self.inner.flush()
    }
}

/// Store with a broken backend for writes
#[derive(Default)]
struct ReadOnlyStore {
    inner: MemoryStore,
}

impl CacheStore for ReadOnlyStore {
    fn has(&self, key: &str) -> Result<bool, StoreErrorKind> {
        self.inner.has(key)
    }

    fn get(&self, key: &str) -> Result<Option<RcAny>, StoreErrorKind> {
        self.inner.get(key)
    }

    fn put(&self, _key: &str, _value: RcAny, _expiry: Expiry) -> Result<(), StoreErrorKind> {
        Err(StoreErrorKind::Unavailable)
    }

    fn forget(&self, _key: &str) -> Result<bool, StoreErrorKind> {
        Err(StoreErrorKind::Unavailable)
    }

    fn flush(&self) -> Result<(), StoreErrorKind> {
        Err(StoreErrorKind::Unavailable)
    }
}

fn counting_builder(builds: Arc<AtomicUsize>) -> impl provisio::Builder<Provides = Tree, Error = BuildErrorKind> {
    move |version: &str| {
        builds.fetch_add(1, Ordering::SeqCst);
        Tree::new(version)
    }
}

fn provisioner(config: ProvisionConfig, store: Arc<RecordingStore>, builds: Arc<AtomicUsize>) -> Provisioner<Tree> {
    Provisioner::new(config, store, counting_builder(builds))
}

#[test]
#[traced_test]
fn test_not_cached_never_touches_store() {
    let store = Arc::new(RecordingStore::default());
    let builds = Arc::new(AtomicUsize::new(0));
    let provisioner = provisioner(ProvisionConfig::default().with_cached(false), store.clone(), builds.clone());

    let tree_1 = provisioner.provision().unwrap();
    let tree_2 = provisioner.provision().unwrap();

    assert!(!Arc::ptr_eq(&tree_1, &tree_2));
    assert_eq!(builds.load(Ordering::SeqCst), 2);
    assert_eq!(store.calls.total(), 0);
}

#[test]
#[traced_test]
fn test_empty_store_builds_once_and_stores_forever() {
    let store = Arc::new(RecordingStore::default());
    let builds = Arc::new(AtomicUsize::new(0));
    let provisioner = provisioner(ProvisionConfig::default(), store.clone(), builds.clone());

    provisioner.provision().unwrap();

    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert_eq!(store.calls.put.load(Ordering::SeqCst), 1);
    let expiry = (*store.last_expiry.lock()).unwrap();
    assert_eq!(expiry, Expiry::Never);
    assert!(expiry.outlives(CENTURY));
    assert_eq!(store.inner.expiry(DEFAULT_CACHE_KEY), Some(Expiry::Never));
}

#[test]
#[traced_test]
fn test_prepopulated_store_no_writes_no_builds() {
    let store = Arc::new(RecordingStore::default());
    let stored = Arc::new(Tree::new("v1").unwrap());
    store.inner.put("k1", stored.clone(), Expiry::Never).unwrap();
    let builds = Arc::new(AtomicUsize::new(0));
    let provisioner = provisioner(
        ProvisionConfig::default().with_cache_key("k1").with_version("v2"),
        store.clone(),
        builds.clone(),
    );

    let tree = provisioner.provision().unwrap();

    // Cached version wins, it isn't refreshed on version change
    assert_eq!(tree.version, "v1");
    assert!(Arc::ptr_eq(&tree, &stored));
    assert_eq!(builds.load(Ordering::SeqCst), 0);
    assert_eq!(store.calls.put.load(Ordering::SeqCst), 0);
}

#[test]
fn test_second_call_returns_stored_identity() {
    let store = Arc::new(RecordingStore::default());
    let builds = Arc::new(AtomicUsize::new(0));
    let provisioner = provisioner(ProvisionConfig::default(), store.clone(), builds.clone());

    let tree_1 = provisioner.provision().unwrap();
    let tree_2 = provisioner.provision().unwrap();
    let stored = store.inner.get(DEFAULT_CACHE_KEY).unwrap().unwrap().downcast::<Tree>().unwrap();

    assert!(Arc::ptr_eq(&tree_1, &stored));
    assert!(Arc::ptr_eq(&tree_2, &stored));
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert_eq!(store.calls.put.load(Ordering::SeqCst), 1);
}

#[test]
fn test_default_resolution() {
    let store = Arc::new(RecordingStore::default());
    let provisioner = provisioner(ProvisionConfig::default(), store.clone(), Arc::default());

    let tree = provisioner.provision().unwrap();

    assert_eq!(tree.version, "latest");
    assert!(store.inner.has("meltingServer.schema.tree").unwrap());
    assert_eq!(store.inner.len(), 1);
}

#[test]
fn test_empty_store_k1_v2() {
    let store = Arc::new(RecordingStore::default());
    let provisioner = provisioner(
        ProvisionConfig::default().with_cache_key("k1").with_version("v2"),
        store.clone(),
        Arc::default(),
    );

    let tree = provisioner.provision().unwrap();
    let stored = store.inner.get("k1").unwrap().unwrap().downcast::<Tree>().unwrap();

    assert_eq!(*stored, Tree::new("v2").unwrap());
    assert_eq!(*tree, *stored);
}

#[test]
#[traced_test]
fn test_build_failure_leaves_store_empty() {
    let store = Arc::new(RecordingStore::default());
    let builds = Arc::new(AtomicUsize::new(0));
    let provisioner = provisioner(ProvisionConfig::default().with_version("bad"), store.clone(), builds.clone());

    let err = provisioner.provision().unwrap_err();

    assert!(matches!(
        err,
        ProvisionErrorKind::Build(BuildErrorKind::InvalidVersion { ref version, .. }) if version == "bad"
    ));
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert_eq!(store.calls.put.load(Ordering::SeqCst), 0);
    assert!(store.inner.is_empty());
}

#[test]
#[traced_test]
fn test_put_failure_propagates() {
    let store = Arc::new(ReadOnlyStore::default());
    let builds = Arc::new(AtomicUsize::new(0));
    let provisioner = Provisioner::new(ProvisionConfig::default(), store.clone(), counting_builder(builds.clone()));

    let err = provisioner.provision().unwrap_err();

    assert!(matches!(err, ProvisionErrorKind::Store(StoreErrorKind::Unavailable)));
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert!(store.inner.is_empty());
    assert!(matches!(provisioner.invalidate(), Err(ProvisionErrorKind::Store(_))));
}

#[test]
fn test_not_cached_ignores_broken_store() {
    let provisioner = Provisioner::new(
        ProvisionConfig::default().with_cached(false),
        Arc::new(ReadOnlyStore::default()),
        counting_builder(Arc::default()),
    );

    assert_eq!(provisioner.provision().unwrap().version, "latest");
}

#[test]
fn test_expired_entry_rebuilt() {
    let store = Arc::new(RecordingStore::default());
    store.inner.put("k1", Arc::new(Tree::new("v1").unwrap()), Expiry::after(Duration::ZERO)).unwrap();
    let builds = Arc::new(AtomicUsize::new(0));
    let provisioner = provisioner(
        ProvisionConfig::default().with_cache_key("k1").with_version("v2"),
        store.clone(),
        builds.clone(),
    );

    assert_eq!(provisioner.provision().unwrap().version, "v2");
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert_eq!(store.inner.expiry("k1"), Some(Expiry::Never));
}
