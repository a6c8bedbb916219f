//! The two-level cache facade
//!
//! [`ClassMetaCache`] front-ends both levels: a copy-on-write index of
//! namespace contexts, swapped atomically as a whole, and one concurrent
//! [`ClassTable`] per context that is mutated in place. Reads touch no
//! lock at either level; only first-time context registration serializes.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::debug;

use crate::class_ref::ClassRef;
use crate::config::CacheConfig;
use crate::index::{ContextIndex, ContextKey, ContextSlot};
use crate::stats::{CacheStats, StatsRecorder};
use crate::table::ClassTable;

/// Read-optimized cache of per-class metadata, scoped by namespace context.
///
/// `C` is the context type (a loader, realm, or similar namespace owner);
/// contexts are identified by `Arc` pointer identity, never by value. `T` is
/// the cached metadata and should be cheap to clone; wrap heavyweight
/// records in an [`Arc`].
///
/// The cache holds contexts weakly. Dropping the last user `Arc<C>` makes
/// that context's classes unreachable at once and lets the context be
/// reclaimed; its slot is swept out of the index on the next registration.
///
/// Instances are plain values with no global state. Share one across
/// threads behind an `Arc` or a borrow.
pub struct ClassMetaCache<C, T>
where
    T: Clone + Send + Sync,
{
    index: ArcSwap<ContextIndex<C, T>>,
    registration: Mutex<()>,
    stats: StatsRecorder,
    config: CacheConfig,
}

impl<C, T> ClassMetaCache<C, T>
where
    T: Clone + Send + Sync,
{
    /// Creates an empty cache with the default [`CacheConfig`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates an empty cache with an explicit configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config` fails [`CacheConfig::validate`].
    #[must_use]
    pub fn with_config(config: CacheConfig) -> Self {
        if let Err(err) = config.validate() {
            panic!("invalid cache configuration: {err}");
        }
        Self {
            index: ArcSwap::from_pointee(ContextIndex::empty()),
            registration: Mutex::new(()),
            stats: StatsRecorder::default(),
            config,
        }
    }

    /// Caches `value` for `class`, returning the previous value if any.
    ///
    /// Registers the class's context on first use.
    pub fn put(&self, class: &ClassRef<C>, value: T) -> Option<T> {
        let classes = self.table_or_register(class.context());
        let previous = classes.insert(class.name_key(), value);
        if previous.is_some() {
            self.stats.record_update();
        } else {
            self.stats.record_insertion();
        }
        previous
    }

    /// A clone of the value cached for `class`, if present.
    ///
    /// An unknown context yields `None` without registering anything.
    #[must_use]
    pub fn get(&self, class: &ClassRef<C>) -> Option<T> {
        let value = self
            .resolve(class.context(), false)
            .and_then(|classes| classes.get(class.name()));
        if value.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        value
    }

    /// The cached value for `class`, computing and caching it on a miss.
    ///
    /// `init` runs outside every cache lock, so it may itself use the
    /// cache. When two threads miss the same class at once both compute,
    /// but the first insert wins and both observe that winner.
    ///
    /// # Examples
    ///
    /// ```
    /// use classmeta::{ClassMetaCache, ClassRef};
    ///
    /// let cache: ClassMetaCache<(), usize> = ClassMetaCache::new();
    /// let class = ClassRef::rooted("java.lang.String");
    ///
    /// let vtable_size = cache.get_or_insert_with(&class, || 48);
    /// assert_eq!(vtable_size, 48);
    /// assert_eq!(cache.get_or_insert_with(&class, || unreachable!()), 48);
    /// ```
    pub fn get_or_insert_with<F>(&self, class: &ClassRef<C>, init: F) -> T
    where
        F: FnOnce() -> T,
    {
        let classes = self.table_or_register(class.context());
        if let Some(value) = classes.get(class.name()) {
            self.stats.record_hit();
            return value;
        }
        self.stats.record_miss();

        let computed = init();
        let (value, inserted) = classes.insert_if_absent(class.name_key(), computed);
        if inserted {
            self.stats.record_insertion();
        }
        value
    }

    /// Whether a value is cached for `class`.
    #[must_use]
    pub fn contains(&self, class: &ClassRef<C>) -> bool {
        let found = self
            .resolve(class.context(), false)
            .is_some_and(|classes| classes.contains(class.name()));
        if found {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        found
    }

    /// Read-only handle to the class table for `context`, if registered.
    ///
    /// Never registers a context, and unlike the lookup methods records no
    /// hit or miss; it exists for inspection and bulk reads. The returned
    /// handle stays valid even while other threads register contexts.
    #[must_use]
    pub fn table(&self, context: Option<&Arc<C>>) -> Option<Arc<ClassTable<T>>> {
        self.resolve(context, false)
    }

    /// Total cached classes across live contexts.
    ///
    /// Classes held only by dead contexts are not counted, even before
    /// their slots are swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.load().entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live registered contexts.
    #[must_use]
    pub fn context_count(&self) -> usize {
        self.index.load().live_len()
    }

    /// Counter snapshot for this cache instance.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// The configuration this cache was built with.
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The class table for `context`, registering one when `create` is set.
    ///
    /// With `create` false this is a pure read and never changes the cache.
    /// With `create` true, at most one table is ever created per context no
    /// matter how many threads race here; losers adopt the winner's table.
    fn resolve(&self, context: Option<&Arc<C>>, create: bool) -> Option<Arc<ClassTable<T>>> {
        let key = ContextKey::of(context);

        // Fast path: the current snapshot already knows this context.
        if let Some(classes) = self.index.load().classes_for(key) {
            return Some(Arc::clone(classes));
        }
        if !create {
            return None;
        }

        let _guard = self.registration.lock();

        // Re-check under the lock: another thread may have published the
        // slot while this one waited.
        if let Some(classes) = self.index.load().classes_for(key) {
            return Some(Arc::clone(classes));
        }

        let classes = Arc::new(ClassTable::with_config(&self.config));
        let slot = match context {
            Some(ctx) => ContextSlot::scoped(ctx, Arc::clone(&classes)),
            None => ContextSlot::rooted(Arc::clone(&classes)),
        };
        let (next, purged) = self.index.load().with_slot(key, slot);
        let contexts = next.live_len();
        self.index.store(Arc::new(next));

        self.stats.record_registration();
        if purged > 0 {
            self.stats.record_purged(purged);
        }
        debug!(context = ?key, contexts, purged, "registered class table");

        Some(classes)
    }

    fn table_or_register(&self, context: Option<&Arc<C>>) -> Arc<ClassTable<T>> {
        self.resolve(context, true)
            .unwrap_or_else(|| unreachable!("resolve with create always yields a table"))
    }
}

impl<C, T> Default for ClassMetaCache<C, T>
where
    T: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, T> fmt::Debug for ClassMetaCache<C, T>
where
    T: Clone + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index = self.index.load();
        f.debug_struct("ClassMetaCache")
            .field("contexts", &index.live_len())
            .field("classes", &index.entry_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    #[allow(dead_code)]
    struct Loader(&'static str);

    fn loader(name: &'static str) -> Arc<Loader> {
        Arc::new(Loader(name))
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache: ClassMetaCache<Loader, u32> = ClassMetaCache::new();
        let app = loader("app");
        let class = ClassRef::new(Arc::clone(&app), "com.example.Widget");

        assert_eq!(cache.put(&class, 7), None);
        assert_eq!(cache.get(&class), Some(7));
        assert!(cache.contains(&class));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_overwrites_and_returns_previous() {
        let cache: ClassMetaCache<Loader, u32> = ClassMetaCache::new();
        let class = ClassRef::rooted("java.lang.Object");

        assert_eq!(cache.put(&class, 1), None);
        assert_eq!(cache.put(&class, 2), Some(1));
        assert_eq!(cache.get(&class), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn contexts_are_isolated() {
        let cache: ClassMetaCache<Loader, &'static str> = ClassMetaCache::new();
        let app = loader("app");
        let plugin = loader("plugin");

        let in_app = ClassRef::new(Arc::clone(&app), "com.example.Widget");
        let in_plugin = ClassRef::new(Arc::clone(&plugin), "com.example.Widget");
        let in_root = ClassRef::rooted("com.example.Widget");

        cache.put(&in_app, "app");
        cache.put(&in_plugin, "plugin");
        cache.put(&in_root, "root");

        assert_eq!(cache.get(&in_app), Some("app"));
        assert_eq!(cache.get(&in_plugin), Some("plugin"));
        assert_eq!(cache.get(&in_root), Some("root"));
        assert_eq!(cache.context_count(), 3);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn lookup_on_unknown_context_registers_nothing() {
        let cache: ClassMetaCache<Loader, u32> = ClassMetaCache::new();
        let stranger = loader("stranger");
        let class = ClassRef::new(Arc::clone(&stranger), "com.example.Widget");

        assert_eq!(cache.get(&class), None);
        assert!(!cache.contains(&class));
        assert!(cache.table(Some(&stranger)).is_none());

        assert_eq!(cache.context_count(), 0);
        assert_eq!(cache.stats().registrations, 0);
    }

    #[test]
    fn resolve_creates_one_table_per_context() {
        let cache: ClassMetaCache<Loader, u32> = ClassMetaCache::new();
        let app = loader("app");

        let first = cache.resolve(Some(&app), true).unwrap();
        let second = cache.resolve(Some(&app), true).unwrap();
        let read = cache.table(Some(&app)).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &read));
        assert_eq!(cache.stats().registrations, 1);
    }

    #[test]
    fn root_and_scoped_tables_are_distinct() {
        let cache: ClassMetaCache<Loader, u32> = ClassMetaCache::new();
        let app = loader("app");

        let rooted = cache.resolve(None, true).unwrap();
        let scoped = cache.resolve(Some(&app), true).unwrap();

        assert!(!Arc::ptr_eq(&rooted, &scoped));
        assert_eq!(cache.context_count(), 2);
    }

    #[test]
    fn get_or_insert_with_computes_once() {
        let cache: ClassMetaCache<Loader, u32> = ClassMetaCache::new();
        let class = ClassRef::rooted("java.lang.String");
        let mut calls = 0;

        let value = cache.get_or_insert_with(&class, || {
            calls += 1;
            40
        });
        assert_eq!(value, 40);

        let value = cache.get_or_insert_with(&class, || {
            calls += 1;
            99
        });
        assert_eq!(value, 40);
        assert_eq!(calls, 1);
    }

    #[test]
    fn dropping_context_hides_its_classes() {
        let cache: ClassMetaCache<Loader, u32> = ClassMetaCache::new();
        let app = loader("app");
        let class = ClassRef::new(Arc::clone(&app), "com.example.Widget");

        cache.put(&class, 7);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.context_count(), 1);

        drop(class);
        drop(app);

        assert_eq!(cache.len(), 0);
        assert_eq!(cache.context_count(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn registration_sweeps_dead_slots() {
        let cache: ClassMetaCache<Loader, u32> = ClassMetaCache::new();
        let doomed = loader("doomed");
        cache.resolve(Some(&doomed), true);
        drop(doomed);

        let app = loader("app");
        cache.resolve(Some(&app), true);

        assert_eq!(cache.stats().purged, 1);
        assert_eq!(cache.context_count(), 1);
    }

    #[test]
    fn stats_track_lookups_and_writes() {
        let cache: ClassMetaCache<Loader, u32> = ClassMetaCache::new();
        let class = ClassRef::rooted("java.lang.Object");

        cache.get(&class);
        cache.put(&class, 1);
        cache.put(&class, 2);
        cache.get(&class);
        cache.contains(&class);

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.insertions, 1);
        assert_eq!(stats.updates, 1);
        assert_eq!(stats.registrations, 1);
        assert_eq!(stats.lookups(), 3);
    }

    #[test]
    #[should_panic(expected = "invalid cache configuration")]
    fn with_config_rejects_bad_shard_count() {
        let config = CacheConfig::new().with_class_shards(3);
        let _cache: ClassMetaCache<Loader, u32> = ClassMetaCache::with_config(config);
    }

    #[test]
    fn debug_stays_compact() {
        let cache: ClassMetaCache<Loader, u32> = ClassMetaCache::new();
        cache.put(&ClassRef::rooted("java.lang.Object"), 1);

        let rendered = format!("{cache:?}");
        assert!(rendered.contains("ClassMetaCache"));
        assert!(rendered.contains("contexts: 1"));
    }
}
