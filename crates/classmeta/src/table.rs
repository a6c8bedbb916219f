//! Per-context class tables
//!
//! A [`ClassTable`] is the inner, mutate-in-place half of the cache: the
//! concurrent name → value map owned by exactly one namespace context. It is
//! created once when its context is first seen and then mutated freely
//! without ever touching the outer index again.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::config::CacheConfig;

/// Concurrent mapping from fully qualified class name to cached value.
///
/// Reads take no external lock and scale with shard count; writes contend
/// only within one shard. Entries have no ordering and are never evicted —
/// a table lives exactly as long as the snapshot slots referencing it.
///
/// All writes flow through [`ClassMetaCache`](crate::ClassMetaCache); the
/// public surface of a table handle is read-only.
pub struct ClassTable<T>
where
    T: Clone + Send + Sync,
{
    entries: DashMap<Arc<str>, T>,
}

impl<T> ClassTable<T>
where
    T: Clone + Send + Sync,
{
    /// Create an empty table sized per `config`.
    pub(crate) fn with_config(config: &CacheConfig) -> Self {
        let capacity = config.initial_class_capacity;
        let entries = match config.class_shards {
            // Validated upstream: power of two greater than 1.
            Some(shards) => DashMap::with_capacity_and_shard_amount(capacity, shards),
            None => DashMap::with_capacity(capacity),
        };
        Self { entries }
    }

    /// Insert or overwrite `value` under `name`, returning the previous
    /// value if one was stored.
    pub(crate) fn insert(&self, name: Arc<str>, value: T) -> Option<T> {
        self.entries.insert(name, value)
    }

    /// Insert `value` under `name` unless the name is already present.
    ///
    /// Returns the value now stored plus whether this call inserted it.
    /// Under a per-name race the first insert wins and the losing value is
    /// dropped, so concurrent callers converge on one stored value.
    pub(crate) fn insert_if_absent(&self, name: Arc<str>, value: T) -> (T, bool) {
        match self.entries.entry(name) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(slot) => {
                slot.insert(value.clone());
                (value, true)
            }
        }
    }

    /// Look up the value cached under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<T> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    /// Whether a value is cached under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of cached classes in this table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> fmt::Debug for ClassTable<T>
where
    T: Clone + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassTable")
            .field("classes", &self.entries.len())
            .finish_non_exhaustive()
    }
}
