//! # classmeta
//!
//! Two-level, read-optimized cache for per-class metadata, scoped by the
//! namespace context (class loader, realm, plugin sandbox) that defined
//! each class.
//!
//! The same class name can be defined independently by different contexts,
//! so a flat name-keyed map would conflate unrelated classes. This crate
//! keys the outer level by context identity and the inner level by class
//! name:
//!
//! - **Outer level**: an immutable context index behind an atomically
//!   swapped reference. Lookups are lock-free; registering a context copies
//!   the index, adds a slot, and publishes the copy.
//! - **Inner level**: one sharded concurrent table per context, mutated in
//!   place. Steady-state traffic (metadata reads and writes for known
//!   contexts) never takes the registration lock.
//!
//! Contexts are held weakly: the cache never keeps a context alive, and a
//! dropped context takes its cached classes with it.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use classmeta::{ClassMetaCache, ClassRef};
//!
//! // Any type can serve as the context; only its identity matters.
//! struct Loader;
//!
//! let cache: ClassMetaCache<Loader, u64> = ClassMetaCache::new();
//! let plugin = Arc::new(Loader);
//!
//! // Same class name, different namespaces, independent entries.
//! let boot = ClassRef::rooted("com.example.Widget");
//! let scoped = ClassRef::new(Arc::clone(&plugin), "com.example.Widget");
//!
//! cache.put(&boot, 1);
//! cache.put(&scoped, 2);
//! assert_eq!(cache.get(&boot), Some(1));
//! assert_eq!(cache.get(&scoped), Some(2));
//!
//! // Dropping a context makes its entries unreachable.
//! drop(scoped);
//! drop(plugin);
//! assert_eq!(cache.len(), 1);
//! ```
//!
//! ## Architecture
//!
//! - Context registration is serialized by a single mutex and re-checked
//!   under it, so one table exists per context no matter how many threads
//!   race to create it.
//! - Dead context slots are swept during the copy step of the next
//!   registration; no background thread is involved.
//! - [`CacheStats`] exposes relaxed counters for hit-rate monitoring.

mod cache;
mod class_ref;
mod config;
mod index;
mod stats;
mod table;

pub use crate::cache::ClassMetaCache;
pub use crate::class_ref::ClassRef;
pub use crate::config::{CacheConfig, ConfigError};
pub use crate::stats::CacheStats;
pub use crate::table::ClassTable;

pub mod prelude {
    //! Convenient re-exports of the commonly used types.

    pub use crate::cache::ClassMetaCache;
    pub use crate::class_ref::ClassRef;
    pub use crate::config::CacheConfig;
    pub use crate::stats::CacheStats;
}
