//! Cache configuration
//!
//! Sizing hints for the per-context class tables. The cache itself has no
//! capacity limit and no eviction, so configuration is deliberately small:
//! it only shapes how each new table allocates.

use thiserror::Error;

/// Configuration rejected by [`CacheConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `class_shards` is not a power of two greater than 1.
    #[error("class_shards must be a power of two greater than 1, got {shards}")]
    InvalidShardCount {
        /// The rejected shard count.
        shards: usize,
    },
}

/// Sizing configuration for newly created class tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Capacity hint for each new class table. Zero means no
    /// pre-allocation.
    pub initial_class_capacity: usize,
    /// Shard count for each class table's concurrent map, or `None` for
    /// the map's own default (derived from available parallelism). Must be
    /// a power of two greater than 1.
    pub class_shards: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            initial_class_capacity: 64,
            class_shards: None,
        }
    }
}

impl CacheConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capacity hint for each new class table.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_initial_class_capacity(mut self, capacity: usize) -> Self {
        self.initial_class_capacity = capacity;
        self
    }

    /// Set the shard count for each class table.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_class_shards(mut self, shards: usize) -> Self {
        self.class_shards = Some(shards);
        self
    }

    /// Validate the configuration.
    ///
    /// [`ClassMetaCache::with_config`](crate::ClassMetaCache::with_config)
    /// panics on invalid input; callers wiring configuration from external
    /// sources can check here first and surface the error instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(shards) = self.class_shards
            && (shards < 2 || !shards.is_power_of_two())
        {
            return Err(ConfigError::InvalidShardCount { shards });
        }
        Ok(())
    }
}
