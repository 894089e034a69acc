//! Builder for [`LruDict`].
//!
//! Gathers the optional knobs (storage reservation, eviction listener) before
//! validating the capacity once in [`build`](LruDictBuilder::build).
//!
//! ## Example
//!
//! ```rust
//! use lrudict::LruDictBuilder;
//!
//! let mut cache = LruDictBuilder::<u64, String>::new(1024)
//!     .reserve(64)
//!     .on_evict(|key: &u64, _value: &String| {
//!         println!("dropping {key}");
//!         Ok(())
//!     })
//!     .build()
//!     .unwrap();
//! cache.set(1, "hello".to_string(), 5).unwrap();
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! assert!(cache.has_listener());
//! ```

use std::fmt;
use std::hash::Hash;

use crate::error::{ConfigError, ListenerError};
use crate::lru_dict::LruDict;
use crate::notifier::{BoxedListener, listener_fn};

/// Builder for creating [`LruDict`] instances.
pub struct LruDictBuilder<K, V> {
    capacity: usize,
    reserve: usize,
    listener: Option<BoxedListener<K, V>>,
}

impl<K, V> LruDictBuilder<K, V> {
    /// Starts a builder for a cache with the given capacity threshold.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            reserve: 0,
            listener: None,
        }
    }

    /// Pre-sizes the index and arena for `entries` entries.
    pub fn reserve(mut self, entries: usize) -> Self {
        self.reserve = entries;
        self
    }

    /// Registers an already boxed listener.
    pub fn listener(mut self, listener: BoxedListener<K, V>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Registers a closure as the eviction listener.
    pub fn on_evict<F>(self, f: F) -> Self
    where
        F: FnMut(&K, &V) -> Result<(), ListenerError> + 'static,
    {
        self.listener(listener_fn(f))
    }

    /// Builds the cache.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the capacity is zero.
    pub fn build(self) -> Result<LruDict<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        LruDict::from_parts(self.capacity, self.reserve, self.listener)
    }
}

impl<K, V> fmt::Debug for LruDictBuilder<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruDictBuilder")
            .field("capacity", &self.capacity)
            .field("reserve", &self.reserve)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}
