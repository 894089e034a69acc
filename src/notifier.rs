//! Eviction listener seam.
//!
//! A cache holds at most one listener. It is called synchronously, once per
//! evicted entry, *before* the entry is unlinked, with borrowed key and value.
//! Explicit removal, `pop_lru`, and `clear` never call it.
//!
//! ## Contract for implementors
//!
//! - The listener must not reach back into the cache that owns it. The
//!   borrow checker enforces this for listeners that capture nothing shared;
//!   listeners smuggling a handle through `Rc<RefCell<_>>` will panic on the
//!   double borrow instead of corrupting state.
//! - Returning `Err` aborts the eviction loop that invoked it. Evictions that
//!   already happened stay applied and the entry being reported stays cached.
//!
//! Any `FnMut(&K, &V) -> Result<(), ListenerError>` is a listener:
//!
//! ```
//! use lrudict::LruDict;
//! use lrudict::notifier::listener_fn;
//!
//! let mut cache: LruDict<&str, u32> = LruDict::new(4).unwrap();
//! cache.set_listener(Some(listener_fn(|key: &&str, value: &u32| {
//!     println!("evicted {key} = {value}");
//!     Ok(())
//! })));
//! assert!(cache.has_listener());
//! ```

use std::fmt;

use crate::error::{CacheError, ListenerError};

/// Receives entries as they are evicted.
pub trait EvictionListener<K, V> {
    fn on_evict(&mut self, key: &K, value: &V) -> Result<(), ListenerError>;
}

impl<K, V, F> EvictionListener<K, V> for F
where
    F: FnMut(&K, &V) -> Result<(), ListenerError>,
{
    fn on_evict(&mut self, key: &K, value: &V) -> Result<(), ListenerError> {
        self(key, value)
    }
}

/// Owned, type-erased listener as stored by the cache.
pub type BoxedListener<K, V> = Box<dyn EvictionListener<K, V>>;

/// Boxes a closure as a listener, pinning down its argument and return types.
pub fn listener_fn<K, V, F>(f: F) -> BoxedListener<K, V>
where
    F: FnMut(&K, &V) -> Result<(), ListenerError> + 'static,
{
    Box::new(f)
}

/// Zero-or-one registered listener.
pub struct EvictionNotifier<K, V> {
    listener: Option<BoxedListener<K, V>>,
}

impl<K, V> EvictionNotifier<K, V> {
    pub fn new(listener: Option<BoxedListener<K, V>>) -> Self {
        Self { listener }
    }

    /// Swaps in `listener` (or none), returning whatever was registered.
    pub fn replace(&mut self, listener: Option<BoxedListener<K, V>>) -> Option<BoxedListener<K, V>> {
        std::mem::replace(&mut self.listener, listener)
    }

    pub fn is_registered(&self) -> bool {
        self.listener.is_some()
    }

    pub fn notify(&mut self, key: &K, value: &V) -> Result<(), CacheError> {
        match self.listener.as_mut() {
            Some(listener) => listener.on_evict(key, value).map_err(|err| {
                tracing::warn!(error = %err, "eviction listener failed");
                CacheError::Listener(err)
            }),
            None => Ok(()),
        }
    }
}

impl<K, V> Default for EvictionNotifier<K, V> {
    fn default() -> Self {
        Self { listener: None }
    }
}

impl<K, V> fmt::Debug for EvictionNotifier<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictionNotifier")
            .field("registered", &self.is_registered())
            .finish()
    }
}
