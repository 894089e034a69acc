//! lrudict: a bounded LRU dictionary with per-entry size accounting.
//!
//! [`LruDict`] maps keys to values and evicts the least recently used entry
//! when it runs out of room. "Room" is one positive `capacity` number read two
//! ways:
//!
//! - [`LruDict::set`] charges each entry a caller-supplied `size` and evicts
//!   until the aggregate size fits (size mode).
//! - [`LruDict::insert`] charges nothing; only [`LruDict::resize`] bounds the
//!   cache, by entry count (count mode).
//!
//! An optional eviction listener is called with each victim, and hit, miss,
//! and eviction counters are kept in [`CacheStats`].
//!
//! ```
//! use lrudict::prelude::*;
//!
//! let mut cache: LruDict<&str, u32> = LruDict::new(3).unwrap();
//! cache.insert("a", 1).unwrap();
//! cache.insert("b", 2).unwrap();
//! assert_eq!(cache.get("a"), Some(&1));
//! assert_eq!(cache.peek_first(), Some((&"a", &1)));
//! assert_eq!(cache.stats().hits, 1);
//! ```
//!
//! ## Layout
//!
//! - [`ds`]: slot arena, arena-backed recency list, key index
//! - [`capacity`]: threshold and aggregate-size bookkeeping
//! - [`notifier`]: eviction listener trait and registration
//! - [`stats`]: counters and their snapshot
//! - [`lru_dict`]: the cache itself
//! - [`builder`]: optional construction knobs

pub mod builder;
pub mod capacity;
pub mod ds;
pub mod error;
pub mod lru_dict;
pub mod notifier;
pub mod prelude;
pub mod stats;

pub use crate::builder::LruDictBuilder;
pub use crate::error::{CacheError, ConfigError, InvariantError, ListenerError};
pub use crate::lru_dict::LruDict;
pub use crate::stats::CacheStats;
