//! # Size-aware LRU dictionary
//!
//! `LruDict` keeps every live entry in two structures that always agree: an
//! [`EntryIndex`] for O(1) key lookup and a [`RecencyList`] ordering entries
//! from most to least recently used. A [`CapacityAccountant`] decides when the
//! tail must go; an optional listener hears about each eviction.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │                         LruDict<K, V>                             │
//!   │                                                                   │
//!   │   EntryIndex<K>  (FxHashMap<K, SlotId>)                           │
//!   │   ┌───────┬────────┐                                              │
//!   │   │ "c"   │ id_2 ──┼──────┐                                       │
//!   │   │ "b"   │ id_1 ──┼───┐  │                                       │
//!   │   └───────┴────────┘   │  │                                       │
//!   │                        ▼  ▼                                       │
//!   │   RecencyList<K, V>  (SlotArena of Entry{key, value, size})       │
//!   │   head ──► [c] ◄──► [b] ◄── tail                                  │
//!   │            MRU        LRU                                         │
//!   │                                                                   │
//!   │   CapacityAccountant { capacity, used }                           │
//!   │   EvictionNotifier   { Option<listener> }                         │
//!   │   StatsCounter       { hits, misses, evictions }                  │
//!   └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two capacity disciplines
//!
//! | Path                         | Charges     | Bounded by                               |
//! |------------------------------|-------------|------------------------------------------|
//! | [`set`](LruDict::set)        | `size`      | vacuum while `memory > capacity`         |
//! | [`insert`](LruDict::insert)  | 0           | only [`resize`](LruDict::resize) (count) |
//!
//! The two are not reconciled: `resize` trims by entry count and leaves the
//! aggregate size as it falls, while `set` trims by aggregate size and never
//! looks at the count. Mixing both paths on one cache is allowed and behaves
//! exactly as each path describes.
//!
//! ## Eviction
//!
//! Always the tail. For each victim the listener runs first (with the entry
//! still cached), then the entry is unlinked, removed from the index, its size
//! refunded, and the eviction counted. A listener error stops the loop there.
//!
//! ## Operations
//!
//! | Method                 | Complexity | Promotes | Stats        |
//! |------------------------|------------|----------|--------------|
//! | `get` / `get_or`       | O(1)       | yes      | hit / miss   |
//! | `peek` / `contains`    | O(1)       | no       | -            |
//! | `touch`                | O(1)       | yes      | -            |
//! | `set` / `insert`       | O(1) + k   | yes      | evictions    |
//! | `remove` / `pop_lru`   | O(1)       | -        | -            |
//! | `resize`               | O(k)       | -        | evictions    |
//! | `keys`/`values`/`iter` | O(n)       | no       | -            |
//! | `recency_rank`         | O(n)       | no       | -            |
//! | `clear`                | O(n)       | -        | resets h/m   |
//!
//! ## Thread Safety
//!
//! None. `LruDict` is a plain single-owner value; wrap it in a lock if it has
//! to be shared.
//!
//! ## Example
//!
//! ```
//! use lrudict::LruDict;
//!
//! let mut cache: LruDict<&str, Vec<u8>> = LruDict::new(10).unwrap();
//! cache.set("a", vec![0; 4], 4).unwrap();
//! cache.set("b", vec![0; 4], 4).unwrap();
//! cache.set("c", vec![0; 4], 4).unwrap();
//!
//! // "a" was least recently used when the aggregate reached 12 > 10.
//! assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec!["c", "b"]);
//! assert_eq!(cache.memory(), 8);
//! assert_eq!(cache.stats().evictions, 1);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::capacity::CapacityAccountant;
use crate::ds::entry_index::EntryIndex;
use crate::ds::recency_list::{self, Entry, RecencyList};
use crate::error::{CacheError, ConfigError, InvariantError};
use crate::notifier::{BoxedListener, EvictionNotifier};
use crate::stats::{CacheStats, StatsCounter};

/// Bounded LRU dictionary with optional per-entry size accounting.
pub struct LruDict<K, V> {
    index: EntryIndex<K>,
    list: RecencyList<K, V>,
    accountant: CapacityAccountant,
    notifier: EvictionNotifier<K, V>,
    stats: StatsCounter,
}

impl<K, V> LruDict<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache.
    ///
    /// # Errors
    /// `capacity` must be positive.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::from_parts(capacity, 0, None)
    }

    /// Creates an empty cache with an eviction listener already registered.
    pub fn with_listener(capacity: usize, listener: BoxedListener<K, V>) -> Result<Self, ConfigError> {
        Self::from_parts(capacity, 0, Some(listener))
    }

    pub(crate) fn from_parts(
        capacity: usize,
        reserve: usize,
        listener: Option<BoxedListener<K, V>>,
    ) -> Result<Self, ConfigError> {
        // `capacity` may be a byte budget, so storage is only pre-sized from `reserve`.
        Ok(Self {
            index: EntryIndex::with_capacity(reserve),
            list: RecencyList::with_capacity(reserve),
            accountant: CapacityAccountant::new(capacity)?,
            notifier: EvictionNotifier::new(listener),
            stats: StatsCounter::default(),
        })
    }

    /// Membership test. Does not promote and does not count as a lookup.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains(key)
    }

    /// Looks `key` up, promoting it to most recently used on a hit.
    ///
    /// Counts a hit or a miss. A miss is `None`, never an error.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(id) = self.index.find(key) else {
            self.stats.record_miss();
            return None;
        };
        self.stats.record_hit();
        self.list.promote(id);

        #[cfg(debug_assertions)]
        self.debug_validate();

        self.list.get(id).map(Entry::value)
    }

    /// [`get`](Self::get), falling back to `default` on a miss.
    pub fn get_or<'a, Q>(&'a mut self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    /// Reads a value without promoting it or touching stats.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.index.find(key)?;
        self.list.get(id).map(Entry::value)
    }

    /// Promotes `key` without reading it. Returns `false` if absent.
    pub fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.find(key) {
            Some(id) => self.list.promote(id),
            None => false,
        }
    }

    /// Position of `key` in recency order, 0 being most recently used.
    pub fn recency_rank<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.index.find(key)?;
        self.list.iter_ids().position(|(slot, _)| slot == id)
    }

    /// Inserts or updates `key` with an explicit `size`, then vacuums.
    ///
    /// If `size` exceeds the capacity the call changes nothing at all, not
    /// even an existing entry for `key`, and returns `Ok(None)`. Otherwise the
    /// entry ends up most recently used and the least recently used entries
    /// are evicted until the aggregate size fits. The entry just written is
    /// never one of them.
    ///
    /// Returns the value this replaced, if any.
    ///
    /// # Errors
    /// [`CacheError::Listener`] if the listener fails during the vacuum. The
    /// write itself has already happened at that point. When the write was an
    /// update, the replaced value is dropped rather than returned.
    pub fn set(&mut self, key: K, value: V, size: usize) -> Result<Option<V>, CacheError> {
        if !self.accountant.admits(size) {
            trace!(size, capacity = self.accountant.capacity(), "rejected oversized entry");
            return Ok(None);
        }

        if let Some(id) = self.index.find(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                let (previous, old_size) = entry.replace(value, size);
                self.accountant.recharge(old_size, size);
                self.list.promote(id);
                self.vacuum()?;
                return Ok(Some(previous));
            }
        }

        let id = self.list.push_front(Entry::new(key.clone(), value, size));
        self.index.insert(key, id);
        self.accountant.charge(size);
        self.vacuum()?;
        Ok(None)
    }

    /// Unsized insert or update: `set(key, value, 0)`.
    ///
    /// Never grows [`memory`](Self::memory), so it only evicts if an earlier
    /// [`resize`](Self::resize) left the aggregate size above capacity.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, CacheError> {
        self.set(key, value, 0)
    }

    /// Applies [`insert`](Self::insert) to each pair in order.
    pub fn update<I>(&mut self, entries: I) -> Result<(), CacheError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.insert(key, value)?;
        }
        Ok(())
    }

    /// Removes `key` without notifying the listener or counting an eviction.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.index.remove(key)?;
        let (_, value, size) = self.list.remove(id)?.into_parts();
        self.accountant.refund(size);

        #[cfg(debug_assertions)]
        self.debug_validate();

        Some(value)
    }

    /// Removes and returns the least recently used entry, like
    /// [`remove`](Self::remove) on the tail key.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let (key, value, size) = self.list.pop_back()?.into_parts();
        self.index.remove(&key);
        self.accountant.refund(size);
        Some((key, value))
    }

    /// Changes the capacity, then evicts from the tail while the entry count
    /// exceeds it.
    ///
    /// This trims by count only; the aggregate size may remain above the new
    /// capacity until the next sized write vacuums.
    ///
    /// # Errors
    /// [`CacheError::InvalidArgument`] for a zero capacity (nothing changes);
    /// [`CacheError::Listener`] if the listener fails mid-trim (the new
    /// capacity stays in effect).
    pub fn resize(&mut self, capacity: usize) -> Result<(), CacheError> {
        let previous = self.accountant.capacity();
        self.accountant.set_capacity(capacity)?;

        let mut evicted = 0usize;
        while self.accountant.exceeds_count(self.list.len()) {
            if !self.evict_tail()? {
                break;
            }
            evicted += 1;
        }
        debug!(previous, capacity, evicted, "resized cache");
        Ok(())
    }

    /// Drops every entry without notifying. Resets memory, hits, and misses;
    /// the eviction count is kept.
    pub fn clear(&mut self) {
        let dropped = self.list.len();
        self.list.clear();
        self.index.clear();
        self.accountant.reset();
        self.stats.reset_lookups();
        debug!(dropped, "cleared cache");
    }

    /// Verifies that index, list, and size accounting agree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.validate().map_err(InvariantError::new)?;

        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but list holds {} entries",
                self.index.len(),
                self.list.len()
            )));
        }

        let mut total = 0usize;
        for (id, entry) in self.list.iter_ids() {
            match self.index.find(entry.key()) {
                Some(found) if found == id => {},
                Some(found) => {
                    return Err(InvariantError::new(format!(
                        "key at slot {} indexed to slot {}",
                        id.index(),
                        found.index()
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "entry at slot {} missing from index",
                        id.index()
                    )));
                },
            }
            total += entry.size();
        }

        if total != self.accountant.used() {
            return Err(InvariantError::new(format!(
                "entry sizes sum to {total} but memory reports {}",
                self.accountant.used()
            )));
        }
        Ok(())
    }

    fn vacuum(&mut self) -> Result<(), CacheError> {
        while self.accountant.over_budget() {
            if !self.evict_tail()? {
                break;
            }
        }

        #[cfg(debug_assertions)]
        self.debug_validate();

        Ok(())
    }

    /// Evicts the tail entry. `Ok(false)` when the cache is empty.
    fn evict_tail(&mut self) -> Result<bool, CacheError> {
        let Some(id) = self.list.tail_id() else {
            return Ok(false);
        };
        if let Some(entry) = self.list.get(id) {
            self.notifier.notify(entry.key(), entry.value())?;
        }
        let Some(entry) = self.list.remove(id) else {
            return Ok(false);
        };
        let (key, _value, size) = entry.into_parts();
        self.index.remove(&key);
        self.accountant.refund(size);
        self.stats.record_eviction();
        trace!(
            size,
            memory = self.accountant.used(),
            len = self.list.len(),
            "evicted lru entry"
        );
        Ok(true)
    }

    #[cfg(debug_assertions)]
    fn debug_validate(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

impl<K, V> LruDict<K, V> {
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Configured threshold, read as bytes by `set` and as entries by `resize`.
    pub fn capacity(&self) -> usize {
        self.accountant.capacity()
    }

    /// Sum of the sizes of all live entries.
    pub fn memory(&self) -> usize {
        self.accountant.used()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Most recently used entry, without reordering.
    pub fn peek_first(&self) -> Option<(&K, &V)> {
        self.list.front().map(|entry| (entry.key(), entry.value()))
    }

    /// Least recently used entry (the next eviction victim), without reordering.
    pub fn peek_last(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (entry.key(), entry.value()))
    }

    /// Entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.list.iter(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            inner: self.list.iter(),
        }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values {
            inner: self.list.iter(),
        }
    }

    /// Registers `listener`, or unregisters with `None`. Returns the previous one.
    pub fn set_listener(&mut self, listener: Option<BoxedListener<K, V>>) -> Option<BoxedListener<K, V>> {
        self.notifier.replace(listener)
    }

    pub fn has_listener(&self) -> bool {
        self.notifier.is_registered()
    }
}

impl<K, V> fmt::Debug for LruDict<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruDict")
            .field("capacity", &self.capacity())
            .field("memory", &self.memory())
            .field("entries", &DebugEntries(self))
            .finish_non_exhaustive()
    }
}

struct DebugEntries<'a, K, V>(&'a LruDict<K, V>);

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for DebugEntries<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a LruDict<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// `(key, value)` pairs, MRU → LRU.
pub struct Iter<'a, K, V> {
    inner: recency_list::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (entry.key(), entry.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Keys, MRU → LRU.
pub struct Keys<'a, K, V> {
    inner: recency_list::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Entry::key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// Values, MRU → LRU.
pub struct Values<'a, K, V> {
    inner: recency_list::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Entry::value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::listener_fn;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(String, u32)>>>;

    fn recording_cache(capacity: usize) -> (LruDict<String, u32>, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let cache = LruDict::with_listener(
            capacity,
            listener_fn(move |k: &String, v: &u32| {
                sink.borrow_mut().push((k.clone(), *v));
                Ok(())
            }),
        )
        .unwrap();
        (cache, log)
    }

    fn keys_of<K: Clone, V>(cache: &LruDict<K, V>) -> Vec<K> {
        cache.keys().cloned().collect()
    }

    // ==============================================
    // CORRECTNESS TESTS MODULE
    // ==============================================
    mod correctness {
        use super::*;

        mod basic_behavior {
            use super::*;

            #[test]
            fn test_new_cache_creation() {
                let cache: LruDict<i32, i32> = LruDict::new(10).unwrap();
                assert_eq!(cache.capacity(), 10);
                assert_eq!(cache.len(), 0);
                assert_eq!(cache.memory(), 0);
                assert!(cache.is_empty());
                assert!(!cache.has_listener());
                assert_eq!(cache.stats(), CacheStats::default());
            }

            #[test]
            fn test_zero_capacity_is_rejected() {
                let err = LruDict::<i32, i32>::new(0).unwrap_err();
                assert_eq!(err.message(), "capacity must be a positive number");
            }

            #[test]
            fn test_get_hit_and_miss_are_counted() {
                let mut cache = LruDict::new(5).unwrap();
                cache.insert(1, "one").unwrap();

                assert_eq!(cache.get(&1), Some(&"one"));
                assert_eq!(cache.get(&2), None);
                assert_eq!(cache.get(&1), Some(&"one"));
                assert_eq!(<(u64, u64, u64)>::from(cache.stats()), (2, 1, 0));
            }

            #[test]
            fn test_get_or_returns_default_on_miss() {
                let mut cache = LruDict::new(5).unwrap();
                cache.insert("k", 1).unwrap();
                let fallback = 42;
                assert_eq!(*cache.get_or("k", &fallback), 1);
                assert_eq!(*cache.get_or("missing", &fallback), 42);
                assert_eq!(cache.stats().misses, 1);
            }

            #[test]
            fn test_borrowed_key_lookups() {
                let mut cache: LruDict<String, u32> = LruDict::new(5).unwrap();
                cache.insert("alpha".to_string(), 1).unwrap();
                assert!(cache.contains("alpha"));
                assert_eq!(cache.peek("alpha"), Some(&1));
                assert_eq!(cache.get("alpha"), Some(&1));
                assert_eq!(cache.remove("alpha"), Some(1));
                assert!(!cache.contains("alpha"));
            }

            #[test]
            fn test_insert_returns_previous_value() {
                let mut cache = LruDict::new(5).unwrap();
                assert_eq!(cache.insert(1, 10).unwrap(), None);
                assert_eq!(cache.insert(1, 11).unwrap(), Some(10));
                assert_eq!(cache.set(1, 12, 3).unwrap(), Some(11));
                assert_eq!(cache.len(), 1);
                assert_eq!(cache.memory(), 3);
            }

            #[test]
            fn test_remove_absent_key_is_noop() {
                let mut cache: LruDict<i32, i32> = LruDict::new(5).unwrap();
                cache.set(1, 1, 2).unwrap();
                assert_eq!(cache.remove(&9), None);
                assert_eq!(cache.len(), 1);
                assert_eq!(cache.memory(), 2);
            }

            #[test]
            fn test_remove_refunds_memory_without_eviction() {
                let (mut cache, log) = recording_cache(10);
                cache.set("a".into(), 1, 4).unwrap();
                cache.set("b".into(), 2, 3).unwrap();

                assert_eq!(cache.remove("a"), Some(1));
                assert_eq!(cache.memory(), 3);
                assert_eq!(cache.stats().evictions, 0);
                assert!(RefCell::borrow(&log).is_empty());
                cache.check_invariants().unwrap();
            }

            #[test]
            fn test_update_applies_unsized_inserts_in_order() {
                let mut cache = LruDict::new(3).unwrap();
                cache.update(vec![(1, "a"), (2, "b"), (3, "c"), (1, "z")]).unwrap();
                assert_eq!(keys_of(&cache), vec![1, 3, 2]);
                assert_eq!(cache.peek(&1), Some(&"z"));
                assert_eq!(cache.memory(), 0);
            }
        }

        mod recency_order {
            use super::*;

            #[test]
            fn test_get_promotes_to_head() {
                let mut cache = LruDict::new(10).unwrap();
                for k in ["a", "b", "c"] {
                    cache.insert(k, ()).unwrap();
                }
                assert_eq!(keys_of(&cache), vec!["c", "b", "a"]);

                cache.get("a");
                assert_eq!(keys_of(&cache), vec!["a", "c", "b"]);
                assert_eq!(cache.peek_first(), Some((&"a", &())));
                assert_eq!(cache.peek_last(), Some((&"b", &())));
            }

            #[test]
            fn test_peek_and_contains_do_not_promote() {
                let mut cache = LruDict::new(10).unwrap();
                cache.insert(1, 1).unwrap();
                cache.insert(2, 2).unwrap();

                assert_eq!(cache.peek(&1), Some(&1));
                assert!(cache.contains(&1));
                assert_eq!(cache.peek_last(), Some((&1, &1)));
                assert_eq!(cache.stats(), CacheStats::default());
            }

            #[test]
            fn test_touch_promotes_without_stats() {
                let mut cache = LruDict::new(10).unwrap();
                cache.insert(1, 1).unwrap();
                cache.insert(2, 2).unwrap();

                assert!(cache.touch(&1));
                assert!(!cache.touch(&3));
                assert_eq!(keys_of(&cache), vec![1, 2]);
                assert_eq!(cache.stats().lookups(), 0);
            }

            #[test]
            fn test_recency_rank() {
                let mut cache = LruDict::new(10).unwrap();
                for i in 0..4 {
                    cache.insert(i, i).unwrap();
                }
                assert_eq!(cache.recency_rank(&3), Some(0));
                assert_eq!(cache.recency_rank(&0), Some(3));
                assert_eq!(cache.recency_rank(&9), None);
            }

            #[test]
            fn test_update_existing_promotes() {
                let mut cache = LruDict::new(10).unwrap();
                cache.set("a", 1, 1).unwrap();
                cache.set("b", 2, 1).unwrap();
                cache.set("a", 3, 2).unwrap();
                assert_eq!(keys_of(&cache), vec!["a", "b"]);
                assert_eq!(cache.memory(), 3);
            }

            #[test]
            fn test_iterators_agree_and_report_len() {
                let mut cache = LruDict::new(10).unwrap();
                for i in 0..5u8 {
                    cache.insert(i, i * 10).unwrap();
                }
                let items: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
                assert_eq!(items, vec![(4, 40), (3, 30), (2, 20), (1, 10), (0, 0)]);
                assert_eq!(cache.keys().len(), 5);
                assert_eq!(cache.values().copied().collect::<Vec<_>>(), vec![40, 30, 20, 10, 0]);
                assert_eq!((&cache).into_iter().count(), 5);
                assert_eq!(cache.stats(), CacheStats::default());
            }

            #[test]
            fn test_pop_lru_takes_tail_without_counting() {
                let (mut cache, log) = recording_cache(10);
                cache.set("a".into(), 1, 2).unwrap();
                cache.set("b".into(), 2, 2).unwrap();

                assert_eq!(cache.pop_lru(), Some(("a".to_string(), 1)));
                assert_eq!(cache.memory(), 2);
                assert_eq!(cache.stats().evictions, 0);
                assert!(RefCell::borrow(&log).is_empty());

                cache.pop_lru();
                assert_eq!(cache.pop_lru(), None);
                assert_eq!(cache.memory(), 0);
            }
        }
    }

    // ==============================================
    // SIZE MODE
    // ==============================================
    mod size_mode {
        use super::*;

        #[test]
        fn test_vacuum_evicts_lru_until_within_capacity() {
            let (mut cache, log) = recording_cache(10);
            cache.set("a".into(), 1, 4).unwrap();
            cache.set("b".into(), 2, 4).unwrap();
            cache.set("c".into(), 3, 4).unwrap();

            assert_eq!(keys_of(&cache), vec!["c".to_string(), "b".to_string()]);
            assert_eq!(cache.memory(), 8);
            assert_eq!(cache.stats().evictions, 1);
            assert_eq!(*RefCell::borrow(&log), vec![("a".to_string(), 1)]);
        }

        #[test]
        fn test_vacuum_can_evict_several_entries() {
            let (mut cache, log) = recording_cache(10);
            for (i, k) in ["a", "b", "c", "d", "e"].into_iter().enumerate() {
                cache.set(k.into(), i as u32, 2).unwrap();
            }
            cache.set("big".into(), 99, 9).unwrap();

            assert_eq!(keys_of(&cache), vec!["big".to_string()]);
            assert_eq!(cache.memory(), 9);
            assert_eq!(RefCell::borrow(&log).len(), 5);
            assert_eq!(RefCell::borrow(&log)[0].0, "a");
            assert_eq!(RefCell::borrow(&log)[4].0, "e");
        }

        #[test]
        fn test_growing_update_evicts_others_not_itself() {
            let mut cache = LruDict::new(10).unwrap();
            cache.set("a", 1, 3).unwrap();
            cache.set("b", 2, 3).unwrap();
            cache.set("c", 3, 3).unwrap();

            // "a" is the tail; growing it promotes it first.
            cache.set("a", 10, 7).unwrap();
            assert_eq!(keys_of(&cache), vec!["a", "c"]);
            assert_eq!(cache.memory(), 10);
        }

        #[test]
        fn test_entry_of_exactly_capacity_fits_alone() {
            let mut cache = LruDict::new(10).unwrap();
            cache.set("a", 1, 1).unwrap();
            cache.set("b", 2, 10).unwrap();
            assert_eq!(keys_of(&cache), vec!["b"]);
            assert_eq!(cache.memory(), 10);
        }

        #[test]
        fn test_oversized_set_changes_nothing() {
            let (mut cache, log) = recording_cache(10);
            cache.set("a".into(), 1, 5).unwrap();
            cache.set("b".into(), 2, 5).unwrap();
            cache.get("a");
            let before_keys = keys_of(&cache);
            let before_stats = cache.stats();

            assert_eq!(cache.set("a".into(), 100, 11).unwrap(), None);
            assert_eq!(cache.set("z".into(), 100, 11).unwrap(), None);

            assert_eq!(keys_of(&cache), before_keys);
            assert_eq!(cache.peek("a"), Some(&1));
            assert_eq!(cache.memory(), 10);
            assert_eq!(cache.stats(), before_stats);
            assert!(RefCell::borrow(&log).is_empty());
        }

        #[test]
        fn test_shrinking_update_refunds_difference() {
            let mut cache = LruDict::new(10).unwrap();
            cache.set("a", 1, 6).unwrap();
            cache.set("a", 2, 1).unwrap();
            assert_eq!(cache.memory(), 1);
            cache.insert("a", 3).unwrap();
            assert_eq!(cache.memory(), 0);
        }
    }

    // ==============================================
    // COUNT MODE
    // ==============================================
    mod count_mode {
        use super::*;

        #[test]
        fn test_unsized_inserts_never_evict() {
            let mut cache = LruDict::new(3).unwrap();
            for i in 0..5 {
                cache.insert(i, i).unwrap();
            }
            assert_eq!(cache.len(), 5);
            assert_eq!(cache.memory(), 0);
            assert_eq!(cache.stats().evictions, 0);
        }

        #[test]
        fn test_resize_trims_by_count() {
            let mut cache = LruDict::new(3).unwrap();
            for i in 0..5 {
                cache.insert(i, i).unwrap();
            }
            cache.resize(3).unwrap();
            assert_eq!(keys_of(&cache), vec![4, 3, 2]);
            assert_eq!(cache.capacity(), 3);
            assert_eq!(cache.stats().evictions, 2);
        }

        #[test]
        fn test_resize_notifies_and_refunds() {
            let (mut cache, log) = recording_cache(100);
            cache.set("a".into(), 1, 10).unwrap();
            cache.set("b".into(), 2, 20).unwrap();
            cache.set("c".into(), 3, 30).unwrap();

            cache.resize(1).unwrap();
            assert_eq!(keys_of(&cache), vec!["c".to_string()]);
            assert_eq!(*RefCell::borrow(&log), vec![("a".to_string(), 1), ("b".to_string(), 2)]);
            // Count trim leaves memory above the new capacity.
            assert_eq!(cache.memory(), 30);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn test_resize_zero_is_invalid_and_changes_nothing() {
            let mut cache = LruDict::new(3).unwrap();
            cache.insert(1, 1).unwrap();
            let err = cache.resize(0).unwrap_err();
            assert!(matches!(err, CacheError::InvalidArgument(_)));
            assert_eq!(cache.capacity(), 3);
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn test_growing_resize_evicts_nothing() {
            let mut cache = LruDict::new(2).unwrap();
            cache.insert(1, 1).unwrap();
            cache.insert(2, 2).unwrap();
            cache.resize(50).unwrap();
            assert_eq!(cache.len(), 2);
            assert_eq!(cache.stats().evictions, 0);
        }

        #[test]
        fn test_rejected_set_after_count_shrink_leaves_memory() {
            let mut cache = LruDict::new(32).unwrap();
            cache.set(1, 1, 30).unwrap();
            cache.resize(1).unwrap();
            assert_eq!(cache.memory(), 30);

            // Too large for the new capacity: rejected, so no vacuum runs.
            assert_eq!(cache.set(2, 2, 5).unwrap(), None);
            assert_eq!(cache.memory(), 30);
            assert!(cache.memory() > cache.capacity());
            assert_eq!(keys_of(&cache), vec![1]);
            assert_eq!(cache.stats().evictions, 0);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn test_unsized_insert_vacuums_after_count_shrink() {
            let mut cache = LruDict::new(100).unwrap();
            cache.set("a", 1, 40).unwrap();
            cache.set("b", 2, 40).unwrap();
            cache.resize(2).unwrap();
            assert_eq!(cache.memory(), 80);

            // Even a zero-size write runs the vacuum.
            cache.insert("c", 3).unwrap();
            assert_eq!(keys_of(&cache), vec!["c"]);
            assert_eq!(cache.memory(), 0);
            assert_eq!(cache.stats().evictions, 2);
        }
    }

    // ==============================================
    // LISTENER
    // ==============================================
    mod listener {
        use super::*;

        #[test]
        fn test_listener_receives_evicted_pair() {
            let seen = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&seen);
            let mut cache: LruDict<u32, u32> = LruDict::new(4).unwrap();
            cache.set_listener(Some(listener_fn(move |k: &u32, v: &u32| {
                sink.borrow_mut().push((*k, *v));
                Ok(())
            })));
            cache.set(1, 10, 2).unwrap();
            cache.set(2, 20, 2).unwrap();
            cache.set(3, 30, 2).unwrap();
            assert_eq!(*RefCell::borrow(&seen), vec![(1, 10)]);
        }

        #[test]
        fn test_replacing_and_removing_listener() {
            let (mut cache, log) = recording_cache(2);
            assert!(cache.has_listener());
            assert!(cache.set_listener(None).is_some());
            assert!(!cache.has_listener());

            cache.set("a".into(), 1, 2).unwrap();
            cache.set("b".into(), 2, 2).unwrap();
            assert!(RefCell::borrow(&log).is_empty());
            assert_eq!(cache.stats().evictions, 1);
        }

        #[test]
        fn test_failing_listener_keeps_victim() {
            let mut cache: LruDict<&str, u32> = LruDict::new(10).unwrap();
            cache.set_listener(Some(listener_fn(|_: &&str, _: &u32| Err("refused".into()))));
            cache.set("a", 1, 4).unwrap();
            cache.set("b", 2, 4).unwrap();

            let err = cache.set("c", 3, 4).unwrap_err();
            assert_eq!(err.into_listener_error().unwrap().to_string(), "refused");
            assert_eq!(keys_of(&cache), vec!["c", "b", "a"]);
            assert_eq!(cache.memory(), 12);
            assert_eq!(cache.stats().evictions, 0);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn test_failure_mid_vacuum_keeps_earlier_evictions() {
            let mut cache: LruDict<&str, u32> = LruDict::new(10).unwrap();
            cache.set("a", 1, 3).unwrap();
            cache.set("b", 2, 3).unwrap();
            cache.set("c", 3, 3).unwrap();
            cache.set_listener(Some(listener_fn(|k: &&str, _: &u32| {
                if *k == "b" { Err("b is pinned".into()) } else { Ok(()) }
            })));

            assert!(cache.set("d", 4, 9).is_err());
            assert_eq!(keys_of(&cache), vec!["d", "c", "b"]);
            assert_eq!(cache.memory(), 15);
            assert_eq!(cache.stats().evictions, 1);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn test_failed_vacuum_after_update_keeps_new_value() {
            let mut cache: LruDict<&str, u32> = LruDict::new(10).unwrap();
            cache.set("a", 1, 4).unwrap();
            cache.set("b", 2, 4).unwrap();
            cache.set_listener(Some(listener_fn(|_: &&str, _: &u32| Err("pinned".into()))));

            // Growing "b" overflows; evicting "a" fails, so the old value is lost.
            assert!(cache.set("b", 20, 8).is_err());
            assert_eq!(cache.peek("b"), Some(&20));
            assert_eq!(keys_of(&cache), vec!["b", "a"]);
            assert_eq!(cache.memory(), 12);
            assert_eq!(cache.stats().evictions, 0);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn test_clear_and_remove_do_not_notify() {
            let (mut cache, log) = recording_cache(10);
            cache.insert("a".into(), 1).unwrap();
            cache.insert("b".into(), 2).unwrap();
            cache.remove("a");
            cache.clear();
            assert!(RefCell::borrow(&log).is_empty());
        }
    }

    // ==============================================
    // CLEAR / STATS
    // ==============================================
    mod clearing {
        use super::*;

        #[test]
        fn test_clear_resets_lookups_and_memory_but_not_evictions() {
            let mut cache = LruDict::new(4).unwrap();
            cache.set(1, 1, 3).unwrap();
            cache.set(2, 2, 3).unwrap();
            cache.get(&2);
            cache.get(&7);
            assert_eq!(cache.stats().evictions, 1);

            cache.clear();
            assert_eq!(cache.keys().count(), 0);
            assert_eq!(cache.values().count(), 0);
            assert_eq!(cache.iter().count(), 0);
            assert_eq!(cache.memory(), 0);
            assert_eq!(<(u64, u64, u64)>::from(cache.stats()), (0, 0, 1));
            assert_eq!(cache.peek_first(), None);
            assert_eq!(cache.peek_last(), None);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn test_usable_after_clear() {
            let mut cache = LruDict::new(4).unwrap();
            cache.set("x", 1, 2).unwrap();
            cache.clear();
            cache.set("y", 2, 4).unwrap();
            assert_eq!(keys_of(&cache), vec!["y"]);
            assert_eq!(cache.memory(), 4);
        }
    }

    #[test]
    fn debug_renders_entries_mru_first() {
        let mut cache = LruDict::new(8).unwrap();
        cache.set("a", 1, 2).unwrap();
        cache.set("b", 2, 3).unwrap();
        assert_eq!(
            format!("{cache:?}"),
            r#"LruDict { capacity: 8, memory: 5, entries: {"b": 2, "a": 1}, .. }"#
        );
    }
}
