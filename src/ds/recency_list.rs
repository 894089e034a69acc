//! Recency-ordered list of cache entries backed by a [`SlotArena`].
//!
//! Every live [`Entry`] sits in exactly one arena slot; `prev`/`next` links are
//! `SlotId`s rather than pointers, so promotion is an O(1) splice and there is
//! no aliasing to reason about.
//!
//! ```text
//!   head (MRU) ─► [id_4] ◄──► [id_0] ◄──► [id_2] ◄── tail (LRU)
//! ```
//!
//! The list owns the entries. The orchestrator keeps the key index in step
//! with it; the list itself knows nothing about keys beyond storing them.

use crate::ds::slot_arena::{SlotArena, SlotId};

/// A cached key/value pair and the cost it is charged against capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    key: K,
    value: V,
    size: usize,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V, size: usize) -> Self {
        Self { key, value, size }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Swaps in a new payload and cost, returning the old `(value, size)`.
    pub fn replace(&mut self, value: V, size: usize) -> (V, usize) {
        let old_size = std::mem::replace(&mut self.size, size);
        (std::mem::replace(&mut self.value, value), old_size)
    }

    pub fn into_parts(self) -> (K, V, usize) {
        (self.key, self.value, self.size)
    }
}

#[derive(Debug)]
struct Node<K, V> {
    entry: Entry<K, V>,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Doubly linked MRU→LRU list of entries.
#[derive(Debug)]
pub struct RecencyList<K, V> {
    arena: SlotArena<Node<K, V>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<K, V> RecencyList<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn tail_id(&self) -> Option<SlotId> {
        self.tail
    }

    pub fn front(&self) -> Option<&Entry<K, V>> {
        self.head.and_then(|id| self.get(id))
    }

    pub fn back(&self) -> Option<&Entry<K, V>> {
        self.tail.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: SlotId) -> Option<&Entry<K, V>> {
        self.arena.get(id).map(|node| &node.entry)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut Entry<K, V>> {
        self.arena.get_mut(id).map(|node| &mut node.entry)
    }

    /// Links a new entry in at the head and returns its handle.
    pub fn push_front(&mut self, entry: Entry<K, V>) -> SlotId {
        let id = self.arena.insert(Node {
            entry,
            prev: None,
            next: None,
        });
        self.attach_front(id);
        id
    }

    /// Splices `id` to the head. Returns `false` if `id` is not live.
    pub fn promote(&mut self, id: SlotId) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if self.head == Some(id) {
            return true;
        }
        self.detach(id);
        self.attach_front(id);
        true
    }

    /// Unlinks `id` and frees its slot.
    pub fn remove(&mut self, id: SlotId) -> Option<Entry<K, V>> {
        self.detach(id)?;
        self.arena.remove(id).map(|node| node.entry)
    }

    pub fn pop_back(&mut self) -> Option<Entry<K, V>> {
        let id = self.tail?;
        self.remove(id)
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    /// Walks head to tail.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len(),
        }
    }

    /// Walks head to tail yielding slot handles alongside entries.
    pub fn iter_ids(&self) -> impl Iterator<Item = (SlotId, &Entry<K, V>)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let id = cursor?;
            let node = self.arena.get(id)?;
            cursor = node.next;
            Some((id, &node.entry))
        })
    }

    fn detach(&mut self, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let node = self.arena.get(id)?;
            (node.prev, node.next)
        };

        match prev {
            Some(prev_id) => {
                if let Some(prev_node) = self.arena.get_mut(prev_id) {
                    prev_node.next = next;
                }
            },
            None => self.head = next,
        }
        match next {
            Some(next_id) => {
                if let Some(next_node) = self.arena.get_mut(next_id) {
                    next_node.prev = prev;
                }
            },
            None => self.tail = prev,
        }

        let node = self.arena.get_mut(id)?;
        node.prev = None;
        node.next = None;
        Some(())
    }

    fn attach_front(&mut self, id: SlotId) {
        let old_head = self.head;
        if let Some(node) = self.arena.get_mut(id) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head.and_then(|head| self.arena.get_mut(head)) {
            Some(head_node) => head_node.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    /// Verifies link symmetry, endpoint consistency, and that the walk covers
    /// every occupied slot exactly once. Returns a description of the first
    /// violation found.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.head.is_none() != self.tail.is_none() {
            return Err("head/tail disagree about emptiness".into());
        }
        let mut walked = 0usize;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let node = self
                .arena
                .get(id)
                .ok_or_else(|| format!("list links to vacant slot {}", id.index()))?;
            if node.prev != prev {
                return Err(format!("broken back link at slot {}", id.index()));
            }
            walked += 1;
            if walked > self.len() {
                return Err("cycle in recency list".into());
            }
            prev = Some(id);
            cursor = node.next;
        }
        if prev != self.tail {
            return Err("walk did not end at tail".into());
        }
        if walked != self.len() {
            return Err(format!(
                "walked {walked} entries but arena holds {}",
                self.len()
            ));
        }
        if self.arena.len() + self.arena.free_slots() != self.arena.slot_count() {
            return Err("arena free list out of sync with occupancy".into());
        }
        Ok(())
    }
}

impl<K, V> Default for RecencyList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowing head-to-tail iterator over entries.
pub struct Iter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    cursor: Option<SlotId>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.list.arena.get(id)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
