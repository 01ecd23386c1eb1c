//! Doubly linked recency list backed by a [`Pool`].
//!
//! Nodes live in pool slots and are linked by [`SlotId`], so handles stay
//! valid while the node is in the list and splicing never moves a value.
//!
//! ## Architecture
//!
//! ```text
//!   pool (Pool<Node<T>>)
//!   ┌────────┬─────────────────────────────────────────────┐
//!   │ SlotId │ Node { value, prev, next }                  │
//!   ├────────┼─────────────────────────────────────────────┤
//!   │ id_1   │ { value: A, prev: None, next: Some(id_2) }  │
//!   │ id_2   │ { value: B, prev: Some(id_1), next: id_3 }  │
//!   │ id_3   │ { value: C, prev: Some(id_2), next: None }  │
//!   └────────┴─────────────────────────────────────────────┘
//!
//!   head ─► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── tail
//!   (least recently used)          (most recently used)
//! ```
//!
//! ## Operations
//! - `push_back(value)`: allocate a slot, attach at the MRU end
//! - `move_to_back(id)`: relink neighbours, reattach at the MRU end, no allocation
//! - `remove(id)`: relink neighbours, release the slot to the pool
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use std::ops::{Index, IndexMut};

use crate::ds::pool::{Pool, PoolConfig, PoolStats, SlotId};

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Recency-ordered list whose nodes are stored in a [`Pool`].
#[derive(Debug)]
pub struct RecencyList<T> {
    pool: Pool<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl<T> RecencyList<T> {
    /// Creates an empty list over a default pool.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Creates an empty list whose pool uses `config`.
    ///
    /// # Panics
    ///
    /// Panics if `config.block_size` is zero.
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            pool: Pool::with_config(config),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Returns the number of nodes in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `id` is currently a node in this list.
    pub fn contains(&self, id: SlotId) -> bool {
        self.pool.contains(id)
    }

    /// Returns the value at the front (LRU) of the list.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|id| self.get(id))
    }

    /// Returns the SlotId at the front (LRU) of the list.
    pub fn front_id(&self) -> Option<SlotId> {
        self.head
    }

    /// Returns the value at the back (MRU) of the list.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|id| self.get(id))
    }

    /// Returns the SlotId at the back (MRU) of the list.
    pub fn back_id(&self) -> Option<SlotId> {
        self.tail
    }

    /// Returns the value for a node id, if present.
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.pool.get(id).map(|node| &node.value)
    }

    /// Returns a mutable reference to a node value, if present.
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.pool.get_mut(id).map(|node| &mut node.value)
    }

    /// Returns the id following `id` towards the MRU end.
    pub fn next_id(&self, id: SlotId) -> Option<SlotId> {
        self.pool.get(id).and_then(|node| node.next)
    }

    /// Inserts a new node at the back (MRU end) and returns its `SlotId`.
    pub fn push_back(&mut self, value: T) -> SlotId {
        let id = self.pool.allocate();
        let prev = self.tail;
        self.pool.construct(
            id,
            Node {
                value,
                prev,
                next: None,
            },
        );
        self.link(prev, Some(id));
        self.tail = Some(id);
        self.len += 1;
        id
    }

    /// Moves an existing node to the back; returns `false` if `id` is not present.
    pub fn move_to_back(&mut self, id: SlotId) -> bool {
        let Some(&Node { prev, next, .. }) = self.pool.get(id) else {
            return false;
        };
        let Some(next) = next else {
            // already the tail
            return true;
        };
        self.link(prev, Some(next));

        let old_tail = self.tail;
        if let Some(node) = self.pool.get_mut(id) {
            node.prev = old_tail;
            node.next = None;
        }
        self.link(old_tail, Some(id));
        self.tail = Some(id);
        true
    }

    /// Removes the node `id` and returns its value; the slot goes back to the pool.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let node = self.pool.destroy(id)?;
        self.pool.deallocate(id);
        self.link(node.prev, node.next);
        self.len -= 1;
        Some(node.value)
    }

    /// Returns an iterator from front (LRU) to back (MRU).
    pub fn iter(&self) -> RecencyListIter<'_, T> {
        RecencyListIter {
            inner: self.iter_entries(),
        }
    }

    /// Returns an iterator of SlotIds from front to back.
    pub fn iter_ids(&self) -> RecencyListIdIter<'_, T> {
        RecencyListIdIter {
            inner: self.iter_entries(),
        }
    }

    /// Returns an iterator of `(SlotId, &T)` from front to back.
    pub fn iter_entries(&self) -> RecencyListEntryIter<'_, T> {
        RecencyListEntryIter {
            pool: &self.pool,
            current: self.head,
        }
    }

    /// Returns the bookkeeping of the backing pool.
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Makes `prev` and `next` adjacent. `None` on either side stands for
    /// the head or tail pointer.
    fn link(&mut self, prev: Option<SlotId>, next: Option<SlotId>) {
        match prev.and_then(|id| self.pool.get_mut(id)) {
            Some(node) => node.next = next,
            None => self.head = next,
        }
        match next.and_then(|id| self.pool.get_mut(id)) {
            Some(node) => node.prev = prev,
            None => self.tail = prev,
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let mut expected_prev = None;
        let mut count = 0usize;
        for id in self.iter_ids() {
            assert_eq!(
                self.pool[id].prev,
                expected_prev,
                "broken prev link at slot {}",
                id.index()
            );
            expected_prev = Some(id);
            count += 1;
            assert!(count <= self.len, "recency list walk exceeds len");
        }
        assert_eq!(expected_prev, self.tail);
        assert_eq!(count, self.len);
        assert_eq!(self.pool.live(), self.len);
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<SlotId> for RecencyList<T> {
    type Output = T;

    fn index(&self, id: SlotId) -> &T {
        &self.pool[id].value
    }
}

impl<T> IndexMut<SlotId> for RecencyList<T> {
    fn index_mut(&mut self, id: SlotId) -> &mut T {
        &mut self.pool[id].value
    }
}

/// Iterator over values from front to back.
pub struct RecencyListIter<'a, T> {
    inner: RecencyListEntryIter<'a, T>,
}

impl<'a, T> Iterator for RecencyListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }
}

/// Iterator over SlotIds from front to back.
pub struct RecencyListIdIter<'a, T> {
    inner: RecencyListEntryIter<'a, T>,
}

impl<T> Iterator for RecencyListIdIter<'_, T> {
    type Item = SlotId;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(id, _)| id)
    }
}

/// Iterator over `(SlotId, &T)` pairs from front to back.
pub struct RecencyListEntryIter<'a, T> {
    pool: &'a Pool<Node<T>>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for RecencyListEntryIter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.pool.get(id)?;
        self.current = node.next;
        Some((id, &node.value))
    }
}
