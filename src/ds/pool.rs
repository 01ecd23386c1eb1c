//! Block pool of fixed-size, same-type slots addressed by [`SlotId`].
//!
//! Slots are carved out of bulk blocks. A block is allocated once and never
//! reallocated or returned to the system allocator before the pool is
//! dropped, so a slot's address stays stable for the pool's lifetime.
//!
//! ## Architecture
//!
//! ```text
//!   blocks (oldest first)
//!   ┌─────────────────────────────┐  ┌───────────────────────────────┐
//!   │ block 0 (initial_block)     │  │ block 1 (block_size)          │
//!   │ [0] [1] [2] ... [first-1]   │  │ [first] [first+1] ... (spare) │
//!   └─────────────────────────────┘  └───────────────────────────────┘
//!                                                      ▲
//!                                        next fresh slot of current block
//!
//!   free_head ─► [7] ─► [3] ─► [12] ─► None     (LIFO, links live in slots)
//! ```
//!
//! ## Allocation order
//! 1. Pop the free list (only when `reuse_freed` is enabled).
//! 2. Take the next unused slot of the current block.
//! 3. Allocate a new block of `growth_target()` slots and take its first slot.
//!
//! Bulk requests (`allocate_array`) bypass the blocks entirely and use the
//! general-purpose allocator, since consecutive slots are not contiguous
//! across block boundaries.
//!
//! ## Performance
//! - `allocate` / `deallocate`: O(1) amortized, no allocation unless a new
//!   block is needed
//! - `get` / `construct` / `destroy`: O(1)

use std::alloc::Layout;
use std::ops::{Index, IndexMut};

use crate::error::{AllocError, ConfigError};

/// Number of slots per block when no size is configured.
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Stable handle to a pool slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Returns the global slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Sizing and reuse policy of a [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Slots in the first block; `0` means `block_size`.
    pub initial_block: usize,
    /// Slots in every block after the first. Must be positive.
    pub block_size: usize,
    /// Whether deallocated slots are recycled through the free list.
    pub reuse_freed: bool,
}

impl PoolConfig {
    /// Config with the given block size, no initial override, reuse enabled.
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            block_size,
            ..Self::default()
        }
    }

    /// Checks that the block size is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::new("pool block_size must be > 0"));
        }
        Ok(())
    }

    fn first_block(&self) -> usize {
        if self.initial_block == 0 {
            self.block_size
        } else {
            self.initial_block
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_block: 0,
            block_size: DEFAULT_BLOCK_SIZE,
            reuse_freed: true,
        }
    }
}

/// Point-in-time view of a pool's bookkeeping.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub blocks: usize,
    pub capacity: usize,
    pub live: usize,
    pub free: usize,
    pub growth_target: usize,
}

#[derive(Debug)]
enum Slot<T> {
    /// Handed out, nothing constructed in it.
    Vacant,
    Occupied(T),
    /// On the free list; holds the next free slot.
    Free(Option<SlotId>),
    /// Released without reuse; inert until the pool is dropped.
    Retired,
}

/// Pool of fixed-size slots grown in bulk blocks.
///
/// # Example
///
/// ```
/// use poolru::ds::{Pool, PoolConfig};
///
/// let mut pool: Pool<&str> = Pool::with_config(PoolConfig {
///     initial_block: 2,
///     block_size: 4,
///     reuse_freed: true,
/// });
///
/// let a = pool.allocate();
/// pool.construct(a, "a");
/// assert_eq!(pool[a], "a");
///
/// assert_eq!(pool.destroy(a), Some("a"));
/// pool.deallocate(a);
///
/// // The freed slot is handed out again before any fresh slot.
/// assert_eq!(pool.allocate(), a);
/// ```
#[derive(Debug)]
pub struct Pool<T> {
    blocks: Vec<Vec<Slot<T>>>,
    free_head: Option<SlotId>,
    free_len: usize,
    live: usize,
    config: PoolConfig,
}

impl<T> Pool<T> {
    /// Creates an empty pool with [`DEFAULT_BLOCK_SIZE`] blocks and free-list reuse.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Creates an empty pool; no memory is allocated until the first slot is.
    ///
    /// # Panics
    ///
    /// Panics if `config.block_size` is zero.
    pub fn with_config(config: PoolConfig) -> Self {
        if let Err(err) = config.validate() {
            panic!("{err}");
        }
        Self::from_valid(config)
    }

    /// Fallible counterpart of [`Pool::with_config`].
    pub fn try_with_config(config: PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: PoolConfig) -> Self {
        Self {
            blocks: Vec::new(),
            free_head: None,
            free_len: 0,
            live: 0,
            config,
        }
    }

    /// Returns the pool configuration.
    pub fn config(&self) -> PoolConfig {
        self.config
    }

    /// Hands out one slot, growing the pool by a block if needed.
    ///
    /// Allocation failure of a new block is unrecoverable and is routed to
    /// [`std::alloc::handle_alloc_error`]; use [`Pool::try_allocate`] to
    /// observe it instead.
    pub fn allocate(&mut self) -> SlotId {
        match self.try_allocate() {
            Ok(id) => id,
            Err(err) => match err.layout() {
                Some(layout) => std::alloc::handle_alloc_error(layout),
                None => panic!("{err}"),
            },
        }
    }

    /// Hands out one slot, returning `AllocError` if a needed block cannot
    /// be allocated.
    pub fn try_allocate(&mut self) -> Result<SlotId, AllocError> {
        if let Some(id) = self.pop_free() {
            self.live += 1;
            return Ok(id);
        }

        let current_full = match self.blocks.last() {
            Some(block) => block.len() == self.block_len(self.blocks.len() - 1),
            None => true,
        };
        if current_full {
            self.grow()?;
        }

        let block_idx = self.blocks.len() - 1;
        let base = self.block_base(block_idx);
        let Some(block) = self.blocks.last_mut() else {
            unreachable!("pool has a block after growing");
        };
        let id = SlotId(base + block.len());
        block.push(Slot::Vacant);
        self.live += 1;
        Ok(id)
    }

    /// Releases one slot.
    ///
    /// Any value still constructed in it is dropped. With reuse enabled the
    /// slot goes on the free list; otherwise it stays inert until the pool
    /// is dropped. Releasing an id that is not handed out does nothing.
    pub fn deallocate(&mut self, id: SlotId) {
        let reuse = self.config.reuse_freed;
        let free_head = self.free_head;
        let Some(slot) = self.slot_mut(id) else {
            return;
        };
        if matches!(slot, Slot::Free(_) | Slot::Retired) {
            return;
        }
        *slot = if reuse {
            Slot::Free(free_head)
        } else {
            Slot::Retired
        };
        if reuse {
            self.free_head = Some(id);
            self.free_len += 1;
        }
        self.live -= 1;
    }

    /// Places `value` into a handed-out slot and returns a reference to it.
    ///
    /// A value already in the slot is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `id` was never allocated or has been released.
    pub fn construct(&mut self, id: SlotId, value: T) -> &mut T {
        match self.slot_mut(id) {
            Some(slot) if !matches!(slot, Slot::Free(_) | Slot::Retired) => {
                *slot = Slot::Occupied(value);
                match slot {
                    Slot::Occupied(value) => value,
                    _ => unreachable!(),
                }
            },
            _ => panic!("construct into unallocated slot {}", id.0),
        }
    }

    /// Takes the value out of a slot, leaving the slot handed out but empty.
    pub fn destroy(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slot_mut(id)?;
        if !matches!(slot, Slot::Occupied(_)) {
            return None;
        }
        match std::mem::replace(slot, Slot::Vacant) {
            Slot::Occupied(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value held at `id`, if one is constructed.
    pub fn get(&self, id: SlotId) -> Option<&T> {
        let (block, offset) = self.locate(id);
        match self.blocks.get(block)?.get(offset)? {
            Slot::Occupied(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value held at `id`.
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        match self.slot_mut(id)? {
            Slot::Occupied(value) => Some(value),
            _ => None,
        }
    }

    /// Returns `true` if a value is constructed at `id`.
    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    /// Requests storage for `count` elements from the general-purpose
    /// allocator. The blocks are not involved.
    pub fn allocate_array(&self, count: usize) -> Vec<T> {
        Vec::with_capacity(count)
    }

    /// Fallible counterpart of [`Pool::allocate_array`].
    pub fn try_allocate_array(&self, count: usize) -> Result<Vec<T>, AllocError> {
        let mut array = Vec::new();
        array
            .try_reserve_exact(count)
            .map_err(|_| AllocError::new(count, Layout::array::<T>(count).ok()))?;
        Ok(array)
    }

    /// Releases a bulk array obtained from [`Pool::allocate_array`].
    pub fn deallocate_array(&self, array: Vec<T>) {
        drop(array);
    }

    /// Number of slots handed out and not yet released.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Total slots across all blocks.
    pub fn capacity(&self) -> usize {
        match self.blocks.len() {
            0 => 0,
            n => self.config.first_block() + (n - 1) * self.config.block_size,
        }
    }

    /// Number of blocks obtained from the system allocator.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of slots waiting on the free list.
    pub fn free_len(&self) -> usize {
        self.free_len
    }

    /// Size of the next block this pool would allocate.
    pub fn growth_target(&self) -> usize {
        if self.blocks.is_empty() {
            self.config.first_block()
        } else {
            self.config.block_size
        }
    }

    /// Returns a snapshot of the pool's bookkeeping.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            blocks: self.blocks.len(),
            capacity: self.capacity(),
            live: self.live,
            free: self.free_len,
            growth_target: self.growth_target(),
        }
    }

    fn pop_free(&mut self) -> Option<SlotId> {
        if !self.config.reuse_freed {
            return None;
        }
        let id = self.free_head?;
        let slot = self.slot_mut(id)?;
        let next = match slot {
            Slot::Free(next) => *next,
            _ => return None,
        };
        *slot = Slot::Vacant;
        self.free_head = next;
        self.free_len -= 1;
        Some(id)
    }

    fn grow(&mut self) -> Result<(), AllocError> {
        let slots = self.growth_target();
        let mut block = Vec::new();
        block
            .try_reserve_exact(slots)
            .map_err(|_| AllocError::new(slots, Layout::array::<Slot<T>>(slots).ok()))?;
        self.blocks.push(block);

        #[cfg(feature = "tracing")]
        tracing::trace!(
            slots,
            blocks = self.blocks.len(),
            capacity = self.capacity(),
            "pool grew by one block"
        );

        Ok(())
    }

    fn block_len(&self, block: usize) -> usize {
        if block == 0 {
            self.config.first_block()
        } else {
            self.config.block_size
        }
    }

    fn block_base(&self, block: usize) -> usize {
        if block == 0 {
            0
        } else {
            self.config.first_block() + (block - 1) * self.config.block_size
        }
    }

    fn locate(&self, id: SlotId) -> (usize, usize) {
        let first = self.config.first_block();
        if id.0 < first {
            (0, id.0)
        } else {
            let rest = id.0 - first;
            (1 + rest / self.config.block_size, rest % self.config.block_size)
        }
    }

    fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot<T>> {
        let (block, offset) = self.locate(id);
        self.blocks.get_mut(block)?.get_mut(offset)
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloning yields an empty pool sized to the source's current growth
/// target; blocks and free list stay with the source.
impl<T> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self::from_valid(PoolConfig {
            initial_block: self.growth_target(),
            ..self.config
        })
    }
}

/// Pools compare by capability: same block size and reuse policy.
impl<T> PartialEq for Pool<T> {
    fn eq(&self, other: &Self) -> bool {
        self.config.block_size == other.config.block_size
            && self.config.reuse_freed == other.config.reuse_freed
    }
}

impl<T> Eq for Pool<T> {}

impl<T> Index<SlotId> for Pool<T> {
    type Output = T;

    fn index(&self, id: SlotId) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("slot {} holds no value", id.0),
        }
    }
}

impl<T> IndexMut<SlotId> for Pool<T> {
    fn index_mut(&mut self, id: SlotId) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("slot {} holds no value", id.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn small(reuse_freed: bool) -> Pool<u32> {
        Pool::with_config(PoolConfig {
            initial_block: 2,
            block_size: 3,
            reuse_freed,
        })
    }

    #[test]
    fn pool_allocates_sequentially_within_blocks() {
        let mut pool = small(true);
        assert_eq!(pool.block_count(), 0);
        assert_eq!(pool.capacity(), 0);

        let ids: Vec<_> = (0..6).map(|_| pool.allocate()).collect();
        let indices: Vec<_> = ids.iter().map(|id| id.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);

        // 2 (initial) + 3 + 3
        assert_eq!(pool.block_count(), 3);
        assert_eq!(pool.capacity(), 8);
        assert_eq!(pool.live(), 6);
    }

    #[test]
    fn pool_growth_target_switches_after_first_block() {
        let mut pool = small(true);
        assert_eq!(pool.growth_target(), 2);
        pool.allocate();
        assert_eq!(pool.growth_target(), 3);
    }

    #[test]
    fn pool_zero_initial_block_uses_block_size() {
        let mut pool: Pool<u8> = Pool::with_config(PoolConfig::with_block_size(4));
        assert_eq!(pool.growth_target(), 4);
        pool.allocate();
        assert_eq!(pool.capacity(), 4);
    }

    #[test]
    fn pool_construct_get_destroy() {
        let mut pool = small(true);
        let id = pool.allocate();
        assert_eq!(pool.get(id), None);

        *pool.construct(id, 7) += 1;
        assert_eq!(pool.get(id), Some(&8));
        assert!(pool.contains(id));

        pool[id] = 9;
        assert_eq!(pool[id], 9);

        assert_eq!(pool.destroy(id), Some(9));
        assert_eq!(pool.destroy(id), None);
        assert!(!pool.contains(id));
    }

    #[test]
    fn pool_free_list_is_lifo_and_preempts_fresh_slots() {
        let mut pool = small(true);
        let a = pool.allocate();
        let b = pool.allocate();
        let c = pool.allocate();

        pool.deallocate(a);
        pool.deallocate(c);
        assert_eq!(pool.free_len(), 2);
        assert_eq!(pool.live(), 1);

        let blocks = pool.block_count();
        assert_eq!(pool.allocate(), c);
        assert_eq!(pool.allocate(), a);
        assert_eq!(pool.block_count(), blocks);
        assert_eq!(pool.free_len(), 0);
        assert_eq!(pool.live(), 3);
        assert!(!pool.contains(b));
    }

    #[test]
    fn pool_without_reuse_never_recycles() {
        let mut pool = small(false);
        let a = pool.allocate();
        pool.deallocate(a);
        assert_eq!(pool.free_len(), 0);
        assert_eq!(pool.live(), 0);

        pool.deallocate(a);
        assert_eq!(pool.live(), 0);

        let b = pool.allocate();
        assert_ne!(a, b);
        assert_eq!(b.index(), 1);
    }

    #[test]
    fn pool_double_deallocate_is_ignored() {
        let mut pool = small(true);
        let a = pool.allocate();
        pool.deallocate(a);
        pool.deallocate(a);
        assert_eq!(pool.free_len(), 1);
        assert_eq!(pool.allocate(), a);
        assert_ne!(pool.allocate(), a);
    }

    #[test]
    fn pool_deallocate_drops_constructed_value() {
        let tracker = Rc::new(());
        let mut pool: Pool<Rc<()>> = Pool::new();
        let id = pool.allocate();
        pool.construct(id, Rc::clone(&tracker));
        assert_eq!(Rc::strong_count(&tracker), 2);

        pool.deallocate(id);
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn pool_drop_releases_values() {
        let tracker = Rc::new(());
        {
            let mut pool: Pool<Rc<()>> = Pool::with_config(PoolConfig::with_block_size(2));
            for _ in 0..5 {
                let id = pool.allocate();
                pool.construct(id, Rc::clone(&tracker));
            }
            assert_eq!(Rc::strong_count(&tracker), 6);
        }
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn pool_addresses_are_stable_across_growth() {
        let mut pool = small(true);
        let first = pool.allocate();
        pool.construct(first, 1);
        let addr = pool.get(first).map(|v| v as *const u32);

        for i in 0..100 {
            let id = pool.allocate();
            pool.construct(id, i);
        }

        assert_eq!(pool.get(first).map(|v| v as *const u32), addr);
        assert_eq!(pool[first], 1);
    }

    #[test]
    fn pool_clone_is_empty_with_growth_target() {
        let mut pool = small(true);
        let id = pool.allocate();
        pool.construct(id, 1);

        let copy = pool.clone();
        assert_eq!(copy.block_count(), 0);
        assert_eq!(copy.live(), 0);
        assert_eq!(copy.growth_target(), 3);
        assert!(copy.get(id).is_none());
        assert_eq!(copy, pool);
    }

    #[test]
    fn pool_move_carries_blocks_and_free_list() {
        let mut pool = small(true);
        let a = pool.allocate();
        let b = pool.allocate();
        pool.construct(b, 5);
        pool.deallocate(a);

        let mut moved = pool;
        assert_eq!(moved[b], 5);
        assert_eq!(moved.free_len(), 1);
        assert_eq!(moved.allocate(), a);
    }

    #[test]
    fn pool_equality_is_by_capability() {
        let a: Pool<u32> = Pool::with_config(PoolConfig::with_block_size(8));
        let mut b: Pool<u32> = Pool::with_config(PoolConfig {
            initial_block: 3,
            block_size: 8,
            reuse_freed: true,
        });
        b.allocate();
        assert_eq!(a, b);

        let c: Pool<u32> = Pool::with_config(PoolConfig {
            reuse_freed: false,
            ..PoolConfig::with_block_size(8)
        });
        assert_ne!(a, c);
    }

    #[test]
    fn pool_rejects_zero_block_size() {
        let err = Pool::<u32>::try_with_config(PoolConfig::with_block_size(0)).unwrap_err();
        assert!(err.message().contains("block_size"));
    }

    #[test]
    #[should_panic(expected = "block_size")]
    fn pool_with_config_panics_on_zero_block_size() {
        let _ = Pool::<u32>::with_config(PoolConfig::with_block_size(0));
    }

    #[test]
    #[should_panic(expected = "unallocated")]
    fn pool_construct_into_free_slot_panics() {
        let mut pool = small(true);
        let id = pool.allocate();
        pool.deallocate(id);
        pool.construct(id, 1);
    }

    #[test]
    fn pool_bulk_arrays_bypass_blocks() {
        let pool: Pool<u64> = Pool::new();
        let mut array = pool.allocate_array(16);
        assert!(array.capacity() >= 16);
        array.extend(0..16);
        pool.deallocate_array(array);
        assert_eq!(pool.block_count(), 0);

        let array = pool.try_allocate_array(4).unwrap();
        assert!(array.capacity() >= 4);
    }

    #[test]
    fn pool_bulk_overflow_is_reported() {
        let pool: Pool<u64> = Pool::new();
        let err = pool.try_allocate_array(usize::MAX).unwrap_err();
        assert_eq!(err.slots(), usize::MAX);
    }

    #[test]
    fn pool_failed_grow_is_reported_without_partial_state() {
        let slots = usize::MAX / 4;
        let mut pool: Pool<u32> = Pool::with_config(PoolConfig {
            initial_block: slots,
            block_size: 4,
            reuse_freed: true,
        });

        let err = pool.try_allocate().unwrap_err();
        assert_eq!(err.slots(), slots);
        assert!(err.layout().is_none());
        assert_eq!(pool.block_count(), 0);
        assert_eq!(pool.live(), 0);
        assert_eq!(pool.capacity(), 0);

        // the failed request stays the growth target and fails the same way
        assert_eq!(pool.growth_target(), slots);
        assert!(pool.try_allocate().is_err());
        assert_eq!(pool.stats(), PoolStats {
            growth_target: slots,
            ..PoolStats::default()
        });
    }

    #[test]
    fn pool_handles_zero_sized_values() {
        let mut pool: Pool<()> = Pool::with_config(PoolConfig::with_block_size(2));
        let ids: Vec<_> = (0..5).map(|_| pool.allocate()).collect();
        for &id in &ids {
            pool.construct(id, ());
        }
        assert_eq!(pool.block_count(), 3);
        assert!(ids.iter().all(|&id| pool.contains(id)));
    }

    #[test]
    fn pool_stats_track_bookkeeping() {
        let mut pool = small(true);
        let a = pool.allocate();
        pool.allocate();
        pool.allocate();
        pool.deallocate(a);
        assert_eq!(
            pool.stats(),
            PoolStats {
                blocks: 2,
                capacity: 5,
                live: 2,
                free: 1,
                growth_target: 3,
            }
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: freed slots come back (most recent first) before any new block
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_freed_slots_recycled_before_growth(
                count in 1usize..64,
                freed in prop::collection::vec(any::<prop::sample::Index>(), 0..32)
            ) {
                let mut pool: Pool<usize> = Pool::with_config(PoolConfig::with_block_size(8));
                let ids: Vec<_> = (0..count).map(|_| pool.allocate()).collect();

                let mut released = Vec::new();
                for pick in freed {
                    let id = ids[pick.index(ids.len())];
                    if !released.contains(&id) {
                        pool.deallocate(id);
                        released.push(id);
                    }
                }

                let blocks = pool.block_count();
                while let Some(expected) = released.pop() {
                    prop_assert_eq!(pool.allocate(), expected);
                }
                prop_assert_eq!(pool.block_count(), blocks);
                prop_assert_eq!(pool.live(), count);
            }
        }
    }
}
