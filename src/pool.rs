//! Recycled storage for tree nodes.
//!
//! A [`Pool`] hands out [`TreeNode`]s with vacant key slots and takes them
//! back once their key has been dropped. The free list is threaded through
//! the node's own sibling link, so a pool needs no storage beyond a head
//! pointer and two counters.
//!
//! Three strategies are provided, selected by type parameter on the heap:
//!
//! - [`AdaptivePool`] keeps capacity within a bounded hysteresis band
//!   around the live-node count, over-allocating by `GROW`% and releasing
//!   surplus once utilisation falls below `SHRINK`%.
//! - [`LazyShrinkPool`] grows one node at a time and frees eagerly below
//!   the shrink threshold.
//! - [`SystemPool`] forwards every acquire/release to the allocator and
//!   serves as the baseline the recycling pools are measured against.

use std::marker::PhantomData;
use std::ptr::NonNull;

use linked_tree::{Link, TreeNode};

/// Node storage strategy for a heap.
///
/// `acquire` returns a node whose key slot is vacant and whose links are
/// unspecified (a recycled node still carries free-list wiring); the caller
/// must write the key and clear the links before linking it anywhere.
pub trait Pool<T> {
    /// Takes a node out of the pool, allocating if necessary.
    fn acquire(&mut self) -> NonNull<TreeNode<T>>;

    /// Returns a node to the pool.
    ///
    /// # Safety
    ///
    /// `node` must have been acquired from this pool, must no longer be
    /// linked into any structure, and its key slot must be vacant.
    unsafe fn release(&mut self, node: NonNull<TreeNode<T>>);

    /// Number of nodes currently held ready for reuse.
    fn free_count(&self) -> usize;
}

/// The canonical over-allocating free list: grow 150%, shrink at 300%.
pub type FreeList<T> = AdaptivePool<T, 150, 300>;

/// A free list that recycles but never over-allocates.
pub type NoOvergrowFreeList<T> = AdaptivePool<T, 100, 300>;

/// A size-adaptive LIFO free list with bounded hysteresis.
///
/// `capacity` counts every allocated node (in use + free); `size` counts
/// nodes in use. On acquire, capacity is raised to `size * GROW / 100`
/// whenever `size * GROW` exceeds `capacity * 100`; on release it is
/// lowered to `capacity * 100 / GROW` whenever `size * SHRINK` drops below
/// `capacity * 100`. With the default 150/300 parameters the pool keeps at
/// most 50% headroom and lets go of it once two thirds of it is idle.
///
/// `GROW` must be at least 100, or acquire could outrun capacity.
pub struct AdaptivePool<T, const GROW: usize = 150, const SHRINK: usize = 300> {
    first: Link<T>,
    capacity: usize,
    size: usize,
}

impl<T, const GROW: usize, const SHRINK: usize> AdaptivePool<T, GROW, SHRINK> {
    pub fn new() -> Self {
        assert!(GROW >= 100, "grow factor below 100% cannot cover demand");
        AdaptivePool {
            first: None,
            capacity: 0,
            size: 0,
        }
    }

    /// Creates a pool with `capacity` nodes pre-allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut pool = Self::new();
        pool.reserve(capacity);
        pool
    }

    /// Total nodes currently allocated, in use or free.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Adjusts the number of allocated nodes, never dropping below the
    /// number in use (and never below one).
    pub fn reserve(&mut self, capacity: usize) {
        let capacity = capacity.max(self.size).max(1);
        while self.capacity < capacity {
            self.push_free(TreeNode::allocate());
            self.capacity += 1;
        }
        while self.capacity > capacity {
            // Surplus comes off the free-list head; `capacity` is clamped to
            // `size`, so the free list cannot run out before we are done.
            unsafe { TreeNode::free(self.pop_free()) };
            self.capacity -= 1;
        }
    }

    #[inline]
    fn pop_free(&mut self) -> NonNull<TreeNode<T>> {
        let node = self.first.expect("free list is empty");
        unsafe {
            self.first = node.as_ref().next();
            node.as_ref().set_next(None);
        }
        node
    }

    #[inline]
    fn push_free(&mut self, node: NonNull<TreeNode<T>>) {
        unsafe { node.as_ref().set_next(self.first) };
        self.first = Some(node);
    }
}

impl<T, const GROW: usize, const SHRINK: usize> Default for AdaptivePool<T, GROW, SHRINK> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const GROW: usize, const SHRINK: usize> Pool<T> for AdaptivePool<T, GROW, SHRINK> {
    fn acquire(&mut self) -> NonNull<TreeNode<T>> {
        self.size += 1;
        if self.size * GROW > self.capacity * 100 {
            self.reserve(self.size * GROW / 100);
        }
        debug_assert!(self.size <= self.capacity);
        self.pop_free()
    }

    unsafe fn release(&mut self, node: NonNull<TreeNode<T>>) {
        debug_assert!(self.size > 0, "release without a matching acquire");
        self.size -= 1;
        if self.size * SHRINK < self.capacity * 100 {
            self.reserve(self.capacity * 100 / GROW);
        }
        self.push_free(node);
    }

    fn free_count(&self) -> usize {
        self.capacity - self.size
    }
}

impl<T, const GROW: usize, const SHRINK: usize> Drop for AdaptivePool<T, GROW, SHRINK> {
    fn drop(&mut self) {
        while self.first.is_some() {
            unsafe { TreeNode::free(self.pop_free()) };
        }
    }
}

/// A free list that grows on demand by exactly one node and frees released
/// nodes outright while utilisation sits below the shrink threshold.
pub struct LazyShrinkPool<T, const SHRINK: usize = 300> {
    first: Link<T>,
    capacity: usize,
    size: usize,
}

impl<T, const SHRINK: usize> LazyShrinkPool<T, SHRINK> {
    pub fn new() -> Self {
        LazyShrinkPool {
            first: None,
            capacity: 0,
            size: 0,
        }
    }

    /// Total nodes currently allocated, in use or free.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn pop_free(&mut self) -> NonNull<TreeNode<T>> {
        let node = self.first.expect("free list is empty");
        unsafe {
            self.first = node.as_ref().next();
            node.as_ref().set_next(None);
        }
        node
    }
}

impl<T, const SHRINK: usize> Default for LazyShrinkPool<T, SHRINK> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const SHRINK: usize> Pool<T> for LazyShrinkPool<T, SHRINK> {
    fn acquire(&mut self) -> NonNull<TreeNode<T>> {
        self.size += 1;
        if self.first.is_none() {
            self.capacity += 1;
            return TreeNode::allocate();
        }
        self.pop_free()
    }

    unsafe fn release(&mut self, node: NonNull<TreeNode<T>>) {
        debug_assert!(self.size > 0, "release without a matching acquire");
        self.size -= 1;
        if self.size * SHRINK < self.capacity * 100 {
            TreeNode::free(node);
            self.capacity -= 1;
        } else {
            node.as_ref().set_next(self.first);
            self.first = Some(node);
        }
    }

    fn free_count(&self) -> usize {
        self.capacity - self.size
    }
}

impl<T, const SHRINK: usize> Drop for LazyShrinkPool<T, SHRINK> {
    fn drop(&mut self) {
        while self.first.is_some() {
            unsafe { TreeNode::free(self.pop_free()) };
        }
    }
}

/// No recycling at all: every acquire allocates and every release frees.
pub struct SystemPool<T> {
    _marker: PhantomData<T>,
}

impl<T> SystemPool<T> {
    pub fn new() -> Self {
        SystemPool {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SystemPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> for SystemPool<T> {
    fn acquire(&mut self) -> NonNull<TreeNode<T>> {
        TreeNode::allocate()
    }

    unsafe fn release(&mut self, node: NonNull<TreeNode<T>>) {
        TreeNode::free(node);
    }

    fn free_count(&self) -> usize {
        0
    }
}
