//! Addressable pairing heap with a lazily maintained top.
//!
//! The heap is a forest of heap-ordered multi-way trees. New elements and
//! cut subtrees are appended to a root list; the actual pairing work is
//! deferred until the top is demanded, at which point one left-to-right
//! pass links adjacent roots pairwise and tracks the running extremum.
//!
//! Three things distinguish it from an ordinary priority queue:
//!
//! - **Addressable.** `push` returns a [`Handle`] that stays valid until
//!   the element is popped, across any number of operations on other
//!   elements, so keys can be changed in place.
//! - **External-metric comparator.** Ordering is decided by a [`Compare`]
//!   object owned by the heap, which may read state that lives outside the
//!   nodes (e.g. a distance array indexed by the stored value). The heap
//!   never interprets keys itself. After mutating comparator state through
//!   [`comparator_mut`](PairingHeap::comparator_mut), the owner must call
//!   [`modify`](PairingHeap::modify) or [`modify_up`](PairingHeap::modify_up)
//!   on the affected handles so the heap re-learns their position.
//! - **Pooled nodes.** Node storage comes from a [`Pool`] chosen by type
//!   parameter; see [`crate::pool`].
//!
//! # Invariants
//!
//! 1. Every node is a root or reachable from exactly one root.
//! 2. No parent is strictly worse than any of its children.
//! 3. A valid top cache points at an extremal root.
//! 4. `len` equals the number of reachable nodes.
//!
//! # Example
//!
//! ```rust
//! use addressable_heap::PairingHeap;
//!
//! let mut heap = PairingHeap::min();
//! heap.push(5u32);
//! let h = heap.push(42u32);
//! heap.push(7u32);
//!
//! assert_eq!(*heap.top(), 5);
//! heap.modify_up(h, 1);
//! assert_eq!(*heap.top(), 1);
//! ```

use std::fmt;
use std::ptr::NonNull;

use linked_tree::{Link, TreeNode};

use crate::compare::{Compare, NaturalOrder};
use crate::pool::{FreeList, Pool};

/// A stable reference to a live heap element.
///
/// Valid from the `push` that produced it until the `pop` that removes the
/// element; all other operations, including pool grow/shrink, leave it
/// intact. A handle is tied to the heap instance that issued it; using it
/// with another heap, or after its element was popped, is undefined
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle {
    node: *const (), // type-erased pointer to the node
}

impl Handle {
    #[inline]
    fn new<T>(node: NonNull<TreeNode<T>>) -> Self {
        Handle {
            node: node.as_ptr() as *const (),
        }
    }

    #[inline]
    unsafe fn as_node<T>(self) -> NonNull<TreeNode<T>> {
        NonNull::new_unchecked(self.node as *mut TreeNode<T>)
    }
}

/// An addressable pairing heap.
///
/// `T` is the element type, `C` the comparator deciding which element is
/// closer to the top, and `P` the node pool. The element an operation calls
/// "better" is the one `C::less` orders first; with [`NaturalOrder`] this
/// is a min-heap.
pub struct PairingHeap<T, C = NaturalOrder, P = FreeList<T>>
where
    C: Compare<T>,
    P: Pool<T>,
{
    /// Null-terminated doubly-linked root list, threaded through the
    /// nodes' sibling links. Appends go to the tail.
    head: Link<T>,
    tail: Link<T>,
    /// Cached extremal root; meaningful only while `top_valid` holds.
    top: Link<T>,
    top_valid: bool,
    len: usize,
    cmp: C,
    pool: P,
}

impl<T: Ord> PairingHeap<T, NaturalOrder, FreeList<T>> {
    /// A min-heap over `T: Ord` with the default free list.
    pub fn min() -> Self {
        Self::new(NaturalOrder)
    }
}

impl<T, C, P> PairingHeap<T, C, P>
where
    C: Compare<T>,
    P: Pool<T>,
{
    /// Creates an empty heap owning `cmp`.
    pub fn new(cmp: C) -> Self
    where
        P: Default,
    {
        Self::with_pool(cmp, P::default())
    }

    /// Creates an empty heap with an explicit node pool.
    pub fn with_pool(cmp: C, pool: P) -> Self {
        PairingHeap {
            head: None,
            tail: None,
            top: None,
            top_valid: false,
            len: 0,
            cmp,
            pool,
        }
    }

    /// Number of elements in the heap.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Alias for [`len`](PairingHeap::len).
    #[inline]
    pub fn size(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Shared access to the comparator.
    #[inline]
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Mutable access to the comparator, for owners that keep ordering
    /// state inside it. After changing state that affects live elements,
    /// follow up with `modify`/`modify_up` on their handles.
    #[inline]
    pub fn comparator_mut(&mut self) -> &mut C {
        &mut self.cmp
    }

    /// Shared access to the node pool.
    #[inline]
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Inserts `value` and returns a handle to it. O(1).
    pub fn push(&mut self, value: T) -> Handle {
        let node = self.pool.acquire();
        unsafe {
            node.as_ref().clear_links();
            node.as_ref().write_key(value);
            self.append_root(node);
        }
        self.len += 1;
        self.top_valid = false;
        Handle::new(node)
    }

    /// Returns the best element. Runs deferred consolidation first.
    ///
    /// # Panics
    ///
    /// Panics if the heap is empty.
    pub fn top(&mut self) -> &T {
        assert!(self.len > 0, "top on an empty heap");
        unsafe {
            if !self.top_valid {
                self.consolidate();
            }
            self.top.unwrap_unchecked().as_ref().key()
        }
    }

    /// Removes the best element. Amortised O(log n); worst case linear in
    /// the number of children of the removed root.
    ///
    /// # Panics
    ///
    /// Panics if the heap is empty.
    pub fn pop(&mut self) {
        assert!(self.len > 0, "pop on an empty heap");
        unsafe {
            if !self.top_valid {
                self.consolidate();
            }
            let top = self.top.take().unwrap_unchecked();
            self.top_valid = false;
            self.unlink_root(top);

            // The children become roots, in child-list order.
            let mut child = top.as_ref().child();
            top.as_ref().set_child(None);
            while let Some(c) = child {
                child = c.as_ref().next();
                c.as_ref().set_parent(None);
                self.append_root(c);
            }

            top.as_ref().drop_key();
            self.pool.release(top);
        }
        self.len -= 1;
    }

    /// Moves the element toward the top of the heap: the new key must not
    /// order after the old one. O(1).
    ///
    /// # Panics
    ///
    /// Panics if the new key is worse than the old key. The handle must be
    /// live (see [`Handle`]).
    pub fn modify_up(&mut self, handle: Handle, value: T) {
        unsafe {
            let node = handle.as_node::<T>();
            assert!(
                !self.cmp.less(node.as_ref().key(), &value),
                "modify_up must not worsen the key"
            );
            self.promote(node, value);
        }
    }

    /// Changes the element's key in either direction. Changes toward the
    /// top cost O(1); the general case costs O(children of the element).
    ///
    /// The handle must be live (see [`Handle`]).
    pub fn modify(&mut self, handle: Handle, value: T) {
        unsafe {
            let node = handle.as_node::<T>();
            if !self.cmp.less(node.as_ref().key(), &value) {
                self.promote(node, value);
                return;
            }

            // The key worsens: write it, then push down every child the new
            // key no longer dominates. Such a child is safe under this
            // node's former parent (it was transitively dominated by it),
            // or as a root.
            *node.as_ref().key_mut() = value;
            let parent = node.as_ref().parent();
            let mut child = node.as_ref().child();
            while let Some(c) = child {
                child = c.as_ref().next();
                if self.cmp.less(c.as_ref().key(), node.as_ref().key()) {
                    TreeNode::unlink_from_parent(c);
                    match parent {
                        Some(p) => TreeNode::link_child(p, c),
                        None => self.append_root(c),
                    }
                }
            }

            // A root position is always safe for the node itself.
            if parent.is_some() {
                TreeNode::unlink_from_parent(node);
                self.append_root(node);
            }
            self.top_valid = false;
        }
    }

    /// Writes the key of a node that is moving toward the top and reroots
    /// it. Shared tail of `modify_up` and the easy half of `modify`.
    unsafe fn promote(&mut self, node: NonNull<TreeNode<T>>, value: T) {
        *node.as_ref().key_mut() = value;
        if node.as_ref().parent().is_some() {
            TreeNode::unlink_from_parent(node);
            self.append_root(node);
        }
        self.top_valid = false;
    }

    /// Appends `node` to the tail of the root list, overwriting its
    /// parent/sibling links.
    #[inline]
    unsafe fn append_root(&mut self, node: NonNull<TreeNode<T>>) {
        let n = node.as_ref();
        n.set_parent(None);
        n.set_next(None);
        n.set_prev(self.tail);
        match self.tail {
            Some(tail) => tail.as_ref().set_next(Some(node)),
            None => self.head = Some(node),
        }
        self.tail = Some(node);
    }

    /// Unlinks a known root from the root list.
    #[inline]
    unsafe fn unlink_root(&mut self, node: NonNull<TreeNode<T>>) {
        debug_assert!(node.as_ref().is_root());
        let prev = node.as_ref().prev();
        let next = node.as_ref().next();
        TreeNode::detach_siblings(node);
        if prev.is_none() {
            self.head = next;
        }
        if next.is_none() {
            self.tail = prev;
        }
    }

    /// One left-to-right pairing pass over the root list.
    ///
    /// Adjacent roots are linked pairwise, loser under winner; an odd last
    /// root is kept as is. The running extremum of the surviving roots is
    /// recorded as the new top. Each adjacent pair is compared exactly
    /// once, and ties keep the earlier root as the winner, so n roots cost
    /// exactly n - 1 comparisons.
    ///
    /// Precondition: the root list is non-empty.
    unsafe fn consolidate(&mut self) {
        let mut current = self.head;
        self.head = None;
        self.tail = None;

        let mut best: Link<T> = None;
        while let Some(a) = current {
            let winner = match a.as_ref().next() {
                Some(b) => {
                    current = b.as_ref().next();
                    if self.cmp.less(b.as_ref().key(), a.as_ref().key()) {
                        TreeNode::link_child(b, a);
                        b
                    } else {
                        TreeNode::link_child(a, b);
                        a
                    }
                }
                None => {
                    current = None;
                    a
                }
            };
            self.append_root(winner);
            best = Some(match best {
                Some(m) if !self.cmp.less(winner.as_ref().key(), m.as_ref().key()) => m,
                _ => winner,
            });
        }

        self.top = best;
        self.top_valid = true;
    }
}

impl<T, C, P> Drop for PairingHeap<T, C, P>
where
    C: Compare<T>,
    P: Pool<T>,
{
    fn drop(&mut self) {
        // Release every reachable node through an explicit worklist; the
        // trees can be arbitrarily deep, so no recursion.
        unsafe {
            let mut stack: Vec<NonNull<TreeNode<T>>> = Vec::new();
            let mut root = self.head;
            while let Some(r) = root {
                root = r.as_ref().next();
                stack.push(r);
            }
            while let Some(node) = stack.pop() {
                let mut child = node.as_ref().child();
                while let Some(c) = child {
                    child = c.as_ref().next();
                    stack.push(c);
                }
                node.as_ref().drop_key();
                self.pool.release(node);
            }
        }
    }
}

impl<T, C, P> fmt::Debug for PairingHeap<T, C, P>
where
    C: Compare<T>,
    P: Pool<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairingHeap")
            .field("len", &self.len)
            .field("top_valid", &self.top_valid)
            .finish()
    }
}

impl<T, C, P> Default for PairingHeap<T, C, P>
where
    C: Compare<T> + Default,
    P: Pool<T> + Default,
{
    fn default() -> Self {
        Self::new(C::default())
    }
}

#[cfg(test)]
impl<T, C, P> PairingHeap<T, C, P>
where
    C: Compare<T>,
    P: Pool<T>,
{
    /// Full structural walk asserting the heap invariants. Test-only; O(n).
    fn assert_invariants(&self) {
        unsafe {
            let mut reachable = 0usize;
            let mut top_seen = false;

            let mut root = self.head;
            let mut prev: Link<T> = None;
            while let Some(r) = root {
                assert!(r.as_ref().is_root(), "root with a parent pointer");
                assert_eq!(r.as_ref().prev(), prev, "root list backlink broken");
                if self.top_valid && self.top == Some(r) {
                    top_seen = true;
                }
                if let (true, Some(top)) = (self.top_valid, self.top) {
                    assert!(
                        !self.cmp.less(r.as_ref().key(), top.as_ref().key()),
                        "cached top is not extremal among roots"
                    );
                }
                reachable += self.assert_subtree(r);
                prev = root;
                root = r.as_ref().next();
            }
            assert_eq!(self.tail, prev, "root list tail out of date");

            assert_eq!(reachable, self.len, "reachable nodes != len");
            if self.top_valid && self.len > 0 {
                assert!(top_seen, "cached top is not in the root list");
            }
        }
    }

    /// Checks one tree: child backlinks, sibling consistency, heap order.
    /// Returns the node count of the subtree.
    unsafe fn assert_subtree(&self, node: NonNull<TreeNode<T>>) -> usize {
        let mut count = 1usize;
        if let Some(first) = node.as_ref().child() {
            assert!(
                TreeNode::sibling_list_is_consistent(first),
                "child list inconsistent"
            );
            assert_eq!(first.as_ref().prev(), None, "first child has a prev link");
            let mut child = Some(first);
            while let Some(c) = child {
                assert_eq!(c.as_ref().parent(), Some(node), "child parent link broken");
                assert!(
                    !self.cmp.less(c.as_ref().key(), node.as_ref().key()),
                    "heap order violated between parent and child"
                );
                count += self.assert_subtree(c);
                assert!(count <= self.len, "more reachable nodes than len (cycle?)");
                child = c.as_ref().next();
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{AdaptivePool, LazyShrinkPool, SystemPool};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn min_heap() -> PairingHeap<u32> {
        PairingHeap::min()
    }

    #[test]
    fn push_top_pop_single_element() {
        let mut heap = min_heap();
        heap.push(7);
        heap.assert_invariants();
        assert_eq!(heap.len(), 1);
        assert_eq!(*heap.top(), 7);
        heap.assert_invariants();
        heap.pop();
        assert!(heap.is_empty());
        heap.assert_invariants();
    }

    #[test]
    fn two_equal_keys_pop_in_push_order() {
        let mut heap = min_heap();
        let first = heap.push(4);
        let _second = heap.push(4);
        // The earlier root wins the tie and becomes the cached top.
        assert_eq!(*heap.top(), 4);
        heap.assert_invariants();
        heap.modify_up(first, 4); // no-op change on the winner
        assert_eq!(*heap.top(), 4);
        heap.pop();
        assert_eq!(*heap.top(), 4);
        heap.pop();
        assert!(heap.is_empty());
    }

    #[test]
    fn top_is_minimum_under_interleaving() {
        let mut heap = min_heap();
        for key in [5u32, 7, 12, 1337, 1, 3] {
            heap.push(key);
            heap.assert_invariants();
        }
        assert_eq!(*heap.top(), 1);
        heap.assert_invariants();
        heap.pop();
        heap.assert_invariants();
        assert_eq!(*heap.top(), 3);
    }

    #[test]
    fn modify_up_on_a_root() {
        let mut heap = min_heap();
        let h = heap.push(50);
        heap.push(10);
        heap.modify_up(h, 5);
        heap.assert_invariants();
        assert_eq!(*heap.top(), 5);
    }

    #[test]
    fn modify_without_key_change_keeps_structure() {
        let mut heap = min_heap();
        heap.push(5);
        let h = heap.push(9);
        heap.push(3);
        assert_eq!(*heap.top(), 3);
        heap.modify(h, 9);
        heap.assert_invariants();
        assert_eq!(*heap.top(), 3);
        assert_eq!(heap.len(), 3);
    }

    #[test]
    #[should_panic(expected = "modify_up must not worsen the key")]
    fn modify_up_rejects_worsening() {
        let mut heap = min_heap();
        let h = heap.push(5);
        heap.modify_up(h, 6);
    }

    #[test]
    #[should_panic(expected = "top on an empty heap")]
    fn top_on_empty_panics() {
        let mut heap = min_heap();
        heap.top();
    }

    #[test]
    fn modify_moves_many_children_to_root() {
        let mut heap = min_heap();
        let h = heap.push(0);
        for key in 10..20u32 {
            heap.push(key);
        }
        // Consolidate so that 0 collects children, then worsen it past all
        // of them.
        assert_eq!(*heap.top(), 0);
        heap.modify(h, 1_000);
        heap.assert_invariants();
        assert_eq!(*heap.top(), 10);
        let mut seen = Vec::new();
        while !heap.is_empty() {
            seen.push(*heap.top());
            heap.pop();
            heap.assert_invariants();
        }
        assert_eq!(seen, vec![10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 1_000]);
    }

    #[test]
    fn handles_stay_valid_across_other_operations() {
        let mut heap = min_heap();
        let handles: Vec<_> = (0..64u32).map(|k| heap.push(100 + k)).collect();
        // Churn: pop a few minima, push new elements.
        for _ in 0..8 {
            heap.pop();
        }
        for k in 0..8u32 {
            heap.push(500 + k);
        }
        // The surviving original handles still address their elements.
        for (i, h) in handles.iter().enumerate().skip(8) {
            heap.modify_up(*h, i as u32);
            heap.assert_invariants();
        }
        assert_eq!(*heap.top(), 8);
    }

    #[test]
    fn len_tracks_pushes_and_pops() {
        let mut heap = min_heap();
        let mut expected = 0usize;
        for round in 0..6u32 {
            heap.push(round);
            heap.pop();
            heap.push(round * 10);
            expected += 1;
            assert_eq!(heap.len(), expected);
        }
    }

    #[test]
    fn works_with_system_pool_and_lazy_pool() {
        let mut direct: PairingHeap<u32, NaturalOrder, SystemPool<u32>> =
            PairingHeap::new(NaturalOrder);
        let mut lazy: PairingHeap<u32, NaturalOrder, LazyShrinkPool<u32>> =
            PairingHeap::new(NaturalOrder);
        for key in [9u32, 2, 11, 4] {
            direct.push(key);
            lazy.push(key);
        }
        for expected in [2u32, 4, 9, 11] {
            assert_eq!(*direct.top(), expected);
            assert_eq!(*lazy.top(), expected);
            direct.pop();
            lazy.pop();
        }
    }

    #[test]
    fn with_pool_runs_inside_the_preallocated_capacity() {
        let mut heap: PairingHeap<u32> =
            PairingHeap::with_pool(NaturalOrder, AdaptivePool::with_capacity(32));
        assert_eq!(heap.pool().capacity(), 32);
        assert_eq!(heap.pool().free_count(), 32);

        for key in 0..16u32 {
            heap.push(key);
        }
        // Demand stays within the preallocation, so nothing new is
        // allocated.
        assert_eq!(heap.pool().capacity(), 32);
        assert_eq!(heap.pool().free_count(), 16);

        for expected in 0..16u32 {
            assert_eq!(*heap.top(), expected);
            heap.pop();
        }
        assert!(heap.is_empty());
        assert_eq!(heap.pool().free_count(), heap.pool().capacity());
    }

    #[test]
    fn pool_observes_recycling_across_push_and_pop() {
        let mut heap = min_heap();
        for key in [5u32, 7, 12, 1337, 1, 3] {
            heap.push(key);
        }
        let capacity = heap.pool().capacity();
        let free_before = heap.pool().free_count();

        heap.pop();
        assert_eq!(heap.pool().free_count(), free_before + 1);

        // The recycled node covers the next push with no fresh allocation.
        heap.push(6);
        assert_eq!(heap.pool().free_count(), free_before);
        assert_eq!(heap.pool().capacity(), capacity);
    }

    #[test]
    fn drop_releases_whole_forest() {
        // Keys with drop glue; miri/leak checkers would flag a leak here.
        let mut heap: PairingHeap<String, _, FreeList<String>> =
            PairingHeap::new(|a: &String, b: &String| a < b);
        for i in 0..32 {
            heap.push(format!("key-{i:02}"));
        }
        assert_eq!(*heap.top(), "key-00");
        heap.pop();
        // Remaining 31 nodes, some with children, are torn down by Drop.
    }

    #[test]
    fn random_operations_preserve_invariants() {
        let mut rng = StdRng::seed_from_u64(0xDECAF);
        let mut heap = min_heap();
        let mut live: Vec<(Handle, u32)> = Vec::new();
        let mut counter = 0u32;

        for _ in 0..2_000 {
            match rng.gen_range(0..4u8) {
                0 | 1 => {
                    // Unique keys (counter stays below the stride) so the
                    // model can track the popped element by value.
                    let key = rng.gen_range(0..1_000_000) * 4096 + counter;
                    counter += 1;
                    live.push((heap.push(key), key));
                }
                2 if !live.is_empty() => {
                    let min = live.iter().map(|&(_, k)| k).min().unwrap();
                    assert_eq!(*heap.top(), min);
                    heap.pop();
                    let at = live.iter().position(|&(_, k)| k == min).unwrap();
                    live.swap_remove(at);
                }
                3 if !live.is_empty() => {
                    let at = rng.gen_range(0..live.len());
                    let (handle, old) = live[at];
                    let key = rng.gen_range(0..1_000_000) * 4096 + counter;
                    counter += 1;
                    if key <= old {
                        heap.modify_up(handle, key);
                    } else {
                        heap.modify(handle, key);
                    }
                    live[at].1 = key;
                }
                _ => {}
            }
            heap.assert_invariants();
        }

        let mut drained = Vec::new();
        while !heap.is_empty() {
            drained.push(*heap.top());
            heap.pop();
        }
        let mut expected: Vec<u32> = live.iter().map(|&(_, k)| k).collect();
        expected.sort_unstable();
        assert_eq!(drained, expected);
    }
}
