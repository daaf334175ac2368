//! Addressable pairing heap with external-metric comparators.
//!
//! This crate provides a mergeable-tree priority queue built for workloads
//! that change priorities in place, Dijkstra-style graph searches above
//! all. Beyond `push`/`top`/`pop` it hands out stable [`Handle`]s to every
//! inserted element and supports both directions of key change:
//! [`PairingHeap::modify_up`] (toward the top, O(1)) and
//! [`PairingHeap::modify`] (the general case, repairing the heap property
//! downward).
//!
//! # Components
//!
//! - [`heap`]: the pairing heap itself (lazy top cache, one-pass root
//!   consolidation, handle-based key updates).
//! - [`compare`]: the [`Compare`] capability. The comparator is a value
//!   owned by the heap and may read state outside the nodes, so a heap key
//!   can be a mere index into caller-maintained data.
//! - [`pool`]: recycling node storage. A size-adaptive free list with
//!   bounded hysteresis, a lazy-shrink variant, and an allocator
//!   passthrough baseline.
//! - [`graph`]: a static CSR adjacency graph built from a sorted edge
//!   list.
//! - [`dijkstra`]: the reference workload tying it all together, SSSP
//!   where the distance array lives behind the heap's comparator.
//!
//! # Example
//!
//! ```rust
//! use addressable_heap::{PairingHeap, shortest_paths};
//! use addressable_heap::graph::{InputEdge, StaticGraph};
//!
//! // Handles survive arbitrary other operations.
//! let mut heap = PairingHeap::min();
//! heap.push(5u32);
//! let h = heap.push(1337u32);
//! heap.push(3u32);
//! heap.pop();
//! heap.modify_up(h, 2);
//! assert_eq!(*heap.top(), 2);
//!
//! // Shortest paths over a two-edge path graph.
//! let graph = StaticGraph::new(
//!     3,
//!     vec![InputEdge::new(0, 1, 1u32), InputEdge::new(1, 2, 1u32)],
//! );
//! assert_eq!(shortest_paths(&graph, 0), vec![0, 1, 2]);
//! ```

pub mod compare;
pub mod dijkstra;
pub mod graph;
pub mod heap;
pub mod pool;

pub use compare::{Compare, NaturalOrder};
pub use dijkstra::{shortest_paths, DistanceMetric, NodeKey, Weight, INFINITY};
pub use graph::{EdgeId, InputEdge, NodeId, StaticGraph};
pub use heap::{Handle, PairingHeap};
pub use pool::{AdaptivePool, FreeList, LazyShrinkPool, NoOvergrowFreeList, Pool, SystemPool};
