//! Single-source shortest paths driven by an external metric.
//!
//! The heap never sees a distance: it stores bare [`NodeKey`]s and orders
//! them through a [`DistanceMetric`] comparator that indexes a distance
//! array with the node id. The driver updates that array through the
//! heap's comparator accessor *before* each `push`/`modify_up`, so every
//! comparison the heap makes sees the freshest ordering.

use std::ops::{Index, IndexMut};

use crate::compare::Compare;
use crate::graph::{NodeId, StaticGraph};
use crate::heap::{Handle, PairingHeap};

/// Path weight / distance value.
pub type Weight = u32;

/// Distance of an unreached node; also the saturation point for
/// overflowing path sums.
pub const INFINITY: Weight = Weight::MAX;

/// The value stored in the search heap: a node id whose priority lives in
/// the metric, not in the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeKey(pub NodeId);

/// Comparator state for the search: tentative distances indexed by node
/// id. Smaller distance orders first (min-heap).
#[derive(Debug, Default, Clone)]
pub struct DistanceMetric {
    distances: Vec<Weight>,
}

impl DistanceMetric {
    pub fn new() -> Self {
        DistanceMetric {
            distances: Vec::new(),
        }
    }

    /// Resizes to `num_nodes` entries, all [`INFINITY`].
    pub fn reset(&mut self, num_nodes: usize) {
        self.distances.clear();
        self.distances.resize(num_nodes, INFINITY);
    }

    #[inline]
    pub fn distance(&self, node: NodeId) -> Weight {
        self.distances[node as usize]
    }

    /// Moves the distance array out, leaving the metric empty.
    pub fn take_distances(&mut self) -> Vec<Weight> {
        std::mem::take(&mut self.distances)
    }
}

impl Index<NodeId> for DistanceMetric {
    type Output = Weight;

    #[inline]
    fn index(&self, node: NodeId) -> &Weight {
        &self.distances[node as usize]
    }
}

impl IndexMut<NodeId> for DistanceMetric {
    #[inline]
    fn index_mut(&mut self, node: NodeId) -> &mut Weight {
        &mut self.distances[node as usize]
    }
}

impl Compare<NodeKey> for DistanceMetric {
    #[inline]
    fn less(&self, a: &NodeKey, b: &NodeKey) -> bool {
        self.distances[a.0 as usize] < self.distances[b.0 as usize]
    }
}

/// Edge data that carries a path weight.
pub trait HasWeight {
    fn weight(&self) -> Weight;
}

impl HasWeight for Weight {
    #[inline]
    fn weight(&self) -> Weight {
        *self
    }
}

/// The heap configuration used by the search.
pub type SearchQueue = PairingHeap<NodeKey, DistanceMetric>;

/// Computes shortest-path distances from `source` to every node.
///
/// Unreachable nodes end up at [`INFINITY`]; path sums saturate there as
/// well. Edge weights are non-negative by type.
pub fn shortest_paths<E: HasWeight>(graph: &StaticGraph<E>, source: NodeId) -> Vec<Weight> {
    let num_nodes = graph.num_nodes() as usize;
    let mut queue = SearchQueue::new(DistanceMetric::new());
    queue.comparator_mut().reset(num_nodes);
    let mut handles: Vec<Option<Handle>> = vec![None; num_nodes];

    queue.comparator_mut()[source] = 0;
    handles[source as usize] = Some(queue.push(NodeKey(source)));

    while !queue.is_empty() {
        let NodeKey(node) = *queue.top();
        queue.pop();

        for edge in graph.edge_range(node) {
            let target = graph.target(edge);
            let new_distance = queue
                .comparator()
                .distance(node)
                .saturating_add(graph.edge_data(edge).weight());

            match handles[target as usize] {
                None => {
                    // The metric must learn the distance before the heap
                    // sees the key.
                    queue.comparator_mut()[target] = new_distance;
                    handles[target as usize] = Some(queue.push(NodeKey(target)));
                }
                // Settled nodes never pass this test: with non-negative
                // weights their distance is already minimal, so the stale
                // handle is never dereferenced.
                Some(handle) if new_distance < queue.comparator().distance(target) => {
                    queue.comparator_mut()[target] = new_distance;
                    queue.modify_up(handle, NodeKey(target));
                }
                Some(_) => {}
            }
        }
    }

    queue.comparator_mut().take_distances()
}
