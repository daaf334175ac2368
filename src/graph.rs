//! Static adjacency-list graph in compressed sparse row form.
//!
//! Built once from an edge list sorted by `(source, target)`; immutable
//! topology afterwards. Node `v`'s outgoing edges occupy the contiguous
//! index range `first_edge[v] .. first_edge[v + 1]` of the edge array, so
//! degree and adjacency queries are O(1) array arithmetic.

use std::ops::Range;

/// Node identifier; nodes are densely numbered `0..num_nodes`.
pub type NodeId = u32;

/// Edge identifier, indexing into the graph's edge array.
pub type EdgeId = u32;

/// Returned by the edge searches when no matching edge exists.
pub const INVALID_EDGE: EdgeId = EdgeId::MAX;

/// An input edge for graph construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEdge<E> {
    pub source: NodeId,
    pub target: NodeId,
    pub data: E,
}

impl<E> InputEdge<E> {
    pub fn new(source: NodeId, target: NodeId, data: E) -> Self {
        InputEdge {
            source,
            target,
            data,
        }
    }
}

struct EdgeEntry<E> {
    target: NodeId,
    data: E,
}

/// A compressed adjacency-list graph.
///
/// `first_edge` has length `num_nodes + 1` with monotone entries and
/// `first_edge[num_nodes] == num_edges`.
pub struct StaticGraph<E> {
    first_edge: Vec<EdgeId>,
    edges: Vec<EdgeEntry<E>>,
}

impl<E> StaticGraph<E> {
    /// Builds the graph in O(N + M) from edges sorted by
    /// `(source, target)`, with duplicates and self-loops already removed
    /// (see [`normalize_edges`]).
    ///
    /// # Panics
    ///
    /// Panics if an edge endpoint is out of range; sortedness and
    /// deduplication are debug-asserted.
    pub fn new(num_nodes: NodeId, sorted_edges: Vec<InputEdge<E>>) -> Self {
        debug_assert!(
            sorted_edges
                .windows(2)
                .all(|w| (w[0].source, w[0].target) < (w[1].source, w[1].target)),
            "input edges must be sorted by (source, target) and deduplicated"
        );
        debug_assert!(
            sorted_edges.iter().all(|e| e.source != e.target),
            "input edges must not contain self-loops"
        );

        let num_edges = sorted_edges.len();
        let mut first_edge = Vec::with_capacity(num_nodes as usize + 1);
        first_edge.push(0);
        let mut edge = 0usize;
        for node in 0..num_nodes {
            while edge < num_edges && sorted_edges[edge].source == node {
                edge += 1;
            }
            first_edge.push(edge as EdgeId);
        }
        assert!(
            edge == num_edges,
            "edge references a source node >= num_nodes"
        );

        let edges = sorted_edges
            .into_iter()
            .map(|e| {
                assert!(e.target < num_nodes, "edge target out of range");
                EdgeEntry {
                    target: e.target,
                    data: e.data,
                }
            })
            .collect();

        StaticGraph { first_edge, edges }
    }

    #[inline]
    pub fn num_nodes(&self) -> NodeId {
        (self.first_edge.len() - 1) as NodeId
    }

    #[inline]
    pub fn num_edges(&self) -> EdgeId {
        self.edges.len() as EdgeId
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> u32 {
        self.end_edges(node) - self.begin_edges(node)
    }

    /// First edge of `node`'s adjacency range.
    #[inline]
    pub fn begin_edges(&self, node: NodeId) -> EdgeId {
        self.first_edge[node as usize]
    }

    /// One past the last edge of `node`'s adjacency range.
    #[inline]
    pub fn end_edges(&self, node: NodeId) -> EdgeId {
        self.first_edge[node as usize + 1]
    }

    /// Iterator over `node`'s outgoing edge ids.
    #[inline]
    pub fn edge_range(&self, node: NodeId) -> Range<EdgeId> {
        self.begin_edges(node)..self.end_edges(node)
    }

    #[inline]
    pub fn target(&self, edge: EdgeId) -> NodeId {
        self.edges[edge as usize].target
    }

    #[inline]
    pub fn edge_data(&self, edge: EdgeId) -> &E {
        &self.edges[edge as usize].data
    }

    #[inline]
    pub fn edge_data_mut(&mut self, edge: EdgeId) -> &mut E {
        &mut self.edges[edge as usize].data
    }

    /// Scans `from`'s adjacency for an edge to `to`; [`INVALID_EDGE`] if
    /// absent. O(out-degree).
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> EdgeId {
        for edge in self.edge_range(from) {
            if self.target(edge) == to {
                return edge;
            }
        }
        INVALID_EDGE
    }

    /// Looks for `from → to`, then for `to → from`.
    pub fn find_edge_in_either_direction(&self, from: NodeId, to: NodeId) -> EdgeId {
        let forward = self.find_edge(from, to);
        if forward != INVALID_EDGE {
            forward
        } else {
            self.find_edge(to, from)
        }
    }
}

/// Sorts edges by `(source, target)` and drops self-loops and duplicate
/// pairs (keeping the first occurrence), producing input acceptable to
/// [`StaticGraph::new`].
pub fn normalize_edges<E>(edges: &mut Vec<InputEdge<E>>) {
    edges.retain(|e| e.source != e.target);
    edges.sort_by_key(|e| (e.source, e.target));
    edges.dedup_by_key(|e| (e.source, e.target));
}
