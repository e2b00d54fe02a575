//! HNSW graph structure (Malkov & Yashunin).
//!
//! The graph stores no vectors of its own — it only holds adjacency
//! lists keyed by row id. Callers (the owning [`crate::collection::Collection`])
//! supply vector lookups, since the raw vectors already live in the
//! collection's row slab and duplicating them here would defeat the
//! point of sharing storage. This mirrors how the collection store
//! already owns the single source of truth for a row's data (spec
//! invariant: no references escape the lock, but the vector a lookup
//! closure returns is an owned copy).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashSet;

use super::layer::{Layer, NodeId};
use super::params::HnswParams;
use crate::simd;

/// A thin wrapper making `f32` usable as a `BinaryHeap` key.
///
/// Distances here are never `NaN` (callers validate finite vectors
/// upstream), so `total_cmp` gives a total order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedF32(f32);

impl Eq for OrderedF32 {}

impl PartialOrd for OrderedF32 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedF32 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A hierarchical navigable small-world graph, built insert-only.
///
/// Deleted rows are never removed from the graph (see spec non-goal:
/// no HNSW node deletion); instead [`HnswGraph::search`] is handed a
/// liveness predicate and filters orphans from its output.
pub struct HnswGraph {
    params: HnswParams,
    layers: Vec<Layer>,
    entry_point: Option<NodeId>,
    max_layer: usize,
    /// xorshift64 state, seeded from a fixed constant so that level
    /// assignment is reproducible given the same insertion sequence.
    rng_state: u64,
    node_count: usize,
}

impl HnswGraph {
    /// Creates an empty graph with the given parameters.
    #[must_use]
    pub fn new(params: HnswParams) -> Self {
        Self {
            params,
            layers: vec![Layer::with_capacity(0)],
            entry_point: None,
            max_layer: 0,
            rng_state: 0x5DEE_CE66_D1A4_B5B5,
            node_count: 0,
        }
    }

    /// Number of nodes the graph has ever been asked to hold (including
    /// any later-deleted, now-orphaned rows).
    #[must_use]
    pub fn len(&self) -> usize {
        self.node_count
    }

    /// Returns `true` if the graph holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Inserts `node_id` into the graph under `vector`.
    ///
    /// `get_vector` resolves any row id (including `node_id` itself,
    /// which it must already be able to answer for) to its raw vector.
    pub fn insert(&mut self, node_id: NodeId, vector: &[f32], get_vector: impl Fn(NodeId) -> Vec<f32>) {
        self.node_count = self.node_count.max(node_id + 1);

        let node_layer = self.random_layer();
        while self.layers.len() <= node_layer {
            self.layers.push(Layer::with_capacity(node_id + 1));
        }
        for layer in &mut self.layers {
            layer.ensure_capacity(node_id);
        }

        let Some(entry) = self.entry_point else {
            self.entry_point = Some(node_id);
            self.max_layer = node_layer;
            return;
        };

        let mut current_ep = entry;
        for layer_idx in (node_layer + 1..=self.max_layer).rev() {
            current_ep = self.search_layer_single(vector, current_ep, layer_idx, &get_vector);
        }

        for layer_idx in (0..=node_layer.min(self.max_layer)).rev() {
            let candidates = self.search_layer(
                vector,
                vec![current_ep],
                self.params.ef_construction,
                layer_idx,
                &get_vector,
            );

            let max_conn = if layer_idx == 0 {
                self.params.max_connections_0()
            } else {
                self.params.m
            };
            let selected = self.select_neighbors(&candidates, max_conn, &get_vector);

            self.layers[layer_idx].set_neighbors(node_id, selected.clone());
            for &neighbor in &selected {
                self.add_bidirectional(node_id, neighbor, layer_idx, max_conn, &get_vector);
            }

            if let Some(&(best, _)) = candidates.first() {
                current_ep = best;
            }
        }

        if node_layer > self.max_layer {
            self.max_layer = node_layer;
            self.entry_point = Some(node_id);
        }
    }

    /// Searches for up to `k` nearest neighbors to `query`, filtering out
    /// any row id for which `is_live` returns `false`.
    ///
    /// `ef` is the beam width at layer 0 (see [`HnswParams::ef_search`]).
    #[must_use]
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        ef: usize,
        get_vector: impl Fn(NodeId) -> Vec<f32>,
        is_live: impl Fn(NodeId) -> bool,
    ) -> Vec<(NodeId, f32)> {
        let Some(entry) = self.entry_point else {
            return Vec::new();
        };

        let mut current_ep = entry;
        for layer_idx in (1..=self.max_layer).rev() {
            current_ep = self.search_layer_single(query, current_ep, layer_idx, &get_vector);
        }

        let candidates = self.search_layer(query, vec![current_ep], ef, 0, &get_vector);

        candidates
            .into_iter()
            .filter(|(id, _)| is_live(*id))
            .take(k)
            .collect()
    }

    // -- internals -----------------------------------------------------

    fn random_layer(&mut self) -> usize {
        let mut state = self.rng_state;
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        self.rng_state = state;

        let uniform = (state as f64) / (u64::MAX as f64);
        let level_mult = 1.0 / (self.params.m as f64).ln();
        let level = (-uniform.ln() * level_mult).floor();
        if level.is_finite() {
            (level as usize).min(31)
        } else {
            0
        }
    }

    fn search_layer_single(
        &self,
        query: &[f32],
        entry: NodeId,
        layer: usize,
        get_vector: &impl Fn(NodeId) -> Vec<f32>,
    ) -> NodeId {
        let mut best = entry;
        let mut best_dist = simd::l2(query, &get_vector(entry));

        loop {
            let mut improved = false;
            for &neighbor in self.layers[layer].neighbors(best) {
                let dist = simd::l2(query, &get_vector(neighbor));
                if dist < best_dist {
                    best = neighbor;
                    best_dist = dist;
                    improved = true;
                }
            }
            if !improved {
                break;
            }
        }
        best
    }

    /// Beam search of width `ef` at `layer`, returning `(node, distance)`
    /// sorted ascending by distance.
    fn search_layer(
        &self,
        query: &[f32],
        entry_points: Vec<NodeId>,
        ef: usize,
        layer: usize,
        get_vector: &impl Fn(NodeId) -> Vec<f32>,
    ) -> Vec<(NodeId, f32)> {
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut candidates: BinaryHeap<Reverse<(OrderedF32, NodeId)>> = BinaryHeap::new();
        let mut results: BinaryHeap<(OrderedF32, NodeId)> = BinaryHeap::new();

        for ep in entry_points {
            let dist = simd::l2(query, &get_vector(ep));
            candidates.push(Reverse((OrderedF32(dist), ep)));
            results.push((OrderedF32(dist), ep));
            visited.insert(ep);
        }

        while let Some(Reverse((OrderedF32(c_dist), c_node))) = candidates.pop() {
            let furthest = results.peek().map_or(f32::MAX, |r| r.0 .0);
            if c_dist > furthest && results.len() >= ef {
                break;
            }

            for &neighbor in self.layers[layer].neighbors(c_node) {
                if visited.insert(neighbor) {
                    let dist = simd::l2(query, &get_vector(neighbor));
                    let furthest = results.peek().map_or(f32::MAX, |r| r.0 .0);

                    if dist < furthest || results.len() < ef {
                        candidates.push(Reverse((OrderedF32(dist), neighbor)));
                        results.push((OrderedF32(dist), neighbor));
                        if results.len() > ef {
                            results.pop();
                        }
                    }
                }
            }
        }

        let mut out: Vec<(NodeId, f32)> = results.into_iter().map(|(d, n)| (n, d.0)).collect();
        out.sort_by(|a, b| a.1.total_cmp(&b.1));
        out
    }

    /// Keeps a candidate only if it is closer to the new node than to
    /// any already-selected neighbor (the standard HNSW heuristic).
    ///
    /// `candidates` is sorted ascending by distance to the new node
    /// (query), which is also the order candidates are considered in.
    fn select_neighbors(
        &self,
        candidates: &[(NodeId, f32)],
        max_neighbors: usize,
        get_vector: &impl Fn(NodeId) -> Vec<f32>,
    ) -> Vec<NodeId> {
        if candidates.len() <= max_neighbors {
            return candidates.iter().map(|&(id, _)| id).collect();
        }

        let mut selected: Vec<NodeId> = Vec::with_capacity(max_neighbors);
        let mut selected_vecs: Vec<Vec<f32>> = Vec::with_capacity(max_neighbors);

        for &(candidate_id, dist_to_query) in candidates {
            if selected.len() >= max_neighbors {
                break;
            }

            let candidate_vec = get_vector(candidate_id);
            let is_diverse = selected_vecs
                .iter()
                .all(|s| dist_to_query < simd::l2(&candidate_vec, s));

            if is_diverse || selected.is_empty() {
                selected.push(candidate_id);
                selected_vecs.push(candidate_vec);
            }
        }

        // Heuristic may under-fill the quota; pad with the closest
        // remaining candidates rather than leave the node under-connected.
        if selected.len() < max_neighbors {
            for &(candidate_id, _) in candidates {
                if selected.len() >= max_neighbors {
                    break;
                }
                if !selected.contains(&candidate_id) {
                    selected.push(candidate_id);
                }
            }
        }

        selected
    }

    fn add_bidirectional(
        &mut self,
        new_node: NodeId,
        neighbor: NodeId,
        layer: usize,
        max_conn: usize,
        get_vector: &impl Fn(NodeId) -> Vec<f32>,
    ) {
        let current = self.layers[layer].neighbors(neighbor).to_vec();
        if current.len() < max_conn {
            self.layers[layer].push_neighbor(neighbor, new_node);
            return;
        }

        let neighbor_vec = get_vector(neighbor);
        let mut all = current;
        all.push(new_node);

        let mut with_dist: Vec<(NodeId, f32)> = all
            .iter()
            .map(|&n| (n, simd::l2(&neighbor_vec, &get_vector(n))))
            .collect();
        with_dist.sort_by(|a, b| a.1.total_cmp(&b.1));
        with_dist.truncate(max_conn);

        let pruned: Vec<NodeId> = with_dist.into_iter().map(|(n, _)| n).collect();
        self.layers[layer].set_neighbors(neighbor, pruned);
    }
}
