//! A single layer of the HNSW hierarchy: per-node adjacency lists.

/// Identifier of a node in the graph — equal to the owning collection's
/// row id, since the graph never holds vectors itself (see [`super::graph`]).
pub type NodeId = usize;

/// Adjacency lists for every node present at this layer.
#[derive(Debug, Default)]
pub struct Layer {
    neighbors: Vec<Vec<NodeId>>,
}

impl Layer {
    /// Creates a layer with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            neighbors: vec![Vec::new(); capacity],
        }
    }

    /// Grows the layer so that `node_id` has a slot, if needed.
    pub(crate) fn ensure_capacity(&mut self, node_id: NodeId) {
        if node_id >= self.neighbors.len() {
            self.neighbors.resize(node_id + 1, Vec::new());
        }
    }

    pub(crate) fn neighbors(&self, node_id: NodeId) -> &[NodeId] {
        self.neighbors.get(node_id).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn set_neighbors(&mut self, node_id: NodeId, neighbors: Vec<NodeId>) {
        self.ensure_capacity(node_id);
        self.neighbors[node_id] = neighbors;
    }

    pub(crate) fn push_neighbor(&mut self, node_id: NodeId, neighbor: NodeId) {
        self.ensure_capacity(node_id);
        self.neighbors[node_id].push(neighbor);
    }
}
