//! Native HNSW (Hierarchical Navigable Small World) index.

mod graph;
mod layer;
mod params;

pub use graph::HnswGraph;
pub use layer::NodeId;
pub use params::HnswParams;

#[cfg(test)]
mod tests {
    use super::*;

    fn vectors() -> Vec<Vec<f32>> {
        vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![5.0, 5.0],
            vec![5.0, 6.0],
        ]
    }

    #[test]
    fn search_finds_nearest_after_inserts() {
        let vs = vectors();
        let mut graph = HnswGraph::new(HnswParams::default());
        for (id, v) in vs.iter().enumerate() {
            let vs = vs.clone();
            graph.insert(id, v, move |i| vs[i].clone());
        }

        let vs2 = vs.clone();
        let live = |_: usize| true;
        let results = graph.search(&[5.1, 5.1], 1, 50, move |i| vs2[i].clone(), live);
        assert_eq!(results[0].0, 3);
    }

    #[test]
    fn search_filters_orphans() {
        let vs = vectors();
        let mut graph = HnswGraph::new(HnswParams::default());
        for (id, v) in vs.iter().enumerate() {
            let vs = vs.clone();
            graph.insert(id, v, move |i| vs[i].clone());
        }

        let vs2 = vs.clone();
        // row 3 was "deleted"
        let live = |id: usize| id != 3;
        let results = graph.search(&[5.1, 5.1], 1, 50, move |i| vs2[i].clone(), live);
        assert_ne!(results[0].0, 3);
    }

    #[test]
    fn empty_graph_search_returns_empty() {
        let graph = HnswGraph::new(HnswParams::default());
        let results = graph.search(&[0.0, 0.0], 5, 50, |_| vec![], |_| true);
        assert!(results.is_empty());
    }
}
