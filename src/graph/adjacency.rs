//! Pure adjacency-list graph backend
//!
//! Always compiled; selected when the petgraph backend is not built in.
//! Stores the undirected graph as a nested weight map plus an
//! insertion-order node list.

use super::GraphBackend;
use std::collections::HashMap;

#[derive(Default)]
pub struct AdjacencyGraph {
    /// Node ids in insertion order
    nodes: Vec<String>,
    /// node -> neighbor -> accumulated weight; symmetric by construction
    adjacency: HashMap<String, HashMap<String, f64>>,
    edge_count: usize,
}

impl AdjacencyGraph {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphBackend for AdjacencyGraph {
    fn add_node(&mut self, id: &str) {
        if !self.adjacency.contains_key(id) {
            self.nodes.push(id.to_string());
            self.adjacency.insert(id.to_string(), HashMap::new());
        }
    }

    fn accumulate_edge(&mut self, a: &str, b: &str, delta: f64) {
        self.add_node(a);
        self.add_node(b);
        let forward = self
            .adjacency
            .get_mut(a)
            .and_then(|n| n.get_mut(b))
            .is_some();
        if !forward {
            self.edge_count += 1;
        }
        *self
            .adjacency
            .entry(a.to_string())
            .or_default()
            .entry(b.to_string())
            .or_insert(0.0) += delta;
        *self
            .adjacency
            .entry(b.to_string())
            .or_default()
            .entry(a.to_string())
            .or_insert(0.0) += delta;
    }

    fn contains(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    fn node_ids(&self) -> Vec<String> {
        self.nodes.clone()
    }

    fn neighbors(&self, id: &str) -> Vec<(String, f64)> {
        let Some(adjacent) = self.adjacency.get(id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<(String, f64)> =
            adjacent.iter().map(|(n, w)| (n.clone(), *w)).collect();
        neighbors.sort_by(|a, b| a.0.cmp(&b.0));
        neighbors
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn name(&self) -> &'static str {
        "adjacency"
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.adjacency.clear();
        self.edge_count = 0;
    }
}
