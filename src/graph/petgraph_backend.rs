//! petgraph-backed graph backend
//!
//! Selected at construction when the crate is compiled with the `petgraph`
//! feature. Must be behaviorally indistinguishable from the adjacency
//! fallback; the conformance suite in `tests/graph_tests.rs` holds both
//! implementations to that.

use super::GraphBackend;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

#[derive(Default)]
pub struct PetgraphBackend {
    graph: UnGraph<String, f64>,
    /// tool id -> node index, in id space the callers use
    indices: HashMap<String, NodeIndex>,
    /// Node ids in insertion order
    order: Vec<String>,
}

impl PetgraphBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn index_of(&mut self, id: &str) -> NodeIndex {
        if let Some(idx) = self.indices.get(id) {
            return *idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.indices.insert(id.to_string(), idx);
        self.order.push(id.to_string());
        idx
    }
}

impl GraphBackend for PetgraphBackend {
    fn add_node(&mut self, id: &str) {
        self.index_of(id);
    }

    fn accumulate_edge(&mut self, a: &str, b: &str, delta: f64) {
        let ia = self.index_of(a);
        let ib = self.index_of(b);
        match self.graph.find_edge(ia, ib) {
            Some(edge) => {
                if let Some(weight) = self.graph.edge_weight_mut(edge) {
                    *weight += delta;
                }
            }
            None => {
                self.graph.add_edge(ia, ib, delta);
            }
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.indices.contains_key(id)
    }

    fn node_ids(&self) -> Vec<String> {
        self.order.clone()
    }

    fn neighbors(&self, id: &str) -> Vec<(String, f64)> {
        let Some(idx) = self.indices.get(id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<(String, f64)> = self
            .graph
            .edges(*idx)
            .map(|edge| {
                let other = if edge.source() == *idx {
                    edge.target()
                } else {
                    edge.source()
                };
                (self.graph[other].clone(), *edge.weight())
            })
            .collect();
        neighbors.sort_by(|a, b| a.0.cmp(&b.0));
        neighbors
    }

    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn name(&self) -> &'static str {
        "petgraph"
    }

    fn clear(&mut self) {
        self.graph.clear();
        self.indices.clear();
        self.order.clear();
    }
}
