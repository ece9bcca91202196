//! Weighted relationship graph between registered calculators
//!
//! Built in one pass from a registry snapshot: tools sharing normalized
//! input parameters, specialties, or clinical contexts get an undirected
//! edge whose weight accumulates across the three passes. Two backends
//! implement storage and traversal; callers cannot tell them apart by
//! query results.

pub mod adjacency;
#[cfg(feature = "petgraph")]
pub mod petgraph_backend;

use crate::discovery::normalize_parameter;
use crate::registry::ToolRegistry;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::info;

/// Weight contributed per shared normalized parameter.
const WEIGHT_SHARED_PARAMETER: f64 = 0.2;
/// Weight contributed per shared specialty.
const WEIGHT_SHARED_SPECIALTY: f64 = 0.3;
/// Weight contributed per shared clinical context.
const WEIGHT_SHARED_CONTEXT: f64 = 0.2;

/// Storage/traversal backend. Implementations must agree on every
/// observable: neighbor sets and weights, node/edge counts, and the
/// deterministic id-sorted neighbor order the shared BFS builds on.
pub trait GraphBackend: Send + Sync {
    fn add_node(&mut self, id: &str);
    /// Add `delta` onto the single undirected edge between `a` and `b`,
    /// creating it if absent.
    fn accumulate_edge(&mut self, a: &str, b: &str, delta: f64);
    fn contains(&self, id: &str) -> bool;
    /// Node ids in insertion order.
    fn node_ids(&self) -> Vec<String>;
    /// Incident edges as (neighbor, weight), sorted by neighbor id.
    fn neighbors(&self, id: &str) -> Vec<(String, f64)>;
    fn node_count(&self) -> usize;
    fn edge_count(&self) -> usize;
    fn name(&self) -> &'static str;
    fn clear(&mut self);

    /// Hop-count shortest path via BFS over id-sorted neighbors. Default
    /// implementation shared by all backends so path choice among equal-
    /// length alternatives is identical everywhere.
    fn shortest_path(&self, source: &str, target: &str) -> Option<Vec<String>> {
        if !self.contains(source) || !self.contains(target) {
            return None;
        }
        if source == target {
            return Some(vec![source.to_string()]);
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut predecessors: HashMap<String, String> = HashMap::new();

        queue.push_back(source.to_string());
        visited.insert(source.to_string());

        while let Some(current) = queue.pop_front() {
            if current == target {
                let mut path = vec![current.clone()];
                let mut node = current;
                while let Some(pred) = predecessors.get(&node) {
                    path.push(pred.clone());
                    node = pred.clone();
                }
                path.reverse();
                return Some(path);
            }
            for (neighbor, _) in self.neighbors(&current) {
                if !visited.contains(&neighbor) {
                    visited.insert(neighbor.clone());
                    predecessors.insert(neighbor.clone(), current.clone());
                    queue.push_back(neighbor);
                }
            }
        }

        None
    }

    /// Connected components as id-sorted node lists. Shared default, same
    /// reasoning as [`GraphBackend::shortest_path`].
    fn connected_components(&self) -> Vec<Vec<String>> {
        let mut visited = HashSet::new();
        let mut components = Vec::new();

        for start in self.node_ids() {
            if visited.contains(&start) {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back(start.clone());
            visited.insert(start);

            while let Some(current) = queue.pop_front() {
                component.push(current.clone());
                for (neighbor, _) in self.neighbors(&current) {
                    if !visited.contains(&neighbor) {
                        visited.insert(neighbor.clone());
                        queue.push_back(neighbor);
                    }
                }
            }

            component.sort();
            components.push(component);
        }

        components
    }
}

/// Which build pass first created an edge. Later passes only add weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelationKind {
    SharedParameters,
    SharedSpecialty,
    SharedContext,
}

/// Metadata for one undirected edge, keyed by the lexicographically
/// ordered id pair.
#[derive(Debug, Clone, Serialize)]
pub struct RelationEdge {
    pub weight: f64,
    pub relation: RelationKind,
    /// Distinct shared parameter names contributing to the weight, sorted
    pub shared_parameters: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    /// 2E / (N * (N - 1)) for N > 1, else 0
    pub density: f64,
    pub component_count: usize,
    pub backend: String,
    pub is_built: bool,
}

/// The relationship graph over a registry snapshot.
pub struct ToolRelationGraph {
    backend: Box<dyn GraphBackend>,
    /// Edge metadata keyed by ordered (min, max) id pair
    edges: HashMap<(String, String), RelationEdge>,
    built: bool,
}

impl Default for ToolRelationGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRelationGraph {
    /// Construct with the richest backend compiled in: petgraph when the
    /// `petgraph` feature is enabled, the adjacency fallback otherwise.
    pub fn new() -> Self {
        #[cfg(feature = "petgraph")]
        let backend: Box<dyn GraphBackend> = Box::new(petgraph_backend::PetgraphBackend::new());
        #[cfg(not(feature = "petgraph"))]
        let backend: Box<dyn GraphBackend> = Box::new(adjacency::AdjacencyGraph::new());
        Self {
            backend,
            edges: HashMap::new(),
            built: false,
        }
    }

    /// Construct with the adjacency-list fallback regardless of compiled
    /// features. Query results are identical to [`ToolRelationGraph::new`];
    /// the conformance tests rely on this constructor.
    pub fn fallback() -> Self {
        Self {
            backend: Box::new(adjacency::AdjacencyGraph::new()),
            edges: HashMap::new(),
            built: false,
        }
    }

    /// Whether the petgraph backend is active. Never changes query results.
    pub fn has_petgraph(&self) -> bool {
        self.backend.name() == "petgraph"
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Three additive edge passes over the registry snapshot: shared
    /// normalized parameters, shared specialties, shared contexts. Only
    /// values shared by two or more tools contribute; singleton values
    /// create no edges. Every registered tool becomes a node.
    pub fn build_from_registry(&mut self, registry: &ToolRegistry) {
        self.backend.clear();
        self.edges.clear();

        let mut by_parameter: HashMap<String, Vec<String>> = HashMap::new();
        let mut by_specialty: HashMap<String, Vec<String>> = HashMap::new();
        let mut by_context: HashMap<String, Vec<String>> = HashMap::new();

        for tool in registry.list_all() {
            let tool_id = tool.tool_id().to_string();
            self.backend.add_node(&tool_id);

            let mut seen = HashSet::new();
            for param in &tool.low_level().input_parameters {
                let normalized = normalize_parameter(param);
                if !normalized.is_empty() && seen.insert(normalized.clone()) {
                    by_parameter.entry(normalized).or_default().push(tool_id.clone());
                }
            }
            for specialty in &tool.high_level().specialties {
                by_specialty
                    .entry(specialty.as_str().to_string())
                    .or_default()
                    .push(tool_id.clone());
            }
            for context in &tool.high_level().contexts {
                by_context
                    .entry(context.as_str().to_string())
                    .or_default()
                    .push(tool_id.clone());
            }
        }

        for (param, tools) in &by_parameter {
            for (a, b) in pairs(tools) {
                self.accumulate(
                    a,
                    b,
                    WEIGHT_SHARED_PARAMETER,
                    RelationKind::SharedParameters,
                    Some(param),
                );
            }
        }
        for tools in by_specialty.values() {
            for (a, b) in pairs(tools) {
                self.accumulate(a, b, WEIGHT_SHARED_SPECIALTY, RelationKind::SharedSpecialty, None);
            }
        }
        for tools in by_context.values() {
            for (a, b) in pairs(tools) {
                self.accumulate(a, b, WEIGHT_SHARED_CONTEXT, RelationKind::SharedContext, None);
            }
        }

        self.built = true;
        info!(
            nodes = self.backend.node_count(),
            edges = self.backend.edge_count(),
            backend = self.backend.name(),
            "relation graph built"
        );
    }

    fn accumulate(
        &mut self,
        a: &str,
        b: &str,
        delta: f64,
        kind: RelationKind,
        shared_parameter: Option<&str>,
    ) {
        self.backend.accumulate_edge(a, b, delta);

        let key = ordered_pair(a, b);
        let edge = self.edges.entry(key).or_insert_with(|| RelationEdge {
            weight: 0.0,
            relation: kind,
            shared_parameters: Vec::new(),
        });
        edge.weight += delta;
        if let Some(param) = shared_parameter {
            if !edge.shared_parameters.iter().any(|p| p == param) {
                edge.shared_parameters.push(param.to_string());
                edge.shared_parameters.sort();
            }
        }
    }

    /// Edge metadata for an unordered pair, if related.
    pub fn get_edge(&self, a: &str, b: &str) -> Option<&RelationEdge> {
        self.edges.get(&ordered_pair(a, b))
    }

    /// Incident edges with weight >= `min_weight`, heaviest first, ties by
    /// id. Unbuilt graph or unknown id yields an empty list.
    pub fn get_related_tools(
        &self,
        tool_id: &str,
        limit: usize,
        min_weight: f64,
    ) -> Vec<(String, f64)> {
        if !self.built || !self.backend.contains(tool_id) {
            return Vec::new();
        }
        let mut related: Vec<(String, f64)> = self
            .backend
            .neighbors(tool_id)
            .into_iter()
            .filter(|(_, w)| *w >= min_weight)
            .collect();
        related.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        related.truncate(limit);
        related
    }

    /// Unweighted shortest path between two tools, or `None` when either
    /// endpoint is unknown, the pair is disconnected, or the graph is
    /// unbuilt. A tool has a single-element path to itself.
    pub fn find_path(&self, source: &str, target: &str) -> Option<Vec<String>> {
        if !self.built {
            return None;
        }
        self.backend.shortest_path(source, target)
    }

    /// Connected components with at least `min_cluster_size` members,
    /// largest first.
    pub fn get_tool_clusters(&self, min_cluster_size: usize) -> Vec<Vec<String>> {
        if !self.built {
            return Vec::new();
        }
        let mut clusters: Vec<Vec<String>> = self
            .backend
            .connected_components()
            .into_iter()
            .filter(|c| c.len() >= min_cluster_size)
            .collect();
        clusters.sort_by(|a, b| {
            b.len()
                .cmp(&a.len())
                .then_with(|| a.first().cmp(&b.first()))
        });
        clusters
    }

    pub fn get_statistics(&self) -> GraphStatistics {
        if !self.built {
            return GraphStatistics {
                node_count: 0,
                edge_count: 0,
                density: 0.0,
                component_count: 0,
                backend: self.backend.name().to_string(),
                is_built: false,
            };
        }
        let n = self.backend.node_count();
        let e = self.backend.edge_count();
        let density = if n > 1 {
            2.0 * e as f64 / (n as f64 * (n as f64 - 1.0))
        } else {
            0.0
        };
        GraphStatistics {
            node_count: n,
            edge_count: e,
            density,
            component_count: self.backend.connected_components().len(),
            backend: self.backend.name().to_string(),
            is_built: true,
        }
    }
}

fn ordered_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

fn pairs(tools: &[String]) -> impl Iterator<Item = (&String, &String)> + '_ {
    tools
        .iter()
        .enumerate()
        .flat_map(move |(i, a)| tools[i + 1..].iter().map(move |b| (a, b)))
}
