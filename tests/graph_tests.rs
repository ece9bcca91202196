//! Integration tests for the relation graph: build passes, weights,
//! traversal queries, and backend conformance.

mod common;

use common::{icu_catalog, register_all, FixtureBuilder};
use medcalc_discovery::taxonomy::{ClinicalContext, Specialty};
use medcalc_discovery::{RelationKind, ToolRegistry, ToolRelationGraph};

const EPS: f64 = 1e-9;

fn built_graph() -> (ToolRegistry, ToolRelationGraph) {
    let mut registry = ToolRegistry::new();
    register_all(&mut registry, icu_catalog());
    let mut graph = ToolRelationGraph::new();
    graph.build_from_registry(&registry);
    (registry, graph)
}

/// Spec-level worked example: A and B share one parameter, C is isolated.
fn small_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry
        .register(
            FixtureBuilder::new("tool_a", "Tool A")
                .params(&["creatinine", "age"])
                .build(),
        )
        .unwrap();
    registry
        .register(
            FixtureBuilder::new("tool_b", "Tool B")
                .params(&["creatinine", "sex"])
                .build(),
        )
        .unwrap();
    registry
        .register(
            FixtureBuilder::new("tool_c", "Tool C")
                .params(&["heart_rate"])
                .build(),
        )
        .unwrap();
    registry
}

#[test]
fn test_shared_parameter_creates_single_weighted_edge() {
    let registry = small_registry();
    let mut graph = ToolRelationGraph::new();
    graph.build_from_registry(&registry);

    let related = graph.get_related_tools("tool_a", 5, 0.1);
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].0, "tool_b");
    assert!((related[0].1 - 0.2).abs() < EPS);

    let edge = graph.get_edge("tool_a", "tool_b").unwrap();
    assert_eq!(edge.relation, RelationKind::SharedParameters);
    assert_eq!(edge.shared_parameters, vec!["creatinine"]);

    // Lookup is undirected: same edge from the other endpoint.
    let from_b = graph.get_related_tools("tool_b", 5, 0.1);
    assert_eq!(from_b[0].0, "tool_a");
    assert!((from_b[0].1 - 0.2).abs() < EPS);

    // tool_c shares nothing and has no edges.
    assert!(graph.get_related_tools("tool_c", 5, 0.0).is_empty());
}

#[test]
fn test_weights_accumulate_across_passes() {
    // Two tools sharing two specialties, one parameter, and one context:
    // 2 * 0.3 + 0.2 + 0.2 = 1.0 on a single edge.
    let mut registry = ToolRegistry::new();
    registry
        .register(
            FixtureBuilder::new("apache_ii", "APACHE II")
                .params(&["creatinine_mg_dl", "temperature"])
                .specialties(&[Specialty::CriticalCare, Specialty::Nephrology])
                .contexts(&[ClinicalContext::IntensiveCare])
                .build(),
        )
        .unwrap();
    registry
        .register(
            FixtureBuilder::new("kdigo_stage", "KDIGO AKI Stage")
                .params(&["creatinine_mg_dl", "urine_output"])
                .specialties(&[Specialty::CriticalCare, Specialty::Nephrology])
                .contexts(&[ClinicalContext::IntensiveCare])
                .build(),
        )
        .unwrap();

    let mut graph = ToolRelationGraph::new();
    graph.build_from_registry(&registry);

    let edge = graph.get_edge("apache_ii", "kdigo_stage").unwrap();
    assert!((edge.weight - 1.0).abs() < EPS);
    // First pass created the edge, later passes only added weight.
    assert_eq!(edge.relation, RelationKind::SharedParameters);
    assert_eq!(edge.shared_parameters, vec!["creatinine"]);

    let related = graph.get_related_tools("apache_ii", 5, 0.0);
    assert!((related[0].1 - 1.0).abs() < EPS);
}

#[test]
fn test_fixture_catalog_edge_weights() {
    let (_, graph) = built_graph();
    // SOFA and qSOFA share the gcs parameter (0.2) and the critical_care
    // specialty (0.3).
    let edge = graph.get_edge("sofa_score", "qsofa_score").unwrap();
    assert!((edge.weight - 0.5).abs() < EPS);

    // SOFA and MELD share two parameters and nothing else.
    let edge = graph.get_edge("sofa_score", "meld_score").unwrap();
    assert!((edge.weight - 0.4).abs() < EPS);
    assert_eq!(edge.shared_parameters, vec!["bilirubin", "creatinine"]);

    // No singleton value produced an edge: SOFA and CHA2DS2-VASc share
    // nothing pairwise.
    assert!(graph.get_edge("sofa_score", "chads_vasc").is_none());
}

#[test]
fn test_min_weight_filters_and_limit_truncates() {
    let (_, graph) = built_graph();
    let all = graph.get_related_tools("qsofa_score", 10, 0.0);
    assert_eq!(all.len(), 3);
    // Heaviest first: the SOFA edge at 0.5.
    assert_eq!(all[0].0, "sofa_score");

    let strong = graph.get_related_tools("qsofa_score", 10, 0.3);
    assert_eq!(strong.len(), 1);
    assert_eq!(strong[0].0, "sofa_score");

    assert_eq!(graph.get_related_tools("qsofa_score", 1, 0.0).len(), 1);
}

#[test]
fn test_find_path() {
    let (_, graph) = built_graph();
    assert_eq!(
        graph.find_path("sofa_score", "sofa_score"),
        Some(vec!["sofa_score".to_string()])
    );

    // Two hops from SOFA to CHA2DS2-VASc; BFS explores id-sorted
    // neighbors, so the meld_score route wins among equal-length paths.
    let path = graph.find_path("sofa_score", "chads_vasc").unwrap();
    assert_eq!(path.len(), 3);
    assert_eq!(path[0], "sofa_score");
    assert_eq!(path[2], "chads_vasc");

    assert!(graph.find_path("sofa_score", "no_such_tool").is_none());
    assert!(graph.find_path("no_such_tool", "sofa_score").is_none());
}

#[test]
fn test_find_path_disconnected_is_none() {
    let registry = small_registry();
    let mut graph = ToolRelationGraph::new();
    graph.build_from_registry(&registry);
    assert!(graph.find_path("tool_a", "tool_c").is_none());
    assert_eq!(
        graph.find_path("tool_a", "tool_b"),
        Some(vec!["tool_a".to_string(), "tool_b".to_string()])
    );
}

#[test]
fn test_clusters_filtered_by_size_and_sorted() {
    let registry = small_registry();
    let mut graph = ToolRelationGraph::new();
    graph.build_from_registry(&registry);

    let clusters = graph.get_tool_clusters(1);
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0], vec!["tool_a", "tool_b"]);
    assert_eq!(clusters[1], vec!["tool_c"]);

    let clusters = graph.get_tool_clusters(2);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0], vec!["tool_a", "tool_b"]);

    assert!(graph.get_tool_clusters(3).is_empty());
}

#[test]
fn test_statistics() {
    let (_, graph) = built_graph();
    let stats = graph.get_statistics();
    assert!(stats.is_built);
    assert_eq!(stats.node_count, 4);
    // sofa-qsofa, sofa-meld, qsofa-meld, qsofa-chads, meld-chads
    assert_eq!(stats.edge_count, 5);
    assert!((stats.density - 2.0 * 5.0 / 12.0).abs() < EPS);
    assert_eq!(stats.component_count, 1);
    assert!(!stats.backend.is_empty());

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["node_count"], 4);
}

#[test]
fn test_unbuilt_graph_is_safe_to_query() {
    let graph = ToolRelationGraph::new();
    assert!(!graph.is_built());
    assert!(graph.get_related_tools("sofa_score", 5, 0.0).is_empty());
    assert!(graph.find_path("a", "b").is_none());
    assert!(graph.find_path("a", "a").is_none());
    assert!(graph.get_tool_clusters(1).is_empty());
    let stats = graph.get_statistics();
    assert!(!stats.is_built);
    assert_eq!(stats.node_count, 0);
    assert_eq!(stats.component_count, 0);
}

#[test]
fn test_fallback_backend_is_always_available() {
    let registry = small_registry();
    let mut graph = ToolRelationGraph::fallback();
    assert!(!graph.has_petgraph());
    assert_eq!(graph.backend_name(), "adjacency");
    graph.build_from_registry(&registry);
    assert_eq!(graph.get_related_tools("tool_a", 5, 0.1).len(), 1);
}

#[cfg(feature = "petgraph")]
#[test]
fn test_default_backend_is_petgraph_when_compiled_in() {
    let graph = ToolRelationGraph::new();
    assert!(graph.has_petgraph());
    assert_eq!(graph.backend_name(), "petgraph");
}

/// Backend conformance: for the same registry snapshot, every query must
/// return identical results from the petgraph backend and the adjacency
/// fallback.
#[cfg(feature = "petgraph")]
#[test]
fn test_backend_equivalence() {
    let mut registry = ToolRegistry::new();
    register_all(&mut registry, icu_catalog());
    registry
        .register(
            FixtureBuilder::new("isolated_tool", "Isolated Tool")
                .params(&["only_here"])
                .build(),
        )
        .unwrap();

    let mut primary = ToolRelationGraph::new();
    let mut fallback = ToolRelationGraph::fallback();
    primary.build_from_registry(&registry);
    fallback.build_from_registry(&registry);
    assert!(primary.has_petgraph());
    assert!(!fallback.has_petgraph());

    let ids = registry.list_all_ids();

    for id in &ids {
        let a = primary.get_related_tools(id, 10, 0.0);
        let b = fallback.get_related_tools(id, 10, 0.0);
        assert_eq!(a.len(), b.len(), "neighbor count differs for {}", id);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.0, y.0, "neighbor order differs for {}", id);
            assert!((x.1 - y.1).abs() < EPS, "weight differs for {}", id);
        }
    }

    for source in &ids {
        for target in &ids {
            assert_eq!(
                primary.find_path(source, target),
                fallback.find_path(source, target),
                "path {} -> {} differs",
                source,
                target
            );
        }
    }

    assert_eq!(primary.get_tool_clusters(1), fallback.get_tool_clusters(1));
    assert_eq!(primary.get_tool_clusters(2), fallback.get_tool_clusters(2));

    let sa = primary.get_statistics();
    let sb = fallback.get_statistics();
    assert_eq!(sa.node_count, sb.node_count);
    assert_eq!(sa.edge_count, sb.edge_count);
    assert_eq!(sa.component_count, sb.component_count);
    assert!((sa.density - sb.density).abs() < EPS);
    // Only the backend identifier may differ.
    assert_ne!(sa.backend, sb.backend);
}
