//! medcalc-discovery: registry, auto-discovery, and relation-graph layer
//! for clinical calculator tools
//!
//! An in-memory discovery library. Calculator implementations and the
//! transport that exposes them live elsewhere; this crate answers
//! "which tool do I want" by free-text relevance, exact categorical
//! filters, or similarity to a known tool.
//!
//! Assembly order: register every calculator into a [`ToolRegistry`],
//! then build an [`AutoDiscoveryEngine`] and a [`ToolRelationGraph`] once
//! each from the stable registry. All three are then read-only and safe to
//! query from multiple threads.

pub mod calculator;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod registry;
pub mod taxonomy;

pub use calculator::{Calculator, HighLevelKey, LowLevelMetadata, ValidationStatus};
pub use discovery::{AutoDiscoveryEngine, DiscoveryHit, DiscoveryStatistics, EnrichedKey};
pub use error::RegistryError;
pub use graph::{GraphStatistics, RelationEdge, RelationKind, ToolRelationGraph};
pub use registry::{FilterQuery, RegistryStatistics, SearchHit, ToolRegistry};
pub use taxonomy::{ClinicalContext, Specialty, TaxonomyCatalog};
