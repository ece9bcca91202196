//! The calculator tool abstraction consumed by the registry
//!
//! Calculator implementations live outside this crate; the discovery layer
//! only reads their metadata. A tool exposes a globally unique id, low-level
//! metadata (name, purpose, inputs, output) and a high-level key of
//! categorical and free-text dimensions used for indexing and matching.

use crate::taxonomy::{ClinicalContext, Specialty};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A registered, independently-implemented clinical calculator.
///
/// Object-safe so the registry can hold `Arc<dyn Calculator>`. The actual
/// formula and input validation are the implementor's concern and are never
/// invoked by the discovery layer.
pub trait Calculator: Send + Sync {
    /// Globally unique tool id (e.g. "sofa_score").
    fn tool_id(&self) -> &str;

    /// Name, purpose, input parameter names, output type and provenance.
    fn low_level(&self) -> &LowLevelMetadata;

    /// Structured and free-text dimensions used for indexing.
    fn high_level(&self) -> &HighLevelKey;
}

/// Low-level tool metadata: what the tool computes and from which inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowLevelMetadata {
    /// Human-readable name (e.g. "SOFA Score")
    pub name: String,

    /// One-sentence statement of what the tool is for
    pub purpose: String,

    /// Input parameter names, snake_case, possibly carrying unit suffixes
    /// (e.g. "creatinine_mg_dl")
    pub input_parameters: Vec<String>,

    /// Output type label (e.g. "integer score", "percentage risk")
    pub output_type: String,

    /// Literature references backing the formula
    pub references: Vec<String>,

    /// Implementation version string
    pub version: String,

    /// Validation status of the implementation
    pub validation_status: ValidationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    /// Verified against published worked examples
    Validated,
    /// Implemented but not yet verified
    Experimental,
    /// No verification attempted
    Unvalidated,
}

/// High-level key: the categorical and free-text dimensions a tool is
/// discoverable by.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighLevelKey {
    pub specialties: BTreeSet<Specialty>,
    pub contexts: BTreeSet<ClinicalContext>,
    /// Author-supplied condition labels, stored verbatim
    pub conditions: BTreeSet<String>,
    pub keywords: BTreeSet<String>,
    pub icd10_codes: BTreeSet<String>,
    /// Free-text clinical questions the tool helps answer
    pub clinical_questions: Vec<String>,
}
