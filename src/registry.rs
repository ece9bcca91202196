//! Tool registry with per-dimension inverted indices
//!
//! Owns the authoritative calculator store and answers exact-filter and
//! weighted free-text queries. Registration is append-only; derived
//! structures (discovery engine, relation graph) are built from a stable
//! registry snapshot after registration finishes.

use crate::calculator::Calculator;
use crate::error::RegistryError;
use crate::taxonomy::{ClinicalContext, Specialty};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Field weights for [`ToolRegistry::search`]. Weights are additive per
/// matching value within a dimension; two matching specialties both score.
const WEIGHT_TOOL_ID: u32 = 10;
const WEIGHT_NAME: u32 = 8;
const WEIGHT_SPECIALTY: u32 = 7;
const WEIGHT_CONDITION: u32 = 6;
const WEIGHT_PURPOSE: u32 = 5;
const WEIGHT_KEYWORD: u32 = 4;
const WEIGHT_CLINICAL_QUESTION: u32 = 3;

/// A scored free-text search hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub tool_id: String,
    pub name: String,
    pub score: u32,
}

/// Exact-filter query. Absent fields are unconstrained; supplied fields
/// combine by intersection.
#[derive(Debug, Clone, Default)]
pub struct FilterQuery {
    pub specialty: Option<Specialty>,
    pub condition: Option<String>,
    pub context: Option<ClinicalContext>,
    pub keyword: Option<String>,
    pub icd10: Option<String>,
}

/// Per-bucket tool counts, non-empty buckets only.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStatistics {
    pub total_tools: usize,
    pub by_specialty: BTreeMap<String, usize>,
    pub by_context: BTreeMap<String, usize>,
}

/// The authoritative calculator store plus five inverted indices
/// (specialty, context, condition, keyword, ICD-10).
///
/// Iteration order everywhere is registration order, which makes score
/// tie-breaks deterministic within a process run. Safe for concurrent reads
/// once registration has finished; `register` calls must be externally
/// serialized.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Calculator>>,
    /// Registration order; the stable iteration and tie-break order.
    order: Vec<String>,
    by_specialty: HashMap<Specialty, HashSet<String>>,
    by_context: HashMap<ClinicalContext, HashSet<String>>,
    /// Keys lower-cased
    by_condition: HashMap<String, HashSet<String>>,
    /// Keys lower-cased
    by_keyword: HashMap<String, HashSet<String>>,
    /// Keys upper-cased
    by_icd10: HashMap<String, HashSet<String>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a calculator, indexing every dimension of its high-level
    /// key. Fails on duplicate id without touching any index.
    pub fn register(&mut self, tool: Arc<dyn Calculator>) -> Result<(), RegistryError> {
        let tool_id = tool.tool_id().to_string();
        // Duplicate check precedes all index mutation: registration is
        // all-or-nothing.
        if self.tools.contains_key(&tool_id) {
            return Err(RegistryError::DuplicateTool(tool_id));
        }

        let key = tool.high_level();
        for specialty in &key.specialties {
            self.by_specialty
                .entry(*specialty)
                .or_default()
                .insert(tool_id.clone());
        }
        for context in &key.contexts {
            self.by_context
                .entry(*context)
                .or_default()
                .insert(tool_id.clone());
        }
        for condition in &key.conditions {
            self.by_condition
                .entry(condition.to_lowercase())
                .or_default()
                .insert(tool_id.clone());
        }
        for keyword in &key.keywords {
            self.by_keyword
                .entry(keyword.to_lowercase())
                .or_default()
                .insert(tool_id.clone());
        }
        for code in &key.icd10_codes {
            self.by_icd10
                .entry(code.to_uppercase())
                .or_default()
                .insert(tool_id.clone());
        }

        debug!(tool_id = %tool_id, "registered calculator");
        self.order.push(tool_id.clone());
        self.tools.insert(tool_id, tool);
        Ok(())
    }

    /// O(1) lookup; `None` for unknown ids.
    pub fn get(&self, tool_id: &str) -> Option<&Arc<dyn Calculator>> {
        self.tools.get(tool_id)
    }

    /// Owned handle to a calculator; `None` for unknown ids.
    pub fn get_calculator(&self, tool_id: &str) -> Option<Arc<dyn Calculator>> {
        self.tools.get(tool_id).cloned()
    }

    /// All calculators in registration order.
    pub fn list_all(&self) -> Vec<Arc<dyn Calculator>> {
        self.order
            .iter()
            .filter_map(|id| self.tools.get(id).cloned())
            .collect()
    }

    /// All tool ids in registration order.
    pub fn list_all_ids(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// Case-insensitive weighted substring search over id, name, purpose,
    /// and every high-level dimension. Zero-score tools are excluded;
    /// results sort descending by score with registration-order tie-breaks.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let query = query.to_lowercase();
        let mut hits = Vec::new();

        for id in &self.order {
            let Some(tool) = self.tools.get(id) else {
                continue;
            };
            let meta = tool.low_level();
            let key = tool.high_level();
            let mut score = 0;

            if id.to_lowercase().contains(&query) {
                score += WEIGHT_TOOL_ID;
            }
            if meta.name.to_lowercase().contains(&query) {
                score += WEIGHT_NAME;
            }
            if meta.purpose.to_lowercase().contains(&query) {
                score += WEIGHT_PURPOSE;
            }
            for specialty in &key.specialties {
                if specialty.as_str().contains(&query) {
                    score += WEIGHT_SPECIALTY;
                }
            }
            for condition in &key.conditions {
                if condition.to_lowercase().contains(&query) {
                    score += WEIGHT_CONDITION;
                }
            }
            for keyword in &key.keywords {
                if keyword.to_lowercase().contains(&query) {
                    score += WEIGHT_KEYWORD;
                }
            }
            for question in &key.clinical_questions {
                if question.to_lowercase().contains(&query) {
                    score += WEIGHT_CLINICAL_QUESTION;
                }
            }

            if score > 0 {
                hits.push(SearchHit {
                    tool_id: id.clone(),
                    name: meta.name.clone(),
                    score,
                });
            }
        }

        // Stable sort keeps registration order among equal scores.
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(limit);
        hits
    }

    /// AND-intersection of the supplied filters' inverted-index buckets.
    /// No filters means every tool. Results in registration order.
    pub fn search_by_filters(&self, filters: &FilterQuery) -> Vec<String> {
        let mut candidates: Option<HashSet<String>> = None;

        if let Some(specialty) = filters.specialty {
            let bucket = self.by_specialty.get(&specialty).cloned().unwrap_or_default();
            candidates = Some(intersect(candidates, bucket));
        }
        if let Some(condition) = &filters.condition {
            let bucket = self
                .by_condition
                .get(&condition.to_lowercase())
                .cloned()
                .unwrap_or_default();
            candidates = Some(intersect(candidates, bucket));
        }
        if let Some(context) = filters.context {
            let bucket = self.by_context.get(&context).cloned().unwrap_or_default();
            candidates = Some(intersect(candidates, bucket));
        }
        if let Some(keyword) = &filters.keyword {
            let bucket = self
                .by_keyword
                .get(&keyword.to_lowercase())
                .cloned()
                .unwrap_or_default();
            candidates = Some(intersect(candidates, bucket));
        }
        if let Some(icd10) = &filters.icd10 {
            let bucket = self
                .by_icd10
                .get(&icd10.to_uppercase())
                .cloned()
                .unwrap_or_default();
            candidates = Some(intersect(candidates, bucket));
        }

        match candidates {
            None => self.list_all_ids(),
            Some(set) => self
                .order
                .iter()
                .filter(|id| set.contains(*id))
                .cloned()
                .collect(),
        }
    }

    /// Calculators indexed under a specialty, in registration order.
    pub fn list_by_specialty(&self, specialty: Specialty) -> Vec<Arc<dyn Calculator>> {
        self.list_bucket(self.by_specialty.get(&specialty))
    }

    /// Calculators indexed under a context, in registration order.
    pub fn list_by_context(&self, context: ClinicalContext) -> Vec<Arc<dyn Calculator>> {
        self.list_bucket(self.by_context.get(&context))
    }

    /// Specialties with at least one registered tool, canonical order.
    pub fn list_specialties(&self) -> Vec<Specialty> {
        Specialty::all()
            .iter()
            .copied()
            .filter(|s| self.by_specialty.get(s).is_some_and(|b| !b.is_empty()))
            .collect()
    }

    /// Contexts with at least one registered tool, canonical order.
    pub fn list_contexts(&self) -> Vec<ClinicalContext> {
        ClinicalContext::all()
            .iter()
            .copied()
            .filter(|c| self.by_context.get(c).is_some_and(|b| !b.is_empty()))
            .collect()
    }

    /// Tool counts per non-empty specialty and context bucket.
    pub fn get_statistics(&self) -> RegistryStatistics {
        let by_specialty = self
            .by_specialty
            .iter()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(s, bucket)| (s.as_str().to_string(), bucket.len()))
            .collect();
        let by_context = self
            .by_context
            .iter()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(c, bucket)| (c.as_str().to_string(), bucket.len()))
            .collect();
        RegistryStatistics {
            total_tools: self.tools.len(),
            by_specialty,
            by_context,
        }
    }

    fn list_bucket(&self, bucket: Option<&HashSet<String>>) -> Vec<Arc<dyn Calculator>> {
        let Some(bucket) = bucket else {
            return Vec::new();
        };
        self.order
            .iter()
            .filter(|id| bucket.contains(*id))
            .filter_map(|id| self.tools.get(id).cloned())
            .collect()
    }
}

fn intersect(current: Option<HashSet<String>>, bucket: HashSet<String>) -> HashSet<String> {
    match current {
        None => bucket,
        Some(set) => set.intersection(&bucket).cloned().collect(),
    }
}
