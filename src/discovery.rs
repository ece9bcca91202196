//! Auto-discovery engine: text-pattern and parameter-derived enrichment
//!
//! Consumes a built registry snapshot and enriches every tool with
//! conditions extracted from its free-text surface and clinical domains
//! inferred from its input parameter names. Queries run against the
//! enriched dimensions and explain what matched.
//!
//! All queries are safe before `build_from_registry` has run: they return
//! empty or absent results rather than erroring.

use crate::registry::ToolRegistry;
use crate::taxonomy::ClinicalContext;
use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Field weights for [`AutoDiscoveryEngine::search`], following the
/// registry's weighting with extracted domains slotted between purpose and
/// keyword. Additive per matching value per query token.
const WEIGHT_NAME: u32 = 8;
const WEIGHT_SPECIALTY: u32 = 7;
const WEIGHT_CONDITION: u32 = 6;
const WEIGHT_PURPOSE: u32 = 5;
const WEIGHT_DOMAIN: u32 = 5;
const WEIGHT_KEYWORD: u32 = 4;

/// Similarity weights for [`AutoDiscoveryEngine::get_related_tools`]:
/// author-declared dimensions outweigh inferred ones, parameters are the
/// noisiest signal.
const SIM_SPECIALTY: f64 = 2.0;
const SIM_CONDITION: f64 = 1.5;
const SIM_CONTEXT: f64 = 1.0;
const SIM_DOMAIN: f64 = 1.0;
const SIM_PARAMETER: f64 = 0.5;

lazy_static! {
    /// Canonical condition label -> case-insensitive phrase variants.
    /// Any variant occurring in a tool's free-text surface adds the
    /// canonical label to its extracted conditions.
    static ref CONDITION_PATTERNS: Vec<(&'static str, Vec<&'static str>)> = vec![
        ("sepsis", vec!["sepsis", "septic"]),
        ("shock", vec!["shock"]),
        ("pneumonia", vec!["pneumonia"]),
        ("kidney_injury", vec!["acute kidney injury", "renal failure", "renal impairment"]),
        ("liver_disease", vec!["cirrhosis", "liver failure", "hepatic failure", "liver disease"]),
        ("stroke", vec!["stroke", "cerebrovascular accident"]),
        ("atrial_fibrillation", vec!["atrial fibrillation", "afib"]),
        ("heart_failure", vec!["heart failure", "congestive heart"]),
        ("myocardial_infarction", vec!["myocardial infarction", "heart attack", "stemi"]),
        ("pulmonary_embolism", vec!["pulmonary embolism"]),
        ("venous_thromboembolism", vec!["deep vein thrombosis", "venous thromboembolism", "dvt"]),
        ("bleeding", vec!["bleeding", "hemorrhage", "haemorrhage"]),
        ("diabetes", vec!["diabetes", "diabetic", "hyperglycemia"]),
        ("copd", vec!["copd", "chronic obstructive"]),
        ("asthma", vec!["asthma"]),
        ("pancreatitis", vec!["pancreatitis"]),
        ("delirium", vec!["delirium"]),
        ("trauma", vec!["trauma", "injury severity"]),
        ("meningitis", vec!["meningitis"]),
    ];

    /// Normalized parameter name -> clinical domain. Keys are the output of
    /// [`normalize_parameter`], so digit-bearing names appear digit-stripped
    /// ("fio2" -> "fio").
    static ref PARAMETER_DOMAINS: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        // renal
        map.insert("creatinine", "renal");
        map.insert("bun", "renal");
        map.insert("urea", "renal");
        map.insert("urine_output", "renal");
        map.insert("egfr", "renal");
        // cardiac
        map.insert("heart_rate", "cardiac");
        map.insert("systolic_bp", "cardiac");
        map.insert("diastolic_bp", "cardiac");
        map.insert("blood_pressure", "cardiac");
        map.insert("mean_arterial_pressure", "cardiac");
        map.insert("troponin", "cardiac");
        // hepatic
        map.insert("bilirubin", "hepatic");
        map.insert("albumin", "hepatic");
        map.insert("ast", "hepatic");
        map.insert("alt", "hepatic");
        map.insert("ammonia", "hepatic");
        // neurological
        map.insert("gcs", "neurological");
        map.insert("pupil_reactivity", "neurological");
        map.insert("motor_response", "neurological");
        // hematology
        map.insert("platelets", "hematology");
        map.insert("hemoglobin", "hematology");
        map.insert("hematocrit", "hematology");
        map.insert("wbc", "hematology");
        map.insert("inr", "hematology");
        // metabolic
        map.insert("sodium", "metabolic");
        map.insert("potassium", "metabolic");
        map.insert("glucose", "metabolic");
        map.insert("lactate", "metabolic");
        map.insert("bicarbonate", "metabolic");
        map.insert("ph", "metabolic");
        // respiratory
        map.insert("respiratory_rate", "respiratory");
        map.insert("oxygen_saturation", "respiratory");
        map.insert("fio", "respiratory");
        map.insert("pao", "respiratory");
        map.insert("spo", "respiratory");
        // demographics
        map.insert("age", "demographics");
        map.insert("sex", "demographics");
        map.insert("weight", "demographics");
        map.insert("height", "demographics");
        map
    };
}

/// Unit and qualifier suffixes stripped during parameter normalization.
const PARAMETER_SUFFIXES: &[&str] = &[
    "_mg_dl", "_mmol_l", "_g_dl", "_bpm", "_mmhg", "_score", "_percent", "_celsius",
    "_fahrenheit", "_kg", "_cm", "_min", "_ml", "_value", "_level",
];

/// Normalize a parameter name for domain lookup and cross-tool comparison:
/// lower-case, strip a trailing unit/qualifier suffix, strip embedded
/// digits, trim leftover underscores.
pub fn normalize_parameter(name: &str) -> String {
    let mut normalized = name.to_lowercase();
    for suffix in PARAMETER_SUFFIXES {
        if let Some(stripped) = normalized.strip_suffix(suffix) {
            normalized = stripped.to_string();
            break;
        }
    }
    let normalized: String = normalized.chars().filter(|c| !c.is_ascii_digit()).collect();
    normalized.trim_matches('_').to_string()
}

/// Per-tool union of author-declared and derived dimensions.
///
/// Invariant: `all_conditions == manual_conditions ∪ extracted_conditions`.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedKey {
    /// Author-supplied condition labels, verbatim from the high-level key
    pub manual_conditions: BTreeSet<String>,
    /// Canonical labels matched out of the tool's free-text surface
    pub extracted_conditions: BTreeSet<String>,
    /// Union of manual and extracted
    pub all_conditions: BTreeSet<String>,
    /// Clinical domains inferred from normalized input parameter names
    pub extracted_domains: BTreeSet<String>,
}

impl EnrichedKey {
    fn new(
        manual_conditions: BTreeSet<String>,
        extracted_conditions: BTreeSet<String>,
        extracted_domains: BTreeSet<String>,
    ) -> Self {
        let all_conditions = manual_conditions
            .union(&extracted_conditions)
            .cloned()
            .collect();
        Self {
            manual_conditions,
            extracted_conditions,
            all_conditions,
            extracted_domains,
        }
    }
}

/// A scored discovery hit with human-readable match explanations.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryHit {
    pub tool_id: String,
    pub name: String,
    pub score: u32,
    /// At least one entry per hit, naming the field/dimension that matched
    pub match_reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryStatistics {
    pub total_tools: usize,
    pub total_conditions: usize,
    pub total_keywords: usize,
    pub total_domains: usize,
    pub is_built: bool,
}

/// Snapshot of one tool's searchable surface, captured at build time so
/// queries never need the registry again.
struct ToolProfile {
    name: String,
    purpose: String,
    specialties: Vec<String>,
    contexts: Vec<ClinicalContext>,
    keywords: Vec<String>,
    normalized_parameters: BTreeSet<String>,
    enriched: EnrichedKey,
}

/// Enrichment and search layer over a built registry snapshot.
#[derive(Default)]
pub struct AutoDiscoveryEngine {
    profiles: HashMap<String, ToolProfile>,
    /// Registration order of the snapshot, the stable tie-break order
    order: Vec<String>,
    built: bool,
}

impl AutoDiscoveryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// One-shot enrichment pass over the registry. Recomputes everything
    /// from scratch, so calling it again after further registrations simply
    /// refreshes the snapshot.
    pub fn build_from_registry(&mut self, registry: &ToolRegistry) {
        self.profiles.clear();
        self.order.clear();

        for tool in registry.list_all() {
            let tool_id = tool.tool_id().to_string();
            let meta = tool.low_level();
            let key = tool.high_level();

            // Free-text surface: name + purpose + clinical questions.
            let mut surface = format!("{} {}", meta.name, meta.purpose);
            for question in &key.clinical_questions {
                surface.push(' ');
                surface.push_str(question);
            }
            let surface = surface.to_lowercase();

            let mut extracted_conditions = BTreeSet::new();
            for (label, variants) in CONDITION_PATTERNS.iter() {
                if variants.iter().any(|v| surface.contains(v)) {
                    extracted_conditions.insert(label.to_string());
                }
            }

            let normalized_parameters: BTreeSet<String> = meta
                .input_parameters
                .iter()
                .map(|p| normalize_parameter(p))
                .filter(|p| !p.is_empty())
                .collect();
            let extracted_domains: BTreeSet<String> = normalized_parameters
                .iter()
                .filter_map(|p| PARAMETER_DOMAINS.get(p.as_str()))
                .map(|d| d.to_string())
                .collect();

            debug!(
                tool_id = %tool_id,
                conditions = extracted_conditions.len(),
                domains = extracted_domains.len(),
                "enriched calculator"
            );

            let manual_conditions = key.conditions.iter().cloned().collect();
            let enriched =
                EnrichedKey::new(manual_conditions, extracted_conditions, extracted_domains);

            self.profiles.insert(
                tool_id.clone(),
                ToolProfile {
                    name: meta.name.clone(),
                    purpose: meta.purpose.clone(),
                    specialties: key.specialties.iter().map(|s| s.as_str().to_string()).collect(),
                    contexts: key.contexts.iter().copied().collect(),
                    keywords: key.keywords.iter().map(|k| k.to_lowercase()).collect(),
                    normalized_parameters,
                    enriched,
                },
            );
            self.order.push(tool_id);
        }

        self.built = true;
        info!(tools = self.order.len(), "auto-discovery engine built");
    }

    /// Token-based search over the enriched dimensions. Every token is
    /// checked against every field; each match adds its field weight and a
    /// reason. No substring hit anywhere means the tool is excluded.
    pub fn search(&self, query: &str, limit: usize) -> Vec<DiscoveryHit> {
        if !self.built {
            return Vec::new();
        }
        let tokens: Vec<String> = query
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for id in &self.order {
            let Some(profile) = self.profiles.get(id) else {
                continue;
            };
            let mut score = 0;
            let mut reasons = Vec::new();

            for token in &tokens {
                if profile.name.to_lowercase().contains(token) {
                    score += WEIGHT_NAME;
                    reasons.push(format!("name matches '{}'", token));
                }
                if profile.purpose.to_lowercase().contains(token) {
                    score += WEIGHT_PURPOSE;
                    reasons.push(format!("purpose matches '{}'", token));
                }
                for specialty in &profile.specialties {
                    if specialty.contains(token) {
                        score += WEIGHT_SPECIALTY;
                        reasons.push(format!("specialty '{}' matches '{}'", specialty, token));
                    }
                }
                for condition in &profile.enriched.all_conditions {
                    if condition.to_lowercase().contains(token) {
                        score += WEIGHT_CONDITION;
                        reasons.push(format!("condition '{}' matches '{}'", condition, token));
                    }
                }
                for keyword in &profile.keywords {
                    if keyword.contains(token) {
                        score += WEIGHT_KEYWORD;
                        reasons.push(format!("keyword '{}' matches '{}'", keyword, token));
                    }
                }
                for domain in &profile.enriched.extracted_domains {
                    if domain.contains(token) {
                        score += WEIGHT_DOMAIN;
                        reasons.push(format!("clinical domain '{}' matches '{}'", domain, token));
                    }
                }
            }

            if score > 0 {
                hits.push(DiscoveryHit {
                    tool_id: id.clone(),
                    name: profile.name.clone(),
                    score,
                    match_reasons: reasons,
                });
            }
        }

        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(limit);
        hits
    }

    /// Rank other tools by weighted overlap of shared dimensions with the
    /// given tool. Unknown id or unbuilt engine yields an empty list.
    pub fn get_related_tools(&self, tool_id: &str, limit: usize) -> Vec<(String, f64)> {
        let Some(reference) = self.profiles.get(tool_id) else {
            return Vec::new();
        };

        let mut scored = Vec::new();
        for id in &self.order {
            if id == tool_id {
                continue;
            }
            let Some(other) = self.profiles.get(id) else {
                continue;
            };

            let shared_specialties = count_shared(&reference.specialties, &other.specialties);
            let shared_contexts = reference
                .contexts
                .iter()
                .filter(|c| other.contexts.contains(c))
                .count();
            let shared_conditions = reference
                .enriched
                .all_conditions
                .intersection(&other.enriched.all_conditions)
                .count();
            let shared_domains = reference
                .enriched
                .extracted_domains
                .intersection(&other.enriched.extracted_domains)
                .count();
            let shared_parameters = reference
                .normalized_parameters
                .intersection(&other.normalized_parameters)
                .count();

            let score = shared_specialties as f64 * SIM_SPECIALTY
                + shared_conditions as f64 * SIM_CONDITION
                + shared_contexts as f64 * SIM_CONTEXT
                + shared_domains as f64 * SIM_DOMAIN
                + shared_parameters as f64 * SIM_PARAMETER;

            if score > 0.0 {
                scored.push((id.clone(), score));
            }
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        scored
    }

    /// Tools ranked by how many of the requested parameters they use, after
    /// normalization on both sides. Ties break by registration order.
    pub fn find_tools_by_params(&self, param_names: &[&str]) -> Vec<(String, usize)> {
        let requested: BTreeSet<String> = param_names
            .iter()
            .map(|p| normalize_parameter(p))
            .filter(|p| !p.is_empty())
            .collect();
        if requested.is_empty() {
            return Vec::new();
        }

        let mut scored = Vec::new();
        for id in &self.order {
            let Some(profile) = self.profiles.get(id) else {
                continue;
            };
            let overlap = profile
                .normalized_parameters
                .intersection(&requested)
                .count();
            if overlap > 0 {
                scored.push((id.clone(), overlap));
            }
        }
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored
    }

    /// Tools whose enriched condition set contains the label,
    /// case-insensitively. Registration order.
    pub fn find_tools_by_condition(&self, condition: &str) -> Vec<String> {
        let needle = condition.to_lowercase();
        self.order
            .iter()
            .filter(|id| {
                self.profiles.get(*id).is_some_and(|p| {
                    p.enriched
                        .all_conditions
                        .iter()
                        .any(|c| c.to_lowercase() == needle)
                })
            })
            .cloned()
            .collect()
    }

    /// Tools whose extracted domains contain the label. Registration order.
    pub fn find_tools_by_domain(&self, domain: &str) -> Vec<String> {
        let needle = domain.to_lowercase();
        self.order
            .iter()
            .filter(|id| {
                self.profiles
                    .get(*id)
                    .is_some_and(|p| p.enriched.extracted_domains.contains(&needle))
            })
            .cloned()
            .collect()
    }

    /// The stored enriched key, or `None` if the id is unknown or the
    /// engine is unbuilt.
    pub fn get_enriched_key(&self, tool_id: &str) -> Option<&EnrichedKey> {
        self.profiles.get(tool_id).map(|p| &p.enriched)
    }

    pub fn get_statistics(&self) -> DiscoveryStatistics {
        let mut conditions = BTreeSet::new();
        let mut keywords = BTreeSet::new();
        let mut domains = BTreeSet::new();
        for profile in self.profiles.values() {
            for c in &profile.enriched.all_conditions {
                conditions.insert(c.to_lowercase());
            }
            keywords.extend(profile.keywords.iter().cloned());
            domains.extend(profile.enriched.extracted_domains.iter().cloned());
        }
        DiscoveryStatistics {
            total_tools: self.profiles.len(),
            total_conditions: conditions.len(),
            total_keywords: keywords.len(),
            total_domains: domains.len(),
            is_built: self.built,
        }
    }
}

fn count_shared(a: &[String], b: &[String]) -> usize {
    a.iter().filter(|v| b.contains(v)).count()
}
