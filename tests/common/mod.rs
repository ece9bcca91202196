//! Shared fixture calculators for the integration tests

// Not every test binary uses every fixture helper
#![allow(dead_code)]

use medcalc_discovery::calculator::{
    Calculator, HighLevelKey, LowLevelMetadata, ValidationStatus,
};
use medcalc_discovery::taxonomy::{ClinicalContext, Specialty};
use std::sync::Arc;

pub struct FixtureCalculator {
    id: String,
    low: LowLevelMetadata,
    high: HighLevelKey,
}

impl Calculator for FixtureCalculator {
    fn tool_id(&self) -> &str {
        &self.id
    }

    fn low_level(&self) -> &LowLevelMetadata {
        &self.low
    }

    fn high_level(&self) -> &HighLevelKey {
        &self.high
    }
}

/// Builder for test calculators; only the fields a test cares about need
/// to be set.
pub struct FixtureBuilder {
    id: String,
    low: LowLevelMetadata,
    high: HighLevelKey,
}

impl FixtureBuilder {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            low: LowLevelMetadata {
                name: name.to_string(),
                purpose: String::new(),
                input_parameters: Vec::new(),
                output_type: "integer score".to_string(),
                references: Vec::new(),
                version: "1.0.0".to_string(),
                validation_status: ValidationStatus::Validated,
            },
            high: HighLevelKey::default(),
        }
    }

    pub fn purpose(mut self, purpose: &str) -> Self {
        self.low.purpose = purpose.to_string();
        self
    }

    pub fn params(mut self, params: &[&str]) -> Self {
        self.low.input_parameters = params.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn specialties(mut self, specialties: &[Specialty]) -> Self {
        self.high.specialties = specialties.iter().copied().collect();
        self
    }

    pub fn contexts(mut self, contexts: &[ClinicalContext]) -> Self {
        self.high.contexts = contexts.iter().copied().collect();
        self
    }

    pub fn conditions(mut self, conditions: &[&str]) -> Self {
        self.high.conditions = conditions.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.high.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn icd10(mut self, codes: &[&str]) -> Self {
        self.high.icd10_codes = codes.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn questions(mut self, questions: &[&str]) -> Self {
        self.high.clinical_questions = questions.iter().map(|q| q.to_string()).collect();
        self
    }

    pub fn build(self) -> Arc<dyn Calculator> {
        Arc::new(FixtureCalculator {
            id: self.id,
            low: self.low,
            high: self.high,
        })
    }
}

/// A small ICU-flavored catalog used by several test files.
pub fn icu_catalog() -> Vec<Arc<dyn Calculator>> {
    vec![
        FixtureBuilder::new("sofa_score", "SOFA Score")
            .purpose("Assess organ failure severity in septic shock and critical illness")
            .params(&[
                "pao2",
                "fio2",
                "platelets",
                "bilirubin_mg_dl",
                "mean_arterial_pressure",
                "gcs_score",
                "creatinine_mg_dl",
            ])
            .specialties(&[Specialty::CriticalCare, Specialty::InfectiousDisease])
            .contexts(&[ClinicalContext::IntensiveCare])
            .conditions(&["sepsis", "organ failure"])
            .keywords(&["sofa", "organ dysfunction", "icu severity"])
            .icd10(&["R65.21", "A41.9"])
            .questions(&["How severe is this patient's organ dysfunction?"])
            .build(),
        FixtureBuilder::new("qsofa_score", "qSOFA Score")
            .purpose("Rapid bedside screen for sepsis outside the ICU")
            .params(&["respiratory_rate", "systolic_bp_mmhg", "gcs_score"])
            .specialties(&[Specialty::CriticalCare, Specialty::EmergencyMedicine])
            .contexts(&[ClinicalContext::EmergencyDepartment, ClinicalContext::Ward])
            .conditions(&["sepsis"])
            .keywords(&["qsofa", "sepsis screen"])
            .icd10(&["A41.9"])
            .questions(&["Does this ward patient need sepsis workup?"])
            .build(),
        FixtureBuilder::new("meld_score", "MELD Score")
            .purpose("Estimate mortality in end-stage liver disease")
            .params(&["bilirubin_mg_dl", "creatinine_mg_dl", "inr", "sodium"])
            .specialties(&[Specialty::Hepatology, Specialty::Gastroenterology])
            .contexts(&[ClinicalContext::Ward, ClinicalContext::OutpatientClinic])
            .conditions(&["cirrhosis"])
            .keywords(&["meld", "transplant", "liver"])
            .icd10(&["K74.60"])
            .questions(&["What is this patient's transplant priority?"])
            .build(),
        FixtureBuilder::new("chads_vasc", "CHA2DS2-VASc Score")
            .purpose("Stroke risk in atrial fibrillation")
            .params(&["age", "sex", "systolic_bp_mmhg"])
            .specialties(&[Specialty::Cardiology])
            .contexts(&[ClinicalContext::OutpatientClinic])
            .conditions(&["atrial fibrillation"])
            .keywords(&["anticoagulation", "stroke risk"])
            .icd10(&["I48.91"])
            .questions(&["Should this AF patient be anticoagulated?"])
            .build(),
    ]
}

pub fn register_all(
    registry: &mut medcalc_discovery::ToolRegistry,
    tools: Vec<Arc<dyn Calculator>>,
) {
    for tool in tools {
        registry.register(tool).expect("fixture registration failed");
    }
}
