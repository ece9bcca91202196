//! Clinical taxonomy: specialties, care contexts, and display tables
//!
//! Two closed enumerations (`Specialty`, `ClinicalContext`) plus the static
//! `TaxonomyCatalog` lookup tables used by result presentation. The tables
//! are pure data with no build step; the matching algorithms never consult
//! them.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Medical specialty a tool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Specialty {
    Anesthesiology,
    Cardiology,
    CriticalCare,
    EmergencyMedicine,
    Endocrinology,
    Gastroenterology,
    Geriatrics,
    Hematology,
    Hepatology,
    InfectiousDisease,
    InternalMedicine,
    Nephrology,
    Neurology,
    ObstetricsGynecology,
    Pediatrics,
    Psychiatry,
    Pulmonology,
    Surgery,
}

impl Specialty {
    /// Canonical snake_case value, also the inverted-index key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::Anesthesiology => "anesthesiology",
            Specialty::Cardiology => "cardiology",
            Specialty::CriticalCare => "critical_care",
            Specialty::EmergencyMedicine => "emergency_medicine",
            Specialty::Endocrinology => "endocrinology",
            Specialty::Gastroenterology => "gastroenterology",
            Specialty::Geriatrics => "geriatrics",
            Specialty::Hematology => "hematology",
            Specialty::Hepatology => "hepatology",
            Specialty::InfectiousDisease => "infectious_disease",
            Specialty::InternalMedicine => "internal_medicine",
            Specialty::Nephrology => "nephrology",
            Specialty::Neurology => "neurology",
            Specialty::ObstetricsGynecology => "obstetrics_gynecology",
            Specialty::Pediatrics => "pediatrics",
            Specialty::Psychiatry => "psychiatry",
            Specialty::Pulmonology => "pulmonology",
            Specialty::Surgery => "surgery",
        }
    }

    /// All variants, in canonical order.
    pub fn all() -> &'static [Specialty] {
        &[
            Specialty::Anesthesiology,
            Specialty::Cardiology,
            Specialty::CriticalCare,
            Specialty::EmergencyMedicine,
            Specialty::Endocrinology,
            Specialty::Gastroenterology,
            Specialty::Geriatrics,
            Specialty::Hematology,
            Specialty::Hepatology,
            Specialty::InfectiousDisease,
            Specialty::InternalMedicine,
            Specialty::Nephrology,
            Specialty::Neurology,
            Specialty::ObstetricsGynecology,
            Specialty::Pediatrics,
            Specialty::Psychiatry,
            Specialty::Pulmonology,
            Specialty::Surgery,
        ]
    }

    /// Total lookup from a free-text name. Lower-cases and strips
    /// `_`/`-`/space separators before matching, so "Critical Care",
    /// "critical-care", and "CRITICAL_CARE" all resolve. Returns `None`
    /// for anything outside the closed set.
    pub fn parse(value: &str) -> Option<Specialty> {
        let normalized = normalize_label(value);
        Specialty::all()
            .iter()
            .copied()
            .find(|s| normalize_label(s.as_str()) == normalized)
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Care setting or workflow stage a tool is used in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClinicalContext {
    EmergencyDepartment,
    IntensiveCare,
    OperatingRoom,
    OutpatientClinic,
    Prehospital,
    Ward,
}

impl ClinicalContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClinicalContext::EmergencyDepartment => "emergency_department",
            ClinicalContext::IntensiveCare => "intensive_care",
            ClinicalContext::OperatingRoom => "operating_room",
            ClinicalContext::OutpatientClinic => "outpatient_clinic",
            ClinicalContext::Prehospital => "prehospital",
            ClinicalContext::Ward => "ward",
        }
    }

    pub fn all() -> &'static [ClinicalContext] {
        &[
            ClinicalContext::EmergencyDepartment,
            ClinicalContext::IntensiveCare,
            ClinicalContext::OperatingRoom,
            ClinicalContext::OutpatientClinic,
            ClinicalContext::Prehospital,
            ClinicalContext::Ward,
        ]
    }

    /// Total lookup, same normalization as [`Specialty::parse`].
    pub fn parse(value: &str) -> Option<ClinicalContext> {
        let normalized = normalize_label(value);
        ClinicalContext::all()
            .iter()
            .copied()
            .find(|c| normalize_label(c.as_str()) == normalized)
    }
}

impl fmt::Display for ClinicalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_label(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(*c, '_' | '-' | ' '))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

lazy_static! {
    /// Specialty -> coarse group label, for grouped presentation.
    static ref SPECIALTY_GROUPS: HashMap<Specialty, &'static str> = {
        let mut map = HashMap::new();
        map.insert(Specialty::Cardiology, "Medicine");
        map.insert(Specialty::Endocrinology, "Medicine");
        map.insert(Specialty::Gastroenterology, "Medicine");
        map.insert(Specialty::Hematology, "Medicine");
        map.insert(Specialty::Hepatology, "Medicine");
        map.insert(Specialty::InfectiousDisease, "Medicine");
        map.insert(Specialty::InternalMedicine, "Medicine");
        map.insert(Specialty::Nephrology, "Medicine");
        map.insert(Specialty::Neurology, "Medicine");
        map.insert(Specialty::Pulmonology, "Medicine");
        map.insert(Specialty::Anesthesiology, "Perioperative");
        map.insert(Specialty::Surgery, "Perioperative");
        map.insert(Specialty::CriticalCare, "Acute Care");
        map.insert(Specialty::EmergencyMedicine, "Acute Care");
        map.insert(Specialty::Geriatrics, "Population");
        map.insert(Specialty::ObstetricsGynecology, "Population");
        map.insert(Specialty::Pediatrics, "Population");
        map.insert(Specialty::Psychiatry, "Population");
        map
    };

    /// Curated related-specialty table. Deliberately asymmetric: critical
    /// care relates to nephrology (renal scores are ICU bread and butter)
    /// without nephrology listing critical care back.
    static ref RELATED_SPECIALTIES: HashMap<Specialty, Vec<Specialty>> = {
        let mut map = HashMap::new();
        map.insert(
            Specialty::CriticalCare,
            vec![
                Specialty::EmergencyMedicine,
                Specialty::Anesthesiology,
                Specialty::Nephrology,
                Specialty::Pulmonology,
            ],
        );
        map.insert(
            Specialty::EmergencyMedicine,
            vec![Specialty::CriticalCare, Specialty::InternalMedicine],
        );
        map.insert(
            Specialty::Cardiology,
            vec![Specialty::InternalMedicine, Specialty::CriticalCare],
        );
        map.insert(Specialty::Nephrology, vec![Specialty::InternalMedicine]);
        map.insert(
            Specialty::Hepatology,
            vec![Specialty::Gastroenterology, Specialty::InternalMedicine],
        );
        map.insert(
            Specialty::InfectiousDisease,
            vec![Specialty::InternalMedicine, Specialty::CriticalCare],
        );
        map.insert(
            Specialty::Pulmonology,
            vec![Specialty::CriticalCare, Specialty::InternalMedicine],
        );
        map.insert(Specialty::Geriatrics, vec![Specialty::InternalMedicine]);
        map.insert(
            Specialty::Anesthesiology,
            vec![Specialty::Surgery, Specialty::CriticalCare],
        );
        map
    };

    /// Context -> human-readable description shown in discovery results.
    static ref CONTEXT_DESCRIPTIONS: HashMap<ClinicalContext, &'static str> = {
        let mut map = HashMap::new();
        map.insert(
            ClinicalContext::EmergencyDepartment,
            "Emergency department triage and initial workup",
        );
        map.insert(
            ClinicalContext::IntensiveCare,
            "Intensive care unit monitoring and severity scoring",
        );
        map.insert(
            ClinicalContext::OperatingRoom,
            "Intraoperative and anesthetic decision support",
        );
        map.insert(
            ClinicalContext::OutpatientClinic,
            "Outpatient clinic risk stratification and follow-up",
        );
        map.insert(
            ClinicalContext::Prehospital,
            "Prehospital and field assessment",
        );
        map.insert(
            ClinicalContext::Ward,
            "Inpatient ward surveillance and deterioration detection",
        );
        map
    };
}

/// Static, side-effect-free taxonomy lookups for presentation layers.
pub struct TaxonomyCatalog;

impl TaxonomyCatalog {
    /// Coarse group label for a specialty.
    pub fn specialty_group(specialty: Specialty) -> &'static str {
        SPECIALTY_GROUPS.get(&specialty).copied().unwrap_or("Other")
    }

    /// Curated related specialties; empty when none are curated.
    pub fn related_specialties(specialty: Specialty) -> Vec<Specialty> {
        RELATED_SPECIALTIES
            .get(&specialty)
            .cloned()
            .unwrap_or_default()
    }

    /// Human-readable description of a clinical context.
    pub fn context_description(context: ClinicalContext) -> &'static str {
        CONTEXT_DESCRIPTIONS.get(&context).copied().unwrap_or("")
    }

    /// snake_case -> Title Case ("critical_care" -> "Critical Care").
    pub fn display_name(value: &str) -> String {
        value
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
