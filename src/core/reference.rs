// src/core/reference.rs
use crate::core::types::DiseaseLabel;
use log::warn;
use std::collections::HashMap;

pub const DESCRIPTION_FALLBACK: &str = "Description not available.";
pub const PRECAUTION_FALLBACK: &str = "No precautions available.";

/// Static lookups joined against a predicted disease after classification.
/// The classifier's labels and these keys come from separate files and may disagree,
/// so lookups degrade to fallback text instead of failing.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    descriptions: HashMap<DiseaseLabel, String>,
    precautions: HashMap<DiseaseLabel, Vec<String>>,
    severity: HashMap<String, i64>,
}

impl ReferenceTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a description row. The first row for a disease wins.
    pub fn insert_description(&mut self, disease: &str, description: &str) -> bool {
        insert_first(&mut self.descriptions, disease, description.to_string(), "description")
    }

    /// Adds a precaution row, dropping empty entries and keeping column order.
    pub fn insert_precautions<I, S>(&mut self, disease: &str, precautions: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kept: Vec<String> = precautions
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        insert_first(&mut self.precautions, disease, kept, "precaution")
    }

    pub fn insert_severity(&mut self, symptom: &str, weight: i64) -> bool {
        insert_first(&mut self.severity, symptom, weight, "severity")
    }

    pub fn describe(&self, disease: &str) -> String {
        match self.descriptions.get(disease) {
            Some(description) => description.clone(),
            None => {
                warn!("no description for '{}'", disease);
                DESCRIPTION_FALLBACK.to_string()
            }
        }
    }

    pub fn precautions(&self, disease: &str) -> Vec<String> {
        match self.precautions.get(disease) {
            Some(list) => list.clone(),
            None => {
                warn!("no precautions for '{}'", disease);
                vec![PRECAUTION_FALLBACK.to_string()]
            }
        }
    }

    /// Severity weight of a symptom. Not used when predicting.
    pub fn severity(&self, symptom: &str) -> Option<i64> {
        self.severity.get(symptom).copied()
    }

    pub fn description_count(&self) -> usize {
        self.descriptions.len()
    }

    pub fn precaution_count(&self) -> usize {
        self.precautions.len()
    }

    pub fn severity_count(&self) -> usize {
        self.severity.len()
    }
}

fn insert_first<V>(table: &mut HashMap<String, V>, key: &str, value: V, table_name: &str) -> bool {
    if table.contains_key(key) {
        warn!("duplicate {} row for '{}' ignored", table_name, key);
        return false;
    }
    table.insert(key.to_string(), value);
    true
}
