// src/core/vocabulary.rs
use crate::core::types::{FeatureVector, SymptomId};
use crate::error::LoadError;
use log::debug;
use std::collections::HashMap;

/// The ordered set of known symptoms. Fixes the feature vector schema.
#[derive(Debug, Clone)]
pub struct FeatureVocabulary {
    symptoms: Vec<SymptomId>,
    positions: HashMap<SymptomId, usize>,
}

impl FeatureVocabulary {
    /// Builds the vocabulary from symptoms in schema order. Identifiers must be unique.
    pub fn new<I, S>(symptoms: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SymptomId>,
    {
        let symptoms: Vec<SymptomId> = symptoms.into_iter().map(Into::into).collect();
        let mut positions = HashMap::with_capacity(symptoms.len());
        for (i, symptom) in symptoms.iter().enumerate() {
            if positions.insert(symptom.clone(), i).is_some() {
                return Err(LoadError::DuplicateSymptom(symptom.clone()));
            }
        }
        Ok(Self { symptoms, positions })
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    pub fn symptoms(&self) -> &[SymptomId] {
        &self.symptoms
    }

    pub fn position(&self, symptom: &str) -> Option<usize> {
        self.positions.get(symptom).copied()
    }

    pub fn contains(&self, symptom: &str) -> bool {
        self.positions.contains_key(symptom)
    }

    /// Encodes a selection as a vector of width `len()`.
    /// Identifiers outside the vocabulary are skipped. The result does not depend on
    /// the order (or repetition) of the input.
    pub fn encode<I, S>(&self, selected: I) -> FeatureVector
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vector = FeatureVector::zeros(self.symptoms.len());
        for symptom in selected {
            let symptom = symptom.as_ref();
            match self.position(symptom) {
                Some(i) => vector.set(i),
                None => debug!("ignoring unknown symptom '{}'", symptom),
            }
        }
        vector
    }
}
