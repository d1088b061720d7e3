// src/core/types.rs
use serde::{Deserialize, Serialize};

/// A symptom token as it appears in the training schema header, e.g. "skin_rash".
pub type SymptomId = String;

/// A disease name as produced by the label decoder.
pub type DiseaseLabel = String;

/// Position of a class in the label encoder's ordered class list.
pub type ClassIndex = usize;

/// Binary encoding of a symptom selection, one slot per vocabulary entry.
/// Only the vocabulary builds these, so every instance has the vocabulary's width.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureVector(Vec<u8>);

impl FeatureVector {
    pub(crate) fn zeros(width: usize) -> Self {
        Self(vec![0; width])
    }

    pub(crate) fn set(&mut self, position: usize) {
        self.0[position] = 1;
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Number of slots set to 1.
    pub fn active_count(&self) -> usize {
        self.0.iter().filter(|&&v| v == 1).count()
    }
}

impl From<Vec<u8>> for FeatureVector {
    /// Wraps raw values, clamping anything non-zero to 1.
    fn from(values: Vec<u8>) -> Self {
        Self(values.into_iter().map(|v| u8::from(v != 0)).collect())
    }
}

/// What a caller gets back for one symptom selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub disease: DiseaseLabel,
    pub description: String,
    /// Ordered as in the precaution table, empty columns dropped.
    pub precautions: Vec<String>,
}
