// src/core/engine.rs
use crate::core::model::{Classifier, LabelDecoder};
use crate::core::reference::ReferenceTables;
use crate::core::types::{FeatureVector, PredictionResult};
use crate::core::vocabulary::FeatureVocabulary;
use crate::error::EngineError;
use log::{debug, error, info};
use std::sync::Arc;

/// Everything loaded at startup, checked for consistency once and then only read.
pub struct PredictionContext {
    vocabulary: FeatureVocabulary,
    tables: ReferenceTables,
    classifier: Box<dyn Classifier>,
    decoder: Box<dyn LabelDecoder>,
}

impl PredictionContext {
    pub fn new(
        vocabulary: FeatureVocabulary,
        tables: ReferenceTables,
        classifier: Box<dyn Classifier>,
        decoder: Box<dyn LabelDecoder>,
    ) -> Result<Self, EngineError> {
        if classifier.n_features() != vocabulary.len() {
            return Err(EngineError::VocabularyMismatch {
                classifier: classifier.n_features(),
                vocabulary: vocabulary.len(),
            });
        }
        if classifier.n_classes() != decoder.n_classes() {
            return Err(EngineError::ClassCountMismatch {
                classifier: classifier.n_classes(),
                decoder: decoder.n_classes(),
            });
        }
        info!(
            "prediction context ready: {} symptoms, {} classes ({})",
            vocabulary.len(),
            decoder.n_classes(),
            classifier.kind()
        );
        Ok(Self { vocabulary, tables, classifier, decoder })
    }

    pub fn vocabulary(&self) -> &FeatureVocabulary {
        &self.vocabulary
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }
}

/// Stateless front door over a shared `PredictionContext`.
#[derive(Clone)]
pub struct InferenceEngine {
    context: Arc<PredictionContext>,
}

impl InferenceEngine {
    pub fn new(context: PredictionContext) -> Self {
        Self { context: Arc::new(context) }
    }

    pub fn context(&self) -> &PredictionContext {
        &self.context
    }

    pub fn encode<I, S>(&self, selected: I) -> FeatureVector
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.context.vocabulary.encode(selected)
    }

    /// Predicts the disease name only, without the table join.
    pub fn predict_disease<I, S>(&self, selected: I) -> Result<String, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let features = self.encode(selected);
        if features.active_count() == 0 {
            // Still classified; callers decide whether an empty selection is acceptable.
            debug!("classifying an all-zero feature vector");
        }
        let class = self.context.classifier.classify(&features).map_err(|e| {
            error!("classifier rejected a vocabulary-built vector: {}", e);
            EngineError::Inconsistent(e)
        })?;
        let disease = self.context.decoder.decode(class).map_err(|e| {
            error!("label decoder cannot resolve class {}: {}", class, e);
            EngineError::Inconsistent(e)
        })?;
        debug!("{} active symptoms -> class {} ({})", features.active_count(), class, disease);
        Ok(disease.to_string())
    }

    /// Encodes, classifies, decodes, then joins description and precautions.
    pub fn predict<I, S>(&self, selected: I) -> Result<PredictionResult, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let disease = self.predict_disease(selected)?;
        let tables = &self.context.tables;
        Ok(PredictionResult {
            description: tables.describe(&disease),
            precautions: tables.precautions(&disease),
            disease,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{DecisionTree, LabelEncoder, TreeNode};
    use crate::error::ModelError;
    use pretty_assertions::assert_eq;

    struct FixedClassifier {
        width: usize,
        classes: usize,
        answer: usize,
    }

    impl Classifier for FixedClassifier {
        fn n_features(&self) -> usize {
            self.width
        }
        fn n_classes(&self) -> usize {
            self.classes
        }
        fn classify(&self, _features: &FeatureVector) -> Result<usize, ModelError> {
            Ok(self.answer)
        }
        fn kind(&self) -> &str {
            "fixed"
        }
    }

    fn vocabulary() -> FeatureVocabulary {
        FeatureVocabulary::new(["itching", "skin_rash", "fatigue"]).unwrap()
    }

    fn tables() -> ReferenceTables {
        let mut tables = ReferenceTables::new();
        tables.insert_description("Fungal infection", "A fungal infection is...");
        tables.insert_precautions("Fungal infection", ["bath twice", "use dettol", "keep dry", ""]);
        tables
    }

    fn engine_with(classifier: Box<dyn Classifier>, classes: &[&str]) -> InferenceEngine {
        let decoder = LabelEncoder::new(classes.iter().copied()).unwrap();
        InferenceEngine::new(
            PredictionContext::new(vocabulary(), tables(), classifier, Box::new(decoder)).unwrap(),
        )
    }

    #[test]
    fn end_to_end_fungal_infection() {
        let engine = engine_with(
            Box::new(FixedClassifier { width: 3, classes: 1, answer: 0 }),
            &["Fungal infection"],
        );
        let result = engine.predict(["itching", "fatigue"]).unwrap();
        assert_eq!(
            result,
            PredictionResult {
                disease: "Fungal infection".into(),
                description: "A fungal infection is...".into(),
                precautions: vec!["bath twice".into(), "use dettol".into(), "keep dry".into()],
            }
        );
    }

    #[test]
    fn missing_reference_rows_fall_back() {
        let engine = engine_with(
            Box::new(FixedClassifier { width: 3, classes: 2, answer: 1 }),
            &["Fungal infection", "Allergy"],
        );
        let result = engine.predict(["skin_rash"]).unwrap();
        assert_eq!(result.disease, "Allergy");
        assert_eq!(result.description, "Description not available.");
        assert_eq!(result.precautions, vec!["No precautions available.".to_string()]);
    }

    #[test]
    fn empty_selection_still_predicts() {
        let engine = engine_with(
            Box::new(FixedClassifier { width: 3, classes: 1, answer: 0 }),
            &["Fungal infection"],
        );
        let result = engine.predict(Vec::<&str>::new()).unwrap();
        assert_eq!(result.disease, "Fungal infection");
    }

    #[test]
    fn repeated_calls_agree() {
        let tree = DecisionTree::new(
            3,
            2,
            vec![
                TreeNode::Split { feature: 1, threshold: 0.5, left: 1, right: 2 },
                TreeNode::Leaf { class: 0 },
                TreeNode::Leaf { class: 1 },
            ],
        )
        .unwrap();
        let engine = engine_with(Box::new(tree), &["Fungal infection", "Allergy"]);
        let first = engine.predict(["skin_rash", "itching"]).unwrap();
        let second = engine.predict(["itching", "skin_rash"]).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.disease, "Allergy");
    }

    #[test]
    fn width_mismatch_is_rejected_at_startup() {
        let err = PredictionContext::new(
            vocabulary(),
            tables(),
            Box::new(FixedClassifier { width: 4, classes: 1, answer: 0 }),
            Box::new(LabelEncoder::new(["Fungal infection"]).unwrap()),
        )
        .err()
        .unwrap();
        assert_eq!(err, EngineError::VocabularyMismatch { classifier: 4, vocabulary: 3 });
    }

    #[test]
    fn class_count_mismatch_is_rejected_at_startup() {
        let err = PredictionContext::new(
            vocabulary(),
            tables(),
            Box::new(FixedClassifier { width: 3, classes: 2, answer: 0 }),
            Box::new(LabelEncoder::new(["Fungal infection"]).unwrap()),
        )
        .err()
        .unwrap();
        assert_eq!(err, EngineError::ClassCountMismatch { classifier: 2, decoder: 1 });
    }

    #[test]
    fn out_of_range_class_surfaces_as_inconsistency() {
        let engine = engine_with(
            Box::new(FixedClassifier { width: 3, classes: 1, answer: 7 }),
            &["Fungal infection"],
        );
        let err = engine.predict(["itching"]).unwrap_err();
        assert_eq!(
            err,
            EngineError::Inconsistent(ModelError::ClassOutOfRange { index: 7, n_classes: 1 })
        );
    }
}
