// src/core/model.rs
use crate::core::types::{ClassIndex, FeatureVector};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A trained model that maps one feature vector to one class index.
/// Implementations must be deterministic for a fixed loaded model.
pub trait Classifier: Send + Sync {
    /// Feature width the model was trained on.
    fn n_features(&self) -> usize;

    fn n_classes(&self) -> usize;

    fn classify(&self, features: &FeatureVector) -> Result<ClassIndex, ModelError>;

    /// Short identifier of the algorithm, for logs.
    fn kind(&self) -> &str;
}

/// Maps a class index back to the label it was fitted on.
pub trait LabelDecoder: Send + Sync {
    fn n_classes(&self) -> usize;

    fn decode(&self, index: ClassIndex) -> Result<&str, ModelError>;
}

fn check_width(expected: usize, features: &FeatureVector) -> Result<(), ModelError> {
    if features.len() != expected {
        return Err(ModelError::FeatureWidth { expected, actual: features.len() });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// `features[feature] <= threshold` goes left, otherwise right.
    Split { feature: usize, threshold: f32, left: usize, right: usize },
    Leaf { class: ClassIndex },
}

/// A binary decision tree stored as a node arena rooted at index 0.
/// Children always sit after their parent, so every walk terminates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    n_features: usize,
    n_classes: usize,
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn new(n_features: usize, n_classes: usize, nodes: Vec<TreeNode>) -> Result<Self, ModelError> {
        let tree = Self { n_features, n_classes, nodes };
        tree.validate()?;
        Ok(tree)
    }

    /// A single-leaf tree that predicts `class` for every input.
    pub fn constant(n_features: usize, n_classes: usize, class: ClassIndex) -> Result<Self, ModelError> {
        Self::new(n_features, n_classes, vec![TreeNode::Leaf { class }])
    }

    /// Checks the arena invariants. Deserialized trees must pass this before use.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::MalformedTree("no nodes".into()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split { feature, left, right, .. } => {
                    if feature >= self.n_features {
                        return Err(ModelError::MalformedTree(format!(
                            "node {i} splits on feature {feature}, width is {}",
                            self.n_features
                        )));
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(ModelError::MalformedTree(format!(
                                "node {i} has invalid child {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { class } => {
                    if class >= self.n_classes {
                        return Err(ModelError::ClassOutOfRange { index: class, n_classes: self.n_classes });
                    }
                }
            }
        }
        Ok(())
    }
}

impl Classifier for DecisionTree {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn classify(&self, features: &FeatureVector) -> Result<ClassIndex, ModelError> {
        check_width(self.n_features, features)?;
        let values = features.as_slice();
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { class }) => return Ok(*class),
                Some(TreeNode::Split { feature, threshold, left, right }) => {
                    let value = values.get(*feature).ok_or_else(|| {
                        ModelError::MalformedTree(format!("node {idx} splits on missing feature {feature}"))
                    })?;
                    let next = if f32::from(*value) <= *threshold { *left } else { *right };
                    if next <= idx {
                        return Err(ModelError::MalformedTree(format!("node {idx} has invalid child {next}")));
                    }
                    idx = next;
                }
                None => return Err(ModelError::MalformedTree(format!("dangling node {idx}"))),
            }
        }
    }

    fn kind(&self) -> &str {
        "decision_tree"
    }
}

/// Majority vote over decision trees sharing one feature width and class set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(trees: Vec<DecisionTree>) -> Result<Self, ModelError> {
        let forest = Self { trees };
        forest.validate()?;
        Ok(forest)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let first = self.trees.first().ok_or(ModelError::EmptyForest)?;
        for tree in &self.trees {
            tree.validate()?;
            if tree.n_features != first.n_features || tree.n_classes != first.n_classes {
                return Err(ModelError::MalformedTree(
                    "trees disagree on feature width or class count".into(),
                ));
            }
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.trees.first().map_or(0, |t| t.n_features)
    }

    fn n_classes(&self) -> usize {
        self.trees.first().map_or(0, |t| t.n_classes)
    }

    fn classify(&self, features: &FeatureVector) -> Result<ClassIndex, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::EmptyForest);
        }
        let mut votes = vec![0usize; self.n_classes()];
        for tree in &self.trees {
            let class = tree.classify(features)?;
            let n_classes = votes.len();
            let slot = votes
                .get_mut(class)
                .ok_or(ModelError::ClassOutOfRange { index: class, n_classes })?;
            *slot += 1;
        }
        // Ties go to the lowest class index.
        let mut best = 0;
        for (class, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = class;
            }
        }
        Ok(best)
    }

    fn kind(&self) -> &str {
        "random_forest"
    }
}

/// The on-disk form of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelArtifact {
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

impl ModelArtifact {
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            ModelArtifact::DecisionTree(t) => t.validate(),
            ModelArtifact::RandomForest(f) => f.validate(),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            ModelArtifact::DecisionTree(t) => t as &dyn Classifier,
            ModelArtifact::RandomForest(f) => f as &dyn Classifier,
        }
    }
}

impl Classifier for ModelArtifact {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn n_classes(&self) -> usize {
        self.inner().n_classes()
    }

    fn classify(&self, features: &FeatureVector) -> Result<ClassIndex, ModelError> {
        self.inner().classify(features)
    }

    fn kind(&self) -> &str {
        self.inner().kind()
    }
}

/// Ordered class labels; index `i` decodes to `classes[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let encoder = Self { classes: classes.into_iter().map(Into::into).collect() };
        encoder.validate()?;
        Ok(encoder)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::with_capacity(self.classes.len());
        for class in &self.classes {
            if !seen.insert(class.as_str()) {
                return Err(ModelError::DuplicateLabel(class.clone()));
            }
        }
        Ok(())
    }
}

impl LabelDecoder for LabelEncoder {
    fn n_classes(&self) -> usize {
        self.classes.len()
    }

    fn decode(&self, index: ClassIndex) -> Result<&str, ModelError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(ModelError::ClassOutOfRange { index, n_classes: self.classes.len() })
    }
}
