// src/error.rs
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while bringing artifacts and tables into memory.
/// Any of these keeps the process from reaching a serving state.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read delimited file {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}, line {line}: {message}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("training schema {} must name at least one symptom and a target column", .path.display())]
    EmptySchema { path: PathBuf },

    #[error("duplicate symptom '{0}' in feature vocabulary")]
    DuplicateSymptom(String),

    #[error("failed to decode binary artifact {}: {source}", .path.display())]
    Bincode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("failed to decode JSON {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact: {0}")]
    Model(#[from] ModelError),

    #[error("artifacts do not fit together: {0}")]
    Engine(#[from] EngineError),
}

/// Structural or runtime faults inside a classifier or label decoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("expected {expected} features, got {actual}")]
    FeatureWidth { expected: usize, actual: usize },

    #[error("class index {index} out of range for {n_classes} known classes")]
    ClassOutOfRange { index: usize, n_classes: usize },

    #[error("duplicate class label '{0}'")]
    DuplicateLabel(String),

    #[error("malformed tree: {0}")]
    MalformedTree(String),

    #[error("random forest has no trees")]
    EmptyForest,
}

/// Errors from building or running the inference engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("classifier expects {classifier} features but the vocabulary has {vocabulary} symptoms")]
    VocabularyMismatch { classifier: usize, vocabulary: usize },

    #[error("classifier knows {classifier} classes but the label decoder knows {decoder}")]
    ClassCountMismatch { classifier: usize, decoder: usize },

    /// Classifier and decoder disagree at request time; the artifacts are not from the same set.
    #[error("model artifacts are inconsistent: {0}")]
    Inconsistent(#[from] ModelError),
}
