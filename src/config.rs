// src/config.rs
use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Environment variable naming the directory that holds artifacts and tables.
pub const DATA_DIR_ENV: &str = "PREDICTOR_DATA_DIR";

/// Where every artifact and reference table lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub model_path: PathBuf,
    pub label_encoder_path: PathBuf,
    pub description_path: PathBuf,
    pub precaution_path: PathBuf,
    pub severity_path: PathBuf,
    pub training_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self::from_dir(".")
    }
}

impl DataConfig {
    /// Standard layout below `root`.
    pub fn from_dir(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let data = root.join("data");
        Self {
            model_path: root.join("disease_model.bin"),
            label_encoder_path: root.join("label_encoder.bin"),
            description_path: data.join("symptom_Description.csv"),
            precaution_path: data.join("symptom_precaution.csv"),
            severity_path: data.join("Symptom_severity.csv"),
            training_path: data.join("Training.csv"),
        }
    }

    /// Reads a JSON file; fields it leaves out keep their defaults.
    /// Relative paths inside it are resolved against the file's directory.
    pub fn from_json_file(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
        let config: DataConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| LoadError::Json { path: path.to_path_buf(), source })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.relative_to(base))
    }

    /// `--config <file>` wins, then `PREDICTOR_DATA_DIR`, then the working directory.
    pub fn resolve(config_file: Option<&Path>) -> Result<Self, LoadError> {
        if let Some(path) = config_file {
            return Self::from_json_file(path);
        }
        match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) => Ok(Self::from_dir(PathBuf::from(dir))),
            None => Ok(Self::default()),
        }
    }

    fn relative_to(self, base: &Path) -> Self {
        let fix = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        Self {
            model_path: fix(self.model_path),
            label_encoder_path: fix(self.label_encoder_path),
            description_path: fix(self.description_path),
            precaution_path: fix(self.precaution_path),
            severity_path: fix(self.severity_path),
            training_path: fix(self.training_path),
        }
    }
}
