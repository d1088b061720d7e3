// File: src/persistence.rs
use crate::config::DataConfig;
use crate::core::engine::PredictionContext;
use crate::core::model::{LabelEncoder, ModelArtifact};
use crate::core::reference::ReferenceTables;
use crate::core::vocabulary::FeatureVocabulary;
use crate::error::LoadError;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Error, ErrorKind};
use std::path::Path;
use tempfile::NamedTempFile;

const PRECAUTION_COLUMNS: usize = 4;

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })
}

fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

/// Reads every row of a header-less delimited file, trimming fields.
fn read_rows(path: &Path) -> Result<Vec<(u64, StringRecord)>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(BufReader::new(open(path)?));
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| LoadError::Csv { path: path.to_path_buf(), source })?;
        let line = record.position().map_or(0, |p| p.line());
        rows.push((line, record));
    }
    Ok(rows)
}

fn malformed(path: &Path, line: u64, message: impl Into<String>) -> LoadError {
    LoadError::MalformedRow { path: path.to_path_buf(), line, message: message.into() }
}

/// Builds the vocabulary from the training file's header: every column but the last.
pub fn load_vocabulary(path: &Path) -> Result<FeatureVocabulary, LoadError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(BufReader::new(open(path)?));
    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv { path: path.to_path_buf(), source })?;
    if headers.len() < 2 {
        return Err(LoadError::EmptySchema { path: path.to_path_buf() });
    }
    FeatureVocabulary::new(headers.iter().take(headers.len() - 1))
}

fn load_descriptions(tables: &mut ReferenceTables, path: &Path) -> Result<(), LoadError> {
    for (line, row) in read_rows(path)? {
        if row.len() != 2 {
            return Err(malformed(path, line, format!("expected 2 fields, found {}", row.len())));
        }
        tables.insert_description(&row[0], &row[1]);
    }
    Ok(())
}

fn load_precautions(tables: &mut ReferenceTables, path: &Path) -> Result<(), LoadError> {
    for (line, row) in read_rows(path)? {
        if row.is_empty() || row.len() > PRECAUTION_COLUMNS + 1 {
            return Err(malformed(
                path,
                line,
                format!("expected 1 to {} fields, found {}", PRECAUTION_COLUMNS + 1, row.len()),
            ));
        }
        tables.insert_precautions(&row[0], row.iter().skip(1));
    }
    Ok(())
}

fn load_severity(tables: &mut ReferenceTables, path: &Path) -> Result<(), LoadError> {
    for (line, row) in read_rows(path)? {
        if row.len() != 2 {
            return Err(malformed(path, line, format!("expected 2 fields, found {}", row.len())));
        }
        // Prediction never reads weights, so a header row or a bad weight only loses that row.
        match row[1].parse::<i64>() {
            Ok(weight) => {
                tables.insert_severity(&row[0], weight);
            }
            Err(e) => warn!("{}, line {}: skipping weight '{}': {}", path.display(), line, &row[1], e),
        }
    }
    Ok(())
}

pub fn load_reference_tables(
    description_path: &Path,
    precaution_path: &Path,
    severity_path: &Path,
) -> Result<ReferenceTables, LoadError> {
    let mut tables = ReferenceTables::new();
    load_descriptions(&mut tables, description_path)?;
    load_precautions(&mut tables, precaution_path)?;
    load_severity(&mut tables, severity_path)?;
    info!(
        "reference tables loaded: {} descriptions, {} precaution rows, {} severity weights",
        tables.description_count(),
        tables.precaution_count(),
        tables.severity_count()
    );
    Ok(tables)
}

fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let reader = BufReader::new(open(path)?);
    if is_json(path) {
        serde_json::from_reader(reader).map_err(|source| LoadError::Json { path: path.to_path_buf(), source })
    } else {
        bincode::deserialize_from(reader).map_err(|source| LoadError::Bincode { path: path.to_path_buf(), source })
    }
}

/// Loads and validates a model artifact (bincode, or JSON for `.json` files).
pub fn load_model(path: &Path) -> Result<ModelArtifact, LoadError> {
    let model: ModelArtifact = load_artifact(path)?;
    model.validate()?;
    Ok(model)
}

pub fn load_label_encoder(path: &Path) -> Result<LabelEncoder, LoadError> {
    let encoder: LabelEncoder = load_artifact(path)?;
    encoder.validate()?;
    Ok(encoder)
}

fn save_artifact<T: Serialize>(value: &T, path: &Path) -> Result<(), Error> {
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let writer = BufWriter::new(&temp_file);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, value).map_err(|e| Error::new(ErrorKind::Other, e))?;
        } else {
            bincode::serialize_into(writer, value).map_err(|e| Error::new(ErrorKind::Other, e))?;
        }
    }
    temp_file.persist(path)?;
    Ok(())
}

/// Writes a model artifact atomically; format follows the file extension.
pub fn save_model(model: &ModelArtifact, path: &Path) -> Result<(), Error> {
    save_artifact(model, path)
}

pub fn save_label_encoder(encoder: &LabelEncoder, path: &Path) -> Result<(), Error> {
    save_artifact(encoder, path)
}

/// Loads everything named by `config` and checks it fits together.
pub fn load_context(config: &DataConfig) -> Result<PredictionContext, LoadError> {
    let vocabulary = load_vocabulary(&config.training_path)?;
    let tables = load_reference_tables(
        &config.description_path,
        &config.precaution_path,
        &config.severity_path,
    )?;
    let model = load_model(&config.model_path)?;
    let encoder = load_label_encoder(&config.label_encoder_path)?;
    Ok(PredictionContext::new(vocabulary, tables, Box::new(model), Box::new(encoder))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::DecisionTree;
    use pretty_assertions::assert_eq;

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn vocabulary_skips_target_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "Training.csv", "itching,skin_rash,fatigue,prognosis\n1,0,1,Fungal infection\n");
        let vocab = load_vocabulary(&path).unwrap();
        assert_eq!(vocab.symptoms(), &["itching", "skin_rash", "fatigue"]);
    }

    #[test]
    fn vocabulary_needs_a_symptom_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "Training.csv", "prognosis\nFlu\n");
        assert!(matches!(load_vocabulary(&path), Err(LoadError::EmptySchema { .. })));
    }

    #[test]
    fn short_precaution_rows_are_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let desc = write(dir.path(), "desc.csv", "Acne,\"Skin, mostly.\"\n");
        let prec = write(dir.path(), "prec.csv", "Acne,bath twice,,avoid fatty spicy food\nFlu,rest\n");
        let sev = write(dir.path(), "sev.csv", "itching,1\nfatigue, 4\n");

        let tables = load_reference_tables(&desc, &prec, &sev).unwrap();
        assert_eq!(tables.describe("Acne"), "Skin, mostly.");
        assert_eq!(tables.precautions("Acne"), vec!["bath twice", "avoid fatty spicy food"]);
        assert_eq!(tables.precautions("Flu"), vec!["rest"]);
        assert_eq!(tables.severity("fatigue"), Some(4));
    }

    #[test]
    fn too_many_precaution_columns_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let desc = write(dir.path(), "desc.csv", "");
        let prec = write(dir.path(), "prec.csv", "Flu,a,b,c,d,e\n");
        let sev = write(dir.path(), "sev.csv", "");
        let err = load_reference_tables(&desc, &prec, &sev).unwrap_err();
        assert!(matches!(err, LoadError::MalformedRow { line: 1, .. }));
    }

    #[test]
    fn severity_header_row_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let desc = write(dir.path(), "desc.csv", "");
        let prec = write(dir.path(), "prec.csv", "");
        let sev = write(dir.path(), "sev.csv", "Symptom,weight\nitching,1\nfatigue,high\nchills,3\n");
        let tables = load_reference_tables(&desc, &prec, &sev).unwrap();
        assert_eq!(tables.severity_count(), 2);
        assert_eq!(tables.severity("itching"), Some(1));
        assert_eq!(tables.severity("chills"), Some(3));
        assert_eq!(tables.severity("Symptom"), None);
        assert_eq!(tables.severity("fatigue"), None);
    }

    #[test]
    fn severity_row_with_wrong_arity_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let desc = write(dir.path(), "desc.csv", "");
        let prec = write(dir.path(), "prec.csv", "");
        let sev = write(dir.path(), "sev.csv", "itching,1\nfatigue,4,extra\n");
        let err = load_reference_tables(&desc, &prec, &sev).unwrap_err();
        assert!(matches!(err, LoadError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_vocabulary(Path::new("/no/such/Training.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn artifacts_survive_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let model = ModelArtifact::DecisionTree(DecisionTree::constant(3, 2, 1).unwrap());
        for name in ["model.bin", "nested/model.json"] {
            let path = dir.path().join(name);
            save_model(&model, &path).unwrap();
            assert_eq!(load_model(&path).unwrap(), model);
        }
    }

    #[test]
    fn invalid_json_artifact_is_rejected_after_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "labels.json", r#"{"classes": ["Flu", "Flu"]}"#);
        assert!(matches!(load_label_encoder(&path), Err(LoadError::Model(_))));
    }
}
