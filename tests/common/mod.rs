use predictor_core::core::model::{DecisionTree, LabelEncoder, ModelArtifact, RandomForest, TreeNode};
use predictor_core::persistence::{save_label_encoder, save_model};
use predictor_core::DataConfig;
use std::fs;
use tempfile::TempDir;

pub const CLASSES: [&str; 3] = ["Allergy", "Common Cold", "Fungal infection"];

/// A data directory with the standard layout. The forest predicts:
/// itching -> Fungal infection, else continuous_sneezing -> Allergy, else Common Cold.
/// "Common Cold" has no description and no precaution row.
pub fn data_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir_all(&data).unwrap();

    fs::write(
        data.join("Training.csv"),
        "itching,skin_rash,continuous_sneezing,fatigue,prognosis\n1,1,0,0,Fungal infection\n",
    )
    .unwrap();
    fs::write(
        data.join("symptom_Description.csv"),
        "Fungal infection,A fungal infection is...\nAllergy,\"An allergy is an immune system response, often to harmless substances.\"\n",
    )
    .unwrap();
    fs::write(
        data.join("symptom_precaution.csv"),
        "Fungal infection,bath twice,use dettol,keep dry,\nAllergy,apply calamine,cover area with bandage,,use ice to compress itching\n",
    )
    .unwrap();
    fs::write(data.join("Symptom_severity.csv"), "itching,1\nskin_rash,3\ncontinuous_sneezing,4\nfatigue,4\n").unwrap();

    let tree = DecisionTree::new(
        4,
        3,
        vec![
            TreeNode::Split { feature: 0, threshold: 0.5, left: 1, right: 4 },
            TreeNode::Split { feature: 2, threshold: 0.5, left: 2, right: 3 },
            TreeNode::Leaf { class: 1 },
            TreeNode::Leaf { class: 0 },
            TreeNode::Leaf { class: 2 },
        ],
    )
    .unwrap();
    let forest = RandomForest::new(vec![tree.clone(), tree, DecisionTree::constant(4, 3, 1).unwrap()]).unwrap();

    let config = DataConfig::from_dir(dir.path());
    save_model(&ModelArtifact::RandomForest(forest), &config.model_path).unwrap();
    save_label_encoder(&LabelEncoder::new(CLASSES).unwrap(), &config.label_encoder_path).unwrap();
    dir
}
