// src/content.rs
//! Static text shown by the front ends next to predictions.

pub const HEALTH_TIPS: &[&str] = &[
    "Eat a balanced diet with fruits and vegetables.",
    "Drink plenty of water daily.",
    "Exercise regularly.",
    "Get enough sleep.",
    "Avoid smoking and alcohol.",
    "Go for regular health checkups.",
];

pub const ADVICE: &str = "Please consult a medical professional for proper diagnosis.";

pub const ABOUT: &str = "\
This predictor suggests a possible disease from the symptoms you select, \
using a model trained on symptom-disease data.

It also provides:
  - a description of the predicted disease
  - precautionary measures
  - general health tips";
