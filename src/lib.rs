// src/lib.rs

pub mod c_api;
pub mod config;
pub mod content;
pub mod core;
pub mod error;
pub mod persistence;

pub use crate::config::DataConfig;
pub use crate::core::engine::{InferenceEngine, PredictionContext};
pub use crate::core::types::PredictionResult;
pub use crate::error::{EngineError, LoadError, ModelError};
