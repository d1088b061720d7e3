// src/core/mod.rs
pub mod engine;
pub mod model;
pub mod reference;
pub mod types;
pub mod vocabulary;
