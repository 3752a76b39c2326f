//! Training infrastructure for the bird-or-forest pipeline.
//!
//! This crate provides:
//! - A compact residual CNN classifier
//! - The fine-tuning loop (Adam + cross-entropy)
//! - Validation producing loss, error rate and the confusion matrix

pub mod evaluator;
pub mod model;
pub mod trainer;

pub use evaluator::{evaluate, EvaluationOutcome};
pub use model::ImageClassifier;
pub use trainer::{fine_tune, FineTuneConfig, TrainingHistory};
