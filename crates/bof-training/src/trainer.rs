//! Fine-tuning loop.
//!
//! One synchronous loop over pre-built batches: forward, cross-entropy
//! loss, backward, Adam step. Per-epoch loss and accuracy are logged
//! and collected into a [`TrainingHistory`].

use crate::model::ImageClassifier;
use bof_core::{Error, Result};
use bof_dataset::ImageBatch;
use burn::{
    nn::loss::CrossEntropyLossConfig,
    optim::{decay::WeightDecayConfig, AdamConfig, GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Hyperparameters for one fine-tuning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineTuneConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub weight_decay: f64,
}

impl Default for FineTuneConfig {
    fn default() -> Self {
        Self {
            epochs: 4,
            learning_rate: 0.001,
            weight_decay: 1e-4,
        }
    }
}

/// Per-epoch training metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub train_loss: Vec<f64>,
    pub train_accuracy: Vec<f64>,
}

impl TrainingHistory {
    pub fn record_epoch(&mut self, loss: f64, accuracy: f64) {
        self.train_loss.push(loss);
        self.train_accuracy.push(accuracy);
    }

    pub fn final_loss(&self) -> Option<f64> {
        self.train_loss.last().copied()
    }
}

/// Fine-tunes `model` on `batches` for the configured number of epochs.
///
/// Returns the trained model and the per-epoch history.
pub fn fine_tune<B: AutodiffBackend>(
    mut model: ImageClassifier<B>,
    batches: &[ImageBatch<B>],
    config: &FineTuneConfig,
) -> Result<(ImageClassifier<B>, TrainingHistory)> {
    if batches.is_empty() {
        return Err(Error::Training("no training batches".to_string()));
    }

    let mut optimizer = AdamConfig::new()
        .with_weight_decay(Some(WeightDecayConfig::new(config.weight_decay as f32)))
        .init();

    let mut history = TrainingHistory::default();

    for epoch in 0..config.epochs {
        let mut total_loss = 0.0;
        let mut correct = 0usize;
        let mut total = 0usize;

        for batch in batches {
            let output = model.forward(batch.images.clone());

            let loss = CrossEntropyLossConfig::new()
                .init(&output.device())
                .forward(output.clone(), batch.targets.clone());

            let batch_size = batch.targets.dims()[0];
            let loss_value: f64 = loss.clone().into_scalar().elem();
            total_loss += loss_value * batch_size as f64;

            let predictions = output.argmax(1).squeeze::<1>(1);
            let batch_correct: i64 = predictions
                .equal(batch.targets.clone())
                .int()
                .sum()
                .into_scalar()
                .elem();
            correct += batch_correct as usize;
            total += batch_size;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(config.learning_rate, model, grads);
        }

        // Sample-weighted mean, so a short trailing batch does not skew it.
        let avg_loss = total_loss / total as f64;
        let accuracy = correct as f64 / total as f64;
        history.record_epoch(avg_loss, accuracy);

        info!(
            "Epoch {}/{}: train_loss={:.4}, train_acc={:.2}%",
            epoch + 1,
            config.epochs,
            avg_loss,
            accuracy * 100.0
        );
    }

    Ok((model, history))
}
