//! Validation pass producing scalar metrics and the confusion matrix.

use crate::model::ImageClassifier;
use bof_core::{ConfusionMatrix, Error, Result, ValidationMetrics};
use bof_dataset::ImageBatch;
use burn::{
    nn::loss::CrossEntropyLossConfig,
    tensor::{backend::Backend, ElementConversion},
};
use tracing::info;

/// Result of one validation pass.
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub metrics: ValidationMetrics,
    pub confusion: ConfusionMatrix,
}

/// Evaluates `model` over `batches`.
///
/// The loss is the sample-mean cross entropy; the error rate is the
/// misclassified fraction across all samples.
pub fn evaluate<B: Backend>(
    model: &ImageClassifier<B>,
    batches: &[ImageBatch<B>],
    num_classes: usize,
) -> Result<EvaluationOutcome> {
    if batches.is_empty() {
        return Err(Error::Training("no validation batches".to_string()));
    }

    let mut total_loss = 0.0;
    let mut predictions = Vec::new();
    let mut ground_truth = Vec::new();

    for batch in batches {
        let logits = model.forward(batch.images.clone());

        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), batch.targets.clone());
        let batch_size = batch.targets.dims()[0];
        let loss_value: f64 = loss.into_scalar().elem();
        // Weight by batch size so a short trailing batch does not skew
        // the sample mean.
        total_loss += loss_value * batch_size as f64;

        let batch_predictions = logits.argmax(1).squeeze::<1>(1);
        predictions.extend(
            batch_predictions
                .into_data()
                .iter::<i64>()
                .map(|v| v as usize),
        );
        ground_truth.extend(
            batch
                .targets
                .clone()
                .into_data()
                .iter::<i64>()
                .map(|v| v as usize),
        );
    }

    let confusion = ConfusionMatrix::from_predictions(&predictions, &ground_truth, num_classes)?;
    let total_samples = confusion.num_samples();
    let metrics = ValidationMetrics::new(total_loss / total_samples as f64, confusion.error_rate());

    info!(
        "Validation: {} samples, loss={:.4}, error_rate={:.4}",
        confusion.num_samples(),
        metrics.loss,
        metrics.error_rate
    );

    Ok(EvaluationOutcome { metrics, confusion })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::NdArray;
    use burn::tensor::{Int, Tensor, TensorData};

    fn tiny_batch(device: &NdArrayDevice) -> ImageBatch<NdArray> {
        batch_from(device, &[(0.3, 0), (0.3, 1), (0.3, 0), (0.3, 1)])
    }

    fn batch_from(device: &NdArrayDevice, samples: &[(f32, i64)]) -> ImageBatch<NdArray> {
        let n = samples.len();
        let mut pixels = Vec::with_capacity(n * 3 * 16 * 16);
        for &(fill, _) in samples {
            pixels.extend(std::iter::repeat(fill).take(3 * 16 * 16));
        }
        let images = Tensor::<NdArray, 4>::from_floats(
            TensorData::new(pixels, [n, 3, 16, 16]),
            device,
        );
        let labels: Vec<i64> = samples.iter().map(|&(_, label)| label).collect();
        let targets =
            Tensor::<NdArray, 1, Int>::from_ints(TensorData::new(labels, [n]), device);
        ImageBatch { images, targets }
    }

    #[test]
    fn test_evaluate_outcome_is_consistent() {
        let device = NdArrayDevice::default();
        let model = ImageClassifier::<NdArray>::new(2, &device);
        let batches = vec![tiny_batch(&device)];

        let outcome = evaluate(&model, &batches, 2).unwrap();

        assert_eq!(outcome.confusion.dim(), 2);
        assert_eq!(outcome.confusion.num_samples(), 4);
        assert!(outcome.metrics.loss.is_finite());
        assert!((outcome.metrics.error_rate - outcome.confusion.error_rate()).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&outcome.metrics.error_rate));
    }

    #[test]
    fn test_loss_is_invariant_to_batching() {
        let device = NdArrayDevice::default();
        let model = ImageClassifier::<NdArray>::new(2, &device);
        let samples = [(0.1, 0), (0.4, 1), (0.7, 0), (0.9, 1), (0.2, 1)];

        // One batch of 5 versus uneven batches of 3 and 2; the
        // sample-mean loss must agree.
        let whole = evaluate(&model, &[batch_from(&device, &samples)], 2).unwrap();
        let uneven = evaluate(
            &model,
            &[
                batch_from(&device, &samples[..3]),
                batch_from(&device, &samples[3..]),
            ],
            2,
        )
        .unwrap();

        assert!((whole.metrics.loss - uneven.metrics.loss).abs() < 1e-4);
        assert_eq!(whole.confusion, uneven.confusion);
    }

    #[test]
    fn test_evaluate_rejects_empty_batches() {
        let device = NdArrayDevice::default();
        let model = ImageClassifier::<NdArray>::new(2, &device);
        let result = evaluate(&model, &[], 2);
        assert!(result.is_err());
    }
}
