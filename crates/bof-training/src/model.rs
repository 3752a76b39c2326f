//! Compact residual CNN for image classification.
//!
//! The exact architecture is a swappable collaborator of the pipeline;
//! this one is a ResNet-style network small enough to fine-tune on CPU.
//! Pretrained weights can be loaded from a Burn record file.

use bof_core::{Error, Result};
use burn::{
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig},
        BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig,
        PaddingConfig2d, Relu,
    },
    record::CompactRecorder,
    tensor::{backend::Backend, Tensor},
};
use std::path::Path;

/// One residual block: two 3x3 convolutions with an optional strided
/// 1x1 projection on the identity path.
#[derive(Module, Debug)]
pub struct ResidualBlock<B: Backend> {
    conv1: Conv2d<B>,
    bn1: BatchNorm<B, 2>,
    conv2: Conv2d<B>,
    bn2: BatchNorm<B, 2>,
    downsample: Option<Conv2d<B>>,
    downsample_bn: Option<BatchNorm<B, 2>>,
    activation: Relu,
}

impl<B: Backend> ResidualBlock<B> {
    fn new(in_channels: usize, out_channels: usize, stride: usize, device: &B::Device) -> Self {
        let conv1 = Conv2dConfig::new([in_channels, out_channels], [3, 3])
            .with_stride([stride, stride])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let bn1 = BatchNormConfig::new(out_channels).init(device);
        let conv2 = Conv2dConfig::new([out_channels, out_channels], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let bn2 = BatchNormConfig::new(out_channels).init(device);

        let (downsample, downsample_bn) = if stride != 1 || in_channels != out_channels {
            let projection = Conv2dConfig::new([in_channels, out_channels], [1, 1])
                .with_stride([stride, stride])
                .init(device);
            (
                Some(projection),
                Some(BatchNormConfig::new(out_channels).init(device)),
            )
        } else {
            (None, None)
        };

        Self {
            conv1,
            bn1,
            conv2,
            bn2,
            downsample,
            downsample_bn,
            activation: Relu::new(),
        }
    }

    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let identity = match (&self.downsample, &self.downsample_bn) {
            (Some(projection), Some(bn)) => bn.forward(projection.forward(input.clone())),
            _ => input.clone(),
        };

        let x = self.conv1.forward(input);
        let x = self.bn1.forward(x);
        let x = self.activation.forward(x);
        let x = self.conv2.forward(x);
        let x = self.bn2.forward(x);
        self.activation.forward(x.add(identity))
    }
}

/// Residual CNN classifier with a head sized to the class count.
#[derive(Module, Debug)]
pub struct ImageClassifier<B: Backend> {
    stem: Conv2d<B>,
    stem_bn: BatchNorm<B, 2>,
    block1: ResidualBlock<B>,
    block2: ResidualBlock<B>,
    block3: ResidualBlock<B>,
    pool: AdaptiveAvgPool2d,
    dropout: Dropout,
    fc: Linear<B>,
    activation: Relu,
    num_classes: usize,
}

impl<B: Backend> ImageClassifier<B> {
    /// Creates a classifier with randomly initialized weights.
    pub fn new(num_classes: usize, device: &B::Device) -> Self {
        let stem = Conv2dConfig::new([3, 32], [3, 3])
            .with_stride([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let stem_bn = BatchNormConfig::new(32).init(device);

        let block1 = ResidualBlock::new(32, 64, 2, device);
        let block2 = ResidualBlock::new(64, 128, 2, device);
        let block3 = ResidualBlock::new(128, 256, 2, device);

        let pool = AdaptiveAvgPool2dConfig::new([1, 1]).init();
        let dropout = DropoutConfig::new(0.2).init();
        let fc = LinearConfig::new(256, num_classes).init(device);

        Self {
            stem,
            stem_bn,
            block1,
            block2,
            block3,
            pool,
            dropout,
            fc,
            activation: Relu::new(),
            num_classes,
        }
    }

    /// Loads weights from a Burn record, keeping the current topology.
    pub fn load_weights(self, path: &Path, device: &B::Device) -> Result<Self> {
        self.load_file(path, &CompactRecorder::new(), device)
            .map_err(|e| {
                Error::Training(format!(
                    "Failed to load pretrained weights from {}: {e}",
                    path.display()
                ))
            })
    }

    /// Forward pass producing logits of shape `[batch, num_classes]`.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.stem.forward(input);
        let x = self.stem_bn.forward(x);
        let x = self.activation.forward(x);

        let x = self.block1.forward(x);
        let x = self.block2.forward(x);
        let x = self.block3.forward(x);

        let x = self.pool.forward(x);
        let [batch, channels, _, _] = x.dims();
        let x: Tensor<B, 2> = x.reshape([batch, channels]);

        let x = self.dropout.forward(x);
        self.fc.forward(x)
    }

    /// Forward pass with softmax probabilities.
    pub fn predict(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        burn::tensor::activation::softmax(self.forward(input), 1)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;

    #[test]
    fn test_forward_output_shape() {
        let device = NdArrayDevice::default();
        let model = ImageClassifier::<NdArray>::new(2, &device);

        let input = Tensor::<NdArray, 4>::from_floats(
            TensorData::new(vec![0.5f32; 2 * 3 * 32 * 32], [2, 3, 32, 32]),
            &device,
        );
        let logits = model.forward(input);
        assert_eq!(logits.dims(), [2, 2]);
    }

    #[test]
    fn test_predict_sums_to_one() {
        let device = NdArrayDevice::default();
        let model = ImageClassifier::<NdArray>::new(3, &device);

        let input = Tensor::<NdArray, 4>::from_floats(
            TensorData::new(vec![0.1f32; 3 * 32 * 32], [1, 3, 32, 32]),
            &device,
        );
        let probs = model.predict(input);
        let sum: f32 = probs.sum().into_scalar();
        assert!((sum - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_load_weights_missing_file() {
        let device = NdArrayDevice::default();
        let model = ImageClassifier::<NdArray>::new(2, &device);
        let result = model.load_weights(Path::new("/no/such/weights.mpk"), &device);
        assert!(result.is_err());
    }
}
