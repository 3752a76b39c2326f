//! Burn dataset and batcher integration.
//!
//! Items are loaded lazily from disk through [`SquishResize`] and
//! batched into `[batch, 3, size, size]` tensors with ImageNet channel
//! normalization applied on-device.

use crate::preprocess::SquishResize;
use bof_core::{Error, ImageSample, Result};
use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor, TensorData};

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// A single preprocessed image ready for batching.
#[derive(Debug, Clone)]
pub struct ImageItem {
    /// CHW float buffer of length `3 * size * size`, values in `[0, 1]`
    pub image: Vec<f32>,
    /// Class label
    pub label: usize,
}

/// Lazily loading dataset over labeled image samples.
#[derive(Debug, Clone)]
pub struct FolderDataset {
    samples: Vec<ImageSample>,
    resize: SquishResize,
}

impl FolderDataset {
    pub fn new(samples: Vec<ImageSample>, resize: SquishResize) -> Self {
        Self { samples, resize }
    }

    pub fn image_size(&self) -> usize {
        self.resize.target() as usize
    }

    /// Eagerly loads one item, propagating decode failures.
    pub fn load(&self, index: usize) -> Result<ImageItem> {
        let sample = self
            .samples
            .get(index)
            .ok_or_else(|| Error::InvalidArgument(format!("index {index} out of range")))?;
        let image = self.resize.load_chw(&sample.path)?;
        Ok(ImageItem {
            image,
            label: sample.label,
        })
    }
}

impl Dataset<ImageItem> for FolderDataset {
    fn get(&self, index: usize) -> Option<ImageItem> {
        self.load(index).ok()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// A batch of images for training or validation.
#[derive(Clone, Debug)]
pub struct ImageBatch<B: Backend> {
    /// Shape `[batch, 3, size, size]`
    pub images: Tensor<B, 4>,
    /// Shape `[batch]`
    pub targets: Tensor<B, 1, Int>,
}

/// Batcher assembling [`ImageItem`]s into normalized tensors.
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    device: B::Device,
    image_size: usize,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device, image_size: usize) -> Self {
        Self { device, image_size }
    }
}

impl<B: Backend> Batcher<ImageItem, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<ImageItem>) -> ImageBatch<B> {
        let batch_size = items.len();
        let size = self.image_size;

        let image_data: Vec<f32> = items.iter().flat_map(|item| item.image.clone()).collect();
        let images = Tensor::<B, 4>::from_floats(
            TensorData::new(image_data, [batch_size, 3, size, size]),
            &self.device,
        );

        let mean = Tensor::<B, 4>::from_floats(
            TensorData::new(IMAGENET_MEAN.to_vec(), [1, 3, 1, 1]),
            &self.device,
        );
        let std = Tensor::<B, 4>::from_floats(
            TensorData::new(IMAGENET_STD.to_vec(), [1, 3, 1, 1]),
            &self.device,
        );
        let images = images.sub(mean).div(std);

        let target_data: Vec<i64> = items.iter().map(|item| item.label as i64).collect();
        let targets = Tensor::<B, 1, Int>::from_ints(
            TensorData::new(target_data, [batch_size]),
            &self.device,
        );

        ImageBatch { images, targets }
    }
}

/// Loads the whole dataset and chunks it into batches of `batch_size`.
///
/// Decode failures are fatal here, unlike the lenient `Dataset::get`
/// used by streaming consumers.
pub fn build_batches<B: Backend>(
    dataset: &FolderDataset,
    batch_size: usize,
    device: &B::Device,
) -> Result<Vec<ImageBatch<B>>> {
    if batch_size == 0 {
        return Err(Error::InvalidArgument(
            "batch_size must be greater than 0".to_string(),
        ));
    }

    let batcher = ImageBatcher::<B>::new(device.clone(), dataset.image_size());
    let mut batches = Vec::new();
    let mut pending = Vec::with_capacity(batch_size);

    for index in 0..dataset.len() {
        pending.push(dataset.load(index)?);
        if pending.len() == batch_size {
            batches.push(batcher.batch(std::mem::take(&mut pending)));
            pending = Vec::with_capacity(batch_size);
        }
    }
    if !pending.is_empty() {
        batches.push(batcher.batch(pending));
    }

    Ok(batches)
}
