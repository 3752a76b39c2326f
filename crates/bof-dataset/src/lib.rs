//! Dataset loading and preprocessing for the bird-or-forest pipeline.
//!
//! This crate discovers labeled images on disk (label = parent folder
//! name), produces the seeded train/validation split, and exposes the
//! samples to Burn as datasets and batches.

pub mod dataset;
pub mod loader;
pub mod preprocess;
pub mod split;

pub use dataset::{build_batches, FolderDataset, ImageBatch, ImageBatcher, ImageItem};
pub use loader::LabeledImageFolder;
pub use preprocess::SquishResize;
pub use split::RandomSplitter;
