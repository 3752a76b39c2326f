//! Image discovery and label derivation.
//!
//! Mirrors the "label from parent folder" convention: each image file
//! found under the data root is labeled with the name of the directory
//! that directly contains it.

use bof_core::{ClassVocabulary, Error, ImageSample, Result};
use std::path::{Path, PathBuf};
use tracing::info;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif"];

/// A labeled view over an image directory.
#[derive(Debug, Clone)]
pub struct LabeledImageFolder {
    root: PathBuf,
    samples: Vec<ImageSample>,
    vocab: ClassVocabulary,
}

impl LabeledImageFolder {
    /// Recursively scans `root` for image files and derives labels.
    ///
    /// Files are enumerated in sorted path order, so the sample
    /// ordering is stable across runs on the same tree. A missing root
    /// or a tree with no images is a fatal error.
    pub fn scan(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.exists() {
            return Err(Error::NotFound(format!(
                "Data directory not found: {}",
                root.display()
            )));
        }
        if !root.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "Path is not a directory: {}",
                root.display()
            )));
        }

        let mut files = Vec::new();
        scan_recursive(&root, &mut files)?;
        files.sort();

        if files.is_empty() {
            return Err(Error::Dataset(format!(
                "No images found under {}",
                root.display()
            )));
        }

        let vocab = ClassVocabulary::from_names(files.iter().map(|path| parent_label(path)));

        let samples = files
            .into_iter()
            .map(|path| {
                let class_name = parent_label(&path);
                // Every parent name is in the vocabulary by construction.
                let label = vocab.id_of(&class_name).unwrap_or_default();
                ImageSample::new(path, label, class_name)
            })
            .collect::<Vec<_>>();

        info!(
            "Discovered {} images across {} classes under {}",
            samples.len(),
            vocab.len(),
            root.display()
        );

        Ok(Self {
            root,
            samples,
            vocab,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn samples(&self) -> &[ImageSample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<ImageSample> {
        self.samples
    }

    pub fn vocab(&self) -> &ClassVocabulary {
        &self.vocab
    }

    pub fn num_classes(&self) -> usize {
        self.vocab.len()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// The immediate parent directory name of a file.
fn parent_label(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn scan_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir).map_err(Error::Io)? {
        let entry = entry.map_err(Error::Io)?;
        let path = entry.path();

        if path.is_file() {
            if is_image_file(&path) {
                files.push(path);
            }
        } else if path.is_dir() {
            scan_recursive(&path, files)?;
        }
    }
    Ok(())
}
