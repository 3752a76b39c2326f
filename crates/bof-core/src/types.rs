//! Core type definitions for the bird-or-forest pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// An image file together with its derived label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageSample {
    /// Path to the image file
    pub path: PathBuf,
    /// Class label index into the vocabulary
    pub label: usize,
    /// Class name (the parent directory name)
    pub class_name: String,
}

impl ImageSample {
    pub fn new(path: PathBuf, label: usize, class_name: impl Into<String>) -> Self {
        Self {
            path,
            label,
            class_name: class_name.into(),
        }
    }
}

/// Ordered set of class names with stable ids.
///
/// Ids are assigned by lexicographic order of the names, so the
/// vocabulary is deterministic for a given directory layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassVocabulary {
    names: Vec<String>,
}

impl ClassVocabulary {
    /// Builds a vocabulary from an arbitrary collection of class names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        Self {
            names: unique.into_iter().collect(),
        }
    }

    /// Looks up the id of a class name.
    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).ok()
    }

    /// The class name for an id.
    pub fn name_of(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// All class names, in id order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_is_sorted_and_deduplicated() {
        let vocab = ClassVocabulary::from_names(["forest", "bird", "forest"]);
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.names(), &["bird".to_string(), "forest".to_string()]);
        assert_eq!(vocab.id_of("bird"), Some(0));
        assert_eq!(vocab.id_of("forest"), Some(1));
        assert_eq!(vocab.id_of("ocean"), None);
        assert_eq!(vocab.name_of(1), Some("forest"));
    }

    #[test]
    fn test_image_sample() {
        let sample = ImageSample::new(PathBuf::from("bird/img.jpg"), 0, "bird");
        assert_eq!(sample.label, 0);
        assert_eq!(sample.class_name, "bird");
    }
}
