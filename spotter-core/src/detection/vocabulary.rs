// ============================================================================
// spotter-core/src/detection/vocabulary.rs
// ============================================================================
//
// CLASS VOCABULARY: Class-Id to Label Resolution
//
// Detector backends trained on a fixed label set (COCO and friends) report
// numeric class ids. This module loads the newline-separated class names
// file shipped with such models and resolves ids to labels. It is also used
// at startup to reject a target label the model cannot produce.
//
// AI-ASSISTANT-INFO: Class names file loading and label lookup

// ---- Standard library imports ----
use std::fs;
use std::path::Path;

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

/// Ordered list of class labels known to a detector model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassVocabulary {
    labels: Vec<String>,
}

impl ClassVocabulary {
    /// Builds a vocabulary from labels, skipping blank entries.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels = labels
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Self { labels }
    }

    /// Loads a class names file (one label per line).
    ///
    /// A missing or empty file is a configuration error since the target
    /// label cannot be validated without it.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!(
                "Failed to read class names file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let vocabulary = Self::from_labels(content.lines());
        if vocabulary.is_empty() {
            return Err(CoreError::Config(format!(
                "Class names file '{}' contains no labels",
                path.display()
            )));
        }
        log::debug!(
            "Loaded {} class labels from {}",
            vocabulary.len(),
            path.display()
        );
        Ok(vocabulary)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Resolves a 1-based class id, the numbering SSD/COCO models emit.
    pub fn label_for(&self, class_id: usize) -> Option<&str> {
        class_id
            .checked_sub(1)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
