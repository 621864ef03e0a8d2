// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Category table and destination resolution

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::metadata::{FileRecord, Provenance};
use crate::{DirsortError, Result};

/// Destination for files downloaded from the school
pub const SCHOOL: &str = "School";

/// Destination for files no category claims
pub const OTHER: &str = "Other";

/// A named group of file extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub label: String,
    /// Lowercase, each with a leading dot
    pub extensions: Vec<String>,
}

impl Category {
    pub fn new(label: &str, extensions: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            extensions: extensions.iter().map(|e| normalize_extension(e)).collect(),
        }
    }

    /// Check if this category claims an extension
    pub fn handles(&self, extension: &str) -> bool {
        !extension.is_empty()
            && self
                .extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(extension))
    }
}

/// Why a destination was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    School,
    Extension,
    Fallback,
}

/// Destination category for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationDecision {
    pub category: String,
    pub reason: DecisionReason,
}

/// Ordered mapping from category label to extensions
///
/// Order matters: when two categories claim the same extension the
/// earlier one wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    /// Create a table, warning about extensions claimed more than once
    pub fn new(categories: Vec<Category>) -> Self {
        let mut seen: Vec<(&str, &str)> = Vec::new();
        for category in &categories {
            for ext in &category.extensions {
                if let Some((_, first)) = seen.iter().find(|(e, _)| *e == ext.as_str()) {
                    warn!(
                        "Extension {} claimed by both {} and {}; {} wins",
                        ext, first, category.label, first
                    );
                } else {
                    seen.push((ext.as_str(), category.label.as_str()));
                }
            }
        }
        Self { categories }
    }

    /// Keep only the named categories, in table order
    ///
    /// Labels match case-insensitively. Unknown labels are an error so a
    /// typo does not silently send everything to `Other`.
    pub fn select<S: AsRef<str>>(&self, labels: &[S]) -> Result<Self> {
        for label in labels {
            let label = label.as_ref();
            if !self.categories.iter().any(|c| c.label.eq_ignore_ascii_case(label)) {
                return Err(DirsortError::Config(format!(
                    "Unknown category '{}'. Available: {}",
                    label,
                    self.labels().join(", ")
                )));
            }
        }

        let categories = self
            .categories
            .iter()
            .filter(|c| labels.iter().any(|l| c.label.eq_ignore_ascii_case(l.as_ref())))
            .cloned()
            .collect();
        Ok(Self { categories })
    }

    /// Resolve the destination for a file record
    pub fn resolve(&self, record: &FileRecord) -> ClassificationDecision {
        self.resolve_parts(&record.extension, &record.provenance)
    }

    /// Resolve the destination from an extension and a provenance tag
    pub fn resolve_parts(&self, extension: &str, provenance: &Provenance) -> ClassificationDecision {
        if *provenance == Provenance::School {
            return ClassificationDecision {
                category: SCHOOL.to_string(),
                reason: DecisionReason::School,
            };
        }

        let extension = normalize_extension(extension);
        match self.categories.iter().find(|c| c.handles(&extension)) {
            Some(category) => ClassificationDecision {
                category: category.label.clone(),
                reason: DecisionReason::Extension,
            },
            None => ClassificationDecision {
                category: OTHER.to_string(),
                reason: DecisionReason::Fallback,
            },
        }
    }

    /// Get category labels in table order
    pub fn labels(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.label.as_str()).collect()
    }

    /// Get all categories
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(vec![
            Category::new("Image", &[".jpeg", ".png", ".gif", ".bmp", ".svg"]),
            Category::new("Audio", &[".mp3", ".wav", ".aac", ".flac"]),
            Category::new("Video", &[".mp4", ".avi", ".mov", ".wmv"]),
            Category::new("Document", &[".pdf", ".doc", ".ppt", ".docx", ".pptx"]),
            Category::new(OTHER, &[".zip", ".html", ".xml", ".rar"]),
        ])
    }
}

/// Lowercase an extension and make sure it has a leading dot
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.is_empty() {
        String::new()
    } else if ext.starts_with('.') {
        ext.to_lowercase()
    } else {
        format!(".{}", ext.to_lowercase())
    }
}
