// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for dirsort

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::categories::CategoryTable;
use crate::provenance::{NoProvenance, ProvenanceLookup, XattrProvenance};

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Directory to organize (prompted for when empty)
    #[serde(default)]
    pub directory: Option<String>,

    /// Substring identifying downloads from the school's site
    #[serde(default)]
    pub school: Option<String>,

    /// Category labels to sort into; empty means every category
    #[serde(default)]
    pub categories: Vec<String>,

    /// Glob patterns for file names to leave alone
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Download-source lookup settings
    #[serde(default)]
    pub provenance: ProvenanceConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvenanceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_attribute")]
    pub attribute: String,
}

fn default_true() -> bool { true }
fn default_attribute() -> String { crate::provenance::WHERE_FROMS_ATTRIBUTE.to_string() }

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            attribute: default_attribute(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::DirsortError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build the category table, restricted to the configured labels
    pub fn category_table(&self) -> crate::Result<CategoryTable> {
        let table = CategoryTable::default();
        if self.categories.is_empty() {
            Ok(table)
        } else {
            table.select(&self.categories)
        }
    }

    /// Compile the ignore patterns
    pub fn ignore_patterns(&self) -> crate::Result<Vec<glob::Pattern>> {
        self.ignore
            .iter()
            .map(|p| glob::Pattern::new(p).map_err(Into::into))
            .collect()
    }

    /// Pick the download-source lookup for this platform and settings
    pub fn provenance_lookup(&self) -> Box<dyn ProvenanceLookup> {
        if self.provenance.enabled && xattr::SUPPORTED_PLATFORM {
            Box::new(XattrProvenance::new(&self.provenance.attribute))
        } else {
            Box::new(NoProvenance)
        }
    }
}
