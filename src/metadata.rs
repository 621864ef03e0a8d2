// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Per-file metadata gathered before classification

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::provenance::ProvenanceLookup;
use crate::{DirsortError, Result};

/// Where a file was downloaded from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "source", rename_all = "snake_case")]
pub enum Provenance {
    /// Nothing recorded
    None,
    /// Downloaded from the configured school
    School,
    /// Downloaded from somewhere else
    Source(String),
}

impl Provenance {
    /// Tag a raw source string, recognising the school identifier
    ///
    /// The identifier is a plain substring test, so an empty identifier
    /// matches every recorded source.
    pub fn from_source(source: Option<String>, school: &str) -> Self {
        match source {
            None => Self::None,
            Some(s) if s.is_empty() => Self::None,
            Some(s) if s.contains(school) => Self::School,
            Some(s) => Self::Source(s),
        }
    }
}

/// Metadata for one file in the batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    pub created_at: DateTime<Local>,
    /// File name without its final extension
    pub base_name: String,
    /// Lowercase final extension with its leading dot, empty if none
    pub extension: String,
    pub provenance: Provenance,
}

/// Read size, timestamps, name parts and download source for a file
pub fn read_file_record(
    path: &Path,
    school: &str,
    lookup: &dyn ProvenanceLookup,
) -> Result<FileRecord> {
    let stat_err = |source| DirsortError::Stat {
        path: path.to_path_buf(),
        source,
    };

    let meta = std::fs::metadata(path).map_err(stat_err)?;
    // Birth time is missing on some filesystems
    let created = meta
        .created()
        .or_else(|_| meta.modified())
        .map_err(stat_err)?;

    let base_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(FileRecord {
        path: path.to_path_buf(),
        size: meta.len(),
        created_at: DateTime::<Local>::from(created),
        base_name,
        extension: file_extension(path),
        provenance: Provenance::from_source(lookup.lookup(path), school),
    })
}

/// Lowercase extension with a leading dot (`".pdf"`), or empty
pub fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}
