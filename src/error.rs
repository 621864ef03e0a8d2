// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for dirsort

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dirsort operations
pub type Result<T> = std::result::Result<T, DirsortError>;

/// dirsort error types
#[derive(Error, Debug)]
pub enum DirsortError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid ignore pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Directory path doesn't exist: {0:?}")]
    InvalidRootDirectory(PathBuf),

    #[error("Cannot read metadata of {path:?}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create folder at {path:?}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot move {from:?} to {to:?}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-file failure categories recorded in a batch report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Stat,
    DirectoryCreate,
    Move,
    Other,
}

impl DirsortError {
    /// Which per-file failure this error represents
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Stat { .. } => FailureKind::Stat,
            Self::CreateDirectory { .. } => FailureKind::DirectoryCreate,
            Self::Move { .. } => FailureKind::Move,
            _ => FailureKind::Other,
        }
    }
}
