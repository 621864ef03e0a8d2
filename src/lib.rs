// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! dirsort: sort a directory's files into category folders
//!
//! Each file is classified by its extension, unless its recorded download
//! source points at the configured school, and moved into a subfolder named
//! after its category.

pub mod batch;
pub mod categories;
pub mod config;
pub mod error;
pub mod metadata;
pub mod provenance;
pub mod relocate;
pub mod sink;

pub use batch::{BatchReport, FileOutcome, Organizer};
pub use categories::CategoryTable;
pub use config::AppConfig;
pub use error::{DirsortError, Result};
