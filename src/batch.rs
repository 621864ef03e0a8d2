// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Batch organization of one directory
//!
//! The directory is listed once up front. Each regular file then goes
//! through metadata, classification, folder creation and the move before
//! the next one starts. A failure on one file never stops the batch.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::categories::{CategoryTable, ClassificationDecision};
use crate::error::FailureKind;
use crate::metadata::{read_file_record, FileRecord};
use crate::provenance::ProvenanceLookup;
use crate::relocate::{ensure_directory, move_into};
use crate::sink::OutputSink;
use crate::{DirsortError, Result};

/// What happened to one file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Moved {
        from: PathBuf,
        to: PathBuf,
        category: String,
    },
    /// Dry run: where the file would go
    Planned {
        from: PathBuf,
        to: PathBuf,
        category: String,
    },
    Ignored {
        path: PathBuf,
    },
    Failed {
        path: PathBuf,
        kind: FailureKind,
        message: String,
    },
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moved { from, to, .. } => {
                write!(f, "File moved from {} to {}", from.display(), to.display())
            }
            Self::Planned { from, to, category } => {
                write!(f, "Would move {} to {} ({})", from.display(), to.display(), category)
            }
            Self::Ignored { path } => write!(f, "Ignored {}", path.display()),
            Self::Failed { path, message, .. } => {
                write!(f, "Failed {}: {}", path.display(), message)
            }
        }
    }
}

/// Counts for a finished batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub moved: usize,
    pub planned: usize,
    pub ignored: usize,
    pub failed: usize,
    /// Files per destination category, moved or planned
    pub by_category: BTreeMap<String, usize>,
}

impl BatchSummary {
    fn record(&mut self, outcome: &FileOutcome) {
        self.total += 1;
        match outcome {
            FileOutcome::Moved { category, .. } => {
                self.moved += 1;
                *self.by_category.entry(category.clone()).or_default() += 1;
            }
            FileOutcome::Planned { category, .. } => {
                self.planned += 1;
                *self.by_category.entry(category.clone()).or_default() += 1;
            }
            FileOutcome::Ignored { .. } => self.ignored += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} files: {} moved", self.total, self.moved)?;
        if self.planned > 0 {
            write!(f, ", {} planned", self.planned)?;
        }
        write!(f, ", {} ignored, {} failed", self.ignored, self.failed)
    }
}

/// Full record of one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub root: PathBuf,
    pub started_at: DateTime<Local>,
    pub dry_run: bool,
    pub outcomes: Vec<FileOutcome>,
    pub summary: BatchSummary,
}

/// Sorts a directory's files into category folders
pub struct Organizer {
    table: CategoryTable,
    school: String,
    provenance: Box<dyn ProvenanceLookup>,
    ignore: Vec<glob::Pattern>,
    dry_run: bool,
}

impl Organizer {
    /// Create an organizer for a category table and school identifier
    pub fn new(table: CategoryTable, school: &str, provenance: Box<dyn ProvenanceLookup>) -> Self {
        Self {
            table,
            school: school.to_string(),
            provenance,
            ignore: Vec::new(),
            dry_run: false,
        }
    }

    /// Skip files whose names match any of these patterns
    pub fn with_ignore(mut self, patterns: Vec<glob::Pattern>) -> Self {
        self.ignore = patterns;
        self
    }

    /// Report destinations without creating folders or moving files
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Read a file's metadata and decide its category
    pub fn classify(&self, path: &Path) -> Result<(FileRecord, ClassificationDecision)> {
        let record = read_file_record(path, &self.school, self.provenance.as_ref())?;
        let decision = self.table.resolve(&record);
        debug!(
            "{:?}: ext={:?} provenance={:?} -> {}",
            path, record.extension, record.provenance, decision.category
        );
        Ok((record, decision))
    }

    /// Classify one file and move it under `root`
    pub fn process_file(&self, root: &Path, path: &Path) -> Result<FileOutcome> {
        let (_record, decision) = self.classify(path)?;
        let destination = root.join(&decision.category);

        if self.dry_run {
            return Ok(FileOutcome::Planned {
                from: path.to_path_buf(),
                to: destination,
                category: decision.category,
            });
        }

        ensure_directory(&destination)?;
        let to = move_into(path, &destination)?;
        Ok(FileOutcome::Moved {
            from: path.to_path_buf(),
            to,
            category: decision.category,
        })
    }

    /// Organize every regular file directly inside `root`
    ///
    /// Only a missing or non-directory root is an error; per-file problems
    /// are reported as `Failed` outcomes.
    pub fn run(&self, root: &Path, sink: &mut dyn OutputSink) -> Result<BatchReport> {
        if !root.is_dir() {
            return Err(DirsortError::InvalidRootDirectory(root.to_path_buf()));
        }

        let started_at = Local::now();
        info!("Organizing {:?} into {:?}", root, self.table.labels());
        if self.dry_run {
            warn!("DRY RUN MODE - files will not be moved");
        }

        let files = list_files(root)?;
        let mut outcomes = Vec::with_capacity(files.len());
        let mut summary = BatchSummary::default();

        for path in files {
            let outcome = if self.is_ignored(&path) {
                debug!("Ignoring {:?}", path);
                FileOutcome::Ignored { path }
            } else {
                match self.process_file(root, &path) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!("{}", e);
                        FileOutcome::Failed {
                            kind: e.failure_kind(),
                            message: e.to_string(),
                            path,
                        }
                    }
                }
            };

            sink.outcome(&outcome);
            summary.record(&outcome);
            outcomes.push(outcome);
        }

        info!("Finished {:?}: {}", root, summary);
        sink.finished(&summary);

        Ok(BatchReport {
            root: root.to_path_buf(),
            started_at,
            dry_run: self.dry_run,
            outcomes,
            summary,
        })
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => return false,
        };
        self.ignore.iter().any(|p| p.matches(name))
    }
}

/// Snapshot the regular files directly inside `root`, sorted by name
///
/// Directories and symlinks are left out.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry in {:?}: {}", root, e);
                continue;
            }
        };
        match entry.file_type() {
            Ok(ft) if ft.is_file() => files.push(entry.path()),
            Ok(_) => debug!("Skipping non-file {:?}", entry.path()),
            Err(e) => warn!("Cannot stat {:?}: {}", entry.path(), e),
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{Category, OTHER, SCHOOL};
    use crate::provenance::{FixedProvenance, NoProvenance, XattrProvenance};
    use crate::sink::{MemorySink, NullSink};

    /// Deletes `victim` the first time any file's source is looked up
    struct RemovesOnLookup {
        victim: PathBuf,
    }

    impl ProvenanceLookup for RemovesOnLookup {
        fn name(&self) -> &'static str {
            "removes-on-lookup"
        }

        fn lookup(&self, _path: &Path) -> Option<String> {
            let _ = fs::remove_file(&self.victim);
            None
        }
    }

    fn small_table() -> CategoryTable {
        CategoryTable::new(vec![
            Category::new("Image", &[".png"]),
            Category::new("Document", &[".pdf"]),
        ])
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        path
    }

    #[test]
    fn test_sorts_into_folders() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "photo.png");
        touch(root, "report.pdf");
        touch(root, "archive.zip");
        touch(root, "notes");

        let lookup = FixedProvenance::new(&[("report.pdf", "https://university.edu/download")]);
        let organizer = Organizer::new(small_table(), "edu", Box::new(lookup));
        let mut sink = MemorySink::new();
        let report = organizer.run(root, &mut sink).unwrap();

        assert!(root.join("Image/photo.png").is_file());
        assert!(root.join(SCHOOL).join("report.pdf").is_file());
        assert!(root.join(OTHER).join("archive.zip").is_file());
        assert!(root.join(OTHER).join("notes").is_file());
        assert!(!root.join("Document").exists());

        assert_eq!(report.summary.total, 4);
        assert_eq!(report.summary.moved, 4);
        assert_eq!(report.summary.by_category.get(OTHER), Some(&2));
        assert!(sink.is_finished());
        assert_eq!(sink.lines().len(), 5);
    }

    #[test]
    fn test_move_failure_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "a.png");
        touch(root, "b.png");
        touch(root, "c.pdf");
        fs::create_dir(root.join("Image")).unwrap();
        fs::write(root.join("Image/b.png"), "already here").unwrap();

        let organizer = Organizer::new(small_table(), "", Box::new(NoProvenance));
        let report = organizer.run(root, &mut NullSink).unwrap();

        assert_eq!(report.summary.moved, 2);
        assert_eq!(report.summary.failed, 1);
        assert!(root.join("Image/a.png").is_file());
        assert!(root.join("Document/c.pdf").is_file());
        assert!(root.join("b.png").is_file());
        assert_eq!(fs::read_to_string(root.join("Image/b.png")).unwrap(), "already here");

        let failed: Vec<_> = report
            .outcomes
            .iter()
            .filter_map(|o| match o {
                FileOutcome::Failed { path, kind, .. } => Some((path.clone(), *kind)),
                _ => None,
            })
            .collect();
        assert_eq!(failed, vec![(root.join("b.png"), FailureKind::Move)]);
    }

    #[test]
    fn test_folder_creation_failure_is_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        // A plain file squatting on the Document folder name
        touch(root, "Document");
        touch(root, "report.pdf");
        touch(root, "photo.png");

        let ignore = vec![glob::Pattern::new("Document").unwrap()];
        let organizer = Organizer::new(small_table(), "", Box::new(NoProvenance)).with_ignore(ignore);
        let report = organizer.run(root, &mut NullSink).unwrap();

        assert_eq!(report.summary.ignored, 1);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.moved, 1);
        assert!(root.join("report.pdf").is_file());
        assert!(root.join("Image/photo.png").is_file());
        assert!(report.outcomes.iter().any(|o| matches!(
            o,
            FileOutcome::Failed { kind: FailureKind::DirectoryCreate, .. }
        )));
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "photo.png");
        touch(root, "song.mp3");

        let organizer = Organizer::new(CategoryTable::default(), "", Box::new(NoProvenance))
            .with_dry_run(true);
        let report = organizer.run(root, &mut NullSink).unwrap();

        assert_eq!(report.summary.planned, 2);
        assert_eq!(report.summary.moved, 0);
        assert!(root.join("photo.png").is_file());
        assert!(!root.join("Image").exists());
        assert!(!root.join("Audio").exists());
        match &report.outcomes[0] {
            FileOutcome::Planned { category, to, .. } => {
                assert_eq!(category, "Image");
                assert_eq!(to, &root.join("Image"));
            }
            other => panic!("Expected Planned, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let organizer = Organizer::new(small_table(), "", Box::new(NoProvenance));
        let mut sink = MemorySink::new();
        let err = organizer.run(&dir.path().join("nope"), &mut sink).unwrap_err();

        assert!(matches!(err, DirsortError::InvalidRootDirectory(_)));
        assert!(sink.lines().is_empty());
        assert!(!sink.is_finished());
    }

    #[test]
    fn test_subdirectories_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        touch(&root.join("sub"), "inner.png");
        touch(root, "outer.png");

        let organizer = Organizer::new(small_table(), "", Box::new(NoProvenance));
        let report = organizer.run(root, &mut NullSink).unwrap();

        assert_eq!(report.summary.total, 1);
        assert!(root.join("sub/inner.png").is_file());
        assert!(root.join("Image/outer.png").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let target = touch(root, "real.png");
        std::os::unix::fs::symlink(&target, root.join("link.png")).unwrap();

        let files = list_files(root).unwrap();
        assert_eq!(files, vec![target]);
    }

    #[test]
    fn test_second_run_finds_nothing_new() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "photo.png");

        let organizer = Organizer::new(small_table(), "", Box::new(NoProvenance));
        organizer.run(root, &mut NullSink).unwrap();
        let report = organizer.run(root, &mut NullSink).unwrap();

        assert_eq!(report.summary.total, 0);
        assert!(root.join("Image/photo.png").is_file());
    }

    #[test]
    fn test_vanished_file_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "a.png");
        let victim = touch(root, "b.png");
        touch(root, "c.pdf");

        // a.png is looked up first and takes b.png with it
        let lookup = RemovesOnLookup { victim: victim.clone() };
        let organizer = Organizer::new(small_table(), "", Box::new(lookup));
        let mut sink = MemorySink::new();
        let report = organizer.run(root, &mut sink).unwrap();

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.moved, 2);
        assert_eq!(report.summary.failed, 1);
        assert!(root.join("Image/a.png").is_file());
        assert!(root.join("Document/c.pdf").is_file());
        assert!(sink.is_finished());
        match &report.outcomes[1] {
            FileOutcome::Failed { path, kind, .. } => {
                assert_eq!(path, &victim);
                assert_eq!(*kind, FailureKind::Stat);
            }
            other => panic!("Expected Failed, got {:?}", other),
        }

        let err = organizer.process_file(root, &victim).unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::Stat);
    }

    #[test]
    fn test_recorded_source_routes_to_school() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let report_pdf = touch(root, "report.pdf");
        let other_pdf = touch(root, "invoice.pdf");
        touch(root, "photo.png");

        let mut school = Vec::new();
        plist::to_writer_binary(&mut school, &vec!["https://university.edu/download"]).unwrap();
        let mut shop = Vec::new();
        plist::to_writer_binary(&mut shop, &vec!["https://shop.example.com/invoice"]).unwrap();

        if let Err(e) = xattr::set(&report_pdf, "user.wherefroms", &school) {
            eprintln!("skipping: extended attributes unavailable here: {}", e);
            return;
        }
        xattr::set(&other_pdf, "user.wherefroms", &shop).unwrap();

        let lookup = XattrProvenance::new("user.wherefroms");
        let organizer = Organizer::new(small_table(), "edu", Box::new(lookup));
        let report = organizer.run(root, &mut NullSink).unwrap();

        assert_eq!(report.summary.moved, 3);
        assert!(root.join(SCHOOL).join("report.pdf").is_file());
        assert!(root.join("Document/invoice.pdf").is_file());
        assert!(root.join("Image/photo.png").is_file());
        assert_eq!(report.summary.by_category.get(SCHOOL), Some(&1));
    }
}
