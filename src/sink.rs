// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Line-oriented output for batch progress

use std::io::Write;
use tracing::warn;

use crate::batch::{BatchSummary, FileOutcome};

/// Receives one event per file, then a final summary
pub trait OutputSink {
    fn outcome(&mut self, outcome: &FileOutcome);
    fn finished(&mut self, summary: &BatchSummary);
}

/// Human-readable lines
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: std::io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            warn!("Failed to write output: {}", e);
        }
    }
}

impl<W: Write> OutputSink for ConsoleSink<W> {
    fn outcome(&mut self, outcome: &FileOutcome) {
        self.write_line(&outcome.to_string());
    }

    fn finished(&mut self, summary: &BatchSummary) {
        self.write_line("File move has finished");
        self.write_line(&summary.to_string());
    }
}

/// One JSON object per line
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl JsonLinesSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: std::io::stdout() }
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_value(&mut self, value: &serde_json::Value) {
        if let Err(e) = writeln!(self.out, "{}", value) {
            warn!("Failed to write output: {}", e);
        }
    }
}

impl<W: Write> OutputSink for JsonLinesSink<W> {
    fn outcome(&mut self, outcome: &FileOutcome) {
        match serde_json::to_value(outcome) {
            Ok(value) => self.write_value(&value),
            Err(e) => warn!("Failed to serialize outcome: {}", e),
        }
    }

    fn finished(&mut self, summary: &BatchSummary) {
        match serde_json::to_value(summary) {
            Ok(mut value) => {
                if let Some(obj) = value.as_object_mut() {
                    obj.insert("status".to_string(), "finished".into());
                }
                self.write_value(&value);
            }
            Err(e) => warn!("Failed to serialize summary: {}", e),
        }
    }
}

/// Keeps rendered lines in memory, e.g. to back a scrolling log panel
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Vec<String>,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether the batch has reported completion
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl OutputSink for MemorySink {
    fn outcome(&mut self, outcome: &FileOutcome) {
        self.lines.push(outcome.to_string());
    }

    fn finished(&mut self, summary: &BatchSummary) {
        self.lines.push(summary.to_string());
        self.finished = true;
    }
}

/// Discards everything
pub struct NullSink;

impl OutputSink for NullSink {
    fn outcome(&mut self, _outcome: &FileOutcome) {}
    fn finished(&mut self, _summary: &BatchSummary) {}
}
