//! JSON-lines export of generated samples.
//!
//! Writes one record per sample, the format the HumanEval grader reads:
//! `{"task_id": ..., "tests": ..., "completion": ...}` with `tests` only
//! present for test-first runs.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::SinkError;
use crate::pipeline::{RunReport, Sample};

/// Where a sink put the records and how many it wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkOutcome {
    /// Human-readable destination, e.g. a file path.
    pub location: String,
    /// Number of records written.
    pub records: usize,
}

/// Receives the finished report of a run.
pub trait ResultSink {
    /// Persist the report's samples.
    fn accept(&mut self, report: &RunReport) -> Result<SinkOutcome, SinkError>;
}

/// Sink writing samples to a JSONL file.
///
/// An existing file at the path is replaced.
#[derive(Debug, Clone)]
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `samples` to the file, one JSON object per line.
    pub fn write_samples(&self, samples: &[Sample]) -> Result<usize, SinkError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);

        for sample in samples {
            let json_line = serde_json::to_string(sample)?;
            writeln!(writer, "{}", json_line)?;
        }

        writer.flush()?;
        Ok(samples.len())
    }
}

impl ResultSink for JsonlSink {
    fn accept(&mut self, report: &RunReport) -> Result<SinkOutcome, SinkError> {
        let records = self.write_samples(&report.samples)?;
        Ok(SinkOutcome {
            location: self.path.display().to_string(),
            records,
        })
    }
}

/// Read samples back from a JSONL file.
pub fn read_samples(path: &Path) -> Result<Vec<Sample>, SinkError> {
    let content = fs::read_to_string(path)?;
    let mut samples = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        samples.push(serde_json::from_str(line)?);
    }
    Ok(samples)
}
