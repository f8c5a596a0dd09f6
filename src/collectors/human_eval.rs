//! HumanEval problem set loader.
//!
//! Reads the benchmark's JSON-lines problem file, either plain or
//! gzip-compressed (`HumanEval.jsonl.gz`). Each line must carry `task_id`
//! and `prompt`; the remaining fields (`entry_point`, `canonical_solution`,
//! `test`) are for grading and ignored here.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use super::types::{Problem, ProblemSet};
use crate::error::ProblemSetError;

/// Default location of the HumanEval problem file.
pub const DEFAULT_PROBLEM_FILE: &str = "data/HumanEval.jsonl.gz";

/// Loader for HumanEval-style problem files.
#[derive(Debug, Clone)]
pub struct HumanEvalLoader {
    path: PathBuf,
}

impl HumanEvalLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every problem in file order.
    ///
    /// # Errors
    ///
    /// Returns `ProblemSetError` if the file cannot be read, a line is not a
    /// valid problem record, or a task id repeats.
    pub fn load(&self) -> Result<ProblemSet, ProblemSetError> {
        let file = File::open(&self.path)?;
        let reader: Box<dyn Read> = if is_gzip(&self.path) {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        let problems = parse_problems(BufReader::new(reader))?;
        tracing::info!(
            path = %self.path.display(),
            count = problems.len(),
            "Loaded problem set"
        );
        Ok(problems)
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("gz")
}

/// Parse JSON-lines problem records, skipping blank lines.
pub fn parse_problems<R: BufRead>(reader: R) -> Result<ProblemSet, ProblemSetError> {
    let mut problems = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let problem: Problem = serde_json::from_str(&line)
            .map_err(|source| ProblemSetError::InvalidRecord {
                line: idx + 1,
                source,
            })?;
        problems.push(problem);
    }
    ProblemSet::new(problems)
}
