//! Run results: generated samples plus the tasks that failed.

use serde::{Deserialize, Serialize};

use super::config::RunMode;

/// One generated record, written as a JSON line for grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Task id of the originating problem.
    pub task_id: String,
    /// Generated tests, present in test-first mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<String>,
    /// Generated solution code.
    pub completion: String,
}

impl Sample {
    /// A sample without tests.
    pub fn direct(task_id: impl Into<String>, completion: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            tests: None,
            completion: completion.into(),
        }
    }

    /// A sample carrying the tests it was generated against.
    pub fn with_tests(
        task_id: impl Into<String>,
        tests: impl Into<String>,
        completion: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            tests: Some(tests.into()),
            completion: completion.into(),
        }
    }
}

/// Outcome of a pipeline run.
///
/// Every attempted task id ends up in exactly one of `samples` and
/// `failed_task_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Mode the run used.
    pub mode: RunMode,
    /// Samples in problem order.
    pub samples: Vec<Sample>,
    /// Tasks abandoned after exhausting retries, in problem order.
    pub failed_task_ids: Vec<String>,
}

/// Counts for the end-of-run log line and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub mode: RunMode,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            samples: Vec::new(),
            failed_task_ids: Vec::new(),
        }
    }

    pub(crate) fn push_sample(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub(crate) fn push_failure(&mut self, task_id: String) {
        if !self.failed_task_ids.contains(&task_id) {
            self.failed_task_ids.push(task_id);
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_task_ids.is_empty()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            mode: self.mode,
            attempted: self.samples.len() + self.failed_task_ids.len(),
            succeeded: self.samples.len(),
            failed: self.failed_task_ids.len(),
        }
    }
}
