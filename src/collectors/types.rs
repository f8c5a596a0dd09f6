//! Problem types shared by the loader and the pipeline.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ProblemSetError;

/// A benchmark problem: a function signature plus docstring to complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Unique identifier, e.g. `HumanEval/0`.
    pub task_id: String,
    /// Prompt shown to the model.
    pub prompt: String,
}

impl Problem {
    pub fn new(task_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            prompt: prompt.into(),
        }
    }
}

/// Ordered collection of problems with unique task ids.
///
/// Iteration order is the order the problems were supplied in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemSet {
    problems: Vec<Problem>,
}

impl ProblemSet {
    /// Create a problem set, rejecting duplicate task ids.
    pub fn new(problems: Vec<Problem>) -> Result<Self, ProblemSetError> {
        let mut seen = HashSet::with_capacity(problems.len());
        for problem in &problems {
            if !seen.insert(problem.task_id.as_str()) {
                return Err(ProblemSetError::DuplicateTask(problem.task_id.clone()));
            }
        }
        Ok(Self { problems })
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Problem> {
        self.problems.iter()
    }

    /// Look up a problem by task id.
    pub fn get(&self, task_id: &str) -> Option<&Problem> {
        self.problems.iter().find(|p| p.task_id == task_id)
    }

    /// Keep only the listed task ids, preserving the original order.
    ///
    /// # Errors
    ///
    /// Returns `ProblemSetError::TaskNotFound` for the first id not in the set.
    pub fn retain_ids(&mut self, task_ids: &[String]) -> Result<(), ProblemSetError> {
        if let Some(missing) = task_ids.iter().find(|id| self.get(id).is_none()) {
            return Err(ProblemSetError::TaskNotFound(missing.clone()));
        }
        let wanted: HashSet<&str> = task_ids.iter().map(String::as_str).collect();
        self.problems
            .retain(|p| wanted.contains(p.task_id.as_str()));
        Ok(())
    }

    /// Keep only the first `limit` problems.
    pub fn truncate(&mut self, limit: usize) {
        self.problems.truncate(limit);
    }
}

impl<'a> IntoIterator for &'a ProblemSet {
    type Item = &'a Problem;
    type IntoIter = std::slice::Iter<'a, Problem>;

    fn into_iter(self) -> Self::IntoIter {
        self.problems.iter()
    }
}
