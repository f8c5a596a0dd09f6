//! Benchmark problem sources for humaneval-forge.
//!
//! - HumanEval: JSON-lines problem files, optionally gzip-compressed

pub mod human_eval;
pub mod types;

pub use human_eval::{parse_problems, HumanEvalLoader, DEFAULT_PROBLEM_FILE};
pub use types::{Problem, ProblemSet};
