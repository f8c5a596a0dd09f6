//! humaneval-forge: HumanEval sample generator for LLM evaluation.
//!
//! This library loads HumanEval problems, asks a chat model for solutions
//! (directly, or after first asking it for pytest cases) and exports the
//! results as JSONL for grading.

// Core modules
pub mod cli;
pub mod collectors;
pub mod error;
pub mod export;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod utils;

// Re-export commonly used error types
pub use error::{CompletionError, CompletionErrorKind, ProblemSetError, SinkError};
