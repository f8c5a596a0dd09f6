//! Export module for generated samples.
//!
//! Provides the result sink interface and the JSONL writer used for grading.

pub mod jsonl;

pub use jsonl::{read_samples, JsonlSink, ResultSink, SinkOutcome};
