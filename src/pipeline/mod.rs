//! Pipeline orchestration for sample generation.
//!
//! # Architecture
//!
//! - **Orchestrator**: walks the problem set and produces a [`RunReport`]
//! - **Config**: run mode plus sampling and retry settings
//! - **Report**: samples and failed task ids
//!
//! # Run modes
//!
//! - [`RunMode::Direct`]: one prompt per problem, no retry. A failed call
//!   yields an empty completion rather than a failed task.
//! - [`RunMode::TestFirst`]: ask for pytest cases, then for a solution that
//!   passes them. Both calls retry transient failures; a task whose calls
//!   exhaust their attempts is skipped and listed in `failed_task_ids`.
//!
//! # Example
//!
//! ```rust,ignore
//! use humaneval_forge::collectors::HumanEvalLoader;
//! use humaneval_forge::export::JsonlSink;
//! use humaneval_forge::llm::{ClientConfig, CompletionClient};
//! use humaneval_forge::pipeline::{PipelineConfig, PipelineOrchestrator, RunMode};
//! use std::sync::Arc;
//!
//! let client = Arc::new(CompletionClient::new(ClientConfig::from_env()?)?);
//! let orchestrator = PipelineOrchestrator::new(client, PipelineConfig::new(RunMode::TestFirst))?;
//!
//! let problems = HumanEvalLoader::new("data/HumanEval.jsonl.gz").load()?;
//! let mut sink = JsonlSink::new("samples_auto.jsonl");
//! let (report, _) = orchestrator.run_to_sink(&problems, &mut sink).await?;
//!
//! println!("failed: {:?}", report.failed_task_ids);
//! ```

pub mod config;
pub mod orchestrator;
pub mod report;

pub use config::{ConfigError, PipelineConfig, RunMode};
pub use orchestrator::{PipelineError, PipelineOrchestrator, Stage, TaskFailure};
pub use report::{RunReport, RunSummary, Sample};
