//! Pipeline orchestrator for sample generation.
//!
//! Processes problems strictly one after another. Each problem goes through
//! the stages of the configured [`RunMode`]; a failure on one problem never
//! stops the run.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::collectors::{Problem, ProblemSet};
use crate::error::{CompletionError, SinkError};
use crate::export::{ResultSink, SinkOutcome};
use crate::llm::{CompletionProvider, CompletionRequest, RetryingClient, Sleeper};
use crate::prompts::{build_direct_prompt, build_solution_prompt, build_test_prompt};
use crate::utils::{extract_code, extract_direct_completion};

use super::config::{ConfigError, PipelineConfig, RunMode};
use super::report::{RunReport, Sample};

/// Errors that can occur during pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Writing the samples failed.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Which model call of a task failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Direct,
    Tests,
    Solution,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Direct => write!(f, "direct"),
            Stage::Tests => write!(f, "tests"),
            Stage::Solution => write!(f, "solution"),
        }
    }
}

/// A task-level failure: the stage and the error that ended it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{stage} stage failed: {source}")]
pub struct TaskFailure {
    pub stage: Stage,
    #[source]
    pub source: CompletionError,
}

/// Drives the problem set through the model and collects a [`RunReport`].
pub struct PipelineOrchestrator {
    client: RetryingClient,
    config: PipelineConfig,
}

impl PipelineOrchestrator {
    /// Creates an orchestrator over `provider`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Config` if the configuration is invalid.
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let client = RetryingClient::new(provider).with_backoff_unit(config.backoff_unit);
        Ok(Self { client, config })
    }

    /// Replace the sleeper used for retry backoff.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.client = self.client.with_sleeper(sleeper);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process every problem once, in order.
    pub async fn run(&self, problems: &ProblemSet) -> RunReport {
        let mode = self.config.mode;
        let total = problems.len();
        let mut report = RunReport::new(mode);

        tracing::info!(mode = %mode, problems = total, "Starting generation run");

        for (idx, problem) in problems.iter().enumerate() {
            tracing::info!(
                task_id = %problem.task_id,
                position = idx + 1,
                total,
                "Processing task"
            );

            match self.process(problem).await {
                Ok(sample) => report.push_sample(sample),
                Err(failure) if mode.records_failures() => {
                    tracing::error!(
                        task_id = %problem.task_id,
                        stage = %failure.stage,
                        kind = %failure.source.kind(),
                        error = %failure.source,
                        "Task failed, skipping"
                    );
                    report.push_failure(problem.task_id.clone());
                }
                Err(failure) => {
                    tracing::warn!(
                        task_id = %problem.task_id,
                        stage = %failure.stage,
                        error = %failure.source,
                        "Completion failed, recording empty completion"
                    );
                    report.push_sample(Sample::direct(problem.task_id.clone(), String::new()));
                }
            }
        }

        let summary = report.summary();
        tracing::info!(
            mode = %mode,
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Generation run finished"
        );
        if report.has_failures() {
            tracing::warn!(
                failed_task_ids = ?report.failed_task_ids,
                "Some tasks failed and need a manual rerun"
            );
        }

        report
    }

    /// Run the problem set and hand the finished report to `sink`.
    pub async fn run_to_sink(
        &self,
        problems: &ProblemSet,
        sink: &mut dyn ResultSink,
    ) -> Result<(RunReport, SinkOutcome), PipelineError> {
        let report = self.run(problems).await;
        let outcome = sink.accept(&report)?;
        tracing::info!(
            location = %outcome.location,
            records = outcome.records,
            "Samples saved"
        );
        Ok((report, outcome))
    }

    async fn process(&self, problem: &Problem) -> Result<Sample, TaskFailure> {
        match self.config.mode {
            RunMode::Direct => {
                let raw = self
                    .call(Stage::Direct, build_direct_prompt(&problem.prompt))
                    .await?;
                let completion = extract_direct_completion(&raw);
                Ok(Sample::direct(problem.task_id.clone(), completion))
            }
            RunMode::TestFirst => {
                let raw_tests = self
                    .call(Stage::Tests, build_test_prompt(&problem.prompt))
                    .await?;
                let tests = extract_code(&raw_tests);
                tracing::debug!(task_id = %problem.task_id, tests = %tests, "Generated tests");

                let raw_solution = self
                    .call(
                        Stage::Solution,
                        build_solution_prompt(&problem.prompt, &tests),
                    )
                    .await?;
                let completion = extract_code(&raw_solution);
                tracing::debug!(
                    task_id = %problem.task_id,
                    completion = %completion,
                    "Generated solution"
                );

                Ok(Sample::with_tests(problem.task_id.clone(), tests, completion))
            }
        }
    }

    async fn call(&self, stage: Stage, prompt: String) -> Result<String, TaskFailure> {
        let request = CompletionRequest::new(prompt)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);
        let attempts = self.config.mode.attempts_per_call(self.config.max_attempts);

        self.client
            .complete_with_retry(&request, attempts)
            .await
            .map_err(|source| TaskFailure { stage, source })
    }
}
