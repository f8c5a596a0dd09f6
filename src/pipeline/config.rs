//! Pipeline configuration for the orchestrator.
//!
//! This module provides the run mode and the sampling and retry settings used
//! for every request the pipeline makes.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::{DEFAULT_BACKOFF_UNIT, DEFAULT_MAX_ATTEMPTS};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// How each problem is turned into a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// One prompt per problem, one attempt. Failures degrade to an empty completion.
    Direct,
    /// Generate tests, then a solution given those tests, both with retry.
    /// A task whose calls exhaust their attempts is recorded as failed.
    TestFirst,
}

impl RunMode {
    /// Whether a failed task is recorded as failed rather than degraded to an empty sample.
    pub fn records_failures(&self) -> bool {
        matches!(self, RunMode::TestFirst)
    }

    /// Attempts per call given the configured maximum. Direct mode never retries.
    pub fn attempts_per_call(&self, configured: u32) -> u32 {
        match self {
            RunMode::Direct => 1,
            RunMode::TestFirst => configured,
        }
    }

    /// Name of the output artifact for this mode.
    pub fn default_output_file(&self) -> &'static str {
        match self {
            RunMode::Direct => "samples_direct.jsonl",
            RunMode::TestFirst => "samples_auto.jsonl",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Direct => write!(f, "direct"),
            RunMode::TestFirst => write!(f, "test_first"),
        }
    }
}

/// Configuration for the pipeline orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Run mode.
    pub mode: RunMode,
    /// Maximum tokens generated per call.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Attempts per call in test-first mode.
    pub max_attempts: u32,
    /// One backoff unit; attempt `n` waits `2^n` units.
    pub backoff_unit: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(RunMode::TestFirst)
    }
}

impl PipelineConfig {
    /// Creates a configuration for `mode` with default values.
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            max_tokens: 1024,
            temperature: 0.0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }

    /// Creates configuration for `mode`, applying environment overrides.
    ///
    /// # Environment Variables
    ///
    /// - `PIPELINE_MAX_TOKENS`: Maximum tokens per call (default: 1024)
    /// - `PIPELINE_TEMPERATURE`: Sampling temperature (default: 0.0)
    /// - `PIPELINE_MAX_ATTEMPTS`: Attempts per call in test-first mode (default: 3)
    /// - `PIPELINE_BACKOFF_UNIT_MS`: Backoff unit in milliseconds (default: 1000)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be parsed or the result is invalid.
    pub fn from_env(mode: RunMode) -> Result<Self, ConfigError> {
        let mut config = Self::new(mode);

        if let Ok(val) = std::env::var("PIPELINE_MAX_TOKENS") {
            config.max_tokens = parse_env_value(&val, "PIPELINE_MAX_TOKENS")?;
        }

        if let Ok(val) = std::env::var("PIPELINE_TEMPERATURE") {
            config.temperature = parse_env_value(&val, "PIPELINE_TEMPERATURE")?;
        }

        if let Ok(val) = std::env::var("PIPELINE_MAX_ATTEMPTS") {
            config.max_attempts = parse_env_value(&val, "PIPELINE_MAX_ATTEMPTS")?;
        }

        if let Ok(val) = std::env::var("PIPELINE_BACKOFF_UNIT_MS") {
            let ms: u64 = parse_env_value(&val, "PIPELINE_BACKOFF_UNIT_MS")?;
            config.backoff_unit = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "temperature must be a non-negative number".to_string(),
            ));
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder method to set max tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Builder method to set temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Builder method to set attempts per call.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Builder method to set the backoff unit.
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }
}

/// Parse an environment variable value into a type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}
