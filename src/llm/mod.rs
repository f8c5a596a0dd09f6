//! Model access for humaneval-forge.
//!
//! [`CompletionClient`] sends a single chat completion request to the DeepSeek
//! endpoint and returns the assistant's text or a typed failure.
//! [`RetryingClient`] wraps any [`CompletionProvider`] with bounded
//! exponential backoff for transient failures.
//!
//! ```ignore
//! use humaneval_forge::llm::{ClientConfig, CompletionClient, CompletionRequest, RetryingClient};
//! use std::sync::Arc;
//!
//! let config = ClientConfig::from_env()?;
//! let client = RetryingClient::new(Arc::new(CompletionClient::new(config)?));
//!
//! let text = client
//!     .complete_with_retry(&CompletionRequest::new("def add(a, b):"), 3)
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod retry;

pub use client::{
    CompletionClient, CompletionProvider, CompletionRequest, CompletionResult, Message,
};
pub use config::{ClientConfig, API_KEY_ENV, DEEPSEEK_API_URL, MODEL_NAME};
pub use retry::{
    backoff_delay, RetryingClient, Sleeper, TokioSleeper, DEFAULT_BACKOFF_UNIT,
    DEFAULT_MAX_ATTEMPTS,
};
