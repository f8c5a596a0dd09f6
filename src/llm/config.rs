//! Connection settings for the chat completion endpoint.

use std::env;
use std::time::Duration;

use crate::error::CompletionError;

/// Environment variable holding the bearer token.
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// Chat completion endpoint.
pub const DEEPSEEK_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";

/// Model identifier sent with every request.
pub const MODEL_NAME: &str = "deepseek-chat";

/// Hard upper bound on a single request, body included.
pub const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Settings for [`CompletionClient`](super::CompletionClient).
///
/// Loaded once at startup and moved into the client; nothing re-reads the
/// environment afterwards.
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    endpoint: String,
    model: String,
    request_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration from an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Configuration` if the key is empty or blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self, CompletionError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CompletionError::Configuration(format!(
                "{} is empty",
                API_KEY_ENV
            )));
        }

        Ok(Self {
            api_key,
            endpoint: DEEPSEEK_API_URL.to_string(),
            model: MODEL_NAME.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        })
    }

    /// Create a configuration from the `DEEPSEEK_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Configuration` if the variable is unset or blank.
    pub fn from_env() -> Result<Self, CompletionError> {
        let api_key = env::var(API_KEY_ENV).map_err(|_| {
            CompletionError::Configuration(format!(
                "environment variable {} is not set",
                API_KEY_ENV
            ))
        })?;
        Self::new(api_key)
    }

    /// Resolve the key from an optional explicit value, falling back to the environment.
    pub fn resolve(api_key: Option<String>) -> Result<Self, CompletionError> {
        match api_key {
            Some(key) => Self::new(key),
            None => Self::from_env(),
        }
    }

    /// Point the client at a different endpoint (local test servers, proxies).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// The API key with everything but the first and last four characters hidden.
    pub fn api_key_masked(&self) -> String {
        let len = self.api_key.chars().count();
        if len <= 8 {
            "*".repeat(len)
        } else {
            let head: String = self.api_key.chars().take(4).collect();
            let tail: String = self.api_key.chars().skip(len - 4).collect();
            format!("{}...{}", head, tail)
        }
    }
}

// Keep the secret out of Debug output and logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key_masked())
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
