//! Error types for humaneval-forge operations.
//!
//! Defines error types for the major subsystems:
//! - Chat completion requests against the model endpoint
//! - Loading the benchmark problem set
//! - Writing generated samples

use std::fmt;

use thiserror::Error;

/// Coarse classification of a [`CompletionError`].
///
/// The retry layer matches on this instead of on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionErrorKind {
    /// Credential or client setup problem.
    Configuration,
    /// Timeout, connection failure or interrupted read.
    Transport,
    /// Response body could not be decoded into the expected envelope.
    Protocol,
    /// The endpoint answered with a non-success status.
    Http,
}

impl fmt::Display for CompletionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompletionErrorKind::Configuration => "configuration",
            CompletionErrorKind::Transport => "transport",
            CompletionErrorKind::Protocol => "protocol",
            CompletionErrorKind::Http => "http",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while requesting a completion.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompletionError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("HTTP error: {status} {reason}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },
}

impl CompletionError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> CompletionErrorKind {
        match self {
            CompletionError::Configuration(_) => CompletionErrorKind::Configuration,
            CompletionError::Transport(_) => CompletionErrorKind::Transport,
            CompletionError::Protocol(_) => CompletionErrorKind::Protocol,
            CompletionError::Http { .. } => CompletionErrorKind::Http,
        }
    }

    /// Whether retrying the same request after a delay may succeed.
    ///
    /// Non-success HTTP statuses are deliberately not transient, 429 and 5xx included.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            CompletionErrorKind::Transport | CompletionErrorKind::Protocol
        )
    }
}

/// Errors that can occur while loading the benchmark problem set.
#[derive(Debug, Error)]
pub enum ProblemSetError {
    #[error("Invalid problem record on line {line}: {source}")]
    InvalidRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Task '{0}' appears more than once in the problem set")]
    DuplicateTask(String),

    #[error("Task '{0}' not found in the problem set")]
    TaskNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while writing generated samples.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_and_protocol_are_transient() {
        assert!(CompletionError::Transport("connection reset".to_string()).is_transient());
        assert!(CompletionError::Protocol("expected value".to_string()).is_transient());
    }

    #[test]
    fn test_http_and_configuration_are_not_transient() {
        for status in [400, 429, 500, 503] {
            let err = CompletionError::Http {
                status,
                reason: "whatever".to_string(),
                body: String::new(),
            };
            assert!(!err.is_transient(), "status {} should not be retried", status);
        }
        assert!(!CompletionError::Configuration("missing key".to_string()).is_transient());
    }

    #[test]
    fn test_http_error_display() {
        let err = CompletionError::Http {
            status: 401,
            reason: "Unauthorized".to_string(),
            body: "{\"error\":\"bad key\"}".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error: 401 Unauthorized");
        assert_eq!(err.kind(), CompletionErrorKind::Http);
        assert_eq!(err.kind().to_string(), "http");
    }
}
