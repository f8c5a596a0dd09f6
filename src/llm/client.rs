//! Chat completion client for the DeepSeek API.
//!
//! Sends exactly one user message per call with streaming disabled, and turns
//! the JSON envelope into the assistant's text or a typed [`CompletionError`].

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use super::config::ClientConfig;
use crate::error::CompletionError;

/// Result of a single completion call: the assistant's text or a typed failure.
pub type CompletionResult = Result<String, CompletionError>;

/// A message in a conversation with the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role of the message sender.
    pub role: String,
    /// Content of the message.
    pub content: String,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Prompt plus sampling parameters for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// The user prompt.
    pub prompt: String,
    /// Maximum number of tokens to generate. Must be greater than zero.
    pub max_tokens: u32,
    /// Sampling temperature. Must be non-negative.
    pub temperature: f64,
}

impl CompletionRequest {
    /// Create a request with the default sampling parameters (1024 tokens, greedy).
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: 1024,
            temperature: 0.0,
        }
    }

    /// Set the max tokens for this request.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature for this request.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Anything that can turn a prompt into model text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run one completion request. Implementations make a single attempt.
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult;
}

/// HTTPS client for the chat completion endpoint.
///
/// Holds no per-call state, so one instance can serve the whole run.
pub struct CompletionClient {
    config: ClientConfig,
    http_client: Client,
}

impl CompletionClient {
    /// Create a client from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Configuration` if the HTTP client cannot be built
    /// (for example when the TLS backend fails to initialise).
    pub fn new(config: ClientConfig) -> Result<Self, CompletionError> {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                CompletionError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// Wire format of the request body.
#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f64,
    stream: bool,
}

/// Internal response structure; only the fields we consume.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionProvider for CompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult {
        let api_request = ApiRequest {
            model: self.config.model(),
            messages: vec![Message::user(request.prompt.as_str())],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        let http_response = self
            .http_client
            .post(self.config.endpoint())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .bearer_auth(self.config.api_key())
            .json(&api_request)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = http_response.status();

        if !status.is_success() {
            let body = read_body(http_response).await;
            let body = String::from_utf8_lossy(&body).into_owned();
            let reason = status.canonical_reason().unwrap_or("Unknown").to_string();

            tracing::warn!(
                status = status.as_u16(),
                reason = %reason,
                body = %body,
                "Completion endpoint returned an error status"
            );

            return Err(CompletionError::Http {
                status: status.as_u16(),
                reason,
                body,
            });
        }

        let body = read_body(http_response).await;
        parse_completion(&String::from_utf8_lossy(&body))
    }
}

/// Read the whole body, keeping whatever arrived if the transfer is cut short.
async fn read_body(mut response: Response) -> Vec<u8> {
    let mut body = Vec::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(
                    received_bytes = body.len(),
                    error = %e,
                    "Response body read interrupted, using partial body"
                );
                break;
            }
        }
    }
    body
}

fn transport_error(error: &reqwest::Error) -> CompletionError {
    if error.is_timeout() {
        CompletionError::Transport(format!("request timed out: {}", error))
    } else {
        CompletionError::Transport(error.to_string())
    }
}

/// Extract the first choice's message content from a response body.
fn parse_completion(body: &str) -> CompletionResult {
    let api_response: ApiResponse = serde_json::from_str(body).map_err(|e| {
        CompletionError::Protocol(format!("Failed to parse API response: {}", e))
    })?;

    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::Protocol("No choices in API response".to_string()))?;

    Ok(choice.message.content.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    const SUCCESS_BODY: &str = r#"{"id":"cmpl-1","model":"deepseek-chat","choices":[{"index":0,"message":{"role":"assistant","content":"```python\nprint(1)\n```"},"finish_reason":"stop"}]}"#;

    /// Read one HTTP/1.1 request (headers plus content-length body).
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            data.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&data).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        if name.eq_ignore_ascii_case("content-length") {
                            value.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).to_string()
    }

    /// Serve a single canned raw HTTP response and hand back the request text.
    async fn serve_once(raw_response: String) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let request = read_request(&mut socket).await;
                let _ = socket.write_all(raw_response.as_bytes()).await;
                let _ = socket.shutdown().await;
                let _ = tx.send(request);
            }
        });

        (format!("http://{}/v1/chat/completions", addr), rx)
    }

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
    }

    fn client_for(endpoint: &str) -> CompletionClient {
        let config = ClientConfig::new("sk-test-key")
            .expect("valid key")
            .with_endpoint(endpoint)
            .with_request_timeout(Duration::from_secs(5));
        CompletionClient::new(config).expect("client should build")
    }

    #[test]
    fn test_api_request_serialization() {
        let request = ApiRequest {
            model: "deepseek-chat",
            messages: vec![Message::user("def add(a, b):")],
            max_tokens: 1024,
            temperature: 0.0,
            stream: false,
        };

        let json: serde_json::Value =
            serde_json::to_value(&request).expect("serialization should succeed");
        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "def add(a, b):");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new("prompt")
            .with_max_tokens(256)
            .with_temperature(0.2);

        assert_eq!(request.prompt, "prompt");
        assert_eq!(request.max_tokens, 256);
        assert_eq!(request.temperature, 0.2);
    }

    #[test]
    fn test_parse_completion_first_choice() {
        let body = r#"{"choices":[{"message":{"content":"first"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(parse_completion(body), Ok("first".to_string()));
    }

    #[test]
    fn test_parse_completion_null_content_is_empty() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(parse_completion(body), Ok(String::new()));
    }

    #[test]
    fn test_parse_completion_missing_choices() {
        let err = parse_completion(r#"{"id":"x"}"#).unwrap_err();
        assert_eq!(err.kind(), crate::error::CompletionErrorKind::Protocol);
    }

    #[test]
    fn test_parse_completion_empty_choices() {
        let err = parse_completion(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, CompletionError::Protocol(_)));
    }

    #[test]
    fn test_parse_completion_invalid_json() {
        let err = parse_completion("<html>Bad Gateway</html>").unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_complete_success_sends_expected_request() {
        let (endpoint, request_rx) = serve_once(http_response("200 OK", SUCCESS_BODY)).await;
        let client = client_for(&endpoint);

        let text = client
            .complete(&CompletionRequest::new("def add(a, b):"))
            .await
            .expect("completion should succeed");
        assert_eq!(text, "```python\nprint(1)\n```");

        let request = request_rx.await.expect("server saw the request");
        let lowered = request.to_lowercase();
        assert!(lowered.starts_with("post /v1/chat/completions"));
        assert!(lowered.contains("authorization: bearer sk-test-key"));
        assert!(request.contains("\"stream\":false"));
        assert!(request.contains("\"model\":\"deepseek-chat\""));
    }

    #[tokio::test]
    async fn test_complete_http_error_captures_body() {
        let body = r#"{"error":{"message":"Authentication Fails"}}"#;
        let (endpoint, _rx) = serve_once(http_response("401 Unauthorized", body)).await;
        let client = client_for(&endpoint);

        let err = client
            .complete(&CompletionRequest::new("prompt"))
            .await
            .unwrap_err();

        match err {
            CompletionError::Http {
                status,
                reason,
                body: captured,
            } => {
                assert_eq!(status, 401);
                assert_eq!(reason, "Unauthorized");
                assert!(captured.contains("Authentication Fails"));
            }
            other => panic!("expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_malformed_body_is_protocol_error() {
        let (endpoint, _rx) = serve_once(http_response("200 OK", "not json at all")).await;
        let client = client_for(&endpoint);

        let err = client
            .complete(&CompletionRequest::new("prompt"))
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_complete_invalid_utf8_is_replaced() {
        let mut raw = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
            r#"{"choices":[{"message":{"content":"ok "}}]}"#.len() + 1
        )
        .into_bytes();
        raw.extend_from_slice(br#"{"choices":[{"message":{"content":"ok "#);
        raw.push(0xFF);
        raw.extend_from_slice(br#""}}]}"#);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let _ = read_request(&mut socket).await;
                let _ = socket.write_all(&raw).await;
                let _ = socket.shutdown().await;
            }
        });

        let client = client_for(&format!("http://{}/v1/chat/completions", addr));
        let text = client
            .complete(&CompletionRequest::new("prompt"))
            .await
            .expect("invalid UTF-8 should not be fatal");
        assert_eq!(text, "ok \u{FFFD}");
    }

    #[tokio::test]
    async fn test_complete_truncated_body_uses_partial_bytes() {
        // Announce more bytes than are sent, then close the connection.
        let raw = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            SUCCESS_BODY.len() + 64,
            SUCCESS_BODY
        );
        let (endpoint, _rx) = serve_once(raw).await;
        let client = client_for(&endpoint);

        let text = client
            .complete(&CompletionRequest::new("prompt"))
            .await
            .expect("complete JSON in a truncated transfer should be salvaged");
        assert_eq!(text, "```python\nprint(1)\n```");
    }

    #[tokio::test]
    async fn test_complete_truncated_unparseable_body_is_transient() {
        let partial = r#"{"choices":[{"message":{"cont"#;
        let raw = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 4096\r\nconnection: close\r\n\r\n{}",
            partial
        );
        let (endpoint, _rx) = serve_once(raw).await;
        let client = client_for(&endpoint);

        let err = client
            .complete(&CompletionRequest::new("prompt"))
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Protocol(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_complete_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let client = client_for(&format!("http://{}/v1/chat/completions", addr));
        let err = client
            .complete(&CompletionRequest::new("prompt"))
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Transport(_)));
    }

    #[tokio::test]
    async fn test_complete_timeout_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            if let Ok((socket, _)) = listener.accept().await {
                tokio::time::sleep(Duration::from_secs(5)).await;
                drop(socket);
            }
        });

        let config = ClientConfig::new("sk-test-key")
            .expect("valid key")
            .with_endpoint(format!("http://{}/v1/chat/completions", addr))
            .with_request_timeout(Duration::from_millis(200));
        let client = CompletionClient::new(config).expect("client should build");

        let err = client
            .complete(&CompletionRequest::new("prompt"))
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Transport(_)));
        assert!(err.is_transient());
    }
}
