//! CodeLens Model Provider Layer
//!
//! Pluggable generative-model providers behind a single async trait.
//!
//! # Architecture
//!
//! This crate owns everything that touches the model transport: the request
//! payload type, the [`ModelProvider`] trait, provider error classification
//! (quota exhaustion vs. transient rate limiting), and the bounded-retry
//! executor built on that classification.
//!
//! # Providers
//!
//! - `MockModel`: deterministic scripted provider for testing
//! - `GeminiClient`: Gemini REST API integration
//!
//! # Examples
//!
//! ```
//! use codelens_llm::{MockModel, ModelProvider, ModelRequest};
//!
//! # async fn example() {
//! let provider = MockModel::new(r#"{"ok":true}"#);
//! let reply = provider.generate(ModelRequest::text("ping")).await.unwrap();
//! assert_eq!(reply, r#"{"ok":true}"#);
//! # }
//! ```

#![warn(missing_docs)]

pub mod gemini;
pub mod retry;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use gemini::GeminiClient;
pub use retry::{with_retry, RetryPolicy};

/// Structured error body returned by the provider alongside non-2xx statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderErrorBody {
    /// Numeric error code, usually mirroring the HTTP status
    pub code: Option<i32>,

    /// Human-readable message
    pub message: Option<String>,

    /// Symbolic status such as "RESOURCE_EXHAUSTED"
    pub status: Option<String>,
}

/// Errors that can occur while talking to the model
///
/// Classification deliberately works on message text, status codes and the
/// nested provider body rather than any transport-library type: provider
/// errors are inconsistent, deeply nested objects, and the quota/rate-limit
/// distinction has to survive every shape they arrive in.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or connection failure before an HTTP status was received
    #[error("Communication error: {0}")]
    Transport(String),

    /// Non-success HTTP status from the provider
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider message, falling back to the raw body
        message: String,
        /// Parsed error body, when the provider sent one
        body: Option<ProviderErrorBody>,
    },

    /// Response arrived but could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Retry budget exhausted without a settled outcome
    #[error("Max retries exceeded")]
    RetriesExhausted,
}

impl LlmError {
    /// Quota exhaustion: a hard usage ceiling for the current billing
    /// period. Never retried; the caller substitutes a fallback payload.
    ///
    /// Detected from message text (top-level plus nested body) containing
    /// quota, billing or 429 markers. Providers interleave quota text inside
    /// rate-limit envelopes, so the message check runs before any status
    /// check and takes precedence.
    pub fn is_quota_exhausted(&self) -> bool {
        let msg = self.message_text().to_lowercase();
        msg.contains("quota") || msg.contains("billing") || msg.contains("429")
    }

    /// Rate limiting: short-term congestion that backoff resolves.
    ///
    /// Detected from HTTP 429, a nested 429 code, RESOURCE_EXHAUSTED
    /// framing, or those markers in the message text.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            LlmError::Api {
                status,
                message,
                body,
            } => {
                if *status == 429
                    || message.contains("429")
                    || message.contains("RESOURCE_EXHAUSTED")
                {
                    return true;
                }
                if let Some(body) = body {
                    if body.code == Some(429)
                        || body.status.as_deref() == Some("RESOURCE_EXHAUSTED")
                        || body.message.as_deref().is_some_and(|m| m.contains("429"))
                    {
                        return true;
                    }
                }
                false
            }
            LlmError::Transport(msg) | LlmError::InvalidResponse(msg) => {
                msg.contains("429") || msg.contains("RESOURCE_EXHAUSTED")
            }
            LlmError::RetriesExhausted => false,
        }
    }

    /// All message text carried by this error, nested body included
    fn message_text(&self) -> String {
        match self {
            LlmError::Transport(msg) | LlmError::InvalidResponse(msg) => msg.clone(),
            LlmError::Api { message, body, .. } => {
                let mut text = message.clone();
                if let Some(body) = body {
                    if let Some(nested) = &body.message {
                        text.push(' ');
                        text.push_str(nested);
                    }
                    if let Some(status) = &body.status {
                        text.push(' ');
                        text.push_str(status);
                    }
                }
                text
            }
            LlmError::RetriesExhausted => "max retries exceeded".to_string(),
        }
    }
}

/// Inline image attached to a request, base64-encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// MIME type, e.g. "image/png"
    pub mime_type: String,

    /// Base64-encoded image bytes
    pub data: String,
}

/// One outbound request to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    /// Per-call prompt text
    pub prompt: String,

    /// Optional inline image, sent ahead of the prompt text
    pub image: Option<InlineImage>,
}

impl ModelRequest {
    /// Create a text-only request
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    /// Attach raw image bytes, encoding them for inline transport
    pub fn with_image(mut self, bytes: &[u8], mime_type: impl Into<String>) -> Self {
        self.image = Some(InlineImage {
            mime_type: mime_type.into(),
            data: BASE64_STANDARD.encode(bytes),
        });
        self
    }
}

/// A generative model that turns a request into raw response text
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Send one request and return the model's text reply
    async fn generate(&self, request: ModelRequest) -> Result<String, LlmError>;
}

/// Mock model provider for deterministic testing
///
/// Returns scripted results in order, falling back to a fixed default once
/// the script runs dry, and records every request it saw.
///
/// # Examples
///
/// ```
/// use codelens_llm::{LlmError, MockModel, ModelProvider, ModelRequest};
///
/// # async fn example() {
/// let mock = MockModel::new("fallback");
/// mock.enqueue_ok("first");
/// mock.enqueue_err(LlmError::Transport("boom".to_string()));
///
/// assert_eq!(mock.generate(ModelRequest::text("a")).await.unwrap(), "first");
/// assert!(mock.generate(ModelRequest::text("b")).await.is_err());
/// assert_eq!(mock.generate(ModelRequest::text("c")).await.unwrap(), "fallback");
/// assert_eq!(mock.call_count(), 3);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockModel {
    default_response: String,
    script: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockModel {
    /// Create a mock returning a fixed response for every unscripted call
    pub fn new(default_response: impl Into<String>) -> Self {
        Self {
            default_response: default_response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue a successful response for the next unscripted call
    pub fn enqueue_ok(&self, response: impl Into<String>) {
        self.script.lock().unwrap().push_back(Ok(response.into()));
    }

    /// Queue an error for the next unscripted call
    pub fn enqueue_err(&self, error: LlmError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Number of times `generate` was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Every request seen so far, in call order
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request, when any call was made
    pub fn last_request(&self) -> Option<ModelRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl ModelProvider for MockModel {
    async fn generate(&self, request: ModelRequest) -> Result<String, LlmError> {
        *self.call_count.lock().unwrap() += 1;
        self.requests.lock().unwrap().push(request);

        if let Some(scripted) = self.script.lock().unwrap().pop_front() {
            return scripted;
        }
        Ok(self.default_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, message: &str, body: Option<ProviderErrorBody>) -> LlmError {
        LlmError::Api {
            status,
            message: message.to_string(),
            body,
        }
    }

    #[test]
    fn test_quota_detected_in_message() {
        let err = api_error(
            429,
            "You exceeded your current quota, please check your plan and billing details.",
            None,
        );
        assert!(err.is_quota_exhausted());
    }

    #[test]
    fn test_quota_detected_in_nested_body() {
        let err = api_error(
            400,
            "Bad request",
            Some(ProviderErrorBody {
                code: Some(400),
                message: Some("Billing account not configured".to_string()),
                status: None,
            }),
        );
        assert!(err.is_quota_exhausted());
    }

    #[test]
    fn test_429_text_counts_as_quota() {
        let err = LlmError::Transport("HTTP 429 from upstream".to_string());
        assert!(err.is_quota_exhausted());
    }

    #[test]
    fn test_rate_limit_status_without_quota_text() {
        let err = api_error(429, "Resource has been exhausted (e.g. check quota).", None);
        // Quota text takes precedence over the status check
        assert!(err.is_quota_exhausted());

        let err = api_error(429, "Too many concurrent requests", None);
        assert!(!err.is_quota_exhausted());
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_rate_limit_from_nested_body() {
        let err = api_error(
            503,
            "upstream unavailable",
            Some(ProviderErrorBody {
                code: None,
                message: None,
                status: Some("RESOURCE_EXHAUSTED".to_string()),
            }),
        );
        assert!(err.is_rate_limited());

        let err = api_error(
            500,
            "internal",
            Some(ProviderErrorBody {
                code: Some(429),
                message: None,
                status: None,
            }),
        );
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_resource_exhausted_in_message() {
        let err = api_error(500, "RESOURCE_EXHAUSTED: slow down", None);
        assert!(err.is_rate_limited());
        assert!(!err.is_quota_exhausted());
    }

    #[test]
    fn test_plain_transport_error_is_neither() {
        let err = LlmError::Transport("connection refused".to_string());
        assert!(!err.is_quota_exhausted());
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_retries_exhausted_is_neither() {
        let err = LlmError::RetriesExhausted;
        assert!(!err.is_quota_exhausted());
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_request_with_image_encodes_base64() {
        let request = ModelRequest::text("describe this").with_image(b"PNGDATA", "image/png");
        let image = request.image.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "UE5HREFUQQ==");
    }

    #[tokio::test]
    async fn test_mock_scripted_then_default() {
        let mock = MockModel::new("default");
        mock.enqueue_ok("scripted");

        let first = mock.generate(ModelRequest::text("one")).await.unwrap();
        let second = mock.generate(ModelRequest::text("two")).await.unwrap();
        assert_eq!(first, "scripted");
        assert_eq!(second, "default");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = MockModel::default();
        mock.generate(ModelRequest::text("alpha")).await.unwrap();
        mock.generate(ModelRequest::text("beta").with_image(b"x", "image/jpeg"))
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].prompt, "alpha");
        assert!(requests[1].image.is_some());
        assert_eq!(mock.last_request().unwrap().prompt, "beta");
    }

    #[tokio::test]
    async fn test_mock_clone_shares_state() {
        let mock = MockModel::new("shared");
        let clone = mock.clone();

        mock.generate(ModelRequest::text("x")).await.unwrap();
        assert_eq!(clone.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_error_script() {
        let mock = MockModel::default();
        mock.enqueue_err(LlmError::Api {
            status: 429,
            message: "quota exceeded".to_string(),
            body: None,
        });

        let err = mock.generate(ModelRequest::text("x")).await.unwrap_err();
        assert!(err.is_quota_exhausted());
    }
}
