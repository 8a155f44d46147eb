//! Gemini Provider Implementation
//!
//! Provides integration with the Gemini generateContent REST API.
//!
//! # Features
//!
//! - Async HTTP communication with the Gemini API
//! - Multimodal requests (text plus inline images)
//! - Structured JSON output via response MIME type
//! - Configurable model and system instruction
//!
//! # Examples
//!
//! ```no_run
//! use codelens_llm::GeminiClient;
//!
//! let client = GeminiClient::new("api-key")
//!     .with_system_instruction("You are a debugging assistant.");
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{InlineImage, LlmError, ModelProvider, ModelRequest, ProviderErrorBody};

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// Default timeout for model requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini API provider
///
/// Every call requests `application/json` output; the response normalizer
/// downstream still tolerates fenced or drifted payloads.
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    system_instruction: Option<String>,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Parameters
    ///
    /// - `api_key`: Gemini API key
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use codelens_llm::GeminiClient;
    ///
    /// let client = GeminiClient::new("api-key");
    /// ```
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap();

        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: BASE_URL.to_string(),
            system_instruction: None,
            client,
        }
    }

    /// Create a client from the `GEMINI_API_KEY` environment variable
    ///
    /// An unset variable yields an empty key; the first request will fail
    /// with an API error rather than construction failing.
    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_ENV).unwrap_or_default())
    }

    /// Override the model after construction
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Add a system instruction sent alongside every request
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Override the API base URL, mainly for testing
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_body(&self, request: &ModelRequest) -> GenerateContentRequest {
        let mut parts = Vec::new();
        // Image first so the prompt text reads as a question about it
        if let Some(InlineImage { mime_type, data }) = &request.image {
            parts.push(Part::InlineData {
                inline_data: InlineDataPayload {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                },
            });
        }
        parts.push(Part::Text {
            text: request.prompt.clone(),
        });

        let system_instruction = self.system_instruction.as_ref().map(|text| Content {
            role: "system".to_string(),
            parts: vec![Part::Text {
                text: text.clone(),
            }],
        });

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            system_instruction,
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        }
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, LlmError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| LlmError::Transport(format!("Gemini API request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(parse_api_error(status.as_u16(), &body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            LlmError::InvalidResponse(format!("Failed to parse Gemini response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl ModelProvider for GeminiClient {
    async fn generate(&self, request: ModelRequest) -> Result<String, LlmError> {
        let body = self.build_body(&request);
        self.send_request(&body).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ProviderErrorBody,
}

fn parse_api_error(status: u16, body_text: &str) -> LlmError {
    match serde_json::from_str::<ErrorWrapper>(body_text) {
        Ok(wrapper) => {
            let message = wrapper
                .error
                .message
                .clone()
                .unwrap_or_else(|| body_text.to_string());
            LlmError::Api {
                status,
                message,
                body: Some(wrapper.error),
            }
        }
        Err(_) => LlmError::Api {
            status,
            message: body_text.to_string(),
            body: None,
        },
    }
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, LlmError> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            LlmError::InvalidResponse("Gemini returned no text in the response candidates".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_defaults() {
        let client = GeminiClient::new("k");
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.base_url, BASE_URL);
        assert!(client.system_instruction.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let client = GeminiClient::new("k")
            .with_model("gemini-custom")
            .with_system_instruction("be brief")
            .with_base_url("http://localhost:9999");
        assert_eq!(client.model, "gemini-custom");
        assert_eq!(client.system_instruction.as_deref(), Some("be brief"));
        assert_eq!(client.base_url, "http://localhost:9999");
    }

    #[test]
    fn test_body_shape_text_only() {
        let client = GeminiClient::new("k").with_system_instruction("persona");
        let body = client.build_body(&ModelRequest::text("analyze this"));
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "analyze this");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "persona");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_body_puts_image_before_text() {
        let client = GeminiClient::new("k");
        let request = ModelRequest::text("what code is this").with_image(b"bytes", "image/png");
        let value = serde_json::to_value(client.build_body(&request)).unwrap();

        let parts = value["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["text"], "what code is this");
    }

    #[test]
    fn test_body_omits_absent_system_instruction() {
        let client = GeminiClient::new("k");
        let value = serde_json::to_value(client.build_body(&ModelRequest::text("x"))).unwrap();
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_api_error_structured() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = parse_api_error(429, body);
        assert!(err.is_rate_limited());
        match err {
            LlmError::Api { status, body, .. } => {
                assert_eq!(status, 429);
                let body = body.unwrap();
                assert_eq!(body.code, Some(429));
                assert_eq!(body.status.as_deref(), Some("RESOURCE_EXHAUSTED"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_api_error_quota_body() {
        let body = r#"{"error":{"code":429,"message":"You exceeded your current quota, please check your plan and billing details.","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = parse_api_error(429, body);
        assert!(err.is_quota_exhausted());
    }

    #[test]
    fn test_parse_api_error_unstructured_body() {
        let err = parse_api_error(502, "<html>Bad Gateway</html>");
        match err {
            LlmError::Api {
                status,
                message,
                body,
            } => {
                assert_eq!(status, 502);
                assert_eq!(message, "<html>Bad Gateway</html>");
                assert!(body.is_none());
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_text_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"hello"}]}},{"content":{"parts":[{"text":"ignored"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), "hello");
    }

    #[test]
    fn test_extract_text_empty_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        let err = extract_text_response(response).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn test_extract_text_skips_non_text_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{},{"text":"second part"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), "second part");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let client = GeminiClient::new("k").with_base_url("http://127.0.0.1:1");
        let err = client
            .generate(ModelRequest::text("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
    }
}
