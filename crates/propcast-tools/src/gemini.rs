//! Gemini `generateContent` client
//!
//! Sends one text instruction plus one inline image and returns the first text
//! part of the first candidate. No retries and no streaming.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("response contained no text candidate")]
    EmptyResponse,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: Arc<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, GeminiError> {
        Self::with_endpoint(GEMINI_API_BASE, api_key, DEFAULT_MODEL)
    }

    /// Client against a specific API base and model (self-hosted proxies, tests)
    pub fn with_endpoint(
        api_base: &str,
        api_key: String,
        model: &str,
    ) -> Result<Self, GeminiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("propcast/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: Arc::new(api_key),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        let model = self.model.trim();
        if model.starts_with("models/") {
            format!("{}/{}:generateContent", self.api_base, model)
        } else {
            format!("{}/models/{}:generateContent", self.api_base, model)
        }
    }

    /// Ask the model about one image. Returns the first text part of the first candidate.
    pub async fn generate_from_image(
        &self,
        prompt: &str,
        image_data: &[u8],
        mime_type: &str,
    ) -> Result<String, GeminiError> {
        let request = GenerateContentRequest::with_inline_image(prompt, image_data, mime_type);

        info!(
            "Requesting description ({}, {} bytes) from model {}",
            mime_type,
            image_data.len(),
            self.model
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Gemini API error {}: {}", status, message);
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        let text = body.first_text().ok_or(GeminiError::EmptyResponse)?;

        debug!("Gemini returned {} chars", text.len());
        Ok(text.to_string())
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestContent {
    pub role: String,
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

impl GenerateContentRequest {
    pub fn with_inline_image(prompt: &str, image_data: &[u8], mime_type: &str) -> Self {
        let data = base64::engine::general_purpose::STANDARD.encode(image_data);
        Self {
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts: vec![
                    RequestPart::Text {
                        text: prompt.to_string(),
                    },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data,
                        },
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// First part of the first candidate, if it is text
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request =
            GenerateContentRequest::with_inline_image("Describe it", b"abc", "image/jpeg");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Describe it");
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/jpeg"
        );
        assert_eq!(json["contents"][0]["parts"][1]["inline_data"]["data"], "YWJj");
    }

    #[test]
    fn test_first_text() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Sunny condo"},{"text":"ignored"}]}},{"content":{"parts":[{"text":"second"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(body.first_text(), Some("Sunny condo"));
    }

    #[test]
    fn test_first_text_missing() {
        let empty: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(empty.first_text(), None);

        // Blocked prompts come back with a candidate but no content
        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert_eq!(blocked.first_text(), None);
    }

    #[test]
    fn test_endpoint() {
        let client =
            GeminiClient::with_endpoint(
                "http://localhost:9000/v1beta/",
                "k".into(),
                "gemini-2.5-flash",
            )
                .unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );

        let prefixed =
            GeminiClient::with_endpoint(
                "http://localhost:9000",
                "k".into(),
                "models/gemini-2.5-pro",
            )
                .unwrap();
        assert_eq!(
            prefixed.endpoint(),
            "http://localhost:9000/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = GeminiClient::new("secret-key".into()).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
