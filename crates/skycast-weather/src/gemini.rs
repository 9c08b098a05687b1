//! Gemini generateContent client with search grounding.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::types::WeatherError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the `models/{model}:generateContent` endpoint.
///
/// Constructed explicitly from resolved configuration and passed by
/// reference to the provider; holds no global state.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Same as [`new`](Self::new) with an explicit API base, e.g. a mock
    /// server in tests or a regional endpoint.
    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send one grounded generation request.
    ///
    /// The request enables the Google Search tool and therefore must not
    /// also force a JSON response MIME type (the API rejects the
    /// combination); callers parse the returned text themselves.
    #[instrument(skip(self, prompt), level = "info")]
    pub async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse, WeatherError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(&self.api_key),
        );

        let body = GenerateContentRequest::grounded(prompt);

        let response = self.client.post(&url).json(&body).send().await?;

        self.handle_response(response).await
    }

    /// Helper to handle API responses and errors.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<GenerateContentResponse, WeatherError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| WeatherError::InvalidResponse(format!("JSON parse error: {}", e)));
        }

        let status = status.as_u16();
        let message = api_error_message(&response.text().await.unwrap_or_default());

        Err(match status {
            400 => WeatherError::InvalidRequest(message),
            401 | 403 => WeatherError::InvalidApiKey(message),
            429 => WeatherError::QuotaExceeded(message),
            500..=599 => WeatherError::ServiceUnavailable(message),
            _ => WeatherError::Api { status, message },
        })
    }
}

/// Pull the human-readable message out of a standard API error body
/// (`{"error": {"message": ...}}`), falling back to the raw body.
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<ErrorDetail>,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    tools: Vec<Tool>,
}

impl GenerateContentRequest {
    fn grounded(prompt: &str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "googleSearch")]
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

// Response models. Every level is optional: the API omits fields freely
// and an absent level must degrade to "no text" / "no citations", never
// to a decode failure.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    pub parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    pub grounding_chunks: Option<Vec<GroundingChunk>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any part carries text.
    pub fn primary_text(&self) -> Option<String> {
        let parts = self
            .candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_ref()?;

        let text: String = parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Grounding metadata of the first candidate, if present.
    pub fn grounding_metadata(&self) -> Option<&GroundingMetadata> {
        self.candidates
            .as_ref()?
            .first()?
            .grounding_metadata
            .as_ref()
    }
}
