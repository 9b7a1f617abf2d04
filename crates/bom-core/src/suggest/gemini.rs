//! Gemini suggestion backend.
//!
//! Issues a single `generateContent` call per fetch with a JSON response
//! schema, then validates the returned text with
//! [`super::response::parse_suggestions`]. No retries, caching or timeout.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::config::GeminiConfig;
use crate::model::Item;

use super::prompt::{SYSTEM_INSTRUCTION, build_prompt, response_schema};
use super::response::parse_suggestions;
use super::trait_def::{SuggestError, Suggester, SuggestionRequest};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Suggestion backend backed by the Gemini `generateContent` REST API.
#[derive(Debug, Clone)]
pub struct GeminiSuggester {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiSuggester {
    pub fn new(config: GeminiConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Use a caller-provided HTTP client.
    pub fn with_client(config: GeminiConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

/// Build the JSON request body for a suggestion request.
pub fn request_body(request: &SuggestionRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": build_prompt(request) }]
        }],
        "systemInstruction": {
            "parts": [{ "text": SYSTEM_INSTRUCTION }]
        },
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, or empty.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Extract the model text from a raw `generateContent` response body.
pub fn response_text(body: &str) -> Result<String, SuggestError> {
    let envelope: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| SuggestError::Envelope(e.to_string()))?;
    Ok(envelope.text())
}

#[async_trait]
impl Suggester for GeminiSuggester {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn suggest(&self, request: &SuggestionRequest) -> Result<Vec<Item>, SuggestError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(SuggestError::MissingCredential)?;

        let url = self.config.generate_content_url();
        info!(model = %self.config.model, module = %request.module_name, "requesting suggestions");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&request_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "suggestion service returned an error");
            return Err(SuggestError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response_text(&body)?;
        if text.trim().is_empty() {
            warn!("suggestion service returned no text; treating as no suggestions");
        }
        let items = parse_suggestions(&text)?;
        debug!(count = items.len(), "parsed suggestions");
        Ok(items)
    }
}
