//! Google Gemini client over the Generative Language REST API.
//!
//! ## Request shape
//!
//! ```text
//! POST {endpoint}/models/{model}:generateContent
//! x-goog-api-key: …
//! { "contents": [ { "role": "user", "parts": [ {text}, {inlineData}, …, {text} ] } ] }
//! ```
//!
//! Every [`ContentItem`] becomes one part of a single user turn, in order.
//! Images travel as base64 `inlineData`; the raw page bytes are only encoded
//! here, at the wire boundary.

use super::{ContentGenerator, ContentItem, ProviderError};
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::pipeline::encode::to_base64;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// [`ContentGenerator`] backed by the Gemini `generateContent` endpoint.
pub struct GeminiGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
    generation_config: Option<GenerationConfig>,
}

impl GeminiGenerator {
    /// Build a client from the analyzer configuration.
    ///
    /// Fails with [`AnalyzerError::MissingCredential`] when no API key is set.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AnalyzerError::MissingCredential {
                var: crate::config::API_KEY_VARS[0].to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AnalyzerError::Internal(format!("HTTP client: {e}")))?;

        let generation_config = if config.temperature.is_some() || config.max_output_tokens.is_some()
        {
            Some(GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            })
        } else {
            None
        };

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            timeout_secs: config.request_timeout_secs,
            generation_config,
        })
    }

    /// Full `generateContent` URL for the configured model.
    pub fn url(&self) -> String {
        generate_url(&self.endpoint, &self.model)
    }
}

#[async_trait]
impl ContentGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, items: &[ContentItem]) -> Result<String, ProviderError> {
        let body = build_request(items, self.generation_config.clone());
        let start = Instant::now();

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Http(format!("timed out after {}s", self.timeout_secs))
                } else {
                    ProviderError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Provider(format!("Invalid Gemini response: {e}")))?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Gemini usage: {} prompt tokens, {} output tokens",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }
        info!("Gemini answered in {:?}", start.elapsed());

        extract_text(parsed)
    }
}

fn generate_url(endpoint: &str, model: &str) -> String {
    let model = model.strip_prefix("models/").unwrap_or(model);
    format!("{endpoint}/models/{model}:generateContent")
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

/// Text or inline media part.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub(crate) enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

/// Response parts may carry fields we don't use (function calls, thoughts).
#[derive(Debug, Deserialize)]
pub(crate) struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ── Conversions ──────────────────────────────────────────────────────────

/// Build the request body: one user turn, one part per item, same order.
pub(crate) fn build_request(
    items: &[ContentItem],
    generation_config: Option<GenerationConfig>,
) -> GenerateContentRequest {
    let parts = items
        .iter()
        .map(|item| match item {
            ContentItem::Text(text) => Part::Text { text: text.clone() },
            ContentItem::Image(page) => Part::InlineData {
                inline_data: InlineData {
                    mime_type: page.media_type.clone(),
                    data: to_base64(&page.data),
                },
            },
        })
        .collect();

    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts,
        }],
        generation_config,
    }
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn extract_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return match response.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => Err(ProviderError::Blocked { reason }),
            None => Err(ProviderError::EmptyResponse),
        };
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return match candidate.finish_reason {
            Some(reason) if reason != "STOP" => Err(ProviderError::Blocked { reason }),
            _ => Err(ProviderError::EmptyResponse),
        };
    }

    Ok(text)
}

/// Pull `error.message` out of an error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else if trimmed.chars().count() > 500 {
        let head: String = trimmed.chars().take(500).collect();
        format!("{head}\u{2026}")
    } else {
        trimmed.to_string()
    }
}
