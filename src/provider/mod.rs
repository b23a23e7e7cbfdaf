//! Remote multimodal model abstraction.
//!
//! The requester only needs one capability: "generate text from an ordered
//! list of text and image items". [`ContentGenerator`] is that capability.
//! Two implementations ship with the crate:
//!
//! * [`GeminiGenerator`]: talks to the Google Generative Language REST API
//!   directly. Each item becomes one `part` of a single user turn, so the
//!   model sees exactly the order it was given.
//! * [`LlmProviderGenerator`]: adapts any `edgequake_llm::LLMProvider`
//!   (OpenAI, Anthropic, Ollama, …).
//!
//! Tests substitute their own implementation to observe the request.

pub mod gemini;
pub mod llm;

pub use gemini::GeminiGenerator;
pub use llm::LlmProviderGenerator;

use crate::document::PageImage;
use async_trait::async_trait;
use thiserror::Error;

/// One element of a multimodal request, in the order the model should read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    Text(String),
    Image(PageImage),
}

impl ContentItem {
    pub fn text(s: impl Into<String>) -> Self {
        ContentItem::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentItem::Text(t) => Some(t),
            ContentItem::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&PageImage> {
        match self {
            ContentItem::Image(img) => Some(img),
            ContentItem::Text(_) => None,
        }
    }
}

/// Failure reported by a [`ContentGenerator`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never got a response (DNS, TLS, timeout, …).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The API answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The model refused to answer (safety filter, blocked prompt).
    #[error("Response blocked: {reason}")]
    Blocked { reason: String },

    /// The API answered successfully but without any text.
    #[error("Model returned no text")]
    EmptyResponse,

    /// Error surfaced by an edgequake-llm provider.
    #[error("{0}")]
    Provider(String),
}

/// Hosted model that turns an ordered multimodal input into text.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Short provider name for logs, e.g. `"gemini"`.
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Send one request and return the model's text unmodified.
    ///
    /// Implementations must preserve the order of `items` and make exactly
    /// one remote call.
    async fn generate(&self, items: &[ContentItem]) -> Result<String, ProviderError>;
}
