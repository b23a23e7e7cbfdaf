//! Adapter from [`ContentGenerator`] to edgequake-llm providers.
//!
//! Chat-style APIs take a list of messages, each with text and attached
//! images, rather than a flat list of parts. Items are grouped into user
//! messages: a message starts with the text items that precede its images,
//! and a text item that follows an image opens the next message. For the
//! analysis request `[prompt, page…, question]` that is two messages, the
//! prompt with every page attached followed by the question.

use super::{ContentGenerator, ContentItem, ProviderError};
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::pipeline::encode::to_base64;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// [`ContentGenerator`] over any `edgequake_llm` provider.
pub struct LlmProviderGenerator {
    provider: Arc<dyn LLMProvider>,
    name: String,
    model: String,
    options: CompletionOptions,
}

impl LlmProviderGenerator {
    /// Wrap an already-constructed provider.
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        name: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            name: name.into(),
            model: model.into(),
            options: CompletionOptions::default(),
        }
    }

    /// Instantiate a named provider (reads its API key from the environment).
    pub fn from_config(provider_name: &str, config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let provider = ProviderFactory::create_llm_provider(provider_name, &config.model).map_err(
            |e| AnalyzerError::ProviderNotConfigured {
                provider: provider_name.to_string(),
                hint: format!("{e}"),
            },
        )?;

        let mut generator = Self::new(provider, provider_name, config.model.clone());
        generator.options = CompletionOptions {
            temperature: config.temperature,
            max_tokens: config.max_output_tokens.map(|n| n as usize),
            ..Default::default()
        };
        Ok(generator)
    }
}

#[async_trait]
impl ContentGenerator for LlmProviderGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, items: &[ContentItem]) -> Result<String, ProviderError> {
        let messages: Vec<ChatMessage> = group_messages(items)
            .into_iter()
            .map(|m| {
                let images = m
                    .images
                    .iter()
                    .map(|page| ImageData::new(to_base64(&page.data), page.media_type.as_str()))
                    .collect();
                ChatMessage::user_with_images(m.text.as_str(), images)
            })
            .collect();

        let start = Instant::now();
        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| ProviderError::Provider(format!("{e}")))?;

        debug!(
            "{}: {} input tokens, {} output tokens, {:?}",
            self.name,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        if response.content.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(response.content)
    }
}

/// Text plus the images that follow it, before the next text item.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct MessageGroup<'a> {
    pub text: String,
    pub images: Vec<&'a crate::document::PageImage>,
}

/// Split an ordered item list into user messages without reordering.
pub(crate) fn group_messages(items: &[ContentItem]) -> Vec<MessageGroup<'_>> {
    let mut groups: Vec<MessageGroup<'_>> = Vec::new();
    let mut current = MessageGroup::default();
    let mut has_text = false;

    for item in items {
        match item {
            ContentItem::Text(text) => {
                if !current.images.is_empty() {
                    groups.push(std::mem::take(&mut current));
                    has_text = false;
                }
                if has_text {
                    current.text.push_str("\n\n");
                }
                current.text.push_str(text);
                has_text = true;
            }
            ContentItem::Image(page) => current.images.push(page),
        }
    }

    if has_text || !current.images.is_empty() {
        groups.push(current);
    }
    groups
}
