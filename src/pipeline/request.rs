//! Analysis requester: pages + question → one model call → answer text.
//!
//! ## Request layout
//!
//! 1. the fixed instruction prompt ([`FINANCIAL_ANALYSIS_PROMPT`])
//! 2. every page image, in page order
//! 3. the user's question, verbatim (possibly empty)
//!
//! The answer comes back untouched: no trimming, no parsing, no retries.

use crate::config::AnalyzerConfig;
use crate::document::PageImage;
use crate::error::AnalyzerError;
use crate::prompts::FINANCIAL_ANALYSIS_PROMPT;
use crate::provider::{ContentGenerator, ContentItem, GeminiGenerator, LlmProviderGenerator};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One question about one document, ready to be flattened into content items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub instruction_prompt: &'static str,
    pub pages: Vec<PageImage>,
    pub question: String,
}

impl AnalysisRequest {
    pub fn new(question: impl Into<String>, pages: Vec<PageImage>) -> Self {
        Self {
            instruction_prompt: FINANCIAL_ANALYSIS_PROMPT,
            pages,
            question: question.into(),
        }
    }

    /// `[prompt, page_1, …, page_n, question]`.
    pub fn into_content(self) -> Vec<ContentItem> {
        let mut items = Vec::with_capacity(self.pages.len() + 2);
        items.push(ContentItem::text(self.instruction_prompt));
        items.extend(self.pages.into_iter().map(ContentItem::Image));
        items.push(ContentItem::Text(self.question));
        items
    }
}

/// Sends analysis requests to a [`ContentGenerator`].
#[derive(Clone)]
pub struct Analyzer {
    generator: Arc<dyn ContentGenerator>,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("provider", &self.generator.name())
            .field("model", &self.generator.model())
            .finish()
    }
}

impl Analyzer {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }

    /// Build the generator the configuration asks for.
    ///
    /// 1. `config.generator`, used as-is
    /// 2. `config.provider_name` other than `gemini` → edgequake-llm provider
    /// 3. otherwise the built-in Gemini client, which needs `config.api_key`
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        if let Some(ref generator) = config.generator {
            return Ok(Self::new(Arc::clone(generator)));
        }

        if !config.uses_gemini() {
            if let Some(ref name) = config.provider_name {
                let generator = LlmProviderGenerator::from_config(name, config)?;
                return Ok(Self::new(Arc::new(generator)));
            }
        }

        Ok(Self::new(Arc::new(GeminiGenerator::from_config(config)?)))
    }

    /// The generator requests go to.
    pub fn generator(&self) -> &Arc<dyn ContentGenerator> {
        &self.generator
    }

    /// Ask `question` about the document made of `pages`.
    ///
    /// Makes exactly one call to the generator. Any failure it reports is
    /// returned as [`AnalyzerError::RemoteAnalysisFailure`].
    pub async fn analyze(&self, question: &str, pages: &[PageImage]) -> Result<String, AnalyzerError> {
        if pages.is_empty() {
            return Err(AnalyzerError::EmptyDocument);
        }

        let items = AnalysisRequest::new(question, pages.to_vec()).into_content();
        let image_bytes: usize = pages.iter().map(|p| p.data.len()).sum();
        debug!(
            "Request: {} items ({} images, {} image bytes), question {} chars",
            items.len(),
            pages.len(),
            image_bytes,
            question.chars().count()
        );

        let start = Instant::now();
        match self.generator.generate(&items).await {
            Ok(answer) => {
                info!(
                    "{}/{} answered in {:?} ({} chars)",
                    self.generator.name(),
                    self.generator.model(),
                    start.elapsed(),
                    answer.chars().count()
                );
                Ok(answer)
            }
            Err(e) => {
                warn!("{} request failed: {}", self.generator.name(), e);
                Err(AnalyzerError::RemoteAnalysisFailure {
                    message: e.to_string(),
                })
            }
        }
    }
}
