//! Configuration types for financial document analysis.
//!
//! All behaviour is controlled through [`AnalyzerConfig`], built via its
//! [`AnalyzerConfigBuilder`] or loaded with [`AnalyzerConfig::from_env`].
//! The API credential lives here and is handed to the requester explicitly;
//! nothing in the library reads the environment on its own after startup.

use crate::error::AnalyzerError;
use crate::pipeline::render::{RenderOptions, MIN_RENDERED_PIXELS};
use crate::progress::ProgressCallback;
use crate::provider::ContentGenerator;
use std::fmt;
use std::sync::Arc;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Base URL of the Google Generative Language REST API.
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables checked, in order, for the Gemini API key.
pub const API_KEY_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Configuration for an analysis.
///
/// # Example
/// ```rust
/// use findoc_analyzer::AnalyzerConfig;
///
/// let config = AnalyzerConfig::builder()
///     .api_key("test-key")
///     .model("gemini-1.5-pro")
///     .max_rendered_pixels(1600)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gemini-1.5-pro");
/// ```
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// Model identifier. Default: `gemini-1.5-flash`.
    pub model: String,

    /// API key for the Gemini endpoint. Required unless `provider_name` or
    /// `generator` is set.
    pub api_key: Option<String>,

    /// Base URL of the Gemini REST API. Default: [`DEFAULT_GEMINI_ENDPOINT`].
    pub endpoint: String,

    /// Use an edgequake-llm provider (`openai`, `anthropic`, `ollama`, …)
    /// instead of the built-in Gemini client. `"gemini"` means the built-in one.
    pub provider_name: Option<String>,

    /// Pre-constructed generator. Takes precedence over everything else.
    pub generator: Option<Arc<dyn ContentGenerator>>,

    /// Longest edge of a rendered PDF page in pixels. Default: 2000.
    ///
    /// Keeps page images within what vision models accept without
    /// downscaling them server-side.
    pub max_rendered_pixels: u32,

    /// User password for encrypted PDFs.
    pub password: Option<String>,

    /// Timeout for the remote model call in seconds. Default: 120.
    pub request_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Sampling temperature. `None` leaves the provider default.
    pub temperature: Option<f32>,

    /// Output token cap. `None` leaves the provider default.
    pub max_output_tokens: Option<u32>,

    /// Receives stage events during [`crate::analysis::analyze`].
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            provider_name: None,
            generator: None,
            max_rendered_pixels: 2000,
            password: None,
            request_timeout_secs: 120,
            download_timeout_secs: 120,
            temperature: None,
            max_output_tokens: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("provider_name", &self.provider_name)
            .field(
                "generator",
                &self.generator.as_ref().map(|g| g.name().to_string()),
            )
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Default configuration with the API key read from the environment.
    ///
    /// Checks `GOOGLE_API_KEY`, then `GEMINI_API_KEY`. Intended to be called
    /// once at process start.
    pub fn from_env() -> Result<Self, AnalyzerError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AnalyzerError> {
        let api_key = API_KEY_VARS
            .iter()
            .filter_map(|var| lookup(var))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
            .ok_or_else(|| AnalyzerError::MissingCredential {
                var: API_KEY_VARS[0].to_string(),
            })?;

        Ok(Self {
            api_key: Some(api_key),
            ..Self::default()
        })
    }

    /// Rendering options for the normalizer.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            max_rendered_pixels: self.max_rendered_pixels,
            password: self.password.clone(),
        }
    }

    /// `true` when requests go to the built-in Gemini client.
    pub fn uses_gemini(&self) -> bool {
        self.generator.is_none()
            && self
                .provider_name
                .as_deref()
                .is_none_or(|p| p.eq_ignore_ascii_case("gemini"))
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn generator(mut self, generator: Arc<dyn ContentGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(MIN_RENDERED_PIXELS);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.max_output_tokens = Some(n);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, AnalyzerError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(AnalyzerError::InvalidConfig("Model must not be empty".into()));
        }
        if !(c.endpoint.starts_with("http://") || c.endpoint.starts_with("https://")) {
            return Err(AnalyzerError::InvalidConfig(format!(
                "Endpoint must be an HTTP/HTTPS URL, got '{}'",
                c.endpoint
            )));
        }
        if c.request_timeout_secs == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
