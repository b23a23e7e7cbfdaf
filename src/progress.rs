//! Progress-callback trait for analysis stage events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalyzerConfigBuilder::progress_callback`] to be told when
//! each stage of an analysis starts and finishes. The CLI uses this to drive
//! its spinner; a web front end could forward the events to a status line.
//!
//! # Example
//!
//! ```rust
//! use findoc_analyzer::{AnalysisProgressCallback, AnalyzerConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PageCounter {
//!     pages: AtomicUsize,
//! }
//!
//! impl AnalysisProgressCallback for PageCounter {
//!     fn on_pages_ready(&self, page_count: usize) {
//!         self.pages.store(page_count, Ordering::SeqCst);
//!     }
//! }
//!
//! let config = AnalyzerConfig::builder()
//!     .progress_callback(Arc::new(PageCounter { pages: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the analysis pipeline as it moves between stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events for one analysis arrive in order:
/// `on_analysis_start`, `on_pages_ready`, `on_request_start`, then exactly one
/// of `on_analysis_complete` / `on_analysis_error`.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called once before the upload is normalized.
    ///
    /// # Arguments
    /// * `document_name`: display name of the upload
    fn on_analysis_start(&self, document_name: &str) {
        let _ = document_name;
    }

    /// Called when the upload has been turned into page images.
    fn on_pages_ready(&self, page_count: usize) {
        let _ = page_count;
    }

    /// Called just before the single request is sent to the model.
    fn on_request_start(&self, page_count: usize) {
        let _ = page_count;
    }

    /// Called when the model answered.
    ///
    /// # Arguments
    /// * `answer_len`: byte length of the answer text
    fn on_analysis_complete(&self, answer_len: usize) {
        let _ = answer_len;
    }

    /// Called when any stage failed; no further events follow.
    fn on_analysis_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalyzerConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;
