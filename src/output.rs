//! Result types returned by the top-level analysis functions.

use crate::document::{download_file_name, DOWNLOAD_MEDIA_TYPE};
use serde::{Deserialize, Serialize};

/// Everything a front end needs to show an analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    /// The model's answer, exactly as returned.
    pub answer: String,
    /// What was analysed.
    pub document: DocumentInfo,
    /// Timings.
    pub stats: AnalysisStats,
}

impl AnalysisOutput {
    /// File name to offer when the user downloads the answer.
    pub fn download_file_name(&self) -> String {
        download_file_name(&self.document.name)
    }

    /// Media type of the downloaded file.
    pub fn download_media_type(&self) -> &'static str {
        DOWNLOAD_MEDIA_TYPE
    }
}

/// Description of an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub name: String,
    pub media_type: String,
    /// Pages sent to the model (1 for a plain image).
    pub page_count: usize,
    /// Size of the upload in bytes.
    pub byte_len: usize,
}

/// Wall-clock timings of one analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub normalize_duration_ms: u64,
    pub request_duration_ms: u64,
    pub total_duration_ms: u64,
}
