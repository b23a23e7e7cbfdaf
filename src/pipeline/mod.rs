//! Pipeline stages for financial document analysis.
//!
//! Each submodule implements exactly one step, so each can be tested on
//! its own and swapped (e.g. a different renderer) without touching the
//! others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ normalize ──▶ request
//! (path/URL)  (render+encode)  (one model call)
//! ```
//!
//! 1. [`input`]    : read a local file or download a URL into an `UploadedArtifact`
//! 2. [`normalize`]: images pass through; PDFs go to [`render`], which
//!    rasterises each page with pdfium and PNG-encodes it via [`encode`]
//! 3. [`request`]  : build `[prompt, pages…, question]` and call the model;
//!    the only stage with network I/O to the model

pub mod encode;
pub mod input;
pub mod normalize;
pub mod render;
pub mod request;
