//! Utility modules supporting the lookup pipeline.
//!
//! - [`HttpClient`]: shared reqwest client
//! - [`PdfDocument`] / [`PageTextSource`]: page-by-page document text
//! - [`SimilarityRanker`]: title-closeness ordering of candidates
//! - [`ArtifactFetcher`]: idempotent, validated document download
//! - [`PathViewerLookup`]: external viewer discovery

mod download;
mod http;
mod pdf;
mod similarity;
mod viewer;

pub use download::{artifact_file_name, ArtifactFetcher, FetchOutcome, PDF_MAGIC};
pub use http::HttpClient;
pub use pdf::{PageTextSource, PdfDocument, PdfExtractError};
pub use similarity::{sort_by_score, title_similarity, SimilarityRanker, MAX_SCORE};
pub use viewer::{open_in_viewer, PathViewerLookup, ViewerLookup};
