//! Paper repositories that candidate entries are searched in.
//!
//! The core only sees the [`RepositoryClient`] trait: a query goes in, an
//! ordered list of [`CandidateEntry`] values comes out. No relevance order
//! is assumed from the repository; ranking happens afterwards.

mod arxiv;
pub mod mock;

pub use arxiv::ArxivClient;
pub use mock::MockRepository;

use crate::models::{CandidateEntry, SearchQuery};
use async_trait::async_trait;

/// A searchable paper repository.
#[async_trait]
pub trait RepositoryClient: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this repository
    fn name(&self) -> &str;

    /// Run `query`, returning at most `max_results` entries in repository order
    async fn search(
        &self,
        query: &SearchQuery,
        max_results: usize,
    ) -> Result<Vec<CandidateEntry>, SourceError>;
}

/// Errors that can occur when talking to a repository or fetching from it
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within its timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Non-success status or an error reported by the API
    #[error("API error: {0}")]
    Api(String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Downloaded bytes are not the expected document format
    #[error("Invalid artifact from {url}: {reason}")]
    InvalidArtifact { url: String, reason: String },

    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

impl From<tempfile::PersistError> for SourceError {
    fn from(err: tempfile::PersistError) -> Self {
        SourceError::Io(err.error)
    }
}
