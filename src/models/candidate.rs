//! Candidate entries returned by a paper repository.

use serde::{Deserialize, Serialize};

/// A paper returned by a repository search.
///
/// Fields other than `similarity` come from the repository and are not
/// changed afterwards. `similarity` is filled in by the ranker and stays
/// `None` when there was no title to compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntry {
    /// Paper title
    pub title: String,

    /// Author names, in repository order
    pub authors: Vec<String>,

    /// Canonical abstract page, e.g. `http://arxiv.org/abs/2409.02159v1`
    pub identifier_url: String,

    /// Fetchable document URL
    pub document_url: String,

    /// Title similarity to the parsed reference, 0 to 100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl CandidateEntry {
    /// Create an entry, deriving the document URL from the identifier URL
    pub fn new(title: impl Into<String>, authors: Vec<String>, identifier_url: impl Into<String>) -> Self {
        let identifier_url = identifier_url.into();
        Self {
            title: title.into(),
            authors,
            document_url: document_url(&identifier_url),
            identifier_url,
            similarity: None,
        }
    }

    /// Last `/`-delimited component of the identifier URL
    pub fn id_suffix(&self) -> &str {
        self.identifier_url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }

    /// Authors joined for display
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }
}

/// Derive the document URL: `/abs/` becomes `/pdf/` and `.pdf` is appended.
pub fn document_url(identifier_url: &str) -> String {
    format!("{}.pdf", identifier_url.replacen("/abs/", "/pdf/", 1))
}
