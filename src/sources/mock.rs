//! Mock repository for testing purposes.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::{CandidateEntry, SearchQuery};
use crate::sources::{RepositoryClient, SourceError};

/// A repository that returns preset entries and records the queries it saw.
#[derive(Debug, Default)]
pub struct MockRepository {
    entries: Mutex<Vec<CandidateEntry>>,
    queries: Mutex<Vec<String>>,
}

impl MockRepository {
    /// Create a mock returning `entries` for every search
    pub fn new(entries: Vec<CandidateEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Rendered queries received so far
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepositoryClient for MockRepository {
    fn name(&self) -> &str {
        "Mock Repository"
    }

    async fn search(
        &self,
        query: &SearchQuery,
        max_results: usize,
    ) -> Result<Vec<CandidateEntry>, SourceError> {
        self.queries.lock().unwrap().push(query.render());
        let guard = self.entries.lock().unwrap();
        Ok(guard.iter().take(max_results).cloned().collect())
    }
}

/// Helper to create a candidate for testing.
pub fn make_entry(id: &str, title: &str) -> CandidateEntry {
    CandidateEntry::new(
        title,
        vec!["Test Author".to_string()],
        format!("http://arxiv.org/abs/{}", id),
    )
}
