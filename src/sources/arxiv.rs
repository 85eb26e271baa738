//! arXiv repository client.

use async_trait::async_trait;
use feed_rs::parser;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ArxivConfig;
use crate::models::{CandidateEntry, SearchQuery};
use crate::sources::{RepositoryClient, SourceError};
use crate::utils::HttpClient;

/// arXiv search client.
///
/// Queries the Atom API and maps each feed entry to a [`CandidateEntry`].
#[derive(Debug, Clone)]
pub struct ArxivClient {
    client: Arc<HttpClient>,
    api_url: String,
    timeout: Duration,
}

impl ArxivClient {
    /// Create a client for the configured endpoint
    pub fn new(config: &ArxivConfig) -> Result<Self, SourceError> {
        Ok(Self::with_client(Arc::new(HttpClient::new()?), config))
    }

    /// Create with a shared HTTP client
    pub fn with_client(client: Arc<HttpClient>, config: &ArxivConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            timeout: config.search_timeout(),
        }
    }

    /// Full request URL for a query
    pub fn request_url(&self, query: &SearchQuery, max_results: usize) -> String {
        format!(
            "{}?search_query={}&start=0&max_results={}",
            self.api_url,
            urlencoding::encode(&query.render()),
            max_results
        )
    }

    /// Parse an Atom feed body into candidates.
    ///
    /// arXiv reports malformed queries as a single entry whose id points at
    /// `/api/errors`; that is surfaced as an API error.
    pub fn parse_feed(body: &[u8]) -> Result<Vec<CandidateEntry>, SourceError> {
        let feed = parser::parse(body)
            .map_err(|e| SourceError::Parse(format!("Failed to parse Atom feed: {}", e)))?;

        if let Some(error) = feed.entries.iter().find(|e| e.id.contains("/api/errors")) {
            let message = error
                .summary
                .as_ref()
                .map(|s| s.content.trim().to_string())
                .unwrap_or_else(|| error.id.clone());
            return Err(SourceError::Api(message));
        }

        Ok(feed.entries.iter().map(Self::parse_entry).collect())
    }

    fn parse_entry(entry: &feed_rs::model::Entry) -> CandidateEntry {
        let title = entry
            .title
            .as_ref()
            .map(|t| collapse_whitespace(&t.content))
            .unwrap_or_default();

        let authors = entry
            .authors
            .iter()
            .map(|a| collapse_whitespace(&a.name))
            .collect();

        CandidateEntry::new(title, authors, entry.id.trim())
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl RepositoryClient for ArxivClient {
    fn name(&self) -> &str {
        "arXiv"
    }

    async fn search(
        &self,
        query: &SearchQuery,
        max_results: usize,
    ) -> Result<Vec<CandidateEntry>, SourceError> {
        if query.is_empty() {
            return Err(SourceError::InvalidRequest("empty search query".to_string()));
        }

        let url = self.request_url(query, max_results);
        tracing::info!("Request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/atom+xml")
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "arXiv API returned status: {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        let entries = Self::parse_feed(bytes.as_ref())?;
        tracing::info!("Found {} entries", entries.len());

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryTerm;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>arXiv Query Results</title>
  <id>http://arxiv.org/api/query</id>
  <updated>2024-01-01T00:00:00Z</updated>
  <entry>
    <id>http://arxiv.org/abs/2409.02159v2</id>
    <updated>2024-09-10T00:00:00Z</updated>
    <title>Generalized Tube Algebras, Symmetry-Resolved Partition Functions,
      and Twisted Boundary States</title>
    <summary>Abstract.</summary>
    <author><name>Yichul Choi</name></author>
    <author><name>Brandon C. Rayhaun</name></author>
    <author><name>Yunqin Zheng</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/hep-th/9901001v1</id>
    <updated>1999-01-01T00:00:00Z</updated>
    <title>An Old Paper</title>
    <summary>Abstract.</summary>
    <author><name>Some One</name></author>
  </entry>
</feed>"#;

    const ERROR_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>arXiv Query Results</title>
  <id>http://arxiv.org/api/query</id>
  <updated>2024-01-01T00:00:00Z</updated>
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
    <updated>2024-01-01T00:00:00Z</updated>
    <title>Error</title>
    <summary>incorrect id format for 1234</summary>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed_entries() {
        let entries = ArxivClient::parse_feed(FEED.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(
            first.title,
            "Generalized Tube Algebras, Symmetry-Resolved Partition Functions, and Twisted Boundary States"
        );
        assert_eq!(first.authors, vec!["Yichul Choi", "Brandon C. Rayhaun", "Yunqin Zheng"]);
        assert_eq!(first.identifier_url, "http://arxiv.org/abs/2409.02159v2");
        assert_eq!(first.document_url, "http://arxiv.org/pdf/2409.02159v2.pdf");
        assert!(first.similarity.is_none());

        assert_eq!(entries[1].document_url, "http://arxiv.org/pdf/hep-th/9901001v1.pdf");
    }

    #[test]
    fn test_parse_error_feed() {
        match ArxivClient::parse_feed(ERROR_FEED.as_bytes()) {
            Err(SourceError::Api(msg)) => assert_eq!(msg, "incorrect id format for 1234"),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            ArxivClient::parse_feed(b"not a feed"),
            Err(SourceError::Parse(_))
        ));
    }

    #[test]
    fn test_request_url() {
        let client = ArxivClient::new(&ArxivConfig::default()).unwrap();
        let mut query = SearchQuery::new();
        query.push(QueryTerm::Author("Banks".into()));
        query.push(QueryTerm::Text("Finite".into()));

        assert_eq!(
            client.request_url(&query, 10),
            "https://export.arxiv.org/api/query?search_query=au%3ABanks%20Finite&start=0&max_results=10"
        );
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let client = ArxivClient::new(&ArxivConfig::default()).unwrap();
        let result = client.search(&SearchQuery::new(), 10).await;
        assert!(matches!(result, Err(SourceError::InvalidRequest(_))));
    }
}
