//! From a numbered reference in a document to ranked repository candidates.

use std::sync::Arc;

use crate::config::Config;
use crate::models::{CandidateEntry, GrammarVariant, ParsedCitation, SearchQuery};
use crate::reference::{CitationParser, LocateError, ParseError, QueryBuilder, ReferenceLocator};
use crate::sources::{RepositoryClient, SourceError};
use crate::utils::{PageTextSource, PdfExtractError, SimilarityRanker};

/// Errors that end a lookup
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error("No citation pattern matched the reference text:\n{raw}")]
    Parse { raw: String },

    #[error("No usable author or title terms in the reference text:\n{raw}")]
    EmptyQuery { raw: String },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Pdf(#[from] PdfExtractError),
}

impl From<ParseError> for LookupError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::NoMatch { raw } => LookupError::Parse { raw },
        }
    }
}

/// Which reference to look up in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTarget {
    /// Number printed in the bibliography, `[n]`
    pub number: u32,
    /// Use the k-th page from the end that lists `[n]`
    pub depth: usize,
    /// 1-based `;`-separated part of a composite reference
    pub inner: Option<usize>,
}

impl ReferenceTarget {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            depth: 1,
            inner: None,
        }
    }
}

/// Everything a lookup produced
#[derive(Debug, Clone)]
pub struct LookupOutcome {
    /// Reference text the query was built from
    pub reference: String,
    pub citation: ParsedCitation,
    pub query: SearchQuery,
    /// Ranked, possibly empty
    pub candidates: Vec<CandidateEntry>,
}

/// The lookup chain: parse, build a query, search, rank.
#[derive(Debug, Clone)]
pub struct Lookup {
    repository: Arc<dyn RepositoryClient>,
    parser: CitationParser,
    builder: QueryBuilder,
    ranker: SimilarityRanker,
    max_results: usize,
}

impl Lookup {
    pub fn new(config: &Config, repository: Arc<dyn RepositoryClient>) -> Self {
        Self {
            repository,
            parser: CitationParser::new(),
            builder: QueryBuilder::new(&config.query),
            ranker: SimilarityRanker::new(&config.ranking),
            max_results: config.arxiv.effective_max_results(),
        }
    }

    /// Only try this grammar when parsing
    pub fn force_variant(mut self, variant: Option<GrammarVariant>) -> Self {
        self.parser = self.parser.force(variant);
        self
    }

    /// Text of the reference `target` selects from `pages`.
    pub fn reference_text(pages: &[String], target: &ReferenceTarget) -> Result<String, LookupError> {
        let block = ReferenceLocator::new(target.number)
            .depth(target.depth)
            .locate(pages)?;

        let text = match target.inner {
            Some(index) => block.segment(index).ok_or(LocateError::SegmentOutOfRange {
                index,
                available: block.segment_count(),
            })?,
            None => block.text(),
        };
        tracing::debug!("Reference [{}]: {}", target.number, text);
        Ok(text)
    }

    /// Look up reference `target` of a document.
    pub async fn resolve_document(
        &self,
        document: &impl PageTextSource,
        target: &ReferenceTarget,
    ) -> Result<LookupOutcome, LookupError> {
        let pages = document.pages()?;
        let text = Self::reference_text(&pages, target)?;
        self.resolve_text(&text).await
    }

    /// Look up a bare arXiv identifier.
    pub async fn resolve_identifier(&self, id: &str) -> Result<LookupOutcome, LookupError> {
        self.resolve_text(&format!("arXiv:{}", id.trim())).await
    }

    /// Look up already reassembled reference text.
    pub async fn resolve_text(&self, text: &str) -> Result<LookupOutcome, LookupError> {
        let citation = self.parser.parse(text)?;
        let query = self.builder.build(&citation).ok_or_else(|| LookupError::EmptyQuery {
            raw: text.to_string(),
        })?;
        tracing::debug!("Query: {}", query);

        let found = self.repository.search(&query, self.max_results).await?;
        tracing::debug!("{} returned {} candidate(s)", self.repository.name(), found.len());
        let candidates = self.ranker.rank(citation.title(), found);

        Ok(LookupOutcome {
            reference: text.to_string(),
            citation,
            query,
            candidates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RankingConfig;
    use crate::sources::mock::make_entry;
    use crate::sources::MockRepository;

    const BANKS: &str = "T. Banks and E. Rabinovici, Finite Temperature Behavior of the Lattice Abelian Higgs Model, Nucl. Phys. B 160 (1979) 349–379";

    fn pages() -> Vec<String> {
        vec![
            "Introduction. As shown in [2], the model is confined.\n".to_string(),
            format!(
                "References\n[1] A. First, Some paper, J. Phys. 1, 2 (2000).\n[2] {}.\n[3] Y. Choi, B. C. Rayhaun, and Y. Zheng, Generalized tube algebras,\narXiv:2409.02159; K. Other, Second part, Ann. Phys. 3, 4 (2001).\n",
                BANKS
            ),
        ]
    }

    fn lookup(mock: Arc<MockRepository>) -> Lookup {
        Lookup::new(&Config::default(), mock)
    }

    #[test]
    fn test_reference_text() {
        let text = Lookup::reference_text(&pages(), &ReferenceTarget::new(2)).unwrap();
        assert_eq!(text, format!("{}.", BANKS));
    }

    #[test]
    fn test_inner_segment() {
        let mut target = ReferenceTarget::new(3);
        target.inner = Some(2);
        let text = Lookup::reference_text(&pages(), &target).unwrap();
        assert_eq!(text, "K. Other, Second part, Ann. Phys. 3, 4 (2001).");

        target.inner = Some(3);
        match Lookup::reference_text(&pages(), &target) {
            Err(LookupError::Locate(LocateError::SegmentOutOfRange { index, available })) => {
                assert_eq!(index, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected out of range, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_reference() {
        assert!(matches!(
            Lookup::reference_text(&pages(), &ReferenceTarget::new(9)),
            Err(LookupError::Locate(LocateError::NotFound { number: 9 }))
        ));
    }

    #[tokio::test]
    async fn test_resolve_document_ranks_by_title() {
        let mock = Arc::new(MockRepository::new(vec![
            make_entry("hep-lat/0001", "Unrelated Lattice Study"),
            make_entry(
                "hep-lat/0002",
                "Finite Temperature Behavior of the Lattice Abelian Higgs Model",
            ),
        ]));
        let outcome = lookup(mock.clone())
            .resolve_document(&pages(), &ReferenceTarget::new(2))
            .await
            .unwrap();

        assert_eq!(
            mock.queries(),
            vec!["au:Rabinovici au:Banks Finite Temperature Behavior of the Lattice Abelian Higgs Model"]
        );
        assert_eq!(
            outcome.citation.title(),
            Some("Finite Temperature Behavior of the Lattice Abelian Higgs Model")
        );
        assert_eq!(outcome.candidates[0].identifier_url, "http://arxiv.org/abs/hep-lat/0002");
        assert_eq!(outcome.candidates[0].similarity, Some(100.0));
    }

    #[tokio::test]
    async fn test_identifier_short_circuit() {
        let mock = Arc::new(MockRepository::new(vec![make_entry("2409.02159", "Tube")]));
        let mut target = ReferenceTarget::new(3);
        target.inner = Some(1);

        let outcome = lookup(mock.clone())
            .resolve_document(&pages(), &target)
            .await
            .unwrap();

        assert_eq!(outcome.citation.external_id(), Some("2409.02159"));
        assert_eq!(mock.queries(), vec!["2409.02159"]);
        // No title to rank against: repository order and no scores.
        assert!(outcome.candidates[0].similarity.is_none());
    }

    #[tokio::test]
    async fn test_resolve_identifier() {
        let mock = Arc::new(MockRepository::default());
        let outcome = lookup(mock.clone()).resolve_identifier(" hep-th/9901001 ").await.unwrap();
        assert_eq!(outcome.query.render(), "hep-th/9901001");
        assert!(outcome.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_parse_failure_echoes_text() {
        let mock = Arc::new(MockRepository::default());
        match lookup(mock.clone()).resolve_text("no commas in here at all").await {
            Err(LookupError::Parse { raw }) => assert_eq!(raw, "no commas in here at all"),
            other => panic!("expected parse failure, got {:?}", other),
        }
        assert!(mock.queries().is_empty());
    }

    #[tokio::test]
    async fn test_empty_query() {
        let mock = Arc::new(MockRepository::default());
        let result = lookup(mock.clone())
            .force_variant(Some(GrammarVariant::NoTitle))
            .resolve_text("A. B, J. X, 1 (2000).")
            .await;
        assert!(matches!(result, Err(LookupError::EmptyQuery { .. })));
        assert!(mock.queries().is_empty());
    }

    #[tokio::test]
    async fn test_threshold_can_empty_results() {
        let mut config = Config::default();
        config.ranking = RankingConfig { min_similarity: 90.0 };
        let mock = Arc::new(MockRepository::new(vec![make_entry("1", "Cats")]));

        let outcome = Lookup::new(&config, mock)
            .resolve_text(BANKS)
            .await
            .unwrap();
        assert!(outcome.candidates.is_empty());
    }
}
