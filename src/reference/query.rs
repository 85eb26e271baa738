//! Building repository keyword queries from parsed citations.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::QueryConfig;
use crate::models::{ParsedCitation, QueryTerm, SearchQuery};

/// Separators between author names: `A, B`, `A, and B`, `A and B`, `A & B`
static NAME_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",\s*(?:and\s+|&\s*)?|\s+and\s+|\s+&\s+").expect("static regex")
});

/// Builds a [`SearchQuery`] from a [`ParsedCitation`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    min_term_len: usize,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(&QueryConfig::default())
    }
}

impl QueryBuilder {
    pub fn new(config: &QueryConfig) -> Self {
        Self {
            min_term_len: config.min_term_len.max(1),
        }
    }

    /// Build the query, or `None` when nothing usable remains.
    ///
    /// Author terms come first, longest surname first, then title words in
    /// their original order.
    pub fn build(&self, citation: &ParsedCitation) -> Option<SearchQuery> {
        let (authors, title) = match citation {
            ParsedCitation::Identifier { external_id } => {
                return Some(SearchQuery::identifier(external_id.clone()));
            }
            ParsedCitation::Fields { authors, title, .. } => (authors, title.as_deref()),
        };

        let mut surnames = self.surnames(authors);
        // stable: equal lengths keep citation order
        surnames.sort_by_key(|s| std::cmp::Reverse(s.chars().count()));

        let mut query = SearchQuery::new();
        for surname in surnames {
            query.push(QueryTerm::Author(surname));
        }
        for word in title.map(|t| self.title_words(t)).unwrap_or_default() {
            query.push(QueryTerm::Text(word));
        }

        if query.is_empty() {
            None
        } else {
            Some(query)
        }
    }

    /// Surnames from a raw author run, in citation order.
    ///
    /// The run is re-split on both `, ` and ` and `, so lists the citation
    /// grammar left joined (`A, B, and C`) still yield every name.
    pub fn surnames(&self, authors: &str) -> Vec<String> {
        NAME_SEPARATOR
            .split(authors)
            .filter_map(|name| {
                name.split_whitespace()
                    .filter(|t| !matches!(t.to_lowercase().as_str(), "et" | "al" | "al."))
                    .last()
            })
            .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|token| self.is_usable(token))
            .map(str::to_string)
            .collect()
    }

    /// Alphanumeric title words, dropping short words and "and".
    pub fn title_words(&self, title: &str) -> Vec<String> {
        title
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| self.is_usable(word))
            .map(str::to_string)
            .collect()
    }

    fn is_usable(&self, token: &str) -> bool {
        token.chars().count() >= self.min_term_len
            && token.chars().any(char::is_alphanumeric)
            && !token.eq_ignore_ascii_case("and")
    }
}
