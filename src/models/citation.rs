//! Reference blocks, parsed citations and search queries.

use serde::{Deserialize, Serialize};

/// The lines of one numbered entry in a bibliography.
///
/// A block starts at the line carrying `[n]` and ends before the next line
/// that opens with any `[m]`, or at the end of the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceBlock {
    /// Reference number as printed in the bibliography
    pub number: u32,

    /// Raw lines, in reading order, marker line included
    pub lines: Vec<String>,
}

impl ReferenceBlock {
    /// Create a block from its number and raw lines
    pub fn new(number: u32, lines: Vec<String>) -> Self {
        Self { number, lines }
    }

    /// Reassemble the block into a single line of text.
    ///
    /// A line ending in `-` is joined to the next one without a space. The
    /// hyphen is kept when the continuation starts with an uppercase letter
    /// (`non-` + `Hermitian`) and dropped otherwise, which undoes line-wrap
    /// hyphenation but also turns `non-` + `unitary` into `nonunitary`.
    /// The leading `[n]` marker is removed.
    pub fn text(&self) -> String {
        let mut joined = String::new();

        for (i, line) in self.lines.iter().enumerate() {
            let line = line.trim_end();
            match line.strip_suffix('-') {
                Some(stem) => {
                    let next_is_upper = self
                        .lines
                        .get(i + 1)
                        .and_then(|next| next.trim_start().chars().next())
                        .is_some_and(char::is_uppercase);
                    if next_is_upper {
                        joined.push_str(line);
                    } else {
                        joined.push_str(stem);
                    }
                }
                None => {
                    joined.push_str(line);
                    joined.push(' ');
                }
            }
        }

        let body = strip_marker(joined.trim_start());
        body.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Select one `;`-separated segment of a composite reference (1-based).
    pub fn segment(&self, index: usize) -> Option<String> {
        if index == 0 {
            return None;
        }
        self.text()
            .split(';')
            .nth(index - 1)
            .map(|s| s.trim().to_string())
    }

    /// Number of `;`-separated segments in the block
    pub fn segment_count(&self) -> usize {
        self.text().split(';').count()
    }
}

/// Strip a leading `[digits]` marker.
fn strip_marker(text: &str) -> &str {
    let Some(rest) = text.strip_prefix('[') else {
        return text;
    };
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    match rest[digits..].strip_prefix(']') {
        Some(after) if digits > 0 => after,
        _ => text,
    }
}

/// The citation grammars, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrammarVariant {
    /// `<authors>, "<title>", <source>`
    QuotedTitle,
    /// `<authors>, <title>, <source>`
    UnquotedTitle,
    /// `<authors>, <source>`
    NoTitle,
}

impl GrammarVariant {
    /// All variants in priority order
    pub const ALL: [GrammarVariant; 3] = [
        GrammarVariant::QuotedTitle,
        GrammarVariant::UnquotedTitle,
        GrammarVariant::NoTitle,
    ];

    /// Short name used in logs and diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            GrammarVariant::QuotedTitle => "quoted-title",
            GrammarVariant::UnquotedTitle => "unquoted-title",
            GrammarVariant::NoTitle => "no-title",
        }
    }
}

impl std::fmt::Display for GrammarVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Structured result of parsing one reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedCitation {
    /// The text carries an external identifier; grammar parsing was skipped
    Identifier { external_id: String },

    /// One of the citation grammars matched
    Fields {
        variant: GrammarVariant,
        /// Raw author run, in citation order
        authors: String,
        /// Absent for the no-title form
        title: Option<String>,
        /// Everything from the start of the source field onwards
        source_remainder: String,
    },
}

impl ParsedCitation {
    /// Title of the cited work, when one was recovered
    pub fn title(&self) -> Option<&str> {
        match self {
            ParsedCitation::Fields { title, .. } => title.as_deref(),
            ParsedCitation::Identifier { .. } => None,
        }
    }

    /// External identifier, when one was found
    pub fn external_id(&self) -> Option<&str> {
        match self {
            ParsedCitation::Identifier { external_id } => Some(external_id),
            ParsedCitation::Fields { .. } => None,
        }
    }
}

/// One term of a repository query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "value", rename_all = "snake_case")]
pub enum QueryTerm {
    /// Surname restricted to the author field
    Author(String),
    /// Free-text word from the title
    Text(String),
    /// Bare external identifier
    Identifier(String),
}

impl QueryTerm {
    /// The term in the repository's keyword syntax
    pub fn render(&self) -> String {
        match self {
            QueryTerm::Author(name) => format!("au:{}", name),
            QueryTerm::Text(word) => word.clone(),
            QueryTerm::Identifier(id) => id.clone(),
        }
    }
}

/// Ordered query terms; insertion order is the order sent to the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub terms: Vec<QueryTerm>,
}

impl SearchQuery {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Query consisting of a single identifier
    pub fn identifier(id: impl Into<String>) -> Self {
        Self {
            terms: vec![QueryTerm::Identifier(id.into())],
        }
    }

    /// Append a term
    pub fn push(&mut self, term: QueryTerm) {
        self.terms.push(term);
    }

    /// Whether the query has no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Author-scoped surnames, in query order
    pub fn author_terms(&self) -> Vec<&str> {
        self.terms
            .iter()
            .filter_map(|t| match t {
                QueryTerm::Author(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Serialize to the `search_query` parameter value
    pub fn render(&self) -> String {
        self.terms
            .iter()
            .map(QueryTerm::render)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}
