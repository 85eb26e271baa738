//! Citation grammars: turning a reference block into authors and title.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{GrammarVariant, ParsedCitation};
use crate::reference::ParseError;

/// New-style (`2409.02159`) and old-style (`hep-th/9901001`) ids after an `arXiv:` prefix
static PREFIXED_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bar-?xiv:\s*(?P<id>\d{4}\.\d{4,5}(?:v\d+)?|[a-z][a-z-]*(?:\.[a-z-]+)?/\d{7}(?:v\d+)?)",
    )
    .expect("static regex")
});

/// Old-style ids that appear without a prefix
static BARE_OLD_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?P<id>(?:hep-th|hep-ph|hep-lat|hep-ex|gr-qc|quant-ph|math-ph|nucl-th|nucl-ex|astro-ph|cond-mat)(?:\.[A-Za-z-]+)?/\d{7}(?:v\d+)?)",
    )
    .expect("static regex")
});

/// Journal tail that pins the right edge of the title:
/// `Nucl. Phys. B 925, 144 (2017).` or `Nucl. Phys. B 160 (1979) 349–379`.
const SOURCE: &str =
    r"(?P<source>[^,]+,[^,]+\(\d{4}\)\.?|[^,]+\(\d{4}\)\s*\d+(?:\s*[–-]\s*\d+)?\.?)";

/// Two authors joined by "and", otherwise a run up to the first comma
const AUTHORS: &str = r"(?P<authors>.+? and .+?|[^,]+)";

/// The grammars in priority order.
static GRAMMARS: LazyLock<Vec<Grammar>> = LazyLock::new(|| {
    GrammarVariant::ALL
        .iter()
        .map(|&variant| Grammar::new(variant))
        .collect()
});

/// Outcome of applying a single grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarMatch {
    Matched {
        variant: GrammarVariant,
        authors: String,
        title: Option<String>,
        source_remainder: String,
    },
    NoMatch,
}

/// One citation grammar and its compiled matcher.
#[derive(Debug)]
pub struct Grammar {
    variant: GrammarVariant,
    pattern: Regex,
}

impl Grammar {
    fn new(variant: GrammarVariant) -> Self {
        let pattern = match variant {
            GrammarVariant::QuotedTitle => format!(
                r#"^(?P<authors>[^“"]+?),\s*[“"](?P<title>[^”"]+?),?\s*[”"],?\s*{}"#,
                SOURCE
            ),
            GrammarVariant::UnquotedTitle => {
                format!(r"^{},\s(?P<title>.*),\s{}", AUTHORS, SOURCE)
            }
            GrammarVariant::NoTitle => format!(r"^{},\s{}", AUTHORS, SOURCE),
        };

        Self {
            variant,
            pattern: Regex::new(&pattern).expect("grammar regex"),
        }
    }

    /// Grammar for a given variant
    pub fn get(variant: GrammarVariant) -> &'static Grammar {
        GRAMMARS
            .iter()
            .find(|g| g.variant == variant)
            .unwrap_or(&GRAMMARS[0])
    }

    pub fn variant(&self) -> GrammarVariant {
        self.variant
    }

    /// Match `text` against this grammar
    pub fn apply(&self, text: &str) -> GrammarMatch {
        let Some(caps) = self.pattern.captures(text) else {
            return GrammarMatch::NoMatch;
        };
        let (Some(authors), Some(source)) = (caps.name("authors"), caps.name("source")) else {
            return GrammarMatch::NoMatch;
        };

        let title = caps
            .name("title")
            .map(|t| t.as_str().trim().trim_end_matches(',').trim().to_string())
            .filter(|t| !t.is_empty());

        GrammarMatch::Matched {
            variant: self.variant,
            authors: authors.as_str().trim().to_string(),
            title,
            source_remainder: text[source.start()..].trim().to_string(),
        }
    }
}

/// Parses reference text into a [`ParsedCitation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CitationParser {
    forced: Option<GrammarVariant>,
}

impl CitationParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try only `variant` instead of the whole priority list
    pub fn force(mut self, variant: Option<GrammarVariant>) -> Self {
        self.forced = variant;
        self
    }

    /// Find an embedded arXiv identifier
    pub fn extract_identifier(text: &str) -> Option<String> {
        PREFIXED_ID
            .captures(text)
            .or_else(|| BARE_OLD_ID.captures(text))
            .and_then(|caps| caps.name("id"))
            .map(|m| m.as_str().to_string())
    }

    /// Parse a reference.
    ///
    /// An embedded identifier wins over the grammars. Otherwise the first
    /// grammar that matches decides the fields.
    pub fn parse(&self, text: &str) -> Result<ParsedCitation, ParseError> {
        let text = text.trim();

        if let Some(external_id) = Self::extract_identifier(text) {
            tracing::debug!("Reference carries identifier {}", external_id);
            return Ok(ParsedCitation::Identifier { external_id });
        }

        let grammars: Vec<&Grammar> = match self.forced {
            Some(variant) => vec![Grammar::get(variant)],
            None => GRAMMARS.iter().collect(),
        };

        for grammar in grammars {
            if let GrammarMatch::Matched {
                variant,
                authors,
                title,
                source_remainder,
            } = grammar.apply(text)
            {
                tracing::debug!("Matched {} grammar: authors={:?} title={:?}", variant, authors, title);
                return Ok(ParsedCitation::Fields {
                    variant,
                    authors,
                    title,
                    source_remainder,
                });
            }
        }

        Err(ParseError::NoMatch {
            raw: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANKS: &str = "T. Banks and E. Rabinovici, Finite Temperature Behavior of the Lattice Abelian Higgs Model, Nucl. Phys. B 160 (1979) 349–379";
    const MINAMI: &str = "K. Minami, Infinite number of solvable generalizations of xy-chain, with cluster state, and with central charge c=m/2, Nucl. Phys. B 925, 144 (2017).";

    fn fields(parsed: ParsedCitation) -> (GrammarVariant, String, Option<String>, String) {
        match parsed {
            ParsedCitation::Fields {
                variant,
                authors,
                title,
                source_remainder,
            } => (variant, authors, title, source_remainder),
            other => panic!("expected fields, got {:?}", other),
        }
    }

    #[test]
    fn test_two_authors_unquoted() {
        let (variant, authors, title, source) = fields(CitationParser::new().parse(BANKS).unwrap());
        assert_eq!(variant, GrammarVariant::UnquotedTitle);
        assert_eq!(authors, "T. Banks and E. Rabinovici");
        assert_eq!(
            title.as_deref(),
            Some("Finite Temperature Behavior of the Lattice Abelian Higgs Model")
        );
        assert_eq!(source, "Nucl. Phys. B 160 (1979) 349–379");
    }

    #[test]
    fn test_title_with_internal_commas() {
        let (_, authors, title, source) = fields(CitationParser::new().parse(MINAMI).unwrap());
        assert_eq!(authors, "K. Minami");
        assert_eq!(
            title.as_deref(),
            Some("Infinite number of solvable generalizations of xy-chain, with cluster state, and with central charge c=m/2")
        );
        assert_eq!(source, "Nucl. Phys. B 925, 144 (2017).");
    }

    #[test]
    fn test_identifier_short_circuit() {
        let text = "Y. Choi, B. C. Rayhaun, and Y. Zheng, Generalized Tube Algebras, Symmetry-Resolved Partition Functions, and Twisted Boundary States, arXiv:2409.02159";
        let parsed = CitationParser::new().parse(text).unwrap();
        assert_eq!(parsed.external_id(), Some("2409.02159"));
        assert!(parsed.title().is_none());
    }

    #[test]
    fn test_identifier_forms() {
        assert_eq!(
            CitationParser::extract_identifier("SciPost Phys. 8 (2020), no. 1 015, [arXiv:1712.09542]").as_deref(),
            Some("1712.09542")
        );
        assert_eq!(
            CitationParser::extract_identifier("lectures, arXiv:2209.05132.").as_deref(),
            Some("2209.05132")
        );
        assert_eq!(
            CitationParser::extract_identifier("Nucl. Phys. B (1999), hep-th/9901001").as_deref(),
            Some("hep-th/9901001")
        );
        assert_eq!(
            CitationParser::extract_identifier("ar-Xiv: math.GT/0104020v2").as_deref(),
            Some("math.GT/0104020v2")
        );
        assert!(CitationParser::extract_identifier(BANKS).is_none());
    }

    #[test]
    fn test_quoted_title() {
        let text = "A. B. Zamolodchikov, \"Irreversibility of the flux of the renormalization group in a 2D field theory,\" JETP Lett. 43, 730 (1986).";
        let (variant, authors, title, _) = fields(CitationParser::new().parse(text).unwrap());
        assert_eq!(variant, GrammarVariant::QuotedTitle);
        assert_eq!(authors, "A. B. Zamolodchikov");
        assert_eq!(
            title.as_deref(),
            Some("Irreversibility of the flux of the renormalization group in a 2D field theory")
        );
    }

    #[test]
    fn test_curly_quoted_title() {
        let text = "J. Cardy, “Operator content of two-dimensional conformally invariant theories”, Nucl. Phys. B 270, 186 (1986).";
        let (variant, _, title, _) = fields(CitationParser::new().parse(text).unwrap());
        assert_eq!(variant, GrammarVariant::QuotedTitle);
        assert_eq!(
            title.as_deref(),
            Some("Operator content of two-dimensional conformally invariant theories")
        );
    }

    #[test]
    fn test_no_title_form() {
        let text = "E. Witten, Commun. Math. Phys. 121, 351 (1989).";
        let (variant, authors, title, source) = fields(CitationParser::new().parse(text).unwrap());
        assert_eq!(variant, GrammarVariant::NoTitle);
        assert_eq!(authors, "E. Witten");
        assert!(title.is_none());
        assert_eq!(source, "Commun. Math. Phys. 121, 351 (1989).");
    }

    #[test]
    fn test_oxford_comma_authors_stay_together() {
        let text = "Y. Choi, B. C. Rayhaun, and Y. Zheng, Generalized Tube Algebras, Phys. Rev. B 110, 045101 (2024).";
        let (_, authors, title, _) = fields(CitationParser::new().parse(text).unwrap());
        assert_eq!(authors, "Y. Choi, B. C. Rayhaun, and Y. Zheng");
        assert_eq!(title.as_deref(), Some("Generalized Tube Algebras"));
    }

    #[test]
    fn test_forced_variant() {
        let parser = CitationParser::new().force(Some(GrammarVariant::QuotedTitle));
        assert!(parser.parse(BANKS).is_err());

        // Forcing the no-title form reads the title as part of the source
        let parser = CitationParser::new().force(Some(GrammarVariant::NoTitle));
        let (variant, authors, title, source) = fields(parser.parse(BANKS).unwrap());
        assert_eq!(variant, GrammarVariant::NoTitle);
        assert_eq!(authors, "T. Banks and E. Rabinovici");
        assert!(title.is_none());
        assert!(source.starts_with("Finite Temperature"));
    }

    #[test]
    fn test_unparseable_reports_raw_text() {
        let text = "Private communication with the authors";
        match CitationParser::new().parse(text) {
            Err(ParseError::NoMatch { raw }) => assert_eq!(raw, text),
            other => panic!("expected NoMatch, got {:?}", other),
        }
    }

    #[test]
    fn test_grammar_apply_no_match() {
        let grammar = Grammar::get(GrammarVariant::QuotedTitle);
        assert_eq!(grammar.variant(), GrammarVariant::QuotedTitle);
        assert_eq!(grammar.apply(BANKS), GrammarMatch::NoMatch);
    }
}
