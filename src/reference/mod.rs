//! Reference handling: locating an entry, parsing it, and turning it into a query.
//!
//! - [`ReferenceLocator`]: finds the block for `[n]` in paginated document text
//! - [`CitationParser`]: identifier short-circuit, then the citation grammars
//! - [`QueryBuilder`]: surname and title terms for the repository search

mod locator;
mod parser;
mod query;

pub use locator::ReferenceLocator;
pub use parser::{CitationParser, Grammar, GrammarMatch};
pub use query::QueryBuilder;

/// Errors from locating a reference block
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("Reference [{number}] not found in the document")]
    NotFound { number: u32 },

    #[error("Reference has {available} ';'-separated part(s), part {index} requested")]
    SegmentOutOfRange { index: usize, available: usize },
}

/// Errors from parsing a reference block
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("No citation pattern matched the reference text:\n{raw}")]
    NoMatch { raw: String },
}
