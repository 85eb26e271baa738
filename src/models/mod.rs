//! Core data models for references, queries and candidates.

mod candidate;
mod citation;

pub use candidate::{document_url, CandidateEntry};
pub use citation::{GrammarVariant, ParsedCitation, QueryTerm, ReferenceBlock, SearchQuery};
