//! # arxref
//!
//! Resolve a numbered entry in a paper's bibliography to an arXiv listing,
//! choose among the candidates interactively, and fetch the document.
//!
//! ## Architecture
//!
//! Data flows left to right through the modules:
//!
//! - [`utils::PdfDocument`]: page text of the citing paper
//! - [`reference`]: locate the `[n]` block, parse it, build a query
//! - [`sources`]: repository clients behind the [`sources::RepositoryClient`] trait
//! - [`utils::SimilarityRanker`]: order candidates by title closeness
//! - [`resolver`]: the interactive selection state machine
//! - [`utils::ArtifactFetcher`]: download the chosen document
//!
//! [`lookup`] chains the first four; [`config`] carries the settings every
//! stage is built from.

pub mod config;
pub mod lookup;
pub mod models;
pub mod reference;
pub mod resolver;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use lookup::{Lookup, LookupError, LookupOutcome, ReferenceTarget};
pub use models::{CandidateEntry, ParsedCitation, SearchQuery};
pub use sources::{RepositoryClient, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
