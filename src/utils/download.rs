//! Downloading a selected candidate's document.

use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tempfile::NamedTempFile;

use crate::config::Config;
use crate::models::CandidateEntry;
use crate::sources::SourceError;
use crate::utils::HttpClient;

/// Leading bytes of every PDF file
pub const PDF_MAGIC: &[u8] = b"%PDF";

/// Longest title prefix kept in a file name
const TITLE_PREFIX_LEN: usize = 40;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("static regex"));
static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\s|-)+").expect("static regex"));

/// Result of a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The document was downloaded to this path
    Downloaded(PathBuf),
    /// A file with the target name already existed; nothing was fetched
    AlreadyPresent(PathBuf),
}

impl FetchOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FetchOutcome::Downloaded(path) | FetchOutcome::AlreadyPresent(path) => path,
        }
    }
}

/// Local file name for a candidate: `<id-suffix>_<title prefix>.pdf`.
pub fn artifact_file_name(entry: &CandidateEntry) -> String {
    let cleaned = UNSAFE_CHARS.replace_all(&entry.title, "");
    let joined = SEPARATOR_RUNS.replace_all(&cleaned, "_");
    let prefix: String = joined.trim_matches('_').chars().take(TITLE_PREFIX_LEN).collect();
    format!("{}_{}.pdf", entry.id_suffix(), prefix)
}

/// Fetches candidate documents into a local directory.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    client: Arc<HttpClient>,
    directory: PathBuf,
    timeout: Duration,
}

impl ArtifactFetcher {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        Ok(Self::with_client(Arc::new(HttpClient::new()?), config))
    }

    /// Create with a shared HTTP client
    pub fn with_client(client: Arc<HttpClient>, config: &Config) -> Self {
        Self {
            client,
            directory: config.downloads.directory.clone(),
            timeout: config.arxiv.download_timeout(),
        }
    }

    /// Override the destination directory
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Where `entry` is (or would be) stored
    pub fn target_path(&self, entry: &CandidateEntry) -> PathBuf {
        self.directory.join(artifact_file_name(entry))
    }

    /// Download `entry`'s document unless a file of the same name exists.
    ///
    /// The body is written to a temporary file next to the destination and
    /// only renamed onto the final name once it looks like a PDF.
    pub async fn fetch(&self, entry: &CandidateEntry) -> Result<FetchOutcome, SourceError> {
        let path = self.target_path(entry);
        if path.exists() {
            tracing::info!("{} already exists, skipping download", path.display());
            return Ok(FetchOutcome::AlreadyPresent(path));
        }

        tracing::info!("Downloading {}", entry.document_url);
        let response = self
            .client
            .get(&entry.document_url)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "Download of {} returned status: {}",
                entry.document_url,
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(SourceError::InvalidArtifact {
                url: entry.document_url.clone(),
                reason: "response is not a PDF document".to_string(),
            });
        }

        std::fs::create_dir_all(&self.directory)?;
        let mut staged = NamedTempFile::new_in(&self.directory)?;
        staged.write_all(&bytes)?;
        staged.flush()?;
        staged.persist(&path)?;

        tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(FetchOutcome::Downloaded(path))
    }
}
