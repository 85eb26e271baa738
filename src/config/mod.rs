//! Configuration management.
//!
//! Values come from defaults, then an optional TOML file, then `ARXREF_*`
//! environment variables (nested keys use `__`, e.g.
//! `ARXREF_ARXIV__MAX_RESULTS=20`).
//!
//! ```toml
//! [arxiv]
//! api_url = "https://export.arxiv.org/api/query"
//! max_results = 10
//! search_timeout_secs = 10
//! download_timeout_secs = 30
//!
//! [query]
//! min_term_len = 2
//!
//! [ranking]
//! min_similarity = 0.0
//!
//! [downloads]
//! directory = "."
//!
//! [viewer]
//! programs = ["mupdf", "zathura", "evince"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "ARXREF";

/// arXiv allows at most this many results per request
pub const MAX_RESULTS_LIMIT: usize = 200;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub arxiv: ArxivConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub ranking: RankingConfig,

    #[serde(default)]
    pub downloads: DownloadConfig,

    #[serde(default)]
    pub viewer: ViewerConfig,
}

/// Repository endpoint and request limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArxivConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_search_timeout")]
    pub search_timeout_secs: u64,

    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            max_results: default_max_results(),
            search_timeout_secs: default_search_timeout(),
            download_timeout_secs: default_download_timeout(),
        }
    }
}

impl ArxivConfig {
    /// Result count sent to the API, within `1..=MAX_RESULTS_LIMIT`
    pub fn effective_max_results(&self) -> usize {
        self.max_results.clamp(1, MAX_RESULTS_LIMIT)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

fn default_api_url() -> String {
    "https://export.arxiv.org/api/query".to_string()
}

fn default_max_results() -> usize {
    10
}

fn default_search_timeout() -> u64 {
    10
}

fn default_download_timeout() -> u64 {
    30
}

/// Query construction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Shortest author or title token kept as a search term
    #[serde(default = "default_min_term_len")]
    pub min_term_len: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            min_term_len: default_min_term_len(),
        }
    }
}

fn default_min_term_len() -> usize {
    2
}

/// Similarity ranking settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Candidates scoring below this are hidden when a title is known; 0 disables
    #[serde(default)]
    pub min_similarity: f64,
}

/// Download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_download_dir")]
    pub directory: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: default_download_dir(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

/// External document viewer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Program names probed on `PATH`, first found wins
    #[serde(default = "default_viewer_programs")]
    pub programs: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            programs: default_viewer_programs(),
        }
    }
}

fn default_viewer_programs() -> Vec<String> {
    ["mupdf", "zathura", "evince", "okular", "xdg-open", "open"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Find a configuration file in the usual places.
///
/// Checks `<config dir>/arxref/config.toml`, then `./arxref.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let candidates = [
        dirs::config_dir().map(|d| d.join("arxref").join("config.toml")),
        Some(PathBuf::from("arxref.toml")),
    ];
    candidates.into_iter().flatten().find(|p| p.is_file())
}

/// `ARXREF_<TABLE>__<KEY>` variables
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    load_with_environment(path, environment())
}

fn load_with_environment(
    path: Option<&Path>,
    environment: config::Environment,
) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    builder
        .add_source(environment)
        .build()?
        .try_deserialize()
}
