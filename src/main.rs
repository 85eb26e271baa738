use anyhow::{Context, Result};
use arxref::config::{find_config_file, load_config, Config};
use arxref::models::GrammarVariant;
use arxref::resolver::{self, Resolution, ResolutionSession};
use arxref::sources::ArxivClient;
use arxref::ui::{self, Spinner, Status};
use arxref::utils::{
    open_in_viewer, ArtifactFetcher, FetchOutcome, HttpClient, PathViewerLookup, PdfDocument,
    ViewerLookup,
};
use arxref::{Lookup, ReferenceTarget};
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// arxref - find the arXiv entry behind a numbered reference and fetch it
#[derive(Parser, Debug)]
#[command(name = "arxref")]
#[command(version = arxref::VERSION)]
#[command(author = "hongkongkiwi")]
#[command(about = "Resolve a bibliography reference to an arXiv paper and download it", long_about = None)]
struct Cli {
    /// PDF of the citing paper, or a bare arXiv identifier
    target: String,

    /// Reference number [n] to look up (required with a document)
    refnum: Option<u32>,

    /// Only try this citation pattern
    #[arg(long, short, value_enum)]
    pattern: Option<Pattern>,

    /// Use the k-th page from the end that lists the reference
    #[arg(long, short, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    depth: u32,

    /// Pick this ';'-separated part of a composite reference (1-based)
    #[arg(long, short, value_parser = clap::value_parser!(u32).range(1..))]
    inner: Option<u32>,

    /// Maximum number of candidates requested from arXiv
    #[arg(long, short = 'n')]
    max_results: Option<usize>,

    /// Directory downloads are written to
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Hide candidates whose title similarity is below this score (0-100)
    #[arg(long)]
    min_similarity: Option<f64>,

    /// Print all candidates and exit without prompting
    #[arg(long, conflicts_with = "json")]
    list: bool,

    /// Print all candidates as JSON and exit without prompting
    #[arg(long)]
    json: bool,

    /// Download without opening a viewer
    #[arg(long)]
    no_open: bool,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Citation pattern selectable on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Pattern {
    /// Authors, "Title", Source
    #[value(name = "quoted", alias = "1")]
    Quoted,
    /// Authors, Title, Source
    #[value(name = "unquoted", alias = "2")]
    Unquoted,
    /// Authors, Source
    #[value(name = "no-title", alias = "3")]
    NoTitle,
}

impl From<Pattern> for GrammarVariant {
    fn from(pattern: Pattern) -> Self {
        match pattern {
            Pattern::Quoted => GrammarVariant::QuotedTitle,
            Pattern::Unquoted => GrammarVariant::UnquotedTitle,
            Pattern::NoTitle => GrammarVariant::NoTitle,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("arxref={}", level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Config file and environment, then command-line overrides
fn load_settings(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().or_else(find_config_file);
    if let Some(path) = &path {
        tracing::info!("Using config file: {}", path.display());
    }

    let mut config = load_config(path.as_deref()).context("Failed to load configuration")?;
    if let Some(max_results) = cli.max_results {
        config.arxiv.max_results = max_results;
    }
    if let Some(dir) = &cli.dir {
        config.downloads.directory = dir.clone();
    }
    if let Some(min_similarity) = cli.min_similarity {
        config.ranking.min_similarity = min_similarity;
    }
    Ok(config)
}

fn open_document(
    viewers: &impl ViewerLookup,
    path: &Path,
    out: &mut impl Write,
    color: bool,
) -> Result<()> {
    match viewers.find() {
        Some(viewer) => open_in_viewer(&viewer, path)
            .with_context(|| format!("Failed to launch {}", viewer.display())),
        None => {
            tracing::warn!("No document viewer found on PATH");
            ui::write_status(
                out,
                Status::Warning,
                &format!("No viewer found; the document is at {}", path.display()),
                color,
            )?;
            Ok(())
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_settings(&cli)?;
    let color = ui::is_terminal();
    let mut out = io::stdout();

    let http = Arc::new(HttpClient::new()?);
    let repository = Arc::new(ArxivClient::with_client(http.clone(), &config.arxiv));
    let lookup = Lookup::new(&config, repository).force_variant(cli.pattern.map(Into::into));

    let document = Path::new(&cli.target);
    let outcome = if document.is_file() {
        let number = cli
            .refnum
            .context("A reference number is required when TARGET is a document")?;
        let target = ReferenceTarget {
            number,
            depth: cli.depth as usize,
            inner: cli.inner.map(|i| i as usize),
        };

        let spinner = Spinner::new(&format!("Looking up [{}] in {}", number, document.display()));
        let result = lookup.resolve_document(&PdfDocument::new(document), &target).await;
        spinner.finish();
        result?
    } else {
        if cli.refnum.is_some() {
            tracing::warn!("{} is not a file; ignoring the reference number", cli.target);
        }
        let spinner = Spinner::new(&format!("Looking up arXiv:{}", cli.target));
        let result = lookup.resolve_identifier(&cli.target).await;
        spinner.finish();
        result?
    };

    tracing::info!("Query: {}", outcome.query);
    if outcome.candidates.is_empty() {
        ui::write_status(&mut out, Status::Warning, "no results", color)?;
        return Ok(ExitCode::FAILURE);
    }

    if cli.json {
        serde_json::to_writer_pretty(&mut out, &outcome.candidates)?;
        writeln!(out)?;
        return Ok(ExitCode::SUCCESS);
    }
    if cli.list {
        ui::write_listing(&mut out, &outcome.candidates, color)?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(session) = ResolutionSession::new(outcome.candidates) else {
        return Ok(ExitCode::FAILURE);
    };
    let mut input = resolver::spawn_stdin_reader();
    let entry = match resolver::run(session, &mut input, resolver::ctrl_c(), &mut out, color).await? {
        Resolution::Selected(entry) => entry,
        Resolution::Quit | Resolution::EndOfInput | Resolution::Interrupted => {
            return Ok(ExitCode::SUCCESS)
        }
    };

    let fetcher = ArtifactFetcher::with_client(http, &config);
    let spinner = Spinner::new(&format!("Downloading {}", entry.document_url));
    let fetched = fetcher.fetch(&entry).await;
    spinner.finish();

    let fetched = fetched?;
    match &fetched {
        FetchOutcome::Downloaded(path) => ui::write_status(
            &mut out,
            Status::Download,
            &format!("Saved {}", path.display()),
            color,
        )?,
        FetchOutcome::AlreadyPresent(path) => ui::write_status(
            &mut out,
            Status::Info,
            &format!("{} already present", path.display()),
            color,
        )?,
    }

    if !cli.no_open {
        open_document(&PathViewerLookup::new(&config.viewer), fetched.path(), &mut out, color)?;
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            let color = io::IsTerminal::is_terminal(&io::stderr());
            let _ = ui::write_status(&mut io::stderr(), Status::Error, &format!("{:#}", e), color);
            ExitCode::FAILURE
        }
    }
}
