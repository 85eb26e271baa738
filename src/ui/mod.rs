//! Terminal output for the interactive lookup.
//!
//! Rendering functions write to any [`Write`] so the resolver loop can be
//! exercised against a buffer; color is opt-in per call.

use owo_colors::OwoColorize;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use crate::models::CandidateEntry;

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    io::stdout().is_terminal()
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Download,
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Download => "↓",
    }
}

/// Write a one-line status message with its icon
pub fn write_status(out: &mut impl Write, status: Status, msg: &str, color: bool) -> io::Result<()> {
    let icon = status_icon(status);
    if !color {
        return writeln!(out, "{} {}", icon, msg);
    }
    match status {
        Status::Success => writeln!(out, "{} {}", icon.green().bold(), msg),
        Status::Error => writeln!(out, "{} {}", icon.red().bold(), msg),
        Status::Warning => writeln!(out, "{} {}", icon.yellow().bold(), msg),
        Status::Info => writeln!(out, "{} {}", icon.cyan().bold(), msg),
        Status::Download => writeln!(out, "{} {}", icon.magenta(), msg),
    }
}

/// Render one disclosed candidate.
///
/// ```text
/// [1]  Finite Temperature Behavior of the Lattice Abelian Higgs Model (similarity 97.3)
///      by T. Banks, E. Rabinovici (http://arxiv.org/abs/...)
/// ```
pub fn write_entry(
    out: &mut impl Write,
    index: usize,
    entry: &CandidateEntry,
    color: bool,
) -> io::Result<()> {
    let marker = format!("[{}]", index);
    let score = entry
        .similarity
        .map(|s| format!(" (similarity {:.1})", s))
        .unwrap_or_default();

    if color {
        writeln!(out, "{}  {}{}", marker.cyan().bold(), entry.title.bold(), score.dimmed())?;
        writeln!(
            out,
            "     by {} ({})",
            entry.author_line(),
            entry.identifier_url.blue().underline()
        )
    } else {
        writeln!(out, "{}  {}{}", marker, entry.title, score)?;
        writeln!(out, "     by {} ({})", entry.author_line(), entry.identifier_url)
    }
}

/// Non-interactive listing of every candidate.
pub fn write_listing(out: &mut impl Write, entries: &[CandidateEntry], color: bool) -> io::Result<()> {
    for (i, entry) in entries.iter().enumerate() {
        write_entry(out, i + 1, entry, color)?;
        writeln!(out, "     pdf: {}", entry.document_url)?;
    }
    Ok(())
}

/// Prompt shown while `disclosed` of `total` candidates are visible
pub fn prompt_text(total: usize, disclosed: usize) -> String {
    if total == 1 {
        "command (dl [1]st/[q]uit): ".to_string()
    } else {
        format!("command ([m]ore/dl [1-{}]/[q]uit): ", disclosed)
    }
}

/// Indeterminate spinner on stderr, hidden when stderr is not a terminal.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        if !io::stderr().is_terminal() {
            return Self {
                pb: indicatif::ProgressBar::hidden(),
            };
        }

        let pb = indicatif::ProgressBar::new_spinner();
        if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Remove the spinner line.
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::make_entry;

    fn render(entry: &CandidateEntry) -> String {
        let mut buf = Vec::new();
        write_entry(&mut buf, 3, entry, false).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_status_icon() {
        assert_eq!(status_icon(Status::Success), "✓");
        assert_eq!(status_icon(Status::Error), "✗");
        assert_eq!(status_icon(Status::Download), "↓");
    }

    #[test]
    fn test_entry_layout() {
        let text = render(&make_entry("1234.5678", "A Title"));
        assert_eq!(
            text,
            "[3]  A Title\n     by Test Author (http://arxiv.org/abs/1234.5678)\n"
        );
    }

    #[test]
    fn test_entry_shows_score() {
        let mut entry = make_entry("1234.5678", "A Title");
        entry.similarity = Some(87.31);
        assert!(render(&entry).starts_with("[3]  A Title (similarity 87.3)"));
    }

    #[test]
    fn test_prompt_text() {
        assert_eq!(prompt_text(1, 1), "command (dl [1]st/[q]uit): ");
        assert_eq!(prompt_text(12, 6), "command ([m]ore/dl [1-6]/[q]uit): ");
    }

    #[test]
    fn test_listing_includes_document_url() {
        let mut buf = Vec::new();
        write_listing(&mut buf, &[make_entry("1", "One"), make_entry("2", "Two")], false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("[2]  Two"));
        assert!(text.contains("pdf: http://arxiv.org/pdf/2.pdf"));
    }

    #[test]
    fn test_plain_status() {
        let mut buf = Vec::new();
        write_status(&mut buf, Status::Warning, "careful", false).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "⚠ careful\n");
    }
}
