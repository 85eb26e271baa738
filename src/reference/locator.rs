//! Locating a numbered entry in a document's reference list.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::ReferenceBlock;
use crate::reference::LocateError;

/// Any line that opens a reference entry, e.g. `[12] A. Author, ...`
static ENTRY_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[\d+\]").expect("static regex"));

/// Finds the text span of one reference in paginated document text.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceLocator {
    number: u32,
    depth: usize,
}

impl ReferenceLocator {
    /// Locator for reference `[number]`, using the last matching page
    pub fn new(number: u32) -> Self {
        Self { number, depth: 1 }
    }

    /// Use the `depth`-th matching page counted from the end of the document.
    ///
    /// Papers with an appendix bibliography, or with a supplement appended
    /// after the main references, can carry the same marker more than once.
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth.max(1);
        self
    }

    fn marker(&self) -> String {
        format!("[{}]", self.number)
    }

    /// Whether `page` opens a list entry with this locator's marker.
    ///
    /// For `[1]` any line starting with the marker counts. For higher
    /// numbers the marker must also follow a boundary (page start, a blank
    /// line or a line ending in `.`), so a wrapped in-text citation such as
    /// `... as shown in` / `[3] and ...` is not taken for an entry.
    pub fn page_has_marker(&self, page: &str) -> bool {
        let marker = self.marker();
        let lines: Vec<&str> = page.lines().collect();
        (0..lines.len()).any(|i| self.is_entry_line(&lines, i, &marker))
    }

    /// Whether `lines[i]` opens this locator's entry under the boundary rule.
    fn is_entry_line(&self, lines: &[&str], i: usize, marker: &str) -> bool {
        if !lines[i].trim_start().starts_with(marker) {
            return false;
        }
        if self.number == 1 || i == 0 {
            return true;
        }
        let prev = lines[i - 1].trim_end();
        prev.is_empty() || prev.ends_with('.')
    }

    /// Index of the page holding the entry, scanning backwards.
    fn find_page(&self, pages: &[String]) -> Option<usize> {
        let mut found = 0;
        let mut last_match = None;

        for (index, page) in pages.iter().enumerate().rev() {
            if self.page_has_marker(page) {
                found += 1;
                last_match = Some(index);
                if found >= self.depth {
                    return last_match;
                }
            }
        }

        if let Some(index) = last_match {
            tracing::warn!(
                "Only {} page(s) carry {}; using page {} instead of match #{}",
                found,
                self.marker(),
                index + 1,
                self.depth
            );
        }
        last_match
    }

    /// Locate the reference block in `pages`.
    ///
    /// The located page and the one after it are scanned, so an entry that
    /// continues across a page break is returned whole.
    pub fn locate(&self, pages: &[String]) -> Result<ReferenceBlock, LocateError> {
        let not_found = || LocateError::NotFound {
            number: self.number,
        };
        let page = self.find_page(pages).ok_or_else(not_found)?;
        let end_page = (page + 2).min(pages.len());

        let lines: Vec<&str> = pages[page..end_page]
            .iter()
            .flat_map(|p| p.lines())
            .collect();

        let marker = self.marker();
        let start = (0..lines.len())
            .find(|&i| self.is_entry_line(&lines, i, &marker))
            .ok_or_else(not_found)?;
        let end = lines[start + 1..]
            .iter()
            .position(|line| ENTRY_START.is_match(line))
            .map_or(lines.len(), |offset| start + 1 + offset);

        tracing::debug!("Found reference on page {}: {}", page + 1, lines[start]);

        Ok(ReferenceBlock::new(
            self.number,
            lines[start..end].iter().map(|s| s.to_string()).collect(),
        ))
    }
}
