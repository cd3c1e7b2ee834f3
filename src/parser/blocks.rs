//! Block extraction from rendered manual pages
//!
//! Manual viewers render each page as a `div.pdf` container full of
//! absolutely-positioned text fragments whose source order has nothing to do
//! with visual order. Extraction therefore resorts fragments by their pixel
//! position to reconstruct top-to-bottom, left-to-right reading order, then
//! filters out headings, page furniture, and tabular specification data that
//! are not instructional steps.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::TextBlock;
use crate::parser::style::parse_style;

/// Fragments at or above this font size are headings/titles, not steps
const HEADING_FONT_SIZE: i32 = 24;

/// Fragments shorter than this are too short to be an instructional sentence
const MIN_STEP_CHARS: usize = 20;

/// Extracts step text from rendered manual page HTML
///
/// Pure function of its input; holds only precompiled selectors and the
/// table-data regex, so a single instance is reused across all extractions.
pub struct BlockExtractor {
    container: Selector,
    fragments: Selector,
    table_data: Regex,
}

impl BlockExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            // Selector/Regex literals are fixed at compile time, so parsing
            // cannot fail at runtime.
            container: Selector::parse("div.pdf").unwrap(),
            fragments: Selector::parse("div, h2, h3").unwrap(),
            table_data: Regex::new(r"^[0-9.,/]+$").unwrap(),
        }
    }

    /// Extract filtered steps in reading order
    ///
    /// Returns an empty vector when the page has no `div.pdf` container;
    /// many pages legitimately have no extractable content.
    pub fn extract_steps(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);

        let Some(container) = document.select(&self.container).next() else {
            return Vec::new();
        };

        let mut blocks = self.collect_blocks(container);

        // Reading order: top-to-bottom, then left-to-right. Stable sort keeps
        // source order for fragments sharing a position.
        blocks.sort_by_key(|b| (b.top, b.left));

        blocks
            .into_iter()
            .filter(|b| self.is_step(b))
            .map(|b| b.text)
            .collect()
    }

    /// Gather positioned text fragments from the content container
    fn collect_blocks(&self, container: ElementRef<'_>) -> Vec<TextBlock> {
        let mut blocks = Vec::new();

        for el in container.select(&self.fragments) {
            let text = collect_text(el);
            if text.is_empty() {
                continue;
            }

            let style = el.value().attr("style").unwrap_or("");
            let props = parse_style(style);

            blocks.push(TextBlock {
                text,
                top: props.top,
                left: props.left,
                font_size: props.font_size,
            });
        }

        blocks
    }

    /// Heuristic filter separating instructional steps from page furniture
    fn is_step(&self, block: &TextBlock) -> bool {
        if block.font_size >= HEADING_FONT_SIZE {
            return false;
        }

        if self.table_data.is_match(&block.text) {
            return false;
        }

        block.text.chars().count() >= MIN_STEP_CHARS
    }
}

impl Default for BlockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Concatenate an element's text nodes, trimming each segment
fn collect_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
