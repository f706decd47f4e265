//! Header/footer classification.

use super::config::{ConverterConfig, HeaderPattern};
use crate::model::Block;

/// Decides whether a block is page furniture to drop from the output.
///
/// Implemented for any `Fn(&Block) -> bool`, so tests and callers can pass
/// a closure instead of writing a type.
pub trait BlockFilter {
    /// Return `true` to drop the block.
    fn matches(&self, block: &Block) -> bool;
}

impl<F> BlockFilter for F
where
    F: Fn(&Block) -> bool,
{
    fn matches(&self, block: &Block) -> bool {
        self(block)
    }
}

/// Positional and lexical running header/footer test.
///
/// A block is dropped only if it is a text block starting above the cutoff
/// *and* its flattened text matches one of the patterns. Other top-of-page
/// text is kept.
#[derive(Debug, Clone)]
pub struct HeaderFooterFilter {
    y_cutoff: f32,
    patterns: Vec<HeaderPattern>,
}

impl HeaderFooterFilter {
    /// Create a filter from a cutoff and patterns.
    pub fn new(y_cutoff: f32, patterns: Vec<HeaderPattern>) -> Self {
        Self { y_cutoff, patterns }
    }

    /// Create a filter from the converter configuration.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(config.header_y_cutoff, config.header_patterns.clone())
    }

    /// Check whether the block lies in the header band.
    pub fn is_candidate(&self, block: &Block) -> bool {
        block.bbox.y0 < self.y_cutoff && block.is_text()
    }
}

impl Default for HeaderFooterFilter {
    fn default() -> Self {
        Self::from_config(&ConverterConfig::default())
    }
}

impl BlockFilter for HeaderFooterFilter {
    fn matches(&self, block: &Block) -> bool {
        if !self.is_candidate(block) {
            return false;
        }
        let text = block.flattened_text();
        self.patterns.iter().any(|p| p.matches(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Line, Span};

    fn text_block(y0: f32, text: &str) -> Block {
        Block::text(
            BBox::new(50.0, y0, 300.0, y0 + 20.0),
            vec![Line::from_text(text)],
        )
    }

    #[test]
    fn test_default_patterns() {
        let filter = HeaderFooterFilter::default();
        assert!(filter.matches(&text_block(
            40.0,
            "ArtConnect Panduan GL01A Halaman 3 dari 10"
        )));
        assert!(filter.matches(&text_block(10.0, "ArtConnect - Panduan GL01A")));
        assert!(filter.matches(&text_block(99.9, "Halaman 7 dari 12")));
    }

    #[test]
    fn test_non_matching_top_text_is_kept() {
        let filter = HeaderFooterFilter::default();
        assert!(!filter.matches(&text_block(40.0, "BAB I PENDAHULUAN")));
        assert!(!filter.matches(&text_block(40.0, "ArtConnect")));
    }

    #[test]
    fn test_below_cutoff_is_never_a_header() {
        let filter = HeaderFooterFilter::default();
        assert!(!filter.matches(&text_block(100.0, "Halaman 3 dari 10")));
        assert!(!filter.matches(&text_block(700.0, "ArtConnect Panduan GL01A")));
    }

    #[test]
    fn test_images_are_never_headers() {
        let filter = HeaderFooterFilter::default();
        let image = Block::image(BBox::new(0.0, 10.0, 100.0, 60.0));
        assert!(!filter.is_candidate(&image));
        assert!(!filter.matches(&image));
    }

    #[test]
    fn test_pattern_split_across_spans() {
        let filter = HeaderFooterFilter::default();
        let block = Block::text(
            BBox::new(50.0, 30.0, 300.0, 60.0),
            vec![
                Line::new(vec![Span::new("Art"), Span::new("Connect")]),
                Line::new(vec![Span::new("Halaman"), Span::new("2"), Span::new("dari")]),
            ],
        );
        // Spans are joined with spaces, so "Art Connect" no longer matches
        // the first pattern, but the second still does
        assert!(filter.matches(&block));
        let only_first = HeaderFooterFilter::new(
            100.0,
            vec![HeaderPattern::new(["ArtConnect", "Panduan GL01A"])],
        );
        assert!(!only_first.matches(&block));
    }

    #[test]
    fn test_closure_filter() {
        let filter = |block: &Block| block.text_content().starts_with("DRAFT");
        assert!(filter.matches(&text_block(500.0, "DRAFT copy")));
        assert!(!filter.matches(&text_block(500.0, "Final copy")));
    }
}
