//! Page-by-page conversion.

use std::fmt;
use std::ops::Range;

use super::config::{ConverterConfig, EmptyRangePolicy};
use super::filter::{BlockFilter, HeaderFooterFilter};
use super::fragment::Fragment;
use super::sink::{FileSink, MemorySink, OutputSink, WriteMode};
use crate::error::{Error, Result};
use crate::model::{BlockContent, Page};
use crate::parser::{BlockSource, PdfBackend};

/// Half-open range of 0-based page indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    /// First page index
    pub start: usize,
    /// One past the last page index
    pub end: usize,
}

impl PageRange {
    /// Create a range; no validation is done here.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Every page of a document with `page_count` pages.
    pub fn all(page_count: usize) -> Self {
        Self::new(0, page_count)
    }

    /// Limit `end` to the page count.
    pub fn clamp(self, page_count: usize) -> Self {
        Self {
            start: self.start,
            end: self.end.min(page_count),
        }
    }

    /// Check if the range selects no pages (including inverted ranges).
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Number of selected pages.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Page indices in order.
    pub fn indices(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for PageRange {
    /// Human-readable, 1-based: `pages 3 to 10`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pages {} to {}", self.start + 1, self.end)
    }
}

/// What a conversion did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionReport {
    /// The clamped range that was processed
    pub range: PageRange,
    /// Pages processed
    pub pages: usize,
    /// Text paragraphs written
    pub text_blocks: usize,
    /// Image placeholders written
    pub images: usize,
    /// Blocks dropped as running headers/footers
    pub headers_skipped: usize,
    /// Text blocks dropped because they were blank
    pub empty_skipped: usize,
    /// Blocks of unhandled kinds dropped
    pub other_skipped: usize,
}

impl ConversionReport {
    fn new(range: PageRange) -> Self {
        Self {
            range,
            pages: 0,
            text_blocks: 0,
            images: 0,
            headers_skipped: 0,
            empty_skipped: 0,
            other_skipped: 0,
        }
    }

    /// Fragments written to the output.
    pub fn fragments(&self) -> usize {
        self.text_blocks + self.images
    }
}

/// Converts a range of pages to Markdown.
///
/// Blocks of each page are ordered top to bottom (then left to right),
/// running headers/footers are dropped by the configured [`BlockFilter`],
/// text blocks become paragraphs and images become placeholders.
///
/// # Example
///
/// ```no_run
/// use skpl2md::{ConverterConfig, PageConverter};
///
/// let converter = PageConverter::new(ConverterConfig::default());
/// let report = converter.convert(0, 10, "w")?;
/// println!("{} paragraphs", report.text_blocks);
/// # Ok::<(), skpl2md::Error>(())
/// ```
pub struct PageConverter {
    config: ConverterConfig,
    filter: Box<dyn BlockFilter>,
}

impl PageConverter {
    /// Create a converter using the header patterns from `config`.
    pub fn new(config: ConverterConfig) -> Self {
        let filter = HeaderFooterFilter::from_config(&config);
        Self {
            config,
            filter: Box::new(filter),
        }
    }

    /// Replace the header/footer filter.
    pub fn with_filter(mut self, filter: impl BlockFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    /// The converter configuration.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Open the configured source document.
    pub fn open_source(&self) -> Result<PdfBackend> {
        PdfBackend::open(&self.config.source)
    }

    /// Open the configured output file.
    pub fn open_output(&self, mode: WriteMode) -> Result<FileSink> {
        FileSink::open(&self.config.output, mode)
    }

    /// Clamp `range` to the document and apply the empty range policy.
    pub fn resolve_range(&self, range: PageRange, page_count: usize) -> Result<PageRange> {
        let clamped = range.clamp(page_count);
        if clamped.is_empty() && self.config.empty_range == EmptyRangePolicy::Reject {
            return Err(Error::InvalidPageRange {
                start: clamped.start,
                end: clamped.end,
            });
        }
        Ok(clamped)
    }

    /// Convert pages `[start, end)` of the configured source into the
    /// configured output, opened with `mode` (`"w"` or `"a"`).
    pub fn convert(&self, start: usize, end: usize, mode: &str) -> Result<ConversionReport> {
        let source = self.open_source()?;
        let range = self.resolve_range(PageRange::new(start, end), source.page_count())?;
        log::info!("Processing {}", range);

        let mode: WriteMode = mode.parse()?;
        let sink = self.open_output(mode)?;
        self.convert_pages(&source, range, sink)
    }

    /// Convert a page range of `source` into `sink`.
    ///
    /// The sink is closed after the last page. On error the sink is dropped
    /// as is; whatever was written before the failure stays written.
    pub fn convert_pages<B, S>(
        &self,
        source: &B,
        range: PageRange,
        mut sink: S,
    ) -> Result<ConversionReport>
    where
        B: BlockSource + ?Sized,
        S: OutputSink,
    {
        let range = self.resolve_range(range, source.page_count())?;
        let mut report = ConversionReport::new(range);
        if range.is_empty() {
            log::debug!("Empty page range {}..{}, nothing to do", range.start, range.end);
        }

        for index in range.indices() {
            let page = source.page(index)?;
            for fragment in self.render_blocks(&page, &mut report) {
                sink.write_fragment(&fragment.to_string())?;
            }
            report.pages += 1;
        }
        sink.close()?;

        log::info!(
            "Converted {} pages: {} paragraphs, {} images, {} headers skipped",
            report.pages,
            report.text_blocks,
            report.images,
            report.headers_skipped
        );
        Ok(report)
    }

    /// Convert a page range of `source` into a string.
    pub fn convert_to_string<B>(&self, source: &B, range: PageRange) -> Result<String>
    where
        B: BlockSource + ?Sized,
    {
        let mut sink = MemorySink::new();
        self.convert_pages(source, range, &mut sink)?;
        Ok(sink.into_string())
    }

    /// Order one page's blocks and turn them into fragments.
    fn render_blocks(&self, page: &Page, report: &mut ConversionReport) -> Vec<Fragment> {
        let page_number = page.number();
        let mut ordered: Vec<_> = page.blocks.iter().collect();
        ordered.sort_by(|a, b| {
            a.bbox
                .y0
                .total_cmp(&b.bbox.y0)
                .then(a.bbox.x0.total_cmp(&b.bbox.x0))
        });

        let mut fragments = Vec::new();
        for block in ordered {
            if log::log_enabled!(log::Level::Debug)
                && block.is_text()
                && block.bbox.y0 < self.config.header_y_cutoff
            {
                log::debug!(
                    "Page {} top block: '{}' at y={:.1}",
                    page_number,
                    block.flattened_text(),
                    block.bbox.y0
                );
            }

            if self.filter.matches(block) {
                report.headers_skipped += 1;
                continue;
            }

            match &block.content {
                BlockContent::Text(_) => {
                    let text = block.text_content();
                    if text.is_empty() {
                        report.empty_skipped += 1;
                    } else {
                        report.text_blocks += 1;
                        fragments.push(Fragment::Paragraph(text));
                    }
                }
                BlockContent::Image => {
                    report.images += 1;
                    fragments.push(Fragment::ImagePlaceholder { page_number });
                }
                BlockContent::Other(kind) => {
                    report.other_skipped += 1;
                    log::debug!("Page {}: skipping {} block", page_number, kind);
                }
            }
        }
        fragments
    }
}

impl Default for PageConverter {
    fn default() -> Self {
        Self::new(ConverterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Block, Document, Line};

    fn text(x0: f32, y0: f32, s: &str) -> Block {
        Block::text(BBox::new(x0, y0, x0 + 100.0, y0 + 20.0), vec![Line::from_text(s)])
    }

    #[test]
    fn test_page_range_clamp_and_display() {
        let range = PageRange::new(2, 50).clamp(10);
        assert_eq!(range, PageRange::new(2, 10));
        assert_eq!(range.len(), 8);
        assert_eq!(range.to_string(), "pages 3 to 10");
        assert_eq!(PageRange::all(4), PageRange::new(0, 4));
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = PageRange::new(5, 2);
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert_eq!(range.indices().count(), 0);
    }

    #[test]
    fn test_blocks_ordered_top_to_bottom_then_left_to_right() {
        let page = Page::a4(0)
            .with_block(text(300.0, 200.0, "right"))
            .with_block(text(50.0, 400.0, "bottom"))
            .with_block(text(50.0, 200.0, "left"))
            .with_block(text(50.0, 150.0, "top"));
        let doc = Document::from_pages(vec![page]);

        let out = PageConverter::default()
            .convert_to_string(&doc, PageRange::all(1))
            .unwrap();
        assert_eq!(out, "top\n\nleft\n\nright\n\nbottom\n\n");
    }

    #[test]
    fn test_report_counts() {
        let page = Page::a4(0)
            .with_block(text(50.0, 40.0, "Halaman 1 dari 2"))
            .with_block(text(50.0, 150.0, "Body"))
            .with_block(text(50.0, 200.0, "   "))
            .with_block(Block::image(BBox::new(50.0, 300.0, 200.0, 400.0)))
            .with_block(Block::other(BBox::new(50.0, 500.0, 200.0, 600.0), "form"));
        let doc = Document::from_pages(vec![page]);

        let mut sink = MemorySink::new();
        let report = PageConverter::default()
            .convert_pages(&doc, PageRange::new(0, 9), &mut sink)
            .unwrap();

        assert!(sink.is_closed());
        assert_eq!(report.range, PageRange::new(0, 1));
        assert_eq!(report.pages, 1);
        assert_eq!(report.text_blocks, 1);
        assert_eq!(report.images, 1);
        assert_eq!(report.headers_skipped, 1);
        assert_eq!(report.empty_skipped, 1);
        assert_eq!(report.other_skipped, 1);
        assert_eq!(report.fragments(), 2);
    }

    #[test]
    fn test_strict_range_rejects_empty() {
        let doc = Document::from_pages(vec![Page::a4(0), Page::a4(1)]);
        let converter = PageConverter::new(ConverterConfig::new().strict_range());

        let err = converter
            .convert_to_string(&doc, PageRange::new(5, 9))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPageRange { start: 5, end: 2 }));

        // Non-empty ranges are unaffected
        assert!(converter.convert_to_string(&doc, PageRange::new(0, 2)).is_ok());
    }

    #[test]
    fn test_custom_filter() {
        let page = Page::a4(0)
            .with_block(text(50.0, 500.0, "CONFIDENTIAL"))
            .with_block(text(50.0, 150.0, "Halaman 1 dari 2"));
        let doc = Document::from_pages(vec![page]);

        let converter = PageConverter::default()
            .with_filter(|b: &Block| b.text_content() == "CONFIDENTIAL");
        let out = converter.convert_to_string(&doc, PageRange::all(1)).unwrap();
        assert_eq!(out, "Halaman 1 dari 2\n\n");
    }
}
