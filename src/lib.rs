//! # skpl2md
//!
//! Converts the SKPL guide PDF to Markdown.
//!
//! Each page is broken into positioned blocks, the blocks are read top to
//! bottom and left to right, running headers/footers are dropped, text
//! blocks become paragraphs and images become placeholders that point back
//! to the original page.
//!
//! ## Quick Start
//!
//! ```no_run
//! use skpl2md::{ConverterConfig, PageConverter};
//!
//! fn main() -> skpl2md::Result<()> {
//!     // docs/SKPL_ArtConnect.pdf, pages 1-20, into a fresh docs/SKPL.md
//!     let converter = PageConverter::new(ConverterConfig::default());
//!     converter.convert(0, 20, "w")?;
//!
//!     // Pages 21-40 appended to the same file
//!     converter.convert(20, 40, "a")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Reading order**: blocks sorted by top edge, then left edge
//! - **Header/footer stripping**: literal patterns in the top band of a page
//! - **Image placeholders**: `> *[Gambar terdapat pada halaman N di dokumen asli]*`
//! - **Pluggable pieces**: block sources, header filters and output sinks are traits

pub mod convert;
pub mod error;
pub mod model;
pub mod parser;

// Re-export commonly used types
pub use convert::{
    BlockFilter, ConversionReport, ConverterConfig, EmptyRangePolicy, FileSink, Fragment,
    HeaderFooterFilter, HeaderPattern, MemorySink, OutputSink, PageConverter, PageRange,
    WriteMode,
};
pub use error::{Error, Result};
pub use model::{BBox, Block, BlockContent, Document, Line, Page, Span};
pub use parser::{BlockSource, PdfBackend};

use std::path::Path;

/// Convert pages `[start, end)` with the default configuration.
///
/// Reads `docs/SKPL_ArtConnect.pdf` and writes `docs/SKPL.md` in `mode`
/// (`"w"` to overwrite, `"a"` to append).
pub fn convert(start: usize, end: usize, mode: &str) -> Result<ConversionReport> {
    PageConverter::default().convert(start, end, mode)
}

/// Convert every page of a PDF file to a Markdown string.
///
/// # Example
///
/// ```no_run
/// let markdown = skpl2md::to_markdown("guide.pdf").unwrap();
/// std::fs::write("guide.md", markdown).unwrap();
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let source = PdfBackend::open(path)?;
    let range = PageRange::all(source.page_count());
    PageConverter::default().convert_to_string(&source, range)
}

/// Extract the blocks of every page of a PDF file.
///
/// Useful for inspecting block positions when tuning header patterns; the
/// result can be saved with [`Document::to_json`].
pub fn extract_blocks<P: AsRef<Path>>(path: P) -> Result<Document> {
    let source = PdfBackend::open(path)?;
    let pages = (0..source.page_count())
        .map(|i| source.page(i))
        .collect::<Result<Vec<_>>>()?;
    Ok(Document::from_pages(pages))
}
