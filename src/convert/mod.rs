//! Conversion of page blocks to Markdown.
//!
//! [`PageConverter`] drives a [`crate::parser::BlockSource`] page by page,
//! filters running headers/footers with a [`BlockFilter`], and writes
//! [`Fragment`]s to an [`OutputSink`].
//!
//! # Example
//!
//! ```
//! use skpl2md::convert::{PageConverter, PageRange};
//! use skpl2md::model::{BBox, Block, Document, Line, Page};
//!
//! let page = Page::a4(0)
//!     .with_block(Block::text(
//!         BBox::new(50.0, 40.0, 300.0, 60.0),
//!         vec![Line::from_text("ArtConnect Panduan GL01A Halaman 3 dari 10")],
//!     ))
//!     .with_block(Block::text(
//!         BBox::new(50.0, 150.0, 300.0, 170.0),
//!         vec![Line::from_text("Pasal 1: Ketentuan Umum")],
//!     ));
//! let doc = Document::from_pages(vec![page]);
//!
//! let markdown = PageConverter::default().convert_to_string(&doc, PageRange::new(0, 1))?;
//! assert_eq!(markdown, "Pasal 1: Ketentuan Umum\n\n");
//! # Ok::<(), skpl2md::Error>(())
//! ```

mod config;
mod converter;
mod filter;
mod fragment;
mod sink;

pub use config::{
    default_header_patterns, ConverterConfig, EmptyRangePolicy, HeaderPattern,
    DEFAULT_HEADER_Y_CUTOFF, DEFAULT_OUTPUT, DEFAULT_SOURCE,
};
pub use converter::{ConversionReport, PageConverter, PageRange};
pub use filter::{BlockFilter, HeaderFooterFilter};
pub use fragment::Fragment;
pub use sink::{FileSink, MemorySink, OutputSink, WriteMode};
