//! Error types for skpl2md.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for skpl2md operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading the source or writing the output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source document could not be opened or parsed.
    #[error("Failed to open document '{}': {reason}", path.display())]
    DocumentOpen { path: PathBuf, reason: String },

    /// The output file could not be opened in the requested mode.
    #[error("Failed to open output '{}': {source}", path.display())]
    OutputOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The write mode string is not one of the known modes.
    #[error("Invalid write mode '{0}': expected 'w' (overwrite) or 'a' (append)")]
    InvalidMode(String),

    /// The requested page range selects no pages.
    #[error("Invalid page range: {start}..{end} selects no pages")]
    InvalidPageRange { start: usize, end: usize },

    /// A page index past the end of the document was requested.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// Error parsing PDF structure or content streams.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// A block dump could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
