//! PDF parsing module.

mod backend;
mod layout;

pub use backend::{BlockSource, PdfBackend};
pub use layout::{LayoutAnalyzer, Matrix, TextMatrix, TextSpan};
