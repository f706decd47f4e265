//! Rendered output fragments.

use std::fmt;

/// One unit of converted output, terminated by a blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A paragraph of reconstructed text
    Paragraph(String),
    /// Stand-in for an image on the given 1-based page
    ImagePlaceholder { page_number: usize },
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Paragraph(text) => write!(f, "{}\n\n", text),
            Fragment::ImagePlaceholder { page_number } => write!(
                f,
                "> *[Gambar terdapat pada halaman {} di dokumen asli]*\n\n",
                page_number
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_ends_with_blank_line() {
        let fragment = Fragment::Paragraph("Pasal 1: Ketentuan Umum".to_string());
        assert_eq!(fragment.to_string(), "Pasal 1: Ketentuan Umum\n\n");
    }

    #[test]
    fn test_image_placeholder() {
        let fragment = Fragment::ImagePlaceholder { page_number: 5 };
        assert_eq!(
            fragment.to_string(),
            "> *[Gambar terdapat pada halaman 5 di dokumen asli]*\n\n"
        );
    }
}
