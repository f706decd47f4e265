//! Converter configuration.

use std::path::PathBuf;

/// Default source document.
pub const DEFAULT_SOURCE: &str = "docs/SKPL_ArtConnect.pdf";

/// Default output file.
pub const DEFAULT_OUTPUT: &str = "docs/SKPL.md";

/// Blocks starting above this y (top-left origin) are header candidates.
pub const DEFAULT_HEADER_Y_CUTOFF: f32 = 100.0;

/// A running header/footer, recognised when all of its literals occur in
/// a block's flattened text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPattern {
    literals: Vec<String>,
}

impl HeaderPattern {
    /// Create a pattern from literal substrings.
    pub fn new<I, S>(literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            literals: literals.into_iter().map(Into::into).collect(),
        }
    }

    /// The literal substrings.
    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    /// Check whether every literal occurs in `text`.
    ///
    /// An empty pattern never matches.
    pub fn matches(&self, text: &str) -> bool {
        !self.literals.is_empty() && self.literals.iter().all(|l| text.contains(l.as_str()))
    }
}

/// The running header/footer patterns of the SKPL guide.
pub fn default_header_patterns() -> Vec<HeaderPattern> {
    vec![
        // "ArtConnect Panduan GL01A ..."
        HeaderPattern::new(["ArtConnect", "Panduan GL01A"]),
        // "Halaman X dari Y"
        HeaderPattern::new(["Halaman", "dari"]),
    ]
}

/// What to do when the requested page range selects no pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyRangePolicy {
    /// Process nothing and succeed
    #[default]
    Ignore,
    /// Fail with [`crate::Error::InvalidPageRange`]
    Reject,
}

/// Options for [`super::PageConverter`].
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// PDF to read
    pub source: PathBuf,

    /// Markdown file to write
    pub output: PathBuf,

    /// Header candidates must start above this y
    pub header_y_cutoff: f32,

    /// Literal patterns identifying running headers/footers
    pub header_patterns: Vec<HeaderPattern>,

    /// Handling of inverted or empty page ranges
    pub empty_range: EmptyRangePolicy,
}

impl ConverterConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source document path.
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = path.into();
        self
    }

    /// Set the output file path.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    /// Set the header y cutoff.
    pub fn with_header_y_cutoff(mut self, cutoff: f32) -> Self {
        self.header_y_cutoff = cutoff;
        self
    }

    /// Replace the header patterns.
    pub fn with_header_patterns(mut self, patterns: Vec<HeaderPattern>) -> Self {
        self.header_patterns = patterns;
        self
    }

    /// Add a header pattern.
    pub fn add_header_pattern(mut self, pattern: HeaderPattern) -> Self {
        self.header_patterns.push(pattern);
        self
    }

    /// Set the empty range policy.
    pub fn with_empty_range(mut self, policy: EmptyRangePolicy) -> Self {
        self.empty_range = policy;
        self
    }

    /// Fail on inverted or empty page ranges.
    pub fn strict_range(self) -> Self {
        self.with_empty_range(EmptyRangePolicy::Reject)
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            output: PathBuf::from(DEFAULT_OUTPUT),
            header_y_cutoff: DEFAULT_HEADER_Y_CUTOFF,
            header_patterns: default_header_patterns(),
            empty_range: EmptyRangePolicy::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert_eq!(config.source, PathBuf::from("docs/SKPL_ArtConnect.pdf"));
        assert_eq!(config.output, PathBuf::from("docs/SKPL.md"));
        assert_eq!(config.header_y_cutoff, 100.0);
        assert_eq!(config.header_patterns.len(), 2);
        assert_eq!(config.empty_range, EmptyRangePolicy::Ignore);
    }

    #[test]
    fn test_config_builder() {
        let config = ConverterConfig::new()
            .with_source("in.pdf")
            .with_output("out.md")
            .with_header_y_cutoff(50.0)
            .with_header_patterns(vec![])
            .add_header_pattern(HeaderPattern::new(["Draft"]))
            .strict_range();

        assert_eq!(config.source, PathBuf::from("in.pdf"));
        assert_eq!(config.output, PathBuf::from("out.md"));
        assert_eq!(config.header_y_cutoff, 50.0);
        assert_eq!(config.header_patterns, vec![HeaderPattern::new(["Draft"])]);
        assert_eq!(config.empty_range, EmptyRangePolicy::Reject);
    }

    #[test]
    fn test_header_pattern_requires_all_literals() {
        let pattern = HeaderPattern::new(["Halaman", "dari"]);
        assert!(pattern.matches("Halaman 3 dari 10"));
        assert!(!pattern.matches("Halaman 3"));
        assert!(!pattern.matches("dari sini"));
        // Literal, case-sensitive substring matching
        assert!(!pattern.matches("halaman 3 dari 10"));
        assert!(pattern.matches("Berhalaman... Halaman dariX"));
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let pattern = HeaderPattern::new(Vec::<String>::new());
        assert!(!pattern.matches("anything"));
        assert!(pattern.literals().is_empty());
    }
}
