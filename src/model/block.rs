//! Positioned content blocks.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in page space (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge (smaller is higher on the page)
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Box width.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Box height.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// The smallest text-bearing unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Span {
    /// The text content
    pub text: String,
    /// Font name (e.g., "Helvetica-Bold"); not used by conversion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Font size in points; not used by conversion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
}

impl Span {
    /// Create a span carrying only text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: None,
            size: None,
        }
    }

    /// Attach font information.
    pub fn with_font(mut self, font: impl Into<String>, size: f32) -> Self {
        self.font = Some(font.into());
        self.size = Some(size);
        self
    }
}

/// A line of spans, in reading order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Line {
    /// The spans in this line
    pub spans: Vec<Span>,
}

impl Line {
    /// Create a line from spans.
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Create a line holding a single span.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![Span::new(text)])
    }

    /// Span texts concatenated without separator.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// What a block holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum BlockContent {
    /// Text, as ordered lines
    Text(Vec<Line>),
    /// A raster image
    Image,
    /// Any other kind, named for diagnostics
    Other(String),
}

/// A positioned content unit on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Bounding box in page space
    pub bbox: BBox,
    /// Block content
    pub content: BlockContent,
}

impl Block {
    /// Create a text block.
    pub fn text(bbox: BBox, lines: Vec<Line>) -> Self {
        Self {
            bbox,
            content: BlockContent::Text(lines),
        }
    }

    /// Create an image block.
    pub fn image(bbox: BBox) -> Self {
        Self {
            bbox,
            content: BlockContent::Image,
        }
    }

    /// Create a block of an unhandled kind.
    pub fn other(bbox: BBox, kind: impl Into<String>) -> Self {
        Self {
            bbox,
            content: BlockContent::Other(kind.into()),
        }
    }

    /// Check if this is a text block.
    pub fn is_text(&self) -> bool {
        matches!(self.content, BlockContent::Text(_))
    }

    /// Text lines, if this is a text block.
    pub fn lines(&self) -> Option<&[Line]> {
        match &self.content {
            BlockContent::Text(lines) => Some(lines),
            _ => None,
        }
    }

    /// Every span followed by a single space, trimmed.
    ///
    /// This is the form header/footer patterns are matched against, so
    /// words split across spans stay separated. Empty for non-text blocks.
    pub fn flattened_text(&self) -> String {
        let mut text = String::new();
        for span in self.lines().unwrap_or_default().iter().flat_map(|l| &l.spans) {
            text.push_str(&span.text);
            text.push(' ');
        }
        text.trim().to_string()
    }

    /// Each line's spans concatenated and followed by a space, trimmed.
    ///
    /// This is the paragraph text written to the output. Empty for non-text
    /// blocks.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        for line in self.lines().unwrap_or_default() {
            text.push_str(&line.text());
            text.push(' ');
        }
        text.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_span_block() -> Block {
        Block::text(
            BBox::new(0.0, 0.0, 100.0, 20.0),
            vec![
                Line::new(vec![Span::new("Hala"), Span::new("man 3")]),
                Line::from_text("dari 10 "),
            ],
        )
    }

    #[test]
    fn test_flattened_text_separates_spans() {
        assert_eq!(two_span_block().flattened_text(), "Hala man 3 dari 10");
    }

    #[test]
    fn test_text_content_joins_spans_and_separates_lines() {
        assert_eq!(two_span_block().text_content(), "Halaman 3 dari 10");
    }

    #[test]
    fn test_non_text_block_has_no_text() {
        let block = Block::image(BBox::new(0.0, 200.0, 50.0, 250.0));
        assert!(!block.is_text());
        assert!(block.lines().is_none());
        assert_eq!(block.text_content(), "");
        assert_eq!(block.flattened_text(), "");
    }

    #[test]
    fn test_bbox_union() {
        let a = BBox::new(10.0, 20.0, 30.0, 40.0);
        let b = BBox::new(5.0, 25.0, 50.0, 35.0);
        assert_eq!(a.union(&b), BBox::new(5.0, 20.0, 50.0, 40.0));
        assert_eq!(a.width(), 20.0);
        assert_eq!(a.height(), 20.0);
    }

    #[test]
    fn test_block_serde() {
        let block = two_span_block();
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"kind\":\"text\""));
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);

        let json = r#"{"bbox":{"x0":0,"y0":1,"x1":2,"y1":3},"content":{"kind":"image"}}"#;
        let image: Block = serde_json::from_str(json).unwrap();
        assert_eq!(image.content, BlockContent::Image);
    }
}
