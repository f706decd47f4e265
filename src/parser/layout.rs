//! Layout analysis for PDF pages.
//!
//! Turns the loose text spans found in a content stream into [`Block`]s:
//! spans on a shared baseline become lines, and consecutive lines with
//! regular spacing, size and indentation become one block. Positions are
//! tracked in PDF user space (bottom-left origin) and converted to the
//! model's top-left origin when blocks are built.

use crate::model::{BBox, Block, Line, Span};

/// A 2D affine transform `[a b c d e f]` as used by PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    /// The identity transform.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Create a transform from its six components.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// `self` applied first, then `other`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Map a point through the transform.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Vertical scale factor.
    pub fn scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    /// Bounding box of the unit square under this transform.
    ///
    /// Image XObjects are painted into the unit square, so this is where an
    /// image lands in user space: `(min_x, min_y, max_x, max_y)`.
    pub fn unit_square_bounds(&self) -> (f32, f32, f32, f32) {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(1.0, 0.0),
            self.apply(0.0, 1.0),
            self.apply(1.0, 1.0),
        ];
        corners.iter().fold(
            (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
            |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        )
    }
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone, Default)]
pub struct TextMatrix {
    /// Current text matrix
    tm: Matrix,
    /// Start of the current line
    line: Matrix,
    /// Text leading, set by `TL` and `TD`
    leading: f32,
}

impl TextMatrix {
    /// Reset at the start of a text object (`BT`).
    pub fn begin(&mut self) {
        self.tm = Matrix::identity();
        self.line = Matrix::identity();
    }

    /// Set the matrix directly (`Tm`).
    pub fn set(&mut self, m: Matrix) {
        self.tm = m;
        self.line = m;
    }

    /// Move to the start of the next line, offset by `(tx, ty)` (`Td`).
    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.line = Matrix::new(1.0, 0.0, 0.0, 1.0, tx, ty).then(&self.line);
        self.tm = self.line;
    }

    /// Set the text leading (`TL`).
    pub fn set_leading(&mut self, leading: f32) {
        self.leading = leading;
    }

    /// Move to the next line using the current leading (`T*`).
    pub fn next_line(&mut self) {
        let leading = if self.leading == 0.0 { 12.0 } else { self.leading };
        self.translate(0.0, -leading);
    }

    /// Advance along the baseline after showing text.
    pub fn advance(&mut self, tx: f32) {
        self.tm = Matrix::new(1.0, 0.0, 0.0, 1.0, tx, 0.0).then(&self.tm);
    }

    /// The current text matrix.
    pub fn matrix(&self) -> Matrix {
        self.tm
    }
}

/// A text run found in a content stream, in PDF user space.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
}

impl TextSpan {
    /// Create a span, estimating its width from the character count.
    pub fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let width = estimate_width(&text, font_size);
        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
        }
    }

    /// Approximate top edge (ascender).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }

    /// Approximate bottom edge (descender).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2
    }
}

/// Rough glyph advance: half the font size per character.
pub fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5
}

/// A group of spans sharing a baseline.
#[derive(Debug, Clone)]
struct TextLine {
    spans: Vec<TextSpan>,
    y: f32,
    x: f32,
    font_size: f32,
}

impl TextLine {
    fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));

        // Dominant font size, weighted by text length
        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted / total_chars as f32
        } else {
            spans.first().map(|s| s.font_size).unwrap_or(12.0)
        };

        let (x, y) = spans.first().map(|s| (s.x, s.y)).unwrap_or((0.0, 0.0));
        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// Convert to model spans, marking word gaps with a leading space.
    fn to_line(&self) -> Line {
        let mut out: Vec<Span> = Vec::with_capacity(self.spans.len());
        for (i, span) in self.spans.iter().enumerate() {
            let mut text = span.text.clone();
            if i > 0 && needs_gap_space(&self.spans[i - 1], span) {
                text.insert(0, ' ');
            }
            out.push(Span::new(text).with_font(span.font_name.clone(), span.font_size));
        }
        Line::new(out)
    }
}

/// Whether a visible gap separates two neighbouring spans.
fn needs_gap_space(prev: &TextSpan, curr: &TextSpan) -> bool {
    let gap = curr.x - (prev.x + prev.width);
    let char_count = curr.text.chars().count();
    let avg_char_width = if char_count > 0 && curr.width > 0.0 {
        curr.width / char_count as f32
    } else {
        curr.font_size * 0.5
    };
    if gap <= avg_char_width * 0.2 {
        return false;
    }

    let prev_last = prev.text.chars().last();
    let curr_first = curr.text.chars().next();
    if prev_last.is_some_and(char::is_whitespace) || curr_first.is_some_and(char::is_whitespace) {
        return false;
    }
    !(prev_last.is_some_and(is_spaceless_script_char)
        && curr_first.is_some_and(is_spaceless_script_char))
}

/// Groups text spans into blocks for one page.
#[derive(Debug, Clone, Copy)]
pub struct LayoutAnalyzer {
    /// Top of the page in user space (MediaBox upper y)
    page_top: f32,
    /// Left of the page in user space (MediaBox lower x)
    page_left: f32,
}

impl LayoutAnalyzer {
    /// Create an analyzer for a page with the given MediaBox origin corner.
    pub fn new(page_left: f32, page_top: f32) -> Self {
        Self {
            page_top,
            page_left,
        }
    }

    /// Convert a user-space rectangle to a top-left-origin bounding box.
    pub fn to_page_bbox(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> BBox {
        BBox::new(
            min_x - self.page_left,
            self.page_top - max_y,
            max_x - self.page_left,
            self.page_top - min_y,
        )
    }

    /// Group spans into text blocks.
    pub fn build_blocks(&self, spans: Vec<TextSpan>) -> Vec<Block> {
        let lines = group_spans_into_lines(spans);
        group_lines_into_blocks(lines)
            .into_iter()
            .map(|lines| self.make_block(&lines))
            .collect()
    }

    fn make_block(&self, lines: &[TextLine]) -> Block {
        let mut bbox: Option<BBox> = None;
        for span in lines.iter().flat_map(|l| &l.spans) {
            let span_box =
                self.to_page_bbox(span.x, span.bottom(), span.x + span.width, span.top());
            bbox = Some(match bbox {
                Some(b) => b.union(&span_box),
                None => span_box,
            });
        }
        Block::text(
            bbox.unwrap_or_default(),
            lines.iter().map(TextLine::to_line).collect(),
        )
    }
}

/// Baseline grouping, top to bottom.
fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    // PDF y grows upwards, so descending y is top to bottom
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }
    lines
}

/// Paragraph grouping based on spacing, size and indentation.
fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<Vec<TextLine>> {
    let avg_spacing = average_line_spacing(&lines);
    let mut blocks: Vec<Vec<TextLine>> = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(std::mem::take(&mut current));
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();
    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &TextLine, curr: &TextLine, avg_spacing: f32) -> bool {
    let spacing = (prev.y - curr.y).abs();
    spacing > avg_spacing * 1.5
        || spacing > prev.font_size.max(curr.font_size) * 2.0
        || (prev.font_size - curr.font_size).abs() > 1.0
        || (prev.x - curr.x).abs() > 20.0
}

/// Check if a character belongs to a script written without word spaces.
///
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no font encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, 10.0, "Helvetica".to_string())
    }

    #[test]
    fn test_matrix_then_and_apply() {
        let scale = Matrix::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let shift = Matrix::new(1.0, 0.0, 0.0, 1.0, 10.0, 20.0);
        // Scale first, then shift
        let m = scale.then(&shift);
        assert_eq!(m.apply(1.0, 1.0), (12.0, 22.0));
        assert_eq!(m.scale(), 2.0);
    }

    #[test]
    fn test_unit_square_bounds() {
        let m = Matrix::new(200.0, 0.0, 0.0, 100.0, 50.0, 300.0);
        assert_eq!(m.unit_square_bounds(), (50.0, 300.0, 250.0, 400.0));
    }

    #[test]
    fn test_text_matrix_line_moves() {
        let mut tm = TextMatrix::default();
        tm.begin();
        tm.translate(72.0, 700.0);
        tm.advance(30.0);
        assert_eq!(tm.matrix().apply(0.0, 0.0), (102.0, 700.0));

        // Next line starts from the line origin, not the advanced position
        tm.set_leading(14.0);
        tm.next_line();
        assert_eq!(tm.matrix().apply(0.0, 0.0), (72.0, 686.0));
    }

    #[test]
    fn test_spans_grouped_into_lines_and_blocks() {
        let analyzer = LayoutAnalyzer::new(0.0, 842.0);
        let spans = vec![
            span("second", 10.0, 688.0),
            span("first", 10.0, 700.0),
            span("line", 40.0, 700.5),
            span("far below", 10.0, 400.0),
        ];
        let blocks = analyzer.build_blocks(spans);
        assert_eq!(blocks.len(), 2);

        let first = blocks[0].lines().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].text(), "first line");
        assert_eq!(blocks[0].text_content(), "first line second");

        assert_eq!(blocks[1].text_content(), "far below");
        assert!(blocks[0].bbox.y0 < blocks[1].bbox.y0);
    }

    #[test]
    fn test_block_bbox_is_top_left_origin() {
        let analyzer = LayoutAnalyzer::new(0.0, 842.0);
        let blocks = analyzer.build_blocks(vec![span("Header", 50.0, 800.0)]);
        let bbox = blocks[0].bbox;
        assert!((bbox.y0 - 34.0).abs() < 0.01);
        assert!((bbox.y1 - 44.0).abs() < 0.01);
        assert!((bbox.x1 - 80.0).abs() < 0.01);
    }

    #[test]
    fn test_no_gap_space_between_cjk() {
        let a = span("日本", 0.0, 0.0);
        let b = span("語", 30.0, 0.0);
        assert!(!needs_gap_space(&a, &b));
        let c = span("word", 0.0, 0.0);
        let d = span("next", 40.0, 0.0);
        assert!(needs_gap_space(&c, &d));
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0x65, 0x6C, 0x6C, 0xE9]), "Hellé");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }
}
