//! Block sources.
//!
//! [`BlockSource`] is the seam between page extraction and conversion: the
//! converter only needs a page count and, per page, a set of positioned
//! blocks. [`PdfBackend`] provides them from a PDF file through lopdf;
//! an in-memory [`Document`] provides them directly.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use super::layout::{
    decode_text_simple, estimate_width, is_spaceless_script_char, LayoutAnalyzer, Matrix,
    TextMatrix, TextSpan,
};
use crate::error::{Error, Result};
use crate::model::{Block, Document, Page};

/// Default page size (US Letter) when no MediaBox is found.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// `TJ` adjustments below this (in 1/1000 text space units) mark a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Forms painting forms deeper than this are skipped.
const MAX_FORM_DEPTH: usize = 8;

/// Page fonts keyed by resource name.
type FontMap<'a> = BTreeMap<Vec<u8>, &'a Dictionary>;

/// Access to the pages of a document as positioned blocks.
pub trait BlockSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Extract the blocks of the page at `index` (0-based).
    ///
    /// The returned page carries `index`; placeholders are numbered from it.
    fn page(&self, index: usize) -> Result<Page>;
}

impl BlockSource for Document {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<Page> {
        self.pages
            .get(index)
            .cloned()
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))
    }
}

/// Block extraction from a PDF, backed by `lopdf::Document`.
pub struct PdfBackend {
    doc: LopdfDocument,
    page_ids: Vec<ObjectId>,
}

impl PdfBackend {
    /// Open a PDF file.
    ///
    /// Any failure to read or parse the file is reported as
    /// [`Error::DocumentOpen`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let doc = LopdfDocument::load(path).map_err(|e| Error::DocumentOpen {
            path: path.to_path_buf(),
            reason: Error::from(e).to_string(),
        })?;
        log::debug!("Opened {} (PDF {})", path.display(), doc.version);
        Ok(Self::from_document(doc))
    }

    /// Load a PDF from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: LopdfDocument) -> Self {
        let page_ids = doc.get_pages().into_values().collect();
        Self { doc, page_ids }
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Look up a page attribute, following `Parent` links for inherited ones.
    fn inherited<'a>(&'a self, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
        let mut current = self.doc.get_dictionary(page_id).ok();
        while let Some(dict) = current {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            current = dict
                .get(b"Parent")
                .and_then(Object::as_reference)
                .and_then(|id| self.doc.get_dictionary(id))
                .ok();
        }
        None
    }

    /// Resolve a reference to a dictionary, or accept an inline one.
    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match obj {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    fn media_box(&self, page_id: ObjectId) -> [f32; 4] {
        let Some(array) = self
            .inherited(page_id, b"MediaBox")
            .and_then(|o| o.as_array().ok())
        else {
            return DEFAULT_MEDIA_BOX;
        };
        let values: Vec<f32> = array.iter().filter_map(get_number).collect();
        match values.as_slice() {
            [x0, y0, x1, y1] => [x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1)],
            _ => DEFAULT_MEDIA_BOX,
        }
    }

    /// Get the decompressed page content stream.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let Ok(contents) = page_dict.get(b"Contents") else {
            // A page without content is blank, not broken
            return Ok(Vec::new());
        };

        let stream_data = |id: ObjectId| -> Result<Vec<u8>> {
            match self.doc.get_object(id)? {
                Object::Stream(s) => Ok(s
                    .decompressed_content()
                    .unwrap_or_else(|_| s.content.clone())),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            }
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r)? {
                Object::Array(arr) => self.concat_streams(arr, stream_data),
                _ => stream_data(*r),
            },
            Object::Array(arr) => self.concat_streams(arr, stream_data),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn concat_streams<F>(&self, parts: &[Object], stream_data: F) -> Result<Vec<u8>>
    where
        F: Fn(ObjectId) -> Result<Vec<u8>>,
    {
        let mut content = Vec::new();
        for part in parts {
            if let Object::Reference(r) = part {
                content.extend_from_slice(&stream_data(*r)?);
                content.push(b' ');
            }
        }
        Ok(content)
    }

    /// Look up an XObject by resource name and classify it by `Subtype`.
    fn xobject<'a>(&'a self, xobjects: Option<&'a Dictionary>, name: &[u8]) -> Option<XObject<'a>> {
        let id = xobjects?.get(name).ok()?.as_reference().ok()?;
        let Object::Stream(stream) = self.doc.get_object(id).ok()? else {
            return None;
        };
        match stream.dict.get(b"Subtype").and_then(Object::as_name) {
            Ok(b"Image") => Some(XObject::Image),
            Ok(b"Form") => Some(XObject::Form(stream)),
            Ok(other) => Some(XObject::Other(String::from_utf8_lossy(other).to_lowercase())),
            Err(_) => Some(XObject::Other("xobject".to_string())),
        }
    }

    /// Resolve `key` (`Font`, `XObject`) inside a resource dictionary.
    fn resource_dict<'a>(
        &'a self,
        resources: Option<&'a Dictionary>,
        key: &[u8],
    ) -> Option<&'a Dictionary> {
        resources?.get(key).ok().and_then(|o| self.resolve_dict(o))
    }

    /// Resources seen by a form: its own where present, the painter's otherwise.
    fn form_scope<'a>(&'a self, form: &'a Stream, parent: &ResourceScope<'a>) -> ResourceScope<'a> {
        let resources = form
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| self.resolve_dict(o));

        let fonts = match self.resource_dict(resources, b"Font") {
            Some(fonts) => fonts
                .iter()
                .filter_map(|(name, obj)| self.resolve_dict(obj).map(|d| (name.clone(), d)))
                .collect(),
            None => parent.fonts.clone(),
        };
        let xobjects = self.resource_dict(resources, b"XObject").or(parent.xobjects);
        ResourceScope { fonts, xobjects }
    }

    /// Collect the blocks of a page, including those painted by forms.
    fn extract_blocks(&self, page_id: ObjectId, analyzer: &LayoutAnalyzer) -> Result<Vec<Block>> {
        let data = self.page_content(page_id)?;
        let resources = self
            .inherited(page_id, b"Resources")
            .and_then(|o| self.resolve_dict(o));
        let scope = ResourceScope {
            fonts: self.doc.get_page_fonts(page_id)?,
            xobjects: self.resource_dict(resources, b"XObject"),
        };

        let mut collected = Collected::default();
        self.walk_content(&data, &scope, Matrix::identity(), 0, analyzer, &mut collected)?;

        let mut blocks = analyzer.build_blocks(collected.spans);
        blocks.append(&mut collected.blocks);
        Ok(blocks)
    }

    /// Run a form XObject's content under its `/Matrix` and resources.
    fn walk_form<'a>(
        &'a self,
        form: &'a Stream,
        scope: &ResourceScope<'a>,
        ctm: Matrix,
        depth: usize,
        analyzer: &LayoutAnalyzer,
        collected: &mut Collected,
    ) -> Result<()> {
        if depth >= MAX_FORM_DEPTH {
            log::warn!("Form XObjects nested deeper than {}, skipping", MAX_FORM_DEPTH);
            return Ok(());
        }
        let matrix = form
            .dict
            .get(b"Matrix")
            .and_then(Object::as_array)
            .ok()
            .and_then(|values| matrix_from(values))
            .unwrap_or_default();
        let data = form
            .decompressed_content()
            .unwrap_or_else(|_| form.content.clone());
        let form_scope = self.form_scope(form, scope);
        self.walk_content(&data, &form_scope, matrix.then(&ctm), depth + 1, analyzer, collected)
    }

    /// Walk one content stream, collecting text spans and painted XObjects.
    fn walk_content<'a>(
        &'a self,
        data: &[u8],
        scope: &ResourceScope<'a>,
        base_ctm: Matrix,
        depth: usize,
        analyzer: &LayoutAnalyzer,
        collected: &mut Collected,
    ) -> Result<()> {
        let content = Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;
        let fonts = &scope.fonts;

        let mut ctm = base_ctm;
        let mut ctm_stack: Vec<Matrix> = Vec::new();
        let mut text = TextMatrix::default();
        let mut in_text = false;
        let mut font_key: Vec<u8> = Vec::new();
        let mut font_name = String::new();
        let mut font_size: f32 = 12.0;

        for op in content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => ctm_stack.push(ctm),
                "Q" => ctm = ctm_stack.pop().unwrap_or(base_ctm),
                "cm" => {
                    if let Some(m) = matrix_from(operands) {
                        ctm = m.then(&ctm);
                    }
                }
                "BT" => {
                    in_text = true;
                    text.begin();
                }
                "ET" => in_text = false,
                "Tf" => {
                    if let [Object::Name(key), size, ..] = operands.as_slice() {
                        font_key = key.clone();
                        font_name = fonts
                            .get(key)
                            .and_then(|f| f.get(b"BaseFont").and_then(Object::as_name).ok())
                            .map(|n| String::from_utf8_lossy(n).to_string())
                            .unwrap_or_else(|| String::from_utf8_lossy(key).to_string());
                        font_size = get_number(size).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(get_number) {
                        text.set_leading(leading);
                    }
                }
                "Td" | "TD" => {
                    if let [tx, ty, ..] = operands.as_slice() {
                        let tx = get_number(tx).unwrap_or(0.0);
                        let ty = get_number(ty).unwrap_or(0.0);
                        if op.operator == "TD" {
                            text.set_leading(-ty);
                        }
                        text.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix_from(operands) {
                        text.set(m);
                    }
                }
                "T*" => text.next_line(),
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" || op.operator == "\"" {
                        text.next_line();
                    }
                    if !in_text {
                        continue;
                    }
                    let shown = match op.operator.as_str() {
                        "TJ" => match operands.first() {
                            Some(Object::Array(items)) => self.decode_tj(fonts, &font_key, items),
                            _ => String::new(),
                        },
                        "\"" => self.decode_operand(fonts, &font_key, operands.get(2)),
                        _ => self.decode_operand(fonts, &font_key, operands.first()),
                    };
                    if shown.is_empty() {
                        continue;
                    }

                    let trm = text.matrix().then(&ctm);
                    let (x, y) = trm.apply(0.0, 0.0);
                    let size = font_size * trm.scale();
                    text.advance(estimate_width(&shown, font_size));
                    if !shown.trim().is_empty() {
                        let span = TextSpan::new(shown, x, y, size, font_name.clone());
                        collected.spans.push(span);
                    }
                }
                "Do" => {
                    let Some(Object::Name(name)) = operands.first() else {
                        continue;
                    };
                    let (x0, y0, x1, y1) = ctm.unit_square_bounds();
                    let bbox = analyzer.to_page_bbox(x0, y0, x1, y1);
                    match self.xobject(scope.xobjects, name) {
                        Some(XObject::Image) => collected.blocks.push(Block::image(bbox)),
                        Some(XObject::Form(form)) => {
                            self.walk_form(form, scope, ctm, depth, analyzer, collected)?
                        }
                        Some(XObject::Other(kind)) => {
                            collected.blocks.push(Block::other(bbox, kind))
                        }
                        None => log::warn!(
                            "XObject /{} not found in resources",
                            String::from_utf8_lossy(name)
                        ),
                    }
                }
                "BI" => {
                    let (x0, y0, x1, y1) = ctm.unit_square_bounds();
                    let bbox = analyzer.to_page_bbox(x0, y0, x1, y1);
                    collected.blocks.push(Block::image(bbox));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Decode a string operand using the font's encoding.
    fn decode_operand(
        &self,
        fonts: &FontMap<'_>,
        font_key: &[u8],
        operand: Option<&Object>,
    ) -> String {
        match operand {
            Some(Object::String(bytes, _)) => self.decode_bytes(fonts, font_key, bytes),
            _ => String::new(),
        }
    }

    /// Decode a `TJ` array, turning wide negative kerning into word spaces.
    fn decode_tj(&self, fonts: &FontMap<'_>, font_key: &[u8], items: &[Object]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    combined.push_str(&self.decode_bytes(fonts, font_key, bytes));
                }
                Object::Integer(_) | Object::Real(_) => {
                    let adjustment = -get_number(item).unwrap_or(0.0);
                    let ends_with_space = combined.ends_with(' ') || combined.ends_with('\u{00A0}');
                    let last_is_spaceless = combined
                        .chars()
                        .last()
                        .is_some_and(is_spaceless_script_char);
                    if adjustment > TJ_SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !ends_with_space
                        && !last_is_spaceless
                    {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }
        combined
    }

    fn decode_bytes(&self, fonts: &FontMap<'_>, font_key: &[u8], bytes: &[u8]) -> String {
        fonts
            .get(font_key)
            .and_then(|f| f.get_font_encoding(&self.doc).ok())
            .and_then(|enc| LopdfDocument::decode_text(&enc, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    }
}

impl BlockSource for PdfBackend {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page(&self, index: usize) -> Result<Page> {
        let page_id = *self
            .page_ids
            .get(index)
            .ok_or(Error::PageOutOfRange(index, self.page_ids.len()))?;

        let [left, bottom, right, top] = self.media_box(page_id);
        let analyzer = LayoutAnalyzer::new(left, top);
        let mut page = Page::new(index, right - left, top - bottom);
        page.blocks = self.extract_blocks(page_id, &analyzer)?;
        Ok(page)
    }
}

/// What a `Do` operator paints.
enum XObject<'a> {
    Image,
    Form(&'a Stream),
    Other(String),
}

/// Fonts and XObjects visible to a content stream.
#[derive(Clone)]
struct ResourceScope<'a> {
    fonts: FontMap<'a>,
    xobjects: Option<&'a Dictionary>,
}

/// Text spans and non-text blocks gathered while walking a page.
#[derive(Default)]
struct Collected {
    spans: Vec<TextSpan>,
    blocks: Vec<Block>,
}

/// Read a six-number matrix operand list (`cm`, `Tm`, form `/Matrix`).
fn matrix_from(values: &[Object]) -> Option<Matrix> {
    let [a, b, c, d, e, f] = values else {
        return None;
    };
    Some(Matrix::new(
        get_number(a)?,
        get_number(b)?,
        get_number(c)?,
        get_number(d)?,
        get_number(e)?,
        get_number(f)?,
    ))
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
