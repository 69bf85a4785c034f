//! Content stream interpretation.
//!
//! Walks the text-showing operators of a page (and of any form XObjects it
//! draws) and records one [`TextChar`] per glyph, positioned in top-left
//! page coordinates. Only what layout reconstruction needs is tracked: the
//! CTM, the text and line matrices, and the text state parameters.

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object, Stream};

use super::layout::TextChar;
use crate::error::{Error, Result};

/// Glyph width (thousandths of text space) when a font carries no metrics.
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// Default width of CID-keyed glyphs.
const DEFAULT_CID_WIDTH: f32 = 1000.0;

/// Approximate ascent and descent as fractions of the font size.
const ASCENT: f32 = 0.8;
const DESCENT: f32 = -0.2;

/// Form XObjects may nest; cycles are cut at this depth.
const MAX_FORM_DEPTH: usize = 8;

/// A 2D affine transform in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`: apply `self` first, then `other`.
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

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        if operands.len() < 6 {
            return None;
        }
        let n: Vec<f32> = operands[..6].iter().filter_map(get_number).collect();
        (n.len() == 6).then(|| Matrix::new(n[0], n[1], n[2], n[3], n[4], n[5]))
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Text state parameters (PDF 32000-1, 9.3).
#[derive(Debug, Clone)]
struct TextState {
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    font: Vec<u8>,
    size: f32,
    rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            font: Vec::new(),
            size: 12.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

/// How a font maps string bytes to text.
enum Decoder<'a> {
    /// One byte per glyph; lookup table for all 256 codes.
    SingleByte(Vec<String>),
    /// Composite (Type0) font decoded as a whole string.
    Composite(&'a Dictionary),
}

/// A glyph produced by decoding a string operand.
struct Glyph {
    text: String,
    /// Width in thousandths of text space
    width: f32,
    is_space: bool,
}

/// Decoding and metrics for one font resource.
struct FontInfo<'a> {
    decoder: Decoder<'a>,
    first_char: i64,
    widths: Vec<f32>,
    default_width: f32,
}

impl<'a> FontInfo<'a> {
    fn load(doc: &'a LopdfDocument, dict: &'a Dictionary) -> Self {
        let subtype = dict.get(b"Subtype").ok().and_then(|o| o.as_name().ok());
        if subtype == Some(b"Type0".as_slice()) {
            let default_width = dict
                .get(b"DescendantFonts")
                .ok()
                .and_then(|o| resolve(doc, o).as_array().ok())
                .and_then(|arr| arr.first())
                .and_then(|o| resolve_dict(doc, o))
                .and_then(|d| d.get(b"DW").ok())
                .and_then(get_number)
                .unwrap_or(DEFAULT_CID_WIDTH);
            return Self {
                decoder: Decoder::Composite(dict),
                first_char: 0,
                widths: Vec::new(),
                default_width,
            };
        }

        let encoding = dict.get_font_encoding(doc).ok();
        let table = (0..=255u8)
            .map(|b| match &encoding {
                Some(enc) => LopdfDocument::decode_text(enc, &[b]).unwrap_or_default(),
                None => decode_text_simple(&[b]),
            })
            .collect();

        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| resolve(doc, o).as_i64().ok())
            .unwrap_or(0);
        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| get_number(resolve(doc, w)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();
        let default_width = dict
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| resolve_dict(doc, o))
            .and_then(|d| d.get(b"MissingWidth").ok())
            .and_then(get_number)
            .filter(|w| *w > 0.0)
            .unwrap_or(DEFAULT_GLYPH_WIDTH);

        Self {
            decoder: Decoder::SingleByte(table),
            first_char,
            widths,
            default_width,
        }
    }

    /// Used when a `Tf` names a font missing from the resources.
    fn fallback() -> Self {
        Self {
            decoder: Decoder::SingleByte((0..=255u8).map(|b| decode_text_simple(&[b])).collect()),
            first_char: 0,
            widths: Vec::new(),
            default_width: DEFAULT_GLYPH_WIDTH,
        }
    }

    fn width_of(&self, code: u8) -> f32 {
        usize::try_from(i64::from(code) - self.first_char)
            .ok()
            .and_then(|i| self.widths.get(i))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(self.default_width)
    }

    fn glyphs(&self, doc: &LopdfDocument, bytes: &[u8]) -> Vec<Glyph> {
        match &self.decoder {
            Decoder::SingleByte(table) => bytes
                .iter()
                .map(|&b| Glyph {
                    text: table[usize::from(b)].clone(),
                    width: self.width_of(b),
                    is_space: b == b' ',
                })
                .collect(),
            Decoder::Composite(dict) => {
                let text = dict
                    .get_font_encoding(doc)
                    .ok()
                    .and_then(|enc| LopdfDocument::decode_text(&enc, bytes).ok())
                    .unwrap_or_else(|| decode_text_simple(bytes));
                text.chars()
                    .map(|ch| Glyph {
                        text: ch.to_string(),
                        width: self.default_width,
                        is_space: false,
                    })
                    .collect()
            }
        }
    }
}

/// Collects positioned glyphs from content streams.
pub struct GlyphWalker<'a> {
    doc: &'a LopdfDocument,
    /// Left edge of the page box in user space
    origin_x: f32,
    /// Top edge of the page box in user space
    top_y: f32,
    chars: Vec<TextChar>,
}

impl<'a> GlyphWalker<'a> {
    /// Create a walker for a page whose box has its left edge at `origin_x`
    /// and its top edge at `top_y`.
    pub fn new(doc: &'a LopdfDocument, origin_x: f32, top_y: f32) -> Self {
        Self {
            doc,
            origin_x,
            top_y,
            chars: Vec::new(),
        }
    }

    /// Glyphs collected so far.
    pub fn finish(self) -> Vec<TextChar> {
        self.chars
    }

    /// Interpret one content stream with the given resources and initial CTM.
    pub fn walk(
        &mut self,
        content: &[u8],
        resources: Option<&'a Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) -> Result<()> {
        let content = Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;
        let fonts = self.load_fonts(resources);
        let fallback = FontInfo::fallback();

        let mut state = GraphicsState {
            ctm,
            text: TextState::default(),
        };
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut tm = Matrix::IDENTITY;
        let mut tlm = Matrix::IDENTITY;

        for op in &content.operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "q" => stack.push(state.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.ctm = m.then(&state.ctm);
                    }
                }
                "BT" => {
                    tm = Matrix::IDENTITY;
                    tlm = Matrix::IDENTITY;
                }
                "Tc" => set_number(operands, 0, &mut state.text.char_spacing),
                "Tw" => set_number(operands, 0, &mut state.text.word_spacing),
                "Tz" => {
                    if let Some(scale) = operands.first().and_then(get_number) {
                        state.text.horizontal_scale = scale / 100.0;
                    }
                }
                "TL" => set_number(operands, 0, &mut state.text.leading),
                "Ts" => set_number(operands, 0, &mut state.text.rise),
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        state.text.font = name.clone();
                    }
                    set_number(operands, 1, &mut state.text.size);
                }
                "Td" | "TD" => {
                    if let (Some(tx), Some(ty)) = (
                        operands.first().and_then(get_number),
                        operands.get(1).and_then(get_number),
                    ) {
                        if op.operator == "TD" {
                            state.text.leading = -ty;
                        }
                        tlm = Matrix::translation(tx, ty).then(&tlm);
                        tm = tlm;
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        tlm = m;
                        tm = m;
                    }
                }
                "T*" => {
                    tlm = Matrix::translation(0.0, -state.text.leading).then(&tlm);
                    tm = tlm;
                }
                "Tj" | "'" | "\"" => {
                    if op.operator != "Tj" {
                        if op.operator == "\"" {
                            set_number(operands, 0, &mut state.text.word_spacing);
                            set_number(operands, 1, &mut state.text.char_spacing);
                        }
                        tlm = Matrix::translation(0.0, -state.text.leading).then(&tlm);
                        tm = tlm;
                    }
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = operands.get(text_idx) {
                        let font = fonts.get(&state.text.font).unwrap_or(&fallback);
                        self.show_string(bytes, font, &state, &mut tm);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let font = fonts.get(&state.text.font).unwrap_or(&fallback);
                        for item in items {
                            match item {
                                Object::String(bytes, _) => {
                                    self.show_string(bytes, font, &state, &mut tm)
                                }
                                other => {
                                    if let Some(adjust) = get_number(other) {
                                        let ts = &state.text;
                                        let tx = -adjust / 1000.0 * ts.size * ts.horizontal_scale;
                                        tm = Matrix::translation(tx, 0.0).then(&tm);
                                    }
                                }
                            }
                        }
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.draw_form(name, resources, &state.ctm, depth);
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn load_fonts(&self, resources: Option<&'a Dictionary>) -> HashMap<Vec<u8>, FontInfo<'a>> {
        let doc = self.doc;
        resources
            .and_then(|res| res.get(b"Font").ok())
            .and_then(|o| resolve_dict(doc, o))
            .map(|fonts| {
                fonts
                    .iter()
                    .filter_map(|(name, obj)| {
                        resolve_dict(doc, obj).map(|dict| (name.clone(), FontInfo::load(doc, dict)))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn show_string(&mut self, bytes: &[u8], font: &FontInfo<'_>, state: &GraphicsState, tm: &mut Matrix) {
        let ts = &state.text;
        let glyph_space =
            Matrix::new(ts.size * ts.horizontal_scale, 0.0, 0.0, ts.size, 0.0, ts.rise);

        for glyph in font.glyphs(self.doc, bytes) {
            let trm = glyph_space.then(tm).then(&state.ctm);
            let w0 = glyph.width / 1000.0;

            if !glyph.text.is_empty() {
                let (x_start, _) = trm.apply(0.0, 0.0);
                let (x_end, _) = trm.apply(w0, 0.0);
                let (_, y_high) = trm.apply(0.0, ASCENT);
                let (_, y_low) = trm.apply(0.0, DESCENT);
                let size = (trm.c * trm.c + trm.d * trm.d).sqrt();

                self.chars.push(TextChar {
                    text: glyph.text,
                    x0: x_start.min(x_end) - self.origin_x,
                    x1: x_start.max(x_end) - self.origin_x,
                    top: self.top_y - y_high.max(y_low),
                    bottom: self.top_y - y_high.min(y_low),
                    size,
                });
            }

            let spacing = ts.char_spacing + if glyph.is_space { ts.word_spacing } else { 0.0 };
            let tx = (w0 * ts.size + spacing) * ts.horizontal_scale;
            *tm = Matrix::translation(tx, 0.0).then(tm);
        }
    }

    fn draw_form(
        &mut self,
        name: &[u8],
        resources: Option<&'a Dictionary>,
        ctm: &Matrix,
        depth: usize,
    ) {
        if depth >= MAX_FORM_DEPTH {
            log::debug!("Form XObject nesting deeper than {}, skipping", MAX_FORM_DEPTH);
            return;
        }

        let doc = self.doc;
        let stream = resources
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|o| resolve_dict(doc, o))
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|o| resolve(doc, o).as_stream().ok());
        let Some(stream) = stream else {
            return;
        };
        if stream.dict.get(b"Subtype").and_then(|o| o.as_name()).ok() != Some(b"Form".as_slice()) {
            return;
        }

        let matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .and_then(|arr| Matrix::from_operands(arr))
            .unwrap_or_default();
        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve_dict(doc, o))
            .or(resources);

        let result = stream_content(stream)
            .and_then(|content| self.walk(&content, form_resources, matrix.then(ctm), depth + 1));
        if let Err(e) = result {
            log::debug!(
                "Skipping form XObject {}: {}",
                String::from_utf8_lossy(name),
                e
            );
        }
    }
}

fn set_number(operands: &[Object], idx: usize, target: &mut f32) {
    if let Some(value) = operands.get(idx).and_then(get_number) {
        *target = value;
    }
}

/// Helper to extract a number from a PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Follow a single indirect reference.
pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

pub(crate) fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, obj).as_dict().ok()
}

/// Stream bytes with filters applied; unfiltered streams are returned as is.
pub(crate) fn stream_content(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|e| Error::PdfParse(e.to_string()))
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
