//! Positioned text extraction for PDF pages.
//!
//! Walks a page's content stream, tracking the text matrix, and emits one
//! [`TextSpan`] per show-text operator. Spans are then grouped into visual
//! lines by baseline.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

/// Average glyph advance as a fraction of the font size, used when no
/// width metrics are read from the font.
const AVG_CHAR_WIDTH_FACTOR: f32 = 0.5;

/// Leading used by `T*` until a `TL` operator sets one.
const DEFAULT_LEADING: f32 = 12.0;

/// A text span with position and style information.
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
    /// Create a span; the width is estimated from the character count.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32, font_name: impl Into<String>) -> Self {
        let text = text.into();
        let width = text.chars().count() as f32 * font_size * AVG_CHAR_WIDTH_FACTOR;
        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name: font_name.into(),
        }
    }

    /// Right edge of the span.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Spans sharing a baseline, sorted left to right.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        Self { spans }
    }

    /// Combined text, with a space wherever the horizontal gap between two
    /// spans is wider than a fraction of a character.
    ///
    /// No space is inserted between two characters of a script written
    /// without word spaces.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i == 0 {
                result.push_str(&span.text);
                continue;
            }
            let prev = &self.spans[i - 1];
            let gap = span.x - prev.right();

            let char_count = span.text.chars().count();
            let avg_char_width = if char_count > 0 && span.width > 0.0 {
                span.width / char_count as f32
            } else {
                span.font_size * AVG_CHAR_WIDTH_FACTOR
            };

            let spaceless = prev.text.chars().last().is_some_and(is_spaceless_script_char)
                && span.text.chars().next().is_some_and(is_spaceless_script_char);
            let has_space = prev.text.ends_with(is_space) || span.text.starts_with(is_space);

            if gap > avg_char_width * 0.2 && !spaceless && !has_space {
                result.push(' ');
            }
            result.push_str(&span.text);
        }

        result
    }
}

/// Group spans into lines, top of the page first.
///
/// Spans whose baselines differ by at most 30% of the font size share a line.
pub fn group_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

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

/// Extract positioned spans from one page.
pub fn extract_page_spans(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<TextSpan>> {
    let fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| Error::Pdf(format!("page fonts: {}", e)))?;
    let content = doc
        .get_page_content(page_id)
        .map_err(|e| Error::Pdf(format!("page content: {}", e)))?;
    let content = lopdf::content::Content::decode(&content)
        .map_err(|e| Error::Pdf(format!("content stream: {}", e)))?;

    let mut state = TextState::new(doc, &fonts);
    for op in &content.operations {
        state.apply(&op.operator, &op.operands);
    }
    Ok(state.spans)
}

/// Content-stream interpreter state for the text operators.
struct TextState<'a> {
    doc: &'a LopdfDocument,
    fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
    matrix: TextMatrix,
    in_text: bool,
    spans: Vec<TextSpan>,
}

impl<'a> TextState<'a> {
    fn new(doc: &'a LopdfDocument, fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        Self {
            doc,
            fonts,
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            leading: DEFAULT_LEADING,
            matrix: TextMatrix::default(),
            in_text: false,
            spans: Vec::new(),
        }
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "BT" => {
                self.in_text = true;
                self.matrix = TextMatrix::default();
            }
            "ET" => self.in_text = false,
            "Tf" if operands.len() >= 2 => {
                if let Object::Name(key) = &operands[0] {
                    self.font_key = key.clone();
                    self.font_name = self
                        .fonts
                        .get(key)
                        .and_then(|f| f.get(b"BaseFont").ok())
                        .and_then(|o| o.as_name().ok())
                        .map(|n| String::from_utf8_lossy(n).into_owned())
                        .unwrap_or_else(|| String::from_utf8_lossy(key).into_owned());
                }
                self.font_size = get_number(&operands[1]).unwrap_or(12.0);
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(get_number) {
                    self.leading = leading;
                }
            }
            "Td" | "TD" if operands.len() >= 2 => {
                let tx = get_number(&operands[0]).unwrap_or(0.0);
                let ty = get_number(&operands[1]).unwrap_or(0.0);
                if operator == "TD" {
                    self.leading = -ty;
                }
                self.matrix.translate(tx, ty);
            }
            "Tm" if operands.len() >= 6 => {
                let n = |i: usize, default: f32| get_number(&operands[i]).unwrap_or(default);
                self.matrix
                    .set(n(0, 1.0), n(1, 0.0), n(2, 0.0), n(3, 1.0), n(4, 0.0), n(5, 0.0));
            }
            "T*" => self.matrix.translate(0.0, -self.leading),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = self.decode(bytes);
                    self.push_span(text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let text = self.decode_array(items);
                    self.push_span(text);
                }
            }
            "'" | "\"" => {
                self.matrix.translate(0.0, -self.leading);
                let idx = if operator == "\"" { 2 } else { 0 };
                if let Some(Object::String(bytes, _)) = operands.get(idx) {
                    let text = self.decode(bytes);
                    self.push_span(text);
                }
            }
            _ => {}
        }
    }

    fn push_span(&mut self, text: String) {
        if !self.in_text || text.trim().is_empty() {
            return;
        }
        let (x, y) = self.matrix.position();
        let size = self.font_size * self.matrix.scale();
        self.spans
            .push(TextSpan::new(text, x, y, size, self.font_name.clone()));
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let encoding = self
            .fonts
            .get(&self.font_key)
            .and_then(|f| f.get_font_encoding(self.doc).ok());
        match encoding {
            Some(enc) => LopdfDocument::decode_text(&enc, bytes).unwrap_or_else(|e| {
                log::warn!("undecodable PDF string ({}), using fallback", e);
                decode_text_simple(bytes)
            }),
            None => decode_text_simple(bytes),
        }
    }

    /// `TJ` arrays interleave strings with kerning adjustments in thousandths
    /// of an em; a large negative adjustment stands for a word space.
    fn decode_array(&self, items: &[Object]) -> String {
        const SPACE_THRESHOLD: f32 = 200.0;
        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode(bytes)),
                other => {
                    let Some(adjustment) = get_number(other).map(|n| -n) else {
                        continue;
                    };
                    let wants_space = adjustment > SPACE_THRESHOLD
                        && combined
                            .chars()
                            .last()
                            .is_some_and(|c| !is_space(c) && !is_spaceless_script_char(c));
                    if wants_space {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }
}

#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self { a, b, c, d, e, f };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn is_space(c: char) -> bool {
    c == ' ' || c == '\u{00A0}'
}

/// Han ideographs, kana and CJK punctuation; Hangul uses word spaces.
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0x20000..=0x2EBEF
        | 0x3040..=0x309F
        | 0x30A0..=0x30FF
        | 0x3000..=0x303F)
}

/// Decode a string without font encoding: UTF-16BE with BOM, UTF-8, then Latin-1.
fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
