//! Word-processor (`.docx`) reader.
//!
//! A DOCX file is a zip package of WordprocessingML parts. The reader pulls
//! `word/document.xml`, resolves section header/footer parts through
//! `word/_rels/document.xml.rels`, and walks each part with a streaming
//! XML parser.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::model::{DocumentModel, ParagraphBlock, Region, TableBlock};
use crate::normalize::normalize_text;
use crate::options::ReadOptions;

use super::DocumentReader;

const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS: &str = "word/_rels/document.xml.rels";

/// DOCX document reader.
#[derive(Debug, Clone, Default)]
pub struct DocxReader {
    _private: (),
}

impl DocxReader {
    /// Create a new DOCX reader.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentReader for DocxReader {
    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn read(&self, path: &Path, options: &ReadOptions) -> Result<DocumentModel> {
        let file = File::open(path)?;
        let mut package = Package::open(BufReader::new(file))
            .map_err(|e| Error::Docx(format!("Cannot open '{}': {}", path.display(), e)))?;

        let body = package.document()?;
        log::debug!(
            "docx {}: {} body items, {} sections",
            path.display(),
            body.items.len(),
            body.sections.len()
        );

        let mut doc = DocumentModel::for_source(path.to_string_lossy(), "docx");
        doc.set_meta("sections", body.sections.len());

        if options.include_headers {
            let refs = resolve_linked(&body.sections, |s| s.header.clone());
            emit_section_parts(&mut doc, &mut package, &refs, Region::Header, options)?;
        }
        if options.include_footers {
            let refs = resolve_linked(&body.sections, |s| s.footer.clone());
            emit_section_parts(&mut doc, &mut package, &refs, Region::Footer, options)?;
        }

        for item in body.items {
            match item {
                BodyItem::Paragraph(raw) => {
                    let text = normalize_text(&raw);
                    if !text.is_empty() || options.keep_empty_paragraphs {
                        doc.push(ParagraphBlock::new(text));
                    }
                }
                BodyItem::Table(rows) if options.include_tables => {
                    doc.push(TableBlock::new(rows));
                }
                BodyItem::Table(_) => {}
            }
        }

        Ok(doc)
    }
}

/// For each section, emit a `Section N` marker then the part's paragraphs
/// and tables.
fn emit_section_parts<R: Read + Seek>(
    doc: &mut DocumentModel,
    package: &mut Package<R>,
    refs: &[Option<String>],
    region: Region,
    options: &ReadOptions,
) -> Result<()> {
    for (i, rel_id) in refs.iter().enumerate() {
        doc.push(ParagraphBlock::in_region(format!("Section {}", i + 1), region));

        let Some(rel_id) = rel_id else {
            continue;
        };
        let Some(part) = package.related_part(rel_id)? else {
            continue;
        };

        for item in &part.items {
            if let BodyItem::Paragraph(raw) = item {
                let text = normalize_text(raw);
                if !text.is_empty() || options.keep_empty_paragraphs {
                    doc.push(ParagraphBlock::in_region(text, region));
                }
            }
        }
        if options.include_tables {
            for item in &part.items {
                if let BodyItem::Table(rows) = item {
                    doc.push(TableBlock::in_region(rows.clone(), region));
                }
            }
        }
    }
    Ok(())
}

/// A section without its own reference shows the previous section's part.
fn resolve_linked<F>(sections: &[SectionRefs], pick: F) -> Vec<Option<String>>
where
    F: Fn(&SectionRefs) -> Option<String>,
{
    let mut current: Option<String> = None;
    sections
        .iter()
        .map(|s| {
            if let Some(id) = pick(s) {
                current = Some(id);
            }
            current.clone()
        })
        .collect()
}

/// An opened DOCX zip package.
struct Package<R: Read + Seek> {
    archive: ZipArchive<R>,
    entry_names: Vec<String>,
    relationships: Option<HashMap<String, String>>,
    parts: HashMap<String, PartContent>,
}

impl<R: Read + Seek> Package<R> {
    fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        let entry_names = archive.file_names().map(str::to_string).collect();
        Ok(Self {
            archive,
            entry_names,
            relationships: None,
            parts: HashMap::new(),
        })
    }

    fn entry_bytes(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let Some(actual) = self
            .entry_names
            .iter()
            .find(|n| n.eq_ignore_ascii_case(name))
            .cloned()
        else {
            return Ok(None);
        };
        let mut entry = self.archive.by_name(&actual)?;
        let mut buffer = Vec::new();
        entry.read_to_end(&mut buffer)?;
        Ok(Some(buffer))
    }

    fn document(&mut self) -> Result<PartContent> {
        let data = self
            .entry_bytes(DOCUMENT_PART)?
            .ok_or_else(|| Error::Docx(format!("missing {}", DOCUMENT_PART)))?;
        parse_part(&data)
    }

    /// Parse the part a relationship id points to, caching by target.
    fn related_part(&mut self, rel_id: &str) -> Result<Option<&PartContent>> {
        if self.relationships.is_none() {
            let rels = match self.entry_bytes(DOCUMENT_RELS)? {
                Some(data) => parse_relationships(&data)?,
                None => HashMap::new(),
            };
            self.relationships = Some(rels);
        }

        let Some(target) = self
            .relationships
            .as_ref()
            .and_then(|rels| rels.get(rel_id))
            .map(|t| resolve_target(t))
        else {
            log::warn!("relationship {} not found in {}", rel_id, DOCUMENT_RELS);
            return Ok(None);
        };

        if !self.parts.contains_key(&target) {
            match self.entry_bytes(&target)? {
                Some(data) => {
                    let part = parse_part(&data)?;
                    self.parts.insert(target.clone(), part);
                }
                None => {
                    log::warn!("part {} referenced by {} is missing", target, rel_id);
                    return Ok(None);
                }
            }
        }
        Ok(self.parts.get(&target))
    }
}

/// Turn a relationship target into a package entry name.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if let Some(up) = target.strip_prefix("../") {
        up.to_string()
    } else {
        format!("word/{}", target)
    }
}

fn parse_relationships(data: &[u8]) -> Result<HashMap<String, String>> {
    let mut reader = XmlReader::from_reader(Cursor::new(data));
    let mut buf = Vec::new();
    let mut relationships = HashMap::new();
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attr_value(e, b"Id").unwrap_or_default();
                let target = attr_value(e, b"Target").unwrap_or_default();
                if !id.is_empty() && !target.is_empty() {
                    relationships.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(relationships)
}

fn attr_value(element: &BytesStart, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .with_checks(false)
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// A top-level item of a story part (document body, header, footer).
#[derive(Debug, Clone, PartialEq, Eq)]
enum BodyItem {
    /// Raw (not yet normalized) paragraph text
    Paragraph(String),
    /// Normalized cell text, rows padded for grid offsets
    Table(Vec<Vec<String>>),
}

/// Default header/footer relationship ids of one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SectionRefs {
    header: Option<String>,
    footer: Option<String>,
}

#[derive(Debug, Default)]
struct PartContent {
    items: Vec<BodyItem>,
    sections: Vec<SectionRefs>,
}

#[derive(Debug, Default)]
struct OpenTable {
    rows: Vec<Vec<String>>,
    row: Option<OpenRow>,
    cell: Option<OpenCell>,
    /// Latest text per grid column, inherited by vertical merge continuations
    column_text: Vec<String>,
}

#[derive(Debug, Default)]
struct OpenRow {
    cells: Vec<String>,
    grid_before: usize,
    grid_after: usize,
}

#[derive(Debug)]
struct OpenCell {
    paragraphs: Vec<String>,
    span: usize,
    continues_above: bool,
}

/// Streaming state for one WordprocessingML part.
#[derive(Debug, Default)]
struct PartParser {
    content: PartContent,
    tables: Vec<OpenTable>,
    paragraph: Option<String>,
    section: Option<SectionRefs>,
    in_run: bool,
    in_text: bool,
    skip_depth: usize,
}

fn parse_part(data: &[u8]) -> Result<PartContent> {
    let mut reader = XmlReader::from_reader(Cursor::new(data));
    let mut buf = Vec::new();
    let mut parser = PartParser::default();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => parser.open(e, false),
            Event::Empty(ref e) => parser.open(e, true),
            Event::End(ref e) => parser.close(e.local_name().as_ref()),
            Event::Text(ref t) => {
                if parser.in_text && parser.skip_depth == 0 {
                    let text = t
                        .unescape()
                        .unwrap_or_else(|_| String::from_utf8_lossy(t));
                    parser.push_text(&text);
                }
            }
            Event::CData(ref t) => {
                if parser.in_text && parser.skip_depth == 0 {
                    parser.push_text(&String::from_utf8_lossy(t));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(parser.content)
}

/// Subtrees whose text never reaches the visible story: text boxes,
/// markup-compatibility fallbacks, deleted/moved-away runs and
/// revision-tracking snapshots of old properties.
fn is_skipped(name: &[u8]) -> bool {
    matches!(name, b"txbxContent" | b"Fallback" | b"del" | b"moveFrom") || name.ends_with(b"Change")
}

impl PartParser {
    fn open(&mut self, e: &BytesStart, empty: bool) {
        if self.skip_depth > 0 {
            if !empty {
                self.skip_depth += 1;
            }
            return;
        }

        let name = e.local_name();
        match name.as_ref() {
            n if is_skipped(n) => {
                if !empty {
                    self.skip_depth = 1;
                }
            }
            b"p" => {
                self.paragraph = Some(String::new());
                if empty {
                    self.finish_paragraph();
                }
            }
            b"r" => self.in_run = !empty,
            b"t" => self.in_text = !empty && self.paragraph.is_some(),
            b"tab" if self.in_run => self.push_text("\t"),
            b"br" | b"cr" if self.in_run => {
                let kind = attr_value(e, b"type");
                if matches!(kind.as_deref(), None | Some("textWrapping")) {
                    self.push_text("\n");
                }
            }
            b"noBreakHyphen" if self.in_run => self.push_text("-"),
            b"tbl" => {
                self.tables.push(OpenTable::default());
                if empty {
                    self.finish_table();
                }
            }
            b"tr" => {
                if let Some(table) = self.tables.last_mut() {
                    table.row = Some(OpenRow::default());
                }
                if empty {
                    self.finish_row();
                }
            }
            b"tc" => {
                if let Some(table) = self.tables.last_mut() {
                    table.cell = Some(OpenCell {
                        paragraphs: Vec::new(),
                        span: 1,
                        continues_above: false,
                    });
                }
                if empty {
                    self.finish_cell();
                }
            }
            b"gridBefore" | b"gridAfter" | b"gridSpan" => {
                let count = attr_value(e, b"val")
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                self.set_grid(name.as_ref(), count);
            }
            b"vMerge" => {
                // A missing value means "continue".
                let restart = attr_value(e, b"val").as_deref() == Some("restart");
                if let Some(cell) = self.tables.last_mut().and_then(|t| t.cell.as_mut()) {
                    cell.continues_above = !restart;
                }
            }
            b"sectPr" => {
                self.section = Some(SectionRefs::default());
                if empty {
                    self.finish_section();
                }
            }
            b"headerReference" | b"footerReference" => {
                let kind = attr_value(e, b"type");
                if !matches!(kind.as_deref(), None | Some("default")) {
                    return;
                }
                let id = attr_value(e, b"id");
                if let Some(section) = self.section.as_mut() {
                    if name.as_ref() == b"headerReference" {
                        section.header = id;
                    } else {
                        section.footer = id;
                    }
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return;
        }
        match name {
            b"t" => self.in_text = false,
            b"r" => self.in_run = false,
            b"p" => self.finish_paragraph(),
            b"tc" => self.finish_cell(),
            b"tr" => self.finish_row(),
            b"tbl" => self.finish_table(),
            b"sectPr" => self.finish_section(),
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.push_str(text);
        }
    }

    fn set_grid(&mut self, name: &[u8], count: usize) {
        let Some(table) = self.tables.last_mut() else {
            return;
        };
        match name {
            b"gridSpan" => {
                if let Some(cell) = table.cell.as_mut() {
                    cell.span = count.max(1);
                }
            }
            b"gridBefore" => {
                if let Some(row) = table.row.as_mut() {
                    row.grid_before = count;
                }
            }
            _ => {
                if let Some(row) = table.row.as_mut() {
                    row.grid_after = count;
                }
            }
        }
    }

    fn finish_paragraph(&mut self) {
        self.in_run = false;
        self.in_text = false;
        let Some(text) = self.paragraph.take() else {
            return;
        };
        match self.tables.last_mut() {
            None => self.content.items.push(BodyItem::Paragraph(text)),
            Some(table) => {
                if let Some(cell) = table.cell.as_mut() {
                    cell.paragraphs.push(text);
                }
            }
        }
    }

    fn finish_cell(&mut self) {
        let Some(table) = self.tables.last_mut() else {
            return;
        };
        let Some(cell) = table.cell.take() else {
            return;
        };
        let row = table.row.get_or_insert_with(OpenRow::default);
        let column = row.grid_before + row.cells.len();
        let text = if cell.continues_above {
            table.column_text.get(column).cloned().unwrap_or_default()
        } else {
            normalize_text(&cell.paragraphs.join("\n"))
        };

        // A horizontally merged cell repeats in every grid column it covers.
        if table.column_text.len() < column + cell.span {
            table.column_text.resize(column + cell.span, String::new());
        }
        for slot in &mut table.column_text[column..column + cell.span] {
            slot.clone_from(&text);
        }
        row.cells.extend(std::iter::repeat(text).take(cell.span));
    }

    fn finish_row(&mut self) {
        let Some(table) = self.tables.last_mut() else {
            return;
        };
        let Some(row) = table.row.take() else {
            return;
        };
        let mut cells = Vec::with_capacity(row.grid_before + row.cells.len() + row.grid_after);
        cells.extend(std::iter::repeat(String::new()).take(row.grid_before));
        cells.extend(row.cells);
        cells.extend(std::iter::repeat(String::new()).take(row.grid_after));
        table.rows.push(cells);
    }

    fn finish_table(&mut self) {
        let Some(table) = self.tables.pop() else {
            return;
        };
        if self.tables.is_empty() {
            self.content.items.push(BodyItem::Table(table.rows));
        } else {
            // Nested tables do not contribute to the enclosing cell's text.
            log::debug!("dropping nested table with {} rows", table.rows.len());
        }
    }

    fn finish_section(&mut self) {
        if let Some(section) = self.section.take() {
            self.content.sections.push(section);
        }
    }
}
