//! PDF reader.
//!
//! Text-bearing PDFs only: page text comes from the content streams'
//! show-text operators, tables from span alignment. Scanned pages carry no
//! text and produce nothing.

mod layout;
mod table_detector;

pub use layout::TextSpan;
pub use table_detector::{DetectedTable, TableDetector, TableDetectorConfig};

use std::fs::File;
use std::io::Read;
use std::path::Path;

use lopdf::Document as LopdfDocument;

use crate::error::{Error, Result};
use crate::model::{DocumentModel, ParagraphBlock, TableBlock};
use crate::normalize::normalize_text;
use crate::options::ReadOptions;

use super::DocumentReader;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// PDF document reader.
#[derive(Debug, Clone, Default)]
pub struct PdfReader {
    detector: TableDetector,
}

impl PdfReader {
    /// Create a new PDF reader with the default table detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom table detector configuration.
    pub fn with_table_detector(mut self, config: TableDetectorConfig) -> Self {
        self.detector = TableDetector::with_config(config);
        self
    }

    fn open(&self, path: &Path) -> Result<LopdfDocument> {
        let unreadable = || Error::PdfUnreadable {
            path: path.display().to_string(),
        };

        if !has_pdf_magic(path)? {
            log::debug!("{} lacks the %PDF- header", path.display());
            return Err(unreadable());
        }

        let doc = LopdfDocument::load(path).map_err(|e| {
            log::debug!("lopdf failed on {}: {}", path.display(), e);
            unreadable()
        })?;
        if doc.is_encrypted() {
            return Err(unreadable());
        }
        Ok(doc)
    }

    /// Text lines of one page, top first.
    ///
    /// Falls back to lopdf's plain extraction when the content stream
    /// cannot be interpreted.
    fn page_lines(
        &self,
        doc: &LopdfDocument,
        page_num: u32,
        spans: &[TextSpan],
        keep_empty: bool,
    ) -> Vec<String> {
        let raw: Vec<String> = if spans.is_empty() {
            match doc.extract_text(&[page_num]) {
                Ok(text) => text.lines().map(str::to_string).collect(),
                Err(e) => {
                    log::debug!("page {}: no extractable text ({})", page_num, e);
                    Vec::new()
                }
            }
        } else {
            layout::group_into_lines(spans.to_vec())
                .iter()
                .map(layout::TextLine::text)
                .collect()
        };

        clean_lines(&raw, keep_empty)
    }
}

/// Normalize raw page lines.
///
/// Blank lines inside the page survive only with `keep_empty`; a page with
/// no text at all yields nothing.
fn clean_lines(raw: &[String], keep_empty: bool) -> Vec<String> {
    let cleaned = normalize_text(&raw.join("\n"));
    if cleaned.is_empty() {
        return Vec::new();
    }
    cleaned
        .split('\n')
        .filter(|line| keep_empty || !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl DocumentReader for PdfReader {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn read(&self, path: &Path, options: &ReadOptions) -> Result<DocumentModel> {
        let doc = self.open(path)?;
        let pages = doc.get_pages();

        let mut model = DocumentModel::for_source(path.to_string_lossy(), "pdf");
        model.set_meta("page_count", pages.len());
        model.set_meta("pdf_version", doc.version.to_string());

        for (&page_num, &page_id) in &pages {
            if options.include_headers {
                model.push(ParagraphBlock::header(format!("Page {}", page_num)));
            }

            let spans = layout::extract_page_spans(&doc, page_id).unwrap_or_else(|e| {
                log::warn!("page {}: {}", page_num, e);
                Vec::new()
            });
            log::debug!("page {}: {} spans", page_num, spans.len());

            let lines = self.page_lines(&doc, page_num, &spans, options.keep_empty_paragraphs);
            if lines.is_empty() {
                if options.keep_empty_paragraphs {
                    model.push(ParagraphBlock::new(""));
                }
            } else {
                for line in lines {
                    model.push(ParagraphBlock::new(line));
                }
            }

            if options.include_tables {
                for table in self.detector.detect(&spans) {
                    model.push(TableBlock::new(table.cells()));
                }
            }
        }

        log::debug!(
            "pdf {}: {} pages, {} blocks",
            path.display(),
            pages.len(),
            model.len()
        );
        Ok(model)
    }
}

fn has_pdf_magic(path: &Path) -> Result<bool> {
    let mut header = [0u8; 5];
    let mut file = File::open(path)?;
    let mut filled = 0;
    while filled < header.len() {
        match file.read(&mut header[filled..])? {
            0 => return Ok(false),
            n => filled += n,
        }
    }
    Ok(header == PDF_MAGIC)
}
