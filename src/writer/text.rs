//! Plain text writer.

use std::fs;
use std::path::{Path, PathBuf};

use crate::chunk::chunk_text_signed;
use crate::error::Result;
use crate::model::{Block, DocumentModel, ParagraphBlock, Region, TableBlock};
use crate::options::{Markers, TableFormat, WriteOptions};

use super::DocumentWriter;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Plain text (`.txt`) writer.
///
/// Paragraphs become lines, tables become a marker line followed by one
/// line per row and a blank separator. With chunking enabled the text is
/// split into `{stem}_partNNN{ext}` files next to the requested output.
#[derive(Debug, Clone, Default)]
pub struct TextWriter {
    _private: (),
}

impl TextWriter {
    /// Create a new text writer.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentWriter for TextWriter {
    fn supported_extensions(&self) -> &[&str] {
        &["txt"]
    }

    fn name(&self) -> &str {
        "text"
    }

    fn write(
        &self,
        doc: &DocumentModel,
        output_path: &Path,
        options: &WriteOptions,
    ) -> Result<Vec<PathBuf>> {
        let text = render_text(doc, options);

        let folder = output_path.parent().unwrap_or_else(|| Path::new(""));
        if !folder.as_os_str().is_empty() {
            fs::create_dir_all(folder)?;
        }

        if !options.enable_chunk {
            write_encoded(output_path, &text, options.utf8_bom)?;
            log::info!("wrote {} ({} chars)", output_path.display(), text.chars().count());
            return Ok(vec![output_path.to_path_buf()]);
        }

        let stem = output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = output_path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let chunks = chunk_text_signed(&text, options.chunk_size, options.overlap);
        let mut written = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            let path = folder.join(chunk_file_name(&stem, idx + 1, &ext));
            write_encoded(&path, chunk, options.utf8_bom)?;
            written.push(path);
        }
        log::info!(
            "wrote {} chunk files for {}",
            written.len(),
            output_path.display()
        );
        Ok(written)
    }
}

/// Name of the `index`-th (1-based) chunk file.
///
/// The index is zero-padded to at least three digits and widens past 999.
pub fn chunk_file_name(stem: &str, index: usize, ext: &str) -> String {
    format!("{}_part{:03}{}", stem, index, ext)
}

/// Render a document to the exact text the writer would store.
///
/// The result always ends with a single `\n`.
pub fn render_text(doc: &DocumentModel, options: &WriteOptions) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(doc.blocks.len());

    for block in &doc.blocks {
        match block {
            Block::Paragraph(p) => lines.push(render_paragraph(p, &options.markers)),
            Block::Table(t) if options.include_tables => {
                lines.push(options.markers.table.clone());
                lines.extend(format_table(t, options.table_format, options.normalize_tables));
                lines.push(String::new());
            }
            Block::Table(_) => {}
        }
    }

    let mut text = lines.join("\n").trim_end().to_string();
    text.push('\n');
    text
}

fn render_paragraph(p: &ParagraphBlock, markers: &Markers) -> String {
    match p.region {
        Region::Header => format!("{} {}", markers.header, p.text),
        Region::Footer => format!("{} {}", markers.footer, p.text),
        Region::Body => p.text.clone(),
    }
}

/// Format table rows as text lines.
///
/// With `normalize` set, short rows are padded with empty cells up to the
/// widest row. Newlines inside cells are escaped as the two characters `\n`.
pub fn format_table(table: &TableBlock, format: TableFormat, normalize: bool) -> Vec<String> {
    let target_cols = if normalize { table.max_columns() } else { 0 };

    table
        .rows
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(|c| c.replace('\n', "\\n")).collect();
            if cells.len() < target_cols {
                cells.resize(target_cols, String::new());
            }
            match format {
                TableFormat::Tsv => cells.join("\t").trim_end().to_string(),
                TableFormat::Pipe => format!("| {} |", cells.join(" | ")),
            }
        })
        .collect()
}

fn write_encoded(path: &Path, text: &str, bom: bool) -> Result<()> {
    let mut bytes = Vec::with_capacity(text.len() + UTF8_BOM.len());
    if bom {
        bytes.extend_from_slice(UTF8_BOM);
    }
    bytes.extend_from_slice(text.as_bytes());
    fs::write(path, bytes)?;
    Ok(())
}
