//! Content blocks: paragraphs and tables.

use serde::{Deserialize, Serialize};

/// Which part of the source document a block came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Main document content
    #[default]
    Body,
    /// Section or page header
    Header,
    /// Section or page footer
    Footer,
}

/// A single unit of document content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    /// A line or paragraph of prose
    Paragraph(ParagraphBlock),
    /// A grid of cell strings
    Table(TableBlock),
}

impl Block {
    /// Region this block belongs to.
    pub fn region(&self) -> Region {
        match self {
            Block::Paragraph(p) => p.region,
            Block::Table(t) => t.region,
        }
    }

    /// Get as paragraph if this is a paragraph block.
    pub fn as_paragraph(&self) -> Option<&ParagraphBlock> {
        match self {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        }
    }

    /// Get as table if this is a table block.
    pub fn as_table(&self) -> Option<&TableBlock> {
        match self {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        }
    }
}

impl From<ParagraphBlock> for Block {
    fn from(p: ParagraphBlock) -> Self {
        Block::Paragraph(p)
    }
}

impl From<TableBlock> for Block {
    fn from(t: TableBlock) -> Self {
        Block::Table(t)
    }
}

/// A paragraph of already-normalized text.
///
/// The text never contains `\r`; surviving line breaks are `\n`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphBlock {
    /// Normalized text
    pub text: String,
    /// Provenance of the paragraph
    pub region: Region,
}

impl ParagraphBlock {
    /// Create a body paragraph.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            region: Region::Body,
        }
    }

    /// Create a header paragraph.
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            region: Region::Header,
        }
    }

    /// Create a footer paragraph.
    pub fn footer(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            region: Region::Footer,
        }
    }

    /// Create a paragraph in the given region.
    pub fn in_region(text: impl Into<String>, region: Region) -> Self {
        Self {
            text: text.into(),
            region,
        }
    }

    /// Whether this paragraph came from a section header.
    pub fn is_header(&self) -> bool {
        self.region == Region::Header
    }

    /// Whether this paragraph came from a section footer.
    pub fn is_footer(&self) -> bool {
        self.region == Region::Footer
    }
}

/// A table extracted from the source document.
///
/// Rows may differ in length; padding to a rectangle is left to writers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlock {
    /// Row-major cell text, each cell normalized at read time
    pub rows: Vec<Vec<String>>,
    /// Provenance of the table
    pub region: Region,
}

impl TableBlock {
    /// Create a body table.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows,
            region: Region::Body,
        }
    }

    /// Create a table in the given region.
    pub fn in_region(rows: Vec<Vec<String>>, region: Region) -> Self {
        Self { rows, region }
    }

    /// Create a table from string-like values.
    pub fn from_strings<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn max_columns(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether this table came from a section header.
    pub fn is_header(&self) -> bool {
        self.region == Region::Header
    }

    /// Whether this table came from a section footer.
    pub fn is_footer(&self) -> bool {
        self.region == Region::Footer
    }
}
