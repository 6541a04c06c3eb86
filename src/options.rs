//! Read and write options.
//!
//! Callers may build options with the `with_*` methods or from a loose
//! key/value map (`from_map`). Missing keys take their defaults and unknown
//! keys are ignored, so a single map can be handed to any reader or writer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: i64 = 12_000;

/// Default chunk overlap in characters.
pub const DEFAULT_OVERLAP: i64 = 300;

/// Options understood by readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Emit header content as marked blocks
    pub include_headers: bool,

    /// Emit footer content as marked blocks
    pub include_footers: bool,

    /// Extract tables into table blocks
    pub include_tables: bool,

    /// Keep paragraphs whose normalized text is empty
    pub keep_empty_paragraphs: bool,
}

impl ReadOptions {
    /// Create new read options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a loose key/value map.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        from_map(map, "read")
    }

    /// Enable or disable header extraction.
    pub fn with_headers(mut self, include: bool) -> Self {
        self.include_headers = include;
        self
    }

    /// Enable or disable footer extraction.
    pub fn with_footers(mut self, include: bool) -> Self {
        self.include_footers = include;
        self
    }

    /// Enable or disable table extraction.
    pub fn with_tables(mut self, include: bool) -> Self {
        self.include_tables = include;
        self
    }

    /// Keep or drop empty paragraphs.
    pub fn with_empty_paragraphs(mut self, keep: bool) -> Self {
        self.keep_empty_paragraphs = keep;
        self
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            include_headers: false,
            include_footers: false,
            include_tables: true,
            keep_empty_paragraphs: false,
        }
    }
}

/// How table rows are laid out in plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// Cells joined by tabs, trailing whitespace trimmed
    #[default]
    Tsv,
    /// `| cell | cell |`
    Pipe,
}

/// Marker tokens written in front of headers, footers and tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// Line written before each table
    pub table: String,
    /// Prefix for header paragraphs
    pub header: String,
    /// Prefix for footer paragraphs
    pub footer: String,
}

impl Markers {
    /// Create markers from three tokens.
    pub fn new(
        table: impl Into<String>,
        header: impl Into<String>,
        footer: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            header: header.into(),
            footer: footer.into(),
        }
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::new("[TABLE]", "[HEADER]", "[FOOTER]")
    }
}

/// Options understood by writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Render table blocks
    pub include_tables: bool,

    /// Table row layout
    pub table_format: TableFormat,

    /// Pad every row to the widest row before formatting
    pub normalize_tables: bool,

    /// Prepend a UTF-8 byte-order mark to each output file
    pub utf8_bom: bool,

    /// Split the output into overlapping chunk files
    pub enable_chunk: bool,

    /// Chunk size in characters (`<= 0` disables splitting)
    pub chunk_size: i64,

    /// Characters shared by consecutive chunks
    pub overlap: i64,

    /// Marker tokens
    pub markers: Markers,
}

impl WriteOptions {
    /// Create new write options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a loose key/value map.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        from_map(map, "write")
    }

    /// Enable or disable table output.
    pub fn with_tables(mut self, include: bool) -> Self {
        self.include_tables = include;
        self
    }

    /// Set the table format.
    pub fn with_table_format(mut self, format: TableFormat) -> Self {
        self.table_format = format;
        self
    }

    /// Enable or disable row padding.
    pub fn with_normalize_tables(mut self, normalize: bool) -> Self {
        self.normalize_tables = normalize;
        self
    }

    /// Enable or disable the byte-order mark.
    pub fn with_bom(mut self, bom: bool) -> Self {
        self.utf8_bom = bom;
        self
    }

    /// Enable chunked output with the given size and overlap.
    pub fn with_chunking(mut self, chunk_size: i64, overlap: i64) -> Self {
        self.enable_chunk = true;
        self.chunk_size = chunk_size;
        self.overlap = overlap;
        self
    }

    /// Set marker tokens.
    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            include_tables: true,
            table_format: TableFormat::Tsv,
            normalize_tables: true,
            utf8_bom: false,
            enable_chunk: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
            markers: Markers::default(),
        }
    }
}

fn from_map<T: serde::de::DeserializeOwned>(map: &Map<String, Value>, kind: &str) -> Result<T> {
    serde_json::from_value(Value::Object(map.clone()))
        .map_err(|e| Error::InvalidOptions(format!("{} options: {}", kind, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_read_defaults() {
        let opts = ReadOptions::default();
        assert!(!opts.include_headers);
        assert!(!opts.include_footers);
        assert!(opts.include_tables);
        assert!(!opts.keep_empty_paragraphs);
    }

    #[test]
    fn test_write_defaults() {
        let opts = WriteOptions::default();
        assert!(opts.include_tables);
        assert_eq!(opts.table_format, TableFormat::Tsv);
        assert!(opts.normalize_tables);
        assert!(!opts.utf8_bom);
        assert!(!opts.enable_chunk);
        assert_eq!(opts.chunk_size, 12_000);
        assert_eq!(opts.overlap, 300);
        assert_eq!(opts.markers.table, "[TABLE]");
    }

    #[test]
    fn test_from_map_ignores_unknown_keys() {
        let map = as_map(json!({
            "include_headers": true,
            "table_format": "pipe",
            "chunk_size": 50,
            "something_else": [1, 2, 3]
        }));

        let read = ReadOptions::from_map(&map).unwrap();
        assert!(read.include_headers);
        assert!(read.include_tables);

        let write = WriteOptions::from_map(&map).unwrap();
        assert_eq!(write.table_format, TableFormat::Pipe);
        assert_eq!(write.chunk_size, 50);
        assert_eq!(write.overlap, 300);
    }

    #[test]
    fn test_from_map_partial_markers() {
        let map = as_map(json!({ "markers": { "table": "[表格]" } }));
        let write = WriteOptions::from_map(&map).unwrap();
        assert_eq!(write.markers.table, "[表格]");
        assert_eq!(write.markers.header, "[HEADER]");
    }

    #[test]
    fn test_from_map_rejects_wrong_types() {
        let map = as_map(json!({ "include_tables": "yes" }));
        let err = ReadOptions::from_map(&map).unwrap_err();
        assert!(matches!(err, Error::InvalidOptions(_)));
    }

    #[test]
    fn test_builder() {
        let opts = WriteOptions::new()
            .with_table_format(TableFormat::Pipe)
            .with_bom(true)
            .with_chunking(100, 10);
        assert_eq!(opts.table_format, TableFormat::Pipe);
        assert!(opts.utf8_bom);
        assert!(opts.enable_chunk);
        assert_eq!((opts.chunk_size, opts.overlap), (100, 10));
    }
}
