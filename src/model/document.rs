//! Document-level types.

use super::{Block, ParagraphBlock, TableBlock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Metadata key holding the source file path.
pub const META_SOURCE: &str = "source";

/// Metadata key holding the reader's format tag.
pub const META_TYPE: &str = "type";

/// Free-form document metadata.
pub type Metadata = BTreeMap<String, Value>;

/// The format-neutral intermediate document.
///
/// Built by exactly one reader, consumed by exactly one writer.
/// Block order is output order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentModel {
    /// Content blocks in document order
    pub blocks: Vec<Block>,

    /// Reader-owned metadata; writers must not depend on it
    pub metadata: Metadata,
}

impl DocumentModel {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document tagged with its source path and format.
    pub fn for_source(source: impl Into<String>, doc_type: &str) -> Self {
        let source: String = source.into();
        let mut doc = Self::new();
        doc.set_meta(META_SOURCE, source);
        doc.set_meta(META_TYPE, doc_type);
        doc
    }

    /// Create a document from a list of blocks.
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        Self {
            blocks: blocks.into_iter().collect(),
            metadata: Metadata::new(),
        }
    }

    /// Append a block.
    pub fn push(&mut self, block: impl Into<Block>) {
        self.blocks.push(block.into());
    }

    /// Set a metadata entry.
    pub fn set_meta(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    /// Source file path, if recorded.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(META_SOURCE).and_then(Value::as_str)
    }

    /// Reader format tag (e.g. `"pdf"`), if recorded.
    pub fn doc_type(&self) -> Option<&str> {
        self.metadata.get(META_TYPE).and_then(Value::as_str)
    }

    /// Iterate over paragraph blocks.
    pub fn paragraphs(&self) -> impl Iterator<Item = &ParagraphBlock> {
        self.blocks.iter().filter_map(Block::as_paragraph)
    }

    /// Iterate over table blocks.
    pub fn tables(&self) -> impl Iterator<Item = &TableBlock> {
        self.blocks.iter().filter_map(Block::as_table)
    }

    /// Get the number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
