//! # untext
//!
//! Document-to-text conversion for Rust.
//!
//! Word-processor documents (`.docx`) and text-bearing PDFs are read into a
//! format-neutral [`DocumentModel`] of paragraphs and tables, then written
//! out as plain text, optionally split into overlapping fixed-size chunks.
//!
//! ## Quick Start
//!
//! ```no_run
//! use untext::{convert, ReadOptions, WriteOptions};
//!
//! fn main() -> untext::Result<()> {
//!     let read = ReadOptions::default().with_headers(true);
//!     let write = WriteOptions::default().with_chunking(12_000, 300);
//!
//!     for path in convert("report.docx", "out/report.txt", &read, &write)? {
//!         println!("wrote {}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Extending
//!
//! Readers and writers are plugins looked up by file extension in a
//! [`PluginRegistry`]. Implement [`DocumentReader`] or [`DocumentWriter`],
//! register it, and hand the registry to a [`ConversionEngine`].
//!
//! ## Features
//!
//! - **DOCX**: body paragraphs and tables in document order, section
//!   headers and footers, merged-cell grid padding
//! - **PDF**: line reconstruction from positioned text, layout-based
//!   table detection
//! - **Plain text**: `tsv` or `pipe` tables, injectable marker tokens,
//!   optional UTF-8 BOM
//! - **Chunking**: character-exact overlapping windows, safe for any script
//! - **Batches**: per-file error isolation, optional parallelism via Rayon

pub mod batch;
pub mod chunk;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod options;
pub mod reader;
pub mod registry;
pub mod writer;

// Re-export commonly used types
pub use batch::{convert_batch, BatchItem, BatchOptions, BatchReport, CHUNK_FOLDER};
pub use chunk::chunk_text;
pub use engine::{convert, ConversionEngine};
pub use error::{Error, PluginSide, Result};
pub use model::{Block, DocumentModel, Metadata, ParagraphBlock, Region, TableBlock};
pub use normalize::normalize_text;
pub use options::{Markers, ReadOptions, TableFormat, WriteOptions};
pub use reader::{DocumentReader, DocxReader, PdfReader};
pub use registry::PluginRegistry;
pub use writer::{DocumentWriter, TextWriter};

/// Sorted input extensions supported by the built-in readers.
pub fn available_inputs() -> Vec<String> {
    engine::default_engine()
        .registry()
        .available_inputs()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Sorted output extensions supported by the built-in writers.
pub fn available_outputs() -> Vec<String> {
    engine::default_engine()
        .registry()
        .available_outputs()
        .into_iter()
        .map(str::to_string)
        .collect()
}
