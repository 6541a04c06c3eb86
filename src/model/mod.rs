//! Document model types.
//!
//! This module defines the intermediate representation (IR) that decouples
//! readers from writers. The model is format-agnostic: a DOCX reader and a
//! PDF reader both produce the same ordered list of blocks.

mod block;
mod document;

pub use block::{Block, ParagraphBlock, Region, TableBlock};
pub use document::{DocumentModel, Metadata, META_SOURCE, META_TYPE};
