//! Input format plugins.
//!
//! A reader turns one source file into a [`DocumentModel`]. Readers are
//! stateless and shared between conversions, so they must be `Send + Sync`.

mod docx;
mod pdf;

pub use docx::DocxReader;
pub use pdf::{DetectedTable, PdfReader, TableDetector, TableDetectorConfig, TextSpan};

use crate::error::Result;
use crate::model::DocumentModel;
use crate::options::ReadOptions;
use crate::registry::PluginRegistry;
use std::path::Path;
use std::sync::Arc;

/// Trait for document readers.
///
/// Implement this trait to add support for a new input format.
pub trait DocumentReader: Send + Sync {
    /// Get the supported file extensions for this reader.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this reader.
    fn name(&self) -> &str;

    /// Read a file into a fully populated document model.
    ///
    /// On failure no partial model is returned.
    fn read(&self, path: &Path, options: &ReadOptions) -> Result<DocumentModel>;

    /// Check if this reader supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.trim_start_matches('.').to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Register every built-in reader.
pub fn register_defaults(registry: &mut PluginRegistry) {
    registry.register_reader(Arc::new(DocxReader::new()));
    registry.register_reader(Arc::new(PdfReader::new()));
}
