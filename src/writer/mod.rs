//! Output format plugins.

mod text;

pub use text::{chunk_file_name, format_table, render_text, TextWriter};

use crate::error::Result;
use crate::model::DocumentModel;
use crate::options::WriteOptions;
use crate::registry::PluginRegistry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Trait for document writers.
///
/// Implement this trait to add support for a new output format.
pub trait DocumentWriter: Send + Sync {
    /// Get the supported file extensions for this writer.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["txt"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this writer.
    fn name(&self) -> &str;

    /// Serialize the model to `output_path`.
    ///
    /// Returns the paths of every file written, in order.
    fn write(
        &self,
        doc: &DocumentModel,
        output_path: &Path,
        options: &WriteOptions,
    ) -> Result<Vec<PathBuf>>;

    /// Check if this writer supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.trim_start_matches('.').to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Register every built-in writer.
pub fn register_defaults(registry: &mut PluginRegistry) {
    registry.register_writer(Arc::new(TextWriter::new()));
}
