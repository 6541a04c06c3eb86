//! Single-file conversion orchestration.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::error::{Error, PluginSide, Result};
use crate::options::{ReadOptions, WriteOptions};
use crate::registry::{normalize_extension, PluginRegistry};

/// Resolves a reader and a writer by extension and runs one conversion.
///
/// The engine only reads its registry, so one engine can serve concurrent
/// conversions on disjoint paths.
///
/// # Example
///
/// ```no_run
/// use untext::{ConversionEngine, ReadOptions, WriteOptions};
///
/// let engine = ConversionEngine::with_defaults();
/// let written = engine.convert(
///     "report.docx",
///     "report.txt",
///     &ReadOptions::default(),
///     &WriteOptions::default(),
/// )?;
/// assert_eq!(written.len(), 1);
/// # Ok::<(), untext::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConversionEngine {
    registry: Arc<PluginRegistry>,
}

impl ConversionEngine {
    /// Create an engine over an existing registry.
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    /// Create an engine with every built-in reader and writer.
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(PluginRegistry::with_defaults()))
    }

    /// The registry this engine resolves plugins from.
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Convert `input` into `output`.
    ///
    /// Returns every file written: `output` itself, or the chunk files when
    /// chunking is enabled. Fails with [`Error::UnsupportedExtension`] before
    /// touching the filesystem when either extension has no plugin; any
    /// reader or writer failure comes back as [`Error::ConversionFailed`].
    pub fn convert(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        read_options: &ReadOptions,
        write_options: &WriteOptions,
    ) -> Result<Vec<PathBuf>> {
        let input = input.as_ref();
        let output = output.as_ref();

        let in_ext = extension_of(input);
        let reader = self
            .registry
            .get_reader(&in_ext)
            .ok_or_else(|| Error::UnsupportedExtension {
                side: PluginSide::Reader,
                extension: in_ext.clone(),
            })?;

        let out_ext = extension_of(output);
        let writer = self
            .registry
            .get_writer(&out_ext)
            .ok_or_else(|| Error::UnsupportedExtension {
                side: PluginSide::Writer,
                extension: out_ext.clone(),
            })?;

        log::info!(
            "converting {} -> {} ({} -> {})",
            input.display(),
            output.display(),
            reader.name(),
            writer.name()
        );

        let doc = reader
            .read(input, read_options)
            .map_err(Error::conversion_failed)?;
        log::debug!("{}: {} blocks", input.display(), doc.len());

        writer
            .write(&doc, output, write_options)
            .map_err(Error::conversion_failed)
    }
}

impl Default for ConversionEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Lowercased extension without the dot; empty when the path has none.
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| normalize_extension(&e.to_string_lossy()))
        .unwrap_or_default()
}

pub(crate) fn default_engine() -> &'static ConversionEngine {
    static ENGINE: OnceLock<ConversionEngine> = OnceLock::new();
    ENGINE.get_or_init(ConversionEngine::with_defaults)
}

/// Convert one file with the built-in plugins.
///
/// Shorthand for [`ConversionEngine::convert`] on a process-wide engine
/// created on first use.
pub fn convert(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    read_options: &ReadOptions,
    write_options: &WriteOptions,
) -> Result<Vec<PathBuf>> {
    default_engine().convert(input, output, read_options, write_options)
}
