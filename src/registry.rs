//! Extension-to-plugin lookup.
//!
//! The registry maps lowercased file extensions to reader and writer
//! implementations. It is built once at startup (see
//! [`PluginRegistry::with_defaults`]) and only read afterwards, so it can be
//! shared between threads behind an `Arc`.
//!
//! # Example
//!
//! ```
//! use untext::PluginRegistry;
//!
//! let registry = PluginRegistry::with_defaults();
//! assert_eq!(registry.available_inputs(), vec!["docx", "pdf"]);
//! assert_eq!(registry.available_outputs(), vec!["txt"]);
//! assert!(registry.get_reader(".PDF").is_some());
//! ```

use crate::reader::{self, DocumentReader};
use crate::writer::{self, DocumentWriter};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry for document readers and writers.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    readers: HashMap<String, Arc<dyn DocumentReader>>,
    writers: HashMap<String, Arc<dyn DocumentWriter>>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in reader and writer.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        reader::register_defaults(&mut registry);
        writer::register_defaults(&mut registry);
        registry
    }

    /// Register a reader for all its supported extensions.
    ///
    /// A later registration for the same extension replaces the earlier one.
    pub fn register_reader(&mut self, reader: Arc<dyn DocumentReader>) {
        for ext in reader.supported_extensions() {
            log::debug!("registering reader '{}' for .{}", reader.name(), ext);
            self.readers.insert(normalize_extension(ext), reader.clone());
        }
    }

    /// Register a writer for all its supported extensions.
    ///
    /// A later registration for the same extension replaces the earlier one.
    pub fn register_writer(&mut self, writer: Arc<dyn DocumentWriter>) {
        for ext in writer.supported_extensions() {
            log::debug!("registering writer '{}' for .{}", writer.name(), ext);
            self.writers.insert(normalize_extension(ext), writer.clone());
        }
    }

    /// Get a reader by file extension (case-insensitive, dot optional).
    pub fn get_reader(&self, ext: &str) -> Option<Arc<dyn DocumentReader>> {
        self.readers.get(&normalize_extension(ext)).cloned()
    }

    /// Get a writer by file extension (case-insensitive, dot optional).
    pub fn get_writer(&self, ext: &str) -> Option<Arc<dyn DocumentWriter>> {
        self.writers.get(&normalize_extension(ext)).cloned()
    }

    /// Sorted list of extensions that have a reader.
    pub fn available_inputs(&self) -> Vec<&str> {
        sorted_keys(&self.readers)
    }

    /// Sorted list of extensions that have a writer.
    pub fn available_outputs(&self) -> Vec<&str> {
        sorted_keys(&self.writers)
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("inputs", &self.available_inputs())
            .field("outputs", &self.available_outputs())
            .finish()
    }
}

/// Lowercase an extension and drop a leading dot.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}
