//! Error types for the untext library.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for untext operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which half of a conversion a plugin lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginSide {
    /// Input side (document readers)
    Reader,
    /// Output side (document writers)
    Writer,
}

impl fmt::Display for PluginSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginSide::Reader => write!(f, "reader"),
            PluginSide::Writer => write!(f, "writer"),
        }
    }
}

/// Error types that can occur during document conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No reader or writer is registered for the extension.
    #[error("No {side} found for extension '.{extension}'")]
    UnsupportedExtension {
        /// Which plugin kind was missing
        side: PluginSide,
        /// The lowercased extension, without the leading dot
        extension: String,
    },

    /// A reader or writer failed; the underlying error is kept as the source.
    #[error("Conversion failed: {message}")]
    ConversionFailed {
        /// Message of the underlying failure
        message: String,
        /// The underlying failure
        source: Box<Error>,
    },

    /// The word-processor package could not be read.
    #[error("DOCX error: {0}")]
    Docx(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    Pdf(String),

    /// The PDF could not be opened as a text-bearing document.
    #[error(
        "Cannot open PDF '{path}'. If the file is encrypted or scanned, note that scanned PDFs \
         require OCR which is not supported."
    )]
    PdfUnreadable {
        /// Path of the offending file
        path: String,
    },

    /// The file content does not match its declared format.
    #[error("Unknown file format: {0}")]
    UnknownFormat(String),

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// An option map held a value of the wrong type.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

impl Error {
    /// Wrap a plugin failure into [`Error::ConversionFailed`], keeping its message visible.
    pub fn conversion_failed(source: Error) -> Self {
        Error::ConversionFailed {
            message: source.to_string(),
            source: Box::new(source),
        }
    }

    /// True for [`Error::UnsupportedExtension`].
    pub fn is_unsupported_extension(&self) -> bool {
        matches!(self, Error::UnsupportedExtension { .. })
    }

    /// True for [`Error::ConversionFailed`].
    pub fn is_conversion_failed(&self) -> bool {
        matches!(self, Error::ConversionFailed { .. })
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Pdf(err.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::Docx(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Docx(format!("malformed XML: {}", err))
    }
}
