//! Error types for udf2pdf.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for udf2pdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting packaged court documents.
#[derive(Error, Debug)]
pub enum Error {
    /// The input is not a readable ZIP container.
    #[error("Not a valid document container: {0}")]
    Container(String),

    /// The container does not hold the expected XML member.
    #[error("Entry not found in container: {0}")]
    EntryNotFound(String),

    /// The XML payload could not be parsed.
    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    /// Extraction succeeded but produced nothing to render.
    #[error("No content could be extracted")]
    EmptyDocument,

    /// A font file could not be loaded. Callers fall back to a base font.
    #[error("Font unavailable: {0}")]
    FontUnavailable(String),

    /// Text contains characters the selected font cannot draw.
    #[error("Cannot encode text with font {font}: {text:?}")]
    Encoding { font: String, text: String },

    /// A style name was registered twice in the same style sheet.
    #[error("Duplicate style: {0}")]
    DuplicateStyle(String),

    /// The configured source directory does not exist.
    #[error("Source directory not found: {}", .0.display())]
    SourceDirMissing(PathBuf),

    /// Error occurred during file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised while assembling or serializing the PDF.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::MalformedXml(err.to_string())
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        match err.into_io_error() {
            Some(io) => Self::Io(io),
            None => Self::Io(std::io::Error::other("filesystem loop while scanning")),
        }
    }
}
