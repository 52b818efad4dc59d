//! File kind detection by magic bytes.

use std::fmt;

/// Coarse classification of an input file based on its first bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Pdf,
    Zip,
    Xml,
    Rtf,
    Unknown,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pdf => "PDF",
            Self::Zip => "ZIP",
            Self::Xml => "XML",
            Self::Rtf => "RTF",
            Self::Unknown => "unknown format",
        };
        write!(f, "{s}")
    }
}

const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const XML_DECL: &[u8] = b"<?xml";
const RTF_MAGIC: &[u8] = b"{\\rtf";

/// Classifies a file from its header bytes.
///
/// Only the first few bytes are inspected, so callers may pass a short prefix.
pub fn sniff(data: &[u8]) -> FileKind {
    if data.starts_with(PDF_MAGIC) {
        FileKind::Pdf
    } else if data.starts_with(ZIP_MAGIC) {
        FileKind::Zip
    } else if data.starts_with(XML_DECL) || data.iter().take(10).any(|&b| b == b'<') {
        FileKind::Xml
    } else if data.starts_with(RTF_MAGIC) {
        FileKind::Rtf
    } else {
        FileKind::Unknown
    }
}
