//! Container reader - pulls a named member out of a ZIP-packaged document.

use crate::detect::{self, FileKind};
use crate::{error::Error, Result};
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// Member holding the document's text content.
pub const CONTENT_ENTRY: &str = "content.xml";

/// An input file identified by its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    path: PathBuf,
}

impl SourceDocument {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name including extension, e.g. `dilekce.udf`.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without extension, e.g. `dilekce`.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Reads the document's `content.xml` as UTF-8 text.
    pub fn read_content(&self) -> Result<String> {
        read_entry_string(&self.path, CONTENT_ENTRY)
    }
}

/// Returns the raw bytes of `entry` from the ZIP container at `path`.
///
/// The file is read and released before this returns, on success and on error.
///
/// # Errors
///
/// * [`Error::Io`] if the file cannot be read.
/// * [`Error::Container`] if the file is not a ZIP archive.
/// * [`Error::EntryNotFound`] if the archive has no member named `entry`.
pub fn read_entry<P: AsRef<Path>>(path: P, entry: &str) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;

    let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).map_err(|e| {
        let kind = detect::sniff(&bytes);
        if kind == FileKind::Zip {
            Error::Container(format!("{}: {}", path.display(), e))
        } else {
            Error::Container(format!(
                "{}: expected a ZIP container, found {}",
                path.display(),
                kind
            ))
        }
    })?;

    let mut file = archive.by_name(entry).map_err(|e| match e {
        ZipError::FileNotFound => Error::EntryNotFound(entry.to_string()),
        other => Error::Container(format!("{}: {}", path.display(), other)),
    })?;

    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(content)
}

/// Same as [`read_entry`], decoding the member as UTF-8.
///
/// # Errors
///
/// Everything [`read_entry`] returns, plus [`Error::MalformedXml`] when the
/// member is not valid UTF-8.
pub fn read_entry_string<P: AsRef<Path>>(path: P, entry: &str) -> Result<String> {
    let bytes = read_entry(path, entry)?;
    String::from_utf8(bytes)
        .map_err(|e| Error::MalformedXml(format!("{entry} is not valid UTF-8: {e}")))
}
