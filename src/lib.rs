//! # udf2pdf
//!
//! Converts packaged court documents (UDF: a ZIP container holding a
//! `content.xml` payload) into PDF or plain text.
//!
//! ## Example
//!
//! ```no_run
//! use udf2pdf::{ConversionMode, ConvertOptions, Converter};
//! use std::path::Path;
//!
//! let options = ConvertOptions {
//!     mode: ConversionMode::Structured,
//!     ..Default::default()
//! };
//!
//! let converter = Converter::new(options).unwrap();
//! let pdf = converter
//!     .convert_file(Path::new("dilekce.udf"), Path::new("out"))
//!     .unwrap();
//! println!("{}", pdf.display());
//! ```

pub mod adapters;
pub mod batch;
pub mod converter;
pub mod core;
pub mod detect;
pub mod error;
pub mod render;
pub mod template;

pub use batch::{BatchOptions, BatchReport, FileOutcome};
pub use converter::{Converter, Rendered};
pub use error::{Error, Result};
pub use template::{PlainTemplate, TemplateKind, TemplateStrategy, UyapTemplate};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Options for converting a single document.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Which extraction and layout pipeline to run.
    pub mode: ConversionMode,
    /// Unicode fonts to try before falling back to Helvetica.
    pub fonts: FontConfig,
    /// Template whose placeholders are stripped and markers emphasized.
    pub template: TemplateKind,
    /// Whether flat PDFs get a `Document: <name>` header.
    pub header: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            mode: ConversionMode::Flat,
            fonts: FontConfig::default(),
            template: TemplateKind::Uyap,
            header: true,
        }
    }
}

/// Pipeline applied to each input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionMode {
    /// All text nodes, one line each, manually paginated.
    #[default]
    Flat,
    /// Title block plus styled lines, flow layout.
    Professional,
    /// Paragraphs and tables from the document body, flow layout.
    Structured,
    /// Plain `.txt` output with a banner.
    Text,
    /// `.txt` input rendered line by line.
    PlainText,
}

impl ConversionMode {
    pub fn input_extension(self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            _ => "udf",
        }
    }

    pub fn output_extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            _ => "pdf",
        }
    }
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Flat => "flat",
            Self::Professional => "professional",
            Self::Structured => "structured",
            Self::Text => "text",
            Self::PlainText => "plain-text",
        };
        f.write_str(name)
    }
}

impl FromStr for ConversionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flat" => Ok(Self::Flat),
            "professional" => Ok(Self::Professional),
            "structured" => Ok(Self::Structured),
            "text" => Ok(Self::Text),
            "plain-text" | "plaintext" => Ok(Self::PlainText),
            _ => Err(format!(
                "unknown mode: '{s}' (expected: flat, professional, structured, text, plain-text)"
            )),
        }
    }
}

/// Regular and bold TrueType font files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontConfig {
    pub regular: PathBuf,
    pub bold: PathBuf,
}

impl Default for FontConfig {
    #[cfg(target_os = "windows")]
    fn default() -> Self {
        Self {
            regular: PathBuf::from("C:/Windows/Fonts/arial.ttf"),
            bold: PathBuf::from("C:/Windows/Fonts/arialbd.ttf"),
        }
    }

    #[cfg(target_os = "macos")]
    fn default() -> Self {
        Self {
            regular: PathBuf::from("/Library/Fonts/Arial.ttf"),
            bold: PathBuf::from("/Library/Fonts/Arial Bold.ttf"),
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    fn default() -> Self {
        Self {
            regular: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
            bold: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
        }
    }
}
