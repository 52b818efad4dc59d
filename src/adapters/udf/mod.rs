//! Readers for packaged court documents (UDF): a ZIP container holding a
//! `content.xml` payload.

mod container;
mod extractor;

use crate::Result;

/// Turns the XML payload of a packaged document into extractor-specific output.
pub trait ContentExtractor {
    type Output;

    fn extract(&self, xml: &str) -> Result<Self::Output>;
}

pub use container::{read_entry, read_entry_string, SourceDocument, CONTENT_ENTRY};
pub use extractor::{FlatText, FlatTextExtractor, LineExtractor, StructuredExtractor};
