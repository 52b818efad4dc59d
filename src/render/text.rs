//! Plain-text rendering with a title banner.

use super::Renderer;
use crate::Result;

const BANNER_WIDTH: usize = 60;

/// Text fragments under a `Document: <name>` banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    pub name: String,
    pub fragments: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

impl Renderer<TextDocument> for TextRenderer {
    type Output = String;

    fn render(&self, document: &TextDocument) -> Result<String> {
        let rule = "=".repeat(BANNER_WIDTH);
        let mut out = format!("{rule}\nDocument: {}\n{rule}\n\n", document.name);
        out.push_str(&document.fragments.join("\n"));
        Ok(out)
    }
}
