//! XML content extractors: flat text, structured blocks, and CDATA-aware lines.

use super::ContentExtractor;
use crate::core::ast::{Block, ContentTree};
use crate::core::xml::{parse_document, Tag, TextFragments, XmlElement};
use crate::{error::Error, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Parsed document whose text is read back as a flat fragment sequence.
#[derive(Debug, Clone)]
pub struct FlatText {
    root: XmlElement,
}

impl FlatText {
    /// Trimmed, non-empty text fragments in document order.
    pub fn fragments(&self) -> TextFragments<'_> {
        self.root.text_fragments()
    }

    /// Fragments joined by a single newline.
    pub fn joined(&self) -> String {
        self.fragments().collect::<Vec<_>>().join("\n")
    }
}

/// Full-tree traversal collecting every text node.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlatTextExtractor;

impl ContentExtractor for FlatTextExtractor {
    type Output = FlatText;

    fn extract(&self, xml: &str) -> Result<FlatText> {
        Ok(FlatText {
            root: parse_document(xml)?,
        })
    }
}

/// Walks `office:body/office:text` into paragraph and table blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredExtractor;

impl ContentExtractor for StructuredExtractor {
    type Output = ContentTree;

    /// # Errors
    ///
    /// [`Error::MalformedXml`] if the payload does not parse, and
    /// [`Error::EmptyDocument`] if there is no document body element.
    fn extract(&self, xml: &str) -> Result<ContentTree> {
        let root = parse_document(xml)?;
        let body = root.find_body_text().ok_or(Error::EmptyDocument)?;

        let mut tree = ContentTree::default();
        for child in body.child_elements() {
            match &child.tag {
                Tag::Paragraph => {
                    let text = child.text_content();
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        tree.blocks.push(Block::Paragraph(trimmed.to_string()));
                    }
                }
                Tag::Table => {
                    let rows = Self::table_rows(child);
                    if !rows.is_empty() {
                        tree.blocks.push(Block::Table(rows));
                    }
                }
                Tag::OfficeBody
                | Tag::OfficeText
                | Tag::TableRow
                | Tag::TableCell
                | Tag::Other(_) => {}
            }
        }
        Ok(tree)
    }
}

impl StructuredExtractor {
    /// Rows found anywhere below `table`, dropping rows whose cells are all blank.
    fn table_rows(table: &XmlElement) -> Vec<Vec<String>> {
        table
            .descendants()
            .filter(|el| el.tag == Tag::TableRow)
            .map(|row| {
                row.descendants()
                    .filter(|el| el.tag == Tag::TableCell)
                    .map(|cell| cell.text_content().trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|cells| cells.iter().any(|c| !c.is_empty()))
            .collect()
    }
}

/// Line-oriented extraction that prefers an embedded CDATA blob.
///
/// When the raw payload carries a `<![CDATA[...]]>` section, its inner text is
/// used as-is; otherwise the whole tree's text is concatenated. Either way the
/// result is split on newlines, trimmed, and blank lines are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineExtractor;

fn cdata_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("valid CDATA regex"))
}

impl ContentExtractor for LineExtractor {
    type Output = Vec<String>;

    fn extract(&self, xml: &str) -> Result<Vec<String>> {
        let text = match cdata_pattern().captures(xml).and_then(|c| c.get(1)) {
            Some(inner) => inner.as_str().to_string(),
            None => parse_document(xml)?.text_content(),
        };

        Ok(text
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn odf(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0">
<office:body><office:text>{body}</office:text></office:body>
</office:document-content>"#
        )
    }

    #[test]
    fn test_flat_text_fragments_in_order() {
        let xml = odf("<text:p>Dosya No: <text:span>2024/123</text:span> tail</text:p><text:p>  </text:p><text:p>Son</text:p>");
        let flat = FlatTextExtractor.extract(&xml).unwrap();
        let fragments: Vec<_> = flat.fragments().collect();
        assert_eq!(fragments, vec!["Dosya No:", "2024/123", "tail", "Son"]);
        assert_eq!(flat.joined(), "Dosya No:\n2024/123\ntail\nSon");
    }

    #[test]
    fn test_structured_paragraphs_and_tables() {
        let xml = odf(concat!(
            "<text:p>T.C. <text:span>Mahkeme</text:span></text:p>",
            "<text:p>   </text:p>",
            "<table:table>",
            "<table:table-row><table:table-cell><text:p>A</text:p></table:table-cell><table:table-cell><text:p>B</text:p></table:table-cell></table:table-row>",
            "<table:table-row><table:table-cell><text:p> </text:p></table:table-cell><table:table-cell/></table:table-row>",
            "<table:table-row><table:table-cell><text:p>1</text:p></table:table-cell><table:table-cell/></table:table-row>",
            "</table:table>",
            "<table:table><table:table-row><table:table-cell/></table:table-row></table:table>",
            "<text:h>ignored heading</text:h>",
        ));
        let tree = StructuredExtractor.extract(&xml).unwrap();
        assert_eq!(
            tree.blocks,
            vec![
                Block::Paragraph("T.C. Mahkeme".to_string()),
                Block::Table(vec![
                    vec!["A".to_string(), "B".to_string()],
                    vec!["1".to_string(), String::new()],
                ]),
            ]
        );
    }

    #[test]
    fn test_structured_without_body_is_empty_document() {
        let err = StructuredExtractor.extract("<root><p>x</p></root>").unwrap_err();
        assert!(matches!(err, Error::EmptyDocument));
    }

    #[test]
    fn test_line_extractor_prefers_cdata() {
        let xml = "<template><content><![CDATA[ ALINDI BELGESİ \n\n Dosya No: 1\n]]></content><properties>ignored</properties></template>";
        let lines = LineExtractor.extract(xml).unwrap();
        assert_eq!(lines, vec!["ALINDI BELGESİ", "Dosya No: 1"]);
    }

    #[test]
    fn test_line_extractor_falls_back_to_tree_text() {
        let xml = "<a>first\n<b>second</b>\n\n third</a>";
        let lines = LineExtractor.extract(xml).unwrap();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_malformed_payload() {
        assert!(matches!(
            FlatTextExtractor.extract("<a><b></a>"),
            Err(Error::MalformedXml(_))
        ));
        assert!(matches!(
            LineExtractor.extract("<a"),
            Err(Error::MalformedXml(_))
        ));
    }
}
