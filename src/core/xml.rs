//! Owned XML tree used by the content extractors.
//!
//! Text is kept as interleaved [`XmlNode::Text`] children, so an element's
//! leading text and the text following each child close both appear in
//! document order. Element names are resolved against their namespace into a
//! [`Tag`] once, at parse time.

use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

pub const OFFICE_NS: &[u8] = b"urn:oasis:names:tc:opendocument:xmlns:office:1.0";
pub const TEXT_NS: &[u8] = b"urn:oasis:names:tc:opendocument:xmlns:text:1.0";
pub const TABLE_NS: &[u8] = b"urn:oasis:names:tc:opendocument:xmlns:table:1.0";

/// Element kinds the extractors care about. Everything else is `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// `office:body`
    OfficeBody,
    /// `office:text`
    OfficeText,
    /// `text:p`
    Paragraph,
    /// `table:table`
    Table,
    /// `table:table-row`
    TableRow,
    /// `table:table-cell`
    TableCell,
    /// Any other element, keyed by local name.
    Other(String),
}

impl Tag {
    fn resolve(namespace: Option<&[u8]>, local: &[u8]) -> Self {
        match (namespace, local) {
            (Some(OFFICE_NS), b"body") => Self::OfficeBody,
            (Some(OFFICE_NS), b"text") => Self::OfficeText,
            (Some(TEXT_NS), b"p") => Self::Paragraph,
            (Some(TABLE_NS), b"table") => Self::Table,
            (Some(TABLE_NS), b"table-row") => Self::TableRow,
            (Some(TABLE_NS), b"table-cell") => Self::TableCell,
            _ => Self::Other(String::from_utf8_lossy(local).into_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub tag: Tag,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    fn new(tag: Tag) -> Self {
        Self {
            tag,
            children: Vec::new(),
        }
    }

    /// Direct child elements, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// All descendant elements in document order, not including `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// Concatenation of every text node below this element, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(el) => el.collect_text(out),
            }
        }
    }

    /// Trimmed, non-empty text fragments in document order.
    pub fn text_fragments(&self) -> TextFragments<'_> {
        TextFragments {
            stack: vec![self.children.iter()],
        }
    }

    /// The first `office:text` element directly under a descendant `office:body`.
    pub fn find_body_text(&self) -> Option<&XmlElement> {
        self.descendants()
            .filter(|el| el.tag == Tag::OfficeBody)
            .find_map(|body| body.child_elements().find(|el| el.tag == Tag::OfficeText))
    }
}

/// Pre-order walk over descendant elements.
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, XmlNode>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(XmlNode::Element(el)) => {
                    self.stack.push(el.children.iter());
                    return Some(el);
                }
                Some(XmlNode::Text(_)) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// Single-pass walk yielding trimmed text nodes, skipping blank ones.
pub struct TextFragments<'a> {
    stack: Vec<std::slice::Iter<'a, XmlNode>>,
}

impl<'a> Iterator for TextFragments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(XmlNode::Element(el)) => self.stack.push(el.children.iter()),
                Some(XmlNode::Text(text)) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        return Some(trimmed);
                    }
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// Parses an XML document into an owned tree and returns its root element.
///
/// # Errors
///
/// Returns [`Error::MalformedXml`] for syntax errors, unbound namespace
/// prefixes, a missing or duplicated root element, unclosed elements, or
/// non-whitespace text outside the root.
pub fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = NsReader::from_str(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let tag = resolve_tag(&reader, e.name())?;
                if stack.is_empty() && root.is_some() {
                    return Err(Error::MalformedXml("multiple root elements".to_string()));
                }
                stack.push(XmlElement::new(tag));
            }
            Event::Empty(e) => {
                let tag = resolve_tag(&reader, e.name())?;
                let element = XmlElement::new(tag);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None if root.is_none() => root = Some(element),
                    None => {
                        return Err(Error::MalformedXml("multiple root elements".to_string()))
                    }
                }
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(Error::MalformedXml("unexpected closing tag".to_string()));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None => root = Some(element),
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(e) => {
                let bytes = e.into_inner();
                let text = std::str::from_utf8(&bytes)
                    .map_err(|err| Error::MalformedXml(format!("invalid UTF-8 in CDATA: {err}")))?;
                push_text(&mut stack, text)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::MalformedXml("unclosed element at end of document".to_string()));
    }
    root.ok_or_else(|| Error::MalformedXml("no root element".to_string()))
}

fn resolve_tag(reader: &NsReader<&[u8]>, name: quick_xml::name::QName<'_>) -> Result<Tag> {
    let (resolved, local) = reader.resolve_element(name);
    let namespace = match resolved {
        ResolveResult::Bound(Namespace(ns)) => Some(ns),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(Error::MalformedXml(format!(
                "unbound namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            )))
        }
    };
    Ok(Tag::resolve(namespace, local.as_ref()))
}

fn push_text(stack: &mut [XmlElement], text: &str) -> Result<()> {
    let Some(current) = stack.last_mut() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(Error::MalformedXml("text outside root element".to_string()));
    };
    // CDATA sections arrive as separate events; keep one node per text run.
    if let Some(XmlNode::Text(existing)) = current.children.last_mut() {
        existing.push_str(text);
    } else {
        current.children.push(XmlNode::Text(text.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ODF_HEAD: &str = r#"<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0">"#;

    #[test]
    fn test_tags_resolve_by_namespace_not_prefix() {
        let xml = r#"<root xmlns:t="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:x="urn:other"><t:p/><x:p/></root>"#;
        let root = parse_document(xml).unwrap();
        let tags: Vec<_> = root.child_elements().map(|el| el.tag.clone()).collect();
        assert_eq!(tags, vec![Tag::Paragraph, Tag::Other("p".to_string())]);
    }

    #[test]
    fn test_text_and_tail_kept_in_document_order() {
        let xml = "<a>one<b>two<c>three</c>four</b>five</a>";
        let root = parse_document(xml).unwrap();
        let fragments: Vec<_> = root.text_fragments().collect();
        assert_eq!(fragments, vec!["one", "two", "three", "four", "five"]);
        assert_eq!(root.text_content(), "onetwothreefourfive");
    }

    #[test]
    fn test_entities_and_cdata_merge_into_one_text_run() {
        let xml = "<a>x &amp; y<![CDATA[ <z> ]]></a>";
        let root = parse_document(xml).unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.text_content(), "x & y <z> ");
    }

    #[test]
    fn test_find_body_text() {
        let xml = format!(
            "{ODF_HEAD}<office:body><office:text><text:p>Hi</text:p></office:text></office:body></office:document-content>"
        );
        let root = parse_document(&xml).unwrap();
        let body = root.find_body_text().expect("body text should be found");
        assert_eq!(body.tag, Tag::OfficeText);
        assert_eq!(body.text_content(), "Hi");
    }

    #[test]
    fn test_find_body_text_missing() {
        let root = parse_document("<root><body/></root>").unwrap();
        assert!(root.find_body_text().is_none());
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        for xml in ["", "<a>", "<a></b>", "<a/><b/>", "<p:a/>", "junk<a/>"] {
            let result = parse_document(xml);
            assert!(
                matches!(result, Err(Error::MalformedXml(_))),
                "expected MalformedXml for {xml:?}, got {result:?}"
            );
        }
    }
}
