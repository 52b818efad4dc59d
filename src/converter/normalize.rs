//! Text normalizer - turns raw extracted lines into display lines.

use crate::template::TemplateStrategy;
use regex::Regex;
use std::sync::OnceLock;

/// Checkbox placeholder glyph left behind by the source template.
const CHECKBOX_GLYPH: char = '\u{25A1}';

fn markup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid markup regex"))
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// A normalized line, split into label and value when it has a colon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayLine {
    Plain(String),
    /// `label: value`, both non-empty.
    Field { label: String, value: String },
    /// Text before a trailing colon, drawn bold on its own.
    Label(String),
}

impl DisplayLine {
    /// Splits on the first colon.
    ///
    /// A line with an empty label stays plain, so `": x"` is not a field.
    pub fn parse(text: &str) -> Self {
        let Some((label, value)) = text.split_once(':') else {
            return Self::Plain(text.to_string());
        };
        let label = label.trim();
        let value = value.trim();
        match (label.is_empty(), value.is_empty()) {
            (false, false) => Self::Field {
                label: label.to_string(),
                value: value.to_string(),
            },
            (false, true) => Self::Label(label.to_string()),
            (true, _) => Self::Plain(text.to_string()),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Self::Plain(text) | Self::Label(text) => text.clone(),
            Self::Field { label, value } => format!("{label}: {value}"),
        }
    }
}

/// Pure line cleaner parameterized by a template's placeholder list.
pub struct Normalizer<'a> {
    template: &'a dyn TemplateStrategy,
}

impl<'a> Normalizer<'a> {
    pub fn new(template: &'a dyn TemplateStrategy) -> Self {
        Self { template }
    }

    /// Strips markup, collapses whitespace, removes placeholder tokens and the
    /// checkbox glyph, then trims. May return an empty string.
    pub fn clean(&self, raw: &str) -> String {
        let text = markup_pattern().replace_all(raw, "");
        let text = whitespace_pattern().replace_all(&text, " ");
        let text = self.strip_placeholders(&text);
        text.replace(CHECKBOX_GLYPH, "").trim().to_string()
    }

    /// Cleans a line for structured rendering, dropping it when nothing is left.
    pub fn display_line(&self, raw: &str) -> Option<String> {
        let cleaned = self.clean(raw);
        (!cleaned.is_empty()).then_some(cleaned)
    }

    /// Single left-to-right pass; earlier tokens win at the same position.
    fn strip_placeholders(&self, text: &str) -> String {
        let tokens = self.template.placeholder_tokens();
        if tokens.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(ch) = rest.chars().next() {
            if let Some(token) = tokens.iter().find(|t| !t.is_empty() && rest.starts_with(**t)) {
                rest = &rest[token.len()..];
            } else {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
        out
    }
}
