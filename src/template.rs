//! Template strategies: source-template artifacts the normalizer strips and
//! marker lines that get a stronger style.
//!
//! Both lists are tied to a concrete document template's field names. For any
//! other template the normalizer simply finds nothing to remove.

use crate::render::StyleName;
use std::str::FromStr;

/// A substring rule mapping matching lines to a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerRule {
    pub pattern: &'static str,
    pub style: StyleName,
    pub case_insensitive: bool,
}

impl MarkerRule {
    pub const fn new(pattern: &'static str, style: StyleName) -> Self {
        Self {
            pattern,
            style,
            case_insensitive: false,
        }
    }

    pub const fn ignore_case(self) -> Self {
        Self {
            case_insensitive: true,
            ..self
        }
    }

    /// Unanchored containment check.
    pub fn matches(&self, text: &str) -> bool {
        if self.case_insensitive {
            text.to_uppercase().contains(&self.pattern.to_uppercase())
        } else {
            text.contains(self.pattern)
        }
    }
}

/// Strategy for template-specific cleanup and emphasis.
pub trait TemplateStrategy: Send + Sync {
    /// Internal field names that leak into the text and are removed verbatim.
    fn placeholder_tokens(&self) -> &[&'static str];

    /// Rules for line-oriented documents, evaluated in order.
    fn line_rules(&self) -> &[MarkerRule];

    /// Rules for paragraphs of structured documents, evaluated in order.
    fn paragraph_rules(&self) -> &[MarkerRule];
}

/// First matching rule wins.
pub fn first_match(rules: &[MarkerRule], text: &str) -> Option<StyleName> {
    rules.iter().find(|rule| rule.matches(text)).map(|rule| rule.style)
}

/// No template knowledge: nothing is stripped, nothing is emphasized.
pub struct PlainTemplate;

impl TemplateStrategy for PlainTemplate {
    fn placeholder_tokens(&self) -> &[&'static str] {
        &[]
    }

    fn line_rules(&self) -> &[MarkerRule] {
        &[]
    }

    fn paragraph_rules(&self) -> &[MarkerRule] {
        &[]
    }
}

/// UYAP court document template.
pub struct UyapTemplate;

const UYAP_PLACEHOLDERS: &[&str] = &[
    "evrakinGittigiMahkeme",
    "dosyaNo",
    "aciklama",
    "geldigiYerKisi",
    "ilgiliKisi",
    "tarihSaat",
    "icraSikayet",
];

const UYAP_LINE_RULES: &[MarkerRule] = &[
    MarkerRule::new("ALINDI BELGESİ", StyleName::Emphasis),
    MarkerRule::new("Evrakın Gönderildiği", StyleName::Emphasis),
    MarkerRule::new("Yukarıda bilgileri", StyleName::Emphasis),
];

const UYAP_PARAGRAPH_RULES: &[MarkerRule] = &[
    MarkerRule::new("T.C.", StyleName::Heading).ignore_case(),
    MarkerRule::new("ALINDI BELGESİ", StyleName::Heading).ignore_case(),
    MarkerRule::new("UYAP", StyleName::Heading).ignore_case(),
];

impl TemplateStrategy for UyapTemplate {
    fn placeholder_tokens(&self) -> &[&'static str] {
        UYAP_PLACEHOLDERS
    }

    fn line_rules(&self) -> &[MarkerRule] {
        UYAP_LINE_RULES
    }

    fn paragraph_rules(&self) -> &[MarkerRule] {
        UYAP_PARAGRAPH_RULES
    }
}

/// Selectable template, as exposed through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateKind {
    #[default]
    Uyap,
    Plain,
}

impl TemplateKind {
    pub fn strategy(self) -> &'static dyn TemplateStrategy {
        match self {
            Self::Uyap => &UyapTemplate,
            Self::Plain => &PlainTemplate,
        }
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uyap" => Ok(Self::Uyap),
            "plain" | "none" => Ok(Self::Plain),
            _ => Err(format!("unknown template: '{s}' (expected: uyap, plain)")),
        }
    }
}
