//! Builds flow-layout stories from extracted content.

use super::normalize::{DisplayLine, Normalizer};
use crate::core::ast::ContentTree;
use crate::render::{Flowable, Span, StyleName, Story};
use crate::template::{first_match, TemplateStrategy};

/// Lines at the top of a line-oriented document that form its title block.
const TITLE_LINES: usize = 5;

pub struct StoryBuilder<'a> {
    template: &'a dyn TemplateStrategy,
    normalizer: Normalizer<'a>,
}

impl<'a> StoryBuilder<'a> {
    pub fn new(template: &'a dyn TemplateStrategy) -> Self {
        Self {
            template,
            normalizer: Normalizer::new(template),
        }
    }

    /// Title block from the first lines, then emphasis or body lines.
    pub fn professional(&self, lines: &[String]) -> Story {
        let mut story = Story::new();

        let title: Vec<String> = lines
            .iter()
            .take(TITLE_LINES)
            .filter_map(|line| self.normalizer.display_line(line))
            .collect();
        if !title.is_empty() {
            story.push(Flowable::paragraph(title.join("\n"), StyleName::Title));
            story.push(Flowable::spacer_cm(0.5));
        }

        for line in lines.iter().skip(TITLE_LINES) {
            let Some(text) = self.normalizer.display_line(line) else {
                continue;
            };
            if let Some(style) = first_match(self.template.line_rules(), &text) {
                story.push(Flowable::spacer_cm(0.3));
                story.push(Flowable::paragraph(text, style));
                story.push(Flowable::spacer_cm(0.2));
            } else {
                story.push(body_line(&text));
            }
        }
        story
    }

    /// Boxed title, paragraphs, then tables.
    pub fn structured(&self, name: &str, tree: &ContentTree) -> Story {
        let mut story = Story::new();
        story.push(Flowable::paragraph(
            format!("Document: {name}"),
            StyleName::BoxedTitle,
        ));

        for paragraph in tree.paragraphs() {
            let Some(text) = self.normalizer.display_line(paragraph) else {
                continue;
            };
            match first_match(self.template.paragraph_rules(), &text) {
                Some(style) => story.push(Flowable::paragraph(text, style)),
                None => story.push(body_line(&text)),
            }
            story.push(Flowable::spacer_cm(0.2));
        }

        for table in tree.tables() {
            story.push(Flowable::Table(table.to_vec()));
            story.push(Flowable::spacer_cm(0.5));
        }
        story
    }
}

/// Body paragraph with the label of a `label: value` line in bold.
fn body_line(text: &str) -> Flowable {
    let spans = match DisplayLine::parse(text) {
        DisplayLine::Field { label, value } => {
            vec![Span::bold(format!("{label}:")), Span::regular(value)]
        }
        DisplayLine::Label(label) => vec![Span::bold(label)],
        DisplayLine::Plain(text) => vec![Span::regular(text)],
    };
    Flowable::Paragraph {
        spans,
        style: StyleName::Body,
    }
}
