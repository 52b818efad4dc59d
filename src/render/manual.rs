//! Manually paginated line renderer.
//!
//! Lines are drawn top-down at a fixed line height, wrapped at a character
//! count, and a new page starts whenever the cursor drops below the margin.

use super::canvas::{Canvas, Page, A4};
use super::fonts::{FontFace, FontSet};
use super::styles::Color;
use super::wrap::wrap_line;
use super::{pdf, Renderer};
use crate::Result;

const MARGIN: f32 = 50.0;
const LINE_HEIGHT: f32 = 14.0;
const WRAP_WIDTH: usize = 80;
const BODY_SIZE: f32 = 10.0;
const HEADER_SIZE: f32 = 12.0;
const HEADER_OFFSET: f32 = 40.0;
const RULE_OFFSET: f32 = 45.0;
const BODY_OFFSET: f32 = 70.0;

/// Lines of text with an optional bold header above a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDocument {
    pub header: Option<String>,
    pub lines: Vec<String>,
}

pub struct ManualRenderer<'a> {
    fonts: &'a FontSet,
}

impl<'a> ManualRenderer<'a> {
    pub fn new(fonts: &'a FontSet) -> Self {
        Self { fonts }
    }

    pub fn layout(&self, document: &LineDocument) -> Vec<Page> {
        let mut canvas = Canvas::new(self.fonts, A4);
        let size = canvas.size();

        let mut y = match &document.header {
            Some(header) => {
                canvas.draw_text(
                    MARGIN,
                    size.height - HEADER_OFFSET,
                    FontFace::Bold,
                    HEADER_SIZE,
                    Color::BLACK,
                    header,
                );
                canvas.draw_line(
                    (MARGIN, size.height - RULE_OFFSET),
                    (size.width - MARGIN, size.height - RULE_OFFSET),
                    1.0,
                    Color::BLACK,
                );
                size.height - BODY_OFFSET
            }
            None => size.height - MARGIN,
        };

        for line in &document.lines {
            for piece in wrap_line(line, WRAP_WIDTH) {
                if y < MARGIN {
                    canvas.show_page();
                    y = size.height - MARGIN;
                }
                canvas.draw_text(MARGIN, y, FontFace::Regular, BODY_SIZE, Color::BLACK, &piece);
                y -= LINE_HEIGHT;
            }
        }

        canvas.into_pages()
    }
}

impl Renderer<LineDocument> for ManualRenderer<'_> {
    type Output = Vec<u8>;

    fn render(&self, document: &LineDocument) -> Result<Vec<u8>> {
        let pages = self.layout(document);
        pdf::write_pdf(&pages, self.fonts, A4)
    }
}
