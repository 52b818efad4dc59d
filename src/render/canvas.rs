//! Page model: positioned drawing operations grouped into pages.
//!
//! Layout code draws onto a [`Canvas`]; the PDF writer serializes the
//! finished pages. Coordinates are PDF points with the origin at the
//! bottom-left corner.

use super::fonts::{transliterate, FontFace, FontSet};
use super::styles::Color;
use crate::error::Error;

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

pub const A4: PageSize = PageSize {
    width: 595.2756,
    height: 841.8898,
};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text with its left edge at `x` and baseline at `y`.
    Text {
        x: f32,
        y: f32,
        face: FontFace,
        size: f32,
        color: Color,
        text: String,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Color,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<(Color, f32)>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text drawn on this page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Drawing surface that accumulates pages.
pub struct Canvas<'a> {
    fonts: &'a FontSet,
    size: PageSize,
    pages: Vec<Page>,
}

impl<'a> Canvas<'a> {
    /// Starts with one empty page.
    pub fn new(fonts: &'a FontSet, size: PageSize) -> Self {
        Self {
            fonts,
            size,
            pages: vec![Page::default()],
        }
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    /// Closes the current page and starts a new one.
    pub fn show_page(&mut self) {
        self.pages.push(Page::default());
    }

    /// Draws `text`, transliterating it when the font cannot encode it.
    ///
    /// Returns the width of what was actually drawn.
    pub fn draw_text(
        &mut self,
        x: f32,
        y: f32,
        face: FontFace,
        size: f32,
        color: Color,
        text: &str,
    ) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let font = self.fonts.get(face);
        let text = match font.encode(text) {
            Ok(_) => text.to_string(),
            Err(Error::Encoding { font: name, .. }) => {
                log::debug!("{name} cannot encode {text:?}; drawing transliterated text");
                font.retain_encodable(&transliterate(text))
            }
            Err(_) => font.retain_encodable(text),
        };
        let width = font.text_width(&text, size);
        self.push(DrawOp::Text {
            x,
            y,
            face,
            size,
            color,
            text,
        });
        width
    }

    pub fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color) {
        self.push(DrawOp::Line {
            from,
            to,
            width,
            color,
        });
    }

    pub fn draw_rect(
        &mut self,
        (x, y): (f32, f32),
        (width, height): (f32, f32),
        fill: Option<Color>,
        stroke: Option<(Color, f32)>,
    ) {
        self.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        });
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unencodable_text_is_transliterated() {
        let fonts = FontSet::builtin();
        let mut canvas = Canvas::new(&fonts, A4);
        canvas.draw_text(50.0, 700.0, FontFace::Regular, 10.0, Color::BLACK, "Şikâyet ığdır");
        canvas.draw_text(50.0, 686.0, FontFace::Regular, 10.0, Color::BLACK, "Müdür çağrı");
        let pages = canvas.into_pages();
        let texts: Vec<_> = pages[0].texts().collect();
        assert_eq!(texts, vec!["Sikayet igdir", "Mudur cagri"]);
    }

    #[test]
    fn test_encodable_latin1_text_is_kept() {
        let fonts = FontSet::builtin();
        let mut canvas = Canvas::new(&fonts, A4);
        canvas.draw_text(50.0, 700.0, FontFace::Bold, 12.0, Color::BLACK, "Müdür çöp");
        let pages = canvas.into_pages();
        assert_eq!(pages[0].texts().collect::<Vec<_>>(), vec!["Müdür çöp"]);
    }

    #[test]
    fn test_show_page_starts_new_page() {
        let fonts = FontSet::builtin();
        let mut canvas = Canvas::new(&fonts, A4);
        canvas.draw_line((0.0, 0.0), (10.0, 0.0), 1.0, Color::BLACK);
        canvas.show_page();
        let pages = canvas.into_pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].ops.len(), 1);
        assert!(pages[1].ops.is_empty());
    }
}
