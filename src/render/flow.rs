//! Flow layout: paragraphs, spacers and tables poured into page frames.
//!
//! Paragraphs with at least four lines may split across pages as long as
//! two lines stay on each side; shorter ones move to the next page whole.
//! Tables split between rows. Spacers are dropped at the top of a page.

use super::canvas::{Canvas, Page, PageSize, A4};
use super::fonts::{Font, FontFace, FontSet};
use super::styles::{Alignment, ParagraphStyle, StyleName, StyleSheet, TableTheme, CM};
use super::{pdf, Renderer};
use crate::Result;

/// Smallest paragraph (in lines) that may be split, and the minimum kept on
/// either side of the break.
const MIN_SPLIT_LINES: usize = 4;
const MIN_LINES_PER_SIDE: usize = 2;

/// A piece of paragraph text. `'\n'` inside `text` forces a line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    pub fn regular(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Flowable {
    Paragraph { spans: Vec<Span>, style: StyleName },
    /// Vertical gap in points.
    Spacer(f32),
    /// Rows of cell text; the first row is the header.
    Table(Vec<Vec<String>>),
}

impl Flowable {
    pub fn paragraph(text: impl Into<String>, style: StyleName) -> Self {
        Self::Paragraph {
            spans: vec![Span::regular(text)],
            style,
        }
    }

    pub fn spacer_cm(cm: f32) -> Self {
        Self::Spacer(cm * CM)
    }
}

/// Ordered flowables making up one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Story {
    pub flowables: Vec<Flowable>,
}

impl Story {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, flowable: Flowable) {
        self.flowables.push(flowable);
    }

    pub fn is_empty(&self) -> bool {
        self.flowables.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Run {
    text: String,
    face: FontFace,
}

type Line = Vec<Run>;

/// Current page region and vertical cursor.
struct Frame<'a> {
    canvas: Canvas<'a>,
    left: f32,
    width: f32,
    top: f32,
    bottom: f32,
    y: f32,
    at_top: bool,
}

impl<'a> Frame<'a> {
    fn new(canvas: Canvas<'a>, margin: f32) -> Self {
        let size = canvas.size();
        Self {
            canvas,
            left: margin,
            width: size.width - 2.0 * margin,
            top: size.height - margin,
            bottom: margin,
            y: size.height - margin,
            at_top: true,
        }
    }

    fn available(&self) -> f32 {
        self.y - self.bottom
    }

    fn new_page(&mut self) {
        self.canvas.show_page();
        self.y = self.top;
        self.at_top = true;
    }

    fn advance(&mut self, height: f32) {
        self.y -= height;
        self.at_top = false;
    }

    fn spacer(&mut self, height: f32) {
        if self.at_top {
            return;
        }
        if height > self.available() {
            self.new_page();
        } else {
            self.y -= height;
        }
    }
}

/// Renders a [`Story`] with a style sheet and table theme.
pub struct FlowRenderer<'a> {
    fonts: &'a FontSet,
    styles: &'a StyleSheet,
    theme: TableTheme,
    page: PageSize,
    margin: f32,
}

impl<'a> FlowRenderer<'a> {
    pub fn new(fonts: &'a FontSet, styles: &'a StyleSheet) -> Self {
        Self {
            fonts,
            styles,
            theme: TableTheme::default(),
            page: A4,
            margin: 2.0 * CM,
        }
    }

    pub fn with_theme(mut self, theme: TableTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn layout(&self, story: &Story) -> Vec<Page> {
        let mut frame = Frame::new(Canvas::new(self.fonts, self.page), self.margin);
        for flowable in &story.flowables {
            match flowable {
                Flowable::Spacer(height) => frame.spacer(*height),
                Flowable::Paragraph { spans, style } => {
                    self.paragraph(&mut frame, spans, self.styles.resolve(*style));
                }
                Flowable::Table(rows) => self.table(&mut frame, rows),
            }
        }
        frame.canvas.into_pages()
    }

    fn paragraph(&self, frame: &mut Frame<'_>, spans: &[Span], style: &ParagraphStyle) {
        let padding = style.border.map_or(0.0, |b| b.padding);
        let lines = self.wrap_runs(spans, style.face, style.size, frame.width - 2.0 * padding);
        if lines.is_empty() {
            return;
        }

        if style.border.is_some() {
            let height = lines.len() as f32 * style.leading + 2.0 * padding + style.space_before;
            if height > frame.available() && !frame.at_top {
                frame.new_page();
            }
            let space_before = if frame.at_top { 0.0 } else { style.space_before };
            self.draw_lines(frame, &lines, style, space_before);
            frame.y -= style.space_after;
            return;
        }

        let mut remaining = &lines[..];
        while !remaining.is_empty() {
            let space_before = if frame.at_top { 0.0 } else { style.space_before };
            let fit = ((frame.available() - space_before) / style.leading).floor().max(0.0) as usize;
            if fit >= remaining.len() {
                self.draw_lines(frame, remaining, style, space_before);
                break;
            }

            let total = remaining.len();
            let split = (total >= MIN_SPLIT_LINES)
                .then(|| fit.min(total - MIN_LINES_PER_SIDE))
                .filter(|n| *n >= MIN_LINES_PER_SIDE);
            let take = match split {
                Some(n) => n,
                // A fresh page that still cannot hold the paragraph.
                None if frame.at_top => fit.max(1),
                None => {
                    frame.new_page();
                    continue;
                }
            };
            self.draw_lines(frame, &remaining[..take], style, space_before);
            remaining = &remaining[take..];
            frame.new_page();
        }
        frame.y -= style.space_after;
    }

    fn draw_lines(
        &self,
        frame: &mut Frame<'_>,
        lines: &[Line],
        style: &ParagraphStyle,
        space_before: f32,
    ) {
        let padding = style.border.map_or(0.0, |b| b.padding);
        frame.y -= space_before;
        let top = frame.y;
        let height = lines.len() as f32 * style.leading + 2.0 * padding;
        if let Some(border) = style.border {
            frame.canvas.draw_rect(
                (frame.left, top - height),
                (frame.width, height),
                None,
                Some((border.color, border.width)),
            );
        }

        let inner = frame.width - 2.0 * padding;
        let mut baseline = top - padding - style.size;
        for line in lines {
            let offset = match style.alignment {
                Alignment::Left => 0.0,
                Alignment::Center => ((inner - self.line_width(line, style.size)) / 2.0).max(0.0),
            };
            let mut x = frame.left + padding + offset;
            for run in line {
                x += frame
                    .canvas
                    .draw_text(x, baseline, run.face, style.size, style.color, &run.text);
            }
            baseline -= style.leading;
        }
        frame.advance(height);
    }

    fn table(&self, frame: &mut Frame<'_>, rows: &[Vec<String>]) {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }
        let theme = &self.theme;
        let col_width = frame.width / columns as f32;
        let text_width = (col_width - 2.0 * theme.padding_x).max(1.0);

        for (index, row) in rows.iter().enumerate() {
            let header = index == 0;
            let (face, size, color, fill, bottom_pad) = if header {
                (
                    FontFace::Bold,
                    theme.header_size,
                    theme.header_text,
                    theme.header_fill,
                    theme.header_bottom_padding,
                )
            } else {
                (
                    FontFace::Regular,
                    theme.body_size,
                    theme.body_text,
                    theme.row_fills[(index - 1) % 2],
                    theme.padding_y,
                )
            };
            let leading = size * 1.2;

            // Short rows are padded with empty cells.
            let cells: Vec<Vec<Line>> = (0..columns)
                .map(|c| {
                    let text = row.get(c).map(String::as_str).unwrap_or("");
                    self.wrap_runs(&[Span::regular(text)], face, size, text_width)
                })
                .collect();
            let line_count = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
            let height = line_count as f32 * leading + theme.padding_y + bottom_pad;
            if height > frame.available() && !frame.at_top {
                frame.new_page();
            }

            let top = frame.y;
            let content_height = height - theme.padding_y - bottom_pad;
            for (c, lines) in cells.iter().enumerate() {
                let x = frame.left + c as f32 * col_width;
                frame.canvas.draw_rect(
                    (x, top - height),
                    (col_width, height),
                    Some(fill),
                    Some((theme.grid, theme.grid_width)),
                );

                let block = lines.len() as f32 * leading;
                let mut baseline =
                    top - theme.padding_y - (content_height - block) / 2.0 - size;
                for line in lines {
                    let mut tx = x + ((col_width - self.line_width(line, size)) / 2.0).max(0.0);
                    for run in line {
                        tx += frame
                            .canvas
                            .draw_text(tx, baseline, run.face, size, color, &run.text);
                    }
                    baseline -= leading;
                }
            }
            frame.advance(height);
        }
    }

    /// Greedy wrap of styled spans into lines no wider than `max_width`.
    fn wrap_runs(&self, spans: &[Span], base: FontFace, size: f32, max_width: f32) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut line: Line = Vec::new();
        let mut width = 0.0;

        for span in spans {
            let face = if span.bold { FontFace::Bold } else { base };
            let font = self.fonts.get(face);
            for (i, segment) in span.text.split('\n').enumerate() {
                if i > 0 {
                    lines.push(std::mem::take(&mut line));
                    width = 0.0;
                }
                for word in segment.split_whitespace() {
                    for piece in break_word(font, word, size, max_width) {
                        let piece_width = font.text_width(piece, size);
                        let space = font.text_width(" ", size);
                        if !line.is_empty() && width + space + piece_width > max_width {
                            lines.push(std::mem::take(&mut line));
                            width = 0.0;
                        }
                        let spaced = !line.is_empty();
                        push_word(&mut line, face, piece, spaced);
                        width += piece_width + if spaced { space } else { 0.0 };
                    }
                }
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
        lines
    }

    fn line_width(&self, line: &Line, size: f32) -> f32 {
        line.iter()
            .map(|run| self.fonts.get(run.face).text_width(&run.text, size))
            .sum()
    }
}

impl Renderer<Story> for FlowRenderer<'_> {
    type Output = Vec<u8>;

    fn render(&self, story: &Story) -> Result<Vec<u8>> {
        let pages = self.layout(story);
        pdf::write_pdf(&pages, self.fonts, self.page)
    }
}

fn push_word(line: &mut Line, face: FontFace, word: &str, spaced: bool) {
    match line.last_mut() {
        Some(run) if run.face == face => {
            if spaced {
                run.text.push(' ');
            }
            run.text.push_str(word);
        }
        _ => {
            let mut text = String::with_capacity(word.len() + 1);
            if spaced {
                text.push(' ');
            }
            text.push_str(word);
            line.push(Run { text, face });
        }
    }
}

/// Splits a word wider than `max_width` into pieces that fit.
fn break_word<'w>(font: &Font, word: &'w str, size: f32, max_width: f32) -> Vec<&'w str> {
    if font.text_width(word, size) <= max_width {
        return vec![word];
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut width = 0.0;
    for (idx, ch) in word.char_indices() {
        let w = font.text_width(ch.encode_utf8(&mut [0; 4]), size);
        if idx > start && width + w > max_width {
            pieces.push(&word[start..idx]);
            start = idx;
            width = 0.0;
        }
        width += w;
    }
    pieces.push(&word[start..]);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::DrawOp;
    use crate::render::styles::Color;
    use pretty_assertions::assert_eq;

    const FRAME_HEIGHT: f32 = 841.8898 - 4.0 * CM;

    fn lines(n: usize) -> String {
        (1..=n).map(|i| format!("l{i}")).collect::<Vec<_>>().join("\n")
    }

    /// Story whose first page has `room` points left after a one-line
    /// paragraph and a spacer.
    fn story_with_room(room: f32, paragraph: Flowable) -> Story {
        // Body: leading 14 plus 8 after.
        let used = 14.0 + 8.0;
        let mut story = Story::new();
        story.push(Flowable::paragraph("x", StyleName::Body));
        story.push(Flowable::Spacer(FRAME_HEIGHT - used - room));
        story.push(paragraph);
        story
    }

    fn page_texts(page: &Page) -> Vec<String> {
        page.texts().map(str::to_string).collect()
    }

    fn render(story: &Story) -> Vec<Page> {
        let fonts = FontSet::builtin();
        let styles = StyleSheet::standard().unwrap();
        FlowRenderer::new(&fonts, &styles).layout(story)
    }

    #[test]
    fn test_long_paragraph_splits_keeping_two_lines() {
        let story = story_with_room(45.0, Flowable::paragraph(lines(10), StyleName::Body));
        let pages = render(&story);
        assert_eq!(pages.len(), 2);
        assert_eq!(page_texts(&pages[0]), vec!["x", "l1", "l2", "l3"]);
        assert_eq!(page_texts(&pages[1]).first().map(String::as_str), Some("l4"));
        assert_eq!(page_texts(&pages[1]).len(), 7);
    }

    #[test]
    fn test_no_orphan_single_line() {
        let story = story_with_room(20.0, Flowable::paragraph(lines(10), StyleName::Body));
        let pages = render(&story);
        assert_eq!(page_texts(&pages[0]), vec!["x"]);
        assert_eq!(page_texts(&pages[1]).len(), 10);
    }

    #[test]
    fn test_no_widow_single_line() {
        let story = story_with_room(45.0, Flowable::paragraph(lines(4), StyleName::Body));
        let pages = render(&story);
        assert_eq!(page_texts(&pages[0]), vec!["x", "l1", "l2"]);
        assert_eq!(page_texts(&pages[1]), vec!["l3", "l4"]);
    }

    #[test]
    fn test_short_paragraph_moves_whole() {
        let story = story_with_room(30.0, Flowable::paragraph(lines(3), StyleName::Body));
        let pages = render(&story);
        assert_eq!(page_texts(&pages[0]), vec!["x"]);
        assert_eq!(page_texts(&pages[1]), vec!["l1", "l2", "l3"]);
    }

    #[test]
    fn test_spacer_dropped_at_page_top() {
        let mut story = Story::new();
        story.push(Flowable::Spacer(100.0));
        story.push(Flowable::paragraph("a", StyleName::Body));
        let pages = render(&story);
        match &pages[0].ops[0] {
            DrawOp::Text { y, .. } => assert!((y - (841.8898 - 2.0 * CM - 10.0)).abs() < 1e-2),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_label_value_spans_share_a_line() {
        let mut story = Story::new();
        story.push(Flowable::Paragraph {
            spans: vec![Span::bold("Dosya No:"), Span::regular("2024/123")],
            style: StyleName::Body,
        });
        let pages = render(&story);
        let runs: Vec<_> = pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { y, face, text, .. } => Some((*y, *face, text.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].1, FontFace::Bold);
        assert_eq!(runs[0].2, "Dosya No:");
        assert_eq!(runs[1].1, FontFace::Regular);
        assert_eq!(runs[1].2, " 2024/123");
        assert_eq!(runs[0].0, runs[1].0);
    }

    #[test]
    fn test_boxed_title_draws_border() {
        let mut story = Story::new();
        story.push(Flowable::paragraph("Document: a.udf", StyleName::BoxedTitle));
        let pages = render(&story);
        assert!(pages[0].ops.iter().any(|op| matches!(
            op,
            DrawOp::Rect { fill: None, stroke: Some((_, w)), .. } if *w == 2.0
        )));
    }

    #[test]
    fn test_table_theme_and_ragged_rows() {
        let mut story = Story::new();
        story.push(Flowable::Table(vec![
            vec!["Ad".into(), "Soyad".into(), "Rol".into()],
            vec!["Ali".into()],
            vec!["Ayse".into(), "Kaya".into(), "Tanik".into()],
        ]));
        let pages = render(&story);
        let fills: Vec<_> = pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { fill: Some(fill), width, .. } => Some((*fill, *width)),
                _ => None,
            })
            .collect();
        assert_eq!(fills.len(), 9);
        let theme = TableTheme::default();
        assert_eq!(fills[0].0, theme.header_fill);
        assert_eq!(fills[3].0, Color::WHITE);
        assert_eq!(fills[6].0, Color::from_hex(0xf8f9fa));
        let col = (595.2756 - 4.0 * CM) / 3.0;
        assert!(fills.iter().all(|(_, w)| (w - col).abs() < 1e-2));

        let header: Vec<_> = pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { face, color, text, .. } if *face == FontFace::Bold => {
                    Some((*color, text.clone()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(header.len(), 3);
        assert!(header.iter().all(|(c, _)| *c == theme.header_text));
    }

    #[test]
    fn test_tables_split_between_rows() {
        let rows: Vec<Vec<String>> = (0..120).map(|i| vec![format!("r{i}"), "x".into()]).collect();
        let mut story = Story::new();
        story.push(Flowable::Table(rows));
        let pages = render(&story);
        assert!(pages.len() > 1);
        for page in &pages {
            for op in &page.ops {
                if let DrawOp::Rect { y, .. } = op {
                    assert!(*y >= 2.0 * CM - 1e-2);
                }
            }
        }
    }

    #[test]
    fn test_wrap_runs_breaks_long_words() {
        let fonts = FontSet::builtin();
        let styles = StyleSheet::standard().unwrap();
        let renderer = FlowRenderer::new(&fonts, &styles);
        let lines = renderer.wrap_runs(&[Span::regular("m".repeat(200))], FontFace::Regular, 10.0, 100.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(renderer.line_width(line, 10.0) <= 100.0);
        }
    }
}
