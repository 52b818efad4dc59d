mod canvas;
mod flow;
mod fonts;
mod manual;
mod pdf;
mod styles;
mod text;
mod wrap;

use crate::Result;

pub use canvas::{DrawOp, Page, PageSize, A4};
pub use flow::{FlowRenderer, Flowable, Span, Story};
pub use fonts::{transliterate, win_ansi_byte, EmbeddedFont, Font, FontFace, FontSet};
pub use manual::{LineDocument, ManualRenderer};
pub use pdf::write_pdf;
pub use styles::{Alignment, Border, Color, ParagraphStyle, StyleName, StyleSheet, TableTheme, CM};
pub use text::{TextDocument, TextRenderer};
pub use wrap::wrap_line;

/// Turns a prepared document into output bytes or text.
pub trait Renderer<D: ?Sized> {
    type Output;

    fn render(&self, document: &D) -> Result<Self::Output>;
}
