//! Named paragraph styles and the table theme.

use super::fonts::FontFace;
use crate::{error::Error, Result};
use std::collections::HashMap;
use std::fmt;

/// Points per centimetre.
pub const CM: f32 = 28.346_457;

/// RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Builds a color from `0xRRGGBB`.
    pub fn from_hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as f32 / 255.0,
            g: ((rgb >> 8) & 0xFF) as f32 / 255.0,
            b: (rgb & 0xFF) as f32 / 255.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
}

/// Stroked frame drawn around a paragraph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub width: f32,
    pub color: Color,
    pub padding: f32,
}

/// Identifier of a registered paragraph style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleName {
    Title,
    BoxedTitle,
    Heading,
    Body,
    Emphasis,
}

impl fmt::Display for StyleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Title => "title",
            Self::BoxedTitle => "boxed-title",
            Self::Heading => "heading",
            Self::Body => "body",
            Self::Emphasis => "emphasis",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphStyle {
    pub face: FontFace,
    pub size: f32,
    pub leading: f32,
    pub color: Color,
    pub alignment: Alignment,
    pub space_before: f32,
    pub space_after: f32,
    pub border: Option<Border>,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            face: FontFace::Regular,
            size: 10.0,
            leading: 12.0,
            color: Color::BLACK,
            alignment: Alignment::Left,
            space_before: 0.0,
            space_after: 0.0,
            border: None,
        }
    }
}

/// Explicit style registry. Names are unique within a sheet.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: HashMap<StyleName, ParagraphStyle>,
    fallback: ParagraphStyle,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// [`Error::DuplicateStyle`] if `name` is already registered.
    pub fn register(&mut self, name: StyleName, style: ParagraphStyle) -> Result<()> {
        if self.styles.contains_key(&name) {
            return Err(Error::DuplicateStyle(name.to_string()));
        }
        self.styles.insert(name, style);
        Ok(())
    }

    pub fn get(&self, name: StyleName) -> Option<&ParagraphStyle> {
        self.styles.get(&name)
    }

    /// Registered style, or the sheet's plain default.
    pub fn resolve(&self, name: StyleName) -> &ParagraphStyle {
        self.styles.get(&name).unwrap_or(&self.fallback)
    }

    /// The document styles used by the flow renderer.
    pub fn standard() -> Result<Self> {
        let mut sheet = Self::new();
        let title = ParagraphStyle {
            face: FontFace::Bold,
            size: 14.0,
            leading: 18.0,
            color: Color::from_hex(0x1a1a1a),
            alignment: Alignment::Center,
            space_before: 10.0,
            space_after: 20.0,
            border: None,
        };
        sheet.register(
            StyleName::BoxedTitle,
            ParagraphStyle {
                size: 16.0,
                leading: 20.0,
                space_before: 0.0,
                border: Some(Border {
                    width: 2.0,
                    color: Color::from_hex(0x333333),
                    padding: 10.0,
                }),
                ..title.clone()
            },
        )?;
        sheet.register(StyleName::Title, title)?;
        sheet.register(
            StyleName::Heading,
            ParagraphStyle {
                face: FontFace::Bold,
                size: 12.0,
                leading: 14.4,
                color: Color::from_hex(0x2c3e50),
                space_before: 12.0,
                space_after: 12.0,
                ..ParagraphStyle::default()
            },
        )?;
        sheet.register(
            StyleName::Body,
            ParagraphStyle {
                leading: 14.0,
                color: Color::from_hex(0x333333),
                space_after: 8.0,
                ..ParagraphStyle::default()
            },
        )?;
        sheet.register(
            StyleName::Emphasis,
            ParagraphStyle {
                face: FontFace::Bold,
                size: 11.0,
                leading: 14.0,
                color: Color::BLACK,
                space_after: 10.0,
                ..ParagraphStyle::default()
            },
        )?;
        Ok(sheet)
    }
}

/// Colors, sizes and paddings of rendered tables.
#[derive(Debug, Clone, PartialEq)]
pub struct TableTheme {
    pub header_fill: Color,
    pub header_text: Color,
    pub header_size: f32,
    pub header_bottom_padding: f32,
    pub body_text: Color,
    pub body_size: f32,
    pub row_fills: [Color; 2],
    pub grid: Color,
    pub grid_width: f32,
    pub padding_x: f32,
    pub padding_y: f32,
}

impl Default for TableTheme {
    fn default() -> Self {
        Self {
            header_fill: Color::from_hex(0x34495e),
            header_text: Color::from_hex(0xf5f5f5),
            header_size: 10.0,
            header_bottom_padding: 12.0,
            body_text: Color::from_hex(0x2c3e50),
            body_size: 9.0,
            row_fills: [Color::WHITE, Color::from_hex(0xf8f9fa)],
            grid: Color::from_hex(0xbdc3c7),
            grid_width: 1.0,
            padding_x: 6.0,
            padding_y: 3.0,
        }
    }
}
