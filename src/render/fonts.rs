//! Font registry: Unicode TrueType fonts loaded from disk with a fallback to
//! the standard Helvetica family.

use crate::{error::Error, FontConfig, Result};
use ab_glyph::{Font as _, FontVec, GlyphId};
use std::fs;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Weight of a font within the registered family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontFace {
    Regular,
    Bold,
}

/// Standard Type1 fonts every PDF reader provides, limited to WinAnsi.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
}

/// A TrueType font parsed for metrics and embedded into the output.
pub struct EmbeddedFont {
    name: String,
    data: Vec<u8>,
    face: FontVec,
    units_per_em: f32,
}

pub enum Font {
    Builtin(BuiltinFont),
    Embedded(EmbeddedFont),
}

/// Regular and bold font of one render session.
pub struct FontSet {
    regular: Font,
    bold: Font,
}

impl FontSet {
    /// The Helvetica family, always available.
    pub fn builtin() -> Self {
        Self {
            regular: Font::Builtin(BuiltinFont::Helvetica),
            bold: Font::Builtin(BuiltinFont::HelveticaBold),
        }
    }

    /// Tries the configured Unicode fonts; if either one cannot be loaded the
    /// whole family falls back to Helvetica.
    pub fn load(config: &FontConfig) -> Self {
        match (
            EmbeddedFont::from_file(&config.regular),
            EmbeddedFont::from_file(&config.bold),
        ) {
            (Ok(regular), Ok(bold)) => {
                log::debug!("Using fonts {} and {}", regular.name, bold.name);
                Self {
                    regular: Font::Embedded(regular),
                    bold: Font::Embedded(bold),
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                log::debug!("{e}; falling back to Helvetica");
                Self::builtin()
            }
        }
    }

    pub fn get(&self, face: FontFace) -> &Font {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
        }
    }

    pub fn is_unicode(&self) -> bool {
        matches!(self.regular, Font::Embedded(_))
    }
}

impl EmbeddedFont {
    /// # Errors
    ///
    /// [`Error::FontUnavailable`] when the file is missing or not a usable font.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .map_err(|e| Error::FontUnavailable(format!("{}: {e}", path.display())))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Embedded".to_string());
        Self::from_bytes(&name, data)
            .map_err(|e| Error::FontUnavailable(format!("{}: {e}", path.display())))
    }

    pub fn from_bytes(name: &str, data: Vec<u8>) -> Result<Self> {
        let face = FontVec::try_from_vec(data.clone())
            .map_err(|e| Error::FontUnavailable(format!("{name}: {e}")))?;
        let units_per_em = face.units_per_em().unwrap_or(1000.0);
        let name: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        Ok(Self {
            name: if name.is_empty() { "Embedded".to_string() } else { name },
            data,
            face,
            units_per_em,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Glyph for `ch`, or `None` when the font has no outline for it.
    pub fn glyph(&self, ch: char) -> Option<u16> {
        let GlyphId(id) = self.face.glyph_id(ch);
        (id != 0).then_some(id)
    }

    /// Advance width in 1/1000 em.
    pub fn advance(&self, glyph: u16) -> f32 {
        self.face.h_advance_unscaled(GlyphId(glyph)) * 1000.0 / self.units_per_em
    }

    pub fn ascent(&self) -> f32 {
        self.face.ascent_unscaled() * 1000.0 / self.units_per_em
    }

    pub fn descent(&self) -> f32 {
        self.face.descent_unscaled() * 1000.0 / self.units_per_em
    }
}

impl BuiltinFont {
    pub fn base_name(self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn ascii_widths(self) -> &'static [u16; 95] {
        match self {
            Self::Helvetica => &HELVETICA_WIDTHS,
            Self::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Width in 1/1000 em. Accented letters use their base letter's width.
    fn char_width(self, ch: char) -> f32 {
        let widths = self.ascii_widths();
        let lookup = |c: char| {
            let code = c as u32;
            (32..=126)
                .contains(&code)
                .then(|| f32::from(widths[(code - 32) as usize]))
        };
        lookup(ch)
            .or_else(|| ch.nfd().next().and_then(lookup))
            .unwrap_or(556.0)
    }
}

impl Font {
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(b) => b.base_name(),
            Self::Embedded(e) => e.name(),
        }
    }

    /// Width of `text` at `size` points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: f32 = match self {
            Self::Builtin(b) => text.chars().map(|c| b.char_width(c)).sum(),
            Self::Embedded(e) => text
                .chars()
                .map(|c| e.glyph(c).map(|g| e.advance(g)).unwrap_or(0.0))
                .sum(),
        };
        units * size / 1000.0
    }

    /// Encodes `text` into the byte form the content stream expects:
    /// WinAnsi single bytes for built-in fonts, big-endian glyph ids for
    /// embedded ones.
    ///
    /// # Errors
    ///
    /// [`Error::Encoding`] when any character cannot be drawn with this font.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            match self.encode_char(ch) {
                Some(Code::Byte(b)) => out.push(b),
                Some(Code::Glyph(g)) => out.extend_from_slice(&g.to_be_bytes()),
                None => {
                    return Err(Error::Encoding {
                        font: self.name().to_string(),
                        text: text.to_string(),
                    })
                }
            }
        }
        Ok(out)
    }

    /// Drops every character the font cannot draw.
    pub fn retain_encodable(&self, text: &str) -> String {
        text.chars()
            .filter(|&c| self.encode_char(c).is_some())
            .collect()
    }

    fn encode_char(&self, ch: char) -> Option<Code> {
        match self {
            Self::Builtin(_) => win_ansi_byte(ch).map(Code::Byte),
            Self::Embedded(e) => e.glyph(ch).map(Code::Glyph),
        }
    }
}

enum Code {
    Byte(u8),
    Glyph(u16),
}

/// WinAnsiEncoding byte for `ch`, if it has one.
pub fn win_ansi_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => match ch {
            '€' => Some(0x80),
            '‚' => Some(0x82),
            'ƒ' => Some(0x83),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '†' => Some(0x86),
            '‡' => Some(0x87),
            'ˆ' => Some(0x88),
            '‰' => Some(0x89),
            'Š' => Some(0x8A),
            '‹' => Some(0x8B),
            'Œ' => Some(0x8C),
            'Ž' => Some(0x8E),
            '\u{2018}' => Some(0x91),
            '\u{2019}' => Some(0x92),
            '\u{201C}' => Some(0x93),
            '\u{201D}' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            '˜' => Some(0x98),
            '™' => Some(0x99),
            'š' => Some(0x9A),
            '›' => Some(0x9B),
            'œ' => Some(0x9C),
            'ž' => Some(0x9E),
            'Ÿ' => Some(0x9F),
            _ => None,
        },
    }
}

/// Printable-ASCII rendition of `text`.
///
/// Letters are decomposed and stripped of combining marks (`ş` → `s`,
/// `İ` → `I`), dotless `ı` becomes `i`, whitespace becomes a space, and
/// anything else outside ASCII is dropped.
pub fn transliterate(text: &str) -> String {
    text.chars()
        .flat_map(|c| match c {
            'ı' => "i".chars().collect::<Vec<_>>(),
            c if c.is_whitespace() => vec![' '],
            c => c.nfd().collect(),
        })
        .filter(|c| (' '..='~').contains(c))
        .collect()
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_font_falls_back_to_helvetica() {
        let config = FontConfig {
            regular: PathBuf::from("/nonexistent/regular.ttf"),
            bold: PathBuf::from("/nonexistent/bold.ttf"),
        };
        let fonts = FontSet::load(&config);
        assert!(!fonts.is_unicode());
        assert_eq!(fonts.get(FontFace::Regular).name(), "Helvetica");
        assert_eq!(fonts.get(FontFace::Bold).name(), "Helvetica-Bold");
    }

    #[test]
    fn test_invalid_font_bytes_are_unavailable() {
        let err = EmbeddedFont::from_bytes("junk", b"not a font".to_vec()).err();
        assert!(matches!(err, Some(Error::FontUnavailable(_))));
    }

    #[test]
    fn test_win_ansi_encoding() {
        let font = Font::Builtin(BuiltinFont::Helvetica);
        assert_eq!(font.encode("Aç€").unwrap(), vec![b'A', 0xE7, 0x80]);
        assert!(matches!(
            font.encode("Işık"),
            Err(Error::Encoding { .. })
        ));
        assert_eq!(font.retain_encodable("Işık"), "Ik");
    }

    #[test]
    fn test_transliterate_turkish() {
        assert_eq!(transliterate("İŞĞÜÖÇ ışğüöç"), "ISGUOC isguoc");
        assert_eq!(transliterate("a\tb\u{25A1}c"), "a bc");
    }

    #[test]
    fn test_builtin_widths() {
        let regular = Font::Builtin(BuiltinFont::Helvetica);
        let bold = Font::Builtin(BuiltinFont::HelveticaBold);
        assert!((regular.text_width("A", 10.0) - 6.67).abs() < 0.01);
        assert!((regular.text_width("i", 10.0) - 2.22).abs() < 0.01);
        assert!(bold.text_width("ii", 10.0) > regular.text_width("ii", 10.0));
        assert_eq!(
            regular.text_width("ş", 10.0),
            regular.text_width("s", 10.0)
        );
    }
}
