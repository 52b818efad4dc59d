//! PDF serialization of laid-out pages.
//!
//! Built-in fonts are written as Type1 with WinAnsiEncoding. Embedded
//! TrueType fonts become Type0/CIDFontType2 fonts addressed by glyph id
//! (Identity-H) with a ToUnicode map so text stays extractable.

use super::canvas::{DrawOp, Page, PageSize};
use super::fonts::{EmbeddedFont, Font, FontFace, FontSet};
use super::styles::Color;
use crate::Result;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Characters per `beginbfchar` block allowed by the CMap format.
const BFCHAR_BLOCK: usize = 100;

/// Serializes `pages` into a complete PDF file.
///
/// The output holds no timestamps or random ids, so identical pages produce
/// identical bytes.
pub fn write_pdf(pages: &[Page], fonts: &FontSet, size: PageSize) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font_dict = Dictionary::new();
    for (face, glyphs) in used_fonts(pages, fonts) {
        let font_id = match fonts.get(face) {
            Font::Builtin(builtin) => doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => builtin.base_name(),
                "Encoding" => "WinAnsiEncoding",
            }),
            Font::Embedded(embedded) => embed_font(&mut doc, embedded, &glyphs),
        };
        font_dict.set(resource_name(face), font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => font_dict });

    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(size.width),
        Object::Real(size.height),
    ];
    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page, fonts)?,
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => media_box.clone(),
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

fn resource_name(face: FontFace) -> &'static str {
    match face {
        FontFace::Regular => "F1",
        FontFace::Bold => "F2",
    }
}

/// Faces drawn on any page, each with the glyphs it needs (embedded fonts only).
fn used_fonts(pages: &[Page], fonts: &FontSet) -> BTreeMap<FontFace, BTreeMap<u16, char>> {
    let mut used: BTreeMap<FontFace, BTreeMap<u16, char>> = BTreeMap::new();
    for op in pages.iter().flat_map(|p| &p.ops) {
        if let DrawOp::Text { face, text, .. } = op {
            let glyphs = used.entry(*face).or_default();
            if let Font::Embedded(embedded) = fonts.get(*face) {
                for ch in text.chars() {
                    if let Some(glyph) = embedded.glyph(ch) {
                        glyphs.entry(glyph).or_insert(ch);
                    }
                }
            }
        }
    }
    used
}

/// The whole font program is embedded; glyphs are not subset.
fn embed_font(doc: &mut Document, font: &EmbeddedFont, glyphs: &BTreeMap<u16, char>) -> ObjectId {
    let base_name = Object::Name(font.name().as_bytes().to_vec());
    let ascent = font.ascent();
    let descent = font.descent();

    let file_id = doc.add_object(Stream::new(
        dictionary! { "Length1" => font.data().len() as i64 },
        font.data().to_vec(),
    ));
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_name.clone(),
        "Flags" => 32_i64,
        "FontBBox" => vec![
            Object::Integer(0),
            Object::Real(descent),
            Object::Integer(1000),
            Object::Real(ascent),
        ],
        "ItalicAngle" => 0_i64,
        "Ascent" => Object::Real(ascent),
        "Descent" => Object::Real(descent),
        "CapHeight" => Object::Real(ascent),
        "StemV" => 80_i64,
        "FontFile2" => file_id,
    });

    let widths: Vec<Object> = glyphs
        .keys()
        .flat_map(|&glyph| {
            [
                Object::Integer(i64::from(glyph)),
                Object::Array(vec![Object::Real(font.advance(glyph))]),
            ]
        })
        .collect();
    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => base_name.clone(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0_i64,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => 1000_i64,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });

    let to_unicode_id = doc.add_object(Stream::new(dictionary! {}, to_unicode_cmap(glyphs).into_bytes()));
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => base_name,
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
        "ToUnicode" => to_unicode_id,
    })
}

/// CMap mapping two-byte glyph codes back to UTF-16.
fn to_unicode_cmap(glyphs: &BTreeMap<u16, char>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    let entries: Vec<_> = glyphs.iter().collect();
    for block in entries.chunks(BFCHAR_BLOCK) {
        let _ = writeln!(cmap, "{} beginbfchar", block.len());
        for (glyph, ch) in block {
            let mut units = [0u16; 2];
            let utf16: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{u:04X}"))
                .collect();
            let _ = writeln!(cmap, "<{glyph:04X}> <{utf16}>");
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}

fn page_operations(page: &Page, fonts: &FontSet) -> Result<Vec<Operation>> {
    let mut ops = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                face,
                size,
                color,
                text,
            } => {
                let encoded = fonts.get(*face).encode(text)?;
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![Object::Name(resource_name(*face).into()), Object::Real(*size)],
                ));
                ops.push(color_op("rg", *color));
                ops.push(Operation::new("Td", vec![Object::Real(*x), Object::Real(*y)]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(encoded, StringFormat::Hexadecimal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            DrawOp::Line {
                from,
                to,
                width,
                color,
            } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(color_op("RG", *color));
                ops.push(Operation::new("w", vec![Object::Real(*width)]));
                ops.push(Operation::new("m", vec![Object::Real(from.0), Object::Real(from.1)]));
                ops.push(Operation::new("l", vec![Object::Real(to.0), Object::Real(to.1)]));
                ops.push(Operation::new("S", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                ops.push(Operation::new("q", vec![]));
                if let Some(fill) = fill {
                    ops.push(color_op("rg", *fill));
                }
                if let Some((color, line_width)) = stroke {
                    ops.push(color_op("RG", *color));
                    ops.push(Operation::new("w", vec![Object::Real(*line_width)]));
                }
                ops.push(Operation::new(
                    "re",
                    vec![
                        Object::Real(*x),
                        Object::Real(*y),
                        Object::Real(*width),
                        Object::Real(*height),
                    ],
                ));
                let paint = match (fill.is_some(), stroke.is_some()) {
                    (true, true) => "B",
                    (true, false) => "f",
                    (false, true) => "S",
                    (false, false) => "n",
                };
                ops.push(Operation::new(paint, vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
        }
    }
    Ok(ops)
}

fn color_op(operator: &str, color: Color) -> Operation {
    Operation::new(
        operator,
        vec![
            Object::Real(color.r),
            Object::Real(color.g),
            Object::Real(color.b),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::{Canvas, A4};

    fn sample_pages(fonts: &FontSet) -> Vec<Page> {
        let mut canvas = Canvas::new(fonts, A4);
        canvas.draw_text(50.0, 800.0, FontFace::Bold, 12.0, Color::BLACK, "Başlık (1)");
        canvas.draw_line((50.0, 795.0), (545.0, 795.0), 1.0, Color::BLACK);
        canvas.show_page();
        canvas.draw_rect(
            (50.0, 700.0),
            (100.0, 20.0),
            Some(Color::from_hex(0x34495e)),
            Some((Color::from_hex(0xbdc3c7), 1.0)),
        );
        canvas.draw_text(55.0, 705.0, FontFace::Regular, 9.0, Color::WHITE, "Müdür");
        canvas.into_pages()
    }

    #[test]
    fn test_pdf_reloads_with_expected_pages() {
        let fonts = FontSet::builtin();
        let bytes = write_pdf(&sample_pages(&fonts), &fonts, A4).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);

        let second = pages[&2];
        let content = Content::decode(&doc.get_page_content(second).unwrap()).unwrap();
        let shown: Vec<Vec<u8>> = content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(shown, vec![vec![b'M', 0xFC, b'd', 0xFC, b'r']]);
    }

    #[test]
    fn test_output_is_deterministic() {
        let fonts = FontSet::builtin();
        let pages = sample_pages(&fonts);
        let first = write_pdf(&pages, &fonts, A4).unwrap();
        let second = write_pdf(&pages, &fonts, A4).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_only_used_faces_are_registered() {
        let fonts = FontSet::builtin();
        let mut canvas = Canvas::new(&fonts, A4);
        canvas.draw_text(50.0, 800.0, FontFace::Regular, 10.0, Color::BLACK, "yalniz");
        let used = used_fonts(&canvas.into_pages(), &fonts);
        assert_eq!(used.keys().copied().collect::<Vec<_>>(), vec![FontFace::Regular]);
    }

    #[test]
    fn test_to_unicode_cmap_entries() {
        let glyphs = BTreeMap::from([(3u16, ' '), (0x1F2u16, 'ş')]);
        let cmap = to_unicode_cmap(&glyphs);
        assert!(cmap.contains("2 beginbfchar"));
        assert!(cmap.contains("<0003> <0020>"));
        assert!(cmap.contains("<01F2> <015F>"));
    }

    fn unicode_fonts() -> Option<FontSet> {
        let fonts = FontSet::load(&crate::FontConfig::default());
        if !fonts.is_unicode() {
            eprintln!("no TrueType font installed; skipping");
            return None;
        }
        Some(fonts)
    }

    /// `<glyph> <utf16>` pairs from a ToUnicode CMap.
    fn cmap_entries(cmap: &str) -> BTreeMap<u16, char> {
        cmap.lines()
            .filter_map(|line| {
                let (glyph, unicode) = line.split_once("> <")?;
                let glyph = u16::from_str_radix(glyph.strip_prefix('<')?, 16).ok()?;
                let unicode = u32::from_str_radix(unicode.strip_suffix('>')?, 16).ok()?;
                Some((glyph, char::from_u32(unicode)?))
            })
            .collect()
    }

    #[test]
    fn test_unicode_fonts_are_embedded_as_type0() {
        let Some(fonts) = unicode_fonts() else {
            return;
        };
        let text = "Şırnak İcra Müdürlüğü";
        let mut canvas = Canvas::new(&fonts, A4);
        canvas.draw_text(50.0, 800.0, FontFace::Regular, 12.0, Color::BLACK, text);
        canvas.draw_text(50.0, 780.0, FontFace::Bold, 12.0, Color::BLACK, "Karar");
        let bytes = write_pdf(&canvas.into_pages(), &fonts, A4).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let page_fonts = doc.get_page_fonts(page_id);
        assert_eq!(page_fonts.len(), 2);

        let regular = page_fonts[b"F1".as_slice()];
        assert_eq!(regular.get(b"Subtype").unwrap().as_name_str().unwrap(), "Type0");
        assert_eq!(regular.get(b"Encoding").unwrap().as_name_str().unwrap(), "Identity-H");

        let descendant = regular.get(b"DescendantFonts").unwrap().as_array().unwrap()[0]
            .as_reference()
            .unwrap();
        let cid_font = doc.get_object(descendant).unwrap().as_dict().unwrap();
        assert_eq!(
            cid_font.get(b"Subtype").unwrap().as_name_str().unwrap(),
            "CIDFontType2"
        );

        let to_unicode = regular.get(b"ToUnicode").unwrap().as_reference().unwrap();
        let stream = doc.get_object(to_unicode).unwrap().as_stream().unwrap();
        let cmap = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let glyphs = cmap_entries(&String::from_utf8(cmap).unwrap());

        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let Some(Object::String(shown, _)) = content
            .operations
            .iter()
            .find(|op| op.operator == "Tj")
            .and_then(|op| op.operands.first())
        else {
            panic!("page shows no text");
        };
        let decoded: String = shown
            .chunks(2)
            .map(|pair| glyphs[&u16::from_be_bytes([pair[0], pair[1]])])
            .collect();
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_unicode_fonts_fall_back_for_missing_glyphs() {
        let Some(fonts) = unicode_fonts() else {
            return;
        };
        let mut canvas = Canvas::new(&fonts, A4);
        canvas.draw_text(50.0, 800.0, FontFace::Regular, 12.0, Color::BLACK, "Müdür 漢");
        canvas.draw_text(50.0, 780.0, FontFace::Regular, 12.0, Color::BLACK, "Müdür");
        let pages = canvas.into_pages();
        assert_eq!(pages[0].texts().collect::<Vec<_>>(), vec!["Mudur ", "Müdür"]);
        assert!(write_pdf(&pages, &fonts, A4).is_ok());
    }
}
