//! Per-file conversion: container → extractor → normalizer → renderer.

mod normalize;
mod story;

use crate::adapters::udf::{
    ContentExtractor, FlatTextExtractor, LineExtractor, SourceDocument, StructuredExtractor,
};
use crate::render::{
    FlowRenderer, FontSet, LineDocument, ManualRenderer, Renderer, StyleSheet, TextDocument,
    TextRenderer,
};
use crate::{ConversionMode, ConvertOptions, Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub use self::normalize::{DisplayLine, Normalizer};
pub use self::story::StoryBuilder;

/// Result of converting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Pdf(Vec<u8>),
    Text(String),
}

impl Rendered {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Pdf(bytes) => bytes,
            Self::Text(text) => text.into_bytes(),
        }
    }
}

/// Converts documents according to one set of options.
///
/// Fonts are resolved once when the converter is built and reused for every
/// file it converts.
pub struct Converter {
    options: ConvertOptions,
    fonts: FontSet,
    styles: StyleSheet,
}

impl Converter {
    /// Creates a new converter with the given options.
    pub fn new(options: ConvertOptions) -> Result<Self> {
        let fonts = FontSet::load(&options.fonts);
        if !fonts.is_unicode() {
            log::info!("Unicode fonts not found; using Helvetica with transliteration");
        }
        Ok(Self {
            options,
            fonts,
            styles: StyleSheet::standard()?,
        })
    }

    /// Creates a new converter with default options.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ConvertOptions::default())
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Converts the document at `path` without writing anything.
    pub fn render<P: AsRef<Path>>(&self, path: P) -> Result<Rendered> {
        let source = SourceDocument::new(path.as_ref());
        let template = self.options.template.strategy();

        match self.options.mode {
            ConversionMode::Flat => {
                let flat = FlatTextExtractor.extract(&source.read_content()?)?;
                let normalizer = Normalizer::new(template);
                let document = LineDocument {
                    header: self
                        .options
                        .header
                        .then(|| format!("Document: {}", source.stem())),
                    lines: flat
                        .joined()
                        .split('\n')
                        .map(|line| normalizer.clean(line))
                        .collect(),
                };
                Ok(Rendered::Pdf(ManualRenderer::new(&self.fonts).render(&document)?))
            }
            ConversionMode::Professional => {
                let lines = LineExtractor.extract(&source.read_content()?)?;
                let story = StoryBuilder::new(template).professional(&lines);
                if story.is_empty() {
                    return Err(Error::EmptyDocument);
                }
                Ok(Rendered::Pdf(self.flow().render(&story)?))
            }
            ConversionMode::Structured => {
                let tree = StructuredExtractor.extract(&source.read_content()?)?;
                let story = StoryBuilder::new(template).structured(&source.file_name(), &tree);
                Ok(Rendered::Pdf(self.flow().render(&story)?))
            }
            ConversionMode::Text => {
                let flat = FlatTextExtractor.extract(&source.read_content()?)?;
                let document = TextDocument {
                    name: source.file_name(),
                    fragments: flat.fragments().map(str::to_string).collect(),
                };
                Ok(Rendered::Text(TextRenderer.render(&document)?))
            }
            ConversionMode::PlainText => {
                let content = fs::read_to_string(source.path())?;
                let document = LineDocument {
                    header: None,
                    lines: content.lines().map(str::to_string).collect(),
                };
                Ok(Rendered::Pdf(ManualRenderer::new(&self.fonts).render(&document)?))
            }
        }
    }

    /// Where [`convert_file`](Self::convert_file) writes the output for `input`.
    pub fn output_path(&self, input: &Path, output_dir: &Path) -> PathBuf {
        let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
        name.push(".");
        name.push(self.options.mode.output_extension());
        output_dir.join(name)
    }

    /// Converts `input` and writes `<stem>.<ext>` into `output_dir`.
    ///
    /// Nothing is written when conversion fails.
    pub fn convert_file(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        let rendered = self.render(input)?;
        let output = self.output_path(input, output_dir);
        fs::write(&output, rendered.into_bytes())?;
        log::debug!("Wrote {}", output.display());
        Ok(output)
    }

    fn flow(&self) -> FlowRenderer<'_> {
        FlowRenderer::new(&self.fonts, &self.styles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FontConfig;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_udf(path: &Path, content: &str) {
        let mut zip = ZipWriter::new(fs::File::create(path).unwrap());
        zip.start_file("content.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(content.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    fn options(mode: ConversionMode) -> ConvertOptions {
        ConvertOptions {
            mode,
            fonts: FontConfig {
                regular: PathBuf::from("/nonexistent/regular.ttf"),
                bold: PathBuf::from("/nonexistent/bold.ttf"),
            },
            ..ConvertOptions::default()
        }
    }

    #[test]
    fn test_output_path_uses_mode_extension() {
        let pdf = Converter::new(options(ConversionMode::Flat)).unwrap();
        assert_eq!(
            pdf.output_path(Path::new("in/dilekce.udf"), Path::new("out")),
            PathBuf::from("out/dilekce.pdf")
        );
        let txt = Converter::new(options(ConversionMode::Text)).unwrap();
        assert_eq!(
            txt.output_path(Path::new("in/karar.v2.udf"), Path::new("out")),
            PathBuf::from("out/karar.v2.txt")
        );
    }

    #[test]
    fn test_plain_text_mode_renders_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notlar.txt");
        fs::write(&input, "birinci\n\nikinci\n").unwrap();

        let converter = Converter::new(options(ConversionMode::PlainText)).unwrap();
        let output = converter.convert_file(&input, dir.path()).unwrap();
        assert_eq!(output, dir.path().join("notlar.pdf"));
        let bytes = fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_failed_conversion_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bozuk.udf");
        fs::write(&input, b"not a zip").unwrap();

        let converter = Converter::new(options(ConversionMode::Flat)).unwrap();
        assert!(converter.convert_file(&input, dir.path()).is_err());
        assert!(!dir.path().join("bozuk.pdf").exists());
    }

    #[test]
    fn test_flat_mode_keeps_cdata_line_breaks() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.udf");
        write_udf(
            &input,
            "<template><content><![CDATA[T.C.\nANKARA\n\nDosya No: 2024/123\nKarar: kabul]]></content></template>",
        );

        let converter = Converter::new(options(ConversionMode::Flat)).unwrap();
        let Rendered::Pdf(pdf) = converter.render(&input).unwrap() else {
            panic!("flat mode renders a PDF");
        };
        let doc = lopdf::Document::load_mem(&pdf).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content =
            lopdf::content::Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let shown: Vec<String> = content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(lopdf::Object::String(bytes, _)) => {
                    Some(String::from_utf8_lossy(bytes).into_owned())
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            shown,
            vec!["Document: a", "T.C.", "ANKARA", "Dosya No: 2024/123", "Karar: kabul"]
        );
    }

    #[test]
    fn test_professional_mode_rejects_blank_payload() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bos.udf");
        write_udf(
            &input,
            "<template><content><![CDATA[ \n\t\n   ]]></content></template>",
        );

        let converter = Converter::new(options(ConversionMode::Professional)).unwrap();
        assert!(matches!(
            converter.render(&input),
            Err(Error::EmptyDocument)
        ));
        assert!(converter.convert_file(&input, dir.path()).is_err());
        assert!(!dir.path().join("bos.pdf").exists());
    }
}
