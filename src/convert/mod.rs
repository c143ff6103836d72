//! The document converter: intermediate RML file in, PDF file out.
//!
//! [`DocumentConverter`] is the seam the renderer talks to.  [`RmlConverter`] is the default
//! implementation: it parses the RML subset described in [`crate::rml`], lays it out with
//! `genpdf` and writes the result next to the requested output before renaming it into place,
//! so a failed conversion never leaves a truncated file behind.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use genpdf::elements::{FrameCellDecorator, OrderedList, PageBreak, TableLayout, UnorderedList};
use genpdf::{Element as _, Margins};
use tempfile::NamedTempFile;

#[cfg(feature = "hyphenation")]
use genpdf::hyphenation;

use crate::builder::DocumentBuilder;
use crate::elements::{self, mm_from_f64, CaptionedImage, RichText, Spacer};
use crate::error::ConvertError;
use crate::model::{Block, ImageBlock, List, RmlDocument, Table};
use crate::rml;

const HEADING_SPACING_MM: f64 = 2.0;
const CELL_PADDING_MM: f64 = 1.0;

/// Result of a successful conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversion {
    /// Path of the written PDF.
    pub output: PathBuf,
    /// Number of pages in the PDF.
    pub pages: usize,
    /// Size of the PDF in bytes.
    pub bytes: u64,
}

/// Turns an intermediate markup file into a PDF.
pub trait DocumentConverter {
    /// Converts the markup at `source` and writes the PDF to `output`.
    ///
    /// Implementations must not leave a partial file at `output` when they fail.
    fn convert(&self, source: &Path, output: &Path) -> Result<Conversion, ConvertError>;
}

impl<C: DocumentConverter + ?Sized> DocumentConverter for &C {
    fn convert(&self, source: &Path, output: &Path) -> Result<Conversion, ConvertError> {
        (**self).convert(source, output)
    }
}

/// A PDF rendered in memory.
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

/// Converts RML documents to PDF with `genpdf`.
pub struct RmlConverter {
    fonts_dir: Option<PathBuf>,
    font_family: Option<String>,
    font_size: Option<u8>,
    base_dir: Option<PathBuf>,
    #[cfg(feature = "hyphenation")]
    hyphenator: Option<hyphenation::Standard>,
}

impl Default for RmlConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RmlConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RmlConverter")
            .field("fonts_dir", &self.fonts_dir)
            .field("font_family", &self.font_family)
            .field("font_size", &self.font_size)
            .field("base_dir", &self.base_dir)
            .finish_non_exhaustive()
    }
}

impl RmlConverter {
    /// Creates a converter using the default font directory and family.
    pub fn new() -> Self {
        Self {
            fonts_dir: None,
            font_family: None,
            font_size: None,
            base_dir: None,
            #[cfg(feature = "hyphenation")]
            hyphenator: None,
        }
    }

    /// Loads fonts from `dir`.
    pub fn with_fonts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fonts_dir = Some(dir.into());
        self
    }

    /// Uses the font family `name` (files `<name>-Regular.ttf` and so on).
    pub fn with_font_family(mut self, name: impl Into<String>) -> Self {
        self.font_family = Some(name.into());
        self
    }

    /// Sets the base font size in points.
    pub fn with_font_size(mut self, size: u8) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Resolves relative image paths against `dir` instead of the working directory.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Enables hyphenation using the provided hyphenation dictionary.
    #[cfg(feature = "hyphenation")]
    pub fn with_hyphenator(mut self, hyphenator: hyphenation::Standard) -> Self {
        self.hyphenator = Some(hyphenator);
        self
    }

    /// Parses and renders RML source text.
    pub fn render_str(&self, source: &str) -> Result<RenderedPdf, ConvertError> {
        let document = rml::parse_document(source)?;
        self.render(&document)
    }

    /// Renders a parsed document.
    pub fn render(&self, document: &RmlDocument) -> Result<RenderedPdf, ConvertError> {
        let builder = DocumentBuilder::new()
            .with_page(*document.page())
            .with_title(document.title().map(str::to_owned))
            .with_font_size(self.font_size)
            .with_fonts_dir(self.fonts_dir.clone())
            .with_font_family(self.font_family.clone());

        #[cfg(feature = "hyphenation")]
        let builder = match &self.hyphenator {
            Some(hyphenator) => builder.with_hyphenator(hyphenator.clone()),
            None => builder,
        };

        let (mut pdf, counter) = builder.build().map_err(ConvertError::Fonts)?;

        for block in document.blocks() {
            self.push_block(&mut pdf, block)?;
        }

        let mut bytes = Vec::new();
        pdf.render(&mut bytes)?;

        Ok(RenderedPdf {
            bytes,
            pages: counter.pages(),
        })
    }

    fn push_block(&self, pdf: &mut genpdf::Document, block: &Block) -> Result<(), ConvertError> {
        match block {
            Block::Heading { paragraph, .. } => pdf.push(
                RichText::from_paragraph(paragraph)
                    .padded(Margins::trbl(0, 0, mm_from_f64(HEADING_SPACING_MM), 0)),
            ),
            Block::Paragraph(paragraph) => pdf.push(RichText::from_paragraph(paragraph)),
            Block::Spacer { height_mm } => pdf.push(Spacer::new(*height_mm)),
            Block::Table(table) => pdf.push(table_layout(table)?),
            Block::List(list) => push_list(pdf, list),
            Block::Image(image) => pdf.push(self.captioned_image(image)?),
            Block::PageBreak => pdf.push(PageBreak::new()),
        }
        Ok(())
    }

    fn captioned_image(&self, image: &ImageBlock) -> Result<CaptionedImage, ConvertError> {
        let path = match &self.base_dir {
            Some(base) if image.path().is_relative() => base.join(image.path()),
            _ => image.path().to_path_buf(),
        };
        let caption = image.caption().map(RichText::from_paragraph);
        let element = CaptionedImage::from_path(path, caption)?
            .with_alignment(elements::alignment(image.alignment()))
            .with_width(image.width_mm().map(mm_from_f64));
        Ok(element)
    }
}

fn table_layout(table: &Table) -> Result<TableLayout, ConvertError> {
    let mut layout = TableLayout::new(vec![1; table.columns()]);
    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));
    for row in table.rows() {
        let mut cells = layout.row();
        for cell in row {
            cells.push_element(
                RichText::from_paragraph(cell).padded(Margins::all(mm_from_f64(CELL_PADDING_MM))),
            );
        }
        cells.push()?;
    }
    Ok(layout)
}

fn push_list(pdf: &mut genpdf::Document, list: &List) {
    if list.is_ordered() {
        let mut ordered = OrderedList::new();
        for item in list.items() {
            ordered.push(RichText::from_paragraph(item));
        }
        pdf.push(ordered);
    } else {
        let mut unordered = UnorderedList::new();
        for item in list.items() {
            unordered.push(RichText::from_paragraph(item));
        }
        pdf.push(unordered);
    }
}

/// Writes `bytes` to a temporary sibling of `output` and renames it into place.
fn write_atomically(output: &Path, bytes: &[u8]) -> Result<(), ConvertError> {
    let write_error = |source| ConvertError::Write {
        path: output.to_path_buf(),
        source,
    };

    let directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(directory).map_err(write_error)?;
    staged.write_all(bytes).map_err(write_error)?;
    staged.as_file().sync_all().map_err(write_error)?;
    staged
        .persist(output)
        .map_err(|err| write_error(err.error))?;
    Ok(())
}

impl DocumentConverter for RmlConverter {
    fn convert(&self, source: &Path, output: &Path) -> Result<Conversion, ConvertError> {
        let text = fs::read_to_string(source).map_err(|err| ConvertError::Read {
            path: source.to_path_buf(),
            source: err,
        })?;

        let rendered = self.render_str(&text)?;
        write_atomically(output, &rendered.bytes)?;
        log::info!(
            "wrote {} ({} pages, {} bytes)",
            output.display(),
            rendered.pages,
            rendered.bytes.len()
        );

        Ok(Conversion {
            output: output.to_path_buf(),
            pages: rendered.pages,
            bytes: rendered.bytes.len() as u64,
        })
    }
}
