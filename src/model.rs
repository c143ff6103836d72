//! Data structures describing the logical content of an RML document.
//!
//! The RML parser in [`crate::rml`] produces these values and the converter in
//! [`crate::convert`] lays them out with `genpdf`.  Keeping the two steps apart means the
//! parser can be tested without fonts and the layout code never has to look at XML.

use std::path::{Path, PathBuf};

use crate::richtext::Span;

/// Horizontal placement of paragraphs and images.
///
/// `genpdf` has no justified alignment, so [`Justified`](Self::Justified) is laid out flush
/// left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// Left aligned content.
    #[default]
    Left,
    /// Center aligned content.
    Center,
    /// Right aligned content.
    Right,
    /// Fully justified paragraphs.
    Justified,
}

/// Rich text paragraph carrying inline styling information, alignment and an optional font
/// size override in points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichParagraph {
    spans: Vec<Span>,
    alignment: HorizontalAlignment,
    font_size: Option<u8>,
}

impl RichParagraph {
    /// Creates a paragraph from the provided spans using left alignment.
    pub fn new(spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
            ..Self::default()
        }
    }

    /// Returns the spans that make up the paragraph.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Returns the configured alignment.
    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Returns the font size override, if any.
    pub fn font_size(&self) -> Option<u8> {
        self.font_size
    }

    /// Returns the concatenated text of all spans.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(Span::text).collect()
    }

    /// Returns whether any span requests an underline.
    pub fn has_underline(&self) -> bool {
        self.spans.iter().any(Span::is_underlined)
    }

    /// Sets the alignment and returns the updated paragraph.
    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the font size override and returns the updated paragraph.
    pub fn with_font_size(mut self, font_size: impl Into<Option<u8>>) -> Self {
        self.font_size = font_size.into();
        self
    }
}

/// Heading levels understood by the story parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadingLevel {
    /// `<title>`
    Title,
    /// `<h1>`
    H1,
    /// `<h2>`
    H2,
    /// `<h3>`
    H3,
}

impl HeadingLevel {
    /// Default font size in points for the heading level.
    pub fn font_size(self) -> u8 {
        match self {
            HeadingLevel::Title => 20,
            HeadingLevel::H1 => 18,
            HeadingLevel::H2 => 14,
            HeadingLevel::H3 => 12,
        }
    }

    /// Default alignment for the heading level.
    pub fn alignment(self) -> HorizontalAlignment {
        match self {
            HeadingLevel::Title => HorizontalAlignment::Center,
            _ => HorizontalAlignment::Left,
        }
    }
}

/// A table of rich paragraphs; every row has the same number of cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    rows: Vec<Vec<RichParagraph>>,
}

impl Table {
    /// Creates a table from rows.  The parser guarantees rows of equal length.
    pub fn new(rows: Vec<Vec<RichParagraph>>) -> Self {
        Self { rows }
    }

    /// Returns the rows of the table.
    pub fn rows(&self) -> &[Vec<RichParagraph>] {
        &self.rows
    }

    /// Returns the number of columns.
    pub fn columns(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

/// Bulleted or numbered list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct List {
    ordered: bool,
    items: Vec<RichParagraph>,
}

impl List {
    /// Creates a list with the given items.
    pub fn new(ordered: bool, items: Vec<RichParagraph>) -> Self {
        Self { ordered, items }
    }

    /// Returns whether the list is numbered.
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Returns the list items.
    pub fn items(&self) -> &[RichParagraph] {
        &self.items
    }
}

/// Image flowable referencing a file on disk.
///
/// The width is stored as millimetres so it maps directly onto the scaling applied by
/// [`CaptionedImage`](crate::elements::CaptionedImage).
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBlock {
    path: PathBuf,
    caption: Option<RichParagraph>,
    alignment: HorizontalAlignment,
    width_mm: Option<f64>,
}

impl ImageBlock {
    /// Creates a new image block for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            caption: None,
            alignment: HorizontalAlignment::Left,
            width_mm: None,
        }
    }

    /// Returns the image path as written in the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the caption paragraph, if any.
    pub fn caption(&self) -> Option<&RichParagraph> {
        self.caption.as_ref()
    }

    /// Returns the configured alignment.
    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Returns the requested rendered width in millimetres, if any.
    pub fn width_mm(&self) -> Option<f64> {
        self.width_mm
    }

    /// Sets the caption and returns the updated image block.
    pub fn with_caption(mut self, caption: impl Into<Option<RichParagraph>>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Sets the alignment and returns the updated image block.
    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Constrains the rendered width (in millimetres) and returns the updated block.
    pub fn with_width_mm(mut self, width_mm: impl Into<Option<f64>>) -> Self {
        self.width_mm = width_mm.into();
        self
    }
}

/// Individual flowables of the story.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// `<title>` and `<h1>`..`<h3>`.
    Heading {
        level: HeadingLevel,
        paragraph: RichParagraph,
    },
    /// Styled paragraph content.
    Paragraph(RichParagraph),
    /// Vertical whitespace in millimetres.
    Spacer { height_mm: f64 },
    /// `<blockTable>`.
    Table(Table),
    /// `<ul>` and `<ol>`.
    List(List),
    /// Captioned image content.
    Image(ImageBlock),
    /// Explicit page break request.
    PageBreak,
}

impl Block {
    /// Convenience helper for building a paragraph block.
    pub fn paragraph(spans: impl Into<Vec<Span>>) -> Self {
        Self::Paragraph(RichParagraph::new(spans))
    }
}

/// Page geometry in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSetup {
    pub width_mm: f64,
    pub height_mm: f64,
    pub top_mm: f64,
    pub right_mm: f64,
    pub bottom_mm: f64,
    pub left_mm: f64,
}

/// One inch, the default margin on every side.
pub const DEFAULT_MARGIN_MM: f64 = 25.4;

impl Default for PageSetup {
    /// A4 with one inch margins.
    fn default() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            top_mm: DEFAULT_MARGIN_MM,
            right_mm: DEFAULT_MARGIN_MM,
            bottom_mm: DEFAULT_MARGIN_MM,
            left_mm: DEFAULT_MARGIN_MM,
        }
    }
}

/// A parsed RML document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RmlDocument {
    title: Option<String>,
    page: PageSetup,
    blocks: Vec<Block>,
}

impl RmlDocument {
    /// Creates a document with default page setup and the given story.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            ..Self::default()
        }
    }

    /// Returns the document title, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the page geometry.
    pub fn page(&self) -> &PageSetup {
        &self.page
    }

    /// Returns the story flowables.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Sets the title and returns the updated document.
    pub fn with_title(mut self, title: impl Into<Option<String>>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the page geometry and returns the updated document.
    pub fn with_page(mut self, page: PageSetup) -> Self {
        self.page = page;
        self
    }
}
