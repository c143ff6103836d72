//! Extended element implementations built on top of `genpdf` primitives.
//!
//! This module adds the pieces the converter needs that the upstream crate does not ship with:
//! rich paragraphs that switch to a wrapping, underline-capable renderer when required, fixed-height
//! spacers, and images with optional captions decoded through the [`image`] crate.

use std::collections::VecDeque;
use std::path::Path;

use image::GenericImageView;

use genpdf::elements::{Image, Paragraph};
use genpdf::error::{Context as _, Error};
use genpdf::style::{Style, StyledString};
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Scale, Size};

use crate::model::{HorizontalAlignment, RichParagraph};
use crate::richtext::{spans_to_styled_strings, StyledSpan};

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const DEFAULT_CAPTION_SPACING_MM: f64 = 2.0;
const DEFAULT_UNDERLINE_OFFSET_MM: f64 = 0.4;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Maps the model alignment onto `genpdf`, which lays justified text out flush left.
pub fn alignment(alignment: HorizontalAlignment) -> Alignment {
    match alignment {
        HorizontalAlignment::Left | HorizontalAlignment::Justified => Alignment::Left,
        HorizontalAlignment::Center => Alignment::Center,
        HorizontalAlignment::Right => Alignment::Right,
    }
}

fn estimated_image_size(image: &image::DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// Loads an image from the given path using the [`image`] crate with descriptive errors.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

/// Converts the image at `path` into a `genpdf` image together with its estimated size.
pub fn image_from_path(path: impl AsRef<Path>) -> Result<(Image, Size), Error> {
    let dynamic = decode_image_from_path(path)?;
    let size = estimated_image_size(&dynamic, DEFAULT_IMAGE_DPI);
    let image = Image::from_dynamic_image(dynamic)?;
    Ok((image, size))
}

enum RichTextBody {
    Plain(Paragraph),
    Underlined(UnderlinedText),
}

/// A [`RichParagraph`] ready for layout.
///
/// Paragraphs without underlined spans are plain `genpdf` paragraphs; paragraphs with underlined
/// spans go through [`UnderlinedText`], which wraps the same way and also draws the strokes.
pub struct RichText {
    body: RichTextBody,
    style: Style,
}

impl RichText {
    /// Builds the element for `paragraph`, applying its alignment and font size.
    pub fn from_paragraph(paragraph: &RichParagraph) -> Self {
        let align = alignment(paragraph.alignment());
        let body = if paragraph.has_underline() {
            RichTextBody::Underlined(
                UnderlinedText::new(spans_to_styled_strings(paragraph.spans())).with_alignment(align),
            )
        } else {
            let mut text = Paragraph::default();
            for span in paragraph.spans() {
                text.push(span.to_styled_string());
            }
            text.set_alignment(align);
            RichTextBody::Plain(text)
        };

        let mut style = Style::new();
        if let Some(size) = paragraph.font_size() {
            style.set_font_size(size);
        }

        Self { body, style }
    }
}

impl Element for RichText {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let style = style.and(self.style);
        match &mut self.body {
            RichTextBody::Plain(paragraph) => paragraph.render(context, area, style),
            RichTextBody::Underlined(text) => text.render(context, area, style),
        }
    }
}

/// Fixed vertical whitespace.  A spacer taller than the remaining page space is cut at the
/// page end instead of carrying over.
pub struct Spacer {
    height: Mm,
}

impl Spacer {
    /// Creates a spacer of `height_mm` millimetres.
    pub fn new(height_mm: f64) -> Self {
        Self {
            height: mm_from_f64(height_mm),
        }
    }
}

impl Element for Spacer {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let available = area.size().height;
        let height = if self.height > available {
            available
        } else {
            self.height
        };

        let mut result = RenderResult::default();
        result.size = Size::new(0, height);
        Ok(result)
    }
}

/// Renders an image with an optional caption stacked underneath.
///
/// The image and the caption share the same alignment and the image can be rescaled to a specific
/// width while keeping the aspect ratio.
pub struct CaptionedImage {
    image: Image,
    caption: Option<RichText>,
    alignment: Alignment,
    natural_size: Size,
    requested_width: Option<Mm>,
    spacing: Mm,
}

impl CaptionedImage {
    /// Creates a captioned image from the file located at `path`.
    pub fn from_path(path: impl AsRef<Path>, caption: Option<RichText>) -> Result<Self, Error> {
        let (image, natural_size) = image_from_path(path)?;
        let mut element = Self {
            image,
            caption,
            alignment: Alignment::Left,
            natural_size,
            requested_width: None,
            spacing: mm_from_f64(DEFAULT_CAPTION_SPACING_MM),
        };
        element.apply_alignment();
        Ok(element)
    }

    /// Sets the horizontal alignment of the image and returns the updated element.
    ///
    /// Captions keep the alignment of their own paragraph.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self.apply_alignment();
        self
    }

    /// Constrains the rendered width and returns the updated element.
    pub fn with_width(mut self, width: impl Into<Option<Mm>>) -> Self {
        self.requested_width = width.into();
        self.apply_width();
        self
    }

    fn apply_alignment(&mut self) {
        self.image.set_alignment(self.alignment);
    }

    fn apply_width(&mut self) {
        if let Some(width) = self.requested_width {
            let natural = mm_to_f64(self.natural_size.width);
            if natural > f64::EPSILON {
                let scale = mm_to_f64(width) / natural;
                self.image.set_scale(Scale::new(scale, scale));
            }
        } else {
            self.image.set_scale(Scale::new(1.0, 1.0));
        }
    }
}

impl Element for CaptionedImage {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let image_result = self.image.render(context, area.clone(), style)?;
        result.size = result.size.stack_vertical(image_result.size);
        result.has_more |= image_result.has_more;

        let Some(caption) = self.caption.as_mut() else {
            return Ok(result);
        };

        area.add_offset(Position::new(0, image_result.size.height + self.spacing));
        result.size = result.size.stack_vertical(Size::new(0, self.spacing));

        let caption_result = caption.render(context, area, style)?;
        result.size = result.size.stack_vertical(caption_result.size);
        result.has_more |= caption_result.has_more;

        Ok(result)
    }
}

struct Word {
    string: StyledString,
    underline: bool,
}

/// Number of leading words whose widths fit into `available`, never zero while words remain.
fn words_fitting(widths: impl IntoIterator<Item = Mm>, available: Mm) -> usize {
    let mut used = Mm::default();
    let mut count = 0;
    for width in widths {
        if count > 0 && used + width > available {
            break;
        }
        used += width;
        count += 1;
    }
    count
}

/// Styled text that wraps like a paragraph and draws thin strokes under underlined spans.
///
/// Words that do not fit on the current page stay queued and are rendered on the next call.
pub struct UnderlinedText {
    spans: Vec<StyledSpan>,
    words: VecDeque<Word>,
    prepared: bool,
    alignment: Alignment,
    underline_offset: Mm,
}

impl UnderlinedText {
    /// Creates a new underlined text element from the provided spans.
    pub fn new(spans: Vec<StyledSpan>) -> Self {
        Self {
            spans,
            words: VecDeque::new(),
            prepared: false,
            alignment: Alignment::Left,
            underline_offset: mm_from_f64(DEFAULT_UNDERLINE_OFFSET_MM),
        }
    }

    /// Sets the alignment and returns the updated element.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    fn prepare(&mut self, style: Style) {
        if self.prepared {
            return;
        }
        for span in self.spans.drain(..) {
            let span_style = style.and(span.string.style);
            for word in span.string.s.split_inclusive(' ') {
                self.words.push_back(Word {
                    string: StyledString::new(word, span_style),
                    underline: span.underline,
                });
            }
        }
        self.prepared = true;
    }

    fn line_offset(&self, width: Mm, available: Mm) -> Mm {
        match self.alignment {
            Alignment::Left => Mm::default(),
            Alignment::Center => (available - width) / 2.0,
            Alignment::Right => available - width,
        }
    }
}

impl Element for UnderlinedText {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        self.prepare(style);
        let font_cache = &context.font_cache;
        let mut result = RenderResult::default();

        while !self.words.is_empty() {
            let available = area.size().width;
            let count = words_fitting(
                self.words.iter().map(|word| word.string.width(font_cache)),
                available,
            );
            let line: Vec<&Word> = self.words.iter().take(count).collect();
            let widths: Vec<Mm> = line.iter().map(|word| word.string.width(font_cache)).collect();
            let total_width: Mm = widths.iter().copied().sum();
            let line_height = line
                .iter()
                .map(|word| word.string.style.line_height(font_cache))
                .fold(style.line_height(font_cache), Mm::max);

            if line_height > area.size().height {
                result.has_more = true;
                break;
            }

            let x_offset = self.line_offset(total_width, available);
            {
                let Some(mut section) =
                    area.text_section(font_cache, Position::new(x_offset, 0), style)
                else {
                    result.has_more = true;
                    break;
                };
                for word in &line {
                    section.print_str(&word.string.s, word.string.style)?;
                }
            }

            let glyph_height = line
                .iter()
                .map(|word| {
                    let word_style = word.string.style;
                    word_style
                        .font(font_cache)
                        .glyph_height(word_style.font_size())
                })
                .fold(Mm::default(), Mm::max);
            let baseline = glyph_height + self.underline_offset;
            let mut cursor = x_offset;
            for (index, (word, width)) in line.iter().zip(&widths).enumerate() {
                if word.underline {
                    let joins_next = line.get(index + 1).map_or(false, |next| next.underline);
                    let stroke = if joins_next {
                        *width
                    } else {
                        word.string
                            .style
                            .str_width(font_cache, word.string.s.trim_end())
                    };
                    let mut line_style = Style::new();
                    if let Some(color) = word.string.style.color() {
                        line_style.set_color(color);
                    }
                    area.draw_line(
                        vec![
                            Position::new(cursor, baseline),
                            Position::new(cursor + stroke, baseline),
                        ],
                        line_style,
                    );
                }
                cursor += *width;
            }

            result.size = result
                .size
                .stack_vertical(Size::new(total_width, line_height));
            area.add_offset(Position::new(0, line_height));
            self.words.drain(..count);
        }

        Ok(result)
    }
}
