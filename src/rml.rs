//! Parser for the subset of RML (Report Markup Language) understood by
//! [`RmlConverter`](crate::convert::RmlConverter).
//!
//! An RML document is an XML tree rooted at `<document>`.  The optional `<template>` element
//! describes the page geometry, the optional `<stylesheet>` declares named paragraph styles and
//! the mandatory `<story>` holds the flowables:
//!
//! - `<title>`, `<h1>`, `<h2>`, `<h3>` and `<para>` with inline `<b>`/`<strong>`, `<i>`/`<em>`,
//!   `<u>` and `<font color="...">`
//! - `<spacer length="..."/>` and `<nextPage/>`
//! - `<blockTable>` with `<tr>`/`<td>` rows
//! - `<ul>`/`<ol>` with `<li>` items
//! - `<image file="..." width="..." align="..." caption="..."/>`
//!
//! Lengths accept the `pt` (default), `mm`, `cm` and `in` units.  Elements outside the subset
//! are rejected with an [`RmlError`] pointing at their position in the source.

use std::collections::HashMap;
use std::fmt;

use genpdf::style::Color;
use roxmltree::{Node, ParsingOptions};

use crate::error::ConvertError;
use crate::model::{
    Block, HeadingLevel, HorizontalAlignment, ImageBlock, List, PageSetup, RichParagraph,
    RmlDocument, Table,
};
use crate::richtext::{collapse_whitespace, StyleState};

const MM_PER_POINT: f64 = 25.4 / 72.0;

/// Semantic errors found while interpreting a well-formed XML tree as RML.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RmlError {
    line: u32,
    column: u32,
    message: String,
}

impl RmlError {
    fn at(node: Node<'_, '_>, message: impl Into<String>) -> Self {
        let position = node.document().text_pos_at(node.range().start);
        Self {
            line: position.row,
            column: position.col,
            message: message.into(),
        }
    }

    /// 1-based line of the offending element.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 1-based column of the offending element.
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Human-readable description of the problem.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}, column {})",
            self.message, self.line, self.column
        )
    }
}

impl std::error::Error for RmlError {}

/// Parses RML source text into an [`RmlDocument`].
pub fn parse_document(source: &str) -> Result<RmlDocument, ConvertError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let xml = roxmltree::Document::parse_with_options(source, options)?;
    let mut parser = Parser::default();
    Ok(parser.document(xml.root_element())?)
}

/// Named paragraph style declared with `<paraStyle>`.
#[derive(Clone, Debug, Default, PartialEq)]
struct ParaStyle {
    font_size: Option<u8>,
    alignment: Option<HorizontalAlignment>,
    inline: StyleState,
}

#[derive(Default)]
struct Parser {
    styles: HashMap<String, ParaStyle>,
}

impl Parser {
    fn document(&mut self, root: Node<'_, '_>) -> Result<RmlDocument, RmlError> {
        if root.tag_name().name() != "document" {
            return Err(RmlError::at(
                root,
                format!(
                    "expected <document> root element, found <{}>",
                    root.tag_name().name()
                ),
            ));
        }

        let mut page = PageSetup::default();
        let mut story = None;

        for child in elements(root) {
            match child.tag_name().name() {
                "template" => page = page_setup(child)?,
                "stylesheet" => self.stylesheet(child)?,
                "story" => story = Some(self.story(child)?),
                other => return Err(unsupported(child, other, "document")),
            }
        }

        let blocks = story.ok_or_else(|| RmlError::at(root, "missing <story> element"))?;
        let title = root.attribute("title").map(str::to_owned);

        Ok(RmlDocument::new(blocks).with_title(title).with_page(page))
    }

    fn stylesheet(&mut self, node: Node<'_, '_>) -> Result<(), RmlError> {
        for child in elements(node) {
            if child.tag_name().name() != "paraStyle" {
                log::debug!(
                    "ignoring stylesheet element <{}>",
                    child.tag_name().name()
                );
                continue;
            }

            let name = required(child, "name")?;
            let mut style = match child.attribute("parent") {
                Some(parent) => self.style(child, parent)?.clone(),
                None => ParaStyle::default(),
            };

            if let Some(size) = child.attribute("fontSize") {
                style.font_size = Some(font_size(child, size)?);
            }
            if let Some(alignment) = child.attribute("alignment") {
                style.alignment = Some(parse_alignment(child, alignment)?);
            }
            if let Some(color) = child.attribute("textColor") {
                style.inline.color = Some(parse_color(child, color)?);
            }
            if let Some(font) = child.attribute("fontName") {
                style.inline.bold = font.contains("Bold");
                style.inline.italic = font.contains("Italic") || font.contains("Oblique");
            }

            self.styles.insert(name.to_owned(), style);
        }
        Ok(())
    }

    fn style(&self, node: Node<'_, '_>, name: &str) -> Result<&ParaStyle, RmlError> {
        self.styles
            .get(name)
            .ok_or_else(|| RmlError::at(node, format!("unknown paragraph style `{name}`")))
    }

    fn story(&self, node: Node<'_, '_>) -> Result<Vec<Block>, RmlError> {
        let mut blocks = Vec::new();
        for child in node.children() {
            if child.is_text() {
                if child.text().is_some_and(|text| !text.trim().is_empty()) {
                    return Err(RmlError::at(child, "text outside of a flowable in <story>"));
                }
                continue;
            }
            if !child.is_element() {
                continue;
            }

            let block = match child.tag_name().name() {
                "title" => self.heading(child, HeadingLevel::Title)?,
                "h1" => self.heading(child, HeadingLevel::H1)?,
                "h2" => self.heading(child, HeadingLevel::H2)?,
                "h3" => self.heading(child, HeadingLevel::H3)?,
                "para" => Block::Paragraph(self.paragraph(child, ParaStyle::default())?),
                "spacer" => Block::Spacer {
                    height_mm: length_attribute(child, "length")?,
                },
                "nextPage" => Block::PageBreak,
                "blockTable" => Block::Table(self.table(child)?),
                "ul" => Block::List(self.list(child, false)?),
                "ol" => Block::List(self.list(child, true)?),
                "image" => Block::Image(self.image(child)?),
                other => return Err(unsupported(child, other, "story")),
            };
            blocks.push(block);
        }
        Ok(blocks)
    }

    fn heading(&self, node: Node<'_, '_>, level: HeadingLevel) -> Result<Block, RmlError> {
        let base = ParaStyle {
            font_size: Some(level.font_size()),
            alignment: Some(level.alignment()),
            inline: StyleState {
                bold: true,
                ..StyleState::default()
            },
        };
        Ok(Block::Heading {
            level,
            paragraph: self.paragraph(node, base)?,
        })
    }

    /// Parses a text flowable, applying `base` unless a `style` attribute names another style.
    fn paragraph(&self, node: Node<'_, '_>, base: ParaStyle) -> Result<RichParagraph, RmlError> {
        let style = match node.attribute("style") {
            Some(name) => self.style(node, name)?.clone(),
            None => base,
        };

        let mut pieces = Vec::new();
        inline_content(node, style.inline, &mut pieces)?;

        let mut alignment = style.alignment.unwrap_or_default();
        if let Some(value) = node.attribute("alignment") {
            alignment = parse_alignment(node, value)?;
        }

        Ok(RichParagraph::new(collapse_whitespace(pieces))
            .with_alignment(alignment)
            .with_font_size(style.font_size))
    }

    /// Table cells and list items may hold inline markup directly or wrap it in one `<para>`.
    fn cell(&self, node: Node<'_, '_>) -> Result<RichParagraph, RmlError> {
        let mut children = elements(node);
        if let (Some(only), None) = (children.next(), children.next()) {
            let has_loose_text = node
                .children()
                .filter(Node::is_text)
                .any(|text| text.text().is_some_and(|t| !t.trim().is_empty()));
            if only.tag_name().name() == "para" && !has_loose_text {
                return self.paragraph(only, ParaStyle::default());
            }
        }
        self.paragraph(node, ParaStyle::default())
    }

    fn table(&self, node: Node<'_, '_>) -> Result<Table, RmlError> {
        let mut rows: Vec<Vec<RichParagraph>> = Vec::new();
        for row in elements(node) {
            match row.tag_name().name() {
                "tr" => {}
                "blockTableStyle" | "blockColumnWidths" => {
                    log::debug!("ignoring table element <{}>", row.tag_name().name());
                    continue;
                }
                other => return Err(unsupported(row, other, "blockTable")),
            }

            let mut cells = Vec::new();
            for cell in elements(row) {
                if cell.tag_name().name() != "td" {
                    return Err(unsupported(cell, cell.tag_name().name(), "tr"));
                }
                cells.push(self.cell(cell)?);
            }

            if cells.is_empty() {
                return Err(RmlError::at(row, "table row without cells"));
            }
            if let Some(first) = rows.first() {
                if first.len() != cells.len() {
                    return Err(RmlError::at(
                        row,
                        format!(
                            "table row has {} cells, expected {}",
                            cells.len(),
                            first.len()
                        ),
                    ));
                }
            }
            rows.push(cells);
        }

        if rows.is_empty() {
            return Err(RmlError::at(node, "<blockTable> without rows"));
        }
        Ok(Table::new(rows))
    }

    fn list(&self, node: Node<'_, '_>, ordered: bool) -> Result<List, RmlError> {
        let mut items = Vec::new();
        for item in elements(node) {
            if item.tag_name().name() != "li" {
                return Err(unsupported(item, item.tag_name().name(), "list"));
            }
            items.push(self.cell(item)?);
        }
        Ok(List::new(ordered, items))
    }

    fn image(&self, node: Node<'_, '_>) -> Result<ImageBlock, RmlError> {
        let mut image = ImageBlock::new(required(node, "file")?);

        if node.attribute("width").is_some() {
            image = image.with_width_mm(length_attribute(node, "width")?);
        }
        if let Some(align) = node.attribute("align") {
            image = image.with_alignment(parse_alignment(node, align)?);
        }
        if let Some(caption) = node.attribute("caption") {
            let spans = collapse_whitespace(vec![(caption.to_owned(), StyleState::default())]);
            let alignment = image.alignment();
            image = image.with_caption(RichParagraph::new(spans).with_alignment(alignment));
        }
        Ok(image)
    }
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

fn unsupported(node: Node<'_, '_>, name: &str, parent: &str) -> RmlError {
    RmlError::at(node, format!("unsupported element <{name}> in <{parent}>"))
}

fn required<'a>(node: Node<'a, '_>, attribute: &str) -> Result<&'a str, RmlError> {
    node.attribute(attribute).ok_or_else(|| {
        RmlError::at(
            node,
            format!(
                "<{}> requires the `{attribute}` attribute",
                node.tag_name().name()
            ),
        )
    })
}

fn inline_content(
    node: Node<'_, '_>,
    state: StyleState,
    pieces: &mut Vec<(String, StyleState)>,
) -> Result<(), RmlError> {
    for child in node.children() {
        if let Some(text) = child.text().filter(|_| child.is_text()) {
            pieces.push((text.to_owned(), state));
            continue;
        }
        if !child.is_element() {
            continue;
        }

        let mut nested = state;
        match child.tag_name().name() {
            "b" | "strong" => nested.bold = true,
            "i" | "em" => nested.italic = true,
            "u" => nested.underline = true,
            "font" => {
                if let Some(color) = child.attribute("color") {
                    nested.color = Some(parse_color(child, color)?);
                }
            }
            other => return Err(unsupported(child, other, node.tag_name().name())),
        }
        inline_content(child, nested, pieces)?;
    }
    Ok(())
}

fn page_setup(node: Node<'_, '_>) -> Result<PageSetup, RmlError> {
    let mut page = PageSetup::default();

    if let Some(size) = node.attribute("pageSize") {
        let (width, height) = parse_page_size(size)
            .ok_or_else(|| RmlError::at(node, format!("invalid pageSize `{size}`")))?;
        page.width_mm = width;
        page.height_mm = height;
    }

    let margins = [
        ("topMargin", &mut page.top_mm),
        ("rightMargin", &mut page.right_mm),
        ("bottomMargin", &mut page.bottom_mm),
        ("leftMargin", &mut page.left_mm),
    ];
    for (attribute, slot) in margins {
        if node.attribute(attribute).is_some() {
            *slot = length_attribute(node, attribute)?;
        }
    }

    if page.left_mm + page.right_mm >= page.width_mm
        || page.top_mm + page.bottom_mm >= page.height_mm
    {
        return Err(RmlError::at(node, "margins leave no room for content"));
    }

    for child in elements(node) {
        log::debug!("ignoring template element <{}>", child.tag_name().name());
    }

    Ok(page)
}

fn length_attribute(node: Node<'_, '_>, attribute: &str) -> Result<f64, RmlError> {
    let value = required(node, attribute)?;
    parse_length(value)
        .filter(|mm| *mm >= 0.0)
        .ok_or_else(|| RmlError::at(node, format!("invalid length `{value}` for `{attribute}`")))
}

/// Parses an RML length into millimetres.  Bare numbers are points.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let (number, factor) = if let Some(number) = value.strip_suffix("mm") {
        (number, 1.0)
    } else if let Some(number) = value.strip_suffix("cm") {
        (number, 10.0)
    } else if let Some(number) = value.strip_suffix("in") {
        (number, 25.4)
    } else if let Some(number) = value.strip_suffix("pt") {
        (number, MM_PER_POINT)
    } else {
        (value, MM_PER_POINT)
    };
    let number: f64 = number.trim().parse().ok()?;
    number.is_finite().then_some(number * factor)
}

/// Parses a named page size (`A4`, `letter`, ...) or a `(width, height)` pair into millimetres.
pub fn parse_page_size(value: &str) -> Option<(f64, f64)> {
    let value = value.trim();
    let named = match value.to_ascii_lowercase().as_str() {
        "a3" => Some((297.0, 420.0)),
        "a4" => Some((210.0, 297.0)),
        "a5" => Some((148.0, 210.0)),
        "letter" => Some((215.9, 279.4)),
        "legal" => Some((215.9, 355.6)),
        _ => None,
    };
    if named.is_some() {
        return named;
    }

    let inner = value.strip_prefix('(')?.strip_suffix(')')?;
    let (width, height) = inner.split_once(',')?;
    let width = parse_length(width)?;
    let height = parse_length(height)?;
    (width > 0.0 && height > 0.0).then_some((width, height))
}

fn font_size(node: Node<'_, '_>, value: &str) -> Result<u8, RmlError> {
    value
        .trim()
        .trim_end_matches("pt")
        .parse::<f64>()
        .ok()
        .filter(|size| (1.0..=255.0).contains(size))
        .map(|size| size.round() as u8)
        .ok_or_else(|| RmlError::at(node, format!("invalid fontSize `{value}`")))
}

fn parse_alignment(node: Node<'_, '_>, value: &str) -> Result<HorizontalAlignment, RmlError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "left" => Ok(HorizontalAlignment::Left),
        "center" | "centre" => Ok(HorizontalAlignment::Center),
        "right" => Ok(HorizontalAlignment::Right),
        "justify" | "justified" => Ok(HorizontalAlignment::Justified),
        _ => Err(RmlError::at(node, format!("invalid alignment `{value}`"))),
    }
}

fn parse_color(node: Node<'_, '_>, value: &str) -> Result<Color, RmlError> {
    color_from_str(value).ok_or_else(|| {
        RmlError::at(
            node,
            format!("invalid color `{value}`; expected #RRGGBB or a basic color name"),
        )
    })
}

/// Parses `#RRGGBB` or one of a handful of basic color names.
pub fn color_from_str(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        return Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?));
    }

    let rgb = match value.to_ascii_lowercase().as_str() {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "darkblue" => (0, 0, 139),
        "orange" => (255, 165, 0),
        _ => return None,
    };
    Some(Color::Rgb(rgb.0, rgb.1, rgb.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> RmlDocument {
        parse_document(source).expect("parse succeeds")
    }

    fn rml_error(source: &str) -> RmlError {
        match parse_document(source) {
            Err(ConvertError::Rml(err)) => err,
            other => panic!("expected RML error, got {other:?}"),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn parses_minimal_document() {
        let doc = parse(r#"<document title="Q3"><story><para>Hello</para></story></document>"#);
        assert_eq!(doc.title(), Some("Q3"));
        assert_eq!(doc.page(), &PageSetup::default());
        assert_eq!(doc.blocks().len(), 1);
        match &doc.blocks()[0] {
            Block::Paragraph(p) => assert_eq!(p.plain_text(), "Hello"),
            other => panic!("unexpected block {other:?}"),
        }
    }

    #[test]
    fn accepts_doctype_declarations() {
        let doc = parse(
            "<?xml version=\"1.0\"?>\n<!DOCTYPE document SYSTEM \"rml.dtd\">\n\
             <document><story><nextPage/></story></document>",
        );
        assert_eq!(doc.blocks(), &[Block::PageBreak]);
    }

    #[test]
    fn inline_markup_becomes_spans() {
        let doc = parse(
            r##"<document><story>
                <para>Total: <b>42 <i>units</i></b> <u>due</u> <font color="#ff0000">now</font></para>
            </story></document>"##,
        );
        let Block::Paragraph(paragraph) = &doc.blocks()[0] else {
            panic!("expected paragraph");
        };
        let spans = paragraph.spans();
        let texts: Vec<_> = spans.iter().map(|s| s.text()).collect();
        assert_eq!(texts, vec!["Total:", " 42", " units", " due", " now"]);
        assert!(spans[1].is_bold() && !spans[1].is_italic());
        assert!(spans[2].is_bold() && spans[2].is_italic());
        assert!(spans[3].is_underlined() && !spans[3].is_bold());
        assert_eq!(spans[4].color(), Some(Color::Rgb(255, 0, 0)));
    }

    #[test]
    fn headings_carry_level_defaults() {
        let doc = parse("<document><story><title>Report</title><h2>Costs</h2></story></document>");
        match &doc.blocks()[0] {
            Block::Heading { level, paragraph } => {
                assert_eq!(*level, HeadingLevel::Title);
                assert_eq!(paragraph.font_size(), Some(20));
                assert_eq!(paragraph.alignment(), HorizontalAlignment::Center);
                assert!(paragraph.spans()[0].is_bold());
            }
            other => panic!("unexpected block {other:?}"),
        }
        match &doc.blocks()[1] {
            Block::Heading { level, paragraph } => {
                assert_eq!(*level, HeadingLevel::H2);
                assert_eq!(paragraph.font_size(), Some(14));
            }
            other => panic!("unexpected block {other:?}"),
        }
    }

    #[test]
    fn template_sets_page_geometry() {
        let doc = parse(
            r#"<document>
                <template pageSize="(21cm, 29.7cm)" leftMargin="2cm" rightMargin="20mm" topMargin="72" bottomMargin="1in">
                    <pageTemplate id="main"><frame id="body" x1="0" y1="0" width="10" height="10"/></pageTemplate>
                </template>
                <story><para>x</para></story>
            </document>"#,
        );
        let page = doc.page();
        assert!(close(page.width_mm, 210.0));
        assert!(close(page.height_mm, 297.0));
        assert!(close(page.left_mm, 20.0));
        assert!(close(page.right_mm, 20.0));
        assert!(close(page.top_mm, 25.4));
        assert!(close(page.bottom_mm, 25.4));
    }

    #[test]
    fn stylesheet_styles_apply_to_paragraphs() {
        let doc = parse(
            r#"<document>
                <stylesheet>
                    <initialize/>
                    <paraStyle name="base" fontSize="9" textColor="gray"/>
                    <paraStyle name="note" parent="base" fontName="Helvetica-BoldOblique" alignment="right"/>
                </stylesheet>
                <story><para style="note">Small print</para></story>
            </document>"#,
        );
        let Block::Paragraph(paragraph) = &doc.blocks()[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(paragraph.font_size(), Some(9));
        assert_eq!(paragraph.alignment(), HorizontalAlignment::Right);
        let span = &paragraph.spans()[0];
        assert!(span.is_bold() && span.is_italic());
        assert_eq!(span.color(), Some(Color::Rgb(128, 128, 128)));
    }

    #[test]
    fn tables_lists_spacers_and_images() {
        let doc = parse(
            r#"<document><story>
                <blockTable>
                    <blockTableStyle id="t"/>
                    <tr><td>Item</td><td><para><b>Price</b></para></td></tr>
                    <tr><td>Tea</td><td>3.50</td></tr>
                </blockTable>
                <spacer length="1cm"/>
                <ol><li>first</li><li><para>second</para></li></ol>
                <image file="chart.png" width="50mm" align="center" caption="Figure 1"/>
            </story></document>"#,
        );
        let blocks = doc.blocks();
        assert_eq!(blocks.len(), 4);

        let Block::Table(table) = &blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(table.columns(), 2);
        assert_eq!(table.rows().len(), 2);
        assert!(table.rows()[0][1].spans()[0].is_bold());

        assert!(matches!(blocks[1], Block::Spacer { height_mm } if close(height_mm, 10.0)));

        let Block::List(list) = &blocks[2] else {
            panic!("expected list");
        };
        assert!(list.is_ordered());
        assert_eq!(list.items()[1].plain_text(), "second");

        let Block::Image(image) = &blocks[3] else {
            panic!("expected image");
        };
        assert_eq!(image.path(), std::path::Path::new("chart.png"));
        assert_eq!(image.width_mm(), Some(50.0));
        assert_eq!(image.alignment(), HorizontalAlignment::Center);
        assert_eq!(image.caption().unwrap().plain_text(), "Figure 1");
    }

    #[test]
    fn ragged_tables_are_rejected() {
        let err = rml_error(
            "<document><story><blockTable>\n<tr><td>a</td><td>b</td></tr>\n<tr><td>c</td></tr>\n</blockTable></story></document>",
        );
        assert!(err.message().contains("expected 2"));
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn unknown_elements_report_position() {
        let err = rml_error("<document>\n  <story>\n    <blink/>\n  </story>\n</document>");
        assert_eq!(err.message(), "unsupported element <blink> in <story>");
        assert_eq!((err.line(), err.column()), (3, 5));
    }

    #[test]
    fn missing_story_is_an_error() {
        let err = rml_error("<document><template/></document>");
        assert!(err.message().contains("missing <story>"));
    }

    #[test]
    fn wrong_root_is_an_error() {
        let err = rml_error("<html><story/></html>");
        assert!(err.message().contains("expected <document>"));
    }

    #[test]
    fn unknown_style_is_an_error() {
        let err = rml_error(r#"<document><story><para style="nope">x</para></story></document>"#);
        assert!(err.message().contains("unknown paragraph style `nope`"));
    }

    #[test]
    fn loose_story_text_is_an_error() {
        let err = rml_error("<document><story>stray</story></document>");
        assert!(err.message().contains("text outside"));
    }

    #[test]
    fn malformed_xml_is_reported_as_xml_error() {
        let result = parse_document("<document><story></document>");
        assert!(matches!(result, Err(ConvertError::Xml(_))));
    }

    #[test]
    fn lengths_and_page_sizes() {
        assert!(close(parse_length("72").unwrap(), 25.4));
        assert!(close(parse_length("36pt").unwrap(), 12.7));
        assert!(close(parse_length(" 2.5cm ").unwrap(), 25.0));
        assert!(close(parse_length("1in").unwrap(), 25.4));
        assert_eq!(parse_length("wide"), None);

        assert_eq!(parse_page_size("letter"), Some((215.9, 279.4)));
        assert_eq!(parse_page_size("A5"), Some((148.0, 210.0)));
        let (w, h) = parse_page_size("(595, 842)").unwrap();
        assert!(close(w, 595.0 * MM_PER_POINT) && close(h, 842.0 * MM_PER_POINT));
        assert_eq!(parse_page_size("(0, 10)"), None);
        assert_eq!(parse_page_size("huge"), None);
    }

    #[test]
    fn colors() {
        assert_eq!(color_from_str("#0a0B0c"), Some(Color::Rgb(10, 11, 12)));
        assert_eq!(color_from_str("Grey"), Some(Color::Rgb(128, 128, 128)));
        assert_eq!(color_from_str("#12FG34"), None);
        assert_eq!(color_from_str("#123"), None);
    }
}
