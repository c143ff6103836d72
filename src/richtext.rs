//! Utilities for working with styled text fragments.
//!
//! The types in this module provide a light-weight representation of text "spans" that carry a
//! subset of the styling information supported by [`genpdf`][genpdf].  They sit between the RML
//! inline markup (`<b>`, `<i>`, `<u>`, `<font color>`) and the [`genpdf::elements`] primitives
//! used to render the final PDF document.
//!
//! [genpdf]: https://docs.rs/genpdf/

use genpdf::style::{Color, Style, StyledString};

/// A slice of text together with the inline style attributes it was read with.
///
/// The underline effect is not natively supported by `genpdf`'s [`StyledString`], so the
/// conversion helpers keep track of it separately and defer the actual rendering to
/// [`UnderlinedText`](crate::elements::UnderlinedText).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
    color: Option<Color>,
    underline: bool,
}

impl Span {
    /// Returns the raw text contained in this span.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the span should be rendered in bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Returns whether the span should be rendered in italic.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Returns the configured color for the span, if any.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Returns whether the span is marked as underlined.
    pub fn is_underlined(&self) -> bool {
        self.underline
    }

    fn to_style(&self) -> Style {
        let mut style = Style::new();
        if let Some(color) = self.color {
            style.set_color(color);
        }
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        style
    }

    /// Converts the span to a [`StyledString`] while ignoring the underline attribute.
    pub fn to_styled_string(&self) -> StyledString {
        StyledString::new(self.text.clone(), self.to_style())
    }
}

/// A styled span ready to be consumed by `genpdf` elements together with the underline flag.
#[derive(Clone, Debug)]
pub struct StyledSpan {
    /// The styled text fragment.
    pub string: StyledString,
    /// Whether the fragment should be rendered with an underline.
    pub underline: bool,
}

impl StyledSpan {
    /// Creates a new styled span.
    pub fn new(string: StyledString, underline: bool) -> Self {
        Self { string, underline }
    }
}

impl From<&Span> for StyledSpan {
    fn from(span: &Span) -> Self {
        StyledSpan::new(span.to_styled_string(), span.underline)
    }
}

/// Converts a sequence of [`Span`] values into styled strings while keeping underline flags.
pub fn spans_to_styled_strings<'a, I>(spans: I) -> Vec<StyledSpan>
where
    I: IntoIterator<Item = &'a Span>,
{
    spans.into_iter().map(StyledSpan::from).collect()
}

/// Inline style in effect while walking nested markup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct StyleState {
    pub(crate) bold: bool,
    pub(crate) italic: bool,
    pub(crate) color: Option<Color>,
    pub(crate) underline: bool,
}

impl StyleState {
    pub(crate) fn to_span(self, text: impl Into<String>) -> Span {
        Span {
            text: text.into(),
            bold: self.bold,
            italic: self.italic,
            color: self.color,
            underline: self.underline,
        }
    }
}

/// Collapses whitespace the way XML text flow expects.
///
/// Runs of whitespace become a single space, also across span boundaries, leading and trailing
/// whitespace of the whole run is dropped, and spans left empty are removed.
pub(crate) fn collapse_whitespace(pieces: Vec<(String, StyleState)>) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::with_capacity(pieces.len());
    let mut pending_space = false;
    let mut at_start = true;

    for (raw, state) in pieces {
        let mut text = String::with_capacity(raw.len());
        for ch in raw.chars() {
            if ch.is_whitespace() {
                pending_space = !at_start;
            } else {
                if pending_space {
                    text.push(' ');
                    pending_space = false;
                }
                text.push(ch);
                at_start = false;
            }
        }
        if !text.is_empty() {
            spans.push(state.to_span(text));
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_state_carries_into_styled_string() {
        let state = StyleState {
            bold: true,
            italic: true,
            color: Some(Color::Rgb(10, 20, 30)),
            underline: false,
        };
        let styled = state.to_span("Hello").to_styled_string();
        assert_eq!(styled.s, "Hello");
        assert!(styled.style.is_bold());
        assert!(styled.style.is_italic());
        assert_eq!(styled.style.color(), Some(Color::Rgb(10, 20, 30)));
    }

    #[test]
    fn underline_survives_conversion_to_styled_spans() {
        let underlined = StyleState {
            underline: true,
            ..StyleState::default()
        };
        let spans = [
            StyleState::default().to_span("Due "),
            underlined.to_span("today"),
        ];
        let styled = spans_to_styled_strings(&spans);

        assert_eq!(styled.len(), 2);
        assert!(!styled[0].underline);
        assert_eq!(styled[1].string.s, "today");
        assert!(styled[1].underline);
        assert!(!styled[1].string.style.is_bold());
    }

    #[test]
    fn whitespace_collapses_across_spans() {
        let plain = StyleState::default();
        let bold = StyleState {
            bold: true,
            ..StyleState::default()
        };
        let spans = collapse_whitespace(vec![
            ("\n   Total:  ".to_string(), plain),
            ("  42 ".to_string(), bold),
            ("\n".to_string(), plain),
        ]);

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text(), "Total:");
        assert!(!spans[0].is_bold());
        assert_eq!(spans[1].text(), " 42");
        assert!(spans[1].is_bold());
    }

    #[test]
    fn whitespace_only_input_yields_no_spans() {
        let spans = collapse_whitespace(vec![(" \t\n ".to_string(), StyleState::default())]);
        assert!(spans.is_empty());
    }
}
