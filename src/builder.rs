//! Document construction helpers for the RML converter.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use genpdf::error::Error;
use genpdf::style;
use genpdf::{self, Margins, PageDecorator, Size};

#[cfg(feature = "hyphenation")]
use genpdf::hyphenation;

use crate::elements::mm_from_f64;
use crate::fonts;
use crate::model::PageSetup;

/// Number of pages produced by a render, shared with the page decorator.
#[derive(Clone, Debug, Default)]
pub struct PageCounter(Rc<Cell<usize>>);

impl PageCounter {
    /// Returns the number of pages decorated so far.
    pub fn pages(&self) -> usize {
        self.0.get()
    }

    fn increment(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Builder for `genpdf::Document` instances configured from an RML page setup.
#[derive(Default)]
pub struct DocumentBuilder {
    page: PageSetup,
    title: Option<String>,
    font_size: Option<u8>,
    fonts_dir: Option<PathBuf>,
    font_family: Option<String>,
    #[cfg(feature = "hyphenation")]
    hyphenator: Option<hyphenation::Standard>,
}

impl DocumentBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page geometry.
    pub fn with_page(mut self, page: PageSetup) -> Self {
        self.page = page;
        self
    }

    /// Sets the PDF document title.
    pub fn with_title(mut self, title: impl Into<Option<String>>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the base font size in points.
    pub fn with_font_size(mut self, font_size: impl Into<Option<u8>>) -> Self {
        self.font_size = font_size.into();
        self
    }

    /// Loads fonts from `dir` instead of the resolved default directory.
    pub fn with_fonts_dir(mut self, dir: impl Into<Option<PathBuf>>) -> Self {
        self.fonts_dir = dir.into();
        self
    }

    /// Uses the font family `name` instead of the resolved default.
    pub fn with_font_family(mut self, name: impl Into<Option<String>>) -> Self {
        self.font_family = name.into();
        self
    }

    /// Enables hyphenation using the provided hyphenation dictionary.
    #[cfg(feature = "hyphenation")]
    pub fn with_hyphenator(mut self, hyphenator: hyphenation::Standard) -> Self {
        self.hyphenator = Some(hyphenator);
        self
    }

    /// Builds a configured `genpdf::Document` and the counter its decorator updates.
    pub fn build(self) -> Result<(genpdf::Document, PageCounter), Error> {
        let directory = fonts::resolve_font_directory(self.fonts_dir.as_deref());
        let family = fonts::resolve_font_family(self.font_family.as_deref());
        let font_family = fonts::load_font_family(&directory, &family)?;
        let mut document = genpdf::Document::new(font_family);

        let page = self.page;
        document.set_paper_size(Size::new(
            mm_from_f64(page.width_mm),
            mm_from_f64(page.height_mm),
        ));
        if let Some(title) = self.title {
            document.set_title(title);
        }
        if let Some(font_size) = self.font_size {
            document.set_font_size(font_size);
        }
        document.set_minimal_conformance();

        let counter = PageCounter::default();
        let margins = Margins::trbl(
            mm_from_f64(page.top_mm),
            mm_from_f64(page.right_mm),
            mm_from_f64(page.bottom_mm),
            mm_from_f64(page.left_mm),
        );
        document.set_page_decorator(CountingPageDecorator {
            margins,
            counter: counter.clone(),
        });

        #[cfg(feature = "hyphenation")]
        if let Some(hyphenator) = self.hyphenator {
            document.set_hyphenator(hyphenator);
        }

        Ok((document, counter))
    }
}

struct CountingPageDecorator {
    margins: Margins,
    counter: PageCounter,
}

impl PageDecorator for CountingPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        _context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        _style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.counter.increment();
        area.add_margins(self.margins);
        Ok(area)
    }
}
