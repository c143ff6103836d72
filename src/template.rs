//! Template loading and markup expansion backed by `minijinja`.
//!
//! A [`ReportTemplate`] is compiled once when it is constructed and can then be expanded any
//! number of times against different contexts.  Expansion yields a [`Markup`] value whose
//! [`fragments`](Markup::fragments) are the pieces written to the intermediate RML file.
//!
//! The generated markup is always RML, so every substituted value is XML-escaped and referring
//! to an undefined placeholder is an error rather than an empty string.  Only the XML
//! metacharacters `&`, `<`, `>` and `"` are escaped; slashes and apostrophes pass through, so a
//! substituted date or path appears in the markup exactly as given.

use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::fs;
use std::io::Read;
use std::path::Path;

use minijinja::{escape_formatter, AutoEscape, Environment, Output, State, UndefinedBehavior, Value};
use serde::Serialize;

use crate::error::ReportError;

const XML_ESCAPE: AutoEscape = AutoEscape::Custom("xml");

/// Escapes the XML metacharacters in `text`.
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains(&['&', '<', '>', '"'][..]) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

fn xml_formatter(
    out: &mut Output<'_>,
    state: &State<'_, '_>,
    value: &Value,
) -> Result<(), minijinja::Error> {
    if value.is_safe() || state.auto_escape() != XML_ESCAPE {
        return escape_formatter(out, state, value);
    }

    let escaped = match value.as_str() {
        Some(text) => escape_xml(text).into_owned(),
        None => escape_xml(&value.to_string()).into_owned(),
    };
    out.write_str(&escaped).map_err(minijinja::Error::from)
}

/// A compiled report template.
pub struct ReportTemplate {
    env: Environment<'static>,
    name: String,
}

impl fmt::Debug for ReportTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportTemplate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ReportTemplate {
    /// Compiles `source` under the given template name.
    pub fn from_source(
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, ReportError> {
        let name = name.into();
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| XML_ESCAPE);
        env.set_formatter(xml_formatter);
        env.add_template_owned(name.clone(), source.into())?;
        Ok(Self { env, name })
    }

    /// Reads and compiles the template stored at `path`, naming it after the file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ReportError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_source(name, source)
    }

    /// Reads the whole stream and compiles it under the given template name.
    pub fn from_reader(name: impl Into<String>, mut reader: impl Read) -> Result<Self, ReportError> {
        let name = name.into();
        let mut source = String::new();
        reader
            .read_to_string(&mut source)
            .map_err(|source| ReportError::TemplateRead {
                path: name.clone().into(),
                source,
            })?;
        Self::from_source(name, source)
    }

    /// Returns the template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expands the template against `context`.
    pub fn generate<S: Serialize>(&self, context: S) -> Result<Markup, ReportError> {
        let template = self.env.get_template(&self.name)?;
        let text = template.render(context)?;
        Ok(Markup { text })
    }
}

/// Fully expanded markup produced by [`ReportTemplate::generate`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Markup {
    text: String,
}

impl Markup {
    /// Returns the markup as a single string.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the length of the markup in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns whether the expansion produced no output at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the lazy sequence of fragments, one per line including its terminator.
    pub fn fragments(&self) -> Fragments<'_> {
        Fragments {
            inner: self.text.split_inclusive('\n'),
        }
    }

    /// Consumes the markup and returns the owned string.
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Iterator over the fragments of a [`Markup`].
#[derive(Clone, Debug)]
pub struct Fragments<'a> {
    inner: std::str::SplitInclusive<'a, char>,
}

impl<'a> Iterator for Fragments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
