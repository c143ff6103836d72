//! Error types shared by the renderer and the document converter.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::rml::RmlError;

/// Errors surfaced by [`ReportRenderer`](crate::renderer::ReportRenderer) and
/// [`ReportTemplate`](crate::template::ReportTemplate).
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to read template {}: {source}", path.display())]
    TemplateRead { path: PathBuf, source: io::Error },

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Writing a markup fragment to the destination failed.
    #[error("error in file writing")]
    WriteFailed(#[source] io::Error),

    #[error("temporary file error: {0}")]
    TempFile(#[source] io::Error),

    #[error("document conversion failed: {0}")]
    Conversion(#[from] ConvertError),
}

/// Errors produced by a [`DocumentConverter`](crate::convert::DocumentConverter).
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("invalid RML: {0}")]
    Rml(#[from] RmlError),

    #[error("font setup failed: {0}")]
    Fonts(#[source] genpdf::error::Error),

    #[error("PDF layout failed: {0}")]
    Layout(#[from] genpdf::error::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
