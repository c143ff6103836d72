//! Templated PDF reports.
//!
//! A [`ReportTemplate`] expands a minijinja template into RML (Report Markup Language), the
//! [`ReportRenderer`] writes the markup to a temporary file and hands it to a
//! [`DocumentConverter`], by default the genpdf-backed [`RmlConverter`].
//!
//! ```no_run
//! use rml_report::{context, ReportRenderer, ReportTemplate};
//!
//! # fn main() -> Result<(), rml_report::ReportError> {
//! let template = ReportTemplate::from_path("invoice.rml")?;
//! let renderer = ReportRenderer::new(template);
//! let conversion = renderer.render_to_pdf("invoice.pdf", context! { customer => "ACME" })?;
//! println!("{} pages", conversion.pages);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod convert;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod model;
pub mod progress;
pub mod renderer;
pub mod richtext;
pub mod rml;
pub mod template;

pub use config::RenderOptions;
pub use convert::{Conversion, DocumentConverter, RmlConverter};
pub use error::{ConvertError, ReportError};
pub use minijinja::{context, Value};
pub use progress::RenderStep;
pub use renderer::ReportRenderer;
pub use template::{Markup, ReportTemplate};
