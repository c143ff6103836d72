//! The report renderer: template expansion followed by document conversion.
//!
//! [`ReportRenderer::render_to_pdf`] writes the expanded markup to a uniquely named temporary
//! file, syncs and releases it, waits for the configured settle delay and hands the file to a
//! [`DocumentConverter`].  The temporary file is owned by a [`tempfile`] guard, so it is removed
//! on every exit path, including template and conversion failures.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::thread;

use serde::Serialize;
use tempfile::{Builder, NamedTempFile};

use crate::config::RenderOptions;
use crate::convert::{Conversion, DocumentConverter, RmlConverter};
use crate::error::ReportError;
use crate::progress::RenderStep;
use crate::template::{Markup, ReportTemplate};

const INTERMEDIATE_PREFIX: &str = "rml-report-";
const INTERMEDIATE_SUFFIX: &str = ".rml";

/// Renders a [`ReportTemplate`] to PDF through a [`DocumentConverter`].
#[derive(Debug)]
pub struct ReportRenderer<C = RmlConverter> {
    template: ReportTemplate,
    converter: C,
    options: RenderOptions,
}

impl ReportRenderer<RmlConverter> {
    /// Creates a renderer using the default RML converter and options read from the environment.
    pub fn new(template: ReportTemplate) -> Self {
        Self::with_converter(template, RmlConverter::new())
    }
}

impl<C: DocumentConverter> ReportRenderer<C> {
    /// Creates a renderer that hands intermediate files to `converter`.
    pub fn with_converter(template: ReportTemplate, converter: C) -> Self {
        Self {
            template,
            converter,
            options: RenderOptions::from_env(),
        }
    }

    /// Replaces the render options and returns the updated renderer.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the wrapped template.
    pub fn template(&self) -> &ReportTemplate {
        &self.template
    }

    /// Returns the converter.
    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Returns the active options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Expands the template and returns how many fragments a render would write.
    pub fn fragment_count<S: Serialize>(&self, context: S) -> Result<usize, ReportError> {
        Ok(self.template.generate(context)?.fragments().count())
    }

    /// Expands the template against `context` and writes each fragment to `destination`.
    ///
    /// The destination is always flushed after the last fragment, so buffered write errors are
    /// reported as [`ReportError::WriteFailed`].  A destination passed by value is dropped when
    /// this returns whatever [`RenderOptions::close_destination`] says; pass `&mut writer` to
    /// keep it open.  With the flag set the destination is dropped right after the flush, before
    /// the fragment count is returned.  Returns the number of fragments written.
    pub fn write_markup<W, S>(&self, mut destination: W, context: S) -> Result<usize, ReportError>
    where
        W: Write,
        S: Serialize,
    {
        let markup = self.template.generate(context)?;
        let written = write_fragments(&markup, &mut destination, &mut |_: RenderStep| {})?;
        destination.flush().map_err(ReportError::WriteFailed)?;

        if self.options.close_destination() {
            drop(destination);
        }

        Ok(written)
    }

    /// Renders the template against `context` into a PDF at `output`.
    ///
    /// Blocks for the whole pipeline, including the settle delay.  Returns the converter's
    /// result.
    pub fn render_to_pdf<S: Serialize>(
        &self,
        output: impl AsRef<Path>,
        context: S,
    ) -> Result<Conversion, ReportError> {
        self.render_to_pdf_with_progress(output, context, |_| {})
    }

    /// Same as [`render_to_pdf`](Self::render_to_pdf), reporting a [`RenderStep`] to `on_step`
    /// after each step of the pipeline.
    pub fn render_to_pdf_with_progress<S, F>(
        &self,
        output: impl AsRef<Path>,
        context: S,
        mut on_step: F,
    ) -> Result<Conversion, ReportError>
    where
        S: Serialize,
        F: FnMut(RenderStep),
    {
        let output = output.as_ref();

        let mut intermediate = self.create_intermediate()?;
        log::debug!(
            "rendering {} via {}",
            self.template.name(),
            intermediate.path().display()
        );
        on_step(RenderStep::TempFileReady {
            path: intermediate.path().to_path_buf(),
        });

        let markup = self.template.generate(context)?;
        let fragments = {
            let mut writer = BufWriter::new(intermediate.as_file_mut());
            let fragments = write_fragments(&markup, &mut writer, &mut on_step)?;
            writer.flush().map_err(ReportError::WriteFailed)?;
            fragments
        };
        sync_intermediate(intermediate.as_file())?;
        // Releases the write handle; the path guard still deletes the file on drop.
        let intermediate = intermediate.into_temp_path();
        on_step(RenderStep::WriteComplete { fragments });

        let delay = self.options.settle_delay();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        on_step(RenderStep::PreConversionPause { delay });

        let conversion = match self.converter.convert(&intermediate, output) {
            Ok(conversion) => conversion,
            Err(err) => {
                let path = intermediate.to_path_buf();
                if let Err(cleanup) = intermediate.close() {
                    log::warn!("failed to remove {}: {cleanup}", path.display());
                }
                return Err(err.into());
            }
        };
        log::debug!(
            "converted {} to {} ({} pages)",
            self.template.name(),
            conversion.output.display(),
            conversion.pages
        );
        on_step(RenderStep::ConversionComplete {
            pages: conversion.pages,
            bytes: conversion.bytes,
        });

        intermediate.close().map_err(ReportError::TempFile)?;
        on_step(RenderStep::CleanupComplete);

        Ok(conversion)
    }

    fn create_intermediate(&self) -> Result<NamedTempFile, ReportError> {
        let mut builder = Builder::new();
        builder
            .prefix(INTERMEDIATE_PREFIX)
            .suffix(INTERMEDIATE_SUFFIX);
        let file = match self.options.temp_dir() {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        file.map_err(ReportError::TempFile)
    }
}

fn sync_intermediate(file: &File) -> Result<(), ReportError> {
    file.sync_all().map_err(ReportError::TempFile)
}

fn write_fragments<W, F>(
    markup: &Markup,
    destination: &mut W,
    on_step: &mut F,
) -> Result<usize, ReportError>
where
    W: Write + ?Sized,
    F: FnMut(RenderStep) + ?Sized,
{
    let mut written = 0;
    for (index, fragment) in markup.fragments().enumerate() {
        destination
            .write_all(fragment.as_bytes())
            .map_err(ReportError::WriteFailed)?;
        on_step(RenderStep::FragmentWritten {
            index,
            bytes: fragment.len(),
        });
        written += 1;
    }
    Ok(written)
}
