//! Step-wise progress reported by
//! [`ReportRenderer::render_to_pdf_with_progress`](crate::renderer::ReportRenderer::render_to_pdf_with_progress).

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A discrete step of the render pipeline.
///
/// Steps are always reported in this order: [`TempFileReady`](Self::TempFileReady), one
/// [`FragmentWritten`](Self::FragmentWritten) per markup fragment,
/// [`WriteComplete`](Self::WriteComplete), [`PreConversionPause`](Self::PreConversionPause),
/// [`ConversionComplete`](Self::ConversionComplete) and [`CleanupComplete`](Self::CleanupComplete).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderStep {
    /// The intermediate file was created and opened for writing.
    TempFileReady { path: PathBuf },
    /// A markup fragment was written to the intermediate file.
    FragmentWritten { index: usize, bytes: usize },
    /// All fragments were written, synced and the file handle released.
    WriteComplete { fragments: usize },
    /// The settle delay elapsed.
    PreConversionPause { delay: Duration },
    /// The converter produced the output file.
    ConversionComplete { pages: usize, bytes: u64 },
    /// The intermediate file was deleted.
    CleanupComplete,
}

impl RenderStep {
    /// Number of steps reported for a render that writes `fragments` fragments.
    pub fn expected_count(fragments: usize) -> usize {
        fragments + 5
    }
}

impl fmt::Display for RenderStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TempFileReady { path } => write!(f, "intermediate file {}", path.display()),
            Self::FragmentWritten { index, bytes } => {
                write!(f, "fragment {} written ({} bytes)", index + 1, bytes)
            }
            Self::WriteComplete { fragments } => write!(f, "markup written ({fragments} fragments)"),
            Self::PreConversionPause { delay } => write!(f, "settled for {delay:?}"),
            Self::ConversionComplete { pages, bytes } => {
                write!(f, "converted to PDF ({pages} pages, {bytes} bytes)")
            }
            Self::CleanupComplete => write!(f, "intermediate file removed"),
        }
    }
}
