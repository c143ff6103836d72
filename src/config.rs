//! Renderer configuration.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the pause between writing and converting (milliseconds).
pub const SETTLE_DELAY_ENV: &str = "RML_REPORT_SETTLE_MS";

/// Environment variable overriding the directory used for intermediate files.
pub const TEMP_DIR_ENV: &str = "RML_REPORT_TMPDIR";

/// Pause inserted after the intermediate file is released and before the converter runs.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Options controlling how a [`ReportRenderer`](crate::renderer::ReportRenderer) drives a render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    settle_delay: Duration,
    temp_dir: Option<PathBuf>,
    close_destination: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            temp_dir: None,
            close_destination: false,
        }
    }
}

impl RenderOptions {
    /// Creates options with the default settle delay and the platform temporary directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates default options and applies overrides from `RML_REPORT_SETTLE_MS` and
    /// `RML_REPORT_TMPDIR`.
    ///
    /// Unparsable delay values are ignored with a warning so a typo never aborts a render.
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(raw) = env::var(SETTLE_DELAY_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(millis) => options.settle_delay = Duration::from_millis(millis),
                Err(err) => log::warn!("ignoring {SETTLE_DELAY_ENV}={raw:?}: {err}"),
            }
        }

        if let Some(dir) = env::var_os(TEMP_DIR_ENV).filter(|value| !value.is_empty()) {
            options.temp_dir = Some(PathBuf::from(dir));
        }

        options
    }

    /// Returns the pause applied before the converter is invoked.
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Returns the directory used for intermediate files, if one was configured.
    pub fn temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_deref()
    }

    /// Returns whether `write_markup` closes its destination after the last fragment.
    pub fn close_destination(&self) -> bool {
        self.close_destination
    }

    /// Sets the settle delay and returns the updated options.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets the intermediate file directory and returns the updated options.
    pub fn with_temp_dir(mut self, dir: impl Into<Option<PathBuf>>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Sets the close-destination flag and returns the updated options.
    pub fn with_close_destination(mut self, close: bool) -> Self {
        self.close_destination = close;
        self
    }
}
