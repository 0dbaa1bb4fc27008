//! The handoff between a combined document and an external renderer.
//!
//! The renderer is a collaborator outside of this crate (such as a headless
//! browser) that loads markup from a `file:///` URL and prints it into a
//! paginated artifact. Implementations of [`Renderer`] provide no
//! acknowledgment beyond their return value; a successful render means the
//! artifact was *attempted*, not verified.

use crate::document::CombinedDocument;
use crate::util::uri;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

const MARKUP_SUFFIX: &str = "_converted.html";

/// Alias for `Result<T, RenderError>`.
pub type RenderResult<T> = Result<T, RenderError>;

/// Possible errors from a [`Renderer`].
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// The renderer process could not be started.
    #[error("[Launch - `{program}`]: {source}")]
    Launch {
        /// The root cause of the error.
        source: io::Error,
        /// The program that failed to launch.
        program: String,
    },

    /// The renderer did not finish within the allotted wait and was stopped.
    #[error("[Timeout]: Renderer did not finish within {0:?}")]
    Timeout(Duration),

    /// The renderer finished unsuccessfully.
    #[error("[Failed - {status}]: {stderr}")]
    Failed {
        status: ExitStatus,
        /// Diagnostic output of the renderer, if any.
        stderr: String,
    },
}

/// Everything a [`Renderer`] needs to produce an artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderRequest {
    /// `file:///` URL of the markup to load.
    pub markup_url: String,
    /// Filesystem location of the markup to load.
    pub markup_path: PathBuf,
    /// Where the paginated artifact is expected to be written.
    pub output_path: PathBuf,
}

/// A component capable of loading a document and emitting a paginated output from it.
pub trait Renderer {
    /// Renders the markup of `request` into [`RenderRequest::output_path`].
    ///
    /// Implementations are expected to bound how long they wait on any
    /// external process.
    fn render(&self, request: &RenderRequest) -> RenderResult<()>;
}

/// A [`Renderer`] that produces nothing and always succeeds.
///
/// Useful to retrieve only the combined markup, by keeping the transient
/// markup file.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn render(&self, request: &RenderRequest) -> RenderResult<()> {
        log::debug!("Skipping render of {}", request.markup_url);
        Ok(())
    }
}

/// The combined document written to disk for the duration of a render.
///
/// The file is removed on drop unless it is explicitly [kept](Self::keep).
#[derive(Debug)]
pub struct TransientMarkup {
    path: PathBuf,
    keep: bool,
}

impl TransientMarkup {
    /// Writes `document` to `<name>_converted.html` within `dir`.
    ///
    /// `dir` must already exist.
    pub fn create(dir: &Path, name: &str, document: &CombinedDocument) -> io::Result<Self> {
        let path = dir.join(format!("{name}{MARKUP_SUFFIX}"));

        document.write_to(&path)?;
        log::info!("Temporary HTML saved as: {}", path.display());
        Ok(Self { path, keep: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `file:///` URL of the markup file.
    ///
    /// The location is made absolute first, if it is not already.
    pub fn url(&self) -> String {
        let absolute = std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone());
        uri::to_file_url(&absolute)
    }

    /// Retains the file on drop when `keep` is `true`.
    pub fn keep(&mut self, keep: bool) {
        self.keep = keep;
    }
}

impl Drop for TransientMarkup {
    fn drop(&mut self) {
        if self.keep {
            log::info!("Kept HTML: {}", self.path.display());
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => log::info!("Cleaned up temporary file: {}", self.path.display()),
            Err(error) => log::warn!("Unable to remove `{}`: {error}", self.path.display()),
        }
    }
}
