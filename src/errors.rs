//! Error-related types for a conversion.

pub use crate::archive::errors::{ArchiveError, ArchiveResult};
pub use crate::epub::errors::{EpubError, EpubResult};
pub use crate::fragment::{FragmentError, FragmentResult};
pub use crate::render::{RenderError, RenderResult};
use std::io;
use std::path::PathBuf;

/// Alias for `Result<T, ConvertError>`.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Unified error type.
/// Possible fatal errors for a [`Converter`](crate::Converter).
///
/// Per-fragment failures ([`FragmentError`]) and renderer failures
/// ([`RenderError`]) are recovered from and never surface here.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    /// The input is missing, not an `.epub` file, or its contents are unreadable.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The EPUB structure is unusable or contains no content.
    #[error(transparent)]
    Epub(#[from] EpubError),

    /// Writing conversion output failed.
    #[error("[Io - `{path:?}`]: {source}")]
    Io {
        /// The root cause of the error.
        source: io::Error,
        /// The path responsible for triggering the error.
        path: PathBuf,
    },
}
