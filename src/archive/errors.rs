use std::io;
use std::path::PathBuf;

/// Alias for `Result<T, ArchiveError>`.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Possible errors from an [`EpubArchive`](super::EpubArchive).
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum ArchiveError {
    /// The given archive path does not exist.
    #[error("[NotFound - `{path:?}`]: File not found")]
    NotFound {
        /// The path responsible for triggering the error.
        path: PathBuf,
    },

    /// The given archive path does not carry the `.epub` extension.
    #[error("[UnsupportedFormat - `{path:?}`]: Only `.epub` files are supported")]
    UnsupportedFormat {
        /// The path responsible for triggering the error.
        path: PathBuf,
    },

    /// The archive itself is unreadable due to being
    /// inaccessible or not a valid zip container.
    #[error("[UnreadableArchive - `{path:?}`]: {source}")]
    UnreadableArchive {
        /// The root cause of this error.
        source: io::Error,
        /// The path responsible for triggering the error, if applicable.
        path: Option<PathBuf>,
    },

    /// A named entry does not exist within the archive.
    #[error("[MissingEntry - `{entry}`]: {source}")]
    MissingEntry {
        /// The root cause of the error.
        source: io::Error,
        /// The entry name responsible for triggering the error.
        entry: String,
    },

    /// The entry exists, although is unable to be read, typically I/O.
    #[error("[CannotRead - `{entry}`]: {source}")]
    CannotRead {
        /// The root cause of the error.
        source: io::Error,
        /// The entry name responsible for triggering the error.
        entry: String,
    },

    /// Materializing the archive onto disk failed.
    #[error("[Extraction - `{path:?}`]: {source}")]
    Extraction {
        /// The root cause of the error.
        source: io::Error,
        /// The destination path responsible for triggering the error.
        path: PathBuf,
    },
}
