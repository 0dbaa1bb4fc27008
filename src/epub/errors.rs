//! Error-related types for the EPUB structure parsers.

use std::error::Error;

/// Alias for `Result<T, EpubError>`.
pub type EpubResult<T> = Result<T, EpubError>;

/// Possible structural errors within an EPUB.
///
/// # Variants
/// ## Container Errors (`container.xml`)
/// - [`ManifestNotFound`](EpubError::ManifestNotFound)
/// ## Package Errors (`.opf`)
/// - [`Unparsable`](EpubError::Unparsable)
/// ## Content Errors
/// - [`EmptyDocument`](EpubError::EmptyDocument)
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum EpubError {
    /// The container does not reference a package `.opf` file,
    /// even after scanning its raw text for a `full-path`.
    ///
    /// Error Source: `META-INF/container.xml`
    #[error("Could not locate the package `.opf` file in `META-INF/container.xml`")]
    ManifestNotFound,

    /// The XML content is malformed and could not be parsed,
    /// even after stripping its default namespace declaration.
    ///
    /// Error Source: `.opf` file
    #[error("Unparsable XML: {0}")]
    Unparsable(#[from] Box<dyn Error + Send + Sync + 'static>),

    /// The spine, the manifest and the extracted file tree
    /// yielded no readable content documents.
    #[error("No content could be extracted (spine, manifest and file tree are empty)")]
    EmptyDocument,
}
