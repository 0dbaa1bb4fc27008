//! Normalization of individual content documents (fragments).
//!
//! A fragment is reduced to the inner markup of its `<body>` and its image and
//! stylesheet references are rewritten into `file:///` URLs pointing into the
//! extracted archive, so that a combined document can be rendered from any location.

mod rewrite;

pub use self::rewrite::{ResourceContext, Rewritten, rewrite_references};

use crate::util::{text, uri};
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static XML_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\?xml[^>]*\?>").expect("xml declaration pattern is valid")
});
static DEFAULT_NAMESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\sxmlns="[^"]*""#).expect("default namespace pattern is valid")
});
static BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<body[^>]*>(.*?)</body>").expect("body pattern is valid")
});

/// Alias for `Result<T, FragmentError>`.
pub type FragmentResult<T> = Result<T, FragmentError>;

/// Possible errors while normalizing a single fragment.
///
/// These are recoverable; the fragment is skipped and conversion continues.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum FragmentError {
    /// The content document does not exist within the extracted archive,
    /// neither relative to the package directory nor to the archive root.
    #[error("[Missing - `{href}`]: Content document not found")]
    Missing {
        /// The href as given by the reading order.
        href: String,
    },

    /// The content document exists, although is unable to be read.
    #[error("[CannotRead - `{path:?}`]: {source}")]
    CannotRead {
        /// The root cause of the error.
        source: io::Error,
        /// The file responsible for triggering the error.
        path: PathBuf,
    },
}

/// The cleaned markup of a single content document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedFragment {
    href: String,
    markup: String,
    unresolved: Vec<String>,
}

impl NormalizedFragment {
    /// The container-relative location the fragment was read from.
    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// References that could not be found on disk and were left unchanged.
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    pub fn into_markup(self) -> String {
        self.markup
    }
}

/// Finds the content document for `href` beneath `root`.
///
/// `href` is percent-decoded and joined onto `package_dir` first. If that file
/// does not exist, `href` is interpreted relative to `root` instead.
///
/// Returns the container-relative location and its filesystem path.
pub fn locate(root: &Path, package_dir: &str, href: &str) -> Option<(String, PathBuf)> {
    let (path, _) = uri::split_suffix(href);
    let decoded = uri::decode(path);

    [uri::join(package_dir, &decoded), uri::normalize(&decoded)]
        .into_iter()
        .filter(|location| !location.is_empty())
        .map(|location| {
            let path = root.join(&location);
            (location, path)
        })
        .find(|(_, path)| path.is_file())
}

/// Reads and normalizes the content document at `href`.
///
/// See [`locate`] for how `href` is resolved, and [`normalize_markup`]
/// for how the content is transformed.
///
/// # Errors
/// - [`FragmentError::Missing`]: No such file.
/// - [`FragmentError::CannotRead`]: The file could not be read.
pub fn normalize_fragment(
    root: &Path,
    package_dir: &str,
    href: &str,
) -> FragmentResult<NormalizedFragment> {
    let (location, path) = locate(root, package_dir, href).ok_or_else(|| FragmentError::Missing {
        href: href.to_owned(),
    })?;
    normalize_file(root, package_dir, location, path)
}

/// Reads and normalizes the extracted file at `location`, relative to `root`.
///
/// Unlike [`normalize_fragment`], `location` is a file name rather than an
/// href: it is neither percent-decoded nor split at `?` or `#`.
///
/// # Errors
/// See [`normalize_fragment`].
pub fn normalize_extracted(root: &Path, location: &str) -> FragmentResult<NormalizedFragment> {
    let path = root.join(location);

    if !path.is_file() {
        return Err(FragmentError::Missing {
            href: location.to_owned(),
        });
    }
    normalize_file(root, "", location.to_owned(), path)
}

fn normalize_file(
    root: &Path,
    package_dir: &str,
    location: String,
    path: PathBuf,
) -> FragmentResult<NormalizedFragment> {
    let bytes = fs::read(&path).map_err(|source| FragmentError::CannotRead { source, path })?;
    let content = text::decode_text(&bytes);

    let context = ResourceContext {
        root,
        package_dir,
        fragment_dir: uri::parent(&location),
    };
    let Rewritten { markup, unresolved } = normalize_markup(&content, &context);
    log::debug!("Processed: {location}");

    Ok(NormalizedFragment {
        href: location,
        markup,
        unresolved,
    })
}

/// Strips document wrappers, keeps only the `<body>` contents (if any)
/// and rewrites resource references.
pub fn normalize_markup(content: &str, context: &ResourceContext) -> Rewritten {
    let stripped = strip_wrappers(content);
    rewrite_references(extract_body(&stripped), context)
}

/// Textually removes the XML declaration and every default namespace declaration.
pub fn strip_wrappers(content: &str) -> String {
    let content = XML_DECLARATION.replace_all(content, "");
    DEFAULT_NAMESPACE.replace_all(&content, "").into_owned()
}

/// Returns the inner markup of the first `<body>` element,
/// or all of `content` if there is none.
pub fn extract_body(content: &str) -> &str {
    BODY.captures(content)
        .and_then(|captures| captures.get(1))
        .map_or(content, |body| body.as_str())
}
