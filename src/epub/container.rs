//! Resolution of the package `.opf` location from `META-INF/container.xml`.

use crate::epub::consts;
use crate::epub::errors::{EpubError, EpubResult};
use crate::parser::ParserResult;
use crate::parser::xml::{self, XmlElement, XmlReader};
use crate::util::text;
use crate::util::uri;
use regex::Regex;
use std::sync::LazyLock;

static FULL_PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)full-path="([^"]+\.opf)""#).expect("full-path pattern is valid")
});

struct RootFile {
    full_path: String,
    media_type: Option<String>,
}

/// Resolves the container-relative location of the package `.opf` file.
///
/// The container is parsed structurally first. Only if that fails outright
/// is its raw text scanned for a quoted `full-path` ending in `.opf`.
///
/// # Errors
/// [`EpubError::ManifestNotFound`] when neither approach yields a path.
///
/// # Examples
/// ```
/// # use flatbook::epub::resolve_package_path;
/// let container = br#"<?xml version="1.0"?>
/// <container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
///   <rootfiles>
///     <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
///   </rootfiles>
/// </container>"#;
///
/// assert_eq!("OEBPS/content.opf", resolve_package_path(container).unwrap());
/// ```
pub fn resolve_package_path(data: &[u8]) -> EpubResult<String> {
    let content = text::decode_text(data);

    let package_file = match structured(&content) {
        Ok(package_file) => package_file,
        Err(error) => {
            log::warn!("Malformed `{}` ({error}); scanning for a `full-path`", consts::CONTAINER);
            recover_full_path(&content)
        }
    };

    package_file
        .map(|package_file| uri::normalize(&package_file))
        .filter(|package_file| !package_file.is_empty())
        .ok_or(EpubError::ManifestNotFound)
}

/// Parses every `rootfile` regardless of its namespace.
///
/// Although rare, multiple package files could be declared.
/// The first declared as `application/oebps-package+xml` is preferred,
/// otherwise the first declared at all.
pub(crate) fn structured(content: &str) -> ParserResult<Option<String>> {
    let mut reader = xml::reader(content);
    let mut root_files = Vec::new();

    while let Some(el) = reader.next_element() {
        let el = el?;
        if !el.is_local_name(consts::ROOT_FILE) {
            continue;
        }
        // A rootfile without a location is unusable
        if let Some(full_path) = el.get_attribute(consts::FULL_PATH) {
            root_files.push(RootFile {
                full_path,
                media_type: el.get_attribute(consts::MEDIA_TYPE),
            });
        }
    }

    let preferred = root_files.iter().position(|root_file| {
        root_file
            .media_type
            .as_deref()
            .is_some_and(|media_type| media_type.ends_with(consts::OEBPS_PACKAGE_SUFFIX))
    });

    Ok(match preferred {
        Some(index) => Some(root_files.swap_remove(index).full_path),
        None => root_files.into_iter().next().map(|root_file| root_file.full_path),
    })
}

/// Last resort: scans raw text for `full-path="....opf"`.
pub(crate) fn recover_full_path(content: &str) -> Option<String> {
    FULL_PATH_PATTERN
        .captures(content)
        .map(|captures| captures[1].to_owned())
}
