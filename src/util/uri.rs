use crate::util::StrExt;
use percent_encoding::{AsciiSet, CONTROLS};
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Characters escaped within the path of a `file:///` URL.
const FILE_URL_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Prefixes of references that are already resolvable without the extracted archive.
const EXTERNAL_PREFIXES: &[&str] = &["http://", "https://", "data:", "file:", "#"];

pub(crate) fn parent(href: &str) -> &str {
    href.rfind('/')
        .map_or("", |index| if index == 0 { "/" } else { &href[..index] })
}

pub(crate) fn decode(encoded: &str) -> Cow<'_, str> {
    percent_encoding::percent_decode_str(encoded).decode_utf8_lossy()
}

/// Normalizes `.` and `..` segments and collapses repeated separators.
///
/// Leading `/` is removed; every href is relative to the container root.
pub(crate) fn normalize(href: &str) -> String {
    let mut buf = PathBuf::from(href.trim_start_matches('/'));
    normalize_href_path(&mut buf);

    // `buf` is UTF-8 as its data derives from `href`.
    buf.to_string_lossy().replace('\\', "/")
}

/// Joins `relative` onto `base` using POSIX rules.
///
/// A `relative` href starting with `/` replaces `base` entirely,
/// although it remains anchored to the container root.
pub(crate) fn join(base: &str, relative: &str) -> String {
    if base.is_empty() || relative.starts_with('/') {
        normalize(relative)
    } else {
        normalize(&format!("{base}/{relative}"))
    }
}

/// Splits a reference into its path and any trailing `?query` or `#fragment`.
pub(crate) fn split_suffix(reference: &str) -> (&str, &str) {
    reference
        .find(['?', '#'])
        .map(|position| reference.split_at(position))
        .unwrap_or((reference, ""))
}

pub(crate) fn is_external(reference: &str) -> bool {
    EXTERNAL_PREFIXES
        .iter()
        .any(|prefix| reference.starts_with_ignore_case(prefix))
}

/// Turns an absolute filesystem path into a `file:///` URL.
pub(crate) fn to_file_url(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    let encoded = percent_encoding::utf8_percent_encode(path.trim_start_matches('/'), FILE_URL_PATH);

    format!("file:///{encoded}")
}

/// Returns the `/` separated form of `path` relative to `root`.
pub(crate) fn relative_posix(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.to_str()?;

    Some(if cfg!(windows) {
        relative.replace('\\', "/")
    } else {
        relative.to_owned()
    })
}

fn normalize_href_path(original: &mut PathBuf) {
    let mut stack = Vec::new();

    for component in original.components() {
        match component {
            // Popping past the root is disallowed; the href must stay within the container.
            Component::ParentDir => {
                stack.pop();
            }
            Component::Normal(_) => stack.push(component),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    *original = PathBuf::from_iter(stack);
}
