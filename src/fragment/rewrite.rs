use crate::util::uri;
use quick_xml::escape;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(src)="([^"]+)""#).expect("src pattern is valid")
});
static STYLESHEET_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(href)="([^"]+\.css(?:[?#][^"]*)?)""#).expect("stylesheet pattern is valid")
});

/// Locations that relative resource references are resolved against.
#[derive(Copy, Clone, Debug)]
pub struct ResourceContext<'a> {
    /// The absolute extraction root of the archive.
    pub root: &'a Path,
    /// The container-relative directory of the package `.opf` file.
    pub package_dir: &'a str,
    /// The container-relative directory of the fragment being rewritten.
    pub fragment_dir: &'a str,
}

impl ResourceContext<'_> {
    /// Resolves a relative `reference` to an existing file, trying in order:
    /// 1. The fragment directory
    /// 2. The package directory
    /// 3. The extraction root
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let decoded = uri::decode(reference);

        [self.fragment_dir, self.package_dir, ""]
            .into_iter()
            .map(|base| uri::join(base, &decoded))
            .filter(|location| !location.is_empty())
            .map(|location| self.root.join(location))
            .find(|path| path.is_file())
    }
}

/// Rewritten markup along with the references left unchanged for not existing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rewritten {
    pub markup: String,
    pub unresolved: Vec<String>,
}

/// Rewrites every `src="..."` and stylesheet `href="....css"` reference into
/// an absolute `file:///` URL.
///
/// References to the network, `data:` URIs, in-document anchors and existing
/// `file:` URLs are left untouched. A query or fragment on a local reference
/// is carried over onto the rewritten URL.
///
/// A reference that cannot be found on disk is left unchanged.
pub fn rewrite_references(markup: &str, context: &ResourceContext) -> Rewritten {
    let mut unresolved = Vec::new();

    let markup = SRC.replace_all(markup, |captures: &Captures| {
        rewrite(captures, context, "resource", &mut unresolved)
    });
    let markup = STYLESHEET_HREF.replace_all(&markup, |captures: &Captures| {
        rewrite(captures, context, "stylesheet", &mut unresolved)
    });

    Rewritten {
        markup: markup.into_owned(),
        unresolved,
    }
}

fn rewrite(
    captures: &Captures,
    context: &ResourceContext,
    kind: &str,
    unresolved: &mut Vec<String>,
) -> String {
    let attribute = &captures[1];
    let raw = &captures[2];
    let reference = escape::unescape(raw).unwrap_or(Cow::Borrowed(raw));

    if uri::is_external(&reference) {
        return captures[0].to_owned();
    }

    // The suffix is written back as-is, so it must remain escaped
    let (raw_path, suffix) = uri::split_suffix(raw);
    let path = escape::unescape(raw_path).unwrap_or(Cow::Borrowed(raw_path));

    match context.resolve(&path) {
        Some(resolved) => format!(r#"{attribute}="{}{suffix}""#, uri::to_file_url(&resolved)),
        None => {
            log::warn!(
                "Missing {kind} `{reference}` referenced from `{}`",
                context.fragment_dir
            );
            unresolved.push(reference.into_owned());
            captures[0].to_owned()
        }
    }
}
