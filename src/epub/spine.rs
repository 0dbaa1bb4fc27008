//! Reading order resolution with successively weaker fallbacks.

use crate::epub::consts;
use crate::epub::errors::{EpubError, EpubResult};
use crate::epub::package::{Manifest, PackageDocument};
use crate::util::StrExt;
use crate::util::uri;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// The source a [`ResolvedOrder`] was derived from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OrderTier {
    /// The spine `itemref` entries, mapped through the manifest.
    Spine,
    /// Every markup entry of the manifest, in declaration order.
    Manifest,
    /// Every markup file within the extracted archive, sorted by path.
    Filesystem,
}

impl Display for OrderTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Spine => "spine",
            Self::Manifest => "manifest",
            Self::Filesystem => "filesystem",
        })
    }
}

/// Ordered content document hrefs.
///
/// Hrefs from [`OrderTier::Spine`] and [`OrderTier::Manifest`] are relative to
/// the package directory and may be percent-encoded.
/// Hrefs from [`OrderTier::Filesystem`] are relative to the extraction root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedOrder {
    tier: OrderTier,
    hrefs: Vec<String>,
}

impl ResolvedOrder {
    pub fn tier(&self) -> OrderTier {
        self.tier
    }

    pub fn hrefs(&self) -> &[String] {
        &self.hrefs
    }

    pub fn into_hrefs(self) -> Vec<String> {
        self.hrefs
    }

    pub fn len(&self) -> usize {
        self.hrefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hrefs.is_empty()
    }
}

/// Resolves the reading order of a package.
///
/// Each tier is attempted only if the previous one produced nothing:
/// 1. [`OrderTier::Spine`]: see [`from_spine`].
/// 2. [`OrderTier::Manifest`]: see [`from_manifest`].
/// 3. [`OrderTier::Filesystem`]: see [`from_filesystem`].
///
/// # Errors
/// [`EpubError::EmptyDocument`] when all three tiers are empty.
pub fn resolve_reading_order(
    package: &PackageDocument,
    extraction_root: &Path,
) -> EpubResult<ResolvedOrder> {
    let tiers: [(OrderTier, &dyn Fn() -> Vec<String>); 3] = [
        (OrderTier::Spine, &|| from_spine(package)),
        (OrderTier::Manifest, &|| from_manifest(&package.manifest)),
        (OrderTier::Filesystem, &|| from_filesystem(extraction_root)),
    ];

    for (tier, resolve) in tiers {
        let hrefs = resolve();

        if !hrefs.is_empty() {
            log::info!("Reading order resolved from {tier}: {} document(s)", hrefs.len());
            return Ok(ResolvedOrder { tier, hrefs });
        }
        log::info!("No reading order from {tier}; falling back");
    }
    Err(EpubError::EmptyDocument)
}

/// Maps each spine idref to its manifest href, preserving order and duplicates.
///
/// Idrefs absent from the manifest are dropped.
pub fn from_spine(package: &PackageDocument) -> Vec<String> {
    package
        .reading_order
        .iter()
        .filter_map(|idref| package.manifest.by_id(idref))
        .map(|entry| entry.href().to_owned())
        .collect()
}

/// Collects manifest hrefs whose extension or media type indicates markup.
///
/// Manifest declaration order is retained.
pub fn from_manifest(manifest: &Manifest) -> Vec<String> {
    manifest
        .iter()
        .filter(|entry| {
            is_markup_href(entry.href())
                || entry.media_type().contains(consts::HTML_MEDIA_TYPE_MARKER)
        })
        .map(|entry| entry.href().to_owned())
        .collect()
}

/// Recursively collects markup files under `root`,
/// sorted lexicographically by their `/` separated relative path.
///
/// Unreadable directories and symlinks are skipped.
pub fn from_filesystem(root: &Path) -> Vec<String> {
    fn traverse(hrefs: &mut Vec<String>, root: &Path, path: &Path) {
        let read_dir = match path.read_dir() {
            Ok(read_dir) => read_dir,
            Err(error) => {
                log::warn!("Skipping unreadable directory `{}`: {error}", path.display());
                return;
            }
        };

        for entry in read_dir.filter_map(Result::ok) {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            // Symlinks are not followed
            // (to avoid cycles and paths leading outside the root)
            if file_type.is_symlink() {
                continue;
            }

            let path = entry.path();
            if file_type.is_dir() {
                traverse(hrefs, root, &path);
            } else if let Some(href) = uri::relative_posix(&path, root)
                && has_markup_extension(&href)
            {
                hrefs.push(href);
            }
        }
    }

    let mut hrefs = Vec::new();
    traverse(&mut hrefs, root, root);
    hrefs.sort();
    hrefs
}

/// Strips any `?query` or `#fragment` first; only manifest hrefs are URLs.
fn is_markup_href(href: &str) -> bool {
    let (path, _) = uri::split_suffix(href);
    has_markup_extension(path)
}

fn has_markup_extension(path: &str) -> bool {
    consts::MARKUP_EXTENSIONS
        .iter()
        .any(|extension| path.ends_with_ignore_case(extension))
}
