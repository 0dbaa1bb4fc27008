//! The package (`.opf`) document: its manifest and declared reading order.

use crate::epub::consts;
use crate::epub::errors::EpubResult;
use crate::parser::ParserResult;
use crate::parser::xml::{self, XmlElement, XmlReader};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static DEFAULT_NAMESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sxmlns="[^"]+""#).expect("default namespace pattern is valid")
});

/// A single manifest `item`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    id: String,
    href: String,
    media_type: String,
}

impl ManifestEntry {
    pub fn new(
        id: impl Into<String>,
        href: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
        }
    }

    /// The unique identifier of this entry.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The package-relative location, still percent-encoded as declared.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// The lowercase media type, or an empty string if none was declared.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }
}

/// Manifest entries indexed by id, iterated in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
    index: HashMap<String, usize>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry`, replacing any existing entry with the same id.
    ///
    /// A replaced entry keeps the position of the original.
    pub fn insert(&mut self, entry: ManifestEntry) {
        match self.index.get(entry.id()) {
            Some(&position) => self.entries[position] = entry,
            None => {
                self.index.insert(entry.id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn by_id(&self, id: &str) -> Option<&ManifestEntry> {
        self.index.get(id).map(|&position| &self.entries[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ManifestEntry> for Manifest {
    fn from_iter<T: IntoIterator<Item = ManifestEntry>>(iter: T) -> Self {
        let mut manifest = Self::new();
        iter.into_iter().for_each(|entry| manifest.insert(entry));
        manifest
    }
}

/// The declared reading order as spine `idref` values.
///
/// Neither uniqueness nor existence within the [`Manifest`] is guaranteed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadingOrder(Vec<String>);

impl ReadingOrder {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ReadingOrder {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// The parsed contents of a package `.opf` file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageDocument {
    pub manifest: Manifest,
    pub reading_order: ReadingOrder,
}

/// Parses the package document, tolerant of namespace variations.
///
/// `item` and `itemref` elements are matched by their local name anywhere in
/// the document. Items without an `id` or `href` and itemrefs without an
/// `idref` are skipped.
///
/// If parsing fails, the first default namespace declaration is stripped
/// and parsing is retried once.
///
/// # Errors
/// [`EpubError::Unparsable`](super::EpubError::Unparsable) when the retry fails as well.
pub fn parse_package(content: &str) -> EpubResult<PackageDocument> {
    match structured(content) {
        Ok(package) => Ok(package),
        Err(error) => {
            let Some(stripped) = strip_default_namespace(content) else {
                return Err(error);
            };
            log::warn!("Malformed package document ({error}); retrying without its default namespace");
            structured(&stripped)
        }
    }
}

pub(crate) fn structured(content: &str) -> ParserResult<PackageDocument> {
    let mut reader = xml::reader(content);
    let mut package = PackageDocument::default();
    let mut reading_order = Vec::new();

    while let Some(el) = reader.next_element() {
        let el = el?;

        if el.is_local_name(consts::ITEM) {
            let (Some(id), Some(href)) = (
                el.get_attribute(consts::ID),
                el.get_attribute(consts::HREF),
            ) else {
                continue;
            };
            let mut media_type = el.get_attribute(consts::MEDIA_TYPE).unwrap_or_default();
            // Lowercase to enforce uniformity.
            media_type.make_ascii_lowercase();

            package.manifest.insert(ManifestEntry { id, href, media_type });
        } else if el.is_local_name(consts::ITEMREF)
            && let Some(idref) = el.get_attribute(consts::IDREF)
        {
            reading_order.push(idref);
        }
    }

    package.reading_order = ReadingOrder(reading_order);
    Ok(package)
}

/// Removes the first ` xmlns="..."` declaration.
///
/// Returns [`None`] if there is nothing to remove.
pub(crate) fn strip_default_namespace(content: &str) -> Option<String> {
    DEFAULT_NAMESPACE
        .find(content)
        .map(|found| [&content[..found.start()], &content[found.end()..]].concat())
}
