// Paths
pub(crate) const CONTAINER: &str = "META-INF/container.xml";

// Elements
pub(crate) const ROOT_FILE: &str = "rootfile";
pub(crate) const ITEM: &str = "item";
pub(crate) const ITEMREF: &str = "itemref";

// Attributes
pub(crate) const ID: &str = "id";
pub(crate) const HREF: &str = "href";
pub(crate) const IDREF: &str = "idref";
pub(crate) const MEDIA_TYPE: &str = "media-type";
pub(crate) const FULL_PATH: &str = "full-path";

// Media types
/// Suffix of `application/oebps-package+xml`.
pub(crate) const OEBPS_PACKAGE_SUFFIX: &str = "oebps-package+xml";
pub(crate) const HTML_MEDIA_TYPE_MARKER: &str = "html";

// Extensions
pub(crate) const MARKUP_EXTENSIONS: &[&str] = &[".xhtml", ".html", ".htm"];
