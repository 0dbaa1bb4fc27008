//! EPUB structure parsing: the container, the package and its reading order.
//!
//! For more information regarding the EPUB spec, see:
//! <https://www.w3.org/TR/epub>

pub(crate) mod consts;
pub mod container;
pub mod errors;
pub mod package;
pub mod spine;

pub use self::container::resolve_package_path;
pub use self::errors::{EpubError, EpubResult};
pub use self::package::{Manifest, ManifestEntry, PackageDocument, ReadingOrder, parse_package};
pub use self::spine::{OrderTier, ResolvedOrder, resolve_reading_order};
