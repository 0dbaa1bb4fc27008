//! Access to the `.epub` zip container and its extraction onto disk.

pub mod errors;

pub use self::errors::{ArchiveError, ArchiveResult};

use crate::util::text;
use std::cell::RefCell;
use std::ffi::OsStr;
use std::fmt::{Debug, Formatter};
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipArchive as Zip;

const EPUB_EXTENSION: &str = "epub";
const EXTRACTION_PREFIX: &str = "epub_";

/// A readable `.epub` zip container.
///
/// # Examples
/// ```no_run
/// # use flatbook::archive::{ArchiveResult, EpubArchive};
/// # fn main() -> ArchiveResult<()> {
/// let archive = EpubArchive::open("book.epub")?;
/// let container = archive.read_str("META-INF/container.xml")?;
///
/// // Removed once `extracted` is dropped
/// let extracted = archive.extract()?;
/// println!("{container} extracted to {}", extracted.root().display());
/// # Ok(())
/// # }
/// ```
pub struct EpubArchive<R = BufReader<File>> {
    zip: RefCell<Zip<R>>,
    path: Option<PathBuf>,
}

impl EpubArchive {
    /// Opens the `.epub` file at `path`.
    ///
    /// # Errors
    /// - [`ArchiveError::NotFound`]: `path` does not exist.
    /// - [`ArchiveError::UnsupportedFormat`]: `path` lacks the `.epub` extension.
    /// - [`ArchiveError::UnreadableArchive`]: `path` is not a readable zip container.
    pub fn open(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ArchiveError::NotFound {
                path: path.to_path_buf(),
            });
        }
        if !has_epub_extension(path) {
            return Err(ArchiveError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path).map_err(|error| ArchiveError::UnreadableArchive {
            source: error,
            path: Some(path.to_path_buf()),
        })?;
        Self::new(BufReader::new(file), Some(path))
    }
}

impl<R: Read + Seek> EpubArchive<R> {
    /// Reads an `.epub` zip container from an in-memory or otherwise seekable `reader`.
    pub fn read(reader: R) -> ArchiveResult<Self> {
        Self::new(reader, None)
    }

    fn new(reader: R, path: Option<&Path>) -> ArchiveResult<Self> {
        Zip::new(reader)
            .map(|zip| Self {
                zip: RefCell::new(zip),
                path: path.map(Path::to_path_buf),
            })
            .map_err(|error| ArchiveError::UnreadableArchive {
                source: io::Error::from(error),
                path: path.map(Path::to_path_buf),
            })
    }

    /// The location the archive was opened from, if opened from a file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns `true` if the named entry exists; a leading `/` is ignored.
    pub fn contains(&self, entry: &str) -> bool {
        self.zip.borrow().index_for_name(entry_key(entry)).is_some()
    }

    /// Reads the named entry as raw bytes.
    ///
    /// # Errors
    /// - [`ArchiveError::MissingEntry`]: No such entry.
    /// - [`ArchiveError::CannotRead`]: The entry could not be decompressed.
    pub fn read_bytes(&self, entry: &str) -> ArchiveResult<Vec<u8>> {
        let mut zip = self.zip.borrow_mut();
        let mut zip_file =
            zip.by_name(entry_key(entry))
                .map_err(|error| ArchiveError::MissingEntry {
                    source: io::Error::from(error),
                    entry: entry.to_owned(),
                })?;
        let mut buf = Vec::new();

        zip_file
            .read_to_end(&mut buf)
            .map(|_| buf)
            .map_err(|error| ArchiveError::CannotRead {
                source: error,
                entry: entry.to_owned(),
            })
    }

    /// Reads the named entry as text, tolerant of its encoding.
    ///
    /// See [`Self::read_bytes`] for possible errors.
    pub fn read_str(&self, entry: &str) -> ArchiveResult<String> {
        self.read_bytes(entry).map(|bytes| text::decode_text(&bytes))
    }

    /// Materializes every entry into a new temporary directory so that
    /// resources referenced by relative paths resolve on disk.
    ///
    /// Entries whose names would escape the directory are skipped.
    ///
    /// # Errors
    /// - [`ArchiveError::Extraction`]: The directory or a file could not be written.
    /// - [`ArchiveError::CannotRead`]: An entry could not be decompressed.
    pub fn extract(&self) -> ArchiveResult<ExtractedArchive> {
        let dir = tempfile::Builder::new()
            .prefix(EXTRACTION_PREFIX)
            .tempdir()
            .map_err(extraction(&std::env::temp_dir()))?;
        // Resolve symlinked temp locations so produced `file:///` URLs are canonical
        let root = dir
            .path()
            .canonicalize()
            .unwrap_or_else(|_| dir.path().to_path_buf());

        self.extract_into(&root)?;
        log::info!("Extracted EPUB to: {}", root.display());

        Ok(ExtractedArchive { root, _dir: dir })
    }

    fn extract_into(&self, root: &Path) -> ArchiveResult<()> {
        let mut zip = self.zip.borrow_mut();

        for index in 0..zip.len() {
            let mut zip_file = zip
                .by_index(index)
                .map_err(|error| ArchiveError::CannotRead {
                    source: io::Error::from(error),
                    entry: format!("#{index}"),
                })?;
            let Some(relative) = zip_file.enclosed_name() else {
                log::warn!("Skipping entry outside of the archive root: `{}`", zip_file.name());
                continue;
            };
            let target = root.join(relative);

            if zip_file.is_dir() {
                fs::create_dir_all(&target).map_err(extraction(&target))?;
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(extraction(parent))?;
            }
            let mut file = File::create(&target).map_err(extraction(&target))?;
            io::copy(&mut zip_file, &mut file).map_err(extraction(&target))?;
        }
        Ok(())
    }
}

impl<R> Debug for EpubArchive<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpubArchive")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// The extracted contents of an [`EpubArchive`] within a temporary directory.
///
/// The directory and everything within it is removed on drop.
#[derive(Debug)]
pub struct ExtractedArchive {
    root: PathBuf,
    _dir: TempDir,
}

impl ExtractedArchive {
    /// The absolute extraction root, corresponding to the root of the container.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for ExtractedArchive {
    fn drop(&mut self) {
        log::debug!("Removing extracted EPUB: {}", self.root.display());
    }
}

fn has_epub_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|extension| extension.eq_ignore_ascii_case(EPUB_EXTENSION))
}

/// Zip entries are never prefixed with the container root.
///
/// `/META-INF/container.xml` -> `META-INF/container.xml`
fn entry_key(entry: &str) -> &str {
    entry.strip_prefix('/').unwrap_or(entry)
}

fn extraction(path: &Path) -> impl FnOnce(io::Error) -> ArchiveError + '_ {
    move |source| ArchiveError::Extraction {
        source,
        path: path.to_path_buf(),
    }
}
