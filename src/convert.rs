//! The end-to-end conversion pipeline.

use crate::archive::{EpubArchive, ExtractedArchive};
use crate::document::{self, CombinedDocument, Template};
use crate::epub::{self, OrderTier, PackageDocument, ResolvedOrder, consts};
use crate::errors::{ConvertError, ConvertResult, RenderError};
use crate::fragment;
use crate::render::{RenderRequest, Renderer, TransientMarkup};
use crate::util::uri;
use std::fs;
use std::path::{Path, PathBuf};

const OUTPUT_EXTENSION: &str = "pdf";

/// Converts `.epub` files into a single combined document
/// and hands it off to a [`Renderer`].
///
/// # Examples
/// - Converting with a custom renderer:
/// ```no_run
/// # use flatbook::errors::ConvertResult;
/// # use flatbook::render::RenderResult;
/// use flatbook::{ConvertOutcome, ConvertSettings, Converter, RenderRequest, Renderer};
///
/// struct Print;
///
/// impl Renderer for Print {
///     fn render(&self, request: &RenderRequest) -> RenderResult<()> {
///         println!("load {} and print to {}", request.markup_url, request.output_path.display());
///         Ok(())
///     }
/// }
///
/// # fn main() -> ConvertResult<()> {
/// let converter = Converter::new(ConvertSettings::builder().output_dir("out"));
///
/// match converter.convert("my_book.epub", &Print)? {
///     ConvertOutcome::Rendered { output } => println!("Attempted: {}", output.display()),
///     ConvertOutcome::Attempted { error, .. } => eprintln!("Renderer failed: {error}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct Converter {
    settings: ConvertSettings,
}

impl Converter {
    pub fn new(settings: impl Into<ConvertSettings>) -> Self {
        Self {
            settings: settings.into(),
        }
    }

    pub fn settings(&self) -> &ConvertSettings {
        &self.settings
    }

    /// Locates the package, resolves its reading order and reports the result
    /// without reading any fragments.
    ///
    /// # Errors
    /// See [`Self::flatten`]; [`EpubError::EmptyDocument`](crate::epub::EpubError::EmptyDocument)
    /// is returned when no reading order can be resolved at all.
    pub fn inspect(&self, path: impl AsRef<Path>) -> ConvertResult<Inspection> {
        let Prepared {
            package_path,
            package,
            order,
            ..
        } = prepare(path.as_ref())?;

        Ok(Inspection {
            package_path,
            manifest_len: package.manifest.len(),
            order,
        })
    }

    /// Flattens the `.epub` at `path` into a [`CombinedDocument`].
    ///
    /// Fragments that are missing or unreadable are skipped with a warning.
    ///
    /// # Errors
    /// - [`ConvertError::Archive`]: The file is missing, not an `.epub`, unreadable,
    ///   or the package file it declares is absent.
    /// - [`ConvertError::Epub`]: The container or package is unusable, or no
    ///   fragment produced content.
    pub fn flatten(&self, path: impl AsRef<Path>) -> ConvertResult<Flattened> {
        let path = path.as_ref();
        let Prepared {
            package_path,
            extracted,
            order,
            ..
        } = prepare(path)?;
        let package_dir = package_path.as_deref().map_or("", uri::parent);
        let root = extracted.root();

        let mut fragments = Vec::with_capacity(order.len());
        let mut skipped = Vec::new();

        for href in order.hrefs() {
            // Filesystem entries are extracted file names rather than hrefs
            let normalized = match order.tier() {
                OrderTier::Filesystem => fragment::normalize_extracted(root, href),
                _ => fragment::normalize_fragment(root, package_dir, href),
            };
            match normalized {
                Ok(fragment) => fragments.push(fragment.into_markup()),
                Err(error) => {
                    log::warn!("Could not process `{href}`: {error}");
                    skipped.push(href.clone());
                }
            }
        }
        if fragments.is_empty() {
            return Err(epub::EpubError::EmptyDocument.into());
        }

        let title = self.output_name(path);
        let document = document::assemble(&title, &fragments, &self.settings.template);

        Ok(Flattened {
            document,
            tier: order.tier(),
            skipped,
            extracted,
        })
    }

    /// Flattens the `.epub` at `path` and renders it with `renderer`.
    ///
    /// The combined document is written to `<name>_converted.html` within
    /// [`ConvertSettings::output_dir`] for the duration of the render, and the
    /// renderer is asked to write `<name>.pdf` alongside it.
    /// The extracted archive remains available until the renderer returns.
    ///
    /// A renderer failure does not fail the conversion;
    /// it is reported through [`ConvertOutcome::Attempted`].
    ///
    /// # Errors
    /// See [`Self::flatten`]. Additionally [`ConvertError::Io`] when the
    /// output directory or the markup file cannot be written.
    pub fn convert(
        &self,
        path: impl AsRef<Path>,
        renderer: &dyn Renderer,
    ) -> ConvertResult<ConvertOutcome> {
        let path = path.as_ref();
        let flattened = self.flatten(path)?;
        let output_dir = &self.settings.output_dir;
        let name = self.output_name(path);

        fs::create_dir_all(output_dir).map_err(|source| ConvertError::Io {
            source,
            path: output_dir.clone(),
        })?;
        let mut markup = TransientMarkup::create(output_dir, &name, flattened.document())
            .map_err(|source| ConvertError::Io {
                source,
                path: output_dir.clone(),
            })?;
        markup.keep(self.settings.keep_markup);

        let request = RenderRequest {
            markup_url: markup.url(),
            markup_path: markup.path().to_path_buf(),
            output_path: output_dir.join(format!("{name}.{OUTPUT_EXTENSION}")),
        };
        log::info!("Converting to {}", request.output_path.display());

        Ok(match renderer.render(&request) {
            Ok(()) => {
                log::info!("Conversion attempted for: {name}");
                ConvertOutcome::Rendered {
                    output: request.output_path,
                }
            }
            Err(error) => {
                log::warn!("Error during conversion of `{name}`: {error}");
                ConvertOutcome::Attempted {
                    output: request.output_path,
                    error,
                }
            }
        })
    }

    fn output_name(&self, path: &Path) -> String {
        self.settings.output_name.clone().unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }
}

struct Prepared {
    package_path: Option<String>,
    package: PackageDocument,
    extracted: ExtractedArchive,
    order: ResolvedOrder,
}

fn prepare(path: &Path) -> ConvertResult<Prepared> {
    log::info!("Processing EPUB file: {}", path.display());
    let archive = EpubArchive::open(path)?;

    let package_path = if archive.contains(consts::CONTAINER) {
        let container = archive.read_bytes(consts::CONTAINER)?;
        Some(epub::resolve_package_path(&container)?)
    } else {
        log::warn!("Missing `{}`; falling back to content discovery", consts::CONTAINER);
        None
    };
    let package = match &package_path {
        Some(package_path) => epub::parse_package(&archive.read_str(package_path)?)?,
        None => PackageDocument::default(),
    };

    let extracted = archive.extract()?;
    let order = epub::resolve_reading_order(&package, extracted.root())?;

    Ok(Prepared {
        package_path,
        package,
        extracted,
        order,
    })
}

/// The result of [`Converter::flatten`].
///
/// Holds onto the extracted archive, as the document references
/// its resources by `file:///` URL.
#[derive(Debug)]
pub struct Flattened {
    document: CombinedDocument,
    tier: OrderTier,
    skipped: Vec<String>,
    extracted: ExtractedArchive,
}

impl Flattened {
    pub fn document(&self) -> &CombinedDocument {
        &self.document
    }

    /// The source the reading order was resolved from.
    pub fn tier(&self) -> OrderTier {
        self.tier
    }

    /// Hrefs of fragments that were missing or unreadable.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// The directory referenced resources were extracted to.
    ///
    /// Removed once `self` is dropped.
    pub fn extraction_root(&self) -> &Path {
        self.extracted.root()
    }
}

/// The result of [`Converter::inspect`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inspection {
    /// The package file declared by the container, if there is a container.
    pub package_path: Option<String>,
    /// The number of manifest entries.
    pub manifest_len: usize,
    pub order: ResolvedOrder,
}

/// The outcome of a conversion that produced a combined document.
///
/// Neither variant confirms the artifact exists;
/// renderers provide no acknowledgment beyond their return value.
#[derive(Debug)]
pub enum ConvertOutcome {
    /// The renderer reported success.
    Rendered {
        /// Where the renderer was asked to write the artifact.
        output: PathBuf,
    },
    /// The renderer reported failure.
    Attempted {
        /// Where the renderer was asked to write the artifact.
        output: PathBuf,
        error: RenderError,
    },
}

impl ConvertOutcome {
    pub fn output(&self) -> &Path {
        match self {
            Self::Rendered { output } | Self::Attempted { output, .. } => output,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

/// Optional conversion settings.
///
/// To create a mutable settings instance, see
/// [`ConvertSettings::builder`] or [`ConvertSettings::default`].
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct ConvertSettings {
    /// The document title and the base name of produced files.
    ///
    /// Default: [`None`], the file stem of the converted `.epub`
    pub output_name: Option<String>,
    /// Where the transient markup file and the rendered artifact are written.
    ///
    /// Created if it does not exist.
    ///
    /// Default: the current directory
    pub output_dir: PathBuf,
    /// Presentation styling of the combined document.
    ///
    /// Default: [`Template::default`]
    pub template: Template,
    /// Keep the transient `<name>_converted.html` file after rendering.
    ///
    /// Default: `false`
    pub keep_markup: bool,
}

impl ConvertSettings {
    /// Returns a builder to create a [`ConvertSettings`] instance.
    pub fn builder() -> ConvertSettingsBuilder {
        ConvertSettingsBuilder(Self::default())
    }
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            output_name: None,
            output_dir: PathBuf::from("."),
            template: Template::default(),
            keep_markup: false,
        }
    }
}

impl From<ConvertSettingsBuilder> for ConvertSettings {
    fn from(value: ConvertSettingsBuilder) -> Self {
        value.build()
    }
}

/// Builder to construct a [`ConvertSettings`] instance.
///
/// # Examples
/// ```
/// # use flatbook::{ConvertSettings, Converter};
/// let converter = Converter::new(
///     ConvertSettings::builder()
///         .output_name("My Book")
///         .output_dir("out")
///         .keep_markup(true),
/// );
/// assert_eq!(Some("My Book"), converter.settings().output_name.as_deref());
/// ```
#[derive(Clone, Debug)]
pub struct ConvertSettingsBuilder(ConvertSettings);

impl ConvertSettingsBuilder {
    /// Turn this builder into a [`ConvertSettings`] instance.
    pub fn build(self) -> ConvertSettings {
        self.0
    }

    /// See [`ConvertSettings::output_name`].
    pub fn output_name(mut self, output_name: impl Into<String>) -> Self {
        self.0.output_name = Some(output_name.into());
        self
    }

    /// See [`ConvertSettings::output_dir`].
    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.0.output_dir = output_dir.into();
        self
    }

    /// See [`ConvertSettings::template`].
    pub fn template(mut self, template: Template) -> Self {
        self.0.template = template;
        self
    }

    /// See [`ConvertSettings::keep_markup`].
    pub fn keep_markup(mut self, keep_markup: bool) -> Self {
        self.0.keep_markup = keep_markup;
        self
    }
}
