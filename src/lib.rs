//! # flatbook
//!
//! Flattens an EPUB into a single HTML document that an external renderer
//! (such as a headless browser) can load and print as one paginated artifact.
//!
//! The pipeline:
//! 1. [`archive`]: Open the `.epub` container and extract it to a scoped
//!    working directory.
//! 2. [`epub::container`]: Locate the package `.opf` file via `META-INF/container.xml`.
//! 3. [`epub::package`]: Parse the manifest and the spine.
//! 4. [`epub::spine`]: Resolve the reading order, falling back to the manifest
//!    and then to the extracted file tree when the spine is unusable.
//! 5. [`fragment`]: Normalize each content document and rewrite its image and
//!    stylesheet references to local `file:///` URLs.
//! 6. [`document`]: Assemble the fragments into one page-broken document.
//! 7. [`render`]: Hand the document off to a [`Renderer`](render::Renderer).
//!
//! ## Examples
//! Flattening an EPUB without rendering it:
//! ```no_run
//! # use flatbook::errors::ConvertResult;
//! use flatbook::{ConvertSettings, Converter};
//!
//! # fn main() -> ConvertResult<()> {
//! let converter = Converter::new(ConvertSettings::builder().output_name("My Book"));
//! let flattened = converter.flatten("my_book.epub")?;
//!
//! println!("{}", flattened.document().as_str());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod convert;
pub mod document;
pub mod epub;
pub mod errors;
pub mod fragment;
mod parser;
pub mod render;
mod util;

pub use self::convert::{ConvertOutcome, ConvertSettings, ConvertSettingsBuilder, Converter};
pub use self::document::{CombinedDocument, Template};
pub use self::render::{NoopRenderer, RenderRequest, Renderer};
