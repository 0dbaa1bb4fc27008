//! Assembly of normalized fragments into a single renderable document.

use quick_xml::escape;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

/// Separates consecutive fragments within a [`CombinedDocument`].
pub const PAGE_BREAK: &str = "\n<div style='page-break-before: always;'></div>\n";

/// Baseline presentation styling of a [`CombinedDocument`].
///
/// Values are inserted into the stylesheet verbatim and must be valid CSS.
///
/// # Examples
/// ```
/// # use flatbook::Template;
/// let template = Template {
///     font_size: "14px".to_owned(),
///     title_page: false,
///     ..Template::default()
/// };
/// assert_eq!("20mm", template.page_margin);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    /// Margin of each printed page (`@page`).
    ///
    /// Default: `20mm`
    pub page_margin: String,
    /// Default: `Arial, sans-serif`
    pub font_family: String,
    /// Default: `12px`
    pub font_size: String,
    /// Default: `1.6`
    pub line_height: f32,
    /// Margin around the document body.
    ///
    /// Default: `20px`
    pub body_margin: String,
    /// When `true`, the document opens with the title as a heading on a page of its own.
    ///
    /// Default: `true`
    pub title_page: bool,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            page_margin: "20mm".to_owned(),
            font_family: "Arial, sans-serif".to_owned(),
            font_size: "12px".to_owned(),
            line_height: 1.6,
            body_margin: "20px".to_owned(),
            title_page: true,
        }
    }
}

impl Template {
    fn stylesheet(&self) -> String {
        format!(
            "  @page {{ size: auto; margin: {}; }}
  body {{
    font-family: {};
    margin: {};
    line-height: {};
    font-size: {};
  }}
  img {{
    max-width: 100%;
    height: auto;
    display: block;
    margin: 10px auto;
  }}
  div[style*=\"page-break-before\"] {{ margin: 0; }}",
            self.page_margin, self.font_family, self.body_margin, self.line_height, self.font_size,
        )
    }
}

/// A complete, presentation-ready document containing every fragment in order.
#[derive(Clone, Debug, PartialEq)]
pub struct CombinedDocument {
    title: String,
    fragment_count: usize,
    markup: String,
}

impl CombinedDocument {
    /// The unescaped document title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The number of fragments the document was assembled from.
    pub fn fragment_count(&self) -> usize {
        self.fragment_count
    }

    pub fn as_str(&self) -> &str {
        &self.markup
    }

    pub fn into_string(self) -> String {
        self.markup
    }

    /// Writes the document to `path` as UTF-8, replacing any existing file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, &self.markup)
    }
}

/// Concatenates `fragments` in order, separated by [`PAGE_BREAK`],
/// and wraps them in a document shell styled by `template`.
///
/// `title` is escaped before insertion.
pub fn assemble<I, S>(title: &str, fragments: I, template: &Template) -> CombinedDocument
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let escaped = escape::escape(title);
    let mut fragment_count = 0;
    let mut body = String::new();

    for fragment in fragments {
        if fragment_count > 0 {
            body.push_str(PAGE_BREAK);
        }
        body.push_str(fragment.as_ref());
        fragment_count += 1;
    }

    let mut markup = String::with_capacity(body.len() + 1024);
    // Writing into a `String` is infallible
    let _ = write!(
        markup,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{escaped}</title>\n<style>\n{}\n</style>\n</head>\n<body>\n",
        template.stylesheet(),
    );
    if template.title_page {
        let _ = writeln!(markup, "<h1 style=\"page-break-after: always;\">{escaped}</h1>");
    }
    markup.push_str(&body);
    markup.push_str("\n</body>\n</html>");

    CombinedDocument {
        title: title.to_owned(),
        fragment_count,
        markup,
    }
}
