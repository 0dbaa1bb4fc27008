use crate::convert::util::TestEpub;
use flatbook::render::{RenderError, RenderResult};
use flatbook::{ConvertOutcome, ConvertSettings, Converter, RenderRequest, Renderer};
use std::cell::RefCell;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

/// Records each request along with what was observable on disk during the render.
#[derive(Default)]
struct RecordingRenderer {
    requests: RefCell<Vec<RenderRequest>>,
    markup: RefCell<Option<String>>,
    failure: Option<Duration>,
}

impl RecordingRenderer {
    fn failing(wait: Duration) -> Self {
        Self {
            failure: Some(wait),
            ..Self::default()
        }
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, request: &RenderRequest) -> RenderResult<()> {
        self.requests.borrow_mut().push(request.clone());
        *self.markup.borrow_mut() = fs::read_to_string(&request.markup_path).ok();

        match self.failure {
            Some(wait) => Err(RenderError::Timeout(wait)),
            None => Ok(()),
        }
    }
}

#[test]
fn test_render_request() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let path = TestEpub::standard().write(dir.path(), "book.epub");
    let converter = Converter::new(ConvertSettings::builder().output_dir(out.clone()));
    let renderer = RecordingRenderer::default();

    let outcome = converter.convert(&path, &renderer).unwrap();
    let requests = renderer.requests.borrow();
    let request = &requests[0];

    assert_eq!(1, requests.len());
    assert!(outcome.is_rendered());
    assert_eq!(out.join("book.pdf"), outcome.output());
    assert_eq!(out.join("book.pdf"), request.output_path);
    assert_eq!(out.join("book_converted.html"), request.markup_path);
    assert!(request.markup_url.starts_with("file:///"));
    assert!(request.markup_url.ends_with("/out/book_converted.html"));

    // The markup existed during the render and is removed afterward
    let markup = renderer.markup.borrow();
    assert!(markup.as_deref().unwrap().contains("<p>First</p>"));
    assert!(!request.markup_path.exists());
}

#[test]
fn test_resources_available_during_render() {
    struct ResourceCheck;

    impl Renderer for ResourceCheck {
        fn render(&self, request: &RenderRequest) -> RenderResult<()> {
            let markup = fs::read_to_string(&request.markup_path).unwrap();
            let start = markup.find("src=\"file:///").unwrap() + "src=\"file://".len();
            let end = start + markup[start..].find('"').unwrap();

            assert!(std::path::Path::new(&markup[start..end]).is_file());
            Ok(())
        }
    }

    let dir = TempDir::new().unwrap();
    let path = TestEpub::standard().write(dir.path(), "book.epub");
    let converter = Converter::new(ConvertSettings::builder().output_dir(dir.path()));

    assert!(converter.convert(&path, &ResourceCheck).unwrap().is_rendered());
}

#[test]
fn test_render_failure_is_attempted() {
    let dir = TempDir::new().unwrap();
    let path = TestEpub::standard().write(dir.path(), "book.epub");
    let converter = Converter::new(ConvertSettings::builder().output_dir(dir.path()));
    let renderer = RecordingRenderer::failing(Duration::from_secs(30));

    let outcome = converter.convert(&path, &renderer).unwrap();

    assert!(matches!(
        outcome,
        ConvertOutcome::Attempted { error: RenderError::Timeout(wait), .. } if wait == Duration::from_secs(30)
    ));
    // Cleanup happens regardless
    assert!(!dir.path().join("book_converted.html").exists());
}

#[test]
fn test_keep_markup() {
    let dir = TempDir::new().unwrap();
    let path = TestEpub::standard().write(dir.path(), "book.epub");
    let converter = Converter::new(
        ConvertSettings::builder()
            .output_dir(dir.path())
            .output_name("My Book")
            .keep_markup(true),
    );
    let renderer = RecordingRenderer::default();

    converter.convert(&path, &renderer).unwrap();
    let kept = dir.path().join("My Book_converted.html");
    let markup = fs::read_to_string(&kept).unwrap();

    assert_eq!(Some(&markup), renderer.markup.borrow().as_ref());
    assert!(markup.contains("<title>My Book</title>"));
    assert!(renderer.requests.borrow()[0].markup_url.ends_with("/My%20Book_converted.html"));
}
