use crate::convert::util::{self, CHAPTER_1, CONTAINER, TestEpub};
use flatbook::archive::ArchiveError;
use flatbook::document::PAGE_BREAK;
use flatbook::epub::{EpubError, OrderTier};
use flatbook::errors::ConvertError;
use flatbook::{ConvertSettings, Converter, NoopRenderer};
use tempfile::TempDir;

#[test]
fn test_flatten_standard_epub() {
    let dir = TempDir::new().unwrap();
    let path = TestEpub::standard().write(dir.path(), "book.epub");

    let flattened = Converter::default().flatten(&path).unwrap();
    let document = flattened.document();
    let markup = document.as_str();
    let root = flattened.extraction_root();

    // `ghost` is absent from the manifest
    assert_eq!(OrderTier::Spine, flattened.tier());
    assert_eq!(2, document.fragment_count());
    assert!(flattened.skipped().is_empty());
    assert_eq!("book", document.title());
    assert_eq!(1, markup.matches(PAGE_BREAK).count());
    assert!(markup.find("<p>First</p>") < markup.find("<p>Second</p>"));

    // Resolved relative to the package directory
    let cover = util::file_url(root, "OEBPS/images/cover.jpg");
    assert!(markup.contains(&format!(r#"<img src="{cover}" alt="cover"/>"#)));
    assert!(root.join("OEBPS/images/cover.jpg").is_file());
    // Left unchanged
    assert!(markup.contains(r#"<img src="missing.png"/>"#));
    // Wrappers and `head` are discarded
    assert!(!markup.contains("<?xml"));
    assert!(!markup.contains("xmlns="));
    assert!(!markup.contains("main.css"));
}

#[test]
fn test_extraction_removed_on_drop() {
    let dir = TempDir::new().unwrap();
    let path = TestEpub::standard().write(dir.path(), "book.epub");

    let flattened = Converter::default().flatten(&path).unwrap();
    let root = flattened.extraction_root().to_path_buf();

    assert!(root.is_dir());
    drop(flattened);
    assert!(!root.exists());
}

#[test]
fn test_output_name() {
    let dir = TempDir::new().unwrap();
    let path = TestEpub::standard().write(dir.path(), "book.epub");
    let converter = Converter::new(ConvertSettings::builder().output_name("Tom & Jerry"));

    let flattened = converter.flatten(&path).unwrap();
    let markup = flattened.document().as_str();

    assert_eq!("Tom & Jerry", flattened.document().title());
    assert!(markup.contains("<title>Tom &amp; Jerry</title>"));
}

#[test]
fn test_input_validation() {
    let dir = TempDir::new().unwrap();
    let wrong_extension = TestEpub::standard().write(dir.path(), "book.zip");
    let converter = Converter::default();

    assert!(matches!(
        converter.flatten(dir.path().join("missing.epub")),
        Err(ConvertError::Archive(ArchiveError::NotFound { .. }))
    ));
    assert!(matches!(
        converter.flatten(wrong_extension),
        Err(ConvertError::Archive(ArchiveError::UnsupportedFormat { .. }))
    ));
}

#[test]
fn test_uppercase_extension() {
    let dir = TempDir::new().unwrap();
    let path = TestEpub::standard().write(dir.path(), "BOOK.EPUB");

    assert_eq!(2, Converter::default().flatten(path).unwrap().document().fragment_count());
}

#[test]
fn test_empty_document_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let path = TestEpub::new()
        .entry("OEBPS/images/cover.jpg", [0xFF, 0xD8])
        .write(dir.path(), "empty.epub");
    let converter = Converter::new(ConvertSettings::builder().output_dir(out.clone()));

    let result = converter.convert(&path, &NoopRenderer);

    assert!(matches!(result, Err(ConvertError::Epub(EpubError::EmptyDocument))));
    assert!(!out.exists());
}

#[test]
fn test_manifest_fallback() {
    let dir = TempDir::new().unwrap();
    let package = r#"<package xmlns="http://www.idpf.org/2007/opf">
        <manifest>
            <item id="b" href="b.xhtml" media-type="application/xhtml+xml"/>
            <item id="img" href="a.png" media-type="image/png"/>
            <item id="a" href="a.xhtml" media-type="application/xhtml+xml"/>
        </manifest>
        <spine/>
    </package>"#;
    let path = TestEpub::new()
        .entry("META-INF/container.xml", CONTAINER)
        .entry("OEBPS/content.opf", package)
        .entry("OEBPS/b.xhtml", "<body><p>B</p></body>")
        .entry("OEBPS/a.xhtml", "<body><p>A</p></body>")
        .write(dir.path(), "book.epub");

    let flattened = Converter::default().flatten(&path).unwrap();
    let markup = flattened.document().as_str();

    assert_eq!(OrderTier::Manifest, flattened.tier());
    // Manifest order; not sorted
    assert!(markup.find("<p>B</p>") < markup.find("<p>A</p>"));
}

#[test]
fn test_filesystem_fallback_without_container() {
    let dir = TempDir::new().unwrap();
    let path = TestEpub::new()
        .entry("content/b.xhtml", "<body><p>B</p></body>")
        .entry("content/a.html", r#"<body><p>A</p><img src="pic.png"/></body>"#)
        .entry("content/pic.png", [0x89, b'P', b'N', b'G'])
        .write(dir.path(), "loose.epub");

    let flattened = Converter::default().flatten(&path).unwrap();
    let markup = flattened.document().as_str();
    let pic = util::file_url(flattened.extraction_root(), "content/pic.png");

    assert_eq!(OrderTier::Filesystem, flattened.tier());
    assert!(markup.find("<p>A</p>") < markup.find("<p>B</p>"));
    assert!(markup.contains(&format!(r#"<img src="{pic}"/>"#)));
}

#[test]
fn test_filesystem_fallback_keeps_literal_file_names() {
    let dir = TempDir::new().unwrap();
    let path = TestEpub::new()
        .entry("text/C#.xhtml", "<body><p>Sharp</p></body>")
        .write(dir.path(), "sharp.epub");

    let flattened = Converter::default().flatten(&path).unwrap();

    assert_eq!(OrderTier::Filesystem, flattened.tier());
    assert!(flattened.skipped().is_empty());
    assert!(flattened.document().as_str().contains("<p>Sharp</p>"));
}

#[test]
fn test_malformed_container_recovered() {
    let dir = TempDir::new().unwrap();
    let container = r#"<container><rootfiles><rootfile full-path="OEBPS/content.opf"></container>"#;
    let path = TestEpub::new()
        .entry("META-INF/container.xml", container)
        .entry("OEBPS/content.opf", util::PACKAGE)
        .entry("OEBPS/text/ch1.xhtml", CHAPTER_1)
        .write(dir.path(), "book.epub");

    let inspection = Converter::default().inspect(&path).unwrap();
    assert_eq!(Some("OEBPS/content.opf"), inspection.package_path.as_deref());
    // The reading order is declared; files are only checked when flattening
    assert_eq!(["text/ch1.xhtml", "text/ch2.xhtml"], inspection.order.hrefs());

    let flattened = Converter::default().flatten(&path).unwrap();
    assert_eq!(["text/ch2.xhtml"], flattened.skipped());
    assert_eq!(1, flattened.document().fragment_count());
}

#[test]
fn test_container_without_package() {
    let dir = TempDir::new().unwrap();
    let path = TestEpub::new()
        .entry("META-INF/container.xml", "<container><rootfiles/></container>")
        .entry("OEBPS/text/ch1.xhtml", CHAPTER_1)
        .write(dir.path(), "book.epub");

    assert!(matches!(
        Converter::default().flatten(path),
        Err(ConvertError::Epub(EpubError::ManifestNotFound))
    ));
}

#[test]
fn test_declared_package_missing() {
    let dir = TempDir::new().unwrap();
    let path = TestEpub::new()
        .entry("META-INF/container.xml", CONTAINER)
        .write(dir.path(), "book.epub");

    assert!(matches!(
        Converter::default().flatten(path),
        Err(ConvertError::Archive(ArchiveError::MissingEntry { entry, .. })) if entry == "OEBPS/content.opf"
    ));
}

#[test]
fn test_unparsable_package() {
    let dir = TempDir::new().unwrap();
    let path = TestEpub::new()
        .entry("META-INF/container.xml", CONTAINER)
        .entry("OEBPS/content.opf", "<package><manifest></spine></package>")
        .write(dir.path(), "book.epub");

    assert!(matches!(
        Converter::default().flatten(path),
        Err(ConvertError::Epub(EpubError::Unparsable(_)))
    ));
}

#[test]
fn test_missing_fragment_skipped() {
    let dir = TempDir::new().unwrap();
    let package = r#"<package>
        <manifest>
            <item id="c1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
            <item id="gone" href="text/gone.xhtml" media-type="application/xhtml+xml"/>
        </manifest>
        <spine><itemref idref="gone"/><itemref idref="c1"/></spine>
    </package>"#;
    let path = TestEpub::new()
        .entry("META-INF/container.xml", CONTAINER)
        .entry("OEBPS/content.opf", package)
        .entry("OEBPS/text/ch1.xhtml", CHAPTER_1)
        .write(dir.path(), "book.epub");

    let flattened = Converter::default().flatten(&path).unwrap();

    assert_eq!(["text/gone.xhtml"], flattened.skipped());
    assert_eq!(1, flattened.document().fragment_count());
}

#[test]
fn test_every_fragment_missing() {
    let dir = TempDir::new().unwrap();
    let package = r#"<package>
        <manifest><item id="gone" href="gone.xhtml" media-type="application/xhtml+xml"/></manifest>
        <spine><itemref idref="gone"/></spine>
    </package>"#;
    let path = TestEpub::new()
        .entry("META-INF/container.xml", CONTAINER)
        .entry("OEBPS/content.opf", package)
        .write(dir.path(), "book.epub");

    assert!(matches!(
        Converter::default().flatten(path),
        Err(ConvertError::Epub(EpubError::EmptyDocument))
    ));
}

#[test]
fn test_inspect() {
    let dir = TempDir::new().unwrap();
    let path = TestEpub::standard().write(dir.path(), "book.epub");

    let inspection = Converter::default().inspect(&path).unwrap();

    assert_eq!(Some("OEBPS/content.opf"), inspection.package_path.as_deref());
    assert_eq!(4, inspection.manifest_len);
    assert_eq!(OrderTier::Spine, inspection.order.tier());
    assert_eq!(["text/ch1.xhtml", "text/ch2.xhtml"], inspection.order.hrefs());
}
