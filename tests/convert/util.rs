use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

pub const CONTAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// Spine: `c1`, `ghost` (not within the manifest), `c2`
pub const PACKAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Example</dc:title>
  </metadata>
  <manifest>
    <item id="c1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="c2" href="text/ch2.xhtml" media-type="application/xhtml+xml"/>
    <item id="css" href="styles/main.css" media-type="text/css"/>
    <item id="cover" href="images/cover.jpg" media-type="image/jpeg"/>
  </manifest>
  <spine>
    <itemref idref="c1"/>
    <itemref idref="ghost"/>
    <itemref idref="c2"/>
  </spine>
</package>"#;

/// References `images/cover.jpg` relative to the package directory
pub const CHAPTER_1: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><link rel="stylesheet" type="text/css" href="../styles/main.css"/></head>
<body><p>First</p><img src="images/cover.jpg" alt="cover"/></body>
</html>"#;

pub const CHAPTER_2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<body><p>Second</p><img src="missing.png"/></body>
</html>"#;

/// Builder of an `.epub` written out for each test.
#[derive(Default)]
pub struct TestEpub {
    entries: Vec<(String, Vec<u8>)>,
}

impl TestEpub {
    /// Contains only the `mimetype` entry.
    pub fn new() -> Self {
        Self::default().entry("mimetype", "application/epub+zip")
    }

    /// A well-formed EPUB with two chapters, a stylesheet and a cover image.
    pub fn standard() -> Self {
        Self::new()
            .entry("META-INF/container.xml", CONTAINER)
            .entry("OEBPS/content.opf", PACKAGE)
            .entry("OEBPS/text/ch1.xhtml", CHAPTER_1)
            .entry("OEBPS/text/ch2.xhtml", CHAPTER_2)
            .entry("OEBPS/styles/main.css", "p { margin: 0; }")
            .entry("OEBPS/images/cover.jpg", [0xFF, 0xD8, 0xFF, 0xE0])
    }

    pub fn entry(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.entries.push((name.to_owned(), content.as_ref().to_vec()));
        self
    }

    /// Writes the archive to `dir/file_name`, returning its path.
    pub fn write(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());

        for (name, content) in &self.entries {
            let options = if name == "mimetype" {
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
            } else {
                SimpleFileOptions::default()
            };
            writer.start_file(name.as_str(), options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
        path
    }
}

/// The `file:///` URL an extracted resource is expected to be rewritten to.
pub fn file_url(root: &Path, file: &str) -> String {
    let path = root.join(file).to_string_lossy().replace('\\', "/");
    format!("file:///{}", path.trim_start_matches('/'))
}
