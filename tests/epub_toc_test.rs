//! End-to-end tests for EPUB table-of-contents resolution.
//!
//! Containers are built on the fly so each case controls its own manifest,
//! spine, and nav map.

use std::io::Write;
use std::path::PathBuf;

use bindery::{Error, TocEntry, epub};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

fn build_epub(dir: &TempDir, name: &str, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.path().join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = ZipWriter::new(file);

    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let deflated =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(b"application/epub+zip").unwrap();
    for (entry_name, content) in entries {
        zip.start_file(*entry_name, deflated).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    path
}

fn opf(manifest: &str, spine: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="uid">
  <manifest>
{manifest}
  </manifest>
  <spine toc="toc">
{spine}
  </spine>
</package>"#
    )
}

fn ncx(points: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <docTitle><text>Test Book</text></docTitle>
  <navMap>
{points}
  </navMap>
</ncx>"#
    )
}

fn basic_epub(dir: &TempDir) -> PathBuf {
    build_epub(
        dir,
        "book.epub",
        &[
            ("META-INF/container.xml", CONTAINER_XML),
            (
                "OEBPS/content.opf",
                &opf(
                    r#"    <item id="chap1" href="Text/c1.xhtml" media-type="application/xhtml+xml"/>
    <item id="toc" href="Text/toc.ncx" media-type="application/x-dtbncx+xml"/>"#,
                    r#"    <itemref idref="chap1"/>"#,
                ),
            ),
            (
                "OEBPS/Text/toc.ncx",
                &ncx(
                    r#"    <navPoint id="n1"><navLabel><text>Chapter 1</text></navLabel><content src="c1.xhtml"/></navPoint>"#,
                ),
            ),
        ],
    )
}

#[test]
fn test_single_chapter_resolves_to_page_one() {
    let dir = TempDir::new().unwrap();
    let path = basic_epub(&dir);

    let entries = epub::resolve_toc(&path).expect("resolution failed");
    assert_eq!(entries, vec![TocEntry::new(1, "Chapter 1", 1)]);
}

#[test]
fn test_extract_toc_writes_quoted_csv_beside_input() {
    let dir = TempDir::new().unwrap();
    let path = basic_epub(&dir);

    let (output, count) = epub::extract_toc(&path).expect("extraction failed");
    assert_eq!(count, 1);
    assert_eq!(output, dir.path().join("book_toc.txt"));
    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, "\"1\",\"Chapter 1\",\"1\"\n");
}

#[test]
fn test_fragment_is_stripped_before_resolution() {
    let dir = TempDir::new().unwrap();
    let path = build_epub(
        &dir,
        "book.epub",
        &[
            ("META-INF/container.xml", CONTAINER_XML),
            (
                "OEBPS/content.opf",
                &opf(
                    r#"    <item id="chap1" href="Text/c1.xhtml" media-type="application/xhtml+xml"/>
    <item id="toc" href="toc.ncx" media-type="application/x-dtbncx+xml"/>"#,
                    r#"    <itemref idref="chap1"/>"#,
                ),
            ),
            (
                "OEBPS/toc.ncx",
                &ncx(
                    r#"    <navPoint id="n1"><navLabel><text>Intro</text></navLabel><content src="Text/c1.xhtml#sec2"/></navPoint>
    <navPoint id="n2"><navLabel><text>Also intro</text></navLabel><content src="Text/c1.xhtml"/></navPoint>"#,
                ),
            ),
        ],
    );

    let entries = epub::resolve_toc(&path).unwrap();
    assert_eq!(
        entries,
        vec![
            TocEntry::new(1, "Intro", 1),
            TocEntry::new(1, "Also intro", 1),
        ]
    );
}

#[test]
fn test_unresolved_target_is_dropped_not_fatal() {
    let dir = TempDir::new().unwrap();
    let path = build_epub(
        &dir,
        "book.epub",
        &[
            ("META-INF/container.xml", CONTAINER_XML),
            (
                "OEBPS/content.opf",
                &opf(
                    r#"    <item id="chap1" href="Text/c1.xhtml" media-type="application/xhtml+xml"/>
    <item id="toc" href="Text/toc.ncx" media-type="application/x-dtbncx+xml"/>"#,
                    r#"    <itemref idref="chap1"/>"#,
                ),
            ),
            (
                "OEBPS/Text/toc.ncx",
                &ncx(
                    r#"    <navPoint id="n1"><navLabel><text>Ghost</text></navLabel><content src="missing.xhtml"/></navPoint>
    <navPoint id="n2"><navLabel><text>Chapter 1</text></navLabel><content src="c1.xhtml"/></navPoint>"#,
                ),
            ),
        ],
    );

    let entries = epub::resolve_toc(&path).unwrap();
    assert_eq!(entries, vec![TocEntry::new(1, "Chapter 1", 1)]);
}

#[test]
fn test_nested_points_flatten_to_level_one() {
    let dir = TempDir::new().unwrap();
    let path = build_epub(
        &dir,
        "book.epub",
        &[
            ("META-INF/container.xml", CONTAINER_XML),
            (
                "OEBPS/content.opf",
                &opf(
                    r#"    <item id="c1" href="c1.xhtml" media-type="application/xhtml+xml"/>
    <item id="c2" href="c2.xhtml" media-type="application/xhtml+xml"/>
    <item id="toc" href="toc.ncx" media-type="application/x-dtbncx+xml"/>"#,
                    r#"    <itemref idref="c1"/>
    <itemref idref="c2"/>"#,
                ),
            ),
            (
                "OEBPS/toc.ncx",
                &ncx(
                    r#"    <navPoint id="n1"><navLabel><text>Part I</text></navLabel><content src="c1.xhtml"/>
      <navPoint id="n2"><navLabel><text>Chapter 2</text></navLabel><content src="c2.xhtml"/></navPoint>
    </navPoint>"#,
                ),
            ),
        ],
    );

    let entries = epub::resolve_toc(&path).unwrap();
    assert_eq!(
        entries,
        vec![
            TocEntry::new(1, "Part I", 1),
            TocEntry::new(1, "Chapter 2", 2),
        ]
    );
}

#[test]
fn test_duplicate_spine_reference_takes_later_page() {
    let dir = TempDir::new().unwrap();
    let path = build_epub(
        &dir,
        "book.epub",
        &[
            ("META-INF/container.xml", CONTAINER_XML),
            (
                "OEBPS/content.opf",
                &opf(
                    r#"    <item id="c1" href="c1.xhtml" media-type="application/xhtml+xml"/>
    <item id="c2" href="c2.xhtml" media-type="application/xhtml+xml"/>
    <item id="toc" href="toc.ncx" media-type="application/x-dtbncx+xml"/>"#,
                    r#"    <itemref idref="c1"/>
    <itemref idref="c2"/>
    <itemref idref="c1"/>"#,
                ),
            ),
            (
                "OEBPS/toc.ncx",
                &ncx(
                    r#"    <navPoint id="n1"><navLabel><text>Repeated</text></navLabel><content src="c1.xhtml"/></navPoint>"#,
                ),
            ),
        ],
    );

    let entries = epub::resolve_toc(&path).unwrap();
    assert_eq!(entries, vec![TocEntry::new(1, "Repeated", 3)]);
}

#[test]
fn test_missing_root_descriptor_is_fatal_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = build_epub(&dir, "book.epub", &[("OEBPS/content.opf", "<package/>")]);

    let result = epub::extract_toc(&path);
    assert!(matches!(result, Err(Error::MissingElement(_))));
    assert!(!dir.path().join("book_toc.txt").exists());
}

#[test]
fn test_missing_ncx_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = build_epub(
        &dir,
        "book.epub",
        &[
            ("META-INF/container.xml", CONTAINER_XML),
            (
                "OEBPS/content.opf",
                &opf(
                    r#"    <item id="c1" href="c1.xhtml" media-type="application/xhtml+xml"/>"#,
                    r#"    <itemref idref="c1"/>"#,
                ),
            ),
        ],
    );

    assert!(matches!(
        epub::resolve_toc(&path),
        Err(Error::MissingElement(_))
    ));
}

#[test]
fn test_resolution_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let path = basic_epub(&dir);

    let first = epub::resolve_toc(&path).unwrap();
    let second = epub::resolve_toc(&path).unwrap();
    assert_eq!(first, second);

    let (output, _) = epub::extract_toc(&path).unwrap();
    let bytes_first = std::fs::read(&output).unwrap();
    let (output, _) = epub::extract_toc(&path).unwrap();
    let bytes_second = std::fs::read(&output).unwrap();
    assert_eq!(bytes_first, bytes_second);
}

#[test]
fn test_relative_targets_normalize_across_directories() {
    let dir = TempDir::new().unwrap();
    let path = build_epub(
        &dir,
        "book.epub",
        &[
            ("META-INF/container.xml", CONTAINER_XML),
            (
                "OEBPS/content.opf",
                &opf(
                    r#"    <item id="c1" href="Text/c1.xhtml" media-type="application/xhtml+xml"/>
    <item id="toc" href="ncx/toc.ncx" media-type="application/x-dtbncx+xml"/>"#,
                    r#"    <itemref idref="c1"/>"#,
                ),
            ),
            (
                "OEBPS/ncx/toc.ncx",
                &ncx(
                    r#"    <navPoint id="n1"><navLabel><text>Chapter 1</text></navLabel><content src="../Text/c1.xhtml"/></navPoint>"#,
                ),
            ),
        ],
    );

    let entries = epub::resolve_toc(&path).unwrap();
    assert_eq!(entries, vec![TocEntry::new(1, "Chapter 1", 1)]);
}
