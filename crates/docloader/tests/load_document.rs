//! End-to-end tests for `load_document`.
//!
//! These tests verify that:
//! - Every supported format goes through detection, parsing and assembly
//! - Format metadata wins over file name metadata, which wins over the bare stem
//! - Broken inputs fail with the right `LoaderError` variant
//! - Cancellation stops a load before any parsing happens

use std::{fs, io::Write, path::Path};

use anyhow::Result;
use docloader::{CancelSignal, LoadContext, LoaderError, load_document};
use lopdf::{Object, dictionary};
use serde_json::json;
use zip::{ZipWriter, write::SimpleFileOptions};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn write_epub(path: &Path, title: Option<&str>) -> Result<()> {
    let title = title
        .map(|t| format!("<dc:title>{t}</dc:title>"))
        .unwrap_or_default();
    let opf = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    {title}
    <dc:creator>Test Author</dc:creator>
    <dc:date>2020-03-01</dc:date>
  </metadata>
  <manifest>
    <item id="chapter1" href="chapter1.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="chapter1"/>
  </spine>
</package>"#
    );

    let mut zip = ZipWriter::new(fs::File::create(path)?);
    let options = SimpleFileOptions::default();
    for (name, body) in [
        ("mimetype", "application/epub+zip".to_string()),
        (
            "META-INF/container.xml",
            r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles><rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles>
</container>"#
                .to_string(),
        ),
        ("OEBPS/content.opf", opf),
        (
            "OEBPS/chapter1.xhtml",
            "<html><body><h1>Chapter 1</h1><p>This is the content.</p></body></html>".to_string(),
        ),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }
    zip.finish()?;
    Ok(())
}

fn write_pdf(path: &Path) -> Result<()> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Annual Figures"),
        "Author" => Object::string_literal("Finance Team"),
        "CreationDate" => Object::string_literal("D:20230115103000+02'00'"),
    });
    doc.trailer.set("Info", info_id);
    doc.save(path)?;
    Ok(())
}

#[test]
fn unsupported_format_is_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("test.xyz");
    fs::write(&path, "test content")?;

    let err = load_document(&path, &LoadContext::default()).expect_err("xyz is unsupported");
    assert!(matches!(err, LoaderError::UnsupportedFormat(_)));

    let err = load_document(dir.path().join("absent.xyz"), &LoadContext::default())
        .expect_err("detected before IO");
    assert!(matches!(err, LoaderError::UnsupportedFormat(_)));
    Ok(())
}

#[test]
fn missing_file_is_not_found() {
    let err = load_document("/nonexistent/file.txt", &LoadContext::default())
        .expect_err("missing file");
    assert!(matches!(err, LoaderError::NotFound(_)));
    assert!(err.to_string().contains("/nonexistent/file.txt"));
}

#[test]
fn text_with_h1() -> Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("test.txt");
    fs::write(&path, "# Title\n\nThis is test content.")?;

    let doc = load_document(&path, &LoadContext::new().with_job_id("job-42"))?;
    assert_eq!(doc.properties.title, "Title");
    assert_eq!(doc.properties.r#abstract, "This is test content.");

    let results = doc.to_results(&path.to_string_lossy());
    assert_eq!(results["file_path"], json!(path.to_string_lossy()));
    assert_eq!(results["document"]["properties"]["title"], json!("Title"));
    assert!(
        results["document"]["content"]
            .as_str()
            .is_some_and(|c| c.contains("test content"))
    );
    Ok(())
}

#[test]
fn markdown_title() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("test.md");
    fs::write(&path, "# Markdown Document Title\n\nSome **bold** text.")?;

    let doc = load_document(&path, &LoadContext::default())?;
    assert_eq!(doc.properties.title, "Markdown Document Title");
    Ok(())
}

#[test]
fn stem_becomes_default_title() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("my_custom_file.txt");
    fs::write(&path, "abc")?;

    let doc = load_document(&path, &LoadContext::default())?;
    assert_eq!(doc.properties.title, "my_custom_file");
    Ok(())
}

#[test]
fn html_metadata() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("test.html");
    fs::write(
        &path,
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Test HTML Document</title>
    <meta name="author" content="Test Author">
    <meta property="og:title" content="OG Title">
</head>
<body><article><p>HTML content here.</p></article></body>
</html>"#,
    )?;

    let doc = load_document(&path, &LoadContext::default())?;
    assert_eq!(doc.properties.author, "Test Author");
    assert_eq!(doc.properties.title, "OG Title");
    assert_eq!(doc.properties.r#abstract, "HTML content here.");
    assert!(doc.content.contains("HTML content here."));
    Ok(())
}

#[test]
fn epub_metadata_and_chapters() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("test.epub");
    write_epub(&path, Some("Test Book"))?;

    let doc = load_document(&path, &LoadContext::default())?;
    assert_eq!(doc.properties.title, "Test Book");
    assert_eq!(doc.properties.author, "Test Author");
    assert_eq!(doc.properties.year, "2020");
    assert_eq!(doc.properties.publish_at, 1_583_020_800);
    assert_eq!(doc.content, "Chapter 1\nThis is the content.");
    Ok(())
}

#[test]
fn untitled_epub_falls_back_to_stem() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nameless-book.epub");
    write_epub(&path, None)?;

    let doc = load_document(&path, &LoadContext::default())?;
    assert_eq!(doc.properties.title, "nameless-book");
    Ok(())
}

#[test]
fn invalid_epub_is_an_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("invalid.epub");
    fs::write(&path, "not a valid epub")?;

    let err = load_document(&path, &LoadContext::default()).expect_err("not a zip");
    assert!(matches!(err, LoaderError::MalformedArchive(_)));
    Ok(())
}

#[test]
fn pdf_info_dictionary() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("figures.pdf");
    write_pdf(&path)?;

    let doc = load_document(&path, &LoadContext::default())?;
    assert_eq!(doc.properties.title, "Annual Figures");
    assert_eq!(doc.properties.author, "Finance Team");
    assert_eq!(doc.properties.year, "2023");
    assert_eq!(doc.properties.publish_at, 1_673_771_400);
    Ok(())
}

#[test]
fn csv_filename_metadata() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Author_Title_2024.csv");
    fs::write(&path, "name,age,city\nAlice,30,NYC\nBob,25,LA\n")?;

    let doc = load_document(&path, &LoadContext::default())?;
    assert_eq!(doc.properties.author, "Author");
    assert_eq!(doc.properties.title, "Title");
    assert_eq!(doc.properties.year, "2024");
    assert!(doc.content.contains("name: Alice"));
    Ok(())
}

#[test]
fn cancelled_before_dispatch() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("test.txt");
    fs::write(&path, "# Title")?;

    let cancel = CancelSignal::new();
    let ctx = LoadContext::default().with_cancel(cancel.clone());
    cancel.cancel();

    let err = load_document(&path, &ctx).expect_err("cancelled");
    assert!(matches!(err, LoaderError::Cancelled));
    Ok(())
}

#[test]
fn concurrent_loads_are_independent() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let paths: Vec<_> = (0..4)
        .map(|i| {
            let path = dir.path().join(format!("doc{i}.md"));
            fs::write(&path, format!("# Document number {i}\n\nBody {i}."))?;
            Ok(path)
        })
        .collect::<Result<_>>()?;

    let handles: Vec<_> = paths
        .into_iter()
        .map(|path| std::thread::spawn(move || load_document(&path, &LoadContext::default())))
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let doc = handle.join().expect("thread panicked")?;
        assert_eq!(doc.properties.title, format!("Document number {i}"));
    }
    Ok(())
}
