//! PDF text per page and the document information dictionary.

use std::{fs, path::Path};

use chrono::NaiveDate;
use lopdf::{Dictionary, Document as PdfDocument, Object};

use crate::{
    context::LoadContext,
    document::{Document, Properties},
    error::LoaderError,
    metadata::split_keywords,
};

use super::Parser;

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfParser;

impl Parser for PdfParser {
    fn parse(&self, path: &Path, ctx: &LoadContext) -> Result<Document, LoaderError> {
        let bytes = fs::read(path).map_err(|err| LoaderError::from_io(path, err))?;
        let pdf = PdfDocument::load_mem(&bytes)?;
        ctx.check_cancelled()?;

        let mut pages = Vec::new();
        for page_number in pdf.get_pages().into_keys() {
            ctx.check_cancelled()?;
            match pdf.extract_text(&[page_number]) {
                Ok(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        pages.push(text.to_string());
                    }
                }
                Err(err) => {
                    tracing::warn!(target: "docloader", page = page_number, "skipping unreadable PDF page: {err}");
                }
            }
        }

        let props = extract_pdf_metadata(Some(&pdf));
        tracing::debug!(
            target: "docloader",
            pages = pages.len(),
            title = %props.title,
            "parsed PDF document"
        );
        Ok(Document::new(pages.join("\n"), props))
    }
}

/// Reads title, author, subject, keywords and creation date from the PDF
/// information dictionary. `None` or a document without one yields empty
/// properties.
pub fn extract_pdf_metadata(pdf: Option<&PdfDocument>) -> Properties {
    let Some((pdf, info)) = pdf.and_then(|pdf| Some((pdf, info_dictionary(pdf)?))) else {
        return Properties::default();
    };
    let field = |key: &[u8]| text_entry(pdf, info, key).unwrap_or_default();

    let mut props = Properties {
        title: field(b"Title"),
        author: field(b"Author"),
        r#abstract: field(b"Subject"),
        keywords: split_keywords(&field(b"Keywords"), &[',', ';']),
        ..Default::default()
    };

    let created = field(b"CreationDate");
    props.publish_at = parse_pdf_date(&created);
    if props.publish_at != 0 {
        props.year = created
            .get(2..6)
            .filter(|year| year.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or_default()
            .to_string();
    }
    props
}

fn info_dictionary(pdf: &PdfDocument) -> Option<&Dictionary> {
    let info = resolve(pdf, pdf.trailer.get(b"Info").ok()?)?;
    info.as_dict().ok()
}

fn resolve<'a>(pdf: &'a PdfDocument, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => pdf.get_object(*id).ok(),
        other => Some(other),
    }
}

fn text_entry(pdf: &PdfDocument, info: &Dictionary, key: &[u8]) -> Option<String> {
    let bytes = resolve(pdf, info.get(key).ok()?)?.as_str().ok()?;
    let text = decode_pdf_text(bytes);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Decodes a PDF text string: UTF-16BE with a byte order mark, UTF-8, or
/// single-byte Latin-1 as a last resort.
fn decode_pdf_text(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| match pair {
                [hi, lo] => u16::from_be_bytes([*hi, *lo]),
                _ => 0xFFFD,
            })
            .collect();
        return String::from_utf16_lossy(&units);
    }
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Parses a PDF date string (`D:YYYYMMDDHHmmSSOHH'mm'`) into Unix seconds.
///
/// At least the date (`D:YYYYMMDD`) must be present; time fields default to
/// zero and the zone defaults to UTC. Returns 0 for anything unparsable.
pub fn parse_pdf_date(raw: &str) -> i64 {
    let Some(rest) = raw.trim().strip_prefix("D:") else {
        return 0;
    };
    let digits_len = rest.chars().take_while(char::is_ascii_digit).count();
    if digits_len < 8 {
        return 0;
    }
    let (digits, zone) = rest.split_at(digits_len);

    let number = |range: std::ops::Range<usize>, default: u32| -> u32 {
        digits
            .get(range)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    };
    let year = number(0..4, 0) as i32;
    let Some(timestamp) = NaiveDate::from_ymd_opt(year, number(4..6, 1), number(6..8, 1))
        .and_then(|date| date.and_hms_opt(number(8..10, 0), number(10..12, 0), number(12..14, 0)))
        .map(|time| time.and_utc().timestamp())
    else {
        return 0;
    };

    zone_offset_seconds(zone).map_or(0, |offset| timestamp - offset)
}

/// Seconds east of UTC for a `Z`, `+HH'mm'` or `-HH'mm'` suffix.
///
/// `None` when the hours or minutes are not a valid clock offset.
fn zone_offset_seconds(zone: &str) -> Option<i64> {
    let sign = match zone.chars().next() {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Some(0),
    };
    let mut fields = zone
        .get(1..)
        .unwrap_or_default()
        .split('\'')
        .map(str::trim)
        .filter(|part| !part.is_empty());
    let hours: i64 = match fields.next() {
        Some(part) => part.parse().ok().filter(|h| (0..=23).contains(h))?,
        None => 0,
    };
    let minutes: i64 = match fields.next() {
        Some(part) => part.parse().ok().filter(|m| (0..=59).contains(m))?,
        None => 0,
    };
    Some(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use assert_fs::prelude::PathChild;
    use lopdf::{
        Stream, StringFormat,
        content::{Content, Operation},
        dictionary,
    };

    use super::*;
    use crate::context::CancelSignal;

    fn build_pdf(info: Option<Dictionary>) -> PdfDocument {
        let mut doc = PdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 48.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal("Hello World!")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content encodes"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        if let Some(info) = info {
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", info_id);
        }
        doc
    }

    fn sample_info() -> Dictionary {
        dictionary! {
            "Title" => Object::string_literal("Quarterly Report"),
            "Author" => Object::string_literal("Jane Doe"),
            "Subject" => Object::string_literal("Numbers for Q1"),
            "Keywords" => Object::string_literal("finance, q1; report"),
            "CreationDate" => Object::string_literal("D:20240115123045Z"),
        }
    }

    #[test]
    fn pdf_dates() {
        assert_eq!(parse_pdf_date("D:20240115123045"), 1_705_321_845);
        assert_eq!(parse_pdf_date("D:20240115"), 1_705_276_800);
        assert_eq!(parse_pdf_date("D:20230115103000+02'00'"), 1_673_771_400);
        assert_eq!(parse_pdf_date("D:20230115103000-05'30'"), 1_673_798_400);
        assert_eq!(parse_pdf_date("2024-01-15"), 0);
        assert_eq!(parse_pdf_date("D:2024"), 0);
        assert_eq!(parse_pdf_date("D:20241345"), 0);
        assert_eq!(parse_pdf_date("D:20240115Z"), 1_705_276_800);
        assert_eq!(parse_pdf_date("D:20240115+9999999999999999'00'"), 0);
        assert_eq!(parse_pdf_date("D:20240115-24'00'"), 0);
        assert_eq!(parse_pdf_date("D:20240115+01'75'"), 0);
        assert_eq!(parse_pdf_date(""), 0);
    }

    #[test]
    fn no_document_no_metadata() {
        assert_eq!(extract_pdf_metadata(None), Properties::default());
        assert_eq!(
            extract_pdf_metadata(Some(&build_pdf(None))),
            Properties::default()
        );
    }

    #[test]
    fn info_dictionary_fields() {
        let pdf = build_pdf(Some(sample_info()));
        let props = extract_pdf_metadata(Some(&pdf));

        assert_eq!(props.title, "Quarterly Report");
        assert_eq!(props.author, "Jane Doe");
        assert_eq!(props.r#abstract, "Numbers for Q1");
        assert_eq!(props.keywords, vec!["finance", "q1", "report"]);
        assert_eq!(props.year, "2024");
        assert_eq!(props.publish_at, 1_705_321_845);
    }

    #[test]
    fn text_string_encodings() {
        assert_eq!(decode_pdf_text(&[0xFE, 0xFF, 0x00, b'H', 0x00, b'i']), "Hi");
        assert_eq!(decode_pdf_text(b"plain"), "plain");
        assert_eq!(decode_pdf_text(&[b'c', b'a', b'f', 0xE9]), "café");

        let utf16 = Object::String(vec![0xFE, 0xFF, 0x4E, 0x2D], StringFormat::Hexadecimal);
        let pdf = build_pdf(Some(dictionary! { "Title" => utf16 }));
        assert_eq!(extract_pdf_metadata(Some(&pdf)).title, "中");
    }

    #[test]
    fn load_pages_and_metadata() {
        let temp = assert_fs::TempDir::new().expect("Failed to create temp dir");
        let file = temp.child("report.pdf");
        build_pdf(Some(sample_info()))
            .save(file.path())
            .expect("Failed to save pdf");

        let doc = PdfParser
            .parse(file.path(), &LoadContext::default())
            .expect("pdf loads");
        assert!(doc.content.contains("Hello World"), "{:?}", doc.content);
        assert_eq!(doc.properties.title, "Quarterly Report");
    }

    #[test]
    fn garbage_is_an_error() {
        let temp = assert_fs::TempDir::new().expect("Failed to create temp dir");
        let file = temp.child("broken.pdf");
        std::fs::write(file.path(), b"not a pdf").expect("Failed to write file");

        let err = PdfParser
            .parse(file.path(), &LoadContext::default())
            .expect_err("not a pdf");
        assert!(matches!(err, LoaderError::PdfError(_)));
    }

    #[test]
    fn cancelled_before_pages() {
        let temp = assert_fs::TempDir::new().expect("Failed to create temp dir");
        let file = temp.child("report.pdf");
        build_pdf(None).save(file.path()).expect("Failed to save pdf");

        let cancel = CancelSignal::new();
        cancel.cancel();
        let err = PdfParser
            .parse(file.path(), &LoadContext::default().with_cancel(cancel))
            .expect_err("cancelled");
        assert!(matches!(err, LoaderError::Cancelled));
    }
}
