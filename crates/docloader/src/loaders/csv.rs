//! CSV rendered as readable `header: value` blocks, one per row.
//!
//! ```text
//! Row 1:
//! name: Alice
//! age: 30
//!
//! Row 2:
//! name: Bob
//! age: 25
//! ```
//!
//! The rendering is meant for indexing, not for re-serialization. CSV has no
//! in-band title or author, so only the file name contributes metadata.

use std::{fs::File, io::BufReader, path::Path};

use crate::{
    config::CsvConfig,
    context::LoadContext,
    document::Document,
    error::LoaderError,
    metadata::extract_filename_metadata,
};

use super::Parser;

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, ctx: &LoadContext) -> Result<Document, LoaderError> {
        let file = File::open(path).map_err(|err| LoaderError::from_io(path, err))?;
        let mut reader = build_reader(&ctx.config.csv, BufReader::new(file));

        let content = reader_to_document(&mut reader, ctx)?;

        tracing::debug!(target: "docloader", bytes = content.len(), "parsed CSV document");
        Ok(Document::new(content, extract_filename_metadata(path)))
    }
}

fn build_reader<R: std::io::Read>(config: &CsvConfig, reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(config.has_headers)
        .trim(if config.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        })
        .flexible(config.ragged_rows)
        .from_reader(reader)
}

fn reader_to_document<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
    ctx: &LoadContext,
) -> Result<String, LoaderError> {
    let headers: Vec<String> = if reader.has_headers() {
        reader.byte_headers()?.iter().map(lossy).collect()
    } else {
        vec![]
    };

    let mut document_parts: Vec<String> = Vec::new();

    for (row_idx, result) in reader.byte_records().enumerate() {
        ctx.check_cancelled()?;
        let record = result?;
        let row_parts: Vec<String> = record
            .iter()
            .enumerate()
            .map(|(col_idx, value)| {
                let header = headers
                    .get(col_idx)
                    .filter(|h| !h.is_empty())
                    .cloned()
                    .unwrap_or_else(|| format!("column_{col_idx}"));
                format!("{header}: {}", lossy(value))
            })
            .collect();

        if !row_parts.is_empty() {
            document_parts.push(format!("Row {}:\n{}", row_idx + 1, row_parts.join("\n")));
        }
    }

    if document_parts.is_empty() && !headers.is_empty() {
        return Ok(format!("Columns: {}", headers.join(", ")));
    }

    Ok(document_parts.join("\n\n"))
}

fn lossy(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

#[cfg(test)]
mod tests {
    use assert_fs::prelude::{FileWriteBin, FileWriteStr, PathChild};

    use super::*;
    use crate::{config::LoaderConfig, context::CancelSignal};

    fn load_with(name: &str, content: &str, ctx: &LoadContext) -> Result<Document, LoaderError> {
        let temp = assert_fs::TempDir::new().expect("Failed to create temp dir");
        let file = temp.child(name);
        file.write_str(content).expect("Failed to write file");
        CsvParser.parse(file.path(), ctx)
    }

    fn load(name: &str, content: &str) -> Document {
        load_with(name, content, &LoadContext::default()).expect("csv loads")
    }

    #[test]
    fn rows_become_labelled_blocks() {
        let doc = load("data.csv", "name,age,city\nAlice,30,NYC\nBob, 25 ,LA\n");

        assert_eq!(
            doc.content,
            "Row 1:\nname: Alice\nage: 30\ncity: NYC\n\nRow 2:\nname: Bob\nage: 25\ncity: LA"
        );
        assert!(doc.properties.is_bibliographic_empty());
    }

    #[test]
    fn invalid_utf8_fields_are_replaced() {
        let temp = assert_fs::TempDir::new().expect("Failed to create temp dir");
        let file = temp.child("latin1.csv");
        file.write_binary(b"name,city\nJos\xe9,M\xfcnchen\n")
            .expect("Failed to write file");

        let doc = CsvParser
            .parse(file.path(), &LoadContext::default())
            .expect("lossy decode never fails");
        assert_eq!(doc.content, "Row 1:\nname: Jos\u{FFFD}\ncity: M\u{FFFD}nchen");
    }

    #[test]
    fn ragged_rows_are_accepted() {
        let doc = load("ragged.csv", "a,b\n1,2,3\n4\n");
        assert!(doc.content.contains("column_2: 3"));
        assert!(doc.content.contains("Row 2:\na: 4"));
    }

    #[test]
    fn strict_rows_reject_ragged_input() {
        let ctx = LoadContext::default()
            .with_config(LoaderConfig::default().csv(CsvConfig::new().ragged_rows(false)));

        let err = load_with("ragged.csv", "a,b\n1,2,3\n", &ctx).expect_err("ragged row");
        assert!(matches!(err, LoaderError::CsvError(_)));
        if let LoaderError::CsvError(inner) = &err {
            assert_eq!(err.to_string(), inner.to_string());
        }
    }

    #[test]
    fn header_only_lists_columns() {
        let doc = load("empty.csv", "id,name,email\n");
        assert_eq!(doc.content, "Columns: id, name, email");
    }

    #[test]
    fn empty_file_is_empty_content() {
        assert_eq!(load("nothing.csv", "").content, "");
    }

    #[test]
    fn filename_metadata() {
        let doc = load("Author_Title_2024.csv", "a,b\n1,2\n");
        assert_eq!(doc.properties.author, "Author");
        assert_eq!(doc.properties.title, "Title");
        assert_eq!(doc.properties.year, "2024");
    }

    #[test]
    fn tsv_without_headers() {
        let ctx = LoadContext::default()
            .with_config(LoaderConfig::default().csv(CsvConfig::tsv().has_headers(false)));
        let doc = load_with("plain.csv", "x\ty\n", &ctx).expect("tsv loads");
        assert_eq!(doc.content, "Row 1:\ncolumn_0: x\ncolumn_1: y");
    }

    #[test]
    fn cancelled_between_records() {
        let cancel = CancelSignal::new();
        cancel.cancel();
        let ctx = LoadContext::default().with_cancel(cancel);

        let err = load_with("data.csv", "a\n1\n", &ctx).expect_err("cancelled");
        assert!(matches!(err, LoaderError::Cancelled));
    }
}
