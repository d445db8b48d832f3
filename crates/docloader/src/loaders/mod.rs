//! Format detection and the per-format parsers.
//!
//! [Format::from_path] maps a file extension to a [Format]; [Format::parser]
//! hands back the [Parser] for it. Parsers return raw content plus whatever
//! metadata the format carries natively; filename fallbacks are applied
//! afterwards by [assemble](crate::assembler::assemble).

use std::{fmt, path::Path};

use crate::{context::LoadContext, document::Document, error::LoaderError};

pub mod file;
pub mod html;
pub mod text;

#[cfg(feature = "csv")]
pub mod csv;

#[cfg(feature = "epub")]
pub mod epub;

#[cfg(feature = "pdf")]
pub mod pdf;

pub use file::{DocumentFileLoader, FileSource, WorkingDir};
pub use html::HtmlParser;
pub use text::TextParser;

#[cfg(feature = "csv")]
pub use self::csv::CsvParser;

#[cfg(feature = "epub")]
pub use epub::EpubParser;

#[cfg(feature = "pdf")]
pub use pdf::{PdfParser, extract_pdf_metadata, parse_pdf_date};

/// Turns one file of a known format into a [Document].
///
/// Implementations must not fail on missing or malformed metadata, only on
/// unreadable files or (for EPUB) a structurally broken container.
pub trait Parser {
    fn parse(&self, path: &Path, ctx: &LoadContext) -> Result<Document, LoaderError>;
}

/// The closed set of supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Text,
    Markdown,
    Html,
    WebArchive,
    Epub,
    Pdf,
    Csv,
}

impl Format {
    pub const ALL: [Format; 7] = [
        Format::Text,
        Format::Markdown,
        Format::Html,
        Format::WebArchive,
        Format::Epub,
        Format::Pdf,
        Format::Csv,
    ];

    /// Lower-case extensions, without the dot, recognized for this format.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Format::Text => &["txt"],
            Format::Markdown => &["md", "markdown"],
            Format::Html => &["html", "htm"],
            Format::WebArchive => &["webarchive"],
            Format::Epub => &["epub"],
            Format::Pdf => &["pdf"],
            Format::Csv => &["csv"],
        }
    }

    /// Case-insensitive lookup of an extension, with or without its leading dot.
    pub fn from_extension(ext: &str) -> Option<Format> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        Format::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
    }

    /// Detects the format of `path` from its extension alone; the file is not touched.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Format, LoaderError> {
        let ext = path
            .as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();

        Format::from_extension(&ext).ok_or_else(|| {
            LoaderError::UnsupportedFormat(if ext.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{ext}")
            })
        })
    }

    /// The parser for this format, or [LoaderError::UnsupportedFormat] when
    /// the crate was built without the matching feature.
    pub fn parser(self) -> Result<&'static dyn Parser, LoaderError> {
        match self {
            Format::Text | Format::Markdown => Ok(&TextParser),
            Format::Html | Format::WebArchive => Ok(&HtmlParser),
            #[cfg(feature = "epub")]
            Format::Epub => Ok(&EpubParser),
            #[cfg(feature = "pdf")]
            Format::Pdf => Ok(&PdfParser),
            #[cfg(feature = "csv")]
            Format::Csv => Ok(&CsvParser),
            #[allow(unreachable_patterns)]
            other => Err(LoaderError::UnsupportedFormat(format!(
                ".{} (feature disabled)",
                other.extensions().first().copied().unwrap_or_default()
            ))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Text => "text",
            Format::Markdown => "markdown",
            Format::Html => "html",
            Format::WebArchive => "webarchive",
            Format::Epub => "epub",
            Format::Pdf => "pdf",
            Format::Csv => "csv",
        };
        f.write_str(name)
    }
}
