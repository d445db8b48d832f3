//! docloader turns a file on disk into a [Document]: plain text content plus a
//! [Properties] record of bibliographic metadata.
//!
//! # Table of contents
//!
//! - [Supported formats](#supported-formats)
//! - [Simple example](#simple-example)
//! - [Core concepts](#core-concepts)
//!
//! # Supported formats
//! | Format     | Extensions              | Feature |
//! |------------|-------------------------|---------|
//! | Text       | `.txt`                  |         |
//! | Markdown   | `.md`, `.markdown`      |         |
//! | HTML       | `.html`, `.htm`         |         |
//! | Web archive| `.webarchive`           |         |
//! | EPUB       | `.epub`                 | `epub`  |
//! | PDF        | `.pdf`                  | `pdf`   |
//! | CSV        | `.csv`                  | `csv`   |
//!
//! # Simple example:
//! ```rust,ignore
//! use docloader::{LoadContext, load_document};
//!
//! let doc = load_document("books/Jane Doe - Rust in Practice (2024).pdf", &LoadContext::default())?;
//! println!("{} by {} ({})", doc.properties.title, doc.properties.author, doc.properties.year);
//! ```
//!
//! # Core concepts
//! ## Dispatch and assembly
//! [load_document] detects the [Format] from the extension, runs its
//! [Parser](loaders::Parser) and hands the result to
//! [assemble](assembler::assemble), which fills gaps from the file name. The
//! title of an assembled document is never empty.
//!
//! ## Best-effort metadata
//! Missing or malformed metadata never fails a load; the matching fields are
//! simply left empty. Only unreadable files, unknown extensions, cancellation
//! and structurally broken EPUB containers are errors ([LoaderError]).
//!
//! ## Context
//! Each call takes a [LoadContext] carrying the [LoaderConfig], a
//! [CancelSignal] and the `tracing` span every event of the call is recorded
//! under. There is no global state.

pub mod assembler;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod loaders;
pub mod metadata;

use std::path::Path;

pub use config::{CsvConfig, LoaderConfig};
pub use context::{CancelSignal, LoadContext};
pub use document::{Document, Properties};
pub use error::LoaderError;
pub use loaders::{DocumentFileLoader, FileSource, Format, WorkingDir};
pub use metadata::{
    extract_content_metadata, extract_filename_metadata, extract_html_metadata,
    generate_content_abstract, strip_html_tags,
};

/// Loads the file at `path` into a [Document].
///
/// The format is chosen from the extension before any IO happens, so an
/// unknown extension fails with [LoaderError::UnsupportedFormat] even for a
/// missing file.
pub fn load_document(path: impl AsRef<Path>, ctx: &LoadContext) -> Result<Document, LoaderError> {
    let path = path.as_ref();
    let _span = ctx.span().enter();

    let format = Format::from_path(path)?;
    ctx.check_cancelled()?;

    tracing::debug!(target: "docloader", path = %path.display(), %format, "loading document");
    let document = format.parser()?.parse(path, ctx)?;
    let document = assembler::assemble(path, document);

    tracing::info!(
        target: "docloader",
        path = %path.display(),
        title = %document.properties.title,
        bytes = document.content.len(),
        "document loaded"
    );
    Ok(document)
}
