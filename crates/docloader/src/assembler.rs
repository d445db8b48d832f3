//! Final merge of parser output with file name fallbacks.

use std::path::Path;

use crate::{document::Document, metadata::extract_filename_metadata};

/// Completes a parsed [Document].
///
/// Author, title and year still empty after parsing are filled from the file
/// name heuristic. If the title is still empty afterwards it becomes the file
/// name without its extension, so an assembled document always has a title
/// as long as the path has a file name.
pub fn assemble(path: &Path, mut document: Document) -> Document {
    let props = &mut document.properties;
    props.fill_bibliographic(&extract_filename_metadata(path));

    if props.title.is_empty() {
        if let Some(stem) = path.file_stem() {
            props.title = stem.to_string_lossy().into_owned();
        }
    }

    document
}
