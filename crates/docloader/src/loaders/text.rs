use std::{fs, path::Path};

use crate::{
    context::LoadContext,
    document::{Document, Properties},
    error::LoaderError,
    metadata::{ContentHeuristic, extract_filename_metadata, heading_title},
};

use super::Parser;

/// Plain text and Markdown.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected. A
/// Markdown H1 is the strongest title signal; the file name comes next and
/// the first title-like line of the body last.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextParser;

impl Parser for TextParser {
    fn parse(&self, path: &Path, ctx: &LoadContext) -> Result<Document, LoaderError> {
        let bytes = fs::read(path).map_err(|err| LoaderError::from_io(path, err))?;
        ctx.check_cancelled()?;

        let content = String::from_utf8_lossy(&bytes).into_owned();

        let mut props = Properties {
            title: heading_title(&content).unwrap_or_default(),
            ..Default::default()
        };
        props.fill_bibliographic(&extract_filename_metadata(path));

        let heuristic = ContentHeuristic {
            min_title_chars: ctx.config.min_title_chars,
            abstract_limit: ctx.config.abstract_limit,
        };
        let props = heuristic.apply(&content, props);

        tracing::debug!(
            target: "docloader",
            bytes = content.len(),
            title = %props.title,
            "parsed text document"
        );
        Ok(Document::new(content, props))
    }
}
