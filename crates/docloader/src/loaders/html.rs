//! HTML pages and Safari `.webarchive` files.

use std::{borrow::Cow, fs, path::Path};

use base64::{Engine, engine::general_purpose::STANDARD};
use lazy_static::lazy_static;
use regex::bytes::Regex;
use scraper::Html;

use crate::{
    context::LoadContext,
    document::Document,
    error::LoaderError,
    metadata::html::{clutter_free_text, generate_content_abstract_with_limit, metadata_from_document},
};

use super::Parser;

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("webarchive pattern is a valid regex")
}

lazy_static! {
    static ref RESOURCE_DATA: Regex =
        compile(r"(?s)<key>WebResourceData</key>\s*<data>([^<]*)</data>");
    static ref HTML_START: Regex = compile(r"(?i)<!doctype html|<html");
    static ref HTML_END: Regex = compile(r"(?i)</html\s*>");
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl Parser for HtmlParser {
    fn parse(&self, path: &Path, ctx: &LoadContext) -> Result<Document, LoaderError> {
        let bytes = fs::read(path).map_err(|err| LoaderError::from_io(path, err))?;
        ctx.check_cancelled()?;

        let markup = decode_markup(&bytes);
        let document = Html::parse_document(&markup);

        let mut props = metadata_from_document(&document);
        let content = clutter_free_text(&document);
        if props.r#abstract.is_empty() {
            props.r#abstract = generate_content_abstract_with_limit(&markup, ctx.config.abstract_limit);
        }

        tracing::debug!(
            target: "docloader",
            bytes = content.len(),
            title = %props.title,
            "parsed HTML document"
        );
        Ok(Document::new(content, props))
    }
}

/// The HTML markup held by `bytes`, unwrapping a webarchive property list if needed.
pub fn decode_markup(bytes: &[u8]) -> Cow<'_, str> {
    if is_property_list(bytes) {
        if let Some(html) = webarchive_main_resource(bytes) {
            return Cow::Owned(html);
        }
        tracing::warn!(target: "docloader", "webarchive without a readable main resource");
    }
    String::from_utf8_lossy(bytes)
}

fn is_property_list(bytes: &[u8]) -> bool {
    let head = bytes.get(..512).unwrap_or(bytes);
    head.starts_with(b"bplist") || head.windows(6).any(|w| w == b"<plist")
}

/// Extracts the main resource of a webarchive.
///
/// XML property lists carry it base64 encoded under `WebResourceData`;
/// binary ones store it verbatim, so the outermost `<html>…</html>` span is
/// taken instead.
fn webarchive_main_resource(bytes: &[u8]) -> Option<String> {
    if let Some(encoded) = RESOURCE_DATA.captures(bytes).and_then(|caps| caps.get(1)) {
        let cleaned: Vec<u8> = encoded
            .as_bytes()
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        match STANDARD.decode(cleaned) {
            Ok(decoded) => return Some(String::from_utf8_lossy(&decoded).into_owned()),
            Err(err) => {
                tracing::warn!(target: "docloader", "cannot decode webarchive resource: {err}");
            }
        }
    }

    let start = HTML_START.find(bytes)?.start();
    let end = HTML_END
        .find_iter(bytes)
        .last()
        .map_or(bytes.len(), |m| m.end());
    let html = bytes.get(start..end.max(start))?;
    Some(String::from_utf8_lossy(html).into_owned())
}
