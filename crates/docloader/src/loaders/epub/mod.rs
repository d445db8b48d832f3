//! EPUB books: Dublin Core metadata from the OPF package and the text of
//! every spine chapter in reading order.
//!
//! A broken container is a hard error ([LoaderError::MalformedArchive]);
//! a single unreadable chapter is only skipped.

mod errors;
mod package;

use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};

use zip::{ZipArchive, result::ZipError};

pub use errors::EpubError;

use crate::{
    context::LoadContext, document::Document, error::LoaderError, metadata::strip_html_tags,
};

use self::package::{Package, resolve_href, rootfile_path};
use super::Parser;

const CONTAINER_PATH: &str = "META-INF/container.xml";

#[derive(Debug, Clone, Copy, Default)]
pub struct EpubParser;

impl Parser for EpubParser {
    fn parse(&self, path: &Path, ctx: &LoadContext) -> Result<Document, LoaderError> {
        let file = File::open(path).map_err(|err| LoaderError::from_io(path, err))?;
        let mut archive = ZipArchive::new(BufReader::new(file)).map_err(EpubError::from)?;
        ctx.check_cancelled()?;

        let opf_path = rootfile_path(&read_entry(&mut archive, CONTAINER_PATH)?)?;
        let package = Package::parse(&read_entry(&mut archive, &opf_path)?)?;

        let mut chapters = Vec::with_capacity(package.spine.len());
        for idref in &package.spine {
            ctx.check_cancelled()?;

            let Some(href) = package.manifest.get(idref) else {
                tracing::warn!(target: "docloader", idref = %idref, "spine item missing from manifest");
                continue;
            };
            let entry = resolve_href(&opf_path, href);
            match read_entry(&mut archive, &entry) {
                Ok(xhtml) => {
                    let text = strip_html_tags(&xhtml);
                    if !text.is_empty() {
                        chapters.push(text);
                    }
                }
                Err(err) => {
                    tracing::warn!(target: "docloader", chapter = %entry, "skipping chapter: {err}");
                }
            }
        }

        let props = package.properties();
        tracing::debug!(
            target: "docloader",
            chapters = chapters.len(),
            title = %props.title,
            "parsed EPUB document"
        );
        Ok(Document::new(chapters.join("\n\n"), props))
    }
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String, EpubError> {
    let mut entry = archive.by_name(name).map_err(|err| match err {
        ZipError::FileNotFound => EpubError::MissingEntry {
            path: name.to_string(),
        },
        other => EpubError::Zip(other),
    })?;

    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
