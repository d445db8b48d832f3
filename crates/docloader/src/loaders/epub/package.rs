//! `META-INF/container.xml` and the OPF package document.

use std::collections::HashMap;

use quick_xml::{
    Reader,
    escape::unescape,
    events::{BytesStart, Event},
};

use crate::{
    document::Properties,
    metadata::{parse_timestamp, strip_html_tags, year_prefix},
};

use super::errors::EpubError;

/// Path, inside the archive, of the OPF package named by `container.xml`.
pub(super) fn rootfile_path(container_xml: &str) -> Result<String, EpubError> {
    let mut reader = Reader::from_str(container_xml);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"rootfile" => {
                if let Some(path) = attribute(&e, b"full-path").filter(|p| !p.is_empty()) {
                    return Ok(path);
                }
            }
            Event::Eof => return Err(EpubError::MissingRootfile),
            _ => {}
        }
    }
}

/// The parts of an OPF document the loader needs.
#[derive(Debug, Default)]
pub(super) struct Package {
    pub title: String,
    pub creators: Vec<String>,
    pub description: String,
    pub subjects: Vec<String>,
    pub publisher: String,
    pub date: String,
    /// Manifest item id to href, relative to the OPF file.
    pub manifest: HashMap<String, String>,
    /// Manifest ids in reading order.
    pub spine: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DublinCore {
    Title,
    Creator,
    Description,
    Subject,
    Publisher,
    Date,
}

impl DublinCore {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"creator" => Some(Self::Creator),
            b"description" => Some(Self::Description),
            b"subject" => Some(Self::Subject),
            b"publisher" => Some(Self::Publisher),
            b"date" => Some(Self::Date),
            _ => None,
        }
    }
}

impl Package {
    pub fn parse(opf: &str) -> Result<Self, EpubError> {
        let mut reader = Reader::from_str(opf);
        let mut package = Package::default();
        let mut seen_package = false;
        let mut in_metadata = false;
        let mut capture: Option<(DublinCore, String)> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"package" => seen_package = true,
                    b"metadata" => in_metadata = true,
                    name if in_metadata => {
                        capture = DublinCore::from_local_name(name).map(|dc| (dc, String::new()));
                    }
                    _ => package.manifest_or_spine(&e),
                },
                Event::Empty(e) => package.manifest_or_spine(&e),
                Event::Text(text) => {
                    if let Some((_, value)) = capture.as_mut() {
                        let raw = String::from_utf8_lossy(&text);
                        value.push_str(&unescape(&raw).unwrap_or(raw.clone()));
                    }
                }
                Event::CData(data) => {
                    if let Some((_, value)) = capture.as_mut() {
                        value.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::GeneralRef(entity) => {
                    if let Some((_, value)) = capture.as_mut() {
                        let reference = format!("&{};", String::from_utf8_lossy(&entity));
                        value.push_str(&unescape(&reference).unwrap_or(reference.as_str().into()));
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"metadata" => in_metadata = false,
                    _ => {
                        if let Some((dc, value)) = capture.take() {
                            package.store(dc, value.trim());
                        }
                    }
                },
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_package {
            return Err(EpubError::MissingPackage);
        }
        Ok(package)
    }

    fn manifest_or_spine(&mut self, e: &BytesStart<'_>) {
        match e.local_name().as_ref() {
            b"item" => {
                if let (Some(id), Some(href)) = (attribute(e, b"id"), attribute(e, b"href")) {
                    self.manifest.insert(id, href);
                }
            }
            b"itemref" => {
                if let Some(idref) = attribute(e, b"idref") {
                    self.spine.push(idref);
                }
            }
            _ => {}
        }
    }

    fn store(&mut self, dc: DublinCore, value: &str) {
        if value.is_empty() {
            return;
        }
        let first = |field: &mut String| {
            if field.is_empty() {
                *field = value.to_string();
            }
        };
        match dc {
            DublinCore::Title => first(&mut self.title),
            DublinCore::Description => first(&mut self.description),
            DublinCore::Publisher => first(&mut self.publisher),
            DublinCore::Date => first(&mut self.date),
            DublinCore::Creator => self.creators.push(value.to_string()),
            DublinCore::Subject => self.subjects.push(value.to_string()),
        }
    }

    /// Dublin Core metadata mapped onto [Properties]. The title stays empty
    /// when the package has none.
    pub fn properties(&self) -> Properties {
        let r#abstract = if self.description.contains('<') {
            strip_html_tags(&self.description).replace('\n', " ")
        } else {
            self.description.clone()
        };

        Properties {
            title: self.title.clone(),
            author: self.creators.join(", "),
            r#abstract,
            keywords: self
                .subjects
                .iter()
                .flat_map(|subject| subject.split(','))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            source: self.publisher.clone(),
            year: year_prefix(&self.date),
            publish_at: parse_timestamp(&self.date),
            ..Default::default()
        }
    }
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name)
        .map(|attr| {
            let raw = String::from_utf8_lossy(&attr.value);
            unescape(&raw).map(|v| v.into_owned()).unwrap_or_else(|_| raw.into_owned())
        })
}

/// Resolves `href` against the directory of `opf_path`, dropping any
/// fragment and decoding `%XX` escapes.
pub(super) fn resolve_href(opf_path: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or_default();
    let mut segments: Vec<String> = opf_path.split('/').map(str::to_string).collect();
    segments.pop();

    let decoded = urlencoding::decode_binary(href.as_bytes());
    for segment in String::from_utf8_lossy(&decoded).split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other.to_string()),
        }
    }
    segments.retain(|s| !s.is_empty());
    segments.join("/")
}
