//! `<head>` metadata and clutter-free body text from HTML documents.
//!
//! Metadata sources are merged in this order, each one only filling fields the
//! previous ones left empty:
//!
//! 1. `<title>`
//! 2. `<meta name="author|description|keywords">`
//! 3. Dublin Core `<meta name="dc.creator|dc.description|dc.subject|dc.publisher">`
//!
//! Open Graph (`og:title`, `og:description`, `og:image`, `og:site_name`) is
//! applied last and overrides whatever is already set, since it is usually the
//! curated value.

use std::{fs, path::Path};

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Node, Selector};

use crate::{
    config::DEFAULT_ABSTRACT_LIMIT,
    document::{Properties, fill_if_empty},
};

use super::{parse_timestamp, split_keywords, truncate_chars, year_prefix};

/// Elements whose text never counts as content.
const CLUTTER: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "noscript", "iframe", "template",
];

/// Elements rendered on their own line.
const BLOCK: &[&str] = &[
    "address",
    "article",
    "blockquote",
    "dd",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "li",
    "main",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "td",
    "th",
    "tr",
    "ul",
];

/// Elements preferred as the source of an abstract when a page has them.
const PREFERRED: &[&str] = &["article", "section", "li", "td", "th"];

#[allow(clippy::expect_used)]
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

lazy_static! {
    static ref TITLE: Selector = selector("title");
    static ref META: Selector = selector("meta");
    static ref CANONICAL: Selector = selector(r#"link[rel="canonical"]"#);
    static ref BODY: Selector = selector("body");
    static ref PREFERRED_SECTIONS: Selector = selector("article, section, li, td, th");
}

/// Reads `path` and extracts its head metadata.
///
/// An unreadable file yields empty properties; metadata is best-effort.
pub fn extract_html_metadata(path: impl AsRef<Path>) -> Properties {
    let path = path.as_ref();
    match fs::read(path) {
        Ok(bytes) => metadata_from_document(&Html::parse_document(&String::from_utf8_lossy(&bytes))),
        Err(err) => {
            tracing::warn!(target: "docloader", path = %path.display(), "cannot read HTML metadata: {err}");
            Properties::default()
        }
    }
}

#[derive(Default)]
struct HeadTags {
    standard: Properties,
    dublin_core: Properties,
    open_graph: Properties,
    date: String,
}

/// Extracts the metadata record from an already parsed document.
pub fn metadata_from_document(document: &Html) -> Properties {
    let mut tags = HeadTags::default();

    if let Some(title) = document.select(&TITLE).next() {
        tags.standard.title = collapse_whitespace(&title.text().collect::<String>());
    }

    for meta in document.select(&META) {
        let element = meta.value();
        let Some(content) = element.attr("content").map(str::trim).filter(|c| !c.is_empty())
        else {
            continue;
        };
        let Some(key) = element.attr("property").or_else(|| element.attr("name")) else {
            continue;
        };

        let HeadTags {
            standard,
            dublin_core,
            open_graph,
            date,
        } = &mut tags;
        match key.trim().to_ascii_lowercase().as_str() {
            "author" => fill_if_empty(&mut standard.author, content),
            "description" => fill_if_empty(&mut standard.r#abstract, content),
            "keywords" => standard.keywords.extend(split_keywords(content, &[','])),

            "dc.title" => fill_if_empty(&mut dublin_core.title, content),
            "dc.creator" => fill_if_empty(&mut dublin_core.author, content),
            "dc.description" => fill_if_empty(&mut dublin_core.r#abstract, content),
            "dc.subject" => dublin_core.keywords.extend(split_keywords(content, &[','])),
            "dc.publisher" => fill_if_empty(&mut dublin_core.source, content),
            "dc.date" | "article:published_time" => fill_if_empty(date, content),

            "og:title" => fill_if_empty(&mut open_graph.title, content),
            "og:description" => fill_if_empty(&mut open_graph.r#abstract, content),
            "og:image" => fill_if_empty(&mut open_graph.header_image, content),
            "og:site_name" => fill_if_empty(&mut open_graph.source, content),
            "og:url" => fill_if_empty(&mut open_graph.url, content),
            _ => {}
        }
    }

    let mut props = tags.standard;
    let dc = tags.dublin_core;
    fill_if_empty(&mut props.title, &dc.title);
    fill_if_empty(&mut props.author, &dc.author);
    fill_if_empty(&mut props.r#abstract, &dc.r#abstract);
    fill_if_empty(&mut props.source, &dc.source);
    if props.keywords.is_empty() {
        props.keywords = dc.keywords;
    }

    let og = tags.open_graph;
    for (target, value) in [
        (&mut props.title, og.title),
        (&mut props.r#abstract, og.r#abstract),
        (&mut props.header_image, og.header_image),
        (&mut props.source, og.source),
        (&mut props.url, og.url),
    ] {
        if !value.is_empty() {
            *target = value;
        }
    }

    if props.url.is_empty() {
        if let Some(href) = document
            .select(&CANONICAL)
            .next()
            .and_then(|link| link.value().attr("href"))
        {
            props.url = href.trim().to_string();
        }
    }

    if !tags.date.is_empty() {
        props.year = year_prefix(&tags.date);
        props.publish_at = parse_timestamp(&tags.date);
    }

    props
}

/// Visible text of `html` with clutter removed and `<br>` turned into newlines.
pub fn strip_html_tags(html: &str) -> String {
    clutter_free_text(&Html::parse_document(html))
}

/// Visible `<body>` text with clutter removed, falling back to the whole document.
pub fn clutter_free_text(document: &Html) -> String {
    if let Some(body) = document.select(&BODY).next() {
        let text = element_text(body);
        if !text.is_empty() {
            return text;
        }
    }
    element_text(document.root_element())
}

/// Builds a short plain-text summary of `html`, at most 400 characters long.
pub fn generate_content_abstract(html: &str) -> String {
    generate_content_abstract_with_limit(html, DEFAULT_ABSTRACT_LIMIT)
}

/// Like [generate_content_abstract] with a custom character budget.
///
/// Text inside `<article>`, `<section>`, list items and table cells is
/// preferred; otherwise the clutter-free body text is used. The result is cut
/// at `limit` characters and never splits a multi-byte character.
pub fn generate_content_abstract_with_limit(html: &str, limit: usize) -> String {
    let document = Html::parse_document(html);

    let mut text = preferred_text(&document);
    if text.is_empty() {
        text = clutter_free_text(&document);
    }

    truncate_chars(&collapse_whitespace(&text), limit)
}

fn preferred_text(document: &Html) -> String {
    document
        .select(&PREFERRED_SECTIONS)
        .filter(|el| {
            !el.ancestors().any(|node| {
                node.value()
                    .as_element()
                    .is_some_and(|e| PREFERRED.contains(&e.name()) || CLUTTER.contains(&e.name()))
            })
        })
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(element, &mut raw);

    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            }
            Node::Element(el) => {
                let name = el.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if CLUTTER.contains(&name) {
                    continue;
                }
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };

                let block = BLOCK.contains(&name);
                if block {
                    out.push('\n');
                }
                push_text(child, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
