//! Line-oriented title and abstract recovery for plain text and Markdown.

use crate::document::Properties;

use super::truncate_chars;

/// Options for [extract_content_metadata].
#[derive(Debug, Clone, Copy)]
pub struct ContentHeuristic {
    /// A whitespace-free line must be at least this long to become the title.
    pub min_title_chars: usize,
    /// Maximum number of characters kept in the abstract.
    pub abstract_limit: usize,
}

impl Default for ContentHeuristic {
    fn default() -> Self {
        Self {
            min_title_chars: crate::config::DEFAULT_MIN_TITLE_CHARS,
            abstract_limit: crate::config::DEFAULT_ABSTRACT_LIMIT,
        }
    }
}

/// Fills `title` and `abstract` of `props` from `content` when they are empty.
///
/// Values already present in `props` are never overwritten.
pub fn extract_content_metadata(content: &str, props: Properties) -> Properties {
    ContentHeuristic::default().apply(content, props)
}

impl ContentHeuristic {
    pub fn apply(&self, content: &str, mut props: Properties) -> Properties {
        if props.title.is_empty() {
            props.title = self.title(content).unwrap_or_default();
        }
        if props.r#abstract.is_empty() {
            props.r#abstract = first_paragraph(content)
                .map(|p| truncate_chars(&p, self.abstract_limit))
                .unwrap_or_default();
        }
        props
    }

    fn title(&self, content: &str) -> Option<String> {
        if let Some(h1) = heading_title(content) {
            return Some(h1);
        }

        content
            .lines()
            .map(|line| line.trim().trim_start_matches('#').trim_start())
            .filter(|line| !line.is_empty())
            .find(|line| {
                line.chars().count() >= self.min_title_chars || line.contains(char::is_whitespace)
            })
            .map(str::to_string)
    }
}

/// Text of the first Markdown H1 (`# Title`) line in `content`.
pub fn heading_title(content: &str) -> Option<String> {
    content.lines().find_map(h1_text)
}

fn h1_text(line: &str) -> Option<String> {
    let rest = line.trim_start().strip_prefix('#')?;
    if rest.starts_with('#') || !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return None;
    }
    let title = rest.trim().trim_end_matches('#').trim_end();
    (!title.is_empty()).then(|| title.to_string())
}

fn is_header(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// The first maximal run of non-blank, non-header lines, joined by spaces.
fn first_paragraph(content: &str) -> Option<String> {
    let mut paragraph: Vec<&str> = Vec::new();

    for line in content.lines().map(str::trim) {
        if line.is_empty() || is_header(line) {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        paragraph.push(line);
    }

    (!paragraph.is_empty()).then(|| paragraph.join(" "))
}
