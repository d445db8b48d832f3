//! Author / title / year recovery from a bare file name.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::document::Properties;

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("filename pattern is a valid regex")
}

lazy_static! {
    // Author_Title_2023
    static ref AUTHOR_TITLE_YEAR: Regex = compile(r"^([^_]+)_([^_]+)_(\d{4})$");
    // Author - Title (2023)
    static ref AUTHOR_DASH_TITLE_PAREN_YEAR: Regex =
        compile(r"^(.+?)\s+-\s+(.+?)\s*\((\d{4})\)$");
    // Author_Title (2023)
    static ref AUTHOR_TITLE_PAREN_YEAR: Regex = compile(r"^([^_]+)_(.+?)\s*\((\d{4})\)$");
}

/// Extracts `{author, title, year}` from the file name of `path`.
///
/// Patterns are tried in order; the first that matches wins:
///
/// 1. `Author_Title_2023`
/// 2. `Author - Title (2023)`
/// 3. `Author_Title (2023)`
/// 4. `some_words_2023`: the two tokens before a trailing four-digit year
///
/// Returns empty properties when nothing matches. Never fails.
pub fn extract_filename_metadata(path: impl AsRef<Path>) -> Properties {
    let Some(stem) = path.as_ref().file_stem().and_then(|s| s.to_str()) else {
        return Properties::default();
    };
    let stem = stem.trim();

    let patterns: [&Regex; 3] = [
        &AUTHOR_TITLE_YEAR,
        &AUTHOR_DASH_TITLE_PAREN_YEAR,
        &AUTHOR_TITLE_PAREN_YEAR,
    ];
    for pattern in patterns {
        if let Some(caps) = pattern.captures(stem) {
            let field = |i: usize| caps.get(i).map_or("", |m| m.as_str().trim()).to_string();
            return Properties {
                author: field(1),
                title: field(2),
                year: field(3),
                ..Default::default()
            };
        }
    }

    trailing_year_tokens(stem).unwrap_or_default()
}

fn trailing_year_tokens(stem: &str) -> Option<Properties> {
    let tokens: Vec<&str> = stem.split('_').collect();
    let [.., author, title, year] = tokens.as_slice() else {
        return None;
    };
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if author.trim().is_empty() || title.trim().is_empty() {
        return None;
    }

    Some(Properties {
        author: author.trim().to_string(),
        title: title.trim().to_string(),
        year: year.to_string(),
        ..Default::default()
    })
}
