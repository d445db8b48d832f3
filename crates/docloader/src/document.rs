//! The uniform output of every loader: extracted text plus a [Properties] record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata record attached to a [Document].
///
/// Every field defaults to empty. An empty string means "unknown", never "failed to parse".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Properties {
    pub title: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    /// Best-effort year string, usually four digits.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub year: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub r#abstract: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
    /// Keywords in the order they were encountered. Duplicates are kept.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub header_image: String,

    pub unread: bool,
    pub marked: bool,
    /// Unix timestamp in seconds, `0` when unknown.
    #[serde(skip_serializing_if = "is_zero")]
    pub publish_at: i64,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl Properties {
    /// Fills `author`, `title` and `year` from `other` where they are still empty.
    pub fn fill_bibliographic(&mut self, other: &Properties) {
        fill_if_empty(&mut self.author, &other.author);
        fill_if_empty(&mut self.title, &other.title);
        fill_if_empty(&mut self.year, &other.year);
    }

    /// Returns true when neither author, title nor year carries a value.
    pub fn is_bibliographic_empty(&self) -> bool {
        self.author.is_empty() && self.title.is_empty() && self.year.is_empty()
    }
}

pub(crate) fn fill_if_empty(target: &mut String, value: &str) {
    if target.is_empty() && !value.is_empty() {
        *target = value.to_string();
    }
}

/// A loaded document: extracted plain text content and its metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub properties: Properties,
}

impl Document {
    pub fn new(content: impl Into<String>, properties: Properties) -> Self {
        Self {
            content: content.into(),
            properties,
        }
    }

    /// Renders the result envelope handed to the calling plugin layer:
    /// `{ "file_path": ..., "document": { "content": ..., "properties": { ... } } }`.
    pub fn to_results(&self, file_path: &str) -> Map<String, Value> {
        let mut results = Map::new();
        results.insert("file_path".to_string(), Value::String(file_path.to_string()));
        results.insert(
            "document".to_string(),
            serde_json::to_value(self).unwrap_or(Value::Null),
        );
        results
    }
}
