//! Tunables for the loaders. Every struct is a plain builder with sensible defaults.

/// Upper bound, in characters, of generated abstracts.
pub const DEFAULT_ABSTRACT_LIMIT: usize = 400;

/// A first line without whitespace shorter than this is not taken as a title.
pub const DEFAULT_MIN_TITLE_CHARS: usize = 10;

/// Configuration shared by all loaders of a [LoadContext](crate::LoadContext).
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Maximum number of characters (not bytes) in a generated abstract (default: 400)
    pub abstract_limit: usize,
    /// Minimum length of a whitespace-free line to be considered a title (default: 10)
    pub min_title_chars: usize,
    /// Options for reading CSV files
    pub csv: CsvConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            abstract_limit: DEFAULT_ABSTRACT_LIMIT,
            min_title_chars: DEFAULT_MIN_TITLE_CHARS,
            csv: CsvConfig::default(),
        }
    }
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abstract_limit(mut self, abstract_limit: usize) -> Self {
        self.abstract_limit = abstract_limit;
        self
    }

    pub fn min_title_chars(mut self, min_title_chars: usize) -> Self {
        self.min_title_chars = min_title_chars;
        self
    }

    pub fn csv(mut self, csv: CsvConfig) -> Self {
        self.csv = csv;
        self
    }
}

/// How `.csv` files are split into the labelled rows of a [Document](crate::Document).
///
/// The defaults favour getting text out of spreadsheet exports over rejecting
/// them: fields are trimmed and a row may have more or fewer fields than the
/// header. Extra fields are labelled `column_N`.
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Field separator byte, `,` unless built with [CsvConfig::tsv].
    pub delimiter: u8,
    /// The first record names the fields. Without it every field is `column_N`.
    pub has_headers: bool,
    pub trim: bool,
    /// Rows whose length differs from the header are rendered instead of
    /// failing the load with [LoaderError::CsvError](crate::LoaderError).
    pub ragged_rows: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            trim: true,
            ragged_rows: true,
        }
    }
}

impl CsvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tab-separated exports.
    pub fn tsv() -> Self {
        Self::default().delimiter(b'\t')
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn has_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Pass `false` to reject rows that do not match the header length.
    pub fn ragged_rows(mut self, ragged_rows: bool) -> Self {
        self.ragged_rows = ragged_rows;
        self
    }
}
