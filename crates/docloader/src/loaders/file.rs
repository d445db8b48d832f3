use std::{
    fs,
    path::{Path, PathBuf},
};

use glob::glob;

use crate::{context::LoadContext, document::Document, error::LoaderError, load_document};

// ================================================================
// Resolving caller supplied names to files
// ================================================================

/// Maps a caller supplied file name onto a readable path.
///
/// Access control (for example path traversal checks) belongs to the
/// implementor, not to the loaders.
pub trait FileSource {
    fn resolve(&self, name: &str) -> Result<PathBuf, LoaderError>;
}

/// Resolves relative names against a fixed working directory.
#[derive(Debug, Clone)]
pub struct WorkingDir {
    root: PathBuf,
}

impl WorkingDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSource for WorkingDir {
    /// Absolute names are taken as is; a name that is not an existing file is
    /// [LoaderError::NotFound].
    fn resolve(&self, name: &str) -> Result<PathBuf, LoaderError> {
        let candidate = Path::new(name);
        let path = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };

        if path.is_file() {
            Ok(path)
        } else {
            Err(LoaderError::NotFound(path))
        }
    }
}

// ================================================================
// DocumentFileLoader definitions and implementations
// ================================================================

/// [DocumentFileLoader] loads every matched file into a [Document].
///
/// Paths come from a glob pattern, a directory listing, a single path or a
/// [FileSource]. Each path goes through [load_document], so unsupported
/// extensions show up as [LoaderError::UnsupportedFormat] items that can be
/// dropped with [DocumentFileLoader::ignore_errors].
///
/// # Example Usage
///
/// ```rust,ignore
/// use docloader::DocumentFileLoader;
///
/// let documents: Vec<_> = DocumentFileLoader::with_glob("library/**/*.epub")?
///     .load()
///     .ignore_errors()
///     .into_iter()
///     .collect();
/// ```
pub struct DocumentFileLoader<'a, T> {
    iterator: Box<dyn Iterator<Item = T> + 'a>,
    ctx: LoadContext,
}

impl<'a> DocumentFileLoader<'a, Result<PathBuf, LoaderError>> {
    /// Loads each path with the loader's [LoadContext].
    pub fn load(self) -> DocumentFileLoader<'a, Result<Document, LoaderError>> {
        let ctx = self.ctx.clone();
        DocumentFileLoader {
            iterator: Box::new(
                self.iterator
                    .map(move |res| res.and_then(|path| load_document(&path, &ctx))),
            ),
            ctx: self.ctx,
        }
    }

    /// Like [DocumentFileLoader::load], keeping the path next to each document.
    pub fn load_with_path(self) -> DocumentFileLoader<'a, Result<(PathBuf, Document), LoaderError>> {
        let ctx = self.ctx.clone();
        DocumentFileLoader {
            iterator: Box::new(self.iterator.map(move |res| {
                let path = res?;
                let document = load_document(&path, &ctx)?;
                Ok((path, document))
            })),
            ctx: self.ctx,
        }
    }
}

impl<'a, T> DocumentFileLoader<'a, Result<T, LoaderError>>
where
    T: 'a,
{
    /// Drops failed items, returning only successful results.
    pub fn ignore_errors(self) -> DocumentFileLoader<'a, T> {
        DocumentFileLoader {
            iterator: Box::new(self.iterator.filter_map(|res| match res {
                Ok(item) => Some(item),
                Err(err) => {
                    tracing::debug!(target: "docloader", "ignoring error: {err}");
                    None
                }
            })),
            ctx: self.ctx,
        }
    }
}

impl<'a, T> DocumentFileLoader<'a, T> {
    /// Replaces the context used by [DocumentFileLoader::load].
    pub fn with_context(mut self, ctx: LoadContext) -> Self {
        self.ctx = ctx;
        self
    }
}

impl DocumentFileLoader<'_, Result<PathBuf, LoaderError>> {
    /// A loader over exactly one path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::from_paths([path.into()])
    }

    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let paths: Vec<PathBuf> = paths.into_iter().collect();
        DocumentFileLoader {
            iterator: Box::new(paths.into_iter().map(Ok)),
            ctx: LoadContext::default(),
        }
    }

    /// Resolves every name through `source`; unresolvable names become
    /// [LoaderError::NotFound] items.
    pub fn from_source<S: FileSource>(
        source: &S,
        names: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        let resolved: Vec<_> = names
            .into_iter()
            .map(|name| source.resolve(name.as_ref()))
            .collect();
        DocumentFileLoader {
            iterator: Box::new(resolved.into_iter()),
            ctx: LoadContext::default(),
        }
    }

    /// Creates a new [DocumentFileLoader] using a glob pattern to match files.
    ///
    /// ```rust,ignore
    /// let loader = DocumentFileLoader::with_glob("files/*.pdf")?;
    /// ```
    pub fn with_glob(pattern: &str) -> Result<Self, LoaderError> {
        let paths = glob(pattern)?;
        Ok(DocumentFileLoader {
            iterator: Box::new(paths.map(|path| path.map_err(LoaderError::GlobError))),
            ctx: LoadContext::default(),
        })
    }

    /// Creates a new [DocumentFileLoader] on all files within a directory
    /// (subdirectories are ignored).
    pub fn with_dir(directory: impl AsRef<Path>) -> Result<Self, LoaderError> {
        let directory = directory.as_ref();
        let entries =
            fs::read_dir(directory).map_err(|err| LoaderError::from_io(directory, err))?;
        Ok(DocumentFileLoader {
            iterator: Box::new(entries.filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.is_file() { Some(Ok(path)) } else { None }
            })),
            ctx: LoadContext::default(),
        })
    }
}

// ================================================================
// Iterators for DocumentFileLoader
// ================================================================

pub struct IntoIter<'a, T> {
    iterator: Box<dyn Iterator<Item = T> + 'a>,
}

impl<'a, T> IntoIterator for DocumentFileLoader<'a, T> {
    type Item = T;
    type IntoIter = IntoIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            iterator: self.iterator,
        }
    }
}

impl<T> Iterator for IntoIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iterator.next()
    }
}
