use thiserror::Error;

/// Structural problems with an EPUB container. Any of these makes the whole load fail.
#[derive(Error, Debug)]
pub enum EpubError {
    #[error("not a zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("missing archive entry: {path}")]
    MissingEntry { path: String },

    #[error("META-INF/container.xml names no rootfile")]
    MissingRootfile,

    #[error("package document has no <package> element")]
    MissingPackage,
}
