use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The source could not be turned into text.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The underlying database rejected a read or write. `filename` names the
    /// document being written, when there was one.
    #[error("storage error{}: {source}", for_file(.filename))]
    Storage {
        filename: Option<String>,
        #[source]
        source: rusqlite::Error,
    },

    #[error("document not found: {0}")]
    NotFound(String),

    /// Extraction succeeded but nothing survived normalization.
    #[error("no indexable terms in {0}")]
    EmptyDocument(String),
}

impl From<rusqlite::Error> for Error {
    fn from(source: rusqlite::Error) -> Self {
        Error::Storage { filename: None, source }
    }
}

impl Error {
    /// Attach the document a storage failure happened for. Other errors pass through.
    pub fn for_document(self, name: &str) -> Self {
        match self {
            Error::Storage { filename: None, source } => Error::Storage { filename: Some(name.to_string()), source },
            other => other,
        }
    }
}

fn for_file(filename: &Option<String>) -> String {
    filename.as_deref().map(|f| format!(" for {f}")).unwrap_or_default()
}

/// Failure at the extraction boundary. Carries the source path so batch callers can
/// report it and move on.
#[derive(Debug, Error)]
#[error("cannot extract text from {}: {reason}", .path.display())]
pub struct ExtractionError {
    pub path: PathBuf,
    pub reason: String,
}

impl ExtractionError {
    pub fn new(path: &Path, reason: impl Into<String>) -> Self {
        Self { path: path.to_path_buf(), reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_error_names_the_source() {
        let err: Error = ExtractionError::new(Path::new("papers/a.pdf"), "file does not exist").into();
        let msg = err.to_string();
        assert!(msg.contains("papers/a.pdf"));
        assert!(msg.contains("file does not exist"));
    }

    #[test]
    fn storage_error_names_the_document() {
        let bare: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(bare.to_string().starts_with("storage error: "));
        let named = bare.for_document("paper.pdf");
        assert!(named.to_string().starts_with("storage error for paper.pdf: "));
        assert!(matches!(named, Error::Storage { filename: Some(ref f), .. } if f == "paper.pdf"));
    }

    #[test]
    fn not_found_display() {
        let err = Error::NotFound("missing.pdf".into());
        assert_eq!(err.to_string(), "document not found: missing.pdf");
    }
}
