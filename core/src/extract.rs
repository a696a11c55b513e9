//! Text extraction from source files.
//!
//! Extraction sits outside the indexing core: an [`Extractor`] takes a path and either
//! returns text or an [`ExtractionError`]. [`Extractors`] picks one by file extension.

use crate::ExtractionError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

pub trait Extractor: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// Reads the file as UTF-8, replacing invalid sequences.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl Extractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = std::fs::read(path).map_err(|e| ExtractionError::new(path, e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Runs poppler's `pdftotext` and takes its stdout.
#[derive(Debug, Clone)]
pub struct PdfToTextExtractor {
    program: PathBuf,
}

impl PdfToTextExtractor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }
}

impl Default for PdfToTextExtractor {
    fn default() -> Self { Self::new("pdftotext") }
}

impl Extractor for PdfToTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new(&self.program)
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg(path)
            .arg("-")
            .output()
            .map_err(|e| {
                ExtractionError::new(path, format!("failed to run {}: {e} (is poppler installed?)", self.program.display()))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::new(path, format!("pdftotext failed: {}", stderr.trim())));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Extension-keyed registry of extractors.
pub struct Extractors {
    by_extension: HashMap<String, Box<dyn Extractor>>,
}

impl Extractors {
    pub fn empty() -> Self {
        Self { by_extension: HashMap::new() }
    }

    /// `pdf` through `pdftotext` at `pdftotext`, and `txt`/`text`/`md` as plain text.
    pub fn with_defaults(pdftotext: impl Into<PathBuf>) -> Self {
        let mut set = Self::empty();
        set.register("pdf", PdfToTextExtractor::new(pdftotext));
        for ext in ["txt", "text", "md"] {
            set.register(ext, PlainTextExtractor);
        }
        set
    }

    pub fn register(&mut self, extension: &str, extractor: impl Extractor + 'static) {
        self.by_extension.insert(extension.to_ascii_lowercase(), Box::new(extractor));
    }

    pub fn supports(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.by_extension.contains_key(&ext))
    }

    /// Extract and trim the text of `path`. Missing files, unknown extensions and
    /// whitespace-only results are all errors.
    pub fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        if !path.is_file() {
            return Err(ExtractionError::new(path, "file does not exist"));
        }
        let extractor = extension_of(path)
            .and_then(|ext| self.by_extension.get(&ext))
            .ok_or_else(|| ExtractionError::new(path, "unsupported file type"))?;
        let text = extractor.extract_text(path)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractionError::new(path, "no text extracted"));
        }
        Ok(text.to_string())
    }
}

impl Default for Extractors {
    fn default() -> Self { Self::with_defaults("pdftotext") }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn plain_text_is_trimmed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.TXT");
        fs::write(&path, "\n  hello world \n\n").unwrap();
        assert_eq!(Extractors::default().extract(&path).unwrap(), "hello world");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, b"caf\xe9 menu").unwrap();
        let text = Extractors::default().extract(&path).unwrap();
        assert!(text.ends_with("menu"));
    }

    #[test]
    fn failures_name_their_reason() {
        let dir = tempdir().unwrap();
        let extractors = Extractors::default();

        let missing = extractors.extract(&dir.path().join("missing.pdf")).unwrap_err();
        assert_eq!(missing.reason, "file does not exist");

        let docx = dir.path().join("report.docx");
        fs::write(&docx, "binary").unwrap();
        assert!(!extractors.supports(&docx));
        assert_eq!(extractors.extract(&docx).unwrap_err().reason, "unsupported file type");

        let blank = dir.path().join("blank.md");
        fs::write(&blank, "   \n\t").unwrap();
        assert_eq!(extractors.extract(&blank).unwrap_err().reason, "no text extracted");
    }

    #[test]
    fn missing_pdftotext_binary_is_an_extraction_error() {
        let dir = tempdir().unwrap();
        let pdf = dir.path().join("paper.pdf");
        fs::write(&pdf, "%PDF-1.4").unwrap();
        let extractors = Extractors::with_defaults(dir.path().join("no-such-pdftotext"));
        let err = extractors.extract(&pdf).unwrap_err();
        assert!(err.reason.starts_with("failed to run"));
    }
}
