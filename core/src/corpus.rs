use crate::extract::Extractors;
use crate::persist::SqliteStore;
use crate::rank::{self, RankedResult};
use crate::stats::TermStats;
use crate::tokenizer::normalize;
use crate::{DocumentStore, DocumentSummary, Error, ExtractionError, Result, TermRecord};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct CorpusConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// `pdftotext` program used for PDF sources.
    pub pdftotext: PathBuf,
    /// Characters of stored text shown by [`Corpus::stats`].
    pub preview_chars: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("docrank.db"),
            pdftotext: std::env::var_os("PDFTOTEXT").map(PathBuf::from).unwrap_or_else(|| "pdftotext".into()),
            preview_chars: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentStats {
    pub filename: String,
    pub word_count: u32,
    pub unique_terms: u32,
    pub preview: String,
    pub top_terms: Vec<TermRecord>,
}

/// Outcome of [`Corpus::index_paths`].
#[derive(Debug, Default)]
pub struct BatchReport {
    pub indexed: Vec<DocumentSummary>,
    pub failed: Vec<(PathBuf, Error)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool { self.failed.is_empty() }
}

/// An indexed document collection: the store plus the extractors that feed it.
pub struct Corpus {
    store: SqliteStore,
    extractors: Extractors,
    preview_chars: usize,
}

impl Corpus {
    pub fn open(config: &CorpusConfig) -> Result<Self> {
        let store = SqliteStore::open(&config.db_path)?;
        tracing::debug!(db = %config.db_path.display(), "opened corpus");
        Ok(Self {
            store,
            extractors: Extractors::with_defaults(config.pdftotext.clone()),
            preview_chars: config.preview_chars,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::with_parts(SqliteStore::open_in_memory()?, Extractors::default()))
    }

    pub fn with_parts(store: SqliteStore, extractors: Extractors) -> Self {
        Self { store, extractors, preview_chars: CorpusConfig::default().preview_chars }
    }

    pub fn store(&self) -> &SqliteStore { &self.store }

    pub fn close(self) -> Result<()> { self.store.close() }

    /// Extract and index one file. The document key is the file's base name, so
    /// re-indexing a file (or another file with the same name) replaces it.
    pub fn index_file(&mut self, path: &Path) -> Result<DocumentSummary> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let text = self.extractors.extract(path)?;
        self.index_text(&filename, &text)
    }

    /// Index `text` under `filename`, replacing any earlier version atomically.
    pub fn index_text(&mut self, filename: &str, text: &str) -> Result<DocumentSummary> {
        let terms = normalize(text);
        if terms.is_empty() {
            return Err(Error::EmptyDocument(filename.to_string()));
        }
        let stats = TermStats::build(&terms);
        let id = self.store.replace_document(filename, text, &stats).map_err(|e| e.for_document(filename))?;
        let summary = DocumentSummary {
            id,
            filename: filename.to_string(),
            word_count: stats.word_count,
            unique_terms: stats.unique_terms() as u32,
        };
        tracing::info!(filename, word_count = summary.word_count, unique_terms = summary.unique_terms, "indexed document");
        Ok(summary)
    }

    /// Index every source under `inputs`. Directories are walked for files with a
    /// registered extension; files named directly are always attempted. A failing
    /// source is logged and recorded, and the batch carries on.
    pub fn index_paths<P: AsRef<Path>>(&mut self, inputs: &[P]) -> BatchReport {
        let mut report = BatchReport::default();
        let (sources, unreadable) = self.collect_sources(inputs);
        for (path, e) in unreadable {
            tracing::warn!(path = %path.display(), error = %e, "skipping source");
            report.failed.push((path, e));
        }
        for source in sources {
            match self.index_file(&source) {
                Ok(summary) => report.indexed.push(summary),
                Err(e) => {
                    tracing::warn!(path = %source.display(), error = %e, "skipping source");
                    report.failed.push((source, e));
                }
            }
        }
        tracing::info!(indexed = report.indexed.len(), failed = report.failed.len(), "batch complete");
        report
    }

    /// Files to index, plus directory entries the walk could not read.
    fn collect_sources<P: AsRef<Path>>(&self, inputs: &[P]) -> (Vec<PathBuf>, Vec<(PathBuf, Error)>) {
        let mut files = Vec::new();
        let mut unreadable = Vec::new();
        for input in inputs {
            let input = input.as_ref();
            if !input.is_dir() {
                files.push(input.to_path_buf());
                continue;
            }
            for entry in WalkDir::new(input).follow_links(true).sort_by_file_name() {
                match entry {
                    Ok(entry) => {
                        let p = entry.path();
                        if p.is_file() && self.extractors.supports(p) {
                            files.push(p.to_path_buf());
                        }
                    }
                    Err(e) => {
                        let path = e.path().unwrap_or(input).to_path_buf();
                        let err = ExtractionError::new(&path, e.to_string()).into();
                        unreadable.push((path, err));
                    }
                }
            }
        }
        (files, unreadable)
    }

    pub fn search(&self, query: &str, top_n: usize) -> Result<Vec<RankedResult>> {
        rank::search(&self.store, query, top_n)
    }

    pub fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        self.store.list_documents()
    }

    pub fn document(&self, filename: &str) -> Result<crate::Document> {
        self.store.document(filename)?.ok_or_else(|| Error::NotFound(filename.to_string()))
    }

    /// Word counts, a text preview and the `top_k` highest-TF terms of a document.
    pub fn stats(&self, filename: &str, top_k: usize) -> Result<DocumentStats> {
        let doc = self.document(filename)?;
        let unique_terms = self.store.unique_term_count(doc.id)?;
        let top_terms = self.store.top_terms(doc.id, top_k)?;
        Ok(DocumentStats {
            preview: doc.content.chars().take(self.preview_chars).collect(),
            filename: doc.filename,
            word_count: doc.word_count,
            unique_terms,
            top_terms,
        })
    }
}
