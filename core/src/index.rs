use crate::Result;
use serde::{Deserialize, Serialize};

pub type DocId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    /// Unique key of the document, the base name of the source file.
    pub filename: String,
    /// Text as extracted from the source.
    pub content: String,
    /// Number of normalized terms, duplicates included.
    pub word_count: u32,
    /// RFC 3339 time of the last (re)indexing.
    pub indexed_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocId,
    pub filename: String,
    pub word_count: u32,
    pub unique_terms: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRecord {
    pub term: String,
    pub frequency: u32,
    pub tf_score: f64,
}

/// Read side of the per-document term statistics.
///
/// This is all the ranker needs: every lookup is keyed by term, so answering a query
/// never touches documents that do not contain one of its terms.
pub trait TermIndex {
    fn total_document_count(&self) -> Result<u64>;

    fn document_count_containing(&self, term: &str) -> Result<u64>;

    /// `(document, tf_score)` for every document containing `term`, ordered by document id.
    fn term_frequencies(&self, term: &str) -> Result<Vec<(DocId, f64)>>;
}

/// Read side of the document records.
pub trait DocumentStore {
    fn document(&self, filename: &str) -> Result<Option<Document>>;

    fn filename_of(&self, doc_id: DocId) -> Result<Option<String>>;

    /// Summaries of every stored document, ordered by filename.
    fn list_documents(&self) -> Result<Vec<DocumentSummary>>;
}
