//! TF-IDF ranking over stored term statistics.
//!
//! The score of a document is the sum over distinct query terms of
//! `tf(term, doc) * ln(N / df(term))`. Terms that appear in every document get an
//! IDF of zero and so add nothing; a query made only of such terms matches nothing.

use crate::tokenizer::normalize;
use crate::{DocId, DocumentStore, Result, TermIndex};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub filename: String,
    pub score: f64,
}

/// Natural-log inverse document frequency.
pub fn idf(num_docs: u64, doc_freq: u64) -> f64 {
    (num_docs as f64 / doc_freq as f64).ln()
}

/// Rank stored documents against `query`, best first, at most `top_n` of them.
///
/// Only documents with a positive score are returned. Equal scores are ordered by
/// filename so repeated calls on the same store give the same list.
pub fn search<S>(store: &S, query: &str, top_n: usize) -> Result<Vec<RankedResult>>
where
    S: TermIndex + DocumentStore,
{
    let terms: BTreeSet<String> = normalize(query).into_iter().collect();
    if terms.is_empty() || top_n == 0 {
        return Ok(Vec::new());
    }
    let num_docs = store.total_document_count()?;
    if num_docs == 0 {
        return Ok(Vec::new());
    }

    let mut scores: HashMap<DocId, f64> = HashMap::new();
    for term in &terms {
        let df = store.document_count_containing(term)?;
        if df == 0 {
            continue;
        }
        let idf = idf(num_docs, df);
        tracing::debug!(term = term.as_str(), df, idf, "query term");
        for (doc_id, tf) in store.term_frequencies(term)? {
            *scores.entry(doc_id).or_insert(0.0) += tf * idf;
        }
    }

    let mut ranked = Vec::with_capacity(scores.len());
    for (doc_id, score) in scores {
        if score.is_nan() || score <= 0.0 {
            continue;
        }
        if let Some(filename) = store.filename_of(doc_id)? {
            ranked.push(RankedResult { filename, score });
        }
    }
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.filename.cmp(&b.filename)));
    ranked.truncate(top_n);
    Ok(ranked)
}
