use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use docrank_core::tokenizer::normalize;
use docrank_core::{Corpus, DocumentStats, DocumentSummary, Error, DEFAULT_TOP_N};
use parking_lot::Mutex;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Longest result list a single request may ask for.
pub const MAX_K: usize = 100;
const SNIPPET_BEFORE: usize = 100;
const SNIPPET_AFTER: usize = 200;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { DEFAULT_TOP_N }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub filename: String,
    pub score: f64,
    pub snippet: Option<String>,
}

pub type SharedCorpus = Arc<Mutex<Corpus>>;

#[derive(Clone)]
pub struct AppState {
    pub corpus: SharedCorpus,
}

type ApiError = (StatusCode, String);

fn api_error(e: Error) -> ApiError {
    match e {
        Error::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        _ => {
            tracing::error!(error = %e, "request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub fn build_app(corpus: SharedCorpus) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/documents", get(documents_handler))
        .route("/documents/:filename", get(stats_handler))
        .with_state(AppState { corpus })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let k = params.k.clamp(1, MAX_K);
    let highlighter = Highlighter::new(&normalize(&params.q));

    let corpus = state.corpus.lock();
    let ranked = corpus.search(&params.q, k).map_err(api_error)?;
    let mut results = Vec::with_capacity(ranked.len());
    for hit in ranked {
        let snippet = match corpus.document(&hit.filename) {
            Ok(doc) => highlighter.snippet(&doc.content),
            Err(e) => {
                tracing::warn!(filename = %hit.filename, error = %e, "snippet lookup failed");
                None
            }
        };
        results.push(SearchHit { filename: hit.filename, score: hit.score, snippet });
    }
    drop(corpus);

    Ok(Json(SearchResponse { query: params.q, took_s: start.elapsed().as_secs_f64(), results }))
}

pub async fn documents_handler(State(state): State<AppState>) -> Result<Json<Vec<DocumentSummary>>, ApiError> {
    let docs = state.corpus.lock().list_documents().map_err(api_error)?;
    Ok(Json(docs))
}

pub async fn stats_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<DocumentStats>, ApiError> {
    let stats = state.corpus.lock().stats(&filename, 10).map_err(api_error)?;
    Ok(Json(stats))
}

/// Highlights query terms in document text. The terms are compiled into one
/// case-insensitive alternation, longest first, so a term that is part of another
/// term (or of the `<em>` markup) cannot split an earlier match.
pub struct Highlighter {
    re: Option<Regex>,
}

impl Highlighter {
    pub fn new(terms: &[String]) -> Self {
        let mut distinct: Vec<&str> = terms.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
        distinct.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        distinct.dedup();
        if distinct.is_empty() {
            return Self { re: None };
        }
        let alternation = distinct.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
        Self { re: RegexBuilder::new(&alternation).case_insensitive(true).build().ok() }
    }

    /// A window of `text` around the first hit, HTML-escaped, with every hit wrapped
    /// in `<em>`. Falls back to the start of the text.
    pub fn snippet(&self, text: &str) -> Option<String> {
        if text.is_empty() { return None; }
        let first = self.re.as_ref().and_then(|re| re.find(text)).map(|m| m.start());
        let window = match first {
            Some(idx) => {
                let start = floor_boundary(text, idx.saturating_sub(SNIPPET_BEFORE));
                let end = floor_boundary(text, (idx + SNIPPET_AFTER).min(text.len()));
                &text[start..end]
            }
            None => {
                let end = text.char_indices().nth(SNIPPET_AFTER).map_or(text.len(), |(i, _)| i);
                &text[..end]
            }
        };
        Some(self.highlight(window))
    }

    fn highlight(&self, window: &str) -> String {
        let mut out = String::with_capacity(window.len() + 16);
        let mut last = 0;
        if let Some(re) = &self.re {
            for m in re.find_iter(window) {
                push_escaped(&mut out, &window[last..m.start()]);
                out.push_str("<em>");
                push_escaped(&mut out, m.as_str());
                out.push_str("</em>");
                last = m.end();
            }
        }
        push_escaped(&mut out, &window[last..]);
        out
    }
}

pub fn snippet(text: &str, terms: &[String]) -> Option<String> {
    Highlighter::new(terms).snippet(text)
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while !text.is_char_boundary(idx) { idx -= 1; }
    idx
}

fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
