use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use docrank_core::Corpus;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn build_tiny_app() -> Router {
    let mut corpus = Corpus::open_in_memory().unwrap();
    corpus.index_text("doc0.txt", "Rust is great. Rust systems programming in rust.").unwrap();
    corpus.index_text("doc1.txt", "Learning rust the slow way.").unwrap();
    corpus.index_text("doc2.txt", "Gardening tips for tomatoes.").unwrap();
    docrank_server::build_app(Arc::new(Mutex::new(corpus)))
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let (status, body) = call(build_tiny_app(), "/search?q=rust&k=2").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["filename"], "doc0.txt");
    assert_eq!(arr[1]["filename"], "doc1.txt");
    assert!(arr[0]["score"].as_f64().unwrap() > arr[1]["score"].as_f64().unwrap());
    assert!(arr[0]["snippet"].as_str().unwrap().contains("<em>Rust</em>"));
}

#[tokio::test]
async fn search_without_matches_is_empty() {
    let (status, body) = call(build_tiny_app(), "/search?q=the").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn documents_and_stats() {
    let (status, body) = call(build_tiny_app(), "/documents").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let names: Vec<&str> = json.as_array().unwrap().iter().map(|d| d["filename"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["doc0.txt", "doc1.txt", "doc2.txt"]);

    let (status, body) = call(build_tiny_app(), "/documents/doc0.txt").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["top_terms"][0]["term"], "rust");
    assert_eq!(json["top_terms"][0]["frequency"], 3);

    let (status, _) = call(build_tiny_app(), "/documents/missing.pdf").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
