//! Command-line contract tests for `docrank`.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;

fn docrank(db: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("docrank");
    cmd.arg("--db").arg(db);
    cmd
}

#[test]
fn index_search_list_stats() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = tmp.path().join("docs.db");
    let corpus = tmp.path().join("corpus");
    fs::create_dir_all(&corpus).unwrap();
    fs::write(corpus.join("cats.txt"), "cat cat dog").unwrap();
    fs::write(corpus.join("birds.txt"), "dog bird bird bird").unwrap();

    docrank(&db)
        .args(["index", corpus.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully processed cats.txt with 2 unique terms (3 words)"));

    docrank(&db)
        .args(["search", "cat"])
        .assert()
        .success()
        .stdout(predicate::str::contains(" 1. cats.txt (Score: 0.4621)"))
        .stdout(predicate::str::contains("birds.txt").not());

    docrank(&db)
        .args(["search", "dog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matching documents found."));

    docrank(&db)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("birds.txt (4 words, 2 unique terms)"));

    docrank(&db)
        .args(["stats", "birds.txt", "--top", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bird: 3 times (TF: 0.7500)"))
        .stdout(predicate::str::contains("dog:").not());
}

#[test]
fn json_output_parses() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = tmp.path().join("docs.db");
    let file = tmp.path().join("rust.md");
    fs::write(&file, "Ownership and borrowing keep memory safe").unwrap();
    let other = tmp.path().join("go.txt");
    fs::write(&other, "Channels and goroutines").unwrap();

    docrank(&db).args(["index", file.to_str().unwrap(), other.to_str().unwrap()]).assert().success();

    let out = docrank(&db).args(["search", "--json", "memory", "ownership"]).output().unwrap();
    assert!(out.status.success());
    let results: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(results[0]["filename"], "rust.md");
    assert!(results[0]["score"].as_f64().unwrap() > 0.0);
}

#[test]
fn failed_sources_are_reported_without_stopping_the_batch() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = tmp.path().join("docs.db");
    let good = tmp.path().join("good.txt");
    fs::write(&good, "lighthouse keeper logbook").unwrap();
    let missing = tmp.path().join("missing.pdf");

    docrank(&db)
        .args(["index", missing.to_str().unwrap(), good.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Successfully processed good.txt"))
        .stdout(predicate::str::contains("file does not exist"))
        .stderr(predicate::str::contains("1 of 2 sources failed"));

    docrank(&db)
        .args(["search", "lighthouse"])
        .assert()
        .success()
        .stdout(predicate::str::contains("good.txt"));
}

#[test]
fn unknown_document_stats_fail() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let db = tmp.path().join("docs.db");

    docrank(&db)
        .args(["stats", "nope.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("document not found: nope.pdf"));
}
