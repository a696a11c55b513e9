use docrank_core::{BatchReport, DocumentStats, DocumentSummary, RankedResult};
use serde::Serialize;
use std::io::{self, Write};

pub fn json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)
}

pub fn indexed<W: Write>(w: &mut W, doc: &DocumentSummary) -> io::Result<()> {
    writeln!(
        w,
        "Successfully processed {} with {} unique terms ({} words)",
        doc.filename, doc.unique_terms, doc.word_count
    )
}

pub fn batch<W: Write>(w: &mut W, report: &BatchReport) -> io::Result<()> {
    for doc in &report.indexed {
        indexed(w, doc)?;
    }
    for (path, err) in &report.failed {
        writeln!(w, "Skipped {}: {}", path.display(), err)?;
    }
    Ok(())
}

pub fn results<W: Write>(w: &mut W, query: &str, top_n: usize, results: &[RankedResult]) -> io::Result<()> {
    if results.is_empty() {
        return writeln!(w, "No matching documents found.");
    }
    writeln!(w, "Top {top_n} matching documents for '{query}':")?;
    writeln!(w, "{}", "-".repeat(60))?;
    for (i, r) in results.iter().enumerate() {
        writeln!(w, "{:2}. {} (Score: {:.4})", i + 1, r.filename, r.score)?;
    }
    Ok(())
}

pub fn documents<W: Write>(w: &mut W, docs: &[DocumentSummary]) -> io::Result<()> {
    if docs.is_empty() {
        return writeln!(w, "No documents in database");
    }
    writeln!(w, "Documents in database:")?;
    writeln!(w, "{}", "-".repeat(50))?;
    for d in docs {
        writeln!(w, "{} ({} words, {} unique terms)", d.filename, d.word_count, d.unique_terms)?;
    }
    Ok(())
}

pub fn stats<W: Write>(w: &mut W, s: &DocumentStats) -> io::Result<()> {
    writeln!(w, "Document: {}", s.filename)?;
    writeln!(w, "Total words: {}", s.word_count)?;
    writeln!(w, "Unique terms: {}", s.unique_terms)?;
    writeln!(w, "Content preview: {}...", s.preview)?;
    writeln!(w)?;
    writeln!(w, "Top {} terms:", s.top_terms.len())?;
    for t in &s.top_terms {
        writeln!(w, "  {}: {} times (TF: {:.4})", t.term, t.frequency, t.tf_score)?;
    }
    Ok(())
}
