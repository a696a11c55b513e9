use crate::{DocId, Document, DocumentStore, DocumentSummary, Result, TermIndex, TermRecord, TermStats};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use time::format_description::well_known::Rfc3339;

const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS documents (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    filename    TEXT UNIQUE NOT NULL,
    content     TEXT NOT NULL,
    word_count  INTEGER NOT NULL,
    indexed_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS term_frequency (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    document_id INTEGER NOT NULL REFERENCES documents (id) ON DELETE CASCADE,
    term        TEXT NOT NULL,
    frequency   INTEGER NOT NULL CHECK (frequency >= 1),
    tf_score    REAL NOT NULL,
    UNIQUE (document_id, term)
);

CREATE INDEX IF NOT EXISTS idx_term_frequency_term ON term_frequency (term);
";

/// SQLite-backed document and term store.
///
/// Owns its connection; open it once per session and [`close`](Self::close) it on the
/// way out. All writes go through a [`WriteTxn`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }

    /// Start a write transaction. Dropping it without [`WriteTxn::commit`] rolls back.
    pub fn begin(&mut self) -> Result<WriteTxn<'_>> {
        Ok(WriteTxn { tx: self.conn.transaction()? })
    }

    /// Store `filename` with its statistics, replacing any previous version and all of
    /// its term records in one transaction.
    pub fn replace_document(&mut self, filename: &str, content: &str, stats: &TermStats) -> Result<DocId> {
        let txn = self.begin()?;
        let doc_id = txn.upsert_document(filename, content, stats.word_count)?;
        txn.delete_terms_for(doc_id)?;
        txn.bulk_insert(doc_id, stats)?;
        txn.commit()?;
        Ok(doc_id)
    }

    /// Every term record of a document, ordered by term.
    pub fn terms_for(&self, doc_id: DocId) -> Result<Vec<TermRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT term, frequency, tf_score FROM term_frequency WHERE document_id = ?1 ORDER BY term",
        )?;
        let rows = stmt.query_map(params![doc_id], term_record)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Highest-TF terms of a document; equal scores fall back to term order.
    pub fn top_terms(&self, doc_id: DocId, limit: usize) -> Result<Vec<TermRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT term, frequency, tf_score FROM term_frequency
             WHERE document_id = ?1
             ORDER BY tf_score DESC, term ASC
             LIMIT ?2",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![doc_id, limit], term_record)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn unique_term_count(&self, doc_id: DocId) -> Result<u32> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM term_frequency WHERE document_id = ?1",
            params![doc_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}

fn term_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<TermRecord> {
    Ok(TermRecord { term: row.get(0)?, frequency: row.get(1)?, tf_score: row.get(2)? })
}

fn count(conn: &Connection, sql: &str, term: Option<&str>) -> Result<u64> {
    let n: i64 = match term {
        Some(t) => conn.query_row(sql, params![t], |row| row.get(0))?,
        None => conn.query_row(sql, [], |row| row.get(0))?,
    };
    Ok(n.max(0) as u64)
}

impl TermIndex for SqliteStore {
    fn total_document_count(&self) -> Result<u64> {
        count(&self.conn, "SELECT COUNT(*) FROM documents", None)
    }

    fn document_count_containing(&self, term: &str) -> Result<u64> {
        count(
            &self.conn,
            "SELECT COUNT(DISTINCT document_id) FROM term_frequency WHERE term = ?1",
            Some(term),
        )
    }

    fn term_frequencies(&self, term: &str) -> Result<Vec<(DocId, f64)>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT document_id, tf_score FROM term_frequency WHERE term = ?1 ORDER BY document_id",
        )?;
        let rows = stmt.query_map(params![term], |row| Ok((row.get::<_, DocId>(0)?, row.get::<_, f64>(1)?)))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl DocumentStore for SqliteStore {
    fn document(&self, filename: &str) -> Result<Option<Document>> {
        let doc = self
            .conn
            .query_row(
                "SELECT id, filename, content, word_count, indexed_at FROM documents WHERE filename = ?1",
                params![filename],
                |row| {
                    Ok(Document {
                        id: row.get(0)?,
                        filename: row.get(1)?,
                        content: row.get(2)?,
                        word_count: row.get(3)?,
                        indexed_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(doc)
    }

    fn filename_of(&self, doc_id: DocId) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare_cached("SELECT filename FROM documents WHERE id = ?1")?;
        Ok(stmt.query_row(params![doc_id], |row| row.get(0)).optional()?)
    }

    fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT d.id, d.filename, d.word_count, COUNT(tf.id)
             FROM documents d
             LEFT JOIN term_frequency tf ON tf.document_id = d.id
             GROUP BY d.id
             ORDER BY d.filename",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DocumentSummary {
                id: row.get(0)?,
                filename: row.get(1)?,
                word_count: row.get(2)?,
                unique_terms: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

/// A write transaction on the store.
///
/// Commits only through [`commit`](Self::commit). Any other way out of scope, including
/// an early `?` return, rolls every statement back.
pub struct WriteTxn<'conn> {
    tx: Transaction<'conn>,
}

impl WriteTxn<'_> {
    /// Insert the document or update it in place, keeping its id.
    pub fn upsert_document(&self, filename: &str, content: &str, word_count: u32) -> Result<DocId> {
        let indexed_at = time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        self.tx.execute(
            "INSERT INTO documents (filename, content, word_count, indexed_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (filename) DO UPDATE SET
                 content = excluded.content,
                 word_count = excluded.word_count,
                 indexed_at = excluded.indexed_at",
            params![filename, content, word_count, indexed_at],
        )?;
        let doc_id = self.tx.query_row(
            "SELECT id FROM documents WHERE filename = ?1",
            params![filename],
            |row| row.get(0),
        )?;
        Ok(doc_id)
    }

    pub fn delete_terms_for(&self, doc_id: DocId) -> Result<usize> {
        Ok(self.tx.execute("DELETE FROM term_frequency WHERE document_id = ?1", params![doc_id])?)
    }

    pub fn bulk_insert(&self, doc_id: DocId, stats: &TermStats) -> Result<()> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO term_frequency (document_id, term, frequency, tf_score) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (term, stat) in &stats.terms {
            stmt.execute(params![doc_id, term, stat.frequency, stat.tf_score])?;
        }
        Ok(())
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::normalize;

    fn stats(text: &str) -> TermStats { TermStats::build(&normalize(text)) }

    #[test]
    fn upsert_keeps_document_id() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let first = store.replace_document("a.txt", "cat cat dog", &stats("cat cat dog")).unwrap();
        let second = store.replace_document("a.txt", "bird", &stats("bird")).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.total_document_count().unwrap(), 1);
    }

    #[test]
    fn read_operations() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let a = store.replace_document("a.txt", "cat cat dog", &stats("cat cat dog")).unwrap();
        let b = store.replace_document("b.txt", "dog bird bird bird", &stats("dog bird bird bird")).unwrap();

        assert_eq!(store.total_document_count().unwrap(), 2);
        assert_eq!(store.document_count_containing("dog").unwrap(), 2);
        assert_eq!(store.document_count_containing("cat").unwrap(), 1);
        assert_eq!(store.document_count_containing("zebra").unwrap(), 0);
        assert_eq!(store.term_frequencies("dog").unwrap(), vec![(a, 1.0 / 3.0), (b, 0.25)]);
        assert_eq!(store.filename_of(b).unwrap().as_deref(), Some("b.txt"));
        assert_eq!(store.filename_of(b + 100).unwrap(), None);
        assert_eq!(store.unique_term_count(a).unwrap(), 2);

        let top = store.top_terms(b, 1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].term, "bird");
        assert_eq!(top[0].frequency, 3);
    }

    #[test]
    fn list_is_ordered_by_filename() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.replace_document("zeta.txt", "owl owl", &stats("owl owl")).unwrap();
        store.replace_document("alpha.txt", "fox hen", &stats("fox hen")).unwrap();
        let docs = store.list_documents().unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["alpha.txt", "zeta.txt"]);
        assert_eq!(docs[1].word_count, 2);
        assert_eq!(docs[1].unique_terms, 1);
    }
}
