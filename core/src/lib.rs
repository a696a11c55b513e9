//! Document indexing and TF-IDF ranking.
//!
//! Text goes through [`tokenizer::normalize`], is counted by [`stats::TermStats`],
//! and lands in a SQLite-backed [`persist::SqliteStore`]. [`rank::search`] answers
//! queries from the stored statistics. [`corpus::Corpus`] ties these together with
//! text extraction and is what the binaries talk to.

pub mod corpus;
pub mod error;
pub mod extract;
pub mod index;
pub mod persist;
pub mod rank;
pub mod stats;
pub mod tokenizer;

pub use corpus::{BatchReport, Corpus, CorpusConfig, DocumentStats};
pub use error::{Error, ExtractionError, Result};
pub use index::*;
pub use persist::{SqliteStore, WriteTxn};
pub use rank::{search, RankedResult, DEFAULT_TOP_N};
pub use stats::{TermStat, TermStats};
