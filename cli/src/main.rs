use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use docrank_core::{Corpus, CorpusConfig, DEFAULT_TOP_N};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod output;
mod shell;

#[derive(Parser)]
#[command(name = "docrank")]
#[command(about = "Index documents and rank them against free-text queries with TF-IDF", long_about = None)]
struct Cli {
    /// SQLite database holding documents and term statistics
    #[arg(long, global = true, default_value = "docrank.db")]
    db: PathBuf,
    /// pdftotext program for PDF sources (default: $PDFTOTEXT, then `pdftotext`)
    #[arg(long, global = true)]
    pdftotext: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index files or directories; re-indexing a filename replaces it
    Index {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Rank indexed documents against a query
    Search {
        #[arg(required = true)]
        query: Vec<String>,
        /// Maximum number of results
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List indexed documents
    List {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show word counts and top terms of one document
    Stats {
        filename: String,
        /// Number of top terms to show
        #[arg(long, default_value_t = 10)]
        top: usize,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Interactive prompt
    Shell,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    let mut config = CorpusConfig { db_path: cli.db, ..CorpusConfig::default() };
    if let Some(program) = cli.pdftotext {
        config.pdftotext = program;
    }
    let mut corpus = Corpus::open(&config).with_context(|| format!("opening {}", config.db_path.display()))?;
    let outcome = run(&mut corpus, cli.command);
    corpus.close().context("closing database")?;
    outcome
}

fn run(corpus: &mut Corpus, command: Commands) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        Commands::Index { paths } => {
            let report = corpus.index_paths(&paths);
            output::batch(&mut out, &report)?;
            if !report.is_clean() {
                let total = report.indexed.len() + report.failed.len();
                bail!("{} of {} sources failed", report.failed.len(), total);
            }
        }
        Commands::Search { query, top_n, json } => {
            let query = query.join(" ");
            let results = corpus.search(&query, top_n)?;
            if json {
                output::json(&mut out, &results)?;
            } else {
                output::results(&mut out, &query, top_n, &results)?;
            }
        }
        Commands::List { json } => {
            let docs = corpus.list_documents()?;
            if json {
                output::json(&mut out, &docs)?;
            } else {
                output::documents(&mut out, &docs)?;
            }
        }
        Commands::Stats { filename, top, json } => {
            let stats = corpus.stats(&filename, top)?;
            if json {
                output::json(&mut out, &stats)?;
            } else {
                output::stats(&mut out, &stats)?;
            }
        }
        Commands::Shell => shell::run(corpus, io::stdin().lock(), &mut out)?,
    }
    out.flush()?;
    Ok(())
}
