use anyhow::{Context, Result};
use clap::Parser;
use docrank_core::{Corpus, CorpusConfig};
use docrank_server::build_app;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// SQLite database built by `docrank index`
    #[arg(long, default_value = "docrank.db")]
    db: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let config = CorpusConfig { db_path: args.db, ..CorpusConfig::default() };
    let corpus = Corpus::open(&config).with_context(|| format!("opening {}", config.db_path.display()))?;
    let corpus = Arc::new(Mutex::new(corpus));
    let app = build_app(corpus.clone());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, db = %config.db_path.display(), "server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    match Arc::try_unwrap(corpus) {
        Ok(corpus) => corpus.into_inner().close().context("closing database")?,
        Err(_) => tracing::warn!("corpus still shared at shutdown, leaving close to drop"),
    }
    tracing::info!("server stopped");
    Ok(())
}
