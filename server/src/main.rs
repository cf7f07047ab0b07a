use anyhow::Result;
use axum::Router;
use clap::Parser;
use coursebot_server::reply::DEFAULT_RELEVANCE_THRESHOLD;
use coursebot_server::{build_app, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Catalog file (.json / .jsonl) or directory of catalog files
    #[arg(long, default_value = "./data/courses.json")]
    catalog: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Best-score threshold below which /ask answers "out of scope"
    #[arg(long, default_value_t = DEFAULT_RELEVANCE_THRESHOLD)]
    threshold: f32,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = ServerConfig::from_env(args.catalog, args.threshold);
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
