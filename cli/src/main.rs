use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coursebot_core::language::detect_query_language;
use coursebot_core::loader::load_table;
use coursebot_core::RetrievalIndex;
use coursebot_server::reply::{compose_reply, DEFAULT_RELEVANCE_THRESHOLD, FILTER_K, SEARCH_K};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "coursebot")]
#[command(about = "Search the course catalog from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and print catalog statistics
    Stats {
        /// Catalog file (.json / .jsonl) or directory
        #[arg(long)]
        catalog: PathBuf,
    },
    /// Rank courses against a free-text query
    Search {
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long, short)]
        query: String,
        #[arg(long, short, default_value_t = SEARCH_K)]
        k: usize,
    },
    /// List courses released in a language
    Languages {
        #[arg(long)]
        catalog: PathBuf,
        /// Canonical language name, e.g. Tamil
        #[arg(long)]
        name: String,
        #[arg(long, short, default_value_t = FILTER_K)]
        k: usize,
    },
    /// Print the language a piece of text appears to be written in
    Detect {
        text: String,
    },
    /// Answer a question the way the chat endpoint does
    Ask {
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long, short)]
        query: String,
        #[arg(long, default_value_t = DEFAULT_RELEVANCE_THRESHOLD)]
        threshold: f32,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { catalog } => {
            let index = open_index(&catalog)?;
            let stats = serde_json::json!({
                "rows": index.len(),
                "vocabulary": index.vocabulary_len(),
                "languages": index.languages(),
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Search { catalog, query, k } => {
            let hits = open_index(&catalog)?.search(&query, k);
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Commands::Languages { catalog, name, k } => {
            let hits = open_index(&catalog)?.filter_by_language(&name, k);
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Commands::Detect { text } => {
            println!("{}", detect_query_language(&text));
        }
        Commands::Ask { catalog, query, threshold } => {
            let reply = compose_reply(&open_index(&catalog)?, &query, threshold);
            println!("{}", reply.text);
        }
    }
    Ok(())
}

fn open_index(catalog: &Path) -> Result<RetrievalIndex> {
    let table = load_table(catalog)?;
    let index = RetrievalIndex::from_table(&table).with_context(|| format!("indexing {}", catalog.display()))?;
    tracing::info!(rows = index.len(), vocabulary = index.vocabulary_len(), "index ready");
    Ok(index)
}
