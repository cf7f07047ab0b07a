pub mod reply;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use coursebot_core::language::detect_query_language;
use coursebot_core::loader::load_table;
use coursebot_core::{Hit, RetrievalIndex};
use parking_lot::RwLock;
use reply::{compose_reply, Reply, DEFAULT_RELEVANCE_THRESHOLD, SEARCH_K};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { SEARCH_K }

#[derive(Deserialize)]
pub struct FilterParams {
    #[serde(default = "default_filter_k")]
    pub k: usize,
}
fn default_filter_k() -> usize { reply::FILTER_K }

#[derive(Deserialize)]
pub struct AskParams {
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub results: Vec<Hit>,
}

#[derive(Serialize)]
pub struct DetectResponse {
    pub query: String,
    pub language: &'static str,
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub rows: usize,
    pub vocabulary: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub catalog: PathBuf,
    pub relevance_threshold: f32,
    pub admin_token: Option<String>,
    /// Allowed CORS origins; empty means any.
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Reads `ADMIN_TOKEN` and `CORS_ALLOW_ORIGIN` (comma-separated) from the environment.
    pub fn from_env(catalog: PathBuf, relevance_threshold: f32) -> Self {
        let cors_origins: Vec<String> = std::env::var("CORS_ALLOW_ORIGIN")
            .map(|val| val.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        Self {
            catalog,
            relevance_threshold,
            admin_token: std::env::var("ADMIN_TOKEN").ok(),
            cors_origins,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("./data/courses.json"),
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            admin_token: None,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    index: Arc<RwLock<Arc<RetrievalIndex>>>,
}

impl AppState {
    pub fn new(config: ServerConfig, index: RetrievalIndex) -> Self {
        Self { config: Arc::new(config), index: Arc::new(RwLock::new(Arc::new(index))) }
    }

    /// The current index. Queries run on this snapshot without holding the lock.
    pub fn index(&self) -> Arc<RetrievalIndex> {
        self.index.read().clone()
    }

    /// Build a fresh index from the configured catalog and swap it in.
    /// On failure the current index stays in place.
    pub fn reload(&self) -> Result<Arc<RetrievalIndex>> {
        let table = load_table(&self.config.catalog)?;
        let fresh = Arc::new(RetrievalIndex::from_table(&table)?);
        *self.index.write() = fresh.clone();
        tracing::info!(rows = fresh.len(), catalog = %self.config.catalog.display(), "index reloaded");
        Ok(fresh)
    }
}

/// Load the catalog named in `config`, build the index and the router.
pub fn build_app(config: ServerConfig) -> Result<Router> {
    let table = load_table(&config.catalog)?;
    let index = RetrievalIndex::from_table(&table)?;
    tracing::info!(rows = index.len(), vocabulary = index.vocabulary_len(), "catalog indexed");
    Ok(router(AppState::new(config, index)))
}

pub fn router(state: AppState) -> Router {
    let cors = if state.config.cors_origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let origins: Vec<_> = state.config.cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/languages", get(languages_handler))
        .route("/languages/:name", get(filter_handler))
        .route("/ask", get(ask_handler))
        .route("/detect", get(detect_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let k = params.k.clamp(1, MAX_K);
    let results = state.index().search(&params.q, k);
    Json(SearchResponse { query: params.q, took_s: start.elapsed().as_secs_f64(), results })
}

pub async fn languages_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.index().languages().into_iter().collect())
}

pub async fn filter_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<FilterParams>,
) -> Json<Vec<Hit>> {
    let k = params.k.clamp(1, MAX_K);
    Json(state.index().filter_by_language(&name, k))
}

pub async fn ask_handler(State(state): State<AppState>, Query(params): Query<AskParams>) -> Json<Reply> {
    let index = state.index();
    Json(compose_reply(&index, &params.q, state.config.relevance_threshold))
}

pub async fn detect_handler(Query(params): Query<AskParams>) -> Json<DetectResponse> {
    let language = detect_query_language(&params.q);
    Json(DetectResponse { query: params.q, language })
}

async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<ReloadResponse>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    match state.reload() {
        Ok(index) => Ok(Json(ReloadResponse { rows: index.len(), vocabulary: index.vocabulary_len() })),
        Err(e) => {
            tracing::warn!(error = %e, "reload failed, keeping current index");
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))
        }
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.config.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if tokens_match(provided.as_bytes(), required.as_bytes()) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

/// Equality whose running time depends only on the lengths, not on where the
/// first differing byte is.
fn tokens_match(provided: &[u8], required: &[u8]) -> bool {
    if provided.len() != required.len() {
        return false;
    }
    provided.iter().zip(required).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_comparison() {
        assert!(tokens_match(b"secret", b"secret"));
        assert!(!tokens_match(b"secreT", b"secret"));
        assert!(!tokens_match(b"secret", b"secret2"));
        assert!(!tokens_match(b"", b"secret"));
        assert!(tokens_match(b"", b""));
    }
}
