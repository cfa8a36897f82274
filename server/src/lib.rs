use std::path::Path;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use wikisearch_core::{search, SledStore, StoreError};

pub mod render;

#[derive(Clone)]
pub struct AppState {
    store: SledStore,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<String>,
}

/// Assemble the router: the search page and JSON API over the index at
/// `index_dir`, with everything else falling through to static files under
/// `www_dir` (the corpus itself lives there, so ranked links resolve).
///
/// The store handle is shared read-only across requests; sled reads are
/// lock-free, so concurrent queries never wait on each other.
pub fn build_app(index_dir: &Path, www_dir: &Path) -> Result<Router> {
    let store = SledStore::open(index_dir)?;
    match store.meta()? {
        Some(meta) => {
            tracing::info!(num_docs = meta.num_docs, created_at = %meta.created_at, "opened index")
        }
        None => tracing::warn!(index = %index_dir.display(), "index has no metadata; was it built?"),
    }
    let state = AppState { store };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_page))
        .route("/api/search", get(search_api))
        .fallback_service(ServeDir::new(www_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    Ok(app)
}

async fn search_page(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, (StatusCode, String)> {
    let outcome = search(&state.store, &params.q).map_err(internal_error)?;
    Ok(Html(render::results_page(&params.q, &outcome)))
}

async fn search_api(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let outcome = search(&state.store, &params.q).map_err(internal_error)?;
    Ok(Json(SearchResponse {
        query: params.q,
        took_s: outcome.elapsed.as_secs_f64(),
        total_hits: outcome.docs.len(),
        results: outcome.docs.into_iter().map(|d| d.url).collect(),
    }))
}

// A store failure mid-query is a service error, never an empty result set.
fn internal_error(err: StoreError) -> (StatusCode, String) {
    tracing::error!(%err, "query against the index store failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "index store failure".to_string(),
    )
}
