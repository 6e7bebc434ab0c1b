use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    db::Cache,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{generative::GenerativeModel, Agents, NarrativeService, RankingService},
};

pub mod agents;
pub mod budget;
pub mod expenses;
pub mod groups;
pub mod narratives;
pub mod recommendations;

/// Shared, immutable services handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub ranking: RankingService,
    pub narrator: NarrativeService,
    pub agents: Agents,
}

impl AppState {
    /// Wires the services around one injected model client and optional cache
    pub fn new(model: Arc<dyn GenerativeModel>, cache: Option<Cache>, cache_ttl: u64) -> Self {
        let ranking = RankingService::new(model.clone(), cache.clone(), cache_ttl);
        let narrator = NarrativeService::new(model, cache, cache_ttl);
        let agents = Agents::new(ranking.clone(), narrator.clone());

        Self {
            ranking,
            narrator,
            agents,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            // Request id first so the trace span can read it.
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/budget/per-diem", post(budget::per_diem))
        .route("/expenses/split", post(expenses::split))
        .route("/groups/consensus", post(groups::consensus))
        .route("/recommendations", post(recommendations::recommend))
        .route("/itineraries", post(narratives::itinerary))
        .route("/memory-reels", post(narratives::memory_reel))
        .route("/agents", post(agents::execute))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
