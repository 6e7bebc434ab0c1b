use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{ItineraryRequest, MemoryReelRequest, NarrativeDocument},
    routes::AppState,
};

/// Handler for itinerary generation
pub async fn itinerary(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ItineraryRequest>,
) -> AppResult<Json<NarrativeDocument>> {
    tracing::info!(
        request_id = %request_id,
        items = request.liked_items.len(),
        duration_days = request.duration_days,
        pace = request.travel_pace.label(),
        "Processing itinerary request"
    );

    let document = state.narrator.itinerary(&request).await?;
    Ok(Json(document))
}

/// Handler for memory reel storyboards
pub async fn memory_reel(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<MemoryReelRequest>,
) -> AppResult<Json<NarrativeDocument>> {
    tracing::info!(
        request_id = %request_id,
        photos = request.photos.len(),
        "Processing memory reel request"
    );

    let document = state.narrator.memory_reel(&request).await?;
    Ok(Json(document))
}
