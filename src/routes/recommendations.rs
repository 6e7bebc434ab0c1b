use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{RecommendationRequest, RecommendationResponse},
    routes::AppState,
};

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        user_id = %request.user_profile.user_id,
        pool_size = request.available_content.len(),
        batch_size = request.batch_size,
        "Processing recommendation request"
    );

    let response = state.ranking.rank(&request).await?;

    tracing::info!(
        request_id = %request_id,
        source = ?response.source,
        items = response.items.len(),
        "Recommendations ready"
    );

    Ok(Json(response))
}
