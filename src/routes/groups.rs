use axum::{Extension, Json};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{GroupConsensus, GroupConsensusRequest},
    services::consensus::build_consensus,
};

/// Handler for the group consensus endpoint
pub async fn consensus(
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<GroupConsensusRequest>,
) -> AppResult<Json<GroupConsensus>> {
    tracing::info!(
        request_id = %request_id,
        group_id = %request.group_id,
        members = request.member_swipes.len(),
        "Processing group consensus request"
    );

    let consensus = build_consensus(&request.group_id, &request.member_swipes)?;
    Ok(Json(consensus))
}
