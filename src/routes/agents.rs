use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{
    error::AppResult,
    middleware::RequestId,
    routes::AppState,
    services::{AgentOutcome, AgentTask},
};

/// Handler for capability-keyed agent tasks
pub async fn execute(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(task): Json<AgentTask>,
) -> AppResult<Json<AgentOutcome>> {
    tracing::info!(
        request_id = %request_id,
        capability = %task.capability(),
        "Processing agent task"
    );

    let outcome = state.agents.execute(&task).await?;
    Ok(Json(outcome))
}
