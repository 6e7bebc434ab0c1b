use axum::{Extension, Json};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{PerDiemRequest, PerDiemResult},
    services::budget::{calculate_per_diem, validate_total_budget},
};

/// Handler for the per-diem endpoint
pub async fn per_diem(
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<PerDiemRequest>,
) -> AppResult<Json<PerDiemResult>> {
    tracing::info!(
        request_id = %request_id,
        bookings = request.pre_booked_costs.len(),
        duration_days = request.duration_days,
        "Processing per-diem request"
    );

    let total_budget = validate_total_budget(request.total_budget)?;
    let result = calculate_per_diem(total_budget, &request.pre_booked_costs, request.duration_days)?;

    Ok(Json(result))
}
