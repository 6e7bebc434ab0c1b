use axum::{Extension, Json};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{SplitRequest, SplitSummary},
    services::settlement,
};

/// Handler for the expense split endpoint
pub async fn split(
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SplitRequest>,
) -> AppResult<Json<SplitSummary>> {
    tracing::info!(
        request_id = %request_id,
        expenses = request.expenses.len(),
        "Processing expense split request"
    );

    let summary = settlement::split(&request.expenses);

    tracing::info!(
        request_id = %request_id,
        transactions = summary.transactions.len(),
        skipped = summary.skipped_expenses,
        "Expense split completed"
    );

    Ok(Json(summary))
}
